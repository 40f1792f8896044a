//! Parameter surface, shaped for JSON/TOML config loading.
//!
//! Species parameters are inherent to a species; cultivar parameters are
//! tunable per variety. Both are plain serde-friendly data so they can be
//! loaded from an external config layer without this crate depending on
//! that layer's reference-resolution logic.

use serde::{Deserialize, Serialize};

/// The carboxylation pathway a species uses, gating which photosynthesis
/// strategy applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarboxylationPathway {
    C3,
    C4,
}

/// Species-inherent parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesParameters {
    pub species_name: String,
    /// Base temperature per stage [°C], below which no effective
    /// temperature accrues.
    pub base_temperature: Vec<f64>,
    /// Optimum temperature per stage [°C], the upper bound of the
    /// effective-temperature ramp.
    pub optimum_temperature: Vec<f64>,
    /// Temperature sum required to complete each stage [°C d], species
    /// default (overridden per-cultivar where present).
    pub stage_temperature_sum: Vec<f64>,
    pub number_of_organs: usize,
    pub aboveground_organ: Vec<bool>,
    pub storage_organ: Vec<bool>,
    /// Growth respiration coefficient per organ, dimensionless fraction of
    /// assimilate consumed per unit growth.
    pub organ_growth_respiration: Vec<f64>,
    /// Maintenance respiration coefficient per organ [per day].
    pub organ_maintenance_respiration: Vec<f64>,
    /// Fraction of senesced non-storage biomass reallocated to the storage
    /// organ.
    pub assimilate_reallocation: f64,
    pub carboxylation_pathway: CarboxylationPathway,
    pub initial_organ_biomass: Vec<f64>,
    /// Critical air-filled pore volume per stage below which oxygen
    /// deficiency accrues.
    pub critical_oxygen_content: Vec<f64>,
    pub min_temperature_for_assimilation: f64,
    /// Plants per square meter.
    pub plant_density: f64,
    /// Root density distribution shape factor (`exp(-FormFactor * z)`).
    pub root_form_factor: f64,
    pub root_growth_lag: f64,
    /// Clay-content dependent penetration-rate parameters; evaluated by
    /// [`crate::roots::penetration_rate`].
    pub root_penetration_rate: f64,
    /// Specific root length [m/kg], used to derive total root length from
    /// root biomass.
    pub specific_root_length: f64,
    /// Rubisco Michaelis constant for CO2 at 25°C [µbar].
    pub kc25: f64,
    /// Rubisco Michaelis constant for O2 at 25°C [mbar].
    pub ko25: f64,
    /// Maximum carboxylation rate at 25°C [µmol m⁻² s⁻¹].
    pub vcmax25: f64,
    /// Activation energy for Kc [J/mol].
    pub activation_energy_kc: f64,
    /// Activation energy for Ko [J/mol].
    pub activation_energy_ko: f64,
    /// Activation energy for Vcmax [J/mol].
    pub activation_energy_vcmax: f64,
    /// Isoprene emission factor [µg g⁻¹ h⁻¹] (Guenther VOC model).
    pub ef_isoprene: f64,
    /// Total monoterpene emission factor [µg g⁻¹ h⁻¹].
    pub ef_monoterpene: f64,
    /// Per-compound monoterpene emission factors, summing to
    /// `ef_monoterpene` (JJV VOC model).
    pub ef_monoterpenes: Vec<f64>,
    /// Fraction of nitrogen demand biological fixation can cover
    /// (legumes); `0.0` for non-fixing species.
    pub part_biological_n_fixation: f64,
    pub max_crop_n_demand: f64,
    pub max_n_uptake_param: f64,
}

/// Cultivar-tunable parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CultivarParameters {
    pub cultivar_name: String,
    pub stage_temperature_sum: Vec<f64>,
    /// Specific leaf area per stage [ha leaf / kg DM].
    pub specific_leaf_area: Vec<f64>,
    /// Early-stage specific leaf area used for the senescence term of the
    /// LAI update.
    pub specific_leaf_area_early: f64,
    pub kc_per_stage: Vec<f64>,
    pub max_assimilation_rate: f64,
    pub max_crop_height: f64,
    /// Sigmoid shape parameters for crop-height growth.
    pub crop_height_p1: f64,
    pub crop_height_p2: f64,
    pub stage_at_max_height: usize,
    pub max_crop_diameter: f64,
    pub stage_at_max_diameter: usize,
    pub drought_stress_threshold: Vec<f64>,
    /// Day-length requirement per stage [h]; positive = long-day, negative
    /// = short-day.
    pub day_length_requirement: Vec<f64>,
    pub base_daylength: Vec<f64>,
    pub vernalisation_requirement: Vec<f64>,
    /// `[stage][organ]` senescence rate, fraction of green biomass lost per
    /// day.
    pub organ_senescence_rate: Vec<Vec<f64>>,
    /// `[stage][organ]` assimilate partitioning coefficients, summing to 1
    /// within a stage.
    pub assimilate_partitioning_coeff: Vec<Vec<f64>>,
    pub lt50_cultivar: f64,
    pub frost_hardening: f64,
    pub frost_dehardening: f64,
    pub low_temperature_exposure: f64,
    pub respiratory_stress: f64,
    pub begin_sensitive_phase_heat_stress: f64,
    pub end_sensitive_phase_heat_stress: f64,
    pub critical_temperature_heat_stress: f64,
    pub limiting_temperature_heat_stress: f64,
    pub drought_impact_on_fertility_factor: f64,
    pub max_rooting_depth: f64,
    pub luxury_n_coeff: f64,
    pub n_concentration_pn: f64,
    pub n_concentration_b0: f64,
    pub minimum_n_concentration: f64,
    pub organ_ids_primary_yield: Vec<usize>,
    pub organ_ids_secondary_yield: Vec<usize>,
    pub organ_ids_cutting: Vec<usize>,
    /// Development stage restored after [`crate::crop_module::CropModule::apply_cutting`].
    pub stage_after_cut: usize,
    pub cutting_delay_days: u32,
}

/// Perennial parameter set swap. An annual crop has no mature/juvenile
/// distinction; a perennial swaps its active cultivar parameters on every
/// stage-0 reset.
#[derive(Debug, Clone)]
pub enum Lifeform {
    Annual,
    Perennial {
        juvenile: Box<CultivarParameters>,
        mature: Box<CultivarParameters>,
    },
}

/// Residue handling parameters for harvest/incorporation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropResidueParameters {
    /// Exportable fraction per organ at harvest (the rest returns as
    /// residue to soil-organic).
    pub export_fraction: Vec<f64>,
    /// N concentration of residues relative to the primary yield, used to
    /// split total biomass N content across removal vs. return-to-soil
    /// streams (glossary "Residue N ratio").
    pub residue_n_ratio: f64,
}

/// Site-level parameters affecting rooting depth and frost.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SiteParameters {
    pub sand_content: f64,
    pub bulk_density_t_m3: f64,
    pub impenetrable_layer_depth_m: Option<f64>,
    pub clay_content: f64,
}

/// Simulation-wide switches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PhotosynthesisMethod {
    /// Daily Penman-style canopy photosynthesis (used for C4 or legacy C3).
    DailyPenman,
    /// Hourly FvCB sunlit/shaded canopy photosynthesis (C3 only).
    HourlyFvcb,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum CO2Method {
    /// `pc_CO2Method = 3`: use measured/forced atmospheric CO2 directly.
    Forced,
    /// Use the yearly-map or analytic RCP8.5-style fallback.
    Fallback,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CropModuleParameters {
    pub photosynthesis_method: PhotosynthesisMethod,
    pub co2_method: CO2Method,
    pub frost_kill_enabled: bool,
    pub water_deficit_response_stomata: bool,
    pub nitrogen_response_on: bool,
    pub et0_alpha: f64,
    pub et0_beta: f64,
}

impl Default for CropModuleParameters {
    fn default() -> Self {
        CropModuleParameters {
            photosynthesis_method: PhotosynthesisMethod::DailyPenman,
            co2_method: CO2Method::Fallback,
            frost_kill_enabled: true,
            water_deficit_response_stomata: true,
            nitrogen_response_on: true,
            et0_alpha: 0.01,
            et0_beta: 0.6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_crop_module_parameters_use_daily_photosynthesis() {
        let p = CropModuleParameters::default();
        assert!(matches!(p.photosynthesis_method, PhotosynthesisMethod::DailyPenman));
    }
}
