//! The crop: daily orchestration of phenology, canopy growth,
//! photosynthesis, respiration, stress couplings, dry-matter partitioning,
//! roots, and water/nitrogen uptake, ported from `CropGrowth::step` (the
//! monolithic per-crop daily update at the center of the source).
//!
//! Soil state is never owned here. The orchestrator passes a mutable
//! [`crate::soil::SoilColumn`] handle into [`CropModule::step`]; this
//! keeps the crop ignorant of how moisture, temperature and NO3 are
//! actually solved, matching the trait seam in [`crate::soil`].

use crate::canopy::{self, CanopyState};
use crate::events::{tags, EventSink};
use crate::nitrogen;
use crate::o3_impact::O3ImpactParams;
use crate::organ::{OrganBiomass, LEAF, ROOT, STORAGE_ORGAN};
use crate::params::{
    CropModuleParameters, CropResidueParameters, CultivarParameters, Lifeform, PhotosynthesisMethod,
    SiteParameters, SpeciesParameters,
};
use crate::phenology::{self, EmergenceControl, PhenologyStep};
use crate::photosynthesis::daily::{DailyPhotosynthesis, DailyPhotosynthesisParams};
use crate::photosynthesis::fvcb::{FvcbCanopyParams, HourlyFvcbCanopy};
use crate::photosynthesis::{CanopyPhotosynthesis, DailyAssimilation};
use crate::radiation::{self, RadiationGeometry};
use crate::roots::RootSystem;
use crate::soil::SoilColumn;
use crate::stress::{drought_impact_on_fertility, FrostKillState, HeatStressState, OxygenDeficitState};
use crate::voc::{self, VocEmission, VocSpecies};
use crate::water;
use crate::weather::WeatherRecord;

/// Fine-root diameter used by the N-uptake diffusion term
/// (`fc_CropNUptake` hardcodes this rather than deriving it from species
/// parameters).
const ROOT_DIAMETER_M: f64 = 0.0005;
/// Soil tortuosity factor for the N diffusion term, also hardcoded in the
/// source rather than supplied per-site.
const TORTUOSITY: f64 = 1.0;
/// Minimum mineral N left behind by uptake, below which a layer is
/// considered exhausted.
const MINIMUM_AVAILABLE_N_KG_M3: f64 = 0.0001;

#[derive(Debug, Clone, Copy)]
enum PhotosynthesisStrategy {
    Daily(DailyPhotosynthesis),
    Fvcb(HourlyFvcbCanopy),
}

impl PhotosynthesisStrategy {
    #[allow(clippy::too_many_arguments)]
    fn assimilate(
        &mut self,
        weather: &WeatherRecord,
        radiation: &RadiationGeometry,
        leaf_area_index: f64,
        crop_frost_redux: f64,
        transpiration_deficit: f64,
        drought_stress_threshold: f64,
        oxygen_deficit: f64,
    ) -> DailyAssimilation {
        match self {
            PhotosynthesisStrategy::Daily(inner) => inner.assimilate(
                weather,
                radiation,
                leaf_area_index,
                crop_frost_redux,
                transpiration_deficit,
                drought_stress_threshold,
                oxygen_deficit,
            ),
            PhotosynthesisStrategy::Fvcb(inner) => inner.assimilate(
                weather,
                radiation,
                leaf_area_index,
                crop_frost_redux,
                transpiration_deficit,
                drought_stress_threshold,
                oxygen_deficit,
            ),
        }
    }
}

/// Outcome of one day's [`CropModule::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropStepOutput {
    pub net_assimilates_kg_ha: f64,
    pub gross_assimilates_kg_ha: f64,
    pub reference_et0_mm: f64,
    pub total_transpiration_mm: f64,
    pub total_n_uptake_kg_ha: f64,
    pub root_litter_kg_ha: f64,
    pub is_anthesis_day: bool,
    pub is_maturity_day: bool,
}

/// How much of the cuttable organs to remove in [`CropModule::apply_cutting`].
#[derive(Debug, Clone, Copy)]
pub enum CuttingTarget {
    /// Remove this fraction of cuttable-organ biomass, `[0,1]`.
    Fraction(f64),
    /// Remove whatever fraction brings the leaf area index down to this
    /// value (no-op if already at or below it).
    TargetLeafAreaIndex(f64),
}

/// Residue and export accounting from one cutting event.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingOutcome {
    pub removed_kg_ha: f64,
    pub exported_kg_ha: f64,
    /// `(organ, residue kg/ha)` returned to the soil surface, for the
    /// orchestrator to hand to [`crate::soil::SoilOrganic::add_organic_matter`].
    pub residue_to_soil: Vec<(usize, f64)>,
}

/// The full per-crop simulation state advanced one day at a time by
/// [`CropModule::step`].
#[derive(Debug, Clone)]
pub struct CropModule {
    pub species: SpeciesParameters,
    pub cultivar: CultivarParameters,
    pub lifeform: Lifeform,
    pub residue: CropResidueParameters,
    pub site: SiteParameters,
    pub config: CropModuleParameters,

    pub organs: OrganBiomass,
    pub canopy: CanopyState,
    pub roots: RootSystem,
    initial_rooting_depth_m: f64,

    pub stage: usize,
    pub stage_temperature_sum: f64,
    pub total_temperature_sum: f64,
    pub vernalisation_days: f64,
    pub vernalisation_factor: f64,
    pub day_length_factor: f64,

    pub heat_stress: HeatStressState,
    pub frost_kill: FrostKillState,
    pub oxygen_deficit_state: OxygenDeficitState,

    pub n_concentration_aboveground_biomass: f64,
    pub n_concentration_root: f64,

    /// Actual/potential transpiration ratio from the *previous* day
    /// (`vc_TranspirationDeficit`, old TRREL), `1.0` meaning no water
    /// stress. Today's photosynthesis and partitioning consume yesterday's
    /// value, since actual transpiration for today is only known after
    /// water uptake runs later in [`CropModule::step`].
    pub transpiration_deficit: f64,

    pub interception_storage_mm: f64,
    pub cutting_delay_days_remaining: u32,
    /// Multiplies whatever light-saturated-rate parameter the active
    /// photosynthesis strategy uses; ratcheted down by
    /// [`CropModule::apply_cutting`] (`cut_max_assim_fraction`).
    pub assimilation_rate_multiplier: f64,
    pub perennial_is_mature: bool,

    photosynthesis: PhotosynthesisStrategy,

    pub cumulative_gpp_kg_ha: f64,
    pub cumulative_npp_kg_ha: f64,
    pub cumulative_n_uptake_kg_ha: f64,
    pub cumulative_transpiration_mm: f64,
}

impl CropModule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        species: SpeciesParameters,
        cultivar: CultivarParameters,
        lifeform: Lifeform,
        residue: CropResidueParameters,
        site: SiteParameters,
        config: CropModuleParameters,
        number_of_layers: usize,
        layer_thickness_m: f64,
        initial_rooting_depth_m: f64,
    ) -> Self {
        let organs = OrganBiomass::new(&species.initial_organ_biomass, &species.aboveground_organ);
        let initial_lai = (organs.green(LEAF) * cultivar.specific_leaf_area[0]).max(0.001);
        let canopy = CanopyState::initial(initial_lai);
        let roots = RootSystem::new(
            initial_rooting_depth_m,
            cultivar.max_rooting_depth,
            site.sand_content,
            site.bulk_density_t_m3,
            number_of_layers,
            layer_thickness_m,
            organs.total(ROOT),
            species.specific_root_length,
            species.root_form_factor,
        );

        let photosynthesis = match config.photosynthesis_method {
            PhotosynthesisMethod::DailyPenman => PhotosynthesisStrategy::Daily(DailyPhotosynthesis {
                params: DailyPhotosynthesisParams {
                    pathway: species.carboxylation_pathway,
                    max_assimilation_rate: cultivar.max_assimilation_rate,
                    light_use_efficiency: 0.000012,
                    extinction_coefficient: 0.6,
                    growth_respiration_fraction: species.organ_growth_respiration.first().copied().unwrap_or(0.3),
                    maintenance_respiration_base_rate: species
                        .organ_maintenance_respiration
                        .first()
                        .copied()
                        .unwrap_or(0.015),
                    maintenance_respiration_q10: 2.0,
                },
                living_biomass_kg_ha: organs.total_biomass(),
            }),
            PhotosynthesisMethod::HourlyFvcb => PhotosynthesisStrategy::Fvcb(HourlyFvcbCanopy::new(
                FvcbCanopyParams {
                    vcmax25_top_leaf: species.vcmax25,
                    nitrogen_extinction_coefficient: 0.713,
                    beam_extinction_coefficient: 0.5,
                    boundary_layer_conductance: 1.5,
                    residual_stomatal_conductance: 0.3,
                    mesophyll_conductance25: 0.10125,
                },
                O3ImpactParams::default(),
                config.water_deficit_response_stomata,
            )),
        };

        let lt50_cultivar = cultivar.lt50_cultivar;
        let minimum_n = cultivar.minimum_n_concentration;

        CropModule {
            species,
            cultivar,
            lifeform,
            residue,
            site,
            config,
            organs,
            canopy,
            roots,
            initial_rooting_depth_m,
            stage: 0,
            stage_temperature_sum: 0.0,
            total_temperature_sum: 0.0,
            vernalisation_days: 0.0,
            vernalisation_factor: 1.0,
            day_length_factor: 1.0,
            heat_stress: HeatStressState::default(),
            frost_kill: FrostKillState::new(lt50_cultivar),
            oxygen_deficit_state: OxygenDeficitState::default(),
            n_concentration_aboveground_biomass: minimum_n,
            n_concentration_root: minimum_n,
            transpiration_deficit: 1.0,
            interception_storage_mm: 0.0,
            cutting_delay_days_remaining: 0,
            assimilation_rate_multiplier: 1.0,
            perennial_is_mature: false,
            photosynthesis,
            cumulative_gpp_kg_ha: 0.0,
            cumulative_npp_kg_ha: 0.0,
            cumulative_n_uptake_kg_ha: 0.0,
            cumulative_transpiration_mm: 0.0,
        }
    }

    fn number_of_stages(&self) -> usize {
        self.cultivar.stage_temperature_sum.len()
    }

    fn is_perennial(&self) -> bool {
        matches!(self.lifeform, Lifeform::Perennial { .. })
    }

    /// Cumulative effective temperature sum the heat-stress/ozone couplings
    /// treat as "flowering" and "maturity" (`fc_HeatStressImpact` reads
    /// these straight off the cultivar rather than a stage index).
    fn gdd_flowering(&self) -> f64 {
        self.cultivar.begin_sensitive_phase_heat_stress
    }

    fn gdd_maturity(&self) -> f64 {
        self.cultivar.stage_temperature_sum.iter().sum()
    }

    /// Advances the whole crop by one day. `soil` is mutated in place for
    /// moisture/temperature/NO3 drawdown; snow depth and the under-snow
    /// crown temperature the frost coupling needs are supplied by the
    /// caller since they live on the orchestrator's standalone
    /// [`crate::soil::SnowCover`]/[`crate::soil::FrostLayer`] instances, not
    /// on [`SoilColumn`] itself.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        weather: &WeatherRecord,
        soil: &mut impl SoilColumn,
        julian_day: f64,
        latitude_deg: f64,
        elevation_m: f64,
        atmospheric_co2_ppm: f64,
        atmospheric_o3_nmol_mol: f64,
        snow_depth_mm: f64,
        crown_temperature_under_snow_c: f64,
        mut events: impl EventSink,
    ) -> CropStepOutput {
        let radiation = radiation::compute(julian_day, latitude_deg, weather.global_radiation, weather.sunshine_hours.unwrap_or(0.0));

        // 1. Oxygen deficiency, averaged over the top three layers.
        let sat = [soil.saturation(0), soil.saturation(1.min(soil.number_of_layers() - 1)), soil.saturation(2.min(soil.number_of_layers() - 1))];
        let moist = [
            soil.soil_moisture_m3_m3(0),
            soil.soil_moisture_m3_m3(1.min(soil.number_of_layers() - 1)),
            soil.soil_moisture_m3_m3(2.min(soil.number_of_layers() - 1)),
        ];
        let critical_oxygen = self.species.critical_oxygen_content.get(self.stage).copied().unwrap_or(0.05);
        let oxygen_deficit = self.oxygen_deficit_state.step(sat, moist, critical_oxygen);

        // 2. Phenology.
        let old_total_temperature_sum = self.total_temperature_sum;
        let phenology_step = self.step_phenology(weather, soil);
        self.apply_phenology_step(phenology_step, &mut events);

        // 3. Day-length and vernalisation factors (post-emergence only;
        // pre-emergence phenology doesn't consume them, but callers such as
        // frost-kill do).
        let day_length_requirement = self.cultivar.day_length_requirement.get(self.stage).copied().unwrap_or(0.0);
        let base_day_length = self.cultivar.base_daylength.get(self.stage).copied().unwrap_or(0.0);
        self.day_length_factor =
            radiation::day_length_factor(day_length_requirement, radiation.effective_day_length_h, radiation.photoperiodic_day_length_h, base_day_length);
        let (vern_factor, vern_days) =
            phenology::vernalisation_factor(weather.tavg, self.cultivar.vernalisation_requirement.get(self.stage).copied().unwrap_or(0.0), self.vernalisation_days);
        self.vernalisation_factor = vern_factor;
        self.vernalisation_days = vern_days;

        // 4. Crop size (height, diameter).
        let (height, diameter) = canopy::crop_size(
            self.cultivar.max_crop_height,
            self.cultivar.max_crop_diameter,
            self.cultivar.stage_at_max_height,
            self.cultivar.stage_at_max_diameter,
            &self.cultivar.stage_temperature_sum,
            self.total_temperature_sum,
            self.cultivar.crop_height_p1,
            self.cultivar.crop_height_p2,
        );
        self.canopy.height_m = height;
        self.canopy.diameter_m = diameter;

        // 5. Photosynthesis (also implicitly carries maintenance/growth
        // respiration, since both strategies subtract it before returning).
        let relative_development = self.total_temperature_sum / self.gdd_maturity().max(1.0);
        let gdd_flowering = self.gdd_flowering();
        let gdd_maturity = self.gdd_maturity();
        if let PhotosynthesisStrategy::Fvcb(ref mut fvcb) = self.photosynthesis {
            fvcb.day.latitude_deg = latitude_deg;
            fvcb.day.atmospheric_co2_ppm = atmospheric_co2_ppm;
            fvcb.day.o3_ambient_nmol_mol = atmospheric_o3_nmol_mol;
            fvcb.day.relative_development = relative_development;
            fvcb.day.gdd_flowering = gdd_flowering;
            fvcb.day.gdd_maturity = gdd_maturity;
            fvcb.day.field_capacity = soil.field_capacity(0);
            fvcb.day.wilting_point = soil.permanent_wilting_point(0);
            fvcb.day.soil_water_content = soil.soil_moisture_m3_m3(0);
            fvcb.day.et0_mm = weather.et0.unwrap_or(4.0);
        }
        if let PhotosynthesisStrategy::Daily(ref mut daily) = self.photosynthesis {
            daily.living_biomass_kg_ha = self.organs.total_biomass();
            daily.params.max_assimilation_rate = self.cultivar.max_assimilation_rate * self.assimilation_rate_multiplier;
        }

        let drought_stress_threshold = self.cultivar.drought_stress_threshold.get(self.stage).copied().unwrap_or(1.0);
        // Yesterday's actual/potential transpiration ratio; today's value
        // is only known once water uptake runs later in this step.
        let assimilation = self.photosynthesis.assimilate(
            weather,
            &radiation,
            self.canopy.leaf_area_index,
            self.frost_kill.crop_frost_redux,
            self.transpiration_deficit,
            drought_stress_threshold,
            oxygen_deficit,
        );

        // 6. Heat stress during flowering.
        self.heat_stress.step(
            weather.tmax,
            weather.tmin,
            self.total_temperature_sum,
            self.cultivar.begin_sensitive_phase_heat_stress,
            self.cultivar.end_sensitive_phase_heat_stress,
            self.cultivar.critical_temperature_heat_stress,
            self.cultivar.limiting_temperature_heat_stress,
        );

        // 7. Frost kill.
        if self.config.frost_kill_enabled {
            self.frost_kill.step(
                weather.tmax,
                weather.tmin,
                self.stage,
                soil.soil_surface_temperature_c(),
                soil.soil_temperature_c(0),
                self.vernalisation_factor,
                snow_depth_mm,
                self.cultivar.lt50_cultivar,
                self.cultivar.frost_hardening,
                self.cultivar.frost_dehardening,
                self.cultivar.low_temperature_exposure,
                self.cultivar.respiratory_stress,
            );
        }
        let _ = crown_temperature_under_snow_c;

        // 8. Crop nitrogen status (target/critical concentration, redux).
        let critical_n = nitrogen::critical_n_concentration(
            self.cultivar.n_concentration_pn,
            self.cultivar.n_concentration_b0,
            self.organs.aboveground_biomass(),
            self.organs.belowground_biomass(),
        );
        let target_n = nitrogen::target_n_concentration(critical_n, self.cultivar.luxury_n_coeff);
        let n_status = nitrogen::crop_n_redux(
            self.n_concentration_aboveground_biomass,
            critical_n,
            self.cultivar.minimum_n_concentration,
            self.species.part_biological_n_fixation,
            self.config.nitrogen_response_on,
        );
        self.n_concentration_aboveground_biomass = n_status.n_concentration_aboveground_biomass;
        // A root N shortage specifically limits new root growth, on top of
        // (not instead of) the shoot-N-driven redux every organ shares.
        let root_n_redux = nitrogen::root_n_redux(self.n_concentration_root);

        // 9. Dry-matter partitioning.
        let old_aboveground = self.organs.aboveground_biomass();
        let old_belowground = self.organs.belowground_biomass();
        let partitioning = self
            .cultivar
            .assimilate_partitioning_coeff
            .get(self.stage)
            .cloned()
            .unwrap_or_else(|| vec![1.0 / self.organs.number_of_organs() as f64; self.organs.number_of_organs()]);
        let drought_fertility = drought_impact_on_fertility(
            self.transpiration_deficit,
            self.cultivar.drought_impact_on_fertility_factor,
            drought_stress_threshold,
            partitioning.get(STORAGE_ORGAN).copied().unwrap_or(0.0),
            oxygen_deficit,
        );
        for organ in 0..self.organs.number_of_organs() {
            let coeff = partitioning.get(organ).copied().unwrap_or(0.0);
            let growth_respiration = self.species.organ_growth_respiration.get(organ).copied().unwrap_or(0.0);
            let fertility_factor = if organ == STORAGE_ORGAN { drought_fertility } else { 1.0 };
            let root_n_factor = if organ == ROOT { root_n_redux } else { 1.0 };
            let increment = assimilation.net_assimilates_kg_ha
                * coeff
                * (1.0 - growth_respiration)
                * n_status.crop_n_redux
                * fertility_factor
                * root_n_factor;
            self.organs.add_growth(organ, increment);

            let senescence_rate = self
                .cultivar
                .organ_senescence_rate
                .get(self.stage)
                .and_then(|row| row.get(organ))
                .copied()
                .unwrap_or(0.0);
            if senescence_rate > 0.0 {
                let green = self.organs.green(organ);
                let senesced = green * senescence_rate;
                if organ == STORAGE_ORGAN {
                    self.organs.senesce(organ, senesced);
                } else {
                    // A fraction of senesced biomass is diverted to the
                    // storage organ instead of becoming litter in place.
                    let reallocated = senesced * self.species.assimilate_reallocation;
                    self.organs.senesce(organ, senesced - reallocated);
                    if reallocated > 0.0 {
                        self.organs.remove_green(organ, reallocated);
                        self.organs.add_growth(STORAGE_ORGAN, reallocated);
                    }
                }
            }
        }

        // 10. Green area / LAI.
        let sla_start = self.cultivar.specific_leaf_area.get(self.stage).copied().unwrap_or(20.0);
        let sla_end = self.cultivar.specific_leaf_area.get(self.stage + 1).copied().unwrap_or(sla_start);
        let leaf_growth = assimilation.net_assimilates_kg_ha * partitioning.get(LEAF).copied().unwrap_or(0.0);
        let leaf_senescence = self.organs.dead(LEAF);
        let (lai, gai) = canopy::update_green_area(
            self.canopy.leaf_area_index,
            leaf_growth.max(0.0),
            leaf_senescence,
            self.canopy.height_m,
            self.canopy.diameter_m,
            sla_start,
            sla_end,
            self.cultivar.specific_leaf_area_early,
            self.cultivar.stage_temperature_sum.get(self.stage).copied().unwrap_or(0.0),
            self.stage_temperature_sum,
            self.species.plant_density,
            1.0,
        );
        self.canopy.leaf_area_index = lai;
        self.canopy.green_area_index = gai;
        self.canopy.soil_coverage = canopy::soil_coverage(lai);

        // 11. Root dynamics.
        let clay_at_depth = soil.clay_content(self.roots.depth_layer.min(soil.number_of_layers() - 1));
        let root_max_depth_m = self.roots.max_depth_m;
        self.roots.step(
            weather.tavg,
            self.species.min_temperature_for_assimilation,
            self.species.root_penetration_rate,
            clay_at_depth,
            self.initial_rooting_depth_m,
            root_max_depth_m,
            soil.number_of_layers(),
            soil.layer_thickness_m(0),
            self.organs.total(ROOT),
            self.species.specific_root_length,
            self.species.root_form_factor,
        );

        // 12. Reference evapotranspiration.
        let reference_et0 = water::reference_evapotranspiration(
            elevation_m,
            weather.tmax,
            weather.tmin,
            weather.relative_humidity_fraction(),
            weather.tavg,
            weather.wind_speed_at_2m(),
            radiation.global_radiation_mj_m2,
            atmospheric_co2_ppm,
            assimilation.gross_photosynthesis_reference_mol,
            radiation.extraterrestrial_radiation_mj_m2,
            3.5,
            0.06,
            0.23,
            self.species.carboxylation_pathway,
        );

        // 13. Canopy interception and crop water uptake.
        let (net_precipitation, interception_storage) =
            water::interception(self.canopy.height_m, self.canopy.soil_coverage, self.interception_storage_mm, weather.precipitation);
        let (remaining_et, interception_storage, _evaporated) = water::evaporate_interception(interception_storage, reference_et0);
        self.interception_storage_mm = interception_storage;
        let _ = net_precipitation;

        let number_of_layers = soil.number_of_layers();
        let field_capacity: Vec<f64> = (0..number_of_layers).map(|l| soil.field_capacity(l)).collect();
        let wilting_point: Vec<f64> = (0..number_of_layers).map(|l| soil.permanent_wilting_point(l)).collect();
        let soil_moisture: Vec<f64> = (0..number_of_layers).map(|l| soil.soil_moisture_m3_m3(l)).collect();
        let transpiration_per_layer = water::distribute_transpiration(
            remaining_et * self.canopy.soil_coverage,
            self.roots.zone_layer,
            soil.groundwater_table_layer(),
            &self.roots.density_per_layer,
            &field_capacity,
            &wilting_point,
            &soil_moisture,
            soil.layer_thickness_m(0),
            self.roots.max_depth_m,
            oxygen_deficit,
        );
        let total_transpiration: f64 = transpiration_per_layer.iter().sum();
        for layer in 0..number_of_layers {
            if transpiration_per_layer[layer] > 0.0 {
                let new_moisture = soil.soil_moisture_m3_m3(layer) - (transpiration_per_layer[layer] / 1000.0) / soil.layer_thickness_m(layer);
                soil.set_soil_moisture_m3_m3(layer, new_moisture.max(0.0));
            }
        }

        // 14. Actual/potential transpiration ratio for tomorrow's
        // photosynthesis and drought-fertility steps (today's ran on
        // yesterday's ratio, since actual uptake wasn't known yet).
        let potential_transpiration = remaining_et * self.canopy.soil_coverage;
        self.transpiration_deficit = if self.config.water_deficit_response_stomata && potential_transpiration > 0.0 {
            total_transpiration / potential_transpiration
        } else {
            1.0
        };

        // 15. Crop nitrogen uptake.
        let layer_thickness = soil.layer_thickness_m(0);
        let mut potentials = Vec::with_capacity(number_of_layers);
        for layer in 0..number_of_layers {
            potentials.push(nitrogen::layer_uptake_potential(
                transpiration_per_layer[layer],
                soil.no3_kg_m3(layer),
                soil.soil_moisture_m3_m3(layer),
                TORTUOSITY,
                ROOT_DIAMETER_M,
                self.roots.density_per_layer.get(layer).copied().unwrap_or(0.0),
                1.0,
            ));
        }
        let aboveground_after_growth = self.organs.aboveground_biomass();
        let crop_n_demand_kg_ha = ((target_n * aboveground_after_growth) - (self.n_concentration_aboveground_biomass * aboveground_after_growth))
            .max(0.0)
            .min(self.species.max_crop_n_demand);
        let no3: Vec<f64> = (0..number_of_layers).map(|l| soil.no3_kg_m3(l)).collect();
        let (uptake_per_layer, total_n_uptake_kg_ha) = nitrogen::allocate_n_uptake(
            &potentials,
            &no3,
            layer_thickness,
            crop_n_demand_kg_ha / 10_000.0,
            MINIMUM_AVAILABLE_N_KG_M3,
            self.species.max_n_uptake_param,
        );
        for layer in 0..number_of_layers {
            if uptake_per_layer[layer] > 0.0 {
                let new_no3 = soil.no3_kg_m3(layer) - uptake_per_layer[layer] / layer_thickness;
                soil.set_no3_kg_m3(layer, new_no3.max(0.0));
            }
        }
        let (fixed_n_kg_ha, total_n_input_kg_ha) =
            nitrogen::split_fixation_and_input(crop_n_demand_kg_ha / 10_000.0, total_n_uptake_kg_ha, self.species.part_biological_n_fixation);
        let _ = fixed_n_kg_ha;

        if aboveground_after_growth > 0.0 {
            self.n_concentration_aboveground_biomass = nitrogen::update_root_n_concentration(
                old_aboveground,
                aboveground_after_growth,
                self.n_concentration_aboveground_biomass,
                0.0,
                0.0,
                total_n_input_kg_ha,
                target_n,
                self.cultivar.minimum_n_concentration,
            );
        }
        let root_biomass = self.organs.total(ROOT);
        let old_root_biomass = old_belowground;
        self.n_concentration_root = nitrogen::update_root_n_concentration(
            old_root_biomass,
            root_biomass,
            self.n_concentration_root,
            0.0,
            root_biomass - old_root_biomass,
            total_n_input_kg_ha,
            target_n,
            self.cultivar.minimum_n_concentration,
        );

        // 16. Root litter: dead root biomass dispatched back to the soil
        // surface layer every day rather than accumulating indefinitely.
        let root_litter_kg_ha = self.organs.remove_dead(ROOT, self.organs.dead(ROOT));

        // 17. GPP/NPP accounting.
        self.cumulative_gpp_kg_ha += assimilation.gross_assimilates_kg_ha;
        self.cumulative_npp_kg_ha += assimilation.net_assimilates_kg_ha;
        self.cumulative_n_uptake_kg_ha += total_n_uptake_kg_ha;
        self.cumulative_transpiration_mm += total_transpiration;

        let is_anthesis_day = old_total_temperature_sum < self.gdd_flowering() && self.total_temperature_sum >= self.gdd_flowering();
        let is_maturity_day = phenology_step.stage_advanced && phenology_step.stage == self.number_of_stages() - 1;

        if self.cutting_delay_days_remaining > 0 {
            self.cutting_delay_days_remaining -= 1;
        }

        CropStepOutput {
            net_assimilates_kg_ha: assimilation.net_assimilates_kg_ha,
            gross_assimilates_kg_ha: assimilation.gross_assimilates_kg_ha,
            reference_et0_mm: reference_et0,
            total_transpiration_mm: total_transpiration,
            total_n_uptake_kg_ha,
            root_litter_kg_ha,
            is_anthesis_day,
            is_maturity_day,
        }
    }

    fn step_phenology(&mut self, weather: &WeatherRecord, soil: &impl SoilColumn) -> PhenologyStep {
        let base_temperature = self.species.base_temperature.get(self.stage).copied().unwrap_or(0.0);
        let optimum_temperature = self.species.optimum_temperature.get(self.stage).copied().unwrap_or(25.0);
        let stage_target = self.cultivar.stage_temperature_sum.get(self.stage).copied().unwrap_or(f64::MAX);

        let step = if self.stage == 0 && !self.is_perennial() {
            phenology::step_pre_emergence(
                self.stage_temperature_sum,
                stage_target,
                soil.soil_temperature_c(0),
                base_temperature,
                soil.soil_moisture_m3_m3(0),
                soil.field_capacity(0),
                soil.permanent_wilting_point(0),
                soil.surface_water_storage_mm(),
                EmergenceControl { moisture_control: true, flooding_control: true },
            )
        } else if self.stage == 0 {
            phenology::step_perennial_stage_zero(
                self.stage_temperature_sum,
                stage_target,
                weather.tavg,
                base_temperature,
                optimum_temperature,
                self.vernalisation_factor,
                self.day_length_factor,
                self.number_of_stages(),
            )
        } else {
            // Stress-driven phenological acceleration is not modeled: the
            // post-emergence rate uses the unaccelerated baseline.
            let stress_acceleration = 1.0;
            phenology::step_post_emergence(
                self.stage,
                self.stage_temperature_sum,
                self.total_temperature_sum,
                stage_target,
                weather.tavg,
                base_temperature,
                optimum_temperature,
                self.vernalisation_factor,
                self.day_length_factor,
                stress_acceleration,
                self.cutting_delay_days_remaining,
                self.number_of_stages(),
                self.is_perennial(),
                self.total_temperature_sum >= self.gdd_maturity(),
            )
        };
        step
    }

    fn apply_phenology_step(&mut self, step: PhenologyStep, events: &mut impl EventSink) {
        if step.stage_advanced && self.stage == 0 && step.stage == 1 {
            events.fire_event(tags::EMERGENCE);
        }
        if step.stage_advanced {
            events.fire_event(&tags::stage(step.stage));
        }
        if step.perennial_reset {
            self.swap_perennial_parameters();
        }
        self.stage = step.stage;
        self.stage_temperature_sum = step.stage_temperature_sum;
        self.total_temperature_sum = step.total_temperature_sum;

        if self.total_temperature_sum >= self.gdd_flowering()
            && self.total_temperature_sum - self.stage_temperature_sum < self.gdd_flowering()
        {
            events.fire_event(tags::ANTHESIS);
        }
        if step.stage_advanced && self.stage == self.number_of_stages() - 1 {
            events.fire_event(tags::MATURITY);
        }
    }

    fn swap_perennial_parameters(&mut self) {
        if let Lifeform::Perennial { juvenile, mature } = &self.lifeform {
            self.perennial_is_mature = !self.perennial_is_mature;
            self.cultivar = if self.perennial_is_mature { (**mature).clone() } else { (**juvenile).clone() };
        }
    }

    /// Removes biomass from the cultivar's designated cutting organs
    /// (`pc_OrganIdsForCutting`), exporting part of it and returning the
    /// rest as residue for the caller to hand to soil-organic. Resets
    /// development to `stage_after_cut`, suppresses temperature accrual for
    /// `cutting_delay_days`, and permanently scales down the assimilation
    /// capacity by `cut_max_assim_fraction` (mowing/grazing damage the
    /// remaining canopy's photosynthetic machinery, not just its area).
    pub fn apply_cutting(&mut self, target: CuttingTarget, cut_max_assim_fraction: f64, events: &mut impl EventSink) -> CuttingOutcome {
        let removal_fraction = match target {
            CuttingTarget::Fraction(f) => f.clamp(0.0, 1.0),
            CuttingTarget::TargetLeafAreaIndex(target_lai) => {
                if self.canopy.leaf_area_index > target_lai && self.canopy.leaf_area_index > 0.0 {
                    (1.0 - target_lai / self.canopy.leaf_area_index).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        };

        let mut removed_kg_ha = 0.0;
        let mut exported_kg_ha = 0.0;
        let mut residue_to_soil = Vec::new();

        for &organ in &self.cultivar.organ_ids_cutting {
            let amount = self.organs.total(organ) * removal_fraction;
            let removed = self.organs.reduce_total(organ, amount);
            let export_fraction = self.residue.export_fraction.get(organ).copied().unwrap_or(1.0);
            let exported = removed * export_fraction;
            let residue = removed - exported;
            removed_kg_ha += removed;
            exported_kg_ha += exported;
            if residue > 0.0 {
                residue_to_soil.push((organ, residue));
            }
        }

        if self.cultivar.organ_ids_cutting.contains(&LEAF) {
            self.canopy.leaf_area_index = (self.canopy.leaf_area_index * (1.0 - removal_fraction)).max(0.001);
            self.canopy.soil_coverage = canopy::soil_coverage(self.canopy.leaf_area_index);
        }

        self.stage = self.cultivar.stage_after_cut;
        self.stage_temperature_sum = 0.0;
        self.cutting_delay_days_remaining = self.cultivar.cutting_delay_days;
        self.assimilation_rate_multiplier *= cut_max_assim_fraction;

        events.fire_event(tags::CUTTING);

        CuttingOutcome { removed_kg_ha, exported_kg_ha, residue_to_soil }
    }

    /// Harvests the crop: every organ's remaining biomass is removed, not
    /// just the cultivar's cutting organs. Organs in `pc_OrganIdsForPrimaryYield`
    /// export at `export_fraction_primary`; every other organ (including
    /// roots) exports at its residue `export_fraction`, with the rest
    /// returned as residue. The caller is responsible for dropping the
    /// crop once it is done reading `CuttingOutcome`.
    pub fn harvest(&mut self, export_fraction_primary: f64, events: &mut impl EventSink) -> CuttingOutcome {
        let outcome = self.remove_all_organs(export_fraction_primary, true);
        events.fire_event(tags::HARVEST);
        outcome
    }

    /// Fully incorporates the crop (tillage): every organ's remaining
    /// biomass returns to soil-organic, nothing exported.
    pub fn incorporate(&mut self, events: &mut impl EventSink) -> CuttingOutcome {
        let outcome = self.remove_all_organs(0.0, false);
        events.fire_event(tags::TILLAGE);
        outcome
    }

    fn remove_all_organs(&mut self, export_fraction_primary: f64, export_non_primary: bool) -> CuttingOutcome {
        let mut removed_kg_ha = 0.0;
        let mut exported_kg_ha = 0.0;
        let mut residue_to_soil = Vec::new();

        for organ in 0..self.organs.number_of_organs() {
            let removed = self.organs.reduce_total(organ, self.organs.total(organ));
            if removed <= 0.0 {
                continue;
            }
            let export_fraction = if self.cultivar.organ_ids_primary_yield.contains(&organ) {
                export_fraction_primary.clamp(0.0, 1.0)
            } else if export_non_primary {
                self.residue.export_fraction.get(organ).copied().unwrap_or(0.0)
            } else {
                0.0
            };
            let exported = removed * export_fraction;
            let residue = removed - exported;
            removed_kg_ha += removed;
            exported_kg_ha += exported;
            if residue > 0.0 {
                residue_to_soil.push((organ, residue));
            }
        }

        self.canopy.leaf_area_index = 0.001;
        self.canopy.soil_coverage = canopy::soil_coverage(self.canopy.leaf_area_index);

        CuttingOutcome { removed_kg_ha, exported_kg_ha, residue_to_soil }
    }

    /// Today's diagnostic biogenic VOC emission; does not feed back into
    /// carbon/nitrogen accounting.
    pub fn voc_emission(&self, global_radiation_w_m2: f64, foliage_temperature_c: f64) -> VocEmission {
        let species = VocSpecies {
            isoprene_emission_factor: self.species.ef_isoprene,
            monoterpene_emission_factor: self.species.ef_monoterpene,
            monoterpene_storage_emission_factor: 0.0,
            specific_leaf_area_m2_kg: self.cultivar.specific_leaf_area.get(self.stage).copied().unwrap_or(20.0) * 10_000.0,
            leaf_area_index: self.canopy.leaf_area_index,
        };
        voc::canopy_emission(&[species], global_radiation_w_m2, foliage_temperature_c, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organ::SHOOT;
    use crate::params::CarboxylationPathway;
    use crate::soil::reference::ReferenceSoilColumn;
    use chrono::NaiveDate;

    fn sample_species() -> SpeciesParameters {
        SpeciesParameters {
            species_name: "test-wheat".into(),
            base_temperature: vec![0.0, 0.0, 0.0, 0.0, 0.0],
            optimum_temperature: vec![20.0, 20.0, 20.0, 20.0, 20.0],
            stage_temperature_sum: vec![120.0, 300.0, 400.0, 300.0, 1.0],
            number_of_organs: 4,
            aboveground_organ: vec![false, true, true, true],
            storage_organ: vec![false, false, false, true],
            organ_growth_respiration: vec![0.1, 0.2, 0.2, 0.3],
            organ_maintenance_respiration: vec![0.01, 0.015, 0.01, 0.005],
            assimilate_reallocation: 0.1,
            carboxylation_pathway: CarboxylationPathway::C3,
            initial_organ_biomass: vec![20.0, 5.0, 5.0, 0.0],
            critical_oxygen_content: vec![0.05, 0.05, 0.05, 0.05, 0.05],
            min_temperature_for_assimilation: 1.0,
            plant_density: 300.0,
            root_form_factor: 3.0,
            root_growth_lag: 0.0,
            root_penetration_rate: 0.15,
            specific_root_length: 20.0,
            kc25: 404.9,
            ko25: 278.4,
            vcmax25: 90.0,
            activation_energy_kc: 79430.0,
            activation_energy_ko: 36380.0,
            activation_energy_vcmax: 65330.0,
            ef_isoprene: 0.0,
            ef_monoterpene: 0.0,
            ef_monoterpenes: vec![],
            part_biological_n_fixation: 0.0,
            max_crop_n_demand: 5.0,
            max_n_uptake_param: 200.0,
        }
    }

    fn sample_cultivar() -> CultivarParameters {
        CultivarParameters {
            cultivar_name: "test".into(),
            stage_temperature_sum: vec![120.0, 300.0, 400.0, 300.0, 1.0],
            specific_leaf_area: vec![22.0, 20.0, 18.0, 15.0, 15.0, 15.0],
            specific_leaf_area_early: 25.0,
            kc_per_stage: vec![0.3, 0.7, 1.1, 1.0, 0.6],
            max_assimilation_rate: 45.0,
            max_crop_height: 1.0,
            crop_height_p1: 6.0,
            crop_height_p2: 0.5,
            stage_at_max_height: 2,
            max_crop_diameter: 0.05,
            stage_at_max_diameter: 1,
            drought_stress_threshold: vec![0.5, 0.5, 0.3, 0.3, 0.3],
            day_length_requirement: vec![0.0, 14.0, 14.0, 0.0, 0.0],
            base_daylength: vec![0.0, 6.0, 6.0, 0.0, 0.0],
            vernalisation_requirement: vec![0.0, 0.0, 0.0, 0.0, 0.0],
            organ_senescence_rate: vec![
                vec![0.0, 0.0, 0.0, 0.0],
                vec![0.0, 0.005, 0.0, 0.0],
                vec![0.0, 0.01, 0.0, 0.0],
                vec![0.0, 0.02, 0.01, 0.0],
                vec![0.0, 0.0, 0.0, 0.0],
            ],
            assimilate_partitioning_coeff: vec![
                vec![0.6, 0.4, 0.0, 0.0],
                vec![0.3, 0.4, 0.3, 0.0],
                vec![0.2, 0.2, 0.3, 0.3],
                vec![0.1, 0.1, 0.1, 0.7],
                vec![0.0, 0.0, 0.0, 1.0],
            ],
            lt50_cultivar: -20.0,
            frost_hardening: 0.1,
            frost_dehardening: 0.1,
            low_temperature_exposure: 0.05,
            respiratory_stress: 0.05,
            begin_sensitive_phase_heat_stress: 500.0,
            end_sensitive_phase_heat_stress: 700.0,
            critical_temperature_heat_stress: 30.0,
            limiting_temperature_heat_stress: 40.0,
            drought_impact_on_fertility_factor: 0.2,
            max_rooting_depth: 1.5,
            luxury_n_coeff: 1.2,
            n_concentration_pn: 5.0,
            n_concentration_b0: 0.5,
            minimum_n_concentration: 0.005,
            organ_ids_primary_yield: vec![STORAGE_ORGAN],
            organ_ids_secondary_yield: vec![],
            organ_ids_cutting: vec![LEAF],
            stage_after_cut: 1,
            cutting_delay_days: 3,
        }
    }

    fn sample_site() -> SiteParameters {
        SiteParameters { sand_content: 0.4, bulk_density_t_m3: 1.4, impenetrable_layer_depth_m: None, clay_content: 0.2 }
    }

    fn sample_residue() -> CropResidueParameters {
        CropResidueParameters { export_fraction: vec![0.0, 0.8, 0.2, 1.0], residue_n_ratio: 0.5 }
    }

    fn sample_weather() -> WeatherRecord {
        WeatherRecord {
            date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            tmin: 8.0,
            tmax: 20.0,
            tavg: 14.0,
            global_radiation: Some(18.0),
            sunshine_hours: Some(8.0),
            relative_humidity: 70.0,
            wind_speed: 2.5,
            wind_speed_height: 10.0,
            precipitation: 1.0,
            et0: Some(3.5),
            co2: Some(400.0),
            o3: Some(40.0),
        }
    }

    fn new_module() -> CropModule {
        CropModule::new(
            sample_species(),
            sample_cultivar(),
            Lifeform::Annual,
            sample_residue(),
            sample_site(),
            CropModuleParameters::default(),
            10,
            0.1,
            0.1,
        )
    }

    #[test]
    fn new_crop_module_starts_at_stage_zero() {
        let crop = new_module();
        assert_eq!(crop.stage, 0);
        assert!(crop.canopy.leaf_area_index > 0.0);
    }

    #[test]
    fn step_runs_without_panicking_and_produces_nonnegative_assimilates() {
        let mut crop = new_module();
        let mut soil = ReferenceSoilColumn::uniform(10, 0.1);
        let mut events = Vec::new();
        let mut sink = |tag: &str| events.push(tag.to_string());
        let out = crop.step(&sample_weather(), &mut soil, 121.0, 51.0, 50.0, 400.0, 40.0, 0.0, 5.0, &mut sink);
        assert!(out.net_assimilates_kg_ha >= 0.0);
        assert!(out.reference_et0_mm.is_finite());
    }

    #[test]
    fn repeated_steps_eventually_advance_stage() {
        let mut crop = new_module();
        let mut soil = ReferenceSoilColumn::uniform(10, 0.1);
        let mut sink = |_tag: &str| {};
        for _ in 0..40 {
            crop.step(&sample_weather(), &mut soil, 121.0, 51.0, 50.0, 400.0, 40.0, 0.0, 5.0, &mut sink);
        }
        assert!(crop.stage >= 1);
    }

    #[test]
    fn apply_cutting_resets_stage_and_zeroes_stage_temperature_sum() {
        let mut crop = new_module();
        crop.stage = 3;
        crop.stage_temperature_sum = 120.0;
        crop.canopy.leaf_area_index = 3.0;
        let mut sink = |_tag: &str| {};
        let outcome = crop.apply_cutting(CuttingTarget::Fraction(0.5), 0.9, &mut sink);
        assert_eq!(crop.stage, crop.cultivar.stage_after_cut);
        assert_eq!(crop.stage_temperature_sum, 0.0);
        assert!(outcome.removed_kg_ha > 0.0);
        assert_eq!(crop.cutting_delay_days_remaining, crop.cultivar.cutting_delay_days);
    }

    #[test]
    fn apply_cutting_target_lai_is_a_noop_when_already_below_target() {
        let mut crop = new_module();
        crop.canopy.leaf_area_index = 1.0;
        let mut sink = |_tag: &str| {};
        let outcome = crop.apply_cutting(CuttingTarget::TargetLeafAreaIndex(2.0), 1.0, &mut sink);
        assert_eq!(outcome.removed_kg_ha, 0.0);
    }

    #[test]
    fn voc_emission_is_zero_for_non_emitting_species() {
        let crop = new_module();
        let emission = crop.voc_emission(400.0, 22.0);
        assert_eq!(emission.isoprene, 0.0);
    }

    fn new_fvcb_module() -> CropModule {
        let mut config = CropModuleParameters::default();
        config.photosynthesis_method = PhotosynthesisMethod::HourlyFvcb;
        CropModule::new(sample_species(), sample_cultivar(), Lifeform::Annual, sample_residue(), sample_site(), config, 10, 0.1, 0.1)
    }

    #[test]
    fn ozone_exposure_strictly_reduces_gross_assimilation_under_fvcb() {
        let mut clean = new_fvcb_module();
        let mut ozoned = new_fvcb_module();
        let mut sink = |_tag: &str| {};
        let mut gross_clean = 0.0;
        let mut gross_ozoned = 0.0;
        for day in 0..20 {
            let mut soil_clean = ReferenceSoilColumn::uniform(10, 0.1);
            let mut soil_ozoned = ReferenceSoilColumn::uniform(10, 0.1);
            let out_clean = clean.step(&sample_weather(), &mut soil_clean, 121.0 + day as f64, 51.0, 50.0, 400.0, 0.0, 0.0, 5.0, &mut sink);
            let out_ozoned = ozoned.step(&sample_weather(), &mut soil_ozoned, 121.0 + day as f64, 51.0, 50.0, 400.0, 60.0, 0.0, 5.0, &mut sink);
            gross_clean += out_clean.gross_assimilates_kg_ha;
            gross_ozoned += out_ozoned.gross_assimilates_kg_ha;
        }
        assert!(gross_ozoned < gross_clean);
    }

    #[test]
    fn heat_wave_during_flowering_reduces_heat_redux_below_one() {
        let mut crop = new_module();
        crop.total_temperature_sum = crop.gdd_flowering() + 1.0;
        crop.stage = 2;
        let mut soil = ReferenceSoilColumn::uniform(10, 0.1);
        let mut sink = |_tag: &str| {};
        let mut heat_wave = sample_weather();
        heat_wave.tmax = 42.0;
        heat_wave.tmin = 28.0;
        crop.step(&heat_wave, &mut soil, 200.0, 51.0, 50.0, 400.0, 0.0, 0.0, 5.0, &mut sink);
        assert!(crop.heat_stress.crop_heat_redux < 1.0);
    }

    #[test]
    fn storage_organ_accumulates_biomass_without_drought_or_waterlogging() {
        let mut crop = new_module();
        crop.stage = 3; // partitioning coefficient to STORAGE_ORGAN is 0.7 here.
        let mut soil = ReferenceSoilColumn::uniform(10, 0.1);
        let mut sink = |_tag: &str| {};
        let before = crop.organs.total(STORAGE_ORGAN);
        for day in 0..10 {
            crop.step(&sample_weather(), &mut soil, 121.0 + day as f64, 51.0, 50.0, 400.0, 0.0, 0.0, 5.0, &mut sink);
        }
        assert!(crop.organs.total(STORAGE_ORGAN) > before);
    }

    #[test]
    fn harvest_removes_biomass_from_every_organ_not_just_cutting_organs() {
        let mut crop = new_module();
        // organ_ids_cutting is only [LEAF]; root and shoot biomass must
        // still be fully removed and accounted for by a real harvest.
        let root_before = crop.organs.total(ROOT);
        let shoot_before = crop.organs.total(SHOOT);
        let leaf_before = crop.organs.total(LEAF);
        assert!(root_before > 0.0 && shoot_before > 0.0);

        let mut sink = |_tag: &str| {};
        let outcome = crop.harvest(0.8, &mut sink);
        for organ in 0..crop.organs.number_of_organs() {
            assert_eq!(crop.organs.total(organ), 0.0);
        }
        assert!((outcome.removed_kg_ha - (root_before + shoot_before + leaf_before)).abs() < 1e-6);
        assert!(outcome.residue_to_soil.iter().any(|&(organ, amount)| organ == ROOT && amount > 0.0));
        assert!(outcome.exported_kg_ha > 0.0);
    }

    #[test]
    fn incorporate_exports_nothing() {
        let mut crop = new_module();
        let mut sink = |_tag: &str| {};
        let outcome = crop.incorporate(&mut sink);
        assert_eq!(outcome.exported_kg_ha, 0.0);
        assert!(outcome.removed_kg_ha > 0.0);
    }

    #[test]
    fn senescence_reallocates_a_fraction_of_senesced_biomass_to_storage_organ() {
        let mut crop = new_module();
        crop.stage = 3; // organ_senescence_rate[3] = [0.0, 0.02, 0.01, 0.0]; species.assimilate_reallocation = 0.1.
        crop.organs.add_growth(LEAF, 100.0);
        crop.organs.add_growth(SHOOT, 100.0);
        let mut soil = ReferenceSoilColumn::uniform(10, 0.1);
        let mut sink = |_tag: &str| {};
        let storage_before = crop.organs.total(STORAGE_ORGAN);
        crop.step(&sample_weather(), &mut soil, 121.0, 51.0, 50.0, 400.0, 0.0, 0.0, 5.0, &mut sink);
        // Growth from partitioning alone would already raise this; the
        // reallocation is additive on top, so just check senescence ran and
        // storage organ did not shrink.
        assert!(crop.organs.total(STORAGE_ORGAN) >= storage_before);
        assert!(crop.organs.dead(LEAF) > 0.0);
    }
}
