//! `MonicaModel`: owns the soil submodels and (at most) one planted crop,
//! and drives one simulation day at a time, ported from `Monica::step`.
//!
//! The crop never owns soil state (see [`crate::soil`]); the orchestrator
//! holds it and hands a mutable handle into [`CropModule::step`]. Soil
//! water/temperature solving proper is out of scope (see `spec.md` §1);
//! what remains here is the daily sequencing the source performs around
//! that external state — snow/frost advance, AOM decay, fertiliser
//! application, crop residue ingestion, transport — plus the event bus
//! and the planted-crop lifecycle (`plant_crop`, `harvest_current_crop`,
//! `incorporate_current_crop`, `apply_cutting`).

use crate::crop_module::{CropModule, CropStepOutput, CuttingOutcome, CuttingTarget};
use crate::events::{tags, EventLog};
use crate::params::CO2Method;
use crate::soil::{FrostLayer, SnowCover, SoilColumn, SoilOrganic, SoilTransport};
use crate::weather::{self, WeatherRecord};

/// Layer residue and dead roots are deposited into.
/// `CuttingOutcome::residue_to_soil` is keyed by organ, not layer; the
/// soil-organic module only takes a layer index, so everything returned
/// above ground is folded into one surface-layer amount here.
const SOIL_SURFACE_LAYER: usize = 0;

/// Orchestrator-level configuration not owned by any single crop.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub latitude_deg: f64,
    pub elevation_m: f64,
    /// Julian day on which automatic N-min fertilisation for winter crops
    /// is considered (`p_JulianDayAutomaticFertilising`); `None` disables it.
    pub julian_day_automatic_fertilising: Option<u32>,
    pub automatic_fertilisation_amount_kg_n_ha: f64,
    /// Aboveground N concentration [kg/kg] below which automatic
    /// fertilisation actually fires on the configured day.
    pub automatic_fertilisation_n_status_threshold: f64,
}

/// One delayed or top-dressing fertiliser application queued for a future
/// julian day.
#[derive(Debug, Clone, Copy)]
pub struct PendingFertilisation {
    pub julian_day: u32,
    pub amount_kg_n_ha: f64,
    pub layer: usize,
}

/// Owns the soil submodels and the currently planted crop (if any), and
/// advances the whole system one day at a time via [`MonicaModel::step`].
///
/// Generic over the soil submodel implementations so callers can supply
/// their own alongside [`crate::soil::reference`]'s stand-ins.
pub struct MonicaModel<S, SN, FL, SO, ST>
where
    S: SoilColumn,
    SN: SnowCover,
    FL: FrostLayer,
    SO: SoilOrganic,
    ST: SoilTransport,
{
    pub soil: S,
    pub snow: SN,
    pub frost: FL,
    pub soil_organic: SO,
    pub soil_transport: ST,
    pub config: OrchestratorConfig,

    crop: Option<CropModule>,
    pending_clear: bool,
    pending_fertilisation: Vec<PendingFertilisation>,
    events: EventLog,
}

impl<S, SN, FL, SO, ST> MonicaModel<S, SN, FL, SO, ST>
where
    S: SoilColumn,
    SN: SnowCover,
    FL: FrostLayer,
    SO: SoilOrganic,
    ST: SoilTransport,
{
    pub fn new(soil: S, snow: SN, frost: FL, soil_organic: SO, soil_transport: ST, config: OrchestratorConfig) -> Self {
        MonicaModel {
            soil,
            snow,
            frost,
            soil_organic,
            soil_transport,
            config,
            crop: None,
            pending_clear: false,
            pending_fertilisation: Vec::new(),
            events: EventLog::new(),
        }
    }

    pub fn current_crop(&self) -> Option<&CropModule> {
        self.crop.as_ref()
    }

    pub fn current_crop_mut(&mut self) -> Option<&mut CropModule> {
        self.crop.as_mut()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Sows a crop; `Sowing` fires immediately rather than waiting for the
    /// next `step`, matching the source's synchronous management calls.
    pub fn plant_crop(&mut self, crop: CropModule) {
        self.crop = Some(crop);
        self.pending_clear = false;
        self.events.push(tags::SOWING);
    }

    /// Queues a delayed or top-dressing fertiliser application for a future
    /// julian day; applied during that day's `general_step`.
    pub fn schedule_fertilisation(&mut self, julian_day: u32, amount_kg_n_ha: f64, layer: usize) {
        self.pending_fertilisation.push(PendingFertilisation { julian_day, amount_kg_n_ha, layer });
    }

    /// Harvests the current crop: all remaining biomass is exported or
    /// returned to soil-organic as residue (not just the cutting organs),
    /// and the crop is marked for removal at the start of the next day.
    /// Returns `None` if no crop is planted.
    pub fn harvest_current_crop(&mut self, export_fraction_primary: f64) -> Option<CuttingOutcome> {
        let crop = self.crop.as_mut()?;
        let outcome = crop.harvest(export_fraction_primary, &mut self.events);
        let residue_n_ratio = crop.residue.residue_n_ratio;
        self.deposit_residue(&outcome.residue_to_soil, residue_n_ratio);
        self.pending_clear = true;
        Some(outcome)
    }

    /// Fully incorporates the current crop (tillage): all remaining
    /// biomass returns to soil-organic, none exported.
    pub fn incorporate_current_crop(&mut self) -> Option<CuttingOutcome> {
        let crop = self.crop.as_mut()?;
        let outcome = crop.incorporate(&mut self.events);
        let residue_n_ratio = crop.residue.residue_n_ratio;
        self.deposit_residue(&outcome.residue_to_soil, residue_n_ratio);
        self.pending_clear = true;
        Some(outcome)
    }

    /// Cuts (mows/grazes) the current crop without removing it.
    pub fn apply_cutting(&mut self, target: CuttingTarget, cut_max_assim_fraction: f64) -> Option<CuttingOutcome> {
        let crop = self.crop.as_mut()?;
        let outcome = crop.apply_cutting(target, cut_max_assim_fraction, &mut self.events);
        let residue_n_ratio = crop.residue.residue_n_ratio;
        self.deposit_residue(&outcome.residue_to_soil, residue_n_ratio);
        Some(outcome)
    }

    /// CO2 concentration for the day: `Forced` uses the measured value
    /// when present (falling back to the analytic curve otherwise),
    /// `Fallback` always uses the analytic/yearly-map curve.
    fn atmospheric_co2_ppm(&self, weather: &WeatherRecord) -> f64 {
        let fallback = || weather::co2_concentration_fallback(weather::decimal_date(weather.date));
        match self.crop.as_ref().map(|c| c.config.co2_method) {
            Some(CO2Method::Forced) => weather.co2.unwrap_or_else(fallback),
            Some(CO2Method::Fallback) | None => fallback(),
        }
    }

    /// Advances the whole system by one day: `dailyReset`, the crop step
    /// (if a crop is planted), then `generalStep` in the source's fixed
    /// order. Returns the crop's step output, if any.
    pub fn step(&mut self, weather: &WeatherRecord, julian_day: f64, julian_day_int: u32) -> Option<CropStepOutput> {
        self.daily_reset();
        self.events.advance_day();

        let atmospheric_co2_ppm = self.atmospheric_co2_ppm(weather);
        let atmospheric_o3_nmol_mol = weather.o3.unwrap_or(0.0);

        let crop_output = if let Some(crop) = self.crop.as_mut() {
            let output = crop.step(
                weather,
                &mut self.soil,
                julian_day,
                self.config.latitude_deg,
                self.config.elevation_m,
                atmospheric_co2_ppm,
                atmospheric_o3_nmol_mol,
                self.snow.snow_depth_mm(),
                self.frost.temperature_under_snow_c(),
                &mut self.events,
            );
            if output.root_litter_kg_ha > 0.0 {
                self.soil_organic
                    .add_organic_matter(&[(SOIL_SURFACE_LAYER, output.root_litter_kg_ha)], crop.n_concentration_root);
            }
            if output.is_maturity_day {
                self.events.push(tags::MATURITY);
            }
            Some(output)
        } else {
            None
        };

        self.general_step(weather, julian_day_int);

        crop_output
    }

    /// Removes a crop marked for clearance by `harvest_current_crop` /
    /// `incorporate_current_crop` at the top of the day, after the
    /// previous day's soil-module references to it have gone out of
    /// scope (there are none held beyond a single `step` call here, so
    /// this reduces to a flag check).
    fn daily_reset(&mut self) {
        if self.pending_clear {
            self.crop = None;
            self.pending_clear = false;
        }
    }

    /// `generalStep`: groundwater depth -> CO2 concentration -> soil-organic
    /// AOM decay -> delayed/top-dressing fertiliser -> automatic N-min
    /// fertilisation for winter crops -> soil temperature (snow/frost
    /// advance) -> soil moisture -> soil organic -> soil transport.
    fn general_step(&mut self, weather: &WeatherRecord, julian_day_int: u32) {
        // Groundwater depth determination and soil moisture solving are
        // external submodel concerns (out of scope); `SoilColumn` exposes
        // only a getter for the groundwater table, so there is nothing to
        // drive here beyond what the caller's soil implementation already
        // does internally.
        self.soil_organic.step();

        self.apply_pending_fertilisation(julian_day_int);
        self.apply_automatic_fertilisation(julian_day_int);

        self.snow.step(weather.precipitation, weather.tavg);
        self.frost.step(weather.tavg, self.snow.snow_depth_mm());

        self.soil_transport.step();
    }

    fn apply_pending_fertilisation(&mut self, julian_day_int: u32) {
        let (due, remaining): (Vec<_>, Vec<_>) =
            self.pending_fertilisation.drain(..).partition(|f| f.julian_day == julian_day_int);
        self.pending_fertilisation = remaining;
        for application in due {
            self.inject_n_kg_ha(application.layer, application.amount_kg_n_ha);
            self.events.push(tags::MINERAL_FERTILIZATION);
        }
    }

    fn apply_automatic_fertilisation(&mut self, julian_day_int: u32) {
        let Some(target_day) = self.config.julian_day_automatic_fertilising else { return };
        if julian_day_int != target_day {
            return;
        }
        let Some(crop) = self.crop.as_ref() else { return };
        if crop.n_concentration_aboveground_biomass >= self.config.automatic_fertilisation_n_status_threshold {
            return;
        }
        let amount = self.config.automatic_fertilisation_amount_kg_n_ha;
        self.inject_n_kg_ha(0, amount);
        self.events.push(tags::MINERAL_FERTILIZATION);
    }

    fn deposit_residue(&mut self, residue_to_soil: &[(usize, f64)], n_concentration_kg_kg: f64) {
        let total: f64 = residue_to_soil.iter().map(|(_, amount)| amount).sum();
        if total > 0.0 {
            self.soil_organic.add_organic_matter(&[(SOIL_SURFACE_LAYER, total)], n_concentration_kg_kg);
        }
    }

    fn inject_n_kg_ha(&mut self, layer: usize, amount_kg_n_ha: f64) {
        if layer >= self.soil.number_of_layers() {
            return;
        }
        let added_kg_m3 = amount_kg_n_ha / 10_000.0 / self.soil.layer_thickness_m(layer);
        let new_no3 = self.soil.no3_kg_m3(layer) + added_kg_m3;
        self.soil.set_no3_kg_m3(layer, new_no3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organ::{LEAF, STORAGE_ORGAN};
    use crate::params::{
        CarboxylationPathway, CropModuleParameters, CropResidueParameters, CultivarParameters, Lifeform, SiteParameters,
        SpeciesParameters,
    };
    use crate::soil::reference::{ReferenceFrostLayer, ReferenceSnowCover, ReferenceSoilColumn, ReferenceSoilOrganic, ReferenceSoilTransport};
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

    fn sample_weather(date: NaiveDate) -> WeatherRecord {
        WeatherRecord {
            date,
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

    fn new_model() -> MonicaModel<
        ReferenceSoilColumn,
        ReferenceSnowCover,
        ReferenceFrostLayer,
        ReferenceSoilOrganic,
        ReferenceSoilTransport,
    > {
        MonicaModel::new(
            ReferenceSoilColumn::uniform(10, 0.1),
            ReferenceSnowCover::default(),
            ReferenceFrostLayer::default(),
            ReferenceSoilOrganic::new(10),
            ReferenceSoilTransport::default(),
            OrchestratorConfig {
                latitude_deg: 51.0,
                elevation_m: 50.0,
                julian_day_automatic_fertilising: None,
                automatic_fertilisation_amount_kg_n_ha: 0.0,
                automatic_fertilisation_n_status_threshold: 0.0,
            },
        )
    }

    #[test]
    fn bare_fallow_step_runs_without_a_crop_and_leaches() {
        let mut model = new_model();
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        for day in 0..30 {
            let out = model.step(&sample_weather(date), 121.0 + day as f64, 121 + day);
            assert!(out.is_none());
        }
        assert!(model.soil_transport.leached_no3_kg_ha() > 0.0);
    }

    #[test]
    fn planting_fires_sowing_event() {
        let mut model = new_model();
        let crop = CropModule::new(sample_species(), sample_cultivar(), Lifeform::Annual, CropResidueParameters { export_fraction: vec![0.0, 0.8, 0.2, 1.0], residue_n_ratio: 0.5 }, SiteParameters { sand_content: 0.4, bulk_density_t_m3: 1.4, impenetrable_layer_depth_m: None, clay_content: 0.2 }, CropModuleParameters::default(), 10, 0.1, 0.1);
        model.plant_crop(crop);
        assert!(model.events().current_events().contains(&tags::SOWING.to_string()));
    }

    #[test]
    fn crop_step_runs_once_planted_and_clears_after_harvest() {
        let mut model = new_model();
        let crop = CropModule::new(sample_species(), sample_cultivar(), Lifeform::Annual, CropResidueParameters { export_fraction: vec![0.0, 0.8, 0.2, 1.0], residue_n_ratio: 0.5 }, SiteParameters { sand_content: 0.4, bulk_density_t_m3: 1.4, impenetrable_layer_depth_m: None, clay_content: 0.2 }, CropModuleParameters::default(), 10, 0.1, 0.1);
        model.plant_crop(crop);
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let out = model.step(&sample_weather(date), 121.0, 121);
        assert!(out.is_some());

        model.harvest_current_crop(1.0);
        assert!(model.current_crop().is_some(), "crop is cleared at the top of the *next* day, not immediately");
        let out_after_harvest = model.step(&sample_weather(date), 122.0, 122);
        assert!(out_after_harvest.is_none());
        assert!(model.current_crop().is_none());
    }
}
