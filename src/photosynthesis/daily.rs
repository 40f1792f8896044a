//! Daily canopy photosynthesis: the HERMES-derived clear/overcast light
//! interception scheme, ported from `CropGrowth::fc_CropPhotosynthesis`.
//!
//! The source blends two sky states every day — a notionally clear sky
//! and a notionally fully overcast sky — weighted by how close the day's
//! actual global radiation comes to the clear-sky potential computed by
//! [`crate::radiation`], rather than switching on a measured cloud
//! fraction. Each state gets its own canopy-integrated gross
//! assimilation rate (`PHCH`/`PHC3`/`PHC4`/`PHCL` for the clear branch,
//! `PHOH`/`PHO3`/`PHOL` for the overcast branch), and the two are
//! radiation-weighted back together.

use crate::params::CarboxylationPathway;
use crate::photosynthesis::{CanopyPhotosynthesis, DailyAssimilation};
use crate::radiation::RadiationGeometry;
use crate::weather::WeatherRecord;

/// Inputs the leaf-level assimilation-rate curves need beyond weather and
/// canopy state.
#[derive(Debug, Clone, Copy)]
pub struct DailyPhotosynthesisParams {
    pub pathway: CarboxylationPathway,
    /// Maximum leaf photosynthetic rate at light and CO2 saturation
    /// [kg CO2 ha⁻¹ leaf h⁻¹].
    pub max_assimilation_rate: f64,
    /// Initial slope of the light-response curve [mol mol⁻¹ quanta].
    pub light_use_efficiency: f64,
    /// Beam extinction coefficient for the canopy's light-interception
    /// integral.
    pub extinction_coefficient: f64,
    /// Fraction of gross assimilates lost to growth respiration.
    pub growth_respiration_fraction: f64,
    /// Base maintenance-respiration rate at 10 degrees C
    /// [kg CH2O kg⁻¹ biomass d⁻¹].
    pub maintenance_respiration_base_rate: f64,
    /// Q10 temperature-response coefficient for maintenance respiration.
    pub maintenance_respiration_q10: f64,
}

/// Net daily canopy photosynthesis under the clear/overcast weighting
/// scheme. Implements [`CanopyPhotosynthesis`] directly so it can be
/// dropped into [`crate::crop_module::CropModule`] without further
/// wrapping.
#[derive(Debug, Clone, Copy)]
pub struct DailyPhotosynthesis {
    pub params: DailyPhotosynthesisParams,
    pub living_biomass_kg_ha: f64,
}

/// Single-leaf light-saturated assimilation rate before canopy
/// integration, `PHCH`/`PHCL` for C3 and `PHC4` for C4 in the source.
/// C3 uses a simple temperature-scaled plateau; C4 uses a wider
/// near-flat optimum extending to higher temperatures, reflecting C4
/// crops' greater heat tolerance but sharper chilling sensitivity
/// relative to C3.
fn leaf_light_saturated_rate(
    pathway: CarboxylationPathway,
    mean_air_temperature_c: f64,
    max_assimilation_rate: f64,
) -> f64 {
    match pathway {
        CarboxylationPathway::C3 => {
            let temperature_factor = if mean_air_temperature_c <= 0.0 {
                0.0
            } else if mean_air_temperature_c < 10.0 {
                mean_air_temperature_c / 10.0
            } else if mean_air_temperature_c <= 30.0 {
                1.0
            } else if mean_air_temperature_c < 40.0 {
                (40.0 - mean_air_temperature_c) / 10.0
            } else {
                0.0
            };
            max_assimilation_rate * temperature_factor
        }
        CarboxylationPathway::C4 => {
            let t = mean_air_temperature_c;
            let temperature_factor = if t <= -2.0 || t >= 54.0 {
                0.0
            } else if t < 10.0 {
                (t + 2.0) / 12.0
            } else if t <= 40.0 {
                1.0
            } else {
                (54.0 - t) / 14.0
            }
            .clamp(0.0, 1.0);
            max_assimilation_rate * temperature_factor
        }
    }
}

/// Canopy-integrated gross hourly assimilation for one sky state
/// (clear or overcast), using a non-rectangular-hyperbola light
/// response integrated over leaf-area index with Beer's law light
/// attenuation (the `PHCH`/`PHOH` canopy-closure step in the source).
fn canopy_integrate(
    leaf_light_saturated_rate: f64,
    light_use_efficiency: f64,
    incident_radiation_j_m2: f64,
    leaf_area_index: f64,
    extinction_coefficient: f64,
) -> f64 {
    if leaf_light_saturated_rate <= 0.0 || incident_radiation_j_m2 <= 0.0 || leaf_area_index <= 0.0 {
        return 0.0;
    }
    let top_of_canopy = light_use_efficiency * incident_radiation_j_m2 * extinction_coefficient;
    let bottom_of_canopy = top_of_canopy * (-extinction_coefficient * leaf_area_index).exp();

    let canopy_rate = |irradiance: f64| -> f64 {
        if irradiance <= 0.0 {
            return 0.0;
        }
        let discriminant = (light_use_efficiency * irradiance + leaf_light_saturated_rate).powi(2)
            - 4.0 * 0.95 * light_use_efficiency * irradiance * leaf_light_saturated_rate;
        (light_use_efficiency * irradiance + leaf_light_saturated_rate - discriminant.max(0.0).sqrt())
            / (2.0 * 0.95)
    };

    (canopy_rate(top_of_canopy) - canopy_rate(bottom_of_canopy)) / extinction_coefficient
}

/// Maintenance respiration, `Q10`-scaled AGROSIM daily rate applied to
/// living aboveground and belowground biomass together.
pub fn maintenance_respiration(
    living_biomass_kg_ha: f64,
    mean_air_temperature_c: f64,
    base_rate: f64,
    q10: f64,
) -> f64 {
    living_biomass_kg_ha * base_rate * q10.powf((mean_air_temperature_c - 10.0) / 10.0)
}

/// Growth respiration, a fixed fraction of whatever gross assimilate pool
/// remains after maintenance respiration has been subtracted.
pub fn growth_respiration(net_of_maintenance_kg_ha: f64, growth_respiration_fraction: f64) -> f64 {
    (net_of_maintenance_kg_ha * growth_respiration_fraction).max(0.0)
}

impl CanopyPhotosynthesis for DailyPhotosynthesis {
    fn assimilate(
        &mut self,
        weather: &WeatherRecord,
        radiation: &RadiationGeometry,
        leaf_area_index: f64,
        crop_frost_redux: f64,
        _transpiration_deficit: f64,
        _drought_stress_threshold: f64,
        oxygen_deficit: f64,
    ) -> DailyAssimilation {
        let leaf_rate = leaf_light_saturated_rate(self.params.pathway, weather.tavg, self.params.max_assimilation_rate);

        let clear_sky_fraction = if radiation.clear_day_radiation_j_m2 > 0.0 {
            (radiation.global_radiation_mj_m2 * 1.0e6 / radiation.clear_day_radiation_j_m2).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let clear_assimilation = canopy_integrate(
            leaf_rate,
            self.params.light_use_efficiency,
            radiation.clear_day_radiation_j_m2,
            leaf_area_index,
            self.params.extinction_coefficient,
        );
        let overcast_assimilation = canopy_integrate(
            leaf_rate,
            self.params.light_use_efficiency,
            radiation.overcast_day_radiation_j_m2,
            leaf_area_index,
            self.params.extinction_coefficient,
        );

        let gross_kg_ha = (clear_assimilation * clear_sky_fraction
            + overcast_assimilation * (1.0 - clear_sky_fraction))
            * radiation.effective_day_length_h
            * crop_frost_redux
            * oxygen_deficit;

        let maintenance =
            maintenance_respiration(self.living_biomass_kg_ha, weather.tavg, self.params.maintenance_respiration_base_rate, self.params.maintenance_respiration_q10);
        let net_of_maintenance = (gross_kg_ha - maintenance).max(0.0);
        let growth = growth_respiration(net_of_maintenance, self.params.growth_respiration_fraction);

        DailyAssimilation {
            net_assimilates_kg_ha: (net_of_maintenance - growth).max(0.0),
            gross_assimilates_kg_ha: gross_kg_ha,
            gross_photosynthesis_reference_mol: (gross_kg_ha / 30.0 / 10_000.0).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn weather(tmin: f64, tmax: f64, tavg: f64) -> WeatherRecord {
        WeatherRecord {
            date: NaiveDate::from_ymd_opt(2020, 6, 15).unwrap(),
            tmin,
            tmax,
            tavg,
            global_radiation: Some(15.0),
            sunshine_hours: None,
            relative_humidity: 60.0,
            wind_speed: 2.0,
            wind_speed_height: 2.0,
            precipitation: 0.0,
            et0: None,
            co2: None,
            o3: None,
        }
    }

    fn geometry() -> RadiationGeometry {
        crate::radiation::compute(166.0, 52.0, Some(15.0), 8.0)
    }

    fn default_params() -> DailyPhotosynthesisParams {
        DailyPhotosynthesisParams {
            pathway: CarboxylationPathway::C3,
            max_assimilation_rate: 45.0,
            light_use_efficiency: 0.000012,
            extinction_coefficient: 0.6,
            growth_respiration_fraction: 0.3,
            maintenance_respiration_base_rate: 0.015,
            maintenance_respiration_q10: 2.0,
        }
    }

    #[test]
    fn zero_lai_gives_zero_assimilation() {
        let mut model = DailyPhotosynthesis { params: default_params(), living_biomass_kg_ha: 3000.0 };
        let out = model.assimilate(&weather(12.0, 22.0, 17.0), &geometry(), 0.0, 1.0, 0.0, 5.0, 1.0);
        assert_eq!(out.gross_assimilates_kg_ha, 0.0);
    }

    #[test]
    fn frost_redux_scales_gross_assimilation_linearly() {
        let params = default_params();
        let mut full = DailyPhotosynthesis { params, living_biomass_kg_ha: 3000.0 };
        let mut halved = DailyPhotosynthesis { params, living_biomass_kg_ha: 3000.0 };
        let out_full = full.assimilate(&weather(12.0, 22.0, 17.0), &geometry(), 3.0, 1.0, 0.0, 5.0, 1.0);
        let out_halved = halved.assimilate(&weather(12.0, 22.0, 17.0), &geometry(), 3.0, 0.5, 0.0, 5.0, 1.0);
        assert!((out_halved.gross_assimilates_kg_ha - out_full.gross_assimilates_kg_ha * 0.5).abs() < 1e-6);
    }

    #[test]
    fn c4_tolerates_higher_temperature_than_c3() {
        let c3 = leaf_light_saturated_rate(CarboxylationPathway::C3, 42.0, 45.0);
        let c4 = leaf_light_saturated_rate(CarboxylationPathway::C4, 42.0, 45.0);
        assert!(c4 > c3);
    }

    #[test]
    fn maintenance_respiration_increases_with_temperature() {
        let low = maintenance_respiration(3000.0, 10.0, 0.015, 2.0);
        let high = maintenance_respiration(3000.0, 20.0, 0.015, 2.0);
        assert!(high > low);
    }

    #[test]
    fn net_assimilates_never_exceed_gross() {
        let mut model = DailyPhotosynthesis { params: default_params(), living_biomass_kg_ha: 3000.0 };
        let out = model.assimilate(&weather(12.0, 22.0, 17.0), &geometry(), 3.0, 1.0, 0.0, 5.0, 1.0);
        assert!(out.net_assimilates_kg_ha <= out.gross_assimilates_kg_ha);
    }
}
