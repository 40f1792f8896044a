//! Reference evapotranspiration, canopy interception, and per-layer
//! transpiration uptake with deficit redistribution, ported from
//! `fc_ReferenceEvapotranspiration` and `fc_CropWaterUptake`.
//!
//! The source assigns `pc_CarboxylationPathway = 1` instead of comparing
//! it inside `fc_ReferenceEvapotranspiration`'s stomatal-resistance branch;
//! both arms of that `if` are identical, so the assignment is harmless in
//! the original, but it silently forces the C3 computation every call.
//! [`stomatal_resistance`] takes [`crate::params::CarboxylationPathway`]
//! and compares it properly — a behavior-preserving fix, since C3 and C4
//! used the same formula anyway.

use crate::params::CarboxylationPathway;

/// Penman-Monteith FAO-56 reference evapotranspiration for one day
/// (`fc_ReferenceEvapotranspiration`).
#[allow(clippy::too_many_arguments)]
pub fn reference_evapotranspiration(
    elevation_m: f64,
    max_air_temperature_c: f64,
    min_air_temperature_c: f64,
    relative_humidity_fraction: f64,
    mean_air_temperature_c: f64,
    wind_speed_2m: f64,
    global_radiation_mj_m2: f64,
    atmospheric_co2_ppm: f64,
    gross_photosynthesis_reference_mol: f64,
    extraterrestrial_radiation_mj_m2: f64,
    saturation_beta: f64,
    stomata_conductance_alpha: f64,
    reference_albedo: f64,
    carboxylation_pathway: CarboxylationPathway,
) -> f64 {
    let atmospheric_pressure = 101.3 * ((293.0 - (0.0065 * elevation_m)) / 293.0).powf(5.26);
    let psychrometer_constant = 0.000665 * atmospheric_pressure;

    let saturated_vp_max = 0.6108 * ((17.27 * max_air_temperature_c) / (237.3 + max_air_temperature_c)).exp();
    let saturated_vp_min = 0.6108 * ((17.27 * min_air_temperature_c) / (237.3 + min_air_temperature_c)).exp();
    let saturated_vp = (saturated_vp_max + saturated_vp_min) / 2.0;

    let vapour_pressure = if relative_humidity_fraction <= 0.0 {
        saturated_vp_min
    } else {
        relative_humidity_fraction * saturated_vp
    };

    let saturation_deficit = saturated_vp - vapour_pressure;

    let saturated_vp_slope = (4098.0
        * (0.6108 * ((17.27 * mean_air_temperature_c) / (mean_air_temperature_c + 237.3)).exp()))
        / ((mean_air_temperature_c + 237.3) * (mean_air_temperature_c + 237.3));

    let aerodynamic_resistance = 208.0 / wind_speed_2m;

    let stomata_resistance = stomatal_resistance(
        gross_photosynthesis_reference_mol,
        atmospheric_co2_ppm,
        saturation_deficit,
        saturation_beta,
        stomata_conductance_alpha,
        carboxylation_pathway,
    );
    let surface_resistance = stomata_resistance / 1.44;

    let clear_sky_shortwave = (0.75 + 0.00002 * elevation_m) * extraterrestrial_radiation_mj_m2;
    let relative_shortwave = if clear_sky_shortwave > 0.0 {
        global_radiation_mj_m2 / clear_sky_shortwave
    } else {
        0.0
    };
    let net_shortwave = (1.0 - reference_albedo) * global_radiation_mj_m2;

    let boltzmann_constant = 0.0000000049;
    let net_radiation = net_shortwave
        - (boltzmann_constant
            * ((min_air_temperature_c + 273.16).powi(4) + (max_air_temperature_c + 273.16).powi(4))
            / 2.0
            * (1.35 * relative_shortwave - 0.35)
            * (0.34 - 0.14 * vapour_pressure.max(0.0).sqrt()));

    ((0.408 * saturated_vp_slope * net_radiation)
        + (psychrometer_constant * (900.0 / (mean_air_temperature_c + 273.0)) * wind_speed_2m * saturation_deficit))
        / (saturated_vp_slope + psychrometer_constant * (1.0 + (surface_resistance / aerodynamic_resistance)))
}

/// Bulk stomatal resistance from reference-leaf gross photosynthesis
/// (Yu et al. 2001-style). `999_999.9` s/m effectively closes the canopy
/// when there is no assimilation to drive transpiration.
pub fn stomatal_resistance(
    gross_photosynthesis_reference_mol: f64,
    atmospheric_co2_ppm: f64,
    saturation_deficit_kpa: f64,
    saturation_beta: f64,
    stomata_conductance_alpha: f64,
    carboxylation_pathway: CarboxylationPathway,
) -> f64 {
    if gross_photosynthesis_reference_mol <= 0.0 {
        return 999_999.9;
    }

    match carboxylation_pathway {
        CarboxylationPathway::C3 | CarboxylationPathway::C4 => {
            (atmospheric_co2_ppm * (1.0 + saturation_deficit_kpa / saturation_beta))
                / (stomata_conductance_alpha * gross_photosynthesis_reference_mol)
        }
    }
}

/// Canopy interception of today's gross precipitation
/// (`fc_CropWaterUptake`'s interception block). Returns `(net_precipitation,
/// updated_interception_storage, evaporated_from_intercept)` after first
/// using up-to-`remaining_evapotranspiration` of stored interception for
/// evaporation.
pub fn interception(
    crop_height_m: f64,
    soil_coverage: f64,
    interception_storage_mm: f64,
    gross_precipitation_mm: f64,
) -> (f64, f64) {
    let mut interception = (2.5 * crop_height_m * soil_coverage) - interception_storage_mm;
    if interception < 0.0 || gross_precipitation_mm <= 0.0 {
        interception = 0.0;
    }

    let net_precipitation = if gross_precipitation_mm <= interception {
        interception = gross_precipitation_mm;
        0.0
    } else {
        gross_precipitation_mm - interception
    };

    (net_precipitation, interception_storage_mm + interception)
}

/// Evaporates stored interception water using up to
/// `potential_evapotranspiration_mm`. Returns `(remaining_evapotranspiration,
/// updated_interception_storage, evaporated_from_intercept)`.
pub fn evaporate_interception(
    interception_storage_mm: f64,
    potential_evapotranspiration_mm: f64,
) -> (f64, f64, f64) {
    if interception_storage_mm > 0.0 {
        if potential_evapotranspiration_mm >= interception_storage_mm {
            (potential_evapotranspiration_mm - interception_storage_mm, 0.0, interception_storage_mm)
        } else {
            (0.0, interception_storage_mm - potential_evapotranspiration_mm, potential_evapotranspiration_mm)
        }
    } else {
        (potential_evapotranspiration_mm, 0.0, 0.0)
    }
}

/// Per-layer water-availability-driven transpiration redux and root
/// effectivity (`fc_CropWaterUptake`'s five-band piecewise curve).
/// Returns `(transpiration_redux, root_effectivity)`, both in `[0,1]`.
pub fn layer_redux_and_effectivity(available_water_fraction: f64) -> (f64, f64) {
    let f = available_water_fraction.max(0.0);
    let (redux, effectivity) = if f < 0.15 {
        (f * 3.0, 0.15 + 0.45 * f / 0.15)
    } else if f < 0.3 {
        (0.45 + (0.25 * (f - 0.15) / 0.15), 0.6 + (0.2 * (f - 0.15) / 0.15))
    } else if f < 0.5 {
        (0.7 + (0.275 * (f - 0.3) / 0.2), 0.8 + (0.2 * (f - 0.3) / 0.2))
    } else if f < 0.75 {
        (0.975 + (0.025 * (f - 0.5) / 0.25), 1.0)
    } else {
        (1.0, 1.0)
    };
    (redux.max(0.0), effectivity.max(0.0))
}

/// Distributes potential transpiration across the rooting zone by root
/// density and effectivity, then redistributes any layer's unmet demand to
/// deeper layers (`fc_CropWaterUptake`'s two final loops).
///
/// `groundwater_table_layer` caps uptake depth: layers at or below it get
/// fixed effectivity (`0.5` at the table, `0.0` below), modeling anoxia
/// rather than drought limiting roots near a shallow water table.
#[allow(clippy::too_many_arguments)]
pub fn distribute_transpiration(
    potential_transpiration_mm: f64,
    rooting_zone_layers: usize,
    groundwater_table_layer: Option<usize>,
    root_density_per_layer: &[f64],
    field_capacity: &[f64],
    permanent_wilting_point: &[f64],
    soil_moisture: &[f64],
    layer_thickness_m: f64,
    max_effective_depth_m: f64,
    oxygen_deficit: f64,
) -> Vec<f64> {
    let number_of_layers = root_density_per_layer.len();
    let active_limit = match groundwater_table_layer {
        Some(gwt) => rooting_zone_layers.min(gwt + 1),
        None => rooting_zone_layers,
    };

    let mut root_effectivity = vec![0.0; number_of_layers];
    for layer in 0..rooting_zone_layers.min(number_of_layers) {
        let available_water = (field_capacity[layer] - permanent_wilting_point[layer]).max(1e-9);
        let available_fraction =
            ((soil_moisture[layer] - permanent_wilting_point[layer]) / available_water).max(0.0);
        let (_redux, mut effectivity) = layer_redux_and_effectivity(available_fraction);

        if let Some(gwt) = groundwater_table_layer {
            if layer == gwt {
                effectivity = 0.5;
            } else if layer > gwt {
                effectivity = 0.0;
            }
        }
        if ((layer + 1) as f64 * layer_thickness_m) >= max_effective_depth_m {
            effectivity = 0.0;
        }
        root_effectivity[layer] = effectivity;
    }

    let total_root_effectivity: f64 = (0..active_limit.min(number_of_layers))
        .map(|l| root_effectivity[l] * root_density_per_layer[l])
        .sum();

    let mut transpiration = vec![0.0; number_of_layers];
    for layer in 0..number_of_layers {
        transpiration[layer] = if layer > active_limit || total_root_effectivity == 0.0 {
            0.0
        } else {
            potential_transpiration_mm * (root_effectivity[layer] * root_density_per_layer[layer])
                / total_root_effectivity
                * oxygen_deficit
        };
    }

    let mut remaining_total_effectivity = total_root_effectivity;
    for layer in 0..active_limit.min(number_of_layers) {
        remaining_total_effectivity -= root_effectivity[layer] * root_density_per_layer[layer];
        if remaining_total_effectivity <= 0.0 {
            remaining_total_effectivity = 0.00001;
        }

        let layer_demand_m3_m3 = (transpiration[layer] / 1000.0) / layer_thickness_m;
        let layer_available_m3_m3 = soil_moisture[layer] - permanent_wilting_point[layer];

        let potential_deficit_mm = if layer_demand_m3_m3 > layer_available_m3_m3 {
            ((layer_demand_m3_m3 - layer_available_m3_m3) * layer_thickness_m * 1000.0)
                .max(0.0)
                .min(transpiration[layer])
        } else {
            0.0
        };

        let transpiration_redux = layer_redux_and_effectivity(
            ((soil_moisture[layer] - permanent_wilting_point[layer])
                / (field_capacity[layer] - permanent_wilting_point[layer]).max(1e-9))
            .max(0.0),
        )
        .0;
        let reduced_transpiration = transpiration[layer] * (1.0 - transpiration_redux);
        let actual_deficit = reduced_transpiration.max(potential_deficit_mm);

        if actual_deficit > 0.0 {
            for later_layer in (layer + 1)..active_limit.min(number_of_layers) {
                transpiration[later_layer] += actual_deficit
                    * (root_effectivity[later_layer] * root_density_per_layer[later_layer]
                        / remaining_total_effectivity);
            }
        }

        transpiration[layer] = (transpiration[layer] - actual_deficit).max(0.0);
    }

    transpiration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stomatal_resistance_fully_closed_without_photosynthesis() {
        let r = stomatal_resistance(0.0, 400.0, 0.5, 3.5, 0.06, CarboxylationPathway::C3);
        assert_eq!(r, 999_999.9);
    }

    #[test]
    fn stomatal_resistance_positive_with_photosynthesis() {
        let r = stomatal_resistance(0.5, 400.0, 0.5, 3.5, 0.06, CarboxylationPathway::C3);
        assert!(r > 0.0);
    }

    #[test]
    fn reference_evapotranspiration_is_positive_under_typical_summer_conditions() {
        let et0 = reference_evapotranspiration(
            50.0, 28.0, 15.0, 0.6, 21.5, 2.0, 20.0, 400.0, 0.5, 30.0, 3.5, 0.06, 0.23, CarboxylationPathway::C3,
        );
        assert!(et0 > 0.0);
    }

    #[test]
    fn interception_capped_by_available_precipitation() {
        let (net, storage) = interception(1.0, 0.8, 0.0, 0.5);
        assert_eq!(net, 0.0);
        assert_eq!(storage, 0.5);
    }

    #[test]
    fn interception_zero_without_precipitation() {
        let (net, storage) = interception(1.0, 0.8, 0.0, 0.0);
        assert_eq!(net, 0.0);
        assert_eq!(storage, 0.0);
    }

    #[test]
    fn evaporate_interception_drains_storage_before_transpiration() {
        let (remaining, storage, evaporated) = evaporate_interception(1.0, 3.0);
        assert_eq!(storage, 0.0);
        assert_eq!(evaporated, 1.0);
        assert_eq!(remaining, 2.0);
    }

    #[test]
    fn layer_redux_full_above_three_quarters_available_water() {
        let (redux, effectivity) = layer_redux_and_effectivity(0.9);
        assert_eq!(redux, 1.0);
        assert_eq!(effectivity, 1.0);
    }

    #[test]
    fn layer_redux_reduced_near_wilting_point() {
        let (redux, effectivity) = layer_redux_and_effectivity(0.05);
        assert!(redux < 1.0);
        assert!(effectivity < 1.0);
    }

    #[test]
    fn distribute_transpiration_sums_close_to_potential_under_ample_water() {
        let density = vec![300.0, 300.0, 300.0];
        let fc = vec![0.3, 0.3, 0.3];
        let pwp = vec![0.1, 0.1, 0.1];
        let moisture = vec![0.28, 0.28, 0.28];
        let transpiration = distribute_transpiration(3.0, 3, None, &density, &fc, &pwp, &moisture, 0.2, 2.0, 1.0);
        let total: f64 = transpiration.iter().sum();
        assert!(total > 0.0);
        assert!(total <= 3.0 + 1e-6);
    }

    #[test]
    fn distribute_transpiration_zero_below_groundwater_table() {
        let density = vec![300.0, 300.0, 300.0];
        let fc = vec![0.3, 0.3, 0.3];
        let pwp = vec![0.1, 0.1, 0.1];
        let moisture = vec![0.28, 0.28, 0.28];
        let transpiration =
            distribute_transpiration(3.0, 3, Some(1), &density, &fc, &pwp, &moisture, 0.2, 2.0, 1.0);
        assert_eq!(transpiration[2], 0.0);
    }
}
