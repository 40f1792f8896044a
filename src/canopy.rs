//! Crop size, green area/LAI, and soil coverage, ported from
//! `CropGrowth::fc_CropSize`, `fc_CropGreenArea`, and `fc_SoilCoverage`.

use std::f64::consts::PI;

/// Crop height, diameter, leaf area index, and derived soil coverage for
/// one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyState {
    pub height_m: f64,
    pub diameter_m: f64,
    pub leaf_area_index: f64,
    pub green_area_index: f64,
    pub soil_coverage: f64,
}

impl CanopyState {
    pub fn initial(leaf_area_index: f64) -> Self {
        CanopyState {
            height_m: 0.0,
            diameter_m: 0.0,
            leaf_area_index: leaf_area_index.max(0.001),
            green_area_index: leaf_area_index.max(0.001),
            soil_coverage: soil_coverage(leaf_area_index.max(0.001)),
        }
    }
}

/// Sigmoidal height growth and linear diameter growth driven by the
/// fraction of cumulative temperature sum reached relative to each trait's
/// target stage (`fc_CropSize`).
///
/// `stage_temperature_sums` is indexed by stage, stage 0 excluded from the
/// summation (matching the source's `i_Stage = 1` start).
pub fn crop_size(
    max_crop_height_m: f64,
    max_crop_diameter_m: f64,
    stage_at_max_height: usize,
    stage_at_max_diameter: usize,
    stage_temperature_sums: &[f64],
    current_total_temperature_sum: f64,
    height_p1: f64,
    height_p2: f64,
) -> (f64, f64) {
    let sum_to = |upto_stage: usize| -> f64 {
        stage_temperature_sums
            .iter()
            .enumerate()
            .filter(|&(i, _)| i >= 1 && i <= upto_stage)
            .map(|(_, &v)| v)
            .sum()
    };

    let total_for_height = sum_to(stage_at_max_height);
    let total_for_diameter = sum_to(stage_at_max_diameter);

    let relative_height = if total_for_height > 0.0 {
        (current_total_temperature_sum / total_for_height).min(1.0)
    } else {
        0.0
    };
    let relative_diameter = if total_for_diameter > 0.0 {
        (current_total_temperature_sum / total_for_diameter).min(1.0)
    } else {
        0.0
    };

    let height = if relative_height > 0.0 {
        max_crop_height_m / (1.0 + (-height_p1 * (relative_height - height_p2)).exp())
    } else {
        0.0
    };

    let diameter = if relative_diameter > 0.0 {
        max_crop_diameter_m * relative_diameter
    } else {
        0.0
    };

    (height, diameter)
}

/// Updates leaf area index from the day's leaf-biomass growth/senescence
/// increments and derives green area index from LAI plus the crop's
/// cylindrical side-area contribution (`fc_CropGreenArea`).
///
/// Floors LAI at `0.001` rather than letting it reach exactly zero.
#[allow(clippy::too_many_arguments)]
pub fn update_green_area(
    current_leaf_area_index: f64,
    leaf_biomass_increment: f64,
    leaf_biomass_decrement: f64,
    crop_height_m: f64,
    crop_diameter_m: f64,
    specific_leaf_area_start: f64,
    specific_leaf_area_end: f64,
    specific_leaf_area_early: f64,
    stage_temperature_sum: f64,
    current_stage_temperature_sum: f64,
    plant_density_m2: f64,
    time_step_days: f64,
) -> (f64, f64) {
    let sla = if stage_temperature_sum > 0.0 {
        specific_leaf_area_start
            + (current_stage_temperature_sum / stage_temperature_sum)
                * (specific_leaf_area_end - specific_leaf_area_start)
    } else {
        specific_leaf_area_start
    };

    let mut leaf_area_index = current_leaf_area_index
        + (leaf_biomass_increment * sla * time_step_days)
        - (leaf_biomass_decrement * specific_leaf_area_early * time_step_days);

    if leaf_area_index <= 0.0 {
        leaf_area_index = 0.001;
    }

    let green_area_index =
        leaf_area_index + (crop_height_m * PI * crop_diameter_m * plant_density_m2);

    (leaf_area_index, green_area_index)
}

/// Fraction of soil shaded by the canopy, a Beer's-law-style function of
/// LAI alone (`fc_SoilCoverage`). This is a work-around inherited from the
/// HERMES model, not a first-principles row-geometry calculation: it
/// ignores inter-row spacing.
pub fn soil_coverage(leaf_area_index: f64) -> f64 {
    1.0 - (-0.5 * leaf_area_index).exp()
}
