//! Temperature-sum phenology, vernalisation, and the Kc-factor
//! interpolation.
//!
//! Ported from `CropGrowth::fc_CropDevelopmentalStage` and
//! `fc_VernalisationFactor`. Stage-conditional dispatch is modeled here as
//! two free functions — [`step_pre_emergence`] and [`step_post_emergence`]
//! — rather than a trait-object state machine, since
//! [`crate::crop_module::CropModule`] already holds the single piece of
//! state (`stage: usize`) the dispatch needs and a trait would only
//! relocate that field without removing the branch.

/// Gate controlling whether pre-emergence temperature accrual additionally
/// requires adequate soil moisture and/or absence of surface ponding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmergenceControl {
    pub moisture_control: bool,
    pub flooding_control: bool,
}

/// Outcome of one day's phenology update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhenologyStep {
    pub stage: usize,
    pub stage_temperature_sum: f64,
    pub total_temperature_sum: f64,
    /// `true` exactly on the day the stage advanced (any transition,
    /// including a perennial's stage N-1 -> 0 reset).
    pub stage_advanced: bool,
    /// `true` only when this reset is a perennial's end-of-cycle restart.
    pub perennial_reset: bool,
}

/// Advances stage-0 (pre-emergence) phenology for one day (annual branch of
/// `fc_CropDevelopmentalStage`). For perennials, stage 0 uses air
/// temperature scaled by vernalisation/day-length, matching the source's
/// perennial branch; see [`step_perennial_stage_zero`].
pub fn step_pre_emergence(
    current_stage_sum: f64,
    stage_temperature_sum_target: f64,
    soil_temperature_c: f64,
    base_temperature_c: f64,
    soil_moisture_m3: f64,
    field_capacity: f64,
    permanent_wilting_point: f64,
    surface_water_storage_mm: f64,
    control: EmergenceControl,
) -> PhenologyStep {
    if soil_temperature_c <= base_temperature_c {
        return PhenologyStep {
            stage: 0,
            stage_temperature_sum: current_stage_sum,
            total_temperature_sum: current_stage_sum,
            stage_advanced: false,
            perennial_reset: false,
        };
    }

    let capillary_water = (field_capacity - permanent_wilting_point).max(0.0);
    let moisture_ok =
        !control.moisture_control || soil_moisture_m3 > (0.2 * capillary_water) + permanent_wilting_point;
    let flooding_ok = !control.flooding_control || surface_water_storage_mm < 0.001;

    if !(moisture_ok && flooding_ok) {
        return PhenologyStep {
            stage: 0,
            stage_temperature_sum: current_stage_sum,
            total_temperature_sum: current_stage_sum,
            stage_advanced: false,
            perennial_reset: false,
        };
    }

    let new_sum = current_stage_sum + (soil_temperature_c - base_temperature_c);
    if new_sum >= stage_temperature_sum_target {
        PhenologyStep {
            stage: 1,
            stage_temperature_sum: new_sum - stage_temperature_sum_target,
            total_temperature_sum: new_sum,
            stage_advanced: true,
            perennial_reset: false,
        }
    } else {
        PhenologyStep {
            stage: 0,
            stage_temperature_sum: new_sum,
            total_temperature_sum: new_sum,
            stage_advanced: false,
            perennial_reset: false,
        }
    }
}

/// Advances a perennial's stage-0 phenology, driven by air temperature and
/// scaled by vernalisation/day-length factors rather than soil moisture
/// gating.
pub fn step_perennial_stage_zero(
    current_stage_sum: f64,
    stage_temperature_sum_target: f64,
    mean_air_temperature_c: f64,
    base_temperature_c: f64,
    optimum_temperature_c: f64,
    vernalisation_factor: f64,
    day_length_factor: f64,
    number_of_stages: usize,
) -> PhenologyStep {
    let bounded_t = mean_air_temperature_c.min(optimum_temperature_c);
    let increment = if mean_air_temperature_c > base_temperature_c {
        (bounded_t - base_temperature_c) * vernalisation_factor * day_length_factor
    } else {
        0.0
    };
    let new_sum = current_stage_sum + increment;

    if new_sum >= stage_temperature_sum_target && number_of_stages > 1 {
        PhenologyStep {
            stage: 1,
            stage_temperature_sum: new_sum,
            total_temperature_sum: new_sum,
            stage_advanced: true,
            perennial_reset: false,
        }
    } else {
        PhenologyStep {
            stage: 0,
            stage_temperature_sum: new_sum,
            total_temperature_sum: new_sum,
            stage_advanced: false,
            perennial_reset: false,
        }
    }
}

/// Advances post-emergence phenology (stage >= 1) for one day
/// (`fc_CropDevelopmentalStage`'s `vc_DevelopmentalStage > 0` branch).
///
/// `stress_acceleration` is `max(N-stress accel, water-stress accel)`,
/// pre-computed by the caller since it depends on crop N redux and
/// transpiration deficit, which live on
/// [`crate::crop_module::CropModule`] rather than in this pure module.
#[allow(clippy::too_many_arguments)]
pub fn step_post_emergence(
    stage: usize,
    current_stage_sum: f64,
    current_total_sum: f64,
    stage_temperature_sum_target: f64,
    mean_air_temperature_c: f64,
    base_temperature_c: f64,
    optimum_temperature_c: f64,
    vernalisation_factor: f64,
    day_length_factor: f64,
    stress_acceleration: f64,
    cutting_delay_days: u32,
    number_of_stages: usize,
    is_perennial: bool,
    growth_cycle_ended: bool,
) -> PhenologyStep {
    let increment = if cutting_delay_days > 0 {
        // Temperature accrual is suppressed during the post-cut delay;
        // the stage sum is held at zero rather than merely not
        // incremented, matching the source exactly.
        return PhenologyStep {
            stage,
            stage_temperature_sum: 0.0,
            total_temperature_sum: current_total_sum,
            stage_advanced: false,
            perennial_reset: false,
        };
    } else if mean_air_temperature_c > base_temperature_c {
        let bounded_t = mean_air_temperature_c.min(optimum_temperature_c);
        (bounded_t - base_temperature_c) * vernalisation_factor * day_length_factor * stress_acceleration
    } else {
        0.0
    };

    let new_stage_sum = current_stage_sum + increment;
    let new_total_sum = current_total_sum + increment;

    if new_stage_sum >= stage_temperature_sum_target {
        let excess = new_stage_sum - stage_temperature_sum_target;
        if stage < number_of_stages - 1 {
            PhenologyStep {
                stage: stage + 1,
                stage_temperature_sum: excess,
                total_temperature_sum: new_total_sum,
                stage_advanced: true,
                perennial_reset: false,
            }
        } else if is_perennial && growth_cycle_ended {
            PhenologyStep {
                stage: 0,
                stage_temperature_sum: 0.0,
                total_temperature_sum: 0.0,
                stage_advanced: true,
                perennial_reset: true,
            }
        } else {
            PhenologyStep {
                stage,
                stage_temperature_sum: stage_temperature_sum_target,
                total_temperature_sum: new_total_sum,
                stage_advanced: false,
                perennial_reset: false,
            }
        }
    } else {
        PhenologyStep {
            stage,
            stage_temperature_sum: new_stage_sum,
            total_temperature_sum: new_total_sum,
            stage_advanced: false,
            perennial_reset: false,
        }
    }
}

/// Piecewise effective vernalisation per °C (`fc_VernalisationFactor`).
fn effective_vernalisation(mean_air_temperature_c: f64) -> f64 {
    let t = mean_air_temperature_c;
    if t > -4.0 && t <= 0.0 {
        (t + 4.0) / 4.0
    } else if t > 0.0 && t <= 3.0 {
        1.0
    } else if t > 3.0 && t <= 7.0 {
        1.0 - (0.2 * (t - 3.0) / 4.0)
    } else if t > 7.0 && t <= 9.0 {
        0.8 - (0.4 * (t - 7.0) / 2.0)
    } else if t > 9.0 && t <= 18.0 {
        0.4 - (0.4 * (t - 9.0) / 9.0)
    } else {
        // t <= -4.0 || t > 18.0
        0.0
    }
}

/// Updates accumulated vernalisation days and the vernalisation factor.
/// Returns `(factor, updated_vernalisation_days)`.
/// A `requirement` of `0.0` means vernalisation is not required; factor is
/// always `1.0` in that case.
pub fn vernalisation_factor(
    mean_air_temperature_c: f64,
    requirement: f64,
    vernalisation_days: f64,
) -> (f64, f64) {
    if requirement == 0.0 {
        return (1.0, vernalisation_days);
    }

    let effective = effective_vernalisation(mean_air_temperature_c);
    let days = vernalisation_days + effective;
    let threshold = requirement.min(9.0) - 1.0;

    let factor = if threshold >= 1.0 {
        ((days - threshold) / (requirement - threshold)).max(0.0)
    } else {
        1.0
    };

    (factor, days)
}

/// Linear interpolation of the crop coefficient within the current stage
/// (`fc_KcFactor`).
pub fn kc_factor(
    stage: usize,
    stage_temperature_sum_target: f64,
    current_stage_temperature_sum: f64,
    initial_kc_factor: f64,
    stage_kc_factor: f64,
    earlier_stage_kc_factor: f64,
) -> f64 {
    let relative_development = if stage_temperature_sum_target == 0.0 {
        0.0
    } else {
        (current_stage_temperature_sum / stage_temperature_sum_target).min(1.0)
    };

    if stage == 0 {
        initial_kc_factor + (stage_kc_factor - initial_kc_factor) * relative_development
    } else {
        earlier_stage_kc_factor + (stage_kc_factor - earlier_stage_kc_factor) * relative_development
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_emergence_holds_at_stage_zero_below_base_temperature() {
        let step = step_pre_emergence(
            0.0, 50.0, 2.0, 5.0, 0.25, 0.3, 0.1, 0.0,
            EmergenceControl { moisture_control: true, flooding_control: true },
        );
        assert_eq!(step.stage, 0);
        assert!(!step.stage_advanced);
    }

    #[test]
    fn pre_emergence_blocked_by_insufficient_moisture() {
        let step = step_pre_emergence(
            0.0, 1.0, 15.0, 5.0, 0.05, 0.3, 0.1, 0.0,
            EmergenceControl { moisture_control: true, flooding_control: false },
        );
        assert_eq!(step.stage, 0);
        assert!((step.stage_temperature_sum - 0.0).abs() < 1e-9);
    }

    #[test]
    fn pre_emergence_blocked_by_surface_ponding() {
        let step = step_pre_emergence(
            0.0, 1.0, 15.0, 5.0, 0.25, 0.3, 0.1, 5.0,
            EmergenceControl { moisture_control: false, flooding_control: true },
        );
        assert_eq!(step.stage, 0);
    }

    #[test]
    fn pre_emergence_advances_to_stage_one_and_carries_excess() {
        let step = step_pre_emergence(
            9.0, 10.0, 15.0, 5.0, 0.25, 0.3, 0.1, 0.0,
            EmergenceControl { moisture_control: true, flooding_control: true },
        );
        assert_eq!(step.stage, 1);
        assert!(step.stage_advanced);
        assert!(step.stage_temperature_sum > 0.0);
    }

    #[test]
    fn post_emergence_stage_temperature_sum_zeroed_during_cut_delay() {
        let step = step_post_emergence(2, 50.0, 500.0, 100.0, 20.0, 5.0, 25.0, 1.0, 1.0, 1.0, 3, 5, false, false);
        assert_eq!(step.stage_temperature_sum, 0.0);
        assert_eq!(step.stage, 2);
    }

    #[test]
    fn post_emergence_advances_stage_and_carries_excess_temperature() {
        let step = step_post_emergence(1, 95.0, 200.0, 100.0, 20.0, 5.0, 25.0, 1.0, 1.0, 1.0, 0, 5, false, false);
        assert_eq!(step.stage, 2);
        assert!(step.stage_advanced);
    }

    #[test]
    fn post_emergence_perennial_resets_to_stage_zero_when_cycle_ended() {
        let step = step_post_emergence(4, 95.0, 2000.0, 100.0, 20.0, 5.0, 25.0, 1.0, 1.0, 1.0, 0, 5, true, true);
        assert_eq!(step.stage, 0);
        assert!(step.perennial_reset);
        assert_eq!(step.total_temperature_sum, 0.0);
    }

    #[test]
    fn post_emergence_final_stage_holds_without_perennial_reset() {
        let step = step_post_emergence(4, 95.0, 2000.0, 100.0, 20.0, 5.0, 25.0, 1.0, 1.0, 1.0, 0, 5, false, false);
        assert_eq!(step.stage, 4);
        assert!(!step.stage_advanced);
    }

    #[test]
    fn vernalisation_factor_is_one_when_no_requirement() {
        let (f, days) = vernalisation_factor(5.0, 0.0, 0.0);
        assert_eq!(f, 1.0);
        assert_eq!(days, 0.0);
    }

    #[test]
    fn vernalisation_factor_accumulates_toward_one() {
        let mut days = 0.0;
        let mut factor = 0.0;
        for _ in 0..60 {
            let (f, d) = vernalisation_factor(2.0, 50.0, days);
            factor = f;
            days = d;
        }
        assert!(factor > 0.0);
        assert!(factor <= 1.0);
    }

    #[test]
    fn vernalisation_factor_never_negative() {
        let (f, _) = vernalisation_factor(20.0, 50.0, 0.0);
        assert!(f >= 0.0);
    }

    #[test]
    fn kc_factor_interpolates_within_stage() {
        let kc = kc_factor(2, 200.0, 100.0, 0.3, 1.0, 0.6);
        assert!((kc - 0.8).abs() < 1e-9);
    }

    #[test]
    fn kc_factor_at_stage_zero_uses_initial_kc() {
        let kc = kc_factor(0, 100.0, 0.0, 0.3, 0.6, 0.0);
        assert!((kc - 0.3).abs() < 1e-9);
    }

    #[test]
    fn kc_factor_handles_zero_stage_sum_without_panicking() {
        let kc = kc_factor(1, 0.0, 0.0, 0.3, 1.0, 0.6);
        assert!((kc - 0.6).abs() < 1e-9);
    }
}
