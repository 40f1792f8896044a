//! Radiation geometry, ported from `CropGrowth::fc_Radiation`.
//!
//! Declination, astronomic/effective/photoperiodic day length, mean PAR,
//! clear-day/overcast-day radiation, extraterrestrial radiation, and the
//! global-radiation fallback from sunshine hours. All `asin`/`acos`
//! arguments are clamped to avoid domain errors from rounding drift.

use crate::error::clamp_trig_arg;
use std::f64::consts::PI;

/// Outputs of the daily radiation-geometry calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationGeometry {
    /// Solar declination [°].
    pub declination_deg: f64,
    /// Astronomic (sun above horizon) day length [h].
    pub astronomic_day_length_h: f64,
    /// Effective day length (sun disc center 8° below horizon) [h].
    pub effective_day_length_h: f64,
    /// Photoperiodic day length (civil twilight, 6° below horizon) [h].
    pub photoperiodic_day_length_h: f64,
    /// Mean photosynthetically active radiation [J m⁻²].
    pub par_mean_j_m2: f64,
    /// Clear-day radiation [J m⁻²].
    pub clear_day_radiation_j_m2: f64,
    /// Overcast-day radiation [J m⁻²].
    pub overcast_day_radiation_j_m2: f64,
    /// Extraterrestrial radiation [MJ m⁻²].
    pub extraterrestrial_radiation_mj_m2: f64,
    /// Global radiation used for the day [MJ m⁻² d⁻¹] — the measured value
    /// when present, otherwise derived from sunshine hours.
    pub global_radiation_mj_m2: f64,
}

/// Computes the day's radiation geometry.
///
/// `measured_global_radiation` takes priority; when absent,
/// `sunshine_hours` drives the Angstrom-style fallback
/// `ext * (0.19 + 0.55 * sunshine / astronomic_day_length)`.
pub fn compute(
    julian_day: f64,
    latitude_deg: f64,
    measured_global_radiation: Option<f64>,
    sunshine_hours: f64,
) -> RadiationGeometry {
    let declination_deg = -23.4 * (2.0 * PI * ((julian_day + 10.0) / 365.0)).cos();
    let declination_rad = declination_deg * PI / 180.0;
    let latitude_rad = latitude_deg * PI / 180.0;

    let sin_ld = declination_rad.sin() * latitude_rad.sin();
    let cos_ld = declination_rad.cos() * latitude_rad.cos();

    let astronomic_day_length_h =
        12.0 * (PI + 2.0 * clamp_trig_arg(sin_ld / cos_ld).asin()) / PI;

    let edl_helper = (-(8.0_f64 * PI / 180.0).sin() + sin_ld) / cos_ld;
    let effective_day_length_h = if !(-1.0..=1.0).contains(&edl_helper) {
        0.01
    } else {
        12.0 * (PI + 2.0 * edl_helper.asin()) / PI
    };

    let photoperiodic_helper = (-(-6.0_f64 * PI / 180.0).sin() + sin_ld) / cos_ld;
    let photoperiodic_day_length_h =
        12.0 * (PI + 2.0 * clamp_trig_arg(photoperiodic_helper).asin()) / PI;

    let par_mean_j_m2 = 3600.0
        * (sin_ld * astronomic_day_length_h
            + 24.0 / PI * cos_ld * (1.0 - (sin_ld / cos_ld).powi(2)).max(0.0).sqrt());

    let clear_day_radiation_j_m2 = 0.5
        * 1300.0
        * par_mean_j_m2
        * (-0.14 / (par_mean_j_m2 / (astronomic_day_length_h * 3600.0))).exp();

    let overcast_day_radiation_j_m2 = 0.2 * clear_day_radiation_j_m2;

    let solar_constant = 0.082_f64; // MJ m-2 d-1
    let sc = 24.0 * 60.0 / PI * solar_constant * (1.0 + 0.033 * (2.0 * PI * julian_day / 365.0).cos());
    let sunset_solar_angle =
        clamp_trig_arg(-(latitude_rad.tan()) * declination_rad.tan()).acos();
    let extraterrestrial_radiation_mj_m2 =
        sc * (sunset_solar_angle * sin_ld + cos_ld * sunset_solar_angle.sin());

    let global_radiation_mj_m2 = match measured_global_radiation {
        Some(g) if g > 0.0 => g,
        _ => extraterrestrial_radiation_mj_m2 * (0.19 + 0.55 * sunshine_hours / astronomic_day_length_h),
    };

    RadiationGeometry {
        declination_deg,
        astronomic_day_length_h,
        effective_day_length_h,
        photoperiodic_day_length_h,
        par_mean_j_m2,
        clear_day_radiation_j_m2,
        overcast_day_radiation_j_m2,
        extraterrestrial_radiation_mj_m2,
        global_radiation_mj_m2,
    }
}

/// Day-length factor gating phenology.
///
/// Long-day species (`requirement_h > 0`) accelerate with increasing
/// photoperiod; short-day species (`requirement_h < 0`) accelerate with
/// increasing night length. Result clamped to `[0,1]`.
pub fn day_length_factor(
    requirement_h: f64,
    effective_day_length_h: f64,
    photoperiodic_day_length_h: f64,
    base_day_length_h: f64,
) -> f64 {
    let factor = if requirement_h > 0.0 {
        (photoperiodic_day_length_h - base_day_length_h) / (requirement_h - base_day_length_h)
    } else if requirement_h < 0.0 {
        let critical_day_length = -requirement_h;
        let maximum_day_length = -base_day_length_h;
        if effective_day_length_h <= critical_day_length {
            1.0
        } else {
            (effective_day_length_h - maximum_day_length) / (critical_day_length - maximum_day_length)
        }
    } else {
        1.0
    };

    factor.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summer_solstice_has_longer_day_than_winter_solstice_in_northern_hemisphere() {
        let summer = compute(172.0, 52.0, None, 10.0);
        let winter = compute(355.0, 52.0, None, 2.0);
        assert!(summer.astronomic_day_length_h > winter.astronomic_day_length_h);
    }

    #[test]
    fn measured_global_radiation_takes_priority_over_sunshine_fallback() {
        let g = compute(180.0, 52.0, Some(20.0), 0.0);
        assert_eq!(g.global_radiation_mj_m2, 20.0);
    }

    #[test]
    fn sunshine_fallback_used_when_no_measurement() {
        let g = compute(180.0, 52.0, None, 8.0);
        assert!(g.global_radiation_mj_m2 > 0.0);
        assert!(g.global_radiation_mj_m2 < g.extraterrestrial_radiation_mj_m2);
    }

    #[test]
    fn day_length_factor_long_day_clamped_to_unit_interval() {
        let f = day_length_factor(20.0, 16.0, 18.0, 6.0);
        assert!((0.0..=1.0).contains(&f));
    }

    #[test]
    fn day_length_factor_short_day_returns_one_below_critical() {
        let f = day_length_factor(-10.0, 8.0, 9.0, 6.0);
        assert_eq!(f, 1.0);
    }

    #[test]
    fn day_length_factor_neutral_when_requirement_zero() {
        assert_eq!(day_length_factor(0.0, 12.0, 12.0, 6.0), 1.0);
    }

    #[test]
    fn equatorial_latitude_never_panics_on_trig_domain() {
        // cos_ld can be tiny near the poles; this just must not panic/NaN.
        let g = compute(1.0, 89.9, None, 0.0);
        assert!(g.astronomic_day_length_h.is_finite());
    }
}
