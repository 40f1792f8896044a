//! Ozone uptake and assimilation/senescence impact, ported directly from
//! `O3-impact.cpp` (Ewert & Porter 2000; Raes et al. 2009).
//!
//! Operates hourly inside the FvCB photosynthesis path
//! ([`crate::photosynthesis::fvcb`]); the daily Penman-style path does not
//! call this module, since O3 reduction acts on the rubisco-limited rate,
//! which only exists in the FvCB path.

/// Tunable ozone-damage coefficients (`O3impact::O3_impact_params`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct O3ImpactParams {
    /// Short-term damage coefficient, unitless.
    pub gamma1: f64,
    /// Short-term damage coefficient [nmol m⁻² s⁻¹].
    pub gamma2: f64,
    /// Long-term (senescence) damage coefficient [(µmol m⁻²)⁻¹].
    pub gamma3: f64,
    pub upper_threshold_stomatal: f64,
    pub lower_threshold_stomatal: f64,
    pub shape_stomatal: f64,
}

impl Default for O3ImpactParams {
    fn default() -> Self {
        O3ImpactParams {
            gamma1: 0.060,
            gamma2: 0.0045,
            gamma3: 0.5,
            upper_threshold_stomatal: 0.4,
            lower_threshold_stomatal: 1.0,
            shape_stomatal: 2.5,
        }
    }
}

/// Hourly inputs to the ozone-impact model (`O3impact::O3_impact_in`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct O3ImpactInput {
    pub field_capacity: f64,
    pub wilting_point: f64,
    pub soil_water_content: f64,
    /// Reference evapotranspiration [mm/d].
    pub et0: f64,
    /// Ambient O3 partial pressure [nbar or nmol/mol].
    pub o3_ambient: f64,
    /// Stomatal conductance [mol m⁻² s⁻¹ bar⁻¹].
    pub stomatal_conductance: f64,
    /// Hour of day, 0-23.
    pub hour: u32,
    pub relative_development: f64,
    /// Cumulative effective temperature from emergence to flowering.
    pub gdd_flowering: f64,
    /// Cumulative effective temperature from emergence to maturity.
    pub gdd_maturity: f64,
    /// Short-term Ac reduction from the previous time step.
    pub f_o3s_previous: f64,
    /// Cumulative O3 uptake so far [µmol/m²].
    pub sum_o3_uptake: f64,
}

/// Hourly outputs (`O3impact::O3_impact_out`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct O3ImpactOutput {
    /// Hourly O3 uptake [µmol m⁻² h⁻¹].
    pub hourly_o3_uptake: f64,
    /// Short-term reduction of Ac.
    pub f_o3s_day: f64,
    /// Long-term senescence factor.
    pub f_o3l: f64,
    /// Leaf-senescence reduction of Ac.
    pub f_ls: f64,
    /// Water-deficit stomatal-closure factor.
    pub water_stress_stomatal_closure: f64,
}

/// `O3_uptake` — Ewert & Porter 2000.
pub fn o3_uptake(o3_ambient: f64, stomatal_conductance: f64, f_ws: f64) -> f64 {
    let f_do3 = 0.93; // ratio of diffusion rates for O3 and CO2
    o3_ambient * stomatal_conductance * f_ws * f_do3
}

/// `hourly_O3_reduction_Ac`.
pub fn hourly_reduction_ac(o3_uptake: f64, gamma1: f64, gamma2: f64) -> f64 {
    if o3_uptake > gamma1 / gamma2 && o3_uptake < (1.0 + gamma1) / gamma2 {
        1.0 + gamma1 - gamma2 * o3_uptake
    } else if o3_uptake > (1.0 + gamma1) / gamma2 {
        0.0
    } else {
        1.0
    }
}

/// `cumulative_O3_reduction_Ac`. At hour 0, resets to `f_o3s_hourly *
/// recovery`; otherwise multiplies into the running daily product.
pub fn cumulative_reduction_ac(f_o3s_previous: f64, f_o3s_hourly: f64, recovery: f64, hour: u32) -> f64 {
    if hour == 0 {
        f_o3s_hourly * recovery
    } else {
        f_o3s_previous * f_o3s_hourly
    }
}

/// `O3_damage_recovery`.
pub fn damage_recovery(f_o3s_previous: f64, f_leaf_age: f64) -> f64 {
    f_o3s_previous + (1.0 - f_o3s_previous) * f_leaf_age
}

/// `O3_recovery_factor_leaf_age`. Young leaves (`relative_development <=
/// 0.2`) recover fully from O3 damage; recovery capacity falls linearly to
/// zero at full development.
pub fn recovery_factor_leaf_age(relative_development: f64) -> f64 {
    let critical_reldev = 0.2;
    if relative_development > critical_reldev {
        (1.0 - (relative_development - critical_reldev) / (1.0 - critical_reldev)).max(0.0)
    } else {
        1.0
    }
}

/// `O3_senescence_factor`. `0.5` is the model's floor, not derived.
pub fn senescence_factor(gamma3: f64, cumulative_uptake: f64) -> f64 {
    (1.0 - gamma3 * cumulative_uptake).max(0.5)
}

/// `leaf_senescence_reduction_Ac`. Senescence is assumed to start at
/// flowering under normal conditions; cumulative O3 uptake brings the
/// onset forward (`f_o3l` scales `critical_reldev`) and steepens the rate.
pub fn leaf_senescence_reduction(
    f_o3l: f64,
    relative_development: f64,
    gdd_flowering: f64,
    gdd_maturity: f64,
) -> f64 {
    let critical_reldev = (gdd_flowering / gdd_maturity) * f_o3l;
    let senescence_impact_max: f64 = 0.4;
    if relative_development > critical_reldev {
        (1.0 - senescence_impact_max).max(
            1.0 - senescence_impact_max * (relative_development - critical_reldev)
                / (f_o3l - critical_reldev),
        )
    } else {
        1.0
    }
}

/// `water_stress_stomatal_closure` (Raes et al. 2009, AquaCrop-like
/// depletion curve with an ET0-adjusted upper threshold).
pub fn water_stress_stomatal_closure(
    upper_threshold: f64,
    lower_threshold: f64,
    shape: f64,
    field_capacity: f64,
    wilting_point: f64,
    soil_water_content: f64,
    et0: f64,
) -> f64 {
    let upper_threshold_adj = (upper_threshold + (0.04 * (5.0 - et0)) * (10.0 - 9.0 * upper_threshold).log10())
        .clamp(0.0, 1.0);
    let whc_adj = lower_threshold - upper_threshold_adj;

    let depletion = if soil_water_content >= field_capacity {
        0.0
    } else if soil_water_content <= wilting_point {
        1.0
    } else {
        1.0 - (soil_water_content - wilting_point) / (field_capacity - wilting_point)
    };

    let d_rel = if depletion <= upper_threshold_adj {
        0.0
    } else if depletion >= lower_threshold {
        1.0
    } else {
        (depletion - upper_threshold_adj) / whc_adj
    };

    1.0 - ((d_rel * shape).exp() - 1.0) / (shape.exp() - 1.0)
}

/// Composes the hourly O3 impact model end to end
/// (`O3impact::O3_impact_hourly`).
pub fn o3_impact_hourly(
    input: O3ImpactInput,
    params: O3ImpactParams,
    water_deficit_response_stomata: bool,
) -> O3ImpactOutput {
    let f_leaf_age = recovery_factor_leaf_age(input.relative_development);
    let recovery = damage_recovery(input.f_o3s_previous, f_leaf_age);

    let water_stress_stomatal_closure = if water_deficit_response_stomata {
        water_stress_stomatal_closure(
            params.upper_threshold_stomatal,
            params.lower_threshold_stomatal,
            params.shape_stomatal,
            input.field_capacity,
            input.wilting_point,
            input.soil_water_content,
            input.et0,
        )
    } else {
        1.0
    };

    let instantaneous_uptake = o3_uptake(
        input.o3_ambient,
        input.stomatal_conductance,
        water_stress_stomatal_closure,
    );
    let hourly_o3_uptake = instantaneous_uptake / 1000.0; // nmol -> µmol

    let f_o3s_hourly = hourly_reduction_ac(instantaneous_uptake, params.gamma1, params.gamma2);
    let f_o3s_day = cumulative_reduction_ac(input.f_o3s_previous, f_o3s_hourly, recovery, input.hour);

    let f_o3l = senescence_factor(params.gamma3, input.sum_o3_uptake);
    let f_ls = leaf_senescence_reduction(f_o3l, input.relative_development, input.gdd_flowering, input.gdd_maturity);

    O3ImpactOutput {
        hourly_o3_uptake,
        f_o3s_day,
        f_o3l,
        f_ls,
        water_stress_stomatal_closure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_ozone_gives_no_short_term_damage() {
        let out = hourly_reduction_ac(0.0, 0.060, 0.0045);
        assert_eq!(out, 1.0);
    }

    #[test]
    fn high_ozone_uptake_fully_suppresses_ac() {
        let out = hourly_reduction_ac(1000.0, 0.060, 0.0045);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn senescence_factor_floors_at_one_half() {
        let f = senescence_factor(0.5, 10_000.0);
        assert_eq!(f, 0.5);
    }

    #[test]
    fn senescence_factor_is_one_with_zero_uptake() {
        assert_eq!(senescence_factor(0.5, 0.0), 1.0);
    }

    #[test]
    fn young_leaves_recover_fully_from_o3_damage() {
        assert_eq!(recovery_factor_leaf_age(0.1), 1.0);
    }

    #[test]
    fn old_leaves_have_reduced_recovery_capacity() {
        let f = recovery_factor_leaf_age(0.9);
        assert!(f < 1.0 && f >= 0.0);
    }

    #[test]
    fn constant_ozone_exposure_increases_cumulative_uptake_each_hour() {
        let params = O3ImpactParams::default();
        let mut sum_uptake = 0.0;
        let mut f_o3s_previous = 1.0;
        for hour in 0..24 {
            let input = O3ImpactInput {
                field_capacity: 0.3,
                wilting_point: 0.1,
                soil_water_content: 0.25,
                et0: 4.0,
                o3_ambient: 60.0,
                stomatal_conductance: 0.3,
                hour,
                relative_development: 0.5,
                gdd_flowering: 800.0,
                gdd_maturity: 1600.0,
                f_o3s_previous,
                sum_o3_uptake: sum_uptake,
            };
            let out = o3_impact_hourly(input, params, false);
            assert!(out.f_o3s_day <= 1.0);
            sum_uptake += out.hourly_o3_uptake;
            f_o3s_previous = out.f_o3s_day;
        }
        assert!(sum_uptake > 0.0);
    }

    #[test]
    fn zero_ambient_ozone_still_allows_senescence_reduction_to_act() {
        let params = O3ImpactParams::default();
        let input = O3ImpactInput {
            field_capacity: 0.3,
            wilting_point: 0.1,
            soil_water_content: 0.25,
            et0: 4.0,
            o3_ambient: 0.0,
            stomatal_conductance: 0.3,
            hour: 0,
            relative_development: 0.9,
            gdd_flowering: 800.0,
            gdd_maturity: 1000.0,
            f_o3s_previous: 1.0,
            sum_o3_uptake: 0.0,
        };
        let out = o3_impact_hourly(input, params, false);
        assert!(out.f_ls <= 1.0);
    }
}
