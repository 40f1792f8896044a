//! Crop nitrogen stress, dilution-curve N concentrations, and per-layer
//! convective/diffusive N uptake, ported from `fc_CropNitrogen` and
//! `fc_CropNUptake`.

/// Critical (dilution-curve) shoot N concentration [kg N / kg dry matter]
/// (`fc_CropNitrogen`'s `vc_CriticalNConcentration`).
pub fn critical_n_concentration(
    n_concentration_pn: f64,
    n_concentration_b0: f64,
    aboveground_biomass_kg_ha: f64,
    belowground_biomass_kg_ha: f64,
) -> f64 {
    n_concentration_pn
        * (1.0 + n_concentration_b0 * (-0.26 * (aboveground_biomass_kg_ha + belowground_biomass_kg_ha) / 1000.0).exp())
        / 100.0
}

pub fn target_n_concentration(critical_n_concentration: f64, luxury_n_coefficient: f64) -> f64 {
    critical_n_concentration * luxury_n_coefficient
}

/// Root-N-shortage redux factor, a smoothstep-like curve between
/// `0.005` and `0.01` kg N/kg dry matter (`fc_CropNitrogen`'s
/// `vc_RootNRedux`).
pub fn root_n_redux(n_concentration_root: f64) -> f64 {
    if n_concentration_root < 0.01 {
        if n_concentration_root <= 0.005 {
            0.0
        } else {
            let helper = (n_concentration_root - 0.005) / 0.005;
            1.0 - (1.0 - helper * helper).sqrt()
        }
    } else {
        1.0
    }
}

/// Outcome of the shoot N-stress evaluation (`fc_CropNitrogen`'s second
/// half).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropNStatus {
    pub crop_n_redux: f64,
    /// N added to `n_concentration_aboveground_biomass` by biological
    /// fixation when it was below critical, `0.0` otherwise.
    pub fixed_n_concentration: f64,
    pub n_concentration_aboveground_biomass: f64,
}

/// Evaluates shoot N-stress and biological N fixation
/// (`fc_CropNitrogen`'s `pc_PartBiologicalNFixation` branch).
///
/// Legumes (`part_biological_n_fixation > 0.01`) short-circuit the stress
/// curve entirely: when below critical N they top up the concentration to
/// exactly critical and never experience N redux, since they fix their own
/// shortfall from atmospheric N2 rather than depending on soil supply.
pub fn crop_n_redux(
    n_concentration_aboveground_biomass: f64,
    critical_n_concentration: f64,
    minimum_n_concentration: f64,
    part_biological_n_fixation: f64,
    nitrogen_response_on: bool,
) -> CropNStatus {
    if !nitrogen_response_on {
        return CropNStatus {
            crop_n_redux: 1.0,
            fixed_n_concentration: 0.0,
            n_concentration_aboveground_biomass,
        };
    }

    if part_biological_n_fixation <= 0.01 {
        let crop_n_redux = if n_concentration_aboveground_biomass < critical_n_concentration {
            if n_concentration_aboveground_biomass <= minimum_n_concentration {
                0.0
            } else {
                let helper = (n_concentration_aboveground_biomass - minimum_n_concentration)
                    / (critical_n_concentration - minimum_n_concentration);
                1.0 - (minimum_n_concentration - 5.0 * helper).exp()
            }
        } else {
            1.0
        };
        CropNStatus {
            crop_n_redux,
            fixed_n_concentration: 0.0,
            n_concentration_aboveground_biomass,
        }
    } else if n_concentration_aboveground_biomass < critical_n_concentration {
        CropNStatus {
            crop_n_redux: 1.0,
            fixed_n_concentration: critical_n_concentration - n_concentration_aboveground_biomass,
            n_concentration_aboveground_biomass: critical_n_concentration,
        }
    } else {
        CropNStatus {
            crop_n_redux: 1.0,
            fixed_n_concentration: 0.0,
            n_concentration_aboveground_biomass,
        }
    }
}

/// Per-layer convective (mass-flow) and diffusive N uptake potentials
/// before demand allocation (`fc_CropNUptake`'s first loop).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerUptakePotential {
    pub convective_kg_m2: f64,
    pub diffusive_kg_m2: f64,
}

/// Computes one layer's convective/diffusive N-uptake potential.
///
/// `root_density_m_m3` and `root_diameter_m` are zero in layers the roots
/// have not yet reached, which correctly zeroes both terms without a
/// separate guard (`0.0.sqrt() == 0.0`).
pub fn layer_uptake_potential(
    transpiration_mm: f64,
    soil_no3_kg_m3: f64,
    soil_moisture_m3_m3: f64,
    tortuosity: f64,
    root_diameter_m: f64,
    root_density_m_m3: f64,
    time_step_days: f64,
) -> LayerUptakePotential {
    if soil_moisture_m3_m3 <= 0.0 {
        return LayerUptakePotential::default();
    }

    let convective_kg_m2 =
        (transpiration_mm / 1000.0) * (soil_no3_kg_m3 / soil_moisture_m3_m3) * time_step_days;

    let diffusion_coeff = 0.000214 * (tortuosity * (soil_moisture_m3_m3 * 10.0).exp()) / soil_moisture_m3_m3;

    let diffusive_raw = diffusion_coeff
        * soil_moisture_m3_m3
        * 2.0
        * std::f64::consts::PI
        * root_diameter_m
        * ((soil_no3_kg_m3 / 1000.0 / soil_moisture_m3_m3) - 0.000014)
        * (std::f64::consts::PI * root_density_m_m3).sqrt()
        * root_density_m_m3
        * 1000.0
        * time_step_days;

    LayerUptakePotential {
        convective_kg_m2,
        diffusive_kg_m2: diffusive_raw.max(0.0),
    }
}

/// Allocates crop N demand across layers, convective uptake first and
/// diffusive uptake making up any deficit, capped by the layer's
/// available mineral N and by a fixed per-layer ceiling
/// (`fc_CropNUptake`'s second loop). Returns per-layer uptake in
/// `[kg m⁻²]` and total uptake in `[kg ha⁻¹]`.
pub fn allocate_n_uptake(
    potentials: &[LayerUptakePotential],
    soil_no3_kg_m3: &[f64],
    layer_thickness_m: f64,
    crop_n_demand_kg_m2: f64,
    minimum_available_n_kg_m3: f64,
    max_crop_n_demand_per_layer_kg_ha: f64,
) -> (Vec<f64>, f64) {
    let total_convective: f64 = potentials.iter().map(|p| p.convective_kg_m2).sum();
    let total_diffusive: f64 = potentials.iter().map(|p| p.diffusive_kg_m2).sum();

    let mut uptake = vec![0.0; potentials.len()];
    let mut total_kg_ha = 0.0;

    if crop_n_demand_kg_m2 > 0.0 {
        for (i, p) in potentials.iter().enumerate() {
            let mut layer_uptake = if total_convective >= crop_n_demand_kg_m2 {
                if total_convective > 0.0 {
                    crop_n_demand_kg_m2 * p.convective_kg_m2 / total_convective
                } else {
                    0.0
                }
            } else if (crop_n_demand_kg_m2 - total_convective) < total_diffusive {
                let diffusive_share = if total_diffusive > 0.0 {
                    (crop_n_demand_kg_m2 - total_convective) * p.diffusive_kg_m2 / total_diffusive
                } else {
                    0.0
                };
                p.convective_kg_m2 + diffusive_share
            } else {
                p.convective_kg_m2 + p.diffusive_kg_m2
            };

            let layer_available = (soil_no3_kg_m3[i] * layer_thickness_m) - minimum_available_n_kg_m3;
            if layer_uptake > layer_available {
                layer_uptake = layer_available;
            }
            let ceiling = max_crop_n_demand_per_layer_kg_ha / 10000.0 * 0.75;
            if layer_uptake > ceiling {
                layer_uptake = ceiling;
            }
            layer_uptake = layer_uptake.max(0.0);

            uptake[i] = layer_uptake;
            total_kg_ha += layer_uptake * 10_000.0;
        }
    }

    (uptake, total_kg_ha)
}

/// Splits remaining N demand between soil uptake and biological fixation
/// (`fc_CropNUptake`'s `vc_FixedN`/`vc_TotalNInput` computation). Returns
/// `(fixed_n_kg_ha, total_n_input_kg_ha)`.
pub fn split_fixation_and_input(
    crop_n_demand_kg_m2: f64,
    total_n_uptake_kg_ha: f64,
    part_biological_n_fixation: f64,
) -> (f64, f64) {
    let demand_kg_ha = crop_n_demand_kg_m2 * 10_000.0;
    let fixed_n_potential = part_biological_n_fixation * demand_kg_ha;

    if (demand_kg_ha - total_n_uptake_kg_ha) < fixed_n_potential {
        (demand_kg_ha - total_n_uptake_kg_ha, demand_kg_ha)
    } else {
        (fixed_n_potential, total_n_uptake_kg_ha + fixed_n_potential)
    }
}

/// Updates root N concentration after a day's growth, floored at the
/// species' minimum so it never drops below that floor.
pub fn update_root_n_concentration(
    root_biomass_old_kg_ha: f64,
    root_biomass_kg_ha: f64,
    n_concentration_root: f64,
    aboveground_biomass_delta_kg_ha: f64,
    belowground_biomass_delta_kg_ha: f64,
    total_n_input_kg_ha: f64,
    stage_max_root_n_concentration: f64,
    minimum_n_concentration_root: f64,
) -> f64 {
    if root_biomass_kg_ha <= root_biomass_old_kg_ha {
        return n_concentration_root;
    }

    let root_biomass_delta = root_biomass_kg_ha - root_biomass_old_kg_ha;
    let total_biomass_delta = aboveground_biomass_delta_kg_ha + belowground_biomass_delta_kg_ha + root_biomass_delta;

    let mut updated = if total_biomass_delta > 0.0 {
        ((root_biomass_old_kg_ha * n_concentration_root)
            + (root_biomass_delta / total_biomass_delta * total_n_input_kg_ha))
            / root_biomass_kg_ha
    } else {
        n_concentration_root
    };

    updated = updated.min(stage_max_root_n_concentration);
    updated.max(minimum_n_concentration_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_n_concentration_declines_with_biomass() {
        let low = critical_n_concentration(5.0, 0.5, 500.0, 200.0);
        let high = critical_n_concentration(5.0, 0.5, 5000.0, 2000.0);
        assert!(high < low);
    }

    #[test]
    fn root_n_redux_is_zero_below_hard_floor() {
        assert_eq!(root_n_redux(0.004), 0.0);
    }

    #[test]
    fn root_n_redux_is_one_above_threshold() {
        assert_eq!(root_n_redux(0.02), 1.0);
    }

    #[test]
    fn root_n_redux_interpolates_between_floor_and_threshold() {
        let r = root_n_redux(0.0075);
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn legume_fixation_tops_up_to_critical_without_redux() {
        let status = crop_n_redux(0.01, 0.02, 0.005, 0.3, true);
        assert_eq!(status.crop_n_redux, 1.0);
        assert_eq!(status.n_concentration_aboveground_biomass, 0.02);
        assert!(status.fixed_n_concentration > 0.0);
    }

    #[test]
    fn non_legume_below_minimum_has_zero_redux() {
        let status = crop_n_redux(0.002, 0.02, 0.005, 0.0, true);
        assert_eq!(status.crop_n_redux, 0.0);
    }

    #[test]
    fn nitrogen_response_off_always_gives_full_redux() {
        let status = crop_n_redux(0.001, 0.02, 0.005, 0.0, false);
        assert_eq!(status.crop_n_redux, 1.0);
    }

    #[test]
    fn layer_uptake_potential_zero_when_soil_dry() {
        let p = layer_uptake_potential(2.0, 0.02, 0.0, 1.0, 0.001, 100.0, 1.0);
        assert_eq!(p.convective_kg_m2, 0.0);
        assert_eq!(p.diffusive_kg_m2, 0.0);
    }

    #[test]
    fn layer_uptake_potential_positive_with_moisture_and_roots() {
        let p = layer_uptake_potential(2.0, 0.02, 0.25, 1.0, 0.0001, 500.0, 1.0);
        assert!(p.convective_kg_m2 >= 0.0);
        assert!(p.diffusive_kg_m2 >= 0.0);
    }

    #[test]
    fn allocate_n_uptake_respects_convective_sufficiency() {
        let potentials = vec![
            LayerUptakePotential { convective_kg_m2: 0.002, diffusive_kg_m2: 0.0 },
            LayerUptakePotential { convective_kg_m2: 0.002, diffusive_kg_m2: 0.0 },
        ];
        let no3 = vec![0.05, 0.05];
        let (uptake, total) = allocate_n_uptake(&potentials, &no3, 0.2, 0.002, 0.0001, 200.0);
        assert!(total > 0.0);
        assert_eq!(uptake.len(), 2);
    }

    #[test]
    fn allocate_n_uptake_zero_when_no_demand() {
        let potentials = vec![LayerUptakePotential { convective_kg_m2: 0.002, diffusive_kg_m2: 0.0 }];
        let no3 = vec![0.05];
        let (uptake, total) = allocate_n_uptake(&potentials, &no3, 0.2, 0.0, 0.0001, 200.0);
        assert_eq!(total, 0.0);
        assert_eq!(uptake[0], 0.0);
    }

    #[test]
    fn split_fixation_covers_remaining_deficit() {
        let (fixed, total_input) = split_fixation_and_input(0.01, 50.0, 0.2);
        assert!(fixed >= 0.0);
        assert!(total_input <= 100.0);
    }

    #[test]
    fn update_root_n_concentration_unchanged_without_growth() {
        let updated = update_root_n_concentration(100.0, 100.0, 0.015, 10.0, 5.0, 2.0, 0.03, 0.005);
        assert_eq!(updated, 0.015);
    }

    #[test]
    fn update_root_n_concentration_floored_at_minimum() {
        let updated = update_root_n_concentration(100.0, 110.0, 0.0, 10.0, 5.0, 0.0, 0.03, 0.008);
        assert!(updated >= 0.008);
    }
}
