//! Root depth growth, rooting zone, and root density distribution, ported
//! from the rooting-depth and root-density sections of
//! `CropGrowth::fc_CropDryMatter`.

use std::f64::consts::PI;

/// Per-day root state: current penetration depth, the wider "rooting
/// zone" over which density tails off, and the per-layer root-length
/// density distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct RootSystem {
    /// Current rooting depth [m].
    pub depth_m: f64,
    /// Rooting depth expressed in whole layers (rounded).
    pub depth_layer: usize,
    /// Rooting zone in whole layers — wider than `depth_layer`, density
    /// tapers linearly to zero across it.
    pub zone_layer: usize,
    /// Maximum attainable rooting depth for this crop/site combination [m].
    pub max_depth_m: f64,
    /// Cumulative effective temperature driving root elongation [°C d].
    pub cumulative_temperature: f64,
    /// Root length density per layer [m m⁻³].
    pub density_per_layer: Vec<f64>,
    /// Total root length per unit ground area [m m⁻²].
    pub total_root_length_m_m2: f64,
}

impl RootSystem {
    /// Derives the maximum rooting depth from the crop's genetic maximum
    /// and the site's soil-texture/bulk-density modifiers, then sets the
    /// initial depth/zone/density for a freshly emerged crop.
    ///
    /// `max_depth_m = crop_specific_max * (1 + sand_modifier) * (1 +
    /// bulk_density_modifier)`, with `sand_modifier = (0.5 - sand) * 0.6`
    /// and `bulk_density_modifier = (1 - bulk_density_g_cm3) * 0.3`.
    pub fn new(
        initial_depth_m: f64,
        crop_specific_max_depth_m: f64,
        sand_content: f64,
        bulk_density_g_cm3: f64,
        number_of_layers: usize,
        layer_thickness_m: f64,
        root_biomass_kg_ha: f64,
        specific_root_length_m_kg: f64,
        root_form_factor: f64,
    ) -> Self {
        let sand_modifier = (0.5 - sand_content) * 0.6;
        let bulk_density_modifier = (1.0 - bulk_density_g_cm3) * 0.3;
        let max_depth_m = crop_specific_max_depth_m * (1.0 + sand_modifier) * (1.0 + bulk_density_modifier);

        let mut system = RootSystem {
            depth_m: initial_depth_m,
            depth_layer: 1,
            zone_layer: 1,
            max_depth_m,
            cumulative_temperature: 0.0,
            density_per_layer: vec![0.0; number_of_layers],
            total_root_length_m_m2: 0.0,
        };
        system.recompute_distribution(
            number_of_layers,
            layer_thickness_m,
            root_biomass_kg_ha,
            specific_root_length_m_kg,
            root_form_factor,
        );
        system
    }

    /// `fc_CropDryMatter`'s root-penetration-rate-by-clay-content
    /// piecewise function.
    fn penetration_rate(clay_content: f64, base_rate: f64) -> f64 {
        if clay_content <= 0.02 {
            0.5 * base_rate
        } else if clay_content <= 0.08 {
            ((1.0 / 3.0) + (0.5 / 0.06 * clay_content)) * base_rate
        } else {
            base_rate
        }
    }

    /// Advances rooting depth by one day and recomputes the density
    /// distribution.
    ///
    /// `max_effective_depth_m` is the site's water-table/impenetrable-layer
    /// ceiling, applied after the genetic/soil ceiling so a shallow water
    /// table always wins.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        mean_air_temperature_c: f64,
        min_temperature_root_growth_c: f64,
        base_penetration_rate_m_per_c: f64,
        clay_content_at_rooting_depth: f64,
        initial_depth_m: f64,
        max_effective_depth_m: f64,
        number_of_layers: usize,
        layer_thickness_m: f64,
        root_biomass_kg_ha: f64,
        specific_root_length_m_kg: f64,
        root_form_factor: f64,
    ) {
        let max_temp = min_temperature_root_growth_c + 20.0;
        let daily_temp = if mean_air_temperature_c >= max_temp {
            max_temp - min_temperature_root_growth_c
        } else {
            mean_air_temperature_c - min_temperature_root_growth_c
        }
        .max(0.0);

        self.cumulative_temperature += daily_temp;

        let rate = Self::penetration_rate(clay_content_at_rooting_depth, base_penetration_rate_m_per_c);
        self.depth_m += daily_temp * rate;

        if self.depth_m <= initial_depth_m {
            self.depth_m = initial_depth_m;
        }
        if self.depth_m > self.max_depth_m {
            self.depth_m = self.max_depth_m;
        }
        if self.depth_m > max_effective_depth_m {
            self.depth_m = max_effective_depth_m;
        }

        self.recompute_distribution(
            number_of_layers,
            layer_thickness_m,
            root_biomass_kg_ha,
            specific_root_length_m_kg,
            root_form_factor,
        );
    }

    fn recompute_distribution(
        &mut self,
        number_of_layers: usize,
        layer_thickness_m: f64,
        root_biomass_kg_ha: f64,
        specific_root_length_m_kg: f64,
        root_form_factor: f64,
    ) {
        self.depth_layer = ((0.5 + self.depth_m / layer_thickness_m).floor() as usize).min(number_of_layers).max(1);
        self.zone_layer = ((0.5 + (1.3 * self.depth_m) / layer_thickness_m).floor() as usize)
            .min(number_of_layers)
            .max(self.depth_layer);

        self.total_root_length_m_m2 = root_biomass_kg_ha * specific_root_length_m_kg;

        self.density_per_layer = vec![0.0; number_of_layers];
        let mut factors = vec![0.0; number_of_layers];
        for layer in 0..number_of_layers {
            factors[layer] = if layer < self.depth_layer {
                (-root_form_factor * (layer as f64 * layer_thickness_m)).exp()
            } else if layer < self.zone_layer {
                (-root_form_factor * (layer as f64 * layer_thickness_m)).exp()
                    * (1.0
                        - ((layer - self.depth_layer) as f64
                            / (self.zone_layer - self.depth_layer) as f64))
            } else {
                0.0
            };
        }

        let factor_sum: f64 = factors[..self.zone_layer.min(number_of_layers)].iter().sum();
        if factor_sum > 0.0 {
            for layer in 0..self.zone_layer.min(number_of_layers) {
                self.density_per_layer[layer] = (factors[layer] / factor_sum) * self.total_root_length_m_m2;
            }
        }
    }
}

/// Initial total root length derived from a geometric assumption about
/// fresh root diameter, used only before the crop has accumulated enough
/// biomass for the specific-root-length-based formula to be meaningful
/// (matches the constructor-time calculation in the source, distinct from
/// [`RootSystem::recompute_distribution`]'s post-emergence formula).
pub fn initial_total_root_length_m_m2(root_biomass_kg_ha: f64) -> f64 {
    (root_biomass_kg_ha * 100_000.0 * 100.0 / 7.0) / (0.015 * 0.015 * PI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_depth_increases_with_lower_bulk_density() {
        let loose = RootSystem::new(0.1, 1.5, 0.4, 1.2, 10, 0.1, 1000.0, 20.0, 5.0);
        let dense = RootSystem::new(0.1, 1.5, 0.4, 1.6, 10, 0.1, 1000.0, 20.0, 5.0);
        assert!(loose.max_depth_m > dense.max_depth_m);
    }

    #[test]
    fn depth_never_exceeds_max_effective_depth() {
        let mut roots = RootSystem::new(0.1, 2.0, 0.4, 1.4, 20, 0.1, 1000.0, 20.0, 5.0);
        for _ in 0..200 {
            roots.step(25.0, 1.0, 0.1, 0.1, 0.1, 0.5, 20, 0.1, 1000.0, 20.0, 5.0);
        }
        assert!(roots.depth_m <= 0.5 + 1e-9);
    }

    #[test]
    fn root_density_distribution_sums_to_total_root_length() {
        let mut roots = RootSystem::new(0.1, 1.5, 0.4, 1.4, 15, 0.1, 1000.0, 20.0, 5.0);
        roots.step(20.0, 1.0, 0.1, 0.1, 0.1, 1.5, 15, 0.1, 1000.0, 20.0, 5.0);
        let sum: f64 = roots.density_per_layer.iter().sum();
        assert!((sum - roots.total_root_length_m_m2).abs() < 1e-6);
    }

    #[test]
    fn no_root_elongation_below_minimum_temperature() {
        let mut roots = RootSystem::new(0.1, 1.5, 0.4, 1.4, 10, 0.1, 1000.0, 20.0, 5.0);
        let before = roots.depth_m;
        roots.step(-5.0, 1.0, 0.1, 0.1, 0.1, 1.5, 10, 0.1, 1000.0, 20.0, 5.0);
        assert_eq!(roots.depth_m, before);
    }

    #[test]
    fn initial_total_root_length_scales_with_biomass() {
        assert!(initial_total_root_length_m_m2(2000.0) > initial_total_root_length_m_m2(1000.0));
    }
}
