//! Biogenic VOC emissions (isoprene and monoterpene), the Guenther et al.
//! (1993, 1995, 1999) light/temperature activity model ported from
//! `voc-guenther.cpp`.
//!
//! Emission is diagnostic: it does not feed back into
//! [`crate::crop_module::CropModule`]'s carbon or nitrogen budgets, only
//! reports what the canopy would emit under today's foliage temperature
//! and absorbed radiation.

const RGAS: f64 = 8.3143;
const D_IN_K: f64 = 273.15;
const TOPT: f64 = 314.0;
const TREF: f64 = 30.0 + D_IN_K;
const ALPHA: f64 = 0.0027;
const CL1: f64 = 1.066;
const CT1: f64 = 95_000.0;
const CT2: f64 = 230_000.0;
const BETA: f64 = 0.09;
const FPAR: f64 = 0.45;
const W_IN_UMOL: f64 = 4.57;
const MC: f64 = 12.0;
const C_ISO: f64 = 5.0;
const C_MONO: f64 = 10.0;
const SEC_IN_HR: f64 = 3600.0;
const SEC_IN_DAY: f64 = 86_400.0;

/// Species-level emission potential and canopy state needed to scale it
/// for one day.
#[derive(Debug, Clone, Copy)]
pub struct VocSpecies {
    /// Isoprene emission factor under standard conditions [ug gDW⁻¹ h⁻¹].
    pub isoprene_emission_factor: f64,
    /// Monoterpene emission factor under standard conditions
    /// [ug gDW⁻¹ h⁻¹].
    pub monoterpene_emission_factor: f64,
    /// Stored-pool monoterpene emission factor [ug gDW⁻¹ h⁻¹], emitted
    /// independent of light via a purely temperature-driven pool.
    pub monoterpene_storage_emission_factor: f64,
    /// Specific leaf area [m² kg⁻¹ dry weight].
    pub specific_leaf_area_m2_kg: f64,
    pub leaf_area_index: f64,
}

/// One day's isoprene and monoterpene emission for one species.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VocEmission {
    /// [umol m⁻² ground d⁻¹].
    pub isoprene: f64,
    /// [umol m⁻² ground d⁻¹].
    pub monoterpene: f64,
}

/// Isoprene's Guenther (1999) temperature-activity factor, following
/// Harley et al. (2004). `cti30` normalises the activation/deactivation
/// curve to 1.0 at 30 C so that `isoprene_emission_factor` can be read
/// directly as the standard-conditions rate.
fn isoprene_temperature_factor(foliage_temperature_k: f64) -> f64 {
    let x30 = (1.0 / TOPT - 1.0 / (30.0 + D_IN_K)) / RGAS;
    let cti30 = CT2 * (CT1 * x30).exp() / (CT2 - CT1 * (1.0 - (CT2 * x30).exp()));
    let x = (1.0 / TOPT - 1.0 / foliage_temperature_k) / RGAS;
    let cti = CT2 * (CT1 * x).exp() / (CT2 - CT1 * (1.0 - (CT2 * x).exp()));
    cti / cti30
}

/// Shared Guenther (1993) light-activity factor for both isoprene and
/// light-dependent monoterpene emission, capped at 1.0.
fn light_activity_factor(photosynthetically_active_radiation_umol_m2_s: f64) -> f64 {
    let par = photosynthetically_active_radiation_umol_m2_s;
    let cl = ALPHA * CL1 * par / (1.0 + ALPHA * ALPHA * par * par).sqrt();
    cl.min(1.0)
}

/// Monoterpene's Guenther (1993, 1995) temperature-activity factor for
/// the light-dependent de-novo synthesis pathway.
fn monoterpene_temperature_factor(foliage_temperature_k: f64) -> f64 {
    (CT1 * (foliage_temperature_k - TREF) / (RGAS * TREF * foliage_temperature_k)).exp()
        / (0.961 + (CT2 * (foliage_temperature_k - TOPT) / (RGAS * TREF * foliage_temperature_k)).exp())
}

/// Monoterpene's storage-pool emission factor, a pure temperature
/// exponential independent of light (Guenther et al. 1995).
fn monoterpene_storage_factor(foliage_temperature_k: f64) -> f64 {
    (BETA * (foliage_temperature_k - TREF)).exp()
}

/// Per-day canopy-scaled isoprene and monoterpene emission for one
/// species (`calculateGuentherVOCEmissionsMultipleSpecies` collapsed to
/// a single species; callers sum over a crop's component species).
///
/// `global_radiation_w_m2` and `foliage_temperature_c` describe the
/// conditions the whole day-fraction `day_fraction` (`1.0` for a full
/// 24h timestep) was exposed to.
pub fn leaf_emission(species: &VocSpecies, global_radiation_w_m2: f64, foliage_temperature_c: f64, day_fraction: f64) -> VocEmission {
    if species.leaf_area_index <= 0.0 {
        return VocEmission::default();
    }

    let par_umol_m2_s = global_radiation_w_m2 * FPAR * W_IN_UMOL;
    let foliage_temperature_k = foliage_temperature_c + D_IN_K;

    let light_factor = light_activity_factor(par_umol_m2_s);
    let isoprene_rate = species.isoprene_emission_factor * isoprene_temperature_factor(foliage_temperature_k);
    let monoterpene_rate = species.monoterpene_storage_emission_factor * monoterpene_storage_factor(foliage_temperature_k)
        + species.monoterpene_emission_factor * light_factor * monoterpene_temperature_factor(foliage_temperature_k);

    let specific_leaf_weight_g_m2 = 1000.0 / species.specific_leaf_area_m2_kg;
    let timestep_seconds = SEC_IN_DAY * day_fraction;
    let scaling = (specific_leaf_weight_g_m2 / (SEC_IN_HR * MC)) * species.leaf_area_index * timestep_seconds;

    VocEmission {
        isoprene: (1.0 / C_ISO) * scaling * isoprene_rate,
        monoterpene: (1.0 / C_MONO) * scaling * monoterpene_rate,
    }
}

/// Sums [`leaf_emission`] across every component species of a mixed
/// canopy (e.g. intercropping), accumulating into one daily total.
pub fn canopy_emission(
    species: &[VocSpecies],
    global_radiation_w_m2: f64,
    foliage_temperature_c: f64,
    day_fraction: f64,
) -> VocEmission {
    species.iter().fold(VocEmission::default(), |mut total, s| {
        let e = leaf_emission(s, global_radiation_w_m2, foliage_temperature_c, day_fraction);
        total.isoprene += e.isoprene;
        total.monoterpene += e.monoterpene;
        total
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species() -> VocSpecies {
        VocSpecies {
            isoprene_emission_factor: 15.0,
            monoterpene_emission_factor: 2.0,
            monoterpene_storage_emission_factor: 1.0,
            specific_leaf_area_m2_kg: 20.0,
            leaf_area_index: 3.0,
        }
    }

    #[test]
    fn zero_lai_gives_zero_emission() {
        let mut s = species();
        s.leaf_area_index = 0.0;
        let e = leaf_emission(&s, 500.0, 25.0, 1.0);
        assert_eq!(e.isoprene, 0.0);
        assert_eq!(e.monoterpene, 0.0);
    }

    #[test]
    fn isoprene_emission_increases_with_radiation() {
        let s = species();
        let low = leaf_emission(&s, 50.0, 25.0, 1.0);
        let high = leaf_emission(&s, 800.0, 25.0, 1.0);
        assert!(high.isoprene > low.isoprene);
    }

    #[test]
    fn monoterpene_storage_pool_emits_without_light() {
        let s = species();
        let dark = leaf_emission(&s, 0.0, 30.0, 1.0);
        assert!(dark.monoterpene > 0.0);
    }

    #[test]
    fn canopy_emission_sums_species() {
        let s = species();
        let single = leaf_emission(&s, 400.0, 25.0, 1.0);
        let mixed = canopy_emission(&[s, s], 400.0, 25.0, 1.0);
        assert!((mixed.isoprene - 2.0 * single.isoprene).abs() < 1e-9);
    }

    #[test]
    fn temperature_factor_peaks_near_reference_optimum() {
        let cold = isoprene_temperature_factor(15.0 + D_IN_K);
        let warm = isoprene_temperature_factor(30.0 + D_IN_K);
        assert!(warm > cold);
    }
}
