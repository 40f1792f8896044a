//! Canopy photosynthesis strategy selection.
//!
//! [`daily`] carries forward the HERMES-derived clear/overcast canopy
//! integration that every published MONICA run has historically used;
//! [`fvcb`] is the newer mechanistic hourly Farquhar-von
//! Caemmerer-Berry path, which also drives the [`crate::o3_impact`]
//! coupling (daily assimilation has no rubisco-limited rate for ozone to
//! act on).

pub mod daily;
pub mod fvcb;

/// One day's canopy gross/net assimilation and the maintenance/growth
/// respiration already subtracted from it, in the units
/// [`crate::crop_module::CropModule`] consumes directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyAssimilation {
    /// [kg CH2O ha⁻¹ d⁻¹], after maintenance and growth respiration.
    pub net_assimilates_kg_ha: f64,
    /// [kg CH2O ha⁻¹ d⁻¹], gross canopy assimilation before respiration.
    pub gross_assimilates_kg_ha: f64,
    /// Reference-crop (grass) gross photosynthesis used by
    /// [`crate::water::reference_evapotranspiration`]'s stomatal term
    /// [mol m⁻² s⁻¹].
    pub gross_photosynthesis_reference_mol: f64,
}

/// Strategy seam between the two photosynthesis implementations. Both are
/// driven to a common `DailyAssimilation` so
/// [`crate::crop_module::CropModule::step`] does not need to know which
/// one ran.
pub trait CanopyPhotosynthesis {
    #[allow(clippy::too_many_arguments)]
    fn assimilate(
        &mut self,
        weather: &crate::weather::WeatherRecord,
        radiation: &crate::radiation::RadiationGeometry,
        leaf_area_index: f64,
        crop_frost_redux: f64,
        transpiration_deficit: f64,
        drought_stress_threshold: f64,
        oxygen_deficit: f64,
    ) -> DailyAssimilation;
}
