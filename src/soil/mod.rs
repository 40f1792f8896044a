//! Narrow interfaces to the soil water/temperature/organic-matter/transport
//! submodels.
//!
//! These traits are the seam between this crate's core and the externally
//! supplied physical submodels. [`reference`] provides minimal
//! deterministic implementations used by this crate's own tests and as a
//! template for a real integration; it is not a physically complete soil
//! model and is not meant to be.

pub mod reference;

/// Per-layer and whole-column soil state consumed/updated by the core.
/// The orchestrator passes a mutable soil-column handle into
/// `CropModule::step(&mut soil, ..)` rather than the crop module owning
/// its own soil state.
pub trait SoilColumn {
    fn number_of_layers(&self) -> usize;
    fn layer_thickness_m(&self, layer: usize) -> f64;

    fn soil_moisture_m3_m3(&self, layer: usize) -> f64;
    fn set_soil_moisture_m3_m3(&mut self, layer: usize, value: f64);

    fn field_capacity(&self, layer: usize) -> f64;
    fn permanent_wilting_point(&self, layer: usize) -> f64;
    fn saturation(&self, layer: usize) -> f64;

    fn soil_temperature_c(&self, layer: usize) -> f64;
    fn set_soil_temperature_c(&mut self, layer: usize, value: f64);

    /// Soil NO3 concentration [kg/m³].
    fn no3_kg_m3(&self, layer: usize) -> f64;
    fn set_no3_kg_m3(&mut self, layer: usize, value: f64);

    fn sand_content(&self, layer: usize) -> f64;
    fn clay_content(&self, layer: usize) -> f64;
    fn bulk_density_kg_m3(&self, layer: usize) -> f64;
    fn organic_carbon_kg_kg(&self, layer: usize) -> f64;

    fn surface_water_storage_mm(&self) -> f64;
    fn set_surface_water_storage_mm(&mut self, value: f64);

    fn snow_depth_mm(&self) -> f64;
    fn groundwater_table_layer(&self) -> Option<usize>;
    fn soil_surface_temperature_c(&self) -> f64;

    /// Capillary water content above the permanent wilting point for a
    /// layer, used by the pre-emergence moisture gate.
    fn capillary_water_above_pwp(&self, layer: usize) -> f64 {
        (self.field_capacity(layer) - self.permanent_wilting_point(layer)).max(0.0)
    }
}

/// Daily snow water balance and depth.
pub trait SnowCover {
    fn step(&mut self, precipitation_mm: f64, mean_air_temperature_c: f64);
    fn snow_depth_mm(&self) -> f64;
    fn snow_water_equivalent_mm(&self) -> f64;
}

/// Frost/thaw depth and per-layer lambda reduction.
pub trait FrostLayer {
    fn step(&mut self, mean_air_temperature_c: f64, snow_depth_mm: f64);
    fn frost_depth_m(&self) -> f64;
    fn thaw_depth_m(&self) -> f64;
    fn lambda_redux(&self, layer: usize) -> f64;
    /// Under-snow temperature used by the crop frost-kill coupling and
    /// exposed via the orchestrator's snow-depth-and-temperature callback.
    fn temperature_under_snow_c(&self) -> f64;
}

/// AOM pools, N mineralisation, and residue ingestion.
pub trait SoilOrganic {
    /// Ingests organic matter produced by the crop (dead roots, harvest
    /// residues, full incorporation).
    fn add_organic_matter(&mut self, layer_to_amount_kg_ha: &[(usize, f64)], n_concentration_kg_kg: f64);
    fn step(&mut self);
    fn mineralised_n_kg_ha(&self, layer: usize) -> f64;
}

/// NO3 advection/leaching.
pub trait SoilTransport {
    fn step(&mut self);
    fn leached_no3_kg_ha(&self) -> f64;
}
