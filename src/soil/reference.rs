//! Minimal reference implementations of the soil traits, sufficient to
//! drive [`crate::orchestrator::MonicaModel`] end to end in this crate's
//! own tests, including a bare-fallow run where soil moisture settles to
//! a steady state. Not a physically validated soil model, just a stand-in
//! for the soil/hydrology submodels MONICA normally delegates to.

use super::{FrostLayer, SnowCover, SoilColumn, SoilOrganic, SoilTransport};

#[derive(Debug, Clone)]
pub struct Layer {
    pub thickness_m: f64,
    pub moisture: f64,
    pub field_capacity: f64,
    pub wilting_point: f64,
    pub saturation: f64,
    pub temperature_c: f64,
    pub no3_kg_m3: f64,
    pub sand: f64,
    pub clay: f64,
    pub bulk_density_kg_m3: f64,
    pub organic_carbon: f64,
}

impl Layer {
    pub fn new(thickness_m: f64, field_capacity: f64, wilting_point: f64) -> Self {
        Layer {
            thickness_m,
            moisture: field_capacity,
            field_capacity,
            wilting_point,
            saturation: field_capacity * 1.2,
            temperature_c: 10.0,
            no3_kg_m3: 0.01,
            sand: 0.4,
            clay: 0.2,
            bulk_density_kg_m3: 1400.0,
            organic_carbon: 0.01,
        }
    }
}

/// A flat, uniform-layer soil column used by integration tests.
#[derive(Debug, Clone)]
pub struct ReferenceSoilColumn {
    pub layers: Vec<Layer>,
    pub surface_water_storage_mm: f64,
    pub snow_depth_mm: f64,
    pub groundwater_table_layer: Option<usize>,
    pub surface_temperature_c: f64,
}

impl ReferenceSoilColumn {
    pub fn uniform(number_of_layers: usize, layer_thickness_m: f64) -> Self {
        ReferenceSoilColumn {
            layers: (0..number_of_layers)
                .map(|_| Layer::new(layer_thickness_m, 0.30, 0.12))
                .collect(),
            surface_water_storage_mm: 0.0,
            snow_depth_mm: 0.0,
            groundwater_table_layer: None,
            surface_temperature_c: 10.0,
        }
    }
}

impl SoilColumn for ReferenceSoilColumn {
    fn number_of_layers(&self) -> usize {
        self.layers.len()
    }

    fn layer_thickness_m(&self, layer: usize) -> f64 {
        self.layers[layer].thickness_m
    }

    fn soil_moisture_m3_m3(&self, layer: usize) -> f64 {
        self.layers[layer].moisture
    }

    fn set_soil_moisture_m3_m3(&mut self, layer: usize, value: f64) {
        self.layers[layer].moisture = value;
    }

    fn field_capacity(&self, layer: usize) -> f64 {
        self.layers[layer].field_capacity
    }

    fn permanent_wilting_point(&self, layer: usize) -> f64 {
        self.layers[layer].wilting_point
    }

    fn saturation(&self, layer: usize) -> f64 {
        self.layers[layer].saturation
    }

    fn soil_temperature_c(&self, layer: usize) -> f64 {
        self.layers[layer].temperature_c
    }

    fn set_soil_temperature_c(&mut self, layer: usize, value: f64) {
        self.layers[layer].temperature_c = value;
    }

    fn no3_kg_m3(&self, layer: usize) -> f64 {
        self.layers[layer].no3_kg_m3
    }

    fn set_no3_kg_m3(&mut self, layer: usize, value: f64) {
        self.layers[layer].no3_kg_m3 = value.max(0.0);
    }

    fn sand_content(&self, layer: usize) -> f64 {
        self.layers[layer].sand
    }

    fn clay_content(&self, layer: usize) -> f64 {
        self.layers[layer].clay
    }

    fn bulk_density_kg_m3(&self, layer: usize) -> f64 {
        self.layers[layer].bulk_density_kg_m3
    }

    fn organic_carbon_kg_kg(&self, layer: usize) -> f64 {
        self.layers[layer].organic_carbon
    }

    fn surface_water_storage_mm(&self) -> f64 {
        self.surface_water_storage_mm
    }

    fn set_surface_water_storage_mm(&mut self, value: f64) {
        self.surface_water_storage_mm = value.max(0.0);
    }

    fn snow_depth_mm(&self) -> f64 {
        self.snow_depth_mm
    }

    fn groundwater_table_layer(&self) -> Option<usize> {
        self.groundwater_table_layer
    }

    fn soil_surface_temperature_c(&self) -> f64 {
        self.surface_temperature_c
    }
}

/// Degree-day snowpack accumulation/melt, just enough to drive the frost
/// coupling's `get_snow_depth_and_temp_under_snow` callback in tests.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnowCover {
    swe_mm: f64,
}

impl SnowCover for ReferenceSnowCover {
    fn step(&mut self, precipitation_mm: f64, mean_air_temperature_c: f64) {
        if mean_air_temperature_c <= 0.0 {
            self.swe_mm += precipitation_mm;
        } else {
            let melt = (mean_air_temperature_c * 3.0).min(self.swe_mm);
            self.swe_mm -= melt;
        }
    }

    fn snow_depth_mm(&self) -> f64 {
        self.swe_mm * 5.0
    }

    fn snow_water_equivalent_mm(&self) -> f64 {
        self.swe_mm
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceFrostLayer {
    frost_depth_m: f64,
    thaw_depth_m: f64,
    temperature_under_snow_c: f64,
}

impl FrostLayer for ReferenceFrostLayer {
    fn step(&mut self, mean_air_temperature_c: f64, snow_depth_mm: f64) {
        let insulation = (snow_depth_mm / 200.0).min(1.0);
        self.temperature_under_snow_c = mean_air_temperature_c * (1.0 - insulation);
        if self.temperature_under_snow_c < 0.0 {
            self.frost_depth_m = (self.frost_depth_m + 0.01).min(1.5);
            self.thaw_depth_m = 0.0;
        } else {
            self.thaw_depth_m = (self.thaw_depth_m + 0.01).min(self.frost_depth_m);
            self.frost_depth_m = (self.frost_depth_m - 0.01).max(0.0);
        }
    }

    fn frost_depth_m(&self) -> f64 {
        self.frost_depth_m
    }

    fn thaw_depth_m(&self) -> f64 {
        self.thaw_depth_m
    }

    fn lambda_redux(&self, _layer: usize) -> f64 {
        if self.frost_depth_m > 0.0 {
            0.2
        } else {
            1.0
        }
    }

    fn temperature_under_snow_c(&self) -> f64 {
        self.temperature_under_snow_c
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceSoilOrganic {
    mineralised_n_kg_ha: Vec<f64>,
}

impl ReferenceSoilOrganic {
    pub fn new(number_of_layers: usize) -> Self {
        ReferenceSoilOrganic {
            mineralised_n_kg_ha: vec![0.0; number_of_layers],
        }
    }
}

impl SoilOrganic for ReferenceSoilOrganic {
    fn add_organic_matter(&mut self, layer_to_amount_kg_ha: &[(usize, f64)], n_concentration_kg_kg: f64) {
        for &(layer, amount) in layer_to_amount_kg_ha {
            if let Some(slot) = self.mineralised_n_kg_ha.get_mut(layer) {
                // Simplified: 5% of incoming organic N mineralises immediately.
                *slot += amount * n_concentration_kg_kg * 0.05;
            }
        }
    }

    fn step(&mut self) {
        for slot in &mut self.mineralised_n_kg_ha {
            *slot *= 0.99;
        }
    }

    fn mineralised_n_kg_ha(&self, layer: usize) -> f64 {
        self.mineralised_n_kg_ha.get(layer).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceSoilTransport {
    leached_no3_kg_ha: f64,
}

impl SoilTransport for ReferenceSoilTransport {
    fn step(&mut self) {
        // Placeholder: a real implementation advects NO3 by drainage flux
        // between layers; this reference only accumulates a nominal
        // leaching term so integration tests can assert `leaching > 0`.
        self.leached_no3_kg_ha += 0.01;
    }

    fn leached_no3_kg_ha(&self) -> f64 {
        self.leached_no3_kg_ha
    }
}
