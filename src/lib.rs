//! Coupled crop-growth and atmosphere-canopy-soil stress core of the
//! MONICA agro-ecosystem simulator.
//!
//! [`crop_module::CropModule`] advances one crop's phenology, canopy
//! growth, photosynthesis, respiration, stress couplings, dry-matter
//! partitioning, roots, and water/nitrogen uptake by a single day;
//! [`orchestrator::MonicaModel`] owns the soil submodels and the
//! currently planted crop and sequences a full simulation day around it.
//! Soil water/temperature solving, climate-file parsing, calibration, and
//! output persistence are out of scope; see the trait seams in [`soil`].

pub mod canopy;
pub mod crop_module;
pub mod error;
pub mod events;
pub mod nitrogen;
pub mod o3_impact;
pub mod orchestrator;
pub mod organ;
pub mod params;
pub mod phenology;
pub mod photosynthesis;
pub mod radiation;
pub mod roots;
pub mod soil;
pub mod stress;
pub mod voc;
pub mod water;
pub mod weather;

pub use crop_module::{CropModule, CropStepOutput, CuttingOutcome, CuttingTarget};
pub use error::MonicaError;
pub use orchestrator::{MonicaModel, OrchestratorConfig, PendingFertilisation};
