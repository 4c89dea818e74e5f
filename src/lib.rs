pub mod detection;
pub mod error;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod recognition;
pub mod server;

pub use detection::{LocatorParams, PlateLocator};
pub use error::PlateError;
pub use models::{
    BoundingBox, Contour, EngineRole, PlateOutcome, PlateRegion, Recognition, UNKNOWN_PLATE_TEXT,
};
pub use persistence::{ArtifactStore, SavedArtifacts};
pub use pipeline::{PlatePipeline, PlateService, ProcessConfig};
pub use recognition::{SharedEngine, TextEngine, TextRecognizer};
