use std::path::PathBuf;

use thiserror::Error;

/// Faults raised by the plate pipeline.
///
/// "No plate found" and "plate found but unreadable" are not errors; they are
/// reported through [`crate::PlateOutcome`].
#[derive(Debug, Error)]
pub enum PlateError {
    #[error("invalid image: {width}x{height} has no pixels")]
    InvalidImage { width: u32, height: u32 },

    #[error("{engine} OCR engine failed")]
    Engine {
        engine: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact {}", path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl PlateError {
    pub(crate) fn engine(engine: &str, source: anyhow::Error) -> Self {
        PlateError::Engine {
            engine: engine.to_string(),
            source: source.into(),
        }
    }
}
