use std::path::PathBuf;

use image::DynamicImage;
use time::{OffsetDateTime, UtcOffset};
use tracing::{info, warn};

use crate::detection::PlateLocator;
use crate::error::PlateError;
use crate::models::PlateOutcome;
use crate::persistence::ArtifactStore;
use crate::recognition::TextRecognizer;

/// Per-call options for [`PlateService::handle`]
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Whether the original and cropped images are written to disk
    pub save_output: bool,
    /// Root directory for saved images (a dated sub-folder is created per day)
    pub output_dir: PathBuf,
    /// Offset used to date saved artifacts. Read it once at startup: the
    /// local offset cannot be queried safely once other threads exist.
    pub utc_offset: UtcOffset,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            save_output: true,
            output_dir: PathBuf::from("output"),
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Locate-then-recognize pipeline. Pure: touches no filesystem.
pub struct PlatePipeline {
    locator: PlateLocator,
    recognizer: TextRecognizer,
}

impl PlatePipeline {
    pub fn new(locator: PlateLocator, recognizer: TextRecognizer) -> Self {
        Self {
            locator,
            recognizer,
        }
    }

    pub fn locator(&self) -> &PlateLocator {
        &self.locator
    }

    /// Run the pipeline on one image.
    ///
    /// Recognition is skipped entirely when no plate region is found.
    pub fn process(&self, image: &DynamicImage) -> Result<PlateOutcome, PlateError> {
        let Some(region) = self.locator.locate(image)? else {
            warn!("No license plate detected");
            return Ok(PlateOutcome::NotFound);
        };

        let recognition = self.recognizer.recognize(&region)?;
        if recognition.is_empty() {
            warn!("No text detected on the license plate");
            Ok(PlateOutcome::Unrecognized { region })
        } else {
            info!(text = %recognition.text, "Detected license plate text");
            Ok(PlateOutcome::Recognized {
                region,
                recognition,
            })
        }
    }
}

/// The pipeline plus the optional artifact persistence that follows it
pub struct PlateService {
    pipeline: PlatePipeline,
}

impl PlateService {
    pub fn new(pipeline: PlatePipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &PlatePipeline {
        &self.pipeline
    }

    /// Process an image, then save artifacts if `config` asks for it and a
    /// plate region was found.
    pub fn handle(&self, image: &DynamicImage, config: &ProcessConfig) -> Result<PlateOutcome, PlateError> {
        let outcome = self.pipeline.process(image)?;

        if config.save_output && outcome.is_found() {
            let now = OffsetDateTime::now_utc().to_offset(config.utc_offset);
            let store = ArtifactStore::new(&config.output_dir);
            if let Some(saved) = store.save(image, &outcome, now)? {
                info!(
                    original = %saved.original.display(),
                    plate = %saved.plate.display(),
                    "Saved plate artifacts"
                );
            }
        }

        Ok(outcome)
    }
}
