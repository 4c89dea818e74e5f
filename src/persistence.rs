use std::path::{Path, PathBuf};

use image::DynamicImage;
use time::OffsetDateTime;

use crate::error::PlateError;
use crate::models::PlateOutcome;

/// Paths written by one [`ArtifactStore::save`] call
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub original: PathBuf,
    pub plate: PathBuf,
}

/// Writes the source image and the plate crop under `<root>/<YYYY-MM-DD>/`
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Dated folder that artifacts captured at `at` go into
    pub fn day_dir(&self, at: OffsetDateTime) -> PathBuf {
        let day = format!(
            "{:04}-{:02}-{:02}",
            at.year(),
            u8::from(at.month()),
            at.day()
        );
        self.root.join(day)
    }

    /// Save the original image and the plate crop.
    ///
    /// Nothing is written when the outcome has no region.
    pub fn save(
        &self,
        original: &DynamicImage,
        outcome: &PlateOutcome,
        at: OffsetDateTime,
    ) -> Result<Option<SavedArtifacts>, PlateError> {
        let Some(region) = outcome.region() else {
            return Ok(None);
        };

        let dir = self.day_dir(at);
        std::fs::create_dir_all(&dir).map_err(|source| PlateError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let stamp = at.unix_timestamp();
        let original_path = dir.join(format!("original_{}.jpg", stamp));
        write_jpeg(original, &original_path)?;

        let plate_path = dir.join(plate_filename(outcome, stamp));
        write_jpeg(&region.image, &plate_path)?;

        Ok(Some(SavedArtifacts {
            original: original_path,
            plate: plate_path,
        }))
    }
}

/// `plate_<text>_<stamp>.jpg`, or `plate_unrecognized_<stamp>.jpg` when there
/// is no usable text. Only alphanumeric characters of the text are kept.
pub fn plate_filename(outcome: &PlateOutcome, stamp: i64) -> String {
    let sanitized: String = match outcome {
        PlateOutcome::Recognized { recognition, .. } => recognition
            .text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect(),
        _ => String::new(),
    };

    if sanitized.is_empty() {
        format!("plate_unrecognized_{}.jpg", stamp)
    } else {
        format!("plate_{}_{}.jpg", sanitized, stamp)
    }
}

fn write_jpeg(image: &DynamicImage, path: &Path) -> Result<(), PlateError> {
    // JPEG has no alpha channel
    image
        .to_rgb8()
        .save(path)
        .map_err(|source| PlateError::WriteArtifact {
            path: path.to_path_buf(),
            source,
        })
}
