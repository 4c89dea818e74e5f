use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use tracing::info;

use super::TextEngine;

const DETECTION_MODEL: &str = "text-detection.rten";
const RECOGNITION_MODEL: &str = "text-recognition.rten";

/// Standard ocrs model cache location (`~/.cache/ocrs`)
pub fn default_model_dir() -> anyhow::Result<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))?;
    Ok(Path::new(&home_dir).join(".cache/ocrs"))
}

/// General-purpose text detection and recognition backed by `ocrs`.
///
/// Every detected line is read and the fragments are joined in the order
/// the engine reports them, without separators.
pub struct OcrsEngine {
    engine: OcrEngine,
}

impl OcrsEngine {
    /// Load the detection and recognition models from `model_dir`
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let detection_model_path = model_dir.join(DETECTION_MODEL);
        let recognition_model_path = model_dir.join(RECOGNITION_MODEL);

        if !detection_model_path.exists() || !recognition_model_path.exists() {
            anyhow::bail!(
                "OCR models not found. Please run: ocrs-cli --help (or download models manually)\n\
                 Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            );
        }

        info!(model_dir = %model_dir.display(), "Loading ocrs models");
        let detection_model = Model::load_file(&detection_model_path)?;
        let recognition_model = Model::load_file(&recognition_model_path)?;

        let engine = OcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })?;

        Ok(Self { engine })
    }

    /// Recognized text lines, top to bottom, blank lines dropped
    pub fn lines(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        let img = image.to_rgb8();
        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| anyhow::anyhow!("Invalid OCR input image: {:?}", e))?;
        let ocr_input = self.engine.prepare_input(img_source)?;
        let text = self.engine.get_text(&ocr_input)?;

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl TextEngine for OcrsEngine {
    fn name(&self) -> &str {
        "ocrs"
    }

    fn read_text(&self, image: &DynamicImage) -> anyhow::Result<String> {
        Ok(self.lines(image)?.concat())
    }

    fn read_lines(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        self.lines(image)
    }
}
