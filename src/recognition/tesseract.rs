use std::io::Cursor;
use std::sync::{Mutex, PoisonError};

use anyhow::Context;
use image::{DynamicImage, ImageFormat};
use leptess::{LepTess, Variable};

use super::{PLATE_CHARSET, TextEngine};

/// Page segmentation mode 7: treat the image as a single text line
pub const SINGLE_LINE_PSM: &str = "7";

/// Variables applied to every Tesseract handle this engine creates
pub fn plate_settings() -> [(Variable, &'static str); 2] {
    [
        (Variable::TesseditPagesegMode, SINGLE_LINE_PSM),
        (Variable::TesseditCharWhitelist, PLATE_CHARSET),
    ]
}

/// Tesseract configured for single-line plate text.
pub struct TesseractEngine {
    api: Mutex<LepTess>,
}

// SAFETY: the Tesseract handle is only touched through the mutex, so it is
// never used from two threads at once.
unsafe impl Send for TesseractEngine {}
unsafe impl Sync for TesseractEngine {}

impl TesseractEngine {
    /// `datapath` points at a tessdata directory; `None` uses Tesseract's default
    pub fn new(datapath: Option<&str>) -> anyhow::Result<Self> {
        let mut api = LepTess::new(datapath, "eng")
            .context("Failed to initialize Tesseract. Is Tesseract installed?")?;
        for (variable, value) in plate_settings() {
            api.set_variable(variable, value)
                .with_context(|| format!("Failed to set Tesseract variable to {value:?}"))?;
        }
        Ok(Self {
            api: Mutex::new(api),
        })
    }
}

impl TextEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn read_text(&self, image: &DynamicImage) -> anyhow::Result<String> {
        let mut png = Vec::new();
        image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let mut api = self.api.lock().unwrap_or_else(PoisonError::into_inner);
        api.set_image_from_mem(&png)?;
        Ok(api.get_utf8_text()?)
    }
}
