pub mod ocr;
pub mod shared;
pub mod whitelist;
#[cfg(feature = "tesseract")]
pub mod tesseract;

use std::sync::Arc;

use image::DynamicImage;
use tracing::{Span, info, warn};

use crate::error::PlateError;
use crate::models::{EngineRole, PlateRegion, Recognition};

pub use ocr::OcrsEngine;
pub use shared::SharedEngine;
pub use whitelist::WhitelistEngine;
#[cfg(feature = "tesseract")]
pub use tesseract::TesseractEngine;

/// Characters a plate reading may contain.
pub const PLATE_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A capability that reads text from an image.
///
/// An empty string means "nothing recognized"; `Err` is reserved for the
/// engine itself failing.
pub trait TextEngine: Send + Sync {
    /// Human-readable engine name (used in logs and errors)
    fn name(&self) -> &str;

    fn read_text(&self, image: &DynamicImage) -> anyhow::Result<String>;

    /// Text split into trimmed, non-blank lines, top to bottom
    fn read_lines(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        Ok(self
            .read_text(image)?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl<E: TextEngine + ?Sized> TextEngine for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn read_text(&self, image: &DynamicImage) -> anyhow::Result<String> {
        (**self).read_text(image)
    }

    fn read_lines(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        (**self).read_lines(image)
    }
}

/// Two-stage OCR cascade: the primary engine is tried first and the
/// secondary only runs when the primary comes back empty.
#[derive(Clone)]
pub struct TextRecognizer {
    primary: Arc<dyn TextEngine>,
    secondary: Arc<dyn TextEngine>,
    span: Span,
}

impl TextRecognizer {
    pub fn new(primary: Arc<dyn TextEngine>, secondary: Arc<dyn TextEngine>) -> Self {
        Self {
            primary,
            secondary,
            span: Span::none(),
        }
    }

    /// Attach the span that all recognizer events are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn recognize(&self, region: &PlateRegion) -> Result<Recognition, PlateError> {
        let _entered = self.span.enter();

        let text = self.read_with(&self.primary, &region.image)?;
        if !text.is_empty() {
            info!(engine = self.primary.name(), text = %text, "Text recognized by primary engine");
            return Ok(Recognition {
                text,
                engine: EngineRole::Primary,
            });
        }

        info!(
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            "Primary engine recognized nothing, falling back"
        );
        let text = self.read_with(&self.secondary, &region.image)?;
        if text.is_empty() {
            warn!("Neither OCR engine recognized any text");
        } else {
            info!(engine = self.secondary.name(), text = %text, "Text recognized by secondary engine");
        }

        Ok(Recognition {
            text,
            engine: EngineRole::Secondary,
        })
    }

    fn read_with(&self, engine: &Arc<dyn TextEngine>, image: &DynamicImage) -> Result<String, PlateError> {
        engine
            .read_text(image)
            .map(|text| text.trim().to_string())
            .map_err(|e| PlateError::engine(engine.name(), e))
    }
}
