use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};
use platescan::{PlateLocator, PlatePipeline, TextEngine, TextRecognizer};

/// Dark blue: neither yellow nor white under the plate thresholds
pub const BACKGROUND: Rgb<u8> = Rgb([20, 30, 90]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const YELLOW: Rgb<u8> = Rgb([255, 200, 0]);

/// Creates a `width` x `height` scene filled with [`BACKGROUND`].
pub fn blank_scene(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, BACKGROUND)
}

pub fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for yy in y..y + h {
        for xx in x..x + w {
            img.put_pixel(xx, yy, color);
        }
    }
}

/// Scene with a single solid rectangle of `color` at `(x, y, w, h)`.
pub fn scene_with_rect(
    width: u32,
    height: u32,
    (x, y, w, h): (u32, u32, u32, u32),
    color: Rgb<u8>,
) -> DynamicImage {
    let mut img = blank_scene(width, height);
    fill_rect(&mut img, x, y, w, h, color);
    DynamicImage::ImageRgb8(img)
}

/// The canonical test plate: 200x50 white on a 400x300 scene at (100, 125).
pub fn white_plate_scene() -> DynamicImage {
    scene_with_rect(400, 300, (100, 125, 200, 50), WHITE)
}

/// Engine double that returns a fixed reply and counts its calls.
pub struct ScriptedEngine {
    name: &'static str,
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn replying(name: &'static str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            name,
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextEngine for ScriptedEngine {
    fn name(&self) -> &str {
        self.name
    }

    fn read_text(&self, _image: &DynamicImage) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}

pub fn recognizer(primary: &Arc<ScriptedEngine>, secondary: &Arc<ScriptedEngine>) -> TextRecognizer {
    TextRecognizer::new(primary.clone(), secondary.clone())
}

pub fn pipeline(primary: &Arc<ScriptedEngine>, secondary: &Arc<ScriptedEngine>) -> PlatePipeline {
    PlatePipeline::new(PlateLocator::new(), recognizer(primary, secondary))
}
