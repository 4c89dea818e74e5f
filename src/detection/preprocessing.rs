use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{close, open};

/// Image whose three channels hold hue, saturation and value.
///
/// Hue is stored in half-degrees (0..=180) so it fits a byte; saturation and
/// value span 0..=255.
pub type HsvImage = RgbImage;

/// Inclusive bounds on each HSV channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv(Rgb([r, g, b]): Rgb<u8>) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue < 0.0 {
        hue += 360.0;
    }

    [
        (hue / 2.0).round() as u8,
        saturation.round() as u8,
        max as u8,
    ]
}

/// Convert image to HSV
pub fn to_hsv(img: &DynamicImage) -> HsvImage {
    let rgb = img.to_rgb8();
    let mut hsv = RgbImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        hsv.put_pixel(x, y, Rgb(rgb_to_hsv(*pixel)));
    }
    hsv
}

/// Mark pixels inside the range with 255, everything else with 0
pub fn in_range(hsv: &HsvImage, range: &HsvRange) -> GrayImage {
    GrayImage::from_fn(hsv.width(), hsv.height(), |x, y| {
        if range.contains(hsv.get_pixel(x, y).0) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Pixel-wise OR of two masks of equal size
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0] | b.get_pixel(x, y)[0]])
    })
}

/// Close then open the mask with a square structuring element of side
/// `2 * radius + 1`, merging nearby fragments and removing speckles.
pub fn clean_mask(mask: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    let closed = close(mask, Norm::LInf, radius);
    open(&closed, Norm::LInf, radius)
}
