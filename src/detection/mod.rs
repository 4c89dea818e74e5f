pub mod preprocessing;
pub mod contours;

use image::{DynamicImage, GrayImage};
use tracing::{Span, debug};

use crate::error::PlateError;
use crate::models::{BoundingBox, Contour, PlateRegion};
use preprocessing::HsvRange;

/// Thresholds used to pick the plate region.
#[derive(Debug, Clone)]
pub struct LocatorParams {
    /// Yellow plate backgrounds
    pub yellow: HsvRange,
    /// White or light plate backgrounds (low saturation, high value)
    pub white: HsvRange,
    /// Structuring element radius for mask cleanup (2 → 5x5)
    pub kernel_radius: u8,
    /// How many of the largest contours are examined
    pub max_candidates: usize,
    /// Polygon approximation tolerance as a fraction of the perimeter
    pub approx_tolerance: f64,
    pub min_vertices: usize,
    pub max_vertices: usize,
    pub min_aspect: f64,
    pub max_aspect: f64,
    /// Contour area must be strictly greater than this
    pub min_area: f64,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            yellow: HsvRange::new([10, 50, 50], [40, 255, 255]),
            white: HsvRange::new([0, 0, 200], [180, 30, 255]),
            kernel_radius: 2,
            max_candidates: 10,
            approx_tolerance: 0.02,
            min_vertices: 4,
            max_vertices: 8,
            min_aspect: 1.0,
            max_aspect: 6.0,
            min_area: 500.0,
        }
    }
}

/// Finds the single most plate-like region of a vehicle image
pub struct PlateLocator {
    pub params: LocatorParams,
    span: Span,
}

impl PlateLocator {
    pub fn new() -> Self {
        Self {
            params: LocatorParams::default(),
            span: Span::none(),
        }
    }

    pub fn with_params(mut self, params: LocatorParams) -> Self {
        self.params = params;
        self
    }

    /// Attach the span that all locator events are recorded under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Locate the plate region, or `Ok(None)` when nothing qualifies.
    ///
    /// Candidates are tried largest first; the first one that passes every
    /// shape filter wins.
    pub fn locate(&self, img: &DynamicImage) -> Result<Option<PlateRegion>, PlateError> {
        let _entered = self.span.enter();

        if img.width() == 0 || img.height() == 0 {
            return Err(PlateError::InvalidImage {
                width: img.width(),
                height: img.height(),
            });
        }

        let candidates = self.candidate_contours(img);
        debug!(contours = candidates.len(), "Examining candidate contours");

        for (i, contour) in candidates.iter().enumerate() {
            let Some(bbox) = self.plate_bounds(contour) else {
                continue;
            };
            if !bbox.fits_within(img.width(), img.height()) {
                continue;
            }

            debug!(
                candidate = i + 1,
                x = bbox.x,
                y = bbox.y,
                width = bbox.width,
                height = bbox.height,
                "Plate region located"
            );
            let image = img.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
            return Ok(Some(PlateRegion { image, bbox }));
        }

        debug!("No contour passed the plate filters");
        Ok(None)
    }

    /// Binary mask of plate-coloured pixels after morphological cleanup
    pub fn plate_mask(&self, img: &DynamicImage) -> GrayImage {
        let hsv = preprocessing::to_hsv(img);
        let yellow = preprocessing::in_range(&hsv, &self.params.yellow);
        let white = preprocessing::in_range(&hsv, &self.params.white);
        let combined = preprocessing::union(&yellow, &white);
        preprocessing::clean_mask(&combined, self.params.kernel_radius)
    }

    /// Largest external contours of the plate mask, in the order they are tried
    pub fn candidate_contours(&self, img: &DynamicImage) -> Vec<Contour> {
        let mask = self.plate_mask(img);
        let all = contours::find_external_contours(&mask);
        contours::largest_contours(all, self.params.max_candidates)
    }

    /// Bounding box of a contour if it has a plate's shape, `None` otherwise
    pub fn plate_bounds(&self, contour: &Contour) -> Option<BoundingBox> {
        let p = &self.params;

        let polygon = contour.approximate(p.approx_tolerance);
        if polygon.len() < p.min_vertices || polygon.len() > p.max_vertices {
            return None;
        }

        let bbox = BoundingBox::enclosing(&polygon)?;
        let aspect = bbox.aspect_ratio();
        let area = contour.area();

        let accepted = aspect >= p.min_aspect && aspect <= p.max_aspect && area > p.min_area;
        debug!(
            vertices = polygon.len(),
            aspect,
            area,
            accepted,
            "Checked contour shape"
        );
        accepted.then_some(bbox)
    }
}

impl Default for PlateLocator {
    fn default() -> Self {
        Self::new()
    }
}
