use image::DynamicImage;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

/// Text reported for a plate that was located but could not be read.
pub const UNKNOWN_PLATE_TEXT: &str = "unknown";

/// Outer boundary of one connected region of the plate mask.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    /// Enclosed area of the boundary polygon (shoelace formula).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut twice_area = 0i64;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        }
        (twice_area as f64 / 2.0).abs()
    }

    /// Length of the closed boundary.
    pub fn perimeter(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        arc_length(&self.points, true)
    }

    /// Simplify the boundary to a closed polygon, with a tolerance expressed
    /// as a fraction of the perimeter.
    ///
    /// The loop is cut at its first point and at the point farthest from it;
    /// each half is simplified as an open chain (Douglas-Peucker) and the two
    /// are joined without repeating the shared ends. Degenerate contours
    /// (fewer than three points, or zero length) are returned unchanged.
    pub fn approximate(&self, tolerance_ratio: f64) -> Vec<Point<i32>> {
        let epsilon = tolerance_ratio * self.perimeter();
        if self.points.len() < 3 || epsilon <= 0.0 {
            return self.points.clone();
        }

        let start = self.points[0];
        let (far, _) = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (dx, dy) = ((p.x - start.x) as i64, (p.y - start.y) as i64);
                (i, dx * dx + dy * dy)
            })
            .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if far == 0 {
            return vec![start];
        }

        let first_half = &self.points[..=far];
        let mut second_half = self.points[far..].to_vec();
        second_half.push(start);

        let mut polygon = approximate_polygon_dp(first_half, epsilon, false);
        let back = approximate_polygon_dp(&second_half, epsilon, false);
        // `back` runs far..=start; both ends are already in `polygon`
        polygon.extend_from_slice(&back[1..back.len() - 1]);
        polygon
    }
}

/// Axis-aligned rectangle in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Smallest box containing every point, inclusive of the edge pixels.
    ///
    /// Returns `None` for an empty slice or points with negative coordinates.
    pub fn enclosing(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        if min_x < 0 || min_y < 0 {
            return None;
        }

        Some(Self {
            x: min_x as u32,
            y: min_y as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// A crop of the source image believed to contain a plate.
#[derive(Debug, Clone)]
pub struct PlateRegion {
    pub image: DynamicImage,
    pub bbox: BoundingBox,
}

/// Which engine of the OCR cascade produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRole {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognition {
    /// Whitespace-trimmed text, possibly empty.
    pub text: String,
    pub engine: EngineRole,
}

impl Recognition {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Terminal result of running the pipeline on one image.
#[derive(Debug, Clone)]
pub enum PlateOutcome {
    /// No contour passed the plate filters.
    NotFound,
    /// A plate was located and one of the engines read it.
    Recognized {
        region: PlateRegion,
        recognition: Recognition,
    },
    /// A plate was located but neither engine produced text.
    Unrecognized { region: PlateRegion },
}

impl PlateOutcome {
    pub fn region(&self) -> Option<&PlateRegion> {
        match self {
            PlateOutcome::NotFound => None,
            PlateOutcome::Recognized { region, .. } | PlateOutcome::Unrecognized { region } => {
                Some(region)
            }
        }
    }

    /// Plate text, with [`UNKNOWN_PLATE_TEXT`] standing in for an unreadable plate.
    pub fn text(&self) -> Option<&str> {
        match self {
            PlateOutcome::NotFound => None,
            PlateOutcome::Recognized { recognition, .. } => Some(recognition.text.as_str()),
            PlateOutcome::Unrecognized { .. } => Some(UNKNOWN_PLATE_TEXT),
        }
    }

    pub fn is_found(&self) -> bool {
        !matches!(self, PlateOutcome::NotFound)
    }

    /// Split into the `(region, text)` pair handed to callers.
    pub fn into_parts(self) -> (Option<DynamicImage>, Option<String>) {
        match self {
            PlateOutcome::NotFound => (None, None),
            PlateOutcome::Recognized {
                region,
                recognition,
            } => (Some(region.image), Some(recognition.text)),
            PlateOutcome::Unrecognized { region } => {
                (Some(region.image), Some(UNKNOWN_PLATE_TEXT.to_string()))
            }
        }
    }
}
