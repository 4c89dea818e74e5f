use image::{GrayImage, imageops};
use imageproc::contours::BorderType;
use imageproc::point::Point;

use crate::models::Contour;

/// Find the outermost contours of a binary mask (nested borders are ignored).
///
/// Pixels outside the mask count as background, so shapes touching the
/// frame edge still get an outer border.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut padded = GrayImage::new(width + 2, height + 2);
    imageops::overlay(&mut padded, mask, 1, 1);

    let max_x = width as i32 - 1;
    let max_y = height as i32 - 1;

    imageproc::contours::find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new((p.x - 1).clamp(0, max_x), (p.y - 1).clamp(0, max_y)))
                .collect();
            Contour::new(points)
        })
        .collect()
}

/// Order contours by enclosed area, largest first, and keep at most `limit`.
///
/// The sort is stable: contours with equal area keep their discovery order.
pub fn largest_contours(contours: Vec<Contour>, limit: usize) -> Vec<Contour> {
    let mut by_area: Vec<(f64, Contour)> = contours
        .into_iter()
        .map(|c| (c.area(), c))
        .collect();

    by_area.sort_by(|a, b| b.0.total_cmp(&a.0));

    by_area.into_iter()
        .take(limit)
        .map(|(_, c)| c)
        .collect()
}

