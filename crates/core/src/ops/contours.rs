use crate::ops::error::{require_gray, OpsError};
use crate::ops::geometry::area;
use crate::ops::shapes::Contour;
use crate::shared::frame::Frame;

/// Borders of the non-zero regions of a grayscale frame.
///
/// Each contour records whether it bounds a region or a hole, and the index
/// of the contour enclosing it.
pub fn find_contours(frame: &Frame) -> Result<Vec<Contour>, OpsError> {
    require_gray(frame)?;
    let image = image::GrayImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or(OpsError::ChannelMismatch {
            expected: "grayscale",
            found: frame.channels(),
        })?;
    let contours = imageproc::contours::find_contours::<i32>(&image);
    log::trace!("Found {} contours", contours.len());
    Ok(contours)
}

/// Translates contours by `(dx, dy)` in place, e.g. to map contours found in
/// a crop back to the full frame.
pub fn cast_contours(contours: &mut [Contour], dx: i32, dy: i32) {
    for contour in contours {
        for point in &mut contour.points {
            point.x += dx;
            point.y += dy;
        }
    }
}

/// The contour with the smallest area; the first one on ties.
pub fn smallest(contours: &[Contour]) -> Option<&Contour> {
    contours
        .iter()
        .map(|c| (c, area(c)))
        .fold(None, |best: Option<(&Contour, f64)>, (c, a)| match best {
            Some((_, best_area)) if best_area <= a => best,
            _ => Some((c, a)),
        })
        .map(|(c, _)| c)
}

/// The contour with the largest area; the first one on ties.
pub fn largest(contours: &[Contour]) -> Option<&Contour> {
    contours
        .iter()
        .map(|c| (c, area(c)))
        .fold(None, |best: Option<(&Contour, f64)>, (c, a)| match best {
            Some((_, best_area)) if best_area >= a => best,
            _ => Some((c, a)),
        })
        .map(|(c, _)| c)
}

/// Contours without an enclosing contour.
pub fn parents(contours: &[Contour]) -> Vec<Contour> {
    contours
        .iter()
        .filter(|c| c.parent.is_none())
        .cloned()
        .collect()
}
