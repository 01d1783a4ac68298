//! Stateless helpers for colour conversion, drawing, masking and contour
//! filtering.

pub mod color;
pub mod contours;
pub mod drawing;
pub mod error;
pub mod filters;
pub mod geometry;
pub mod mask;
pub mod shapes;

pub use color::{gray, hsv, rgb};
pub use contours::{cast_contours, find_contours, largest, parents, smallest};
pub use drawing::{
    draw_circles, draw_contours, draw_ellipses, draw_rectangles, draw_rotated_rectangles, Color,
    DrawMode,
};
pub use error::OpsError;
pub use filters::{apply_filters, Area, ContourFilter, Eccentricity, Solidity};
pub use geometry::{fit_circles, fit_ellipses, fit_rectangles, fit_rotated_rectangles};
pub use mask::{circle_mask, contour_mask, ellipse_mask, rect_mask, shrink, Mask};
pub use shapes::{Circle, Contour, Ellipse, Point, Rect, RotatedRect, Shapes};
