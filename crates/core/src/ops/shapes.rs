pub use imageproc::point::Point;

/// A contour as extracted by [`crate::ops::contours::find_contours`], with
/// its border type and the index of its parent.
pub type Contour = imageproc::contours::Contour<i32>;

/// Upright rectangle covering `width` × `height` pixels from `(x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    pub center: (f32, f32),
    pub radius: f32,
}

impl Circle {
    pub fn new(center: (f32, f32), radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Ellipse with full axis lengths and a rotation in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ellipse {
    pub center: (f32, f32),
    /// `(width, height)` before rotation.
    pub axes: (f32, f32),
    pub angle: f32,
}

impl Ellipse {
    pub fn new(center: (f32, f32), axes: (f32, f32), angle: f32) -> Self {
        Self {
            center,
            axes,
            angle,
        }
    }

    /// Points along the outline, clockwise in image coordinates.
    pub fn outline(&self, segments: usize) -> Vec<Point<f32>> {
        let (cx, cy) = self.center;
        let (a, b) = (self.axes.0 / 2.0, self.axes.1 / 2.0);
        let (sin, cos) = self.angle.to_radians().sin_cos();
        (0..segments)
            .map(|i| {
                let t = i as f32 / segments as f32 * std::f32::consts::TAU;
                let (x, y) = (a * t.cos(), b * t.sin());
                Point::new(cx + x * cos - y * sin, cy + x * sin + y * cos)
            })
            .collect()
    }
}

/// Minimum-area rectangle at any rotation, as its four corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RotatedRect {
    pub corners: [Point<i32>; 4],
}

/// One shape or many, accepted uniformly by the drawing and mask helpers.
pub trait Shapes<T> {
    fn as_shapes(&self) -> &[T];
}

macro_rules! impl_shapes {
    ($($shape:ty),*) => {$(
        impl Shapes<$shape> for $shape {
            fn as_shapes(&self) -> &[$shape] {
                std::slice::from_ref(self)
            }
        }

        impl Shapes<$shape> for [$shape] {
            fn as_shapes(&self) -> &[$shape] {
                self
            }
        }

        impl<const N: usize> Shapes<$shape> for [$shape; N] {
            fn as_shapes(&self) -> &[$shape] {
                self
            }
        }

        impl Shapes<$shape> for Vec<$shape> {
            fn as_shapes(&self) -> &[$shape] {
                self
            }
        }
    )*};
}

impl_shapes!(Rect, Circle, Ellipse, RotatedRect, Contour);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn count<T, S: Shapes<T> + ?Sized>(shapes: &S) -> usize {
        shapes.as_shapes().len()
    }

    #[test]
    fn test_single_and_many_are_uniform() {
        let rect = Rect::new(0, 0, 2, 2);
        assert_eq!(count(&rect), 1);
        assert_eq!(count(&[rect, rect]), 2);
        assert_eq!(count(&vec![rect; 3]), 3);
        assert_eq!(count(&[rect; 4][..]), 4);
    }

    #[test]
    fn test_ellipse_outline_follows_rotation() {
        let ellipse = Ellipse::new((10.0, 10.0), (8.0, 2.0), 90.0);
        let points = ellipse.outline(4);
        // the long axis now runs vertically
        assert_relative_eq!(points[0].x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(points[0].y, 14.0, epsilon = 1e-4);
        assert_relative_eq!(points[1].x, 9.0, epsilon = 1e-4);
        assert_relative_eq!(points[1].y, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_rect_area() {
        assert_eq!(Rect::new(5, 5, 3, 4).area(), 12);
    }
}
