use imageproc::geometry::{contour_area, convex_hull, min_area_rect};

use crate::ops::shapes::{Circle, Contour, Ellipse, Point, Rect, RotatedRect, Shapes};
use crate::shared::constants::MIN_ELLIPSE_POINTS;

/// Smallest upright rectangle containing every point of each contour.
pub fn fit_rectangles<S: Shapes<Contour> + ?Sized>(contours: &S) -> Vec<Rect> {
    contours
        .as_shapes()
        .iter()
        .map(|c| bounding_rect(&c.points))
        .collect()
}

/// Minimum-area rectangle at any rotation for each contour.
pub fn fit_rotated_rectangles<S: Shapes<Contour> + ?Sized>(contours: &S) -> Vec<RotatedRect> {
    contours
        .as_shapes()
        .iter()
        .filter(|c| !c.points.is_empty())
        .map(|c| RotatedRect {
            corners: min_area_rect(c.points.as_slice()),
        })
        .collect()
}

/// Minimum enclosing circle of each contour.
pub fn fit_circles<S: Shapes<Contour> + ?Sized>(contours: &S) -> Vec<Circle> {
    contours
        .as_shapes()
        .iter()
        .map(|c| enclosing_circle(&c.points))
        .collect()
}

/// Ellipse with the same second moments as each contour. Contours with
/// fewer than five points are skipped.
pub fn fit_ellipses<S: Shapes<Contour> + ?Sized>(contours: &S) -> Vec<Ellipse> {
    contours
        .as_shapes()
        .iter()
        .filter_map(|c| fit_ellipse(&c.points))
        .collect()
}

/// Unsigned area enclosed by the contour.
pub fn area(contour: &Contour) -> f64 {
    contour_area(&contour.points).abs()
}

/// `sqrt(1 - (minor / major)^2)` of the fitted ellipse.
pub fn eccentricity(contour: &Contour) -> Option<f64> {
    let ellipse = fit_ellipse(&contour.points)?;
    let major = ellipse.axes.0.max(ellipse.axes.1) as f64;
    let minor = ellipse.axes.0.min(ellipse.axes.1) as f64;
    if major <= 0.0 {
        return None;
    }
    Some((1.0 - (minor / major).powi(2)).sqrt())
}

/// Contour area over convex hull area. `None` for a zero-area hull.
pub fn solidity(contour: &Contour) -> Option<f64> {
    if contour.points.is_empty() {
        return None;
    }
    let hull = convex_hull(contour.points.as_slice());
    let hull_area = contour_area(&hull).abs();
    if hull_area == 0.0 {
        return None;
    }
    Some(area(contour) / hull_area)
}

pub(crate) fn bounding_rect(points: &[Point<i32>]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::default();
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect::new(
        min_x,
        min_y,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    )
}

type Disc = ((f64, f64), f64);

const EPSILON: f64 = 1e-7;

fn contains(disc: &Disc, p: (f64, f64)) -> bool {
    let ((cx, cy), r) = *disc;
    (p.0 - cx).hypot(p.1 - cy) <= r + EPSILON
}

fn disc_from_two(a: (f64, f64), b: (f64, f64)) -> Disc {
    let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    (center, (a.0 - b.0).hypot(a.1 - b.1) / 2.0)
}

fn disc_from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Disc {
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < EPSILON {
        // collinear: the two farthest points span the circle
        return [disc_from_two(a, b), disc_from_two(a, c), disc_from_two(b, c)]
            .into_iter()
            .fold(((0.0, 0.0), f64::MIN), |best, disc| {
                if disc.1 > best.1 {
                    disc
                } else {
                    best
                }
            });
    }
    let (a2, b2, c2) = (
        a.0 * a.0 + a.1 * a.1,
        b.0 * b.0 + b.1 * b.1,
        c.0 * c.0 + c.1 * c.1,
    );
    let ux = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let uy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    ((ux, uy), (a.0 - ux).hypot(a.1 - uy))
}

/// Incremental Welzl construction.
fn enclosing_circle(points: &[Point<i32>]) -> Circle {
    let pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    let Some(&first) = pts.first() else {
        return Circle::default();
    };

    let mut disc: Disc = (first, 0.0);
    for i in 1..pts.len() {
        if contains(&disc, pts[i]) {
            continue;
        }
        disc = (pts[i], 0.0);
        for j in 0..i {
            if contains(&disc, pts[j]) {
                continue;
            }
            disc = disc_from_two(pts[i], pts[j]);
            for k in 0..j {
                if !contains(&disc, pts[k]) {
                    disc = disc_from_three(pts[i], pts[j], pts[k]);
                }
            }
        }
    }
    let ((x, y), r) = disc;
    Circle::new((x as f32, y as f32), r as f32)
}

/// Raw and second-order moments of a shape.
struct Moments {
    m00: f64,
    m10: f64,
    m01: f64,
    m20: f64,
    m11: f64,
    m02: f64,
}

impl Moments {
    /// Moments of the region enclosed by a closed polygon (Green's theorem).
    fn of_polygon(pts: &[(f64, f64)]) -> Self {
        let mut m = Moments {
            m00: 0.0,
            m10: 0.0,
            m01: 0.0,
            m20: 0.0,
            m11: 0.0,
            m02: 0.0,
        };
        for (i, &(x0, y0)) in pts.iter().enumerate() {
            let (x1, y1) = pts[(i + 1) % pts.len()];
            let cross = x0 * y1 - x1 * y0;
            m.m00 += cross;
            m.m10 += cross * (x0 + x1);
            m.m01 += cross * (y0 + y1);
            m.m20 += cross * (x0 * x0 + x0 * x1 + x1 * x1);
            m.m02 += cross * (y0 * y0 + y0 * y1 + y1 * y1);
            m.m11 += cross * (x0 * y1 + 2.0 * x0 * y0 + 2.0 * x1 * y1 + x1 * y0);
        }
        m.m00 /= 2.0;
        m.m10 /= 6.0;
        m.m01 /= 6.0;
        m.m20 /= 12.0;
        m.m02 /= 12.0;
        m.m11 /= 24.0;
        m
    }

    /// Moments of the points themselves, each with unit mass.
    fn of_points(pts: &[(f64, f64)]) -> Self {
        pts.iter().fold(
            Moments {
                m00: 0.0,
                m10: 0.0,
                m01: 0.0,
                m20: 0.0,
                m11: 0.0,
                m02: 0.0,
            },
            |m, &(x, y)| Moments {
                m00: m.m00 + 1.0,
                m10: m.m10 + x,
                m01: m.m01 + y,
                m20: m.m20 + x * x,
                m11: m.m11 + x * y,
                m02: m.m02 + y * y,
            },
        )
    }

    /// Centroid and normalised central moments `(mu20, mu11, mu02)`.
    fn central(&self) -> ((f64, f64), (f64, f64, f64)) {
        let cx = self.m10 / self.m00;
        let cy = self.m01 / self.m00;
        (
            (cx, cy),
            (
                self.m20 / self.m00 - cx * cx,
                self.m11 / self.m00 - cx * cy,
                self.m02 / self.m00 - cy * cy,
            ),
        )
    }
}

fn fit_ellipse(points: &[Point<i32>]) -> Option<Ellipse> {
    if points.len() < MIN_ELLIPSE_POINTS {
        return None;
    }
    let pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();

    // A filled ellipse with semi-axis `a` has variance a²/4 along that axis.
    // Degenerate outlines (lines) fall back to the point spread, where a
    // segment of length `l` has variance l²/12.
    let polygon = Moments::of_polygon(&pts);
    let (moments, scale) = if polygon.m00.abs() > EPSILON {
        (polygon, 16.0)
    } else {
        (Moments::of_points(&pts), 12.0)
    };

    let (center, (a, b, c)) = moments.central();
    let half_trace = (a + c) / 2.0;
    let spread = (((a - c) / 2.0).powi(2) + b * b).sqrt();
    let major = (half_trace + spread).max(0.0);
    let minor = (half_trace - spread).max(0.0);
    let angle = 0.5 * (2.0 * b).atan2(a - c);

    Some(Ellipse::new(
        (center.0 as f32, center.1 as f32),
        (
            (scale * major).sqrt() as f32,
            (scale * minor).sqrt() as f32,
        ),
        angle.to_degrees() as f32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::contours::find_contours;
    use crate::shared::frame::Frame;
    use approx::assert_relative_eq;
    use imageproc::contours::BorderType;

    fn contour(points: &[(i32, i32)]) -> Contour {
        Contour {
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            border_type: BorderType::Outer,
            parent: None,
        }
    }

    fn square(x: i32, y: i32, side: i32) -> Contour {
        contour(&[(x, y), (x + side, y), (x + side, y + side), (x, y + side)])
    }

    fn blob(draw: impl FnOnce(&mut image::GrayImage)) -> Contour {
        let mut img = image::GrayImage::new(120, 120);
        draw(&mut img);
        let frame = Frame::from_gray_image(img, 0);
        find_contours(&frame).unwrap().remove(0)
    }

    #[test]
    fn test_bounding_rect_is_inclusive() {
        let rects = fit_rectangles(&square(2, 3, 4));
        assert_eq!(rects, vec![Rect::new(2, 3, 5, 5)]);
    }

    #[test]
    fn test_enclosing_circle_of_square() {
        let circle = fit_circles(&square(0, 0, 10))[0];
        assert_relative_eq!(circle.center.0, 5.0, epsilon = 1e-4);
        assert_relative_eq!(circle.center.1, 5.0, epsilon = 1e-4);
        assert_relative_eq!(circle.radius, 50f32.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn test_enclosing_circle_contains_every_point() {
        let c = contour(&[(0, 0), (7, 1), (3, 9), (-4, 5), (2, 2), (6, 6), (-1, -3)]);
        let circle = fit_circles(&c)[0];
        for p in &c.points {
            let d = (p.x as f32 - circle.center.0).hypot(p.y as f32 - circle.center.1);
            assert!(d <= circle.radius + 1e-3);
        }
    }

    #[test]
    fn test_enclosing_circle_of_collinear_points() {
        let circle = fit_circles(&contour(&[(0, 0), (5, 0), (10, 0)]))[0];
        assert_relative_eq!(circle.center.0, 5.0, epsilon = 1e-4);
        assert_relative_eq!(circle.radius, 5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_area_and_solidity_of_square() {
        let c = square(0, 0, 10);
        assert_relative_eq!(area(&c), 100.0);
        assert_relative_eq!(solidity(&c).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_solidity_of_concave_shape() {
        // an L shape: 3 of the 4 unit quadrants of a 2x2 square
        let c = contour(&[(0, 0), (2, 0), (2, 1), (1, 1), (1, 2), (0, 2)]);
        assert_relative_eq!(solidity(&c).unwrap(), 3.0 / 3.5, epsilon = 1e-9);
    }

    #[test]
    fn test_solidity_skips_degenerate_hull() {
        assert_eq!(solidity(&contour(&[(0, 0), (4, 0), (8, 0)])), None);
    }

    #[test]
    fn test_ellipse_needs_five_points() {
        assert!(fit_ellipses(&square(0, 0, 4)).is_empty());
        assert_eq!(eccentricity(&square(0, 0, 4)), None);
    }

    #[test]
    fn test_circle_has_low_eccentricity() {
        let c = blob(|img| {
            imageproc::drawing::draw_filled_circle_mut(img, (60, 60), 30, image::Luma([255]))
        });
        let e = eccentricity(&c).unwrap();
        assert!(e < 0.3, "eccentricity {e}");

        let ellipse = fit_ellipses(&c)[0];
        assert_relative_eq!(ellipse.center.0, 60.0, epsilon = 0.5);
        assert_relative_eq!(ellipse.axes.0, 60.0, epsilon = 3.0);
    }

    #[test]
    fn test_elongated_ellipse_has_high_eccentricity() {
        let c = blob(|img| {
            imageproc::drawing::draw_filled_ellipse_mut(img, (60, 60), 40, 10, image::Luma([255]))
        });
        let e = eccentricity(&c).unwrap();
        assert!(e > 0.9, "eccentricity {e}");

        let ellipse = fit_ellipses(&c)[0];
        assert!(ellipse.angle.abs() < 5.0);
        assert!(ellipse.axes.0 > ellipse.axes.1);
    }

    #[test]
    fn test_rotated_rectangle_of_square() {
        let rect = fit_rotated_rectangles(&square(1, 1, 5))[0];
        let xs: Vec<i32> = rect.corners.iter().map(|p| p.x).collect();
        assert!(xs.contains(&1) && xs.contains(&6));
    }
}
