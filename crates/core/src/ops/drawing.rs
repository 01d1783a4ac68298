use image::{ImageBuffer, Luma, Pixel, Rgb};
use imageproc::drawing;

use crate::ops::error::OpsError;
use crate::ops::shapes::{Circle, Contour, Ellipse, Point, Rect, RotatedRect, Shapes};
use crate::shared::frame::Frame;

/// Segments used to approximate an ellipse outline.
const ELLIPSE_SEGMENTS: usize = 90;

/// Drawing colour. Gray values may be drawn on colour frames; RGB values
/// need a colour frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Gray(u8),
    Rgb([u8; 3]),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    #[default]
    Outline,
    Filled,
}

trait Paint {
    fn segment(&mut self, from: Point<f32>, to: Point<f32>);
    fn polygon(&mut self, points: &[Point<i32>]);
    fn circle(&mut self, center: (i32, i32), radius: i32, mode: DrawMode);
    fn rect(&mut self, rect: imageproc::rect::Rect, mode: DrawMode);
    fn into_raw(self: Box<Self>) -> Vec<u8>;
}

struct Painter<P: Pixel<Subpixel = u8>> {
    image: ImageBuffer<P, Vec<u8>>,
    color: P,
}

impl<P: Pixel<Subpixel = u8> + 'static> Paint for Painter<P> {
    fn segment(&mut self, from: Point<f32>, to: Point<f32>) {
        drawing::draw_line_segment_mut(&mut self.image, (from.x, from.y), (to.x, to.y), self.color);
    }

    fn polygon(&mut self, points: &[Point<i32>]) {
        drawing::draw_polygon_mut(&mut self.image, points, self.color);
    }

    fn circle(&mut self, center: (i32, i32), radius: i32, mode: DrawMode) {
        match mode {
            DrawMode::Outline => {
                drawing::draw_hollow_circle_mut(&mut self.image, center, radius, self.color)
            }
            DrawMode::Filled => {
                drawing::draw_filled_circle_mut(&mut self.image, center, radius, self.color)
            }
        }
    }

    fn rect(&mut self, rect: imageproc::rect::Rect, mode: DrawMode) {
        match mode {
            DrawMode::Outline => drawing::draw_hollow_rect_mut(&mut self.image, rect, self.color),
            DrawMode::Filled => drawing::draw_filled_rect_mut(&mut self.image, rect, self.color),
        }
    }

    fn into_raw(self: Box<Self>) -> Vec<u8> {
        self.image.into_raw()
    }
}

/// Draws on a copy of `frame` with `f` and writes the result back.
fn paint(frame: &mut Frame, color: Color, f: impl FnOnce(&mut dyn Paint)) -> Result<(), OpsError> {
    let (w, h) = frame.resolution();
    let data = frame.data().to_vec();
    let mismatch = OpsError::ChannelMismatch {
        expected: "grayscale or RGB",
        found: frame.channels(),
    };

    let mut painter: Box<dyn Paint> = match (frame.channels(), color) {
        (1, Color::Gray(v)) => Box::new(Painter {
            image: ImageBuffer::from_raw(w, h, data).ok_or(mismatch)?,
            color: Luma([v]),
        }),
        (1, Color::Rgb(_)) => return Err(OpsError::ColorMismatch),
        (3, color) => Box::new(Painter {
            image: ImageBuffer::from_raw(w, h, data).ok_or(mismatch)?,
            color: match color {
                Color::Gray(v) => Rgb([v; 3]),
                Color::Rgb(rgb) => Rgb(rgb),
            },
        }),
        _ => return Err(mismatch),
    };

    f(painter.as_mut());
    frame.data_mut().copy_from_slice(&painter.into_raw());
    Ok(())
}

fn to_f32(p: Point<i32>) -> Point<f32> {
    Point::new(p.x as f32, p.y as f32)
}

fn outline(painter: &mut dyn Paint, points: &[Point<f32>]) {
    match points {
        [] => {}
        [only] => painter.segment(*only, *only),
        _ => {
            for (i, &from) in points.iter().enumerate() {
                painter.segment(from, points[(i + 1) % points.len()]);
            }
        }
    }
}

/// Fills a closed polygon. Repeated vertices are dropped; fewer than three
/// distinct vertices are drawn as their outline.
fn fill(painter: &mut dyn Paint, points: &[Point<i32>]) {
    let mut distinct: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &p in points {
        if distinct.last() != Some(&p) {
            distinct.push(p);
        }
    }
    while distinct.len() > 1 && distinct.first() == distinct.last() {
        distinct.pop();
    }

    if distinct.len() < 3 {
        let points: Vec<_> = distinct.into_iter().map(to_f32).collect();
        outline(painter, &points);
    } else {
        painter.polygon(&distinct);
    }
}

fn polygon(painter: &mut dyn Paint, points: &[Point<i32>], mode: DrawMode) {
    match mode {
        DrawMode::Outline => {
            let points: Vec<_> = points.iter().copied().map(to_f32).collect();
            outline(painter, &points);
        }
        DrawMode::Filled => fill(painter, points),
    }
}

pub fn draw_contours<S: Shapes<Contour> + ?Sized>(
    frame: &mut Frame,
    contours: &S,
    color: Color,
    mode: DrawMode,
) -> Result<(), OpsError> {
    paint(frame, color, |painter| {
        for contour in contours.as_shapes() {
            polygon(painter, &contour.points, mode);
        }
    })
}

/// Rectangles with no width or height are skipped.
pub fn draw_rectangles<S: Shapes<Rect> + ?Sized>(
    frame: &mut Frame,
    rects: &S,
    color: Color,
    mode: DrawMode,
) -> Result<(), OpsError> {
    paint(frame, color, |painter| {
        for r in rects.as_shapes().iter().filter(|r| r.area() > 0) {
            painter.rect(
                imageproc::rect::Rect::at(r.x, r.y).of_size(r.width, r.height),
                mode,
            );
        }
    })
}

pub fn draw_rotated_rectangles<S: Shapes<RotatedRect> + ?Sized>(
    frame: &mut Frame,
    rects: &S,
    color: Color,
    mode: DrawMode,
) -> Result<(), OpsError> {
    paint(frame, color, |painter| {
        for rect in rects.as_shapes() {
            polygon(painter, &rect.corners, mode);
        }
    })
}

pub fn draw_circles<S: Shapes<Circle> + ?Sized>(
    frame: &mut Frame,
    circles: &S,
    color: Color,
    mode: DrawMode,
) -> Result<(), OpsError> {
    paint(frame, color, |painter| {
        for c in circles.as_shapes() {
            let center = (c.center.0 as i32, c.center.1 as i32);
            painter.circle(center, c.radius as i32, mode);
        }
    })
}

pub fn draw_ellipses<S: Shapes<Ellipse> + ?Sized>(
    frame: &mut Frame,
    ellipses: &S,
    color: Color,
    mode: DrawMode,
) -> Result<(), OpsError> {
    paint(frame, color, |painter| {
        for ellipse in ellipses.as_shapes() {
            let points = ellipse.outline(ELLIPSE_SEGMENTS);
            match mode {
                DrawMode::Outline => outline(painter, &points),
                DrawMode::Filled => {
                    let points: Vec<Point<i32>> = points
                        .iter()
                        .map(|p| Point::new(p.x.round() as i32, p.y.round() as i32))
                        .collect();
                    fill(painter, &points);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::contours::BorderType;

    fn lit(frame: &Frame) -> usize {
        frame.data().iter().filter(|&&v| v > 0).count()
    }

    fn contour(points: &[(i32, i32)]) -> Contour {
        Contour {
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            border_type: BorderType::Outer,
            parent: None,
        }
    }

    #[test]
    fn test_filled_rectangle_covers_exact_area() {
        let mut frame = Frame::filled(20, 20, 1, 0);
        draw_rectangles(
            &mut frame,
            &Rect::new(2, 3, 5, 4),
            Color::Gray(255),
            DrawMode::Filled,
        )
        .unwrap();
        assert_eq!(lit(&frame), 20);
        assert_eq!(frame.data()[3 * 20 + 2], 255);
        assert_eq!(frame.data()[7 * 20 + 2], 0);
    }

    #[test]
    fn test_outline_rectangle_leaves_inside_empty() {
        let mut frame = Frame::filled(20, 20, 1, 0);
        draw_rectangles(
            &mut frame,
            &[Rect::new(2, 2, 6, 6)],
            Color::Gray(255),
            DrawMode::Outline,
        )
        .unwrap();
        assert_eq!(lit(&frame), 20);
        assert_eq!(frame.data()[5 * 20 + 5], 0);
    }

    #[test]
    fn test_zero_sized_rectangle_is_skipped() {
        let mut frame = Frame::filled(8, 8, 1, 0);
        draw_rectangles(&mut frame, &Rect::new(1, 1, 0, 4), Color::Gray(255), DrawMode::Filled)
            .unwrap();
        assert_eq!(lit(&frame), 0);
    }

    #[test]
    fn test_rgb_colour_on_gray_frame_is_rejected() {
        let mut frame = Frame::filled(8, 8, 1, 0);
        let result = draw_circles(
            &mut frame,
            &Circle::new((4.0, 4.0), 2.0),
            Color::Rgb([255, 0, 0]),
            DrawMode::Filled,
        );
        assert_eq!(result, Err(OpsError::ColorMismatch));
    }

    #[test]
    fn test_gray_colour_on_rgb_frame() {
        let mut frame = Frame::filled(8, 8, 3, 0);
        draw_circles(
            &mut frame,
            &Circle::new((4.0, 4.0), 2.0),
            Color::Gray(100),
            DrawMode::Filled,
        )
        .unwrap();
        let center = (4 * 8 + 4) * 3;
        assert_eq!(&frame.data()[center..center + 3], &[100, 100, 100]);
    }

    #[test]
    fn test_filled_contour_includes_interior() {
        let mut frame = Frame::filled(20, 20, 3, 0);
        let square = contour(&[(2, 2), (10, 2), (10, 10), (2, 10)]);
        draw_contours(&mut frame, &square, Color::Rgb([0, 255, 0]), DrawMode::Filled).unwrap();
        let inside = (6 * 20 + 6) * 3;
        assert_eq!(&frame.data()[inside..inside + 3], &[0, 255, 0]);
    }

    #[test]
    fn test_degenerate_contours_do_not_panic() {
        let mut frame = Frame::filled(10, 10, 1, 0);
        let contours = vec![
            contour(&[(3, 3)]),
            contour(&[(1, 1), (5, 1)]),
            contour(&[(2, 2), (6, 2), (2, 2)]),
            contour(&[]),
        ];
        draw_contours(&mut frame, &contours, Color::Gray(255), DrawMode::Filled).unwrap();
        draw_contours(&mut frame, &contours, Color::Gray(255), DrawMode::Outline).unwrap();
        assert!(lit(&frame) > 0);
    }

    #[test]
    fn test_rotated_ellipse_fill() {
        let mut frame = Frame::filled(40, 40, 1, 0);
        let ellipse = Ellipse::new((20.0, 20.0), (30.0, 6.0), 90.0);
        draw_ellipses(&mut frame, &ellipse, Color::Gray(255), DrawMode::Filled).unwrap();
        // vertical after rotation
        assert_eq!(frame.data()[8 * 40 + 20], 255);
        assert_eq!(frame.data()[20 * 40 + 8], 0);
    }
}
