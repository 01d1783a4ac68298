use crate::ops::drawing::{
    draw_circles, draw_contours, draw_ellipses, draw_rectangles, Color, DrawMode,
};
use crate::ops::error::{require_gray, OpsError};
use crate::ops::shapes::{Circle, Contour, Ellipse, Rect, Shapes};
use crate::shared::frame::Frame;

/// A fixed grayscale mask applied to many frames.
///
/// Pixels where the mask is zero are cleared; the rest are kept.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    mask: Frame,
}

impl Mask {
    pub fn new(mask: Frame) -> Result<Self, OpsError> {
        require_gray(&mask)?;
        Ok(Self { mask })
    }

    pub fn as_frame(&self) -> &Frame {
        &self.mask
    }

    pub fn apply(&self, frame: &Frame) -> Result<Frame, OpsError> {
        require_gray(frame)?;
        if frame.resolution() != self.mask.resolution() {
            return Err(OpsError::SizeMismatch {
                mask: self.mask.resolution(),
                frame: frame.resolution(),
            });
        }
        let data = frame
            .data()
            .iter()
            .zip(self.mask.data())
            .map(|(&v, &m)| if m == 0 { 0 } else { v })
            .collect();
        Ok(Frame::new(
            data,
            frame.width(),
            frame.height(),
            1,
            frame.index(),
        ))
    }
}

/// Clears a border `by` pixels wide on all four sides.
pub fn shrink(frame: &Frame, by: u32) -> Result<Frame, OpsError> {
    require_gray(frame)?;
    let (w, h) = frame.resolution();
    let mut out = frame.clone();
    for (i, value) in out.data_mut().iter_mut().enumerate() {
        let (x, y) = ((i as u32) % w, (i as u32) / w);
        if x < by || y < by || x >= w.saturating_sub(by) || y >= h.saturating_sub(by) {
            *value = 0;
        }
    }
    Ok(out)
}

/// An empty mask matching `frame`, with `draw` applied in white.
fn mask_like(
    frame: &Frame,
    draw: impl FnOnce(&mut Frame) -> Result<(), OpsError>,
) -> Result<Frame, OpsError> {
    require_gray(frame)?;
    let mut mask = Frame::filled(frame.width(), frame.height(), 1, 0).with_index(frame.index());
    draw(&mut mask)?;
    Ok(mask)
}

pub fn rect_mask<S: Shapes<Rect> + ?Sized>(frame: &Frame, rects: &S) -> Result<Frame, OpsError> {
    mask_like(frame, |m| {
        draw_rectangles(m, rects, Color::Gray(255), DrawMode::Filled)
    })
}

pub fn circle_mask<S: Shapes<Circle> + ?Sized>(
    frame: &Frame,
    circles: &S,
) -> Result<Frame, OpsError> {
    mask_like(frame, |m| {
        draw_circles(m, circles, Color::Gray(255), DrawMode::Filled)
    })
}

pub fn ellipse_mask<S: Shapes<Ellipse> + ?Sized>(
    frame: &Frame,
    ellipses: &S,
) -> Result<Frame, OpsError> {
    mask_like(frame, |m| {
        draw_ellipses(m, ellipses, Color::Gray(255), DrawMode::Filled)
    })
}

pub fn contour_mask<S: Shapes<Contour> + ?Sized>(
    frame: &Frame,
    contours: &S,
) -> Result<Frame, OpsError> {
    mask_like(frame, |m| {
        draw_contours(m, contours, Color::Gray(255), DrawMode::Filled)
    })
}
