use crate::ops::error::{require_gray, require_rgb, OpsError};
use crate::shared::frame::Frame;

/// RGB → single-channel luma.
pub fn gray(frame: &Frame) -> Result<Frame, OpsError> {
    require_rgb(frame)?;
    Ok(frame.to_grayscale())
}

/// Grayscale → RGB with the value repeated in every channel.
pub fn rgb(frame: &Frame) -> Result<Frame, OpsError> {
    require_gray(frame)?;
    Ok(frame.to_rgb())
}

/// RGB → HSV packed into three 8-bit channels.
///
/// Hue is halved to fit a byte (0..180), saturation and value span 0..=255.
pub fn hsv(frame: &Frame) -> Result<Frame, OpsError> {
    require_rgb(frame)?;
    let data = frame
        .data()
        .chunks_exact(3)
        .flat_map(|px| hsv_pixel(px[0], px[1], px[2]))
        .collect();
    Ok(Frame::new(
        data,
        frame.width(),
        frame.height(),
        3,
        frame.index(),
    ))
}

fn hsv_pixel(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };

    [
        ((hue / 2.0).round() as u8).min(179),
        saturation.round() as u8,
        max as u8,
    ]
}
