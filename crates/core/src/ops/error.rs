use thiserror::Error;

/// Failures raised by the image and contour helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpsError {
    #[error("input needs to be {expected}, got an image with {found} channel(s)")]
    ChannelMismatch { expected: &'static str, found: u8 },
    #[error("mask is {mask:?} but the frame is {frame:?}")]
    SizeMismatch { mask: (u32, u32), frame: (u32, u32) },
    #[error("a colour value cannot be drawn on a grayscale frame")]
    ColorMismatch,
    #[error("a lower or upper limit is required for filtering contours")]
    NoLimits,
}

pub(crate) fn require_gray(frame: &crate::shared::frame::Frame) -> Result<(), OpsError> {
    if frame.channels() == 1 {
        Ok(())
    } else {
        Err(OpsError::ChannelMismatch {
            expected: "grayscale",
            found: frame.channels(),
        })
    }
}

pub(crate) fn require_rgb(frame: &crate::shared::frame::Frame) -> Result<(), OpsError> {
    if frame.channels() == 3 {
        Ok(())
    } else {
        Err(OpsError::ChannelMismatch {
            expected: "RGB",
            found: frame.channels(),
        })
    }
}
