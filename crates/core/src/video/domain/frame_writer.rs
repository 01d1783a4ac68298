use crate::shared::frame::Frame;
use crate::video::error::FootageError;

/// Encodes frames to an output, abstracting over video files and image
/// sequences.
///
/// Frames handed to a writer already match its resolution and colour mode.
pub trait FrameWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), FootageError>;

    /// Flushes pending output and releases resources. Safe to call twice.
    fn close(&mut self) -> Result<(), FootageError>;
}
