use crate::shared::footage_info::FootageInfo;
use crate::shared::frame::Frame;
use crate::video::error::FootageError;

/// Random and sequential access to the frames of an opened source.
///
/// Implementations handle I/O details (codec, container, file lists) while
/// `Footage` supplies bounds checking and colour handling on top.
pub trait FrameReader {
    fn info(&self) -> &FootageInfo;

    /// Decodes the frame at `index`. Callers guarantee `index < total_frames`.
    fn read(&mut self, index: usize) -> Result<Frame, FootageError>;

    /// Decodes `start..stop` keeping every `step`-th frame, in source order.
    fn read_range(
        &mut self,
        start: usize,
        stop: usize,
        step: usize,
    ) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_>;

    /// Releases any resources held by the reader. Safe to call twice.
    fn close(&mut self);
}
