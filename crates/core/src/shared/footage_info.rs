use std::path::PathBuf;

/// What kind of container backs a frame source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FootageKind {
    /// An ordered list of still images, one frame per file.
    Images,
    /// A single encoded video file.
    Video,
}

/// Summary information captured when footage is opened.
///
/// Fixed for the lifetime of the handle: sources that grow while open are
/// not supported.
#[derive(Clone, Debug, PartialEq)]
pub struct FootageInfo {
    pub kind: FootageKind,
    pub width: u32,
    pub height: u32,
    /// Frames per second. `None` for still-image sequences.
    pub fps: Option<f64>,
    pub total_frames: usize,
    /// Four-character code of the video stream. `None` for still images.
    pub codec: Option<String>,
    pub source_path: Option<PathBuf>,
}

impl FootageInfo {
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
