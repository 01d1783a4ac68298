pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Codec used for video output when neither the caller nor the source
/// footage names one.
pub const DEFAULT_CODEC: &str = "MJPG";

/// Frame rate assumed by the encoder when the requested rate rounds to zero.
pub const FALLBACK_FPS: i32 = 30;

/// Identifier of the frame-position control added to seekable interfaces.
pub const FRAMES_CONTROL_ID: &str = "frames";
pub const FRAMES_CONTROL_LABEL: &str = "Frames";

/// Contours with fewer points than this have no meaningful ellipse fit.
pub const MIN_ELLIPSE_POINTS: usize = 5;
