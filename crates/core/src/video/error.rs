use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while opening, reading or writing footage.
#[derive(Error, Debug)]
pub enum FootageError {
    #[error("input not found: {0}")]
    NotFound(PathBuf),
    #[error("no files matched pattern '{0}'")]
    EmptyPattern(String),
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("not a supported image file: {0}")]
    NotAnImage(PathBuf),
    #[error("no input files supplied")]
    NoInputs,
    #[error("frame index {index} out of range for footage of {len} frames")]
    OutOfBounds { index: usize, len: usize },
    #[error("invalid frame range {start}..{stop} (step {step})")]
    InvalidRange {
        start: usize,
        stop: usize,
        step: usize,
    },
    #[error("frame {index} could not be decoded")]
    MissingFrame { index: usize },
    #[error("frame {index} is {found:?} but the sequence holds {expected:?} frames")]
    InconsistentFrame {
        index: usize,
        expected: (usize, usize, usize),
        found: (usize, usize, usize),
    },
    #[error("a frame rate is required when writing video without video footage")]
    MissingFrameRate,
    #[error("an output resolution is required")]
    MissingResolution,
    #[error("all {capacity} output paths have been written")]
    Capacity { capacity: usize },
    #[error("unsupported codec '{0}'")]
    UnsupportedCodec(String),
    #[error("no video stream in {0}")]
    NoVideoStream(PathBuf),
    #[error("handle has been closed")]
    Closed,
    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("ffmpeg: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
