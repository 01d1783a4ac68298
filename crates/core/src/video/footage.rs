use crate::shared::footage_info::{FootageInfo, FootageKind};
use crate::shared::frame::Frame;
use crate::shared::progress::NullProgress;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::error::FootageError;
use crate::video::frames::Frames;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::image_sequence_reader::ImageSequenceReader;
use crate::video::source::FootageSource;

/// `start..stop` with a stride. A missing `stop` means the end of the footage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    pub start: usize,
    pub stop: Option<usize>,
    pub step: usize,
}

impl FrameRange {
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        Self {
            start,
            stop: Some(stop),
            step,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }
}

impl Default for FrameRange {
    fn default() -> Self {
        Self {
            start: 0,
            stop: None,
            step: 1,
        }
    }
}

impl From<std::ops::Range<usize>> for FrameRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end, 1)
    }
}

/// How a frame range is held once read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Materialization {
    /// Frames are decoded again on every pass.
    #[default]
    LowMemory,
    /// The whole range is decoded once into a single array.
    InMemory,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub grayscale: bool,
    pub mode: Materialization,
}

/// An opened frame source: a video file or an ordered list of images behind
/// one read interface.
pub struct Footage {
    reader: Box<dyn FrameReader>,
    closed: bool,
}

impl Footage {
    pub fn open(source: FootageSource) -> Result<Self, FootageError> {
        let reader: Box<dyn FrameReader> = match source {
            FootageSource::Images(paths) => Box::new(ImageSequenceReader::open(paths)?),
            FootageSource::Video(path) => Box::new(FfmpegReader::open(&path)?),
        };
        Ok(Self::from_reader(reader))
    }

    /// Resolves `input` as a path or glob pattern and opens it.
    pub fn open_path(input: &str) -> Result<Self, FootageError> {
        Self::open(FootageSource::resolve(input)?)
    }

    pub fn from_reader(reader: Box<dyn FrameReader>) -> Self {
        let info = reader.info();
        log::info!(
            "Opened {} footage: {} frames at {}x{}",
            match info.kind {
                FootageKind::Images => "image",
                FootageKind::Video => "video",
            },
            info.total_frames,
            info.width,
            info.height
        );
        Self {
            reader,
            closed: false,
        }
    }

    pub fn info(&self) -> &FootageInfo {
        self.reader.info()
    }

    pub fn len(&self) -> usize {
        self.info().total_frames
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.info().resolution()
    }

    pub fn fps(&self) -> Option<f64> {
        self.info().fps
    }

    pub fn codec(&self) -> Option<&str> {
        self.info().codec.as_deref()
    }

    pub fn is_video(&self) -> bool {
        self.info().kind == FootageKind::Video
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn read(&mut self, index: usize, grayscale: bool) -> Result<Frame, FootageError> {
        if self.closed {
            return Err(FootageError::Closed);
        }
        let len = self.len();
        if index >= len {
            return Err(FootageError::OutOfBounds { index, len });
        }
        let frame = self.reader.read(index)?;
        Ok(if grayscale {
            frame.to_grayscale()
        } else {
            frame
        })
    }

    pub fn read_range(
        &mut self,
        range: impl Into<FrameRange>,
        options: ReadOptions,
    ) -> Result<Frames<'_>, FootageError> {
        if self.closed {
            return Err(FootageError::Closed);
        }
        let FrameRange { start, stop, step } = range.into();
        let len = self.len();
        let stop = stop.unwrap_or(len);

        for index in [start, stop] {
            if index > len {
                return Err(FootageError::OutOfBounds { index, len });
            }
        }
        if step == 0 || start > stop {
            return Err(FootageError::InvalidRange { start, stop, step });
        }

        let mut frames = Frames::streaming(self, start, stop, step, options.grayscale);
        if options.mode == Materialization::InMemory {
            frames.materialize(&mut NullProgress)?;
        }
        Ok(frames)
    }

    /// Lazy decode of an already validated range.
    pub(crate) fn decode_range(
        &mut self,
        start: usize,
        stop: usize,
        step: usize,
        grayscale: bool,
    ) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> {
        if self.closed {
            return Box::new(std::iter::once(Err(FootageError::Closed)));
        }
        let frames: Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> =
            Box::new(CheckedRange {
                inner: self.reader.read_range(start, stop, step),
                next_index: start,
                stop,
                step,
                done: start >= stop,
            });
        if grayscale {
            Box::new(frames.map(|frame| frame.map(|f| f.to_grayscale())))
        } else {
            frames
        }
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.reader.close();
        self.closed = true;
        log::info!("Closed footage");
    }
}

/// Ends a lazy range with `MissingFrame` when the reader runs out before
/// `stop`, so streaming and in-memory sequences agree on their length.
struct CheckedRange<'a> {
    inner: Box<dyn Iterator<Item = Result<Frame, FootageError>> + 'a>,
    next_index: usize,
    stop: usize,
    step: usize,
    done: bool,
}

impl Iterator for CheckedRange<'_> {
    type Item = Result<Frame, FootageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(Ok(frame)) => {
                self.next_index += self.step;
                self.done = self.next_index >= self.stop;
                Some(Ok(frame))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                self.done = true;
                Some(Err(FootageError::MissingFrame {
                    index: self.next_index,
                }))
            }
        }
    }
}

impl Drop for Footage {
    fn drop(&mut self) {
        self.close();
    }
}
