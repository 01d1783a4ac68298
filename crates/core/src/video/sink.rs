use std::path::PathBuf;

use crate::shared::constants::DEFAULT_CODEC;
use crate::shared::frame::Frame;
use crate::video::domain::frame_writer::FrameWriter;
use crate::video::error::FootageError;
use crate::video::footage::Footage;
use crate::video::infrastructure::ffmpeg_writer::{EncoderSettings, FfmpegWriter};
use crate::video::infrastructure::image_sequence_writer::ImageSequenceWriter;

/// Where written frames go.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkOutput {
    Video(PathBuf),
    /// One path per frame, written in order.
    Images(Vec<PathBuf>),
}

/// Output format of a [`Writer`]. A resolution is always required; video
/// output also needs a frame rate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SinkConfig {
    /// `(width, height)`.
    pub resolution: Option<(u32, u32)>,
    pub fps: Option<f64>,
    /// Four-character code; [`DEFAULT_CODEC`] when unset.
    pub codec: Option<String>,
    pub grayscale: bool,
}

impl SinkConfig {
    /// Copies resolution, frame rate and codec from opened footage.
    pub fn from_footage(footage: &Footage) -> Self {
        let codec = if footage.is_video() {
            footage.codec().map(str::to_string)
        } else {
            None
        };
        Self {
            resolution: Some(footage.resolution()),
            fps: footage.fps(),
            codec: Some(codec.unwrap_or_else(|| DEFAULT_CODEC.to_string())),
            grayscale: false,
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = Some(codec.into());
        self
    }

    pub fn with_grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }

    fn codec(&self) -> &str {
        self.codec.as_deref().unwrap_or(DEFAULT_CODEC)
    }
}

/// A frame sink: a video file or a list of image paths behind one write
/// interface.
///
/// Frames that don't match the configured resolution or colour mode are
/// resized or converted, with a warning, before encoding.
pub struct Writer {
    inner: Box<dyn FrameWriter>,
    resolution: (u32, u32),
    grayscale: bool,
    written: usize,
    closed: bool,
}

impl Writer {
    pub fn create(output: SinkOutput, config: SinkConfig) -> Result<Self, FootageError> {
        let resolution = config
            .resolution
            .filter(|&(w, h)| w > 0 && h > 0)
            .ok_or(FootageError::MissingResolution)?;
        let inner: Box<dyn FrameWriter> = match output {
            SinkOutput::Video(path) => {
                let fps = config.fps.ok_or(FootageError::MissingFrameRate)?;
                let settings = EncoderSettings {
                    width: resolution.0,
                    height: resolution.1,
                    fps,
                    codec: config.codec().to_string(),
                    grayscale: config.grayscale,
                };
                log::info!(
                    "Writing video {} ({}x{}, {fps} fps, {})",
                    path.display(),
                    resolution.0,
                    resolution.1,
                    settings.codec
                );
                Box::new(FfmpegWriter::create(&path, &settings)?)
            }
            SinkOutput::Images(paths) => {
                log::info!("Writing up to {} images", paths.len());
                Box::new(ImageSequenceWriter::new(paths)?)
            }
        };
        Ok(Self::from_writer(inner, resolution, config.grayscale))
    }

    /// Wraps a custom backend; frames are conformed to `resolution` and
    /// colour mode before they reach it.
    pub fn from_writer(inner: Box<dyn FrameWriter>, resolution: (u32, u32), grayscale: bool) -> Self {
        Self {
            inner,
            resolution,
            grayscale,
            written: 0,
            closed: false,
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    pub fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    /// Frames successfully written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write(&mut self, frame: &Frame) -> Result<(), FootageError> {
        if self.closed {
            return Err(FootageError::Closed);
        }
        let conformed = self.conform(frame);
        self.inner.write(conformed.as_ref().unwrap_or(frame))?;
        self.written += 1;
        Ok(())
    }

    /// Returns a corrected copy when `frame` doesn't match the sink.
    fn conform(&self, frame: &Frame) -> Option<Frame> {
        let mut out: Option<Frame> = None;

        if frame.resolution() != self.resolution {
            log::warn!(
                "Frame {} is {}x{}, resizing to {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.resolution.0,
                self.resolution.1
            );
            out = Some(frame.resized(self.resolution.0, self.resolution.1));
        }

        if frame.is_grayscale() != self.grayscale {
            let source = out.as_ref().unwrap_or(frame);
            let converted = if self.grayscale {
                log::warn!("Frame {} is colour, converting to grayscale", frame.index());
                source.to_grayscale()
            } else {
                log::warn!("Frame {} is grayscale, converting to colour", frame.index());
                source.to_rgb()
            };
            out = Some(converted);
        }
        out
    }

    pub fn close(&mut self) -> Result<(), FootageError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close()
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Closing writer failed: {e}");
        }
    }
}
