use std::path::{Path, PathBuf};

use ffmpeg_next::format::Pixel;

use crate::shared::constants::FALLBACK_FPS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_writer::FrameWriter;
use crate::video::error::FootageError;
use crate::video::infrastructure::codec::find_encoder;

/// Parameters the encoder is opened with.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Four-character code or ffmpeg encoder name.
    pub codec: String,
    /// Input frames are single-channel.
    pub grayscale: bool,
}

/// Encodes frames into a video file via ffmpeg-next.
///
/// Frames must already match the configured resolution and channel count;
/// [`crate::video::sink::Writer`] takes care of that before calling in.
pub struct FfmpegWriter {
    path: PathBuf,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    input_format: Pixel,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
    stream_index: usize,
}

impl FfmpegWriter {
    pub fn create(path: &Path, settings: &EncoderSettings) -> Result<Self, FootageError> {
        ffmpeg_next::init()?;

        let codec = find_encoder(&settings.codec)
            .ok_or_else(|| FootageError::UnsupportedCodec(settings.codec.clone()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut octx = ffmpeg_next::format::output(&path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut ost = octx.add_stream(Some(codec))?;
        let stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let output_format = encoder_format(&codec, settings.grayscale);
        encoder_ctx.set_width(settings.width);
        encoder_ctx.set_height(settings.height);
        encoder_ctx.set_format(output_format);

        let fps = settings.fps.round() as i32;
        let fps = if fps <= 0 { FALLBACK_FPS } else { fps };

        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let input_format = if settings.grayscale {
            Pixel::GRAY8
        } else {
            Pixel::RGB24
        };
        let scaler = ffmpeg_next::software::scaling::Context::get(
            input_format,
            settings.width,
            settings.height,
            output_format,
            settings.width,
            settings.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Encoding {} with {} ({output_format:?}) at {fps} fps",
            path.display(),
            settings.codec
        );

        Ok(Self {
            path: path.to_path_buf(),
            octx: Some(octx),
            encoder: Some(encoder),
            scaler: Some(scaler),
            input_format,
            width: settings.width,
            height: settings.height,
            fps,
            frame_count: 0,
            stream_index,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn channels(&self) -> u8 {
        if self.input_format == Pixel::GRAY8 {
            1
        } else {
            3
        }
    }

    /// Drains encoded packets into the container.
    fn drain(&mut self) -> Result<(), FootageError> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err(FootageError::Closed);
        };
        let ost_time_base = octx
            .stream(self.stream_index)
            .map(|s| s.time_base())
            .ok_or(FootageError::Closed)?;

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl FrameWriter for FfmpegWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), FootageError> {
        let expected = (self.height as usize, self.width as usize, self.channels() as usize);
        if frame.shape() != expected {
            return Err(FootageError::InconsistentFrame {
                index: frame.index(),
                expected,
                found: frame.shape(),
            });
        }

        let (Some(encoder), Some(scaler)) = (self.encoder.as_mut(), self.scaler.as_mut()) else {
            return Err(FootageError::Closed);
        };

        let mut input =
            ffmpeg_next::util::frame::video::Video::new(self.input_format, self.width, self.height);

        let row_len = self.width as usize * frame.channels() as usize;
        let stride = input.stride(0);
        let data = input.data_mut(0);
        let src = frame.data();
        for row in 0..self.height as usize {
            let src_start = row * row_len;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_len]
                .copy_from_slice(&src[src_start..src_start + row_len]);
        }

        let mut converted = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&input, &mut converted)?;
        converted.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&converted)?;
        self.drain()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), FootageError> {
        let Some(encoder) = self.encoder.as_mut() else {
            return Ok(());
        };

        let eof = encoder.send_eof().map_err(FootageError::from);
        let flushed = eof.and_then(|_| self.drain());

        let trailer = match self.octx.as_mut() {
            Some(octx) => octx.write_trailer().map_err(FootageError::from),
            None => Ok(()),
        };

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        log::info!(
            "Wrote {} frames to {}",
            self.frame_count,
            self.path.display()
        );
        flushed.and(trailer)
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Closing {} failed: {e}", self.path.display());
        }
    }
}

/// Picks GRAY8 for grayscale output when the codec accepts it, otherwise the
/// codec's preferred format.
fn encoder_format(codec: &ffmpeg_next::Codec, grayscale: bool) -> Pixel {
    let formats: Vec<Pixel> = codec
        .video()
        .ok()
        .and_then(|video| video.formats())
        .map(|formats| formats.collect())
        .unwrap_or_default();

    if grayscale && formats.contains(&Pixel::GRAY8) {
        return Pixel::GRAY8;
    }
    formats.first().copied().unwrap_or(Pixel::YUV420P)
}
