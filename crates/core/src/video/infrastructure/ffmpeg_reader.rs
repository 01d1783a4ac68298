use std::path::{Path, PathBuf};

use ffmpeg_next::format::Pixel;

use crate::shared::footage_info::{FootageInfo, FootageKind};
use crate::shared::fourcc::fourcc_to_string;
use crate::shared::frame::Frame;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::error::FootageError;
use crate::video::infrastructure::codec::fourcc_for_codec_id;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Grayscale streams decode to single-channel frames, everything else to
/// RGB24. Random access decodes forward from the current position and
/// reopens the input when asked for an earlier frame, so every index lands on
/// exactly the frame sequential decoding would produce.
pub struct FfmpegReader {
    path: PathBuf,
    state: Option<DecodeState>,
    info: FootageInfo,
    closed: bool,
}

struct DecodeState {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    channels: u8,
    next_index: usize,
    flushing: bool,
    done: bool,
}

impl DecodeState {
    fn open(path: &Path) -> Result<Self, FootageError> {
        let ictx = ffmpeg_next::format::input(&path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| FootageError::NoVideoStream(path.to_path_buf()))?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let (output, channels) = output_layout(decoder.format());

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            output,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
            channels,
            next_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, FootageError> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }
        let mut converted = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler.run(&decoded, &mut converted)?;

        let pixels = extract_pixels(&converted, self.width, self.height, self.channels);
        let frame = Frame::new(
            pixels,
            self.width,
            self.height,
            self.channels,
            self.next_index,
        );
        self.next_index += 1;
        Ok(Some(frame))
    }

    /// Decodes the next frame in stream order, or `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Frame>, FootageError> {
        if self.done {
            return Ok(None);
        }

        if let Some(frame) = self.try_receive()? {
            return Ok(Some(frame));
        }

        if self.flushing {
            self.done = true;
            return Ok(None);
        }

        loop {
            let next = self
                .ictx
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));

            let Some((stream_index, packet)) = next else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(frame) = self.try_receive()? {
                    return Ok(Some(frame));
                }
                self.done = true;
                return Ok(None);
            };

            if stream_index != self.stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }
        }
    }
}

impl FfmpegReader {
    pub fn open(path: &Path) -> Result<Self, FootageError> {
        ffmpeg_next::init()?;

        let state = DecodeState::open(path)?;
        let info = probe(&state, path)?;

        let mut reader = Self {
            path: path.to_path_buf(),
            state: Some(state),
            info,
            closed: false,
        };

        if reader.info.total_frames == 0 {
            reader.info.total_frames = reader.count_frames()?;
        }

        log::debug!(
            "Opened {} ({}x{}, {} frames)",
            path.display(),
            reader.info.width,
            reader.info.height,
            reader.info.total_frames
        );
        Ok(reader)
    }

    /// Containers that don't record a frame count are counted by decoding.
    fn count_frames(&mut self) -> Result<usize, FootageError> {
        let mut state = DecodeState::open(&self.path)?;
        let mut count = 0;
        while state.next_frame()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Returns decoder state whose next decoded frame is `index`.
    fn positioned(&mut self, index: usize) -> Result<&mut DecodeState, FootageError> {
        if self.closed {
            return Err(FootageError::Closed);
        }

        let rewind = self.state.as_ref().map_or(true, |s| s.next_index > index);
        if rewind {
            log::debug!("Reopening {} to reach frame {index}", self.path.display());
            self.state = Some(DecodeState::open(&self.path)?);
        }

        let state = self.state.as_mut().ok_or(FootageError::Closed)?;
        while state.next_index < index {
            if state.next_frame()?.is_none() {
                return Err(FootageError::MissingFrame { index });
            }
        }
        Ok(state)
    }
}

impl FrameReader for FfmpegReader {
    fn info(&self) -> &FootageInfo {
        &self.info
    }

    fn read(&mut self, index: usize) -> Result<Frame, FootageError> {
        self.positioned(index)?
            .next_frame()?
            .ok_or(FootageError::MissingFrame { index })
    }

    fn read_range(
        &mut self,
        start: usize,
        stop: usize,
        step: usize,
    ) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> {
        Box::new(FfmpegRangeIter {
            reader: self,
            start,
            stop,
            step: step.max(1),
            position: start,
            started: false,
            done: start >= stop,
        })
    }

    fn close(&mut self) {
        self.state = None;
        self.closed = true;
    }
}

/// Lazy iterator over a frame range.
///
/// Frames between kept indices are decoded and dropped: for video, skipping
/// by decode is cheaper than seeking to each index.
struct FfmpegRangeIter<'a> {
    reader: &'a mut FfmpegReader,
    start: usize,
    stop: usize,
    step: usize,
    position: usize,
    started: bool,
    done: bool,
}

impl FfmpegRangeIter<'_> {
    fn advance(&mut self) -> Result<Option<Frame>, FootageError> {
        let state = if self.started {
            self.reader.state.as_mut().ok_or(FootageError::Closed)?
        } else {
            self.started = true;
            self.reader.positioned(self.start)?
        };

        while self.position < self.stop {
            let Some(frame) = state.next_frame()? else {
                let offset = self.position - self.start;
                let next_kept = self.start + offset.div_ceil(self.step) * self.step;
                if next_kept < self.stop {
                    return Err(FootageError::MissingFrame { index: next_kept });
                }
                return Ok(None);
            };
            let offset = self.position - self.start;
            self.position += 1;
            if offset % self.step == 0 {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

impl Iterator for FfmpegRangeIter<'_> {
    type Item = Result<Frame, FootageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn probe(state: &DecodeState, path: &Path) -> Result<FootageInfo, FootageError> {
    let stream = state
        .ictx
        .stream(state.stream_index)
        .ok_or_else(|| FootageError::NoVideoStream(path.to_path_buf()))?;

    let rate = stream.rate();
    let rate = if rate.denominator() != 0 && rate.numerator() != 0 {
        rate
    } else {
        stream.avg_frame_rate()
    };
    let fps = if rate.denominator() != 0 {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    } else {
        None
    };

    let parameters = stream.parameters();
    let tag = unsafe { (*parameters.as_ptr()).codec_tag };
    let codec = if tag != 0 {
        fourcc_to_string(tag)
    } else {
        let id = parameters.id();
        fourcc_for_codec_id(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{id:?}"))
    };

    Ok(FootageInfo {
        kind: FootageKind::Video,
        width: state.width,
        height: state.height,
        fps,
        total_frames: stream.frames().max(0) as usize,
        codec: Some(codec),
        source_path: Some(path.to_path_buf()),
    })
}

/// Grayscale sources stay single-channel; everything else converts to RGB.
fn output_layout(format: Pixel) -> (Pixel, u8) {
    match format {
        Pixel::GRAY8 | Pixel::GRAY16LE | Pixel::GRAY16BE => (Pixel::GRAY8, 1),
        _ => (Pixel::RGB24, 3),
    }
}

/// Copies pixel data from an ffmpeg frame into a tightly packed buffer,
/// dropping any per-row stride padding.
fn extract_pixels(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
    channels: u8,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_len = width as usize * channels as usize;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_support::{gray_ramp_video, mean};

    #[test]
    fn test_open_returns_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = gray_ramp_video(dir.path(), 5, 160, 120);

        let reader = FfmpegReader::open(&path).unwrap();
        let info = reader.info();
        assert_eq!(info.kind, FootageKind::Video);
        assert_eq!(info.resolution(), (160, 120));
        assert_eq!(info.total_frames, 5);
        assert!(info.fps.unwrap() > 0.0);
        assert_eq!(info.codec.as_deref(), Some("MJPG"));
        assert_eq!(info.source_path, Some(path));
    }

    #[test]
    fn test_open_nonexistent_fails() {
        assert!(FfmpegReader::open(Path::new("/nonexistent/test.avi")).is_err());
    }

    #[test]
    fn test_range_yields_sequential_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = gray_ramp_video(dir.path(), 5, 160, 120);
        let mut reader = FfmpegReader::open(&path).unwrap();

        let indices: Vec<_> = reader
            .read_range(0, 5, 1)
            .map(|f| f.unwrap().index())
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_range_with_step_skips_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = gray_ramp_video(dir.path(), 6, 64, 48);
        let mut reader = FfmpegReader::open(&path).unwrap();

        let indices: Vec<_> = reader
            .read_range(1, 6, 2)
            .map(|f| f.unwrap().index())
            .collect();
        assert_eq!(indices, vec![1, 3, 5]);
    }

    #[test]
    fn test_random_access_backwards_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = gray_ramp_video(dir.path(), 5, 64, 48);
        let mut reader = FfmpegReader::open(&path).unwrap();

        let late = reader.read(4).unwrap();
        let early = reader.read(1).unwrap();
        assert_eq!(late.index(), 4);
        assert_eq!(early.index(), 1);
        // frame i is filled with i * 40
        assert!((mean(&early) - 40.0).abs() < 12.0);
        assert!((mean(&late) - 160.0).abs() < 12.0);
    }

    #[test]
    fn test_frames_are_rgb_for_colour_streams() {
        let dir = tempfile::tempdir().unwrap();
        let path = gray_ramp_video(dir.path(), 2, 64, 48);
        let mut reader = FfmpegReader::open(&path).unwrap();

        let frame = reader.read(0).unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data().len(), 64 * 48 * 3);
    }

    #[test]
    fn test_read_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = gray_ramp_video(dir.path(), 1, 64, 48);
        let mut reader = FfmpegReader::open(&path).unwrap();
        reader.close();
        reader.close();
        assert!(matches!(reader.read(0), Err(FootageError::Closed)));
    }

    #[test]
    fn test_output_layout() {
        assert_eq!(output_layout(Pixel::GRAY8), (Pixel::GRAY8, 1));
        assert_eq!(output_layout(Pixel::YUV420P), (Pixel::RGB24, 3));
        assert_eq!(output_layout(Pixel::YUVJ420P), (Pixel::RGB24, 3));
    }
}
