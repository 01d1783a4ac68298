use crate::shared::frame::Frame;
use crate::shared::progress::ProgressReporter;
use crate::video::error::FootageError;
use crate::video::footage::{Footage, FrameRange, ReadOptions};
use crate::video::sink::Writer;

type Transform = Box<dyn FnMut(Frame) -> Frame>;

/// Frame export pipeline: read range → transform → write.
///
/// Both handles are closed when the export finishes, whether or not it
/// succeeded.
pub struct ExportFramesUseCase {
    footage: Footage,
    writer: Writer,
    transform: Option<Transform>,
}

impl ExportFramesUseCase {
    pub fn new(footage: Footage, writer: Writer) -> Self {
        Self {
            footage,
            writer,
            transform: None,
        }
    }

    /// Applies `f` to every frame before it is written.
    pub fn with_transform(mut self, f: impl FnMut(Frame) -> Frame + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }

    /// Returns the number of frames written.
    pub fn execute(
        &mut self,
        range: FrameRange,
        options: ReadOptions,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<usize, FootageError> {
        let result = self.export(range, options, reporter);
        let closed = self.writer.close();
        self.footage.close();
        reporter.summary();

        let written = result?;
        closed?;
        Ok(written)
    }

    fn export(
        &mut self,
        range: FrameRange,
        options: ReadOptions,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<usize, FootageError> {
        let mut frames = self.footage.read_range(range, options)?;
        let total = frames.len();
        reporter.info(&format!("Exporting {total} frames"));

        for (position, frame) in frames.iter().enumerate() {
            let mut frame = frame?;
            if let Some(transform) = self.transform.as_mut() {
                frame = transform(frame);
            }
            self.writer.write(&frame)?;
            reporter.progress(position + 1, total);
        }
        Ok(self.writer.written())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::footage_info::{FootageInfo, FootageKind};
    use crate::shared::progress::NullProgress;
    use crate::video::domain::frame_reader::FrameReader;
    use crate::video::domain::frame_writer::FrameWriter;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubReader {
        info: FootageInfo,
        closed: Arc<Mutex<bool>>,
    }

    impl StubReader {
        fn new(count: usize) -> Self {
            Self {
                info: FootageInfo {
                    kind: FootageKind::Images,
                    width: 4,
                    height: 4,
                    fps: None,
                    total_frames: count,
                    codec: None,
                    source_path: None,
                },
                closed: Arc::new(Mutex::new(false)),
            }
        }

        fn frame(index: usize) -> Frame {
            Frame::filled(4, 4, 3, index as u8).with_index(index)
        }
    }

    impl FrameReader for StubReader {
        fn info(&self) -> &FootageInfo {
            &self.info
        }

        fn read(&mut self, index: usize) -> Result<Frame, FootageError> {
            Ok(Self::frame(index))
        }

        fn read_range(
            &mut self,
            start: usize,
            stop: usize,
            step: usize,
        ) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> {
            Box::new((start..stop).step_by(step).map(|i| Ok(Self::frame(i))))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    struct RecordingWriter {
        frames: Arc<Mutex<Vec<Frame>>>,
        fail_at: Option<usize>,
    }

    impl FrameWriter for RecordingWriter {
        fn write(&mut self, frame: &Frame) -> Result<(), FootageError> {
            let mut frames = self.frames.lock().unwrap();
            if Some(frames.len()) == self.fail_at {
                return Err(FootageError::Capacity {
                    capacity: frames.len(),
                });
            }
            frames.push(frame.clone());
            Ok(())
        }

        fn close(&mut self) -> Result<(), FootageError> {
            Ok(())
        }
    }

    // --- Helpers ---

    fn use_case(
        count: usize,
        fail_at: Option<usize>,
    ) -> (ExportFramesUseCase, Arc<Mutex<Vec<Frame>>>, Arc<Mutex<bool>>) {
        let reader = StubReader::new(count);
        let closed = reader.closed.clone();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let writer = RecordingWriter {
            frames: frames.clone(),
            fail_at,
        };
        let uc = ExportFramesUseCase::new(
            Footage::from_reader(Box::new(reader)),
            Writer::from_writer(Box::new(writer), (4, 4), false),
        );
        (uc, frames, closed)
    }

    // --- Tests ---

    #[test]
    fn test_exports_every_frame_in_range() {
        let (mut uc, frames, closed) = use_case(6, None);
        let written = uc
            .execute(FrameRange::new(1, 6, 2), ReadOptions::default(), &mut NullProgress)
            .unwrap();

        assert_eq!(written, 3);
        let indices: Vec<_> = frames.lock().unwrap().iter().map(Frame::index).collect();
        assert_eq!(indices, vec![1, 3, 5]);
        assert!(*closed.lock().unwrap());
    }

    #[test]
    fn test_transform_applies_before_write() {
        let (uc, frames, _) = use_case(2, None);
        let mut uc = uc.with_transform(|frame| frame.to_grayscale());
        uc.execute(FrameRange::all(), ReadOptions::default(), &mut NullProgress)
            .unwrap();

        // the writer wants colour, so the gray frames come back as RGB
        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.channels() == 3));
    }

    #[test]
    fn test_write_failure_still_closes_footage() {
        let (mut uc, frames, closed) = use_case(5, Some(2));
        let result = uc.execute(FrameRange::all(), ReadOptions::default(), &mut NullProgress);

        assert!(matches!(result, Err(FootageError::Capacity { .. })));
        assert_eq!(frames.lock().unwrap().len(), 2);
        assert!(*closed.lock().unwrap());
    }

    #[test]
    fn test_out_of_bounds_range_fails() {
        let (mut uc, frames, _) = use_case(3, None);
        let result = uc.execute(
            FrameRange::new(0, 4, 1),
            ReadOptions::default(),
            &mut NullProgress,
        );
        assert!(matches!(result, Err(FootageError::OutOfBounds { .. })));
        assert!(frames.lock().unwrap().is_empty());
    }
}
