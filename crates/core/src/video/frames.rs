use ndarray::{Array4, Axis};

use crate::shared::frame::Frame;
use crate::shared::progress::ProgressReporter;
use crate::video::error::FootageError;
use crate::video::footage::Footage;

enum Storage<'a> {
    Streaming(&'a mut Footage),
    /// `(n, height, width, channels)`.
    InMemory(Array4<u8>),
}

/// An ordered view over `start..stop` (stride `step`) of some footage.
///
/// Streaming sequences decode again on every pass; in-memory sequences hold
/// every frame in one contiguous array. Both yield the same frames.
pub struct Frames<'a> {
    storage: Storage<'a>,
    start: usize,
    stop: usize,
    step: usize,
    grayscale: bool,
}

impl<'a> Frames<'a> {
    pub(crate) fn streaming(
        footage: &'a mut Footage,
        start: usize,
        stop: usize,
        step: usize,
        grayscale: bool,
    ) -> Self {
        Self {
            storage: Storage::Streaming(footage),
            start,
            stop,
            step,
            grayscale,
        }
    }

    /// Wraps frames that are already decoded. The first frame's index is taken
    /// as the start of the range.
    pub fn from_frames(frames: &[Frame]) -> Result<Frames<'static>, FootageError> {
        let first = frames.first().ok_or(FootageError::NoInputs)?;
        let (height, width, channels) = first.shape();
        let mut array = Array4::zeros((frames.len(), height, width, channels));
        for (position, frame) in frames.iter().enumerate() {
            if frame.shape() != first.shape() {
                return Err(FootageError::InconsistentFrame {
                    index: frame.index(),
                    expected: first.shape(),
                    found: frame.shape(),
                });
            }
            array
                .index_axis_mut(Axis(0), position)
                .assign(&frame.as_ndarray());
        }
        Ok(Frames {
            storage: Storage::InMemory(array),
            start: first.index(),
            stop: first.index() + frames.len(),
            step: 1,
            grayscale: first.is_grayscale(),
        })
    }

    /// `ceil((stop - start) / step)`.
    pub fn len(&self) -> usize {
        (self.stop - self.start).div_ceil(self.step)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self.storage, Storage::InMemory(_))
    }

    pub fn is_grayscale(&self) -> bool {
        self.grayscale
    }

    /// Source index of the frame at `position`.
    pub fn source_index(&self, position: usize) -> usize {
        self.start + position * self.step
    }

    /// The backing array of an in-memory sequence.
    pub fn as_array(&self) -> Option<&Array4<u8>> {
        match &self.storage {
            Storage::InMemory(array) => Some(array),
            Storage::Streaming(_) => None,
        }
    }

    /// The frame at `position` within the sequence.
    pub fn get(&mut self, position: usize) -> Result<Frame, FootageError> {
        let len = self.len();
        if position >= len {
            return Err(FootageError::OutOfBounds {
                index: position,
                len,
            });
        }
        let index = self.source_index(position);
        match &mut self.storage {
            Storage::InMemory(array) => Ok(slice(array, position, index)),
            Storage::Streaming(footage) => footage.read(index, self.grayscale),
        }
    }

    /// Frames in source order. Each call starts a fresh pass.
    pub fn iter(&mut self) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> {
        let (start, stop, step) = (self.start, self.stop, self.step);
        match &mut self.storage {
            Storage::InMemory(array) => {
                let array = &*array;
                Box::new(
                    (0..array.len_of(Axis(0)))
                        .map(move |position| Ok(slice(array, position, start + position * step))),
                )
            }
            Storage::Streaming(footage) => footage.decode_range(start, stop, step, self.grayscale),
        }
    }

    /// Decodes a streaming sequence into memory. No-op when already in memory.
    pub fn materialize(&mut self, reporter: &mut dyn ProgressReporter) -> Result<(), FootageError> {
        let Storage::Streaming(footage) = &mut self.storage else {
            return Ok(());
        };

        let total = (self.stop - self.start).div_ceil(self.step);
        let (width, height) = footage.resolution();
        let channels = if self.grayscale { 1 } else { 3 };
        let mut array: Option<Array4<u8>> = None;

        reporter.info(&format!("Importing {total} frames into memory"));
        for (position, frame) in footage
            .decode_range(self.start, self.stop, self.step, self.grayscale)
            .enumerate()
        {
            let frame = frame?;
            let array = array.get_or_insert_with(|| {
                let (h, w, c) = frame.shape();
                Array4::zeros((total, h, w, c))
            });
            let expected = (array.dim().1, array.dim().2, array.dim().3);
            if frame.shape() != expected {
                return Err(FootageError::InconsistentFrame {
                    index: frame.index(),
                    expected,
                    found: frame.shape(),
                });
            }
            array
                .index_axis_mut(Axis(0), position)
                .assign(&frame.as_ndarray());
            reporter.progress(position + 1, total);
        }
        reporter.summary();

        let array = array.unwrap_or_else(|| {
            Array4::zeros((total, height as usize, width as usize, channels))
        });
        if array.len_of(Axis(0)) != total {
            return Err(FootageError::MissingFrame {
                index: self.start + array.len_of(Axis(0)) * self.step,
            });
        }
        self.storage = Storage::InMemory(array);
        Ok(())
    }

    /// Detaches the sequence from its footage, decoding into memory if needed.
    pub fn into_owned(
        mut self,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<Frames<'static>, FootageError> {
        self.materialize(reporter)?;
        let Frames {
            storage,
            start,
            stop,
            step,
            grayscale,
        } = self;
        match storage {
            Storage::InMemory(array) => Ok(Frames {
                storage: Storage::InMemory(array),
                start,
                stop,
                step,
                grayscale,
            }),
            Storage::Streaming(_) => Err(FootageError::Closed),
        }
    }

    /// Takes the in-memory array, decoding first if needed.
    pub fn into_array(
        self,
        reporter: &mut dyn ProgressReporter,
    ) -> Result<Array4<u8>, FootageError> {
        match self.into_owned(reporter)?.storage {
            Storage::InMemory(array) => Ok(array),
            Storage::Streaming(_) => Err(FootageError::Closed),
        }
    }
}

fn slice(array: &Array4<u8>, position: usize, index: usize) -> Frame {
    let view = array.index_axis(Axis(0), position);
    let (height, width, channels) = view.dim();
    Frame::new(
        view.iter().copied().collect(),
        width as u32,
        height as u32,
        channels as u8,
        index,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::progress::{LogProgress, NullProgress};
    use crate::shared::footage_info::{FootageInfo, FootageKind};
    use crate::video::domain::frame_reader::FrameReader;
    use crate::video::footage::{FrameRange, Materialization, ReadOptions};
    use crate::video::source::FootageSource;

    fn footage(dir: &std::path::Path, count: usize) -> Footage {
        let paths: Vec<_> = (0..count)
            .map(|i| {
                let path = dir.join(format!("{i}.png"));
                image::GrayImage::from_pixel(4, 3, image::Luma([i as u8]))
                    .save(&path)
                    .unwrap();
                path
            })
            .collect();
        Footage::open(FootageSource::from_paths(paths).unwrap()).unwrap()
    }

    /// Declares `declared` frames but its decoder stops after `delivered`.
    struct ShortReader {
        info: FootageInfo,
        delivered: usize,
    }

    impl ShortReader {
        fn boxed(declared: usize, delivered: usize) -> Box<dyn FrameReader> {
            Box::new(Self {
                info: FootageInfo {
                    kind: FootageKind::Video,
                    width: 2,
                    height: 2,
                    fps: Some(25.0),
                    total_frames: declared,
                    codec: None,
                    source_path: None,
                },
                delivered,
            })
        }
    }

    impl FrameReader for ShortReader {
        fn info(&self) -> &FootageInfo {
            &self.info
        }

        fn read(&mut self, index: usize) -> Result<Frame, FootageError> {
            if index < self.delivered {
                Ok(Frame::filled(2, 2, 3, index as u8).with_index(index))
            } else {
                Err(FootageError::MissingFrame { index })
            }
        }

        fn read_range(
            &mut self,
            start: usize,
            stop: usize,
            step: usize,
        ) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> {
            let delivered = self.delivered;
            Box::new(
                (start..stop.min(delivered))
                    .step_by(step)
                    .map(|i| Ok(Frame::filled(2, 2, 3, i as u8).with_index(i))),
            )
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_short_source_fails_the_same_lazily_and_eagerly() {
        let mut footage = Footage::from_reader(ShortReader::boxed(6, 3));
        let mut lazy = footage
            .read_range(FrameRange::new(0, 6, 2), ReadOptions::default())
            .unwrap();
        assert_eq!(lazy.len(), 3);
        let results: Vec<_> = lazy.iter().collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().index(), 0);
        assert_eq!(results[1].as_ref().unwrap().index(), 2);
        assert!(matches!(
            results[2],
            Err(FootageError::MissingFrame { index: 4 })
        ));

        let eager = footage.read_range(
            FrameRange::new(0, 6, 2),
            ReadOptions {
                mode: Materialization::InMemory,
                ..Default::default()
            },
        );
        assert!(matches!(
            eager,
            Err(FootageError::MissingFrame { index: 4 })
        ));
    }

    #[test]
    fn test_short_source_is_fine_when_range_stays_inside() {
        let mut footage = Footage::from_reader(ShortReader::boxed(6, 3));
        let mut frames = footage
            .read_range(FrameRange::new(0, 3, 1), ReadOptions::default())
            .unwrap();
        assert_eq!(frames.iter().filter(|f| f.is_ok()).count(), 3);
    }

    #[test]
    fn test_iter_can_be_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let mut footage = footage(dir.path(), 4);
        let mut frames = footage
            .read_range(FrameRange::all(), ReadOptions::default())
            .unwrap();
        assert_eq!(frames.iter().count(), 4);
        assert_eq!(frames.iter().count(), 4);
    }

    #[test]
    fn test_materialize_builds_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut footage = footage(dir.path(), 5);
        let mut frames = footage
            .read_range(FrameRange::new(1, 5, 2), ReadOptions::default())
            .unwrap();
        assert!(!frames.is_in_memory());

        frames.materialize(&mut LogProgress::default()).unwrap();
        let array = frames.as_array().unwrap();
        assert_eq!(array.dim(), (2, 3, 4, 1));
        assert_eq!(array[[0, 0, 0, 0]], 1);
        assert_eq!(array[[1, 2, 3, 0]], 3);

        let indices: Vec<_> = frames.iter().map(|f| f.unwrap().index()).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_get_uses_stride() {
        let dir = tempfile::tempdir().unwrap();
        let mut footage = footage(dir.path(), 6);
        let mut frames = footage
            .read_range(FrameRange::new(0, 6, 3), ReadOptions::default())
            .unwrap();
        assert_eq!(frames.get(1).unwrap().data()[0], 3);
        assert!(matches!(
            frames.get(2),
            Err(FootageError::OutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_empty_range_materializes_to_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut footage = footage(dir.path(), 3);
        let frames = footage
            .read_range(FrameRange::new(2, 2, 1), ReadOptions::default())
            .unwrap();
        let array = frames.into_array(&mut NullProgress).unwrap();
        assert_eq!(array.len_of(Axis(0)), 0);
    }

    #[test]
    fn test_from_frames_rejects_mixed_shapes() {
        let frames = [Frame::filled(2, 2, 1, 0), Frame::filled(3, 2, 1, 0)];
        assert!(matches!(
            Frames::from_frames(&frames),
            Err(FootageError::InconsistentFrame { .. })
        ));
    }

    #[test]
    fn test_from_frames_keeps_content() {
        let frames = [
            Frame::filled(2, 2, 3, 5).with_index(7),
            Frame::filled(2, 2, 3, 6).with_index(8),
        ];
        let mut sequence = Frames::from_frames(&frames).unwrap();
        assert_eq!(sequence.len(), 2);
        let collected: Vec<_> = sequence.iter().map(|f| f.unwrap()).collect();
        assert_eq!(collected, frames);
    }
}
