use std::path::{Path, PathBuf};

use crate::shared::footage_info::{FootageInfo, FootageKind};
use crate::shared::frame::Frame;
use crate::video::domain::frame_reader::FrameReader;
use crate::video::error::FootageError;

/// Adapts an ordered list of still images to the [`FrameReader`] interface.
///
/// Each file is decoded on demand with the `image` crate. Resolution is taken
/// from the first image when the reader is opened.
pub struct ImageSequenceReader {
    paths: Vec<PathBuf>,
    info: FootageInfo,
}

impl ImageSequenceReader {
    pub fn open(paths: Vec<PathBuf>) -> Result<Self, FootageError> {
        let first_path = paths.first().ok_or(FootageError::NoInputs)?;
        let first = decode(first_path, 0)?;
        let info = FootageInfo {
            kind: FootageKind::Images,
            width: first.width(),
            height: first.height(),
            fps: None,
            total_frames: paths.len(),
            codec: None,
            source_path: Some(first_path.clone()),
        };
        log::debug!(
            "Opened {} images at {}x{}",
            paths.len(),
            info.width,
            info.height
        );
        Ok(Self { paths, info })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

fn decode(path: &Path, index: usize) -> Result<Frame, FootageError> {
    let img = image::open(path).map_err(|source| FootageError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Frame::from_dynamic(img, index))
}

impl FrameReader for ImageSequenceReader {
    fn info(&self) -> &FootageInfo {
        &self.info
    }

    fn read(&mut self, index: usize) -> Result<Frame, FootageError> {
        let path = self.paths.get(index).ok_or(FootageError::Closed)?;
        decode(path, index)
    }

    fn read_range(
        &mut self,
        start: usize,
        stop: usize,
        step: usize,
    ) -> Box<dyn Iterator<Item = Result<Frame, FootageError>> + '_> {
        let stop = stop.min(self.paths.len());
        let start = start.min(stop);
        Box::new(
            self.paths[start..stop]
                .iter()
                .enumerate()
                .step_by(step.max(1))
                .map(move |(offset, path)| decode(path, start + offset)),
        )
    }

    fn close(&mut self) {
        self.paths.clear();
    }
}
