use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::video::domain::frame_writer::FrameWriter;
use crate::video::error::FootageError;

/// Writes each frame to the next path of a fixed list.
///
/// The output format follows each path's extension. Parent directories are
/// created as needed.
pub struct ImageSequenceWriter {
    paths: Vec<PathBuf>,
    next: usize,
    closed: bool,
}

impl ImageSequenceWriter {
    pub fn new(paths: Vec<PathBuf>) -> Result<Self, FootageError> {
        if paths.is_empty() {
            return Err(FootageError::NoInputs);
        }
        Ok(Self {
            paths,
            next: 0,
            closed: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.paths.len()
    }

    pub fn written(&self) -> usize {
        self.next
    }
}

impl FrameWriter for ImageSequenceWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), FootageError> {
        if self.closed {
            return Err(FootageError::Closed);
        }
        let path = self.paths.get(self.next).ok_or(FootageError::Capacity {
            capacity: self.paths.len(),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let image = frame.to_dynamic().ok_or(FootageError::InconsistentFrame {
            index: frame.index(),
            expected: (frame.height() as usize, frame.width() as usize, 3),
            found: frame.shape(),
        })?;
        image.save(path).map_err(|source| FootageError::Image {
            path: path.clone(),
            source,
        })?;

        log::debug!("Wrote frame {} to {}", frame.index(), path.display());
        self.next += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), FootageError> {
        self.closed = true;
        Ok(())
    }
}
