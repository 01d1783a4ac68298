use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::video::error::FootageError;

/// Where a frame source reads from, resolved and validated before any
/// decoder is opened.
#[derive(Clone, Debug, PartialEq)]
pub enum FootageSource {
    /// Still images read in the given order, one frame per file.
    Images(Vec<PathBuf>),
    /// A single video file.
    Video(PathBuf),
}

impl FootageSource {
    /// Resolves a path or glob pattern.
    ///
    /// Inputs containing `*` are globbed and the matches sorted in natural,
    /// case-insensitive order. A single image path becomes a one-image
    /// sequence; any other existing file is treated as video.
    pub fn resolve(input: &str) -> Result<Self, FootageError> {
        if input.contains('*') {
            return Self::from_pattern(input);
        }
        let path = PathBuf::from(input);
        if !path.exists() {
            return Err(FootageError::NotFound(path));
        }
        if is_image(&path) {
            Ok(Self::Images(vec![path]))
        } else {
            Ok(Self::Video(path))
        }
    }

    pub fn from_pattern(pattern: &str) -> Result<Self, FootageError> {
        let entries = glob::glob(pattern).map_err(|source| FootageError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).collect();
        if paths.is_empty() {
            return Err(FootageError::EmptyPattern(pattern.to_string()));
        }
        paths.sort_by(|a, b| {
            natord::compare_ignore_case(&a.to_string_lossy(), &b.to_string_lossy())
        });
        Self::from_paths(paths)
    }

    /// An explicit, ordered list of still images. Order is kept as given.
    pub fn from_paths<I, P>(paths: I) -> Result<Self, FootageError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(FootageError::NoInputs);
        }
        for path in &paths {
            if !path.exists() {
                return Err(FootageError::NotFound(path.clone()));
            }
            if !is_image(path) {
                return Err(FootageError::NotAnImage(path.clone()));
            }
        }
        Ok(Self::Images(paths))
    }

    pub fn video(path: impl Into<PathBuf>) -> Result<Self, FootageError> {
        let path = path.into();
        if !path.exists() {
            return Err(FootageError::NotFound(path));
        }
        Ok(Self::Video(path))
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
