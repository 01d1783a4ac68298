use crate::shared::frame::Frame;
use crate::shared::progress::NullProgress;
use crate::video::error::FootageError;
use crate::video::footage::Footage;
use crate::video::frames::Frames;

/// Where an interface gets the frame it works on.
///
/// Sequences and footage are seekable: the interface gets a frame-position
/// control over the `lower..upper` window. Streams are pulled one frame at a
/// time by the host.
pub enum Feed {
    Still(Frame),
    Sequence {
        frames: Frames<'static>,
        lower: usize,
        upper: usize,
    },
    Footage {
        footage: Footage,
        lower: usize,
        upper: usize,
    },
    Stream(Box<dyn Iterator<Item = Frame>>),
}

impl Default for Feed {
    fn default() -> Self {
        Feed::Stream(Box::new(std::iter::empty()))
    }
}

impl Feed {
    pub fn still(frame: Frame) -> Self {
        Feed::Still(frame)
    }

    /// Holds the sequence in memory, decoding it first if it is streaming.
    pub fn sequence(frames: Frames<'_>) -> Result<Self, FootageError> {
        let frames = frames.into_owned(&mut NullProgress)?;
        let upper = frames.len();
        Ok(Feed::Sequence {
            frames,
            lower: 0,
            upper,
        })
    }

    pub fn frames(frames: &[Frame]) -> Result<Self, FootageError> {
        Self::sequence(Frames::from_frames(frames)?)
    }

    /// Frames are read from the footage on demand. The footage is closed when
    /// the interface finishes running.
    pub fn footage(footage: Footage) -> Self {
        let upper = footage.len();
        Feed::Footage {
            footage,
            lower: 0,
            upper,
        }
    }

    pub fn stream(frames: impl Iterator<Item = Frame> + 'static) -> Self {
        Feed::Stream(Box::new(frames))
    }

    /// Restricts a seekable feed to positions `lower..upper`. Bounds past the
    /// end are clamped; still and stream feeds are unchanged.
    pub fn window(mut self, lower: Option<usize>, upper: Option<usize>) -> Self {
        if let Feed::Sequence {
            lower: lo,
            upper: hi,
            ..
        }
        | Feed::Footage {
            lower: lo,
            upper: hi,
            ..
        } = &mut self
        {
            let end = *hi;
            *hi = upper.map_or(end, |u| u.min(end));
            *lo = lower.map_or(0, |l| l.min(*hi));
        }
        self
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self, Feed::Sequence { .. } | Feed::Footage { .. })
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Feed::Stream(_))
    }

    /// Positions available to seek through.
    pub fn seekable_len(&self) -> Option<usize> {
        match self {
            Feed::Sequence { lower, upper, .. } | Feed::Footage { lower, upper, .. } => {
                Some(upper - lower)
            }
            _ => None,
        }
    }

    /// The frame at `position` within the window.
    pub fn seek(&mut self, position: usize) -> Result<Option<Frame>, FootageError> {
        match self {
            Feed::Sequence {
                frames,
                lower,
                upper,
            } => {
                if lower.saturating_add(position) >= *upper {
                    return Ok(None);
                }
                frames.get(*lower + position).map(Some)
            }
            Feed::Footage {
                footage,
                lower,
                upper,
            } => {
                if lower.saturating_add(position) >= *upper {
                    return Ok(None);
                }
                footage.read(*lower + position, false).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn next_frame(&mut self) -> Option<Frame> {
        match self {
            Feed::Stream(frames) => frames.next(),
            _ => None,
        }
    }

    pub(crate) fn close(&mut self) {
        if let Feed::Footage { footage, .. } = self {
            footage.close();
        }
    }
}
