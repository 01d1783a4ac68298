use crate::interface::error::{BoxError, InterfaceError};
use crate::interface::runtime::Session;
use crate::shared::frame::Frame;

/// Callback run when a control changes. Returns the frame to display, if any.
pub type ControlFn = Box<dyn FnMut(&mut Session<'_>, i32) -> Result<Option<Frame>, BoxError>>;

/// Describes one slider: identifier, label and inclusive range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlSpec {
    pub id: String,
    pub label: String,
    pub min: i32,
    pub max: i32,
    /// Starting value; the lower bound when unset.
    pub initial: Option<i32>,
}

impl ControlSpec {
    pub fn new(id: impl Into<String>, label: impl Into<String>, min: i32, max: i32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            min,
            max,
            initial: None,
        }
    }

    pub fn with_initial(mut self, value: i32) -> Self {
        self.initial = Some(value);
        self
    }

    pub fn validate(&self) -> Result<(), InterfaceError> {
        if self.min > self.max {
            return Err(InterfaceError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    pub fn initial_value(&self) -> i32 {
        self.clamp(self.initial.unwrap_or(self.min))
    }
}

pub(crate) enum Callback {
    /// Store the value and reprocess the current frame.
    Default,
    /// Move the feed to the given position, then reprocess.
    Seek,
    Custom(ControlFn),
}

pub(crate) struct Control {
    pub spec: ControlSpec,
    pub callback: Callback,
}
