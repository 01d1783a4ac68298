use thiserror::Error;

use crate::video::error::FootageError;

/// Error type returned by processing functions and control callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures raised while building or running an interface.
#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("a control with id '{0}' is already registered")]
    DuplicateControl(String),
    #[error("no control with id '{0}'")]
    UnknownControl(String),
    #[error("control range {min}..={max} is empty")]
    InvalidRange { min: i32, max: i32 },
    #[error("interface has already been run")]
    Closed,
    #[error("feed has no frames to show")]
    EmptyFeed,
    #[error("footage: {0}")]
    Footage(#[from] FootageError),
    #[error("callback failed: {0}")]
    Callback(#[source] BoxError),
    #[error("event loop failed: {0}")]
    Host(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("control values: {0}")]
    Json(#[from] serde_json::Error),
}
