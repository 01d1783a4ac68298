//! Declarative trackbar windows: register controls and a processing
//! function, then hand the interface to an event loop.

pub mod builder;
pub mod control;
pub mod error;
pub mod feed;
pub mod runtime;
pub mod scripted;
pub mod values;

pub use builder::{EventLoop, Interface, Phase};
pub use control::{ControlFn, ControlSpec};
pub use error::{BoxError, InterfaceError};
pub use feed::Feed;
pub use runtime::{ProcessFn, Runtime, Session, View};
pub use scripted::{ScriptStep, ScriptedEventLoop};
pub use values::ControlValues;
