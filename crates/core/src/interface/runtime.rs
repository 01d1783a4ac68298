use std::collections::BTreeMap;

use crate::interface::control::{Callback, Control, ControlSpec};
use crate::interface::error::{BoxError, InterfaceError};
use crate::interface::feed::Feed;
use crate::interface::values::ControlValues;
use crate::shared::frame::Frame;

/// Processing function: turns the current frame and control values into the
/// frame to display.
pub type ProcessFn = Box<dyn FnMut(&View<'_>) -> Result<Frame, BoxError>>;

/// Read-only view handed to the processing function.
pub struct View<'a> {
    frame: &'a Frame,
    values: &'a BTreeMap<String, i32>,
}

impl<'a> View<'a> {
    pub fn frame(&self) -> &'a Frame {
        self.frame
    }

    pub fn get(&self, id: &str) -> Option<i32> {
        self.values.get(id).copied()
    }

    pub fn values(&self) -> &'a BTreeMap<String, i32> {
        self.values
    }
}

/// Mutable access to a running interface from inside a control callback.
pub struct Session<'a> {
    values: &'a mut BTreeMap<String, i32>,
    frame: &'a mut Option<Frame>,
    feed: &'a mut Feed,
    process: &'a mut Option<ProcessFn>,
}

impl Session<'_> {
    pub fn get(&self, id: &str) -> Option<i32> {
        self.values.get(id).copied()
    }

    /// Records a value for an existing control.
    pub fn set(&mut self, id: &str, value: i32) -> Result<(), InterfaceError> {
        let slot = self
            .values
            .get_mut(id)
            .ok_or_else(|| InterfaceError::UnknownControl(id.to_string()))?;
        *slot = value;
        Ok(())
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn set_frame(&mut self, frame: Frame) {
        *self.frame = Some(frame);
    }

    /// Moves a seekable feed to `position` and makes that frame current.
    /// Positions outside the window leave the current frame unchanged.
    pub fn seek(&mut self, position: usize) -> Result<Option<&Frame>, InterfaceError> {
        if let Some(frame) = self.feed.seek(position)? {
            *self.frame = Some(frame);
            return Ok(self.frame.as_ref());
        }
        Ok(None)
    }

    /// Runs the processing function over the current frame. Without one, the
    /// current frame is returned unchanged.
    pub fn process(&mut self) -> Result<Option<Frame>, InterfaceError> {
        let Some(frame) = self.frame.as_ref() else {
            return Ok(None);
        };
        match self.process.as_mut() {
            Some(process) => {
                let view = View {
                    frame,
                    values: &*self.values,
                };
                process(&view).map(Some).map_err(InterfaceError::Callback)
            }
            None => Ok(Some(frame.clone())),
        }
    }
}

/// Everything an event loop needs to drive an interface: controls, values,
/// the current frame and the feed.
#[derive(Default)]
pub struct Runtime {
    title: String,
    controls: Vec<Control>,
    values: BTreeMap<String, i32>,
    frame: Option<Frame>,
    feed: Feed,
    process: Option<ProcessFn>,
}

impl Runtime {
    pub(crate) fn new(title: String, feed: Feed) -> Self {
        let frame = match &feed {
            Feed::Still(frame) => Some(frame.clone()),
            _ => None,
        };
        Self {
            title,
            frame,
            feed,
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn controls(&self) -> impl Iterator<Item = &ControlSpec> {
        self.controls.iter().map(|c| &c.spec)
    }

    pub fn value(&self, id: &str) -> Option<i32> {
        self.values.get(id).copied()
    }

    pub fn values(&self) -> &BTreeMap<String, i32> {
        &self.values
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.feed.is_stream()
    }

    pub(crate) fn has_control(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub(crate) fn register(&mut self, spec: ControlSpec, callback: Callback) {
        self.values.insert(spec.id.clone(), spec.initial_value());
        self.controls.push(Control { spec, callback });
    }

    pub(crate) fn set_process(&mut self, process: ProcessFn) {
        self.process = Some(process);
    }

    pub(crate) fn set_value(&mut self, id: &str, value: i32) -> Result<(), InterfaceError> {
        self.session().set(id, value)
    }

    /// First frame to show. Streams pull their first frame; otherwise the
    /// first control fires with its current value.
    pub fn start(&mut self) -> Result<Option<Frame>, InterfaceError> {
        if self.feed.is_stream() {
            return self.advance();
        }
        match self.controls.first() {
            Some(first) => {
                let id = first.spec.id.clone();
                let value = self.values.get(&id).copied().unwrap_or(first.spec.min);
                self.change(&id, value)
            }
            None => self.session().process(),
        }
    }

    /// Applies a control change and returns the frame to display.
    /// Values are clamped into the control's range.
    pub fn change(&mut self, id: &str, value: i32) -> Result<Option<Frame>, InterfaceError> {
        let index = self
            .controls
            .iter()
            .position(|c| c.spec.id == id)
            .ok_or_else(|| InterfaceError::UnknownControl(id.to_string()))?;
        let value = self.controls[index].spec.clamp(value);
        log::trace!("{id} -> {value}");

        let Runtime {
            controls,
            values,
            frame,
            feed,
            process,
            ..
        } = self;
        let mut session = Session {
            values,
            frame,
            feed,
            process,
        };

        match &mut controls[index].callback {
            Callback::Default => {
                session.set(id, value)?;
                session.process()
            }
            Callback::Seek => {
                session.set(id, value)?;
                if session.seek(value.max(0) as usize)?.is_none() {
                    return Ok(None);
                }
                session.process()
            }
            Callback::Custom(f) => f(&mut session, value).map_err(InterfaceError::Callback),
        }
    }

    /// Pulls the next frame of a stream feed and processes it. `None` once the
    /// stream is exhausted, and always for other feeds.
    pub fn advance(&mut self) -> Result<Option<Frame>, InterfaceError> {
        let Some(next) = self.feed.next_frame() else {
            return Ok(None);
        };
        self.frame = Some(next);
        self.session().process()
    }

    /// Sets known controls from a snapshot, clamped into range. Unknown ids
    /// are skipped with a warning.
    pub fn restore(&mut self, snapshot: &ControlValues) {
        for (id, &value) in &snapshot.values {
            match self.controls.iter().find(|c| &c.spec.id == id) {
                Some(control) => {
                    self.values.insert(id.clone(), control.spec.clamp(value));
                }
                None => log::warn!("Ignoring value for unknown control '{id}'"),
            }
        }
    }

    pub fn snapshot(&self) -> ControlValues {
        ControlValues {
            title: self.title.clone(),
            values: self.values.clone(),
        }
    }

    pub(crate) fn close(&mut self) {
        self.feed.close();
    }

    fn session(&mut self) -> Session<'_> {
        Session {
            values: &mut self.values,
            frame: &mut self.frame,
            feed: &mut self.feed,
            process: &mut self.process,
        }
    }
}
