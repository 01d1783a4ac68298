use std::collections::BTreeMap;

use crate::interface::control::{Callback, ControlSpec};
use crate::interface::error::{BoxError, InterfaceError};
use crate::interface::feed::Feed;
use crate::interface::runtime::{Runtime, Session, View};
use crate::interface::values::ControlValues;
use crate::shared::constants::{FRAMES_CONTROL_ID, FRAMES_CONTROL_LABEL};
use crate::shared::frame::Frame;

/// Lifecycle of an [`Interface`]. There is no way back from `Closed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unconfigured,
    Configured,
    Running,
    Closed,
}

/// The host GUI toolkit's main loop.
///
/// `run` blocks until the user exits. Hosts call [`Runtime::start`] once,
/// then [`Runtime::change`] for every control change and, for streaming
/// feeds, [`Runtime::advance`] until it returns `None`.
pub trait EventLoop {
    fn run(&mut self, runtime: &mut Runtime) -> Result<(), InterfaceError>;
}

/// Declarative control window: a processing function, a set of sliders and
/// a feed of frames, handed to an [`EventLoop`] to run.
///
/// ```no_run
/// use vidkit_core::interface::{ControlSpec, Feed, Interface};
/// use vidkit_core::shared::frame::Frame;
///
/// # fn host() -> impl vidkit_core::interface::EventLoop { vidkit_core::interface::ScriptedEventLoop::new() }
/// let mut interface = Interface::new("Threshold", Feed::still(Frame::filled(64, 64, 1, 90)))?;
/// interface
///     .add_control(ControlSpec::new("threshold", "Threshold", 0, 255))?
///     .set_process(|view| {
///         let t = view.get("threshold").unwrap_or(0) as u8;
///         let mut out = view.frame().clone();
///         out.data_mut().iter_mut().for_each(|v| *v = if *v > t { 255 } else { 0 });
///         Ok(out)
///     })?;
/// interface.run(&mut host())?;
/// # Ok::<(), vidkit_core::interface::InterfaceError>(())
/// ```
pub struct Interface {
    phase: Phase,
    runtime: Runtime,
}

impl Interface {
    /// Seekable feeds get a `frames` control over their window.
    pub fn new(title: impl Into<String>, feed: Feed) -> Result<Self, InterfaceError> {
        let seekable = feed.seekable_len();
        if seekable == Some(0) {
            return Err(InterfaceError::EmptyFeed);
        }

        let mut runtime = Runtime::new(title.into(), feed);
        if let Some(len) = seekable {
            let max = i32::try_from(len - 1).unwrap_or(i32::MAX);
            runtime.register(
                ControlSpec::new(FRAMES_CONTROL_ID, FRAMES_CONTROL_LABEL, 0, max),
                Callback::Seek,
            );
        }
        Ok(Self {
            phase: Phase::Unconfigured,
            runtime,
        })
    }

    pub fn title(&self) -> &str {
        self.runtime.title()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn set_process(
        &mut self,
        f: impl FnMut(&View<'_>) -> Result<Frame, BoxError> + 'static,
    ) -> Result<&mut Self, InterfaceError> {
        self.configure()?;
        self.runtime.set_process(Box::new(f));
        Ok(self)
    }

    /// Registers a control whose changes store the value and reprocess the
    /// current frame.
    pub fn add_control(&mut self, spec: ControlSpec) -> Result<&mut Self, InterfaceError> {
        self.register(spec, Callback::Default)
    }

    /// Registers a control with its own callback.
    pub fn add_control_with(
        &mut self,
        spec: ControlSpec,
        f: impl FnMut(&mut Session<'_>, i32) -> Result<Option<Frame>, BoxError> + 'static,
    ) -> Result<&mut Self, InterfaceError> {
        self.register(spec, Callback::Custom(Box::new(f)))
    }

    fn register(
        &mut self,
        spec: ControlSpec,
        callback: Callback,
    ) -> Result<&mut Self, InterfaceError> {
        if matches!(self.phase, Phase::Running | Phase::Closed) {
            return Err(InterfaceError::Closed);
        }
        spec.validate()?;
        if self.runtime.has_control(&spec.id) {
            return Err(InterfaceError::DuplicateControl(spec.id));
        }
        self.configure()?;
        log::debug!(
            "Registered control '{}' ({}..={})",
            spec.id,
            spec.min,
            spec.max
        );
        self.runtime.register(spec, callback);
        Ok(self)
    }

    fn configure(&mut self) -> Result<(), InterfaceError> {
        match self.phase {
            Phase::Unconfigured => {
                self.phase = Phase::Configured;
                Ok(())
            }
            Phase::Configured => Ok(()),
            Phase::Running | Phase::Closed => Err(InterfaceError::Closed),
        }
    }

    pub fn get(&self, id: &str) -> Result<i32, InterfaceError> {
        self.runtime
            .value(id)
            .ok_or_else(|| InterfaceError::UnknownControl(id.to_string()))
    }

    /// Records a value without firing the control's callback.
    pub fn set(&mut self, id: &str, value: i32) -> Result<(), InterfaceError> {
        self.runtime.set_value(id, value)
    }

    /// Every control value by id. Empty when there are no controls.
    pub fn values(&self) -> &BTreeMap<String, i32> {
        self.runtime.values()
    }

    pub fn control_values(&self) -> ControlValues {
        self.runtime.snapshot()
    }

    /// Restores values from a snapshot, clamped into each control's range.
    pub fn apply_values(&mut self, snapshot: &ControlValues) -> Result<(), InterfaceError> {
        if self.phase == Phase::Closed {
            return Err(InterfaceError::Closed);
        }
        self.runtime.restore(snapshot);
        Ok(())
    }

    /// Hands control to `host` until the user exits. The feed is released
    /// afterwards, whether or not the host succeeded.
    pub fn run(&mut self, host: &mut dyn EventLoop) -> Result<(), InterfaceError> {
        if matches!(self.phase, Phase::Running | Phase::Closed) {
            return Err(InterfaceError::Closed);
        }
        self.phase = Phase::Running;
        log::info!("Running interface '{}'", self.runtime.title());

        let result = host.run(&mut self.runtime);

        self.runtime.close();
        self.phase = Phase::Closed;
        log::info!("Closed interface '{}'", self.runtime.title());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::scripted::ScriptedEventLoop;
    use crate::video::footage::Footage;
    use crate::video::source::FootageSource;

    fn ramp(count: usize) -> Vec<Frame> {
        (0..count)
            .map(|i| Frame::filled(2, 2, 1, i as u8 * 10).with_index(i))
            .collect()
    }

    fn threshold(view: &View<'_>) -> Result<Frame, BoxError> {
        let t = view.get("threshold").ok_or("no threshold")?;
        let mut out = view.frame().clone();
        for v in out.data_mut() {
            *v = if i32::from(*v) > t { 255 } else { 0 };
        }
        Ok(out)
    }

    #[test]
    fn test_duplicate_control_fails_before_run() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(1, 1, 1, 0))).unwrap();
        interface
            .add_control(ControlSpec::new("a", "A", 0, 10))
            .unwrap();
        assert!(matches!(
            interface.add_control(ControlSpec::new("a", "Again", 0, 5)),
            Err(InterfaceError::DuplicateControl(id)) if id == "a"
        ));
    }

    #[test]
    fn test_rejected_control_leaves_phase_unchanged() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(1, 1, 1, 0))).unwrap();
        assert!(matches!(
            interface.add_control(ControlSpec::new("a", "A", 5, 1)),
            Err(InterfaceError::InvalidRange { min: 5, max: 1 })
        ));
        assert_eq!(interface.phase(), Phase::Unconfigured);
        assert!(interface.get("a").is_err());
    }

    #[test]
    fn test_frames_control_cannot_be_shadowed() {
        let mut interface = Interface::new("t", Feed::frames(&ramp(3)).unwrap()).unwrap();
        assert!(matches!(
            interface.add_control(ControlSpec::new(FRAMES_CONTROL_ID, "Mine", 0, 1)),
            Err(InterfaceError::DuplicateControl(_))
        ));
    }

    #[test]
    fn test_phases() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(1, 1, 1, 0))).unwrap();
        assert_eq!(interface.phase(), Phase::Unconfigured);
        interface.set_process(|view| Ok(view.frame().clone())).unwrap();
        assert_eq!(interface.phase(), Phase::Configured);

        interface.run(&mut ScriptedEventLoop::new()).unwrap();
        assert_eq!(interface.phase(), Phase::Closed);

        assert!(matches!(
            interface.run(&mut ScriptedEventLoop::new()),
            Err(InterfaceError::Closed)
        ));
        assert!(matches!(
            interface.add_control(ControlSpec::new("late", "Late", 0, 1)),
            Err(InterfaceError::Closed)
        ));
    }

    #[test]
    fn test_get_set_values() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(1, 1, 1, 0))).unwrap();
        assert!(interface.values().is_empty());

        interface
            .add_control(ControlSpec::new("low", "Low", 0, 100).with_initial(20))
            .unwrap()
            .add_control(ControlSpec::new("high", "High", 0, 100))
            .unwrap();
        assert_eq!(interface.get("low").unwrap(), 20);
        assert_eq!(interface.get("high").unwrap(), 0);

        interface.set("high", 80).unwrap();
        let values: Vec<_> = interface.values().iter().map(|(k, &v)| (k.as_str(), v)).collect();
        assert_eq!(values, vec![("high", 80), ("low", 20)]);

        assert!(matches!(
            interface.get("missing"),
            Err(InterfaceError::UnknownControl(_))
        ));
        assert!(interface.set("missing", 1).is_err());
    }

    #[test]
    fn test_default_callback_reprocesses_still() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(2, 2, 1, 100))).unwrap();
        interface
            .add_control(ControlSpec::new("threshold", "Threshold", 0, 255))
            .unwrap()
            .set_process(threshold)
            .unwrap();

        let mut host = ScriptedEventLoop::new()
            .change("threshold", 150)
            .change("threshold", 50);
        interface.run(&mut host).unwrap();

        let shown: Vec<u8> = host.displayed().iter().map(|f| f.data()[0]).collect();
        assert_eq!(shown, vec![255, 0, 255]);
        assert_eq!(interface.get("threshold").unwrap(), 50);
    }

    #[test]
    fn test_seek_control_offsets_by_window() {
        let feed = Feed::frames(&ramp(10)).unwrap().window(Some(2), Some(6));
        let mut interface = Interface::new("t", feed).unwrap();
        let spec = interface.runtime.controls().next().unwrap().clone();
        assert_eq!((spec.min, spec.max), (0, 3));

        let mut host = ScriptedEventLoop::new().change("frames", 3).change("frames", 99);
        interface.run(&mut host).unwrap();

        // no processing function: frames are shown as they are
        let shown: Vec<usize> = host.displayed().iter().map(Frame::index).collect();
        assert_eq!(shown, vec![2, 5, 5]);
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let feed = Feed::frames(&ramp(3)).unwrap().window(Some(3), None);
        assert!(matches!(
            Interface::new("t", feed),
            Err(InterfaceError::EmptyFeed)
        ));
    }

    #[test]
    fn test_custom_callback_uses_session() {
        let mut interface = Interface::new("t", Feed::frames(&ramp(5)).unwrap()).unwrap();
        interface
            .add_control_with(ControlSpec::new("jump", "Jump", 0, 4), |session, value| {
                session.set("frames", value)?;
                session.seek(value as usize)?;
                Ok(session.process()?)
            })
            .unwrap();

        let mut host = ScriptedEventLoop::new().change("jump", 4);
        interface.run(&mut host).unwrap();

        assert_eq!(host.displayed().last().unwrap().index(), 4);
        assert_eq!(interface.get("frames").unwrap(), 4);
    }

    #[test]
    fn test_callback_error_is_reported_and_feed_released() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        image::GrayImage::new(2, 2).save(&path).unwrap();
        let footage = Footage::open(FootageSource::from_paths([&path]).unwrap()).unwrap();

        let mut interface = Interface::new("t", Feed::footage(footage)).unwrap();
        interface
            .set_process(|_| Err("processing failed".into()))
            .unwrap();

        let result = interface.run(&mut ScriptedEventLoop::new());
        assert!(matches!(result, Err(InterfaceError::Callback(_))));
        assert_eq!(interface.phase(), Phase::Closed);
    }

    #[test]
    fn test_stream_runs_until_exhausted() {
        let mut interface = Interface::new("t", Feed::stream(ramp(3).into_iter())).unwrap();
        interface
            .add_control(ControlSpec::new("threshold", "Threshold", 0, 255).with_initial(15))
            .unwrap()
            .set_process(threshold)
            .unwrap();

        let mut host = ScriptedEventLoop::new().ticks(5);
        interface.run(&mut host).unwrap();

        let shown: Vec<u8> = host.displayed().iter().map(|f| f.data()[0]).collect();
        assert_eq!(shown, vec![0, 0, 255]);
    }

    #[test]
    fn test_apply_values_clamps_and_skips_unknown() {
        let mut interface = Interface::new("t", Feed::frames(&ramp(4)).unwrap()).unwrap();
        interface
            .add_control(ControlSpec::new("threshold", "Threshold", 0, 255))
            .unwrap();

        let snapshot = ControlValues {
            title: "t".to_string(),
            values: BTreeMap::from([
                ("frames".to_string(), 10),
                ("threshold".to_string(), 128),
                ("gone".to_string(), 1),
            ]),
        };
        interface.apply_values(&snapshot).unwrap();
        assert_eq!(interface.get("frames").unwrap(), 3);
        assert_eq!(interface.get("threshold").unwrap(), 128);
        assert!(interface.get("gone").is_err());

        let mut host = ScriptedEventLoop::new();
        interface.run(&mut host).unwrap();
        assert_eq!(host.displayed()[0].index(), 3);
        assert_eq!(interface.control_values().values["threshold"], 128);
    }
}
