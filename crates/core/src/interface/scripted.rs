use crate::interface::builder::EventLoop;
use crate::interface::error::InterfaceError;
use crate::interface::runtime::Runtime;
use crate::shared::frame::Frame;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptStep {
    Change(String, i32),
    Tick,
}

/// Headless host that replays a fixed list of control changes and stream
/// ticks, recording every frame it would have displayed.
#[derive(Debug, Default)]
pub struct ScriptedEventLoop {
    steps: Vec<ScriptStep>,
    displayed: Vec<Frame>,
}

impl ScriptedEventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn change(mut self, id: impl Into<String>, value: i32) -> Self {
        self.steps.push(ScriptStep::Change(id.into(), value));
        self
    }

    pub fn tick(mut self) -> Self {
        self.steps.push(ScriptStep::Tick);
        self
    }

    pub fn ticks(mut self, count: usize) -> Self {
        self.steps.extend((0..count).map(|_| ScriptStep::Tick));
        self
    }

    pub fn displayed(&self) -> &[Frame] {
        &self.displayed
    }

    fn show(&mut self, frame: Option<Frame>) {
        if let Some(frame) = frame {
            self.displayed.push(frame);
        }
    }
}

impl EventLoop for ScriptedEventLoop {
    fn run(&mut self, runtime: &mut Runtime) -> Result<(), InterfaceError> {
        let first = runtime.start()?;
        let exhausted = runtime.is_streaming() && first.is_none();
        self.show(first);
        if exhausted {
            return Ok(());
        }

        for step in std::mem::take(&mut self.steps) {
            match step {
                ScriptStep::Change(id, value) => {
                    let frame = runtime.change(&id, value)?;
                    self.show(frame);
                }
                ScriptStep::Tick => {
                    if !runtime.is_streaming() {
                        continue;
                    }
                    match runtime.advance()? {
                        Some(frame) => self.displayed.push(frame),
                        None => {
                            log::debug!("Stream exhausted");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::builder::Interface;
    use crate::interface::control::ControlSpec;
    use crate::interface::feed::Feed;

    #[test]
    fn test_ticks_are_ignored_for_stills() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(1, 1, 1, 3))).unwrap();
        let mut host = ScriptedEventLoop::new().ticks(3);
        interface.run(&mut host).unwrap();
        assert_eq!(host.displayed().len(), 1);
    }

    #[test]
    fn test_unknown_control_aborts_run() {
        let mut interface = Interface::new("t", Feed::still(Frame::filled(1, 1, 1, 3))).unwrap();
        interface
            .add_control(ControlSpec::new("a", "A", 0, 1))
            .unwrap();
        let mut host = ScriptedEventLoop::new().change("b", 1);
        assert!(matches!(
            interface.run(&mut host),
            Err(InterfaceError::UnknownControl(id)) if id == "b"
        ));
    }

    #[test]
    fn test_empty_stream_shows_nothing() {
        let mut interface = Interface::new("t", Feed::default()).unwrap();
        let mut host = ScriptedEventLoop::new().tick();
        interface.run(&mut host).unwrap();
        assert!(host.displayed().is_empty());
    }
}
