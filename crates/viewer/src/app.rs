use std::cell::RefCell;
use std::rc::Rc;

use iced::widget::{column, container, image, row, slider, text};
use iced::{event, keyboard, Element, Event, Length, Subscription, Task};

use vidkit_core::interface::{ControlSpec, InterfaceError, Runtime};
use vidkit_core::shared::frame::Frame;

use crate::settings::ViewerSettings;

/// State shared between the event loop and the running window. The window
/// only borrows it while handling a message.
pub(crate) struct Shared {
    pub runtime: Runtime,
    pub failure: Option<InterfaceError>,
}

#[derive(Debug, Clone)]
pub enum Message {
    ControlChanged(usize, i32),
    Tick,
    Exit,
}

pub(crate) struct Viewer {
    shared: Rc<RefCell<Shared>>,
    title: String,
    controls: Vec<ControlSpec>,
    values: Vec<i32>,
    picture: Option<image::Handle>,
    settings: ViewerSettings,
    streaming: bool,
}

impl Viewer {
    pub fn new(shared: Rc<RefCell<Shared>>, settings: ViewerSettings) -> (Self, Task<Message>) {
        let (title, controls, values, streaming) = {
            let state = shared.borrow();
            let controls: Vec<ControlSpec> = state.runtime.controls().cloned().collect();
            let values = controls
                .iter()
                .map(|c| state.runtime.value(&c.id).unwrap_or(c.min))
                .collect();
            (
                state.runtime.title().to_string(),
                controls,
                values,
                state.runtime.is_streaming(),
            )
        };

        let mut viewer = Self {
            shared,
            title,
            controls,
            values,
            picture: None,
            settings,
            streaming,
        };
        let first = viewer.shared.borrow_mut().runtime.start();
        let task = viewer.show(first);
        (viewer, task)
    }

    pub fn title(&self) -> String {
        self.title.clone()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ControlChanged(position, value) => {
                let Some((id, value)) =
                    move_slider(&self.controls, &mut self.values, position, value)
                else {
                    return Task::none();
                };
                let shown = self.shared.borrow_mut().runtime.change(&id, value);
                self.show(shown)
            }
            Message::Tick => {
                let next = self.shared.borrow_mut().runtime.advance();
                match next {
                    Ok(None) => {
                        log::info!("Stream exhausted, closing '{}'", self.title);
                        iced::exit()
                    }
                    other => self.show(other),
                }
            }
            Message::Exit => iced::exit(),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let picture: Element<'_, Message> = match &self.picture {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => text("No frame").into(),
        };

        let sliders = column(
            self.controls
                .iter()
                .zip(&self.values)
                .enumerate()
                .map(|(position, (spec, &value))| {
                    row![
                        text(&spec.label).width(Length::Fixed(120.0)),
                        slider(spec.min..=spec.max, value, move |v| {
                            Message::ControlChanged(position, v)
                        }),
                        text(value.to_string()).width(Length::Fixed(48.0)),
                    ]
                    .spacing(12)
                    .into()
                }),
        )
        .spacing(6);

        column![
            container(picture)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill),
            sliders,
        ]
        .spacing(8)
        .padding(12)
        .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let keys = event::listen_with(|event, _status, _window| match event {
            Event::Keyboard(keyboard::Event::KeyPressed { .. }) => Some(Message::Exit),
            _ => None,
        });
        if self.streaming {
            Subscription::batch([
                keys,
                iced::time::every(self.settings.tick_interval()).map(|_| Message::Tick),
            ])
        } else {
            keys
        }
    }

    /// Displays the result of a runtime call. Failures end the session and
    /// are reported once the window has closed.
    fn show(&mut self, result: Result<Option<Frame>, InterfaceError>) -> Task<Message> {
        match result {
            Ok(Some(frame)) => {
                self.picture = to_handle(&frame);
                Task::none()
            }
            Ok(None) => Task::none(),
            Err(err) => {
                log::error!("Interface '{}' failed: {err}", self.title);
                self.shared.borrow_mut().failure = Some(err);
                iced::exit()
            }
        }
    }
}

/// Records a slider drag. Sliders only ever show the user's position; values
/// a callback records with `set` stay out of the widgets. Returns the control
/// to notify, or `None` when nothing moved.
fn move_slider(
    controls: &[ControlSpec],
    values: &mut [i32],
    position: usize,
    value: i32,
) -> Option<(String, i32)> {
    let spec = controls.get(position)?;
    let value = spec.clamp(value);
    let slot = values.get_mut(position)?;
    if *slot == value {
        return None;
    }
    *slot = value;
    Some((spec.id.clone(), value))
}

pub(crate) fn to_handle(frame: &Frame) -> Option<image::Handle> {
    let rgba = frame.to_dynamic()?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Some(image::Handle::from_rgba(width, height, rgba.into_raw()))
}
