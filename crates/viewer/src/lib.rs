//! iced window hosting a [`vidkit_core::interface::Interface`]: the current
//! frame above one slider per control. Any key press closes the window.

mod app;
pub mod settings;

use std::cell::RefCell;
use std::rc::Rc;

use vidkit_core::interface::{ControlValues, EventLoop, InterfaceError, Runtime};

use app::{Shared, Viewer};
pub use settings::ViewerSettings;

#[derive(Debug, Clone, Default)]
pub struct IcedEventLoop {
    settings: ViewerSettings,
}

impl IcedEventLoop {
    pub fn new() -> Self {
        Self::with_settings(ViewerSettings::load())
    }

    pub fn with_settings(settings: ViewerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }
}

impl EventLoop for IcedEventLoop {
    fn run(&mut self, runtime: &mut Runtime) -> Result<(), InterfaceError> {
        let values_path = self
            .settings
            .persist_values
            .then(|| settings::values_path(runtime.title()))
            .flatten();

        if let Some(path) = values_path.as_deref().filter(|p| p.exists()) {
            match ControlValues::load(path) {
                Ok(snapshot) => runtime.restore(&snapshot),
                Err(err) => log::warn!("Ignoring saved values in {}: {err}", path.display()),
            }
        }

        let shared = Rc::new(RefCell::new(Shared {
            runtime: std::mem::take(runtime),
            failure: None,
        }));
        let boot_shared = Rc::clone(&shared);
        let settings = self.settings.clone();
        let size = iced::Size::new(settings.window_width, settings.window_height);

        let result = iced::application(
            move || Viewer::new(Rc::clone(&boot_shared), settings.clone()),
            Viewer::update,
            Viewer::view,
        )
        .title(Viewer::title)
        .subscription(Viewer::subscription)
        .window_size(size)
        .run();

        let mut state = shared.borrow_mut();
        *runtime = std::mem::take(&mut state.runtime);
        let failure = state.failure.take();
        drop(state);

        if let Some(path) = values_path {
            if let Err(err) = runtime.snapshot().save(&path) {
                log::warn!("Could not save control values: {err}");
            }
        }

        if let Some(err) = failure {
            return Err(err);
        }
        result.map_err(|e| InterfaceError::Host(e.to_string()))
    }
}
