use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_DIR: &str = "vidkit";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub window_width: f32,
    pub window_height: f32,
    /// Restore control values on start and save them on exit, per title.
    pub persist_values: bool,
    /// How often stream feeds are polled for their next frame.
    pub tick_millis: u64,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            window_width: 960.0,
            window_height: 720.0,
            persist_values: false,
            tick_millis: 33,
        }
    }
}

impl ViewerSettings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join("viewer.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = fs::write(path, json);
            }
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }
}

/// Where the control values of the interface titled `title` are kept.
pub fn values_path(title: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(format!("{}.json", file_stem(title))))
}

fn file_stem(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "interface".to_string()
    } else {
        stem
    }
}
