use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::interface::error::InterfaceError;

/// Snapshot of control values, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlValues {
    #[serde(default)]
    pub title: String,
    pub values: BTreeMap<String, i32>,
}

impl ControlValues {
    pub fn load(path: &Path) -> Result<Self, InterfaceError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), InterfaceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::debug!("Saved {} control values to {}", self.values.len(), path.display());
        Ok(())
    }
}
