use dotgrid::render::RenderOptions;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed preferences file: {0}")]
    Json(#[from] serde_json::Error),
}

/// User toggles persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub animations: bool,
    pub dark_mode: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self { animations: true, dark_mode: false }
    }
}

impl Preferences {
    /// Reads preferences from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new()
            .with_dark_mode(self.dark_mode)
            .with_animate(self.animations)
    }
}
