//! JSON file implementation of [`SettingsStorePort`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::APP_NAME;
use crate::error::SettingsError;
use crate::ports::{SettingsStorePort, StoredSettings};

/// File name of the state file inside the data directory.
const STATE_FILE_NAME: &str = "state.json";

/// Stores playback settings as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// Store at `<data dir>/backdrop/state.json`, if the platform has a data
    /// directory.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_NAME).join(STATE_FILE_NAME)))
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

impl SettingsStorePort for JsonSettingsStore {
    fn load(&self) -> Result<Option<StoredSettings>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, contents)?;
        tracing::trace!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
