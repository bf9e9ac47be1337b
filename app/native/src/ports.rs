//! Collaborator ports consumed by the core.
//!
//! The slideshow and governor only see these traits. Host implementations
//! live in [`crate::host`] and [`crate::config::store`]; tests provide
//! in-memory ones.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_INTERVAL_MINUTES;
use crate::error::{CatalogError, SettingsError};
pub use crate::governor::SystemSignalPort;
use crate::governor::PerformanceSettings;
use crate::slideshow::{Filter, MediaEntry, MediaType, PlaybackMode};

/// Source of the full, unfiltered media catalog.
pub trait CatalogPort: Send + Sync {
    /// Returns every entry in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error when the catalog cannot be read at all.
    fn all_entries(&self) -> Result<Vec<MediaEntry>, CatalogError>;
}

/// Checks that an entry can still be shown.
pub trait ValidationPort: Send + Sync {
    fn exists(&self, entry_id: &str) -> bool;
}

/// Puts an entry on screen. Fire-and-forget: the core never waits for or
/// observes the outcome.
pub trait RendererPort: Send + Sync {
    fn display(&self, path: &Path, media_type: MediaType);
}

/// Values the facade persists between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoredSettings {
    pub interval_minutes: f64,
    pub mode: PlaybackMode,
    pub filter: Filter,
    pub performance: PerformanceSettings,
}

impl Default for StoredSettings {
    fn default() -> Self {
        Self {
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
            mode: PlaybackMode::default(),
            filter: Filter::default(),
            performance: PerformanceSettings::default(),
        }
    }
}

/// Optional persistence for [`StoredSettings`].
pub trait SettingsStorePort: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error when saved settings exist but cannot be read.
    fn load(&self) -> Result<Option<StoredSettings>, SettingsError>;

    /// # Errors
    ///
    /// Returns an error when the settings cannot be written.
    fn save(&self, settings: &StoredSettings) -> Result<(), SettingsError>;
}
