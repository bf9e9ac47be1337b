//! Configuration module for Backdrop.
//!
//! This module provides configuration types, loading functionality and the
//! JSON-backed settings store.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod store;
pub mod types;

use std::path::{Path, PathBuf};

pub use store::JsonSettingsStore;
pub use types::{
    BackdropConfig, ConfigError, SlideshowConfig, config_paths, load_config as load_config_default,
    load_config_from_path,
};

/// A loaded configuration and the file it came from, if any.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: BackdropConfig,
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory of the config file, used to resolve relative media paths.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> { self.path.as_deref().and_then(Path::parent) }
}

/// Loads the configuration from `custom` or the default search paths.
///
/// A file found on the search paths that cannot be used is skipped with a
/// warning and defaults apply. A file named with `--config` must be usable.
///
/// # Errors
///
/// Returns the [`ConfigError`] of `custom` when it cannot be read or parsed.
pub fn load(custom: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = custom {
        let (config, path) = load_config_from_path(path)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        return Ok(LoadedConfig { config, path: Some(path) });
    }

    match load_config_default() {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(LoadedConfig { config, path: Some(path) })
        }
        Err(ConfigError::NotFound) => {
            tracing::debug!("no configuration file found, using defaults");
            Ok(LoadedConfig::default())
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            Ok(LoadedConfig::default())
        }
    }
}
