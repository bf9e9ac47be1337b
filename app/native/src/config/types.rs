//! Configuration types for Backdrop.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, DEFAULT_INTERVAL_MINUTES};
pub use crate::error::ConfigError;
use crate::governor::PerformanceSettings;
use crate::platform::path::{expand, expand_and_resolve};
use crate::slideshow::{Filter, PlaybackMode, SlideshowOptions};

/// Slideshow configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SlideshowConfig {
    /// Directory containing the media to rotate through.
    /// `~` is expanded; relative paths are resolved against the config file.
    pub path: String,

    /// Whether subdirectories are scanned too. Their names become tags.
    /// Default: true
    pub recursive: bool,

    /// Minutes between changes. Zero or negative values use the default of 5.
    pub interval: f64,

    /// Playback mode: "sequential", "random" or "single-repeat".
    pub mode: PlaybackMode,

    /// Restricts the playlist to matching entries.
    pub filter: Filter,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            recursive: true,
            interval: DEFAULT_INTERVAL_MINUTES,
            mode: PlaybackMode::default(),
            filter: Filter::default(),
        }
    }
}

impl SlideshowConfig {
    /// Returns whether a media directory is configured.
    #[must_use]
    pub fn has_path(&self) -> bool { !self.path.trim().is_empty() }

    /// Resolves the media directory, relative to `config_dir` when given.
    #[must_use]
    pub fn media_path(&self, config_dir: Option<&Path>) -> PathBuf {
        config_dir.map_or_else(
            || expand(&self.path),
            |base| expand_and_resolve(&self.path, base),
        )
    }

    #[must_use]
    pub fn options(&self) -> SlideshowOptions {
        SlideshowOptions {
            mode: self.mode,
            interval_minutes: self.interval,
            filter: self.filter.clone(),
        }
    }
}

/// Root configuration object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BackdropConfig {
    /// JSON Schema reference, ignored at runtime.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Slideshow playback.
    pub slideshow: SlideshowConfig,

    /// Conditions that pause the slideshow.
    pub performance: PerformanceSettings,
}

/// Configuration file names searched in each directory.
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names searched in the home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".backdrop.jsonc", ".backdrop.json"];

/// Returns the configuration file search paths, most preferred first.
///
/// 1. `$XDG_CONFIG_HOME/backdrop/` when the variable is set
/// 2. `~/.config/backdrop/`
/// 3. the platform config directory (`~/Library/Application Support` on macOS)
/// 4. `~/.backdrop.jsonc` and `~/.backdrop.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        push_dir(PathBuf::from(xdg_config).join(APP_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join(APP_NAME));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join(APP_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads the configuration from the first existing search path.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists, or the
/// errors of [`load_config_from_path`] for the file that was found.
pub fn load_config() -> Result<(BackdropConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read and
/// `ConfigError::Parse` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(BackdropConfig, PathBuf), ConfigError> {
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: BackdropConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}
