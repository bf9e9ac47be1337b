//! Error types for Backdrop.
//!
//! This module provides the error types shared by the slideshow engine, the
//! host adapters and the CLI. Core operations report failures through these
//! types and never panic; every failure path leaves playback either stopped
//! or unpaused.

use thiserror::Error;

/// Errors that can occur while running the application or a CLI command.
#[derive(Debug, Error)]
pub enum BackdropError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Media catalog could not be read.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    /// The slideshow could not be started.
    #[error("Slideshow error: {0}")]
    Slideshow(#[from] SlideshowError),
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/backdrop/config.jsonc, \
         the platform config directory, or ~/.backdrop.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by a media catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The configured media path does not exist or is not a directory.
    #[error("Invalid media path: {0}")]
    InvalidPath(String),
    /// A directory could not be listed.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a settings store.
///
/// Stores are best effort: callers log these and carry on with the settings
/// they already have.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file contains invalid JSON.
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Outcomes of slideshow operations that could not be carried out.
///
/// These are reported to the caller and logged; none of them leaves the
/// playback engine in an undefined state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlideshowError {
    /// The playlist has no entries, so there is nothing to show.
    #[error("Playlist is empty")]
    EmptyPlaylist,
    /// No playlist entry has the requested id.
    #[error("Unknown media entry: {0}")]
    UnknownEntry(String),
    /// The catalog could not be read; the previous playlist is kept.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

/// A system signal could not be read.
///
/// The governor treats both variants as a neutral reading.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalError {
    /// The host provides the signal but the query failed.
    #[error("Signal unavailable: {0}")]
    Unavailable(String),
    /// The host has no way to provide the signal.
    #[error("Signal not supported on this platform")]
    Unsupported,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arguments_display() {
        let err = BackdropError::InvalidArguments("Interval must be a number".to_string());
        assert_eq!(err.to_string(), "Interval must be a number");
    }

    #[test]
    fn test_config_error_wraps_into_backdrop_error() {
        let err: BackdropError = ConfigError::NotFound.into();
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("No configuration file found"));
    }

    #[test]
    fn test_catalog_io_error_mentions_path() {
        let err = CatalogError::Io {
            path: "/srv/walls".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/walls"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BackdropError = io_err.into();
        assert!(matches!(err, BackdropError::Io(_)));
    }

    #[test]
    fn test_settings_parse_error_display() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SettingsError = parse_err.into();
        assert!(err.to_string().contains("Failed to parse settings file"));
    }

    #[test]
    fn test_slideshow_error_display() {
        assert_eq!(SlideshowError::EmptyPlaylist.to_string(), "Playlist is empty");
        let unknown = SlideshowError::UnknownEntry("sunset".to_string());
        assert!(unknown.to_string().contains("sunset"));
    }

    #[test]
    fn test_signal_error_display() {
        let err = SignalError::Unavailable("no battery manager".to_string());
        assert!(err.to_string().contains("no battery manager"));
        assert!(SignalError::Unsupported.to_string().contains("not supported"));
    }
}
