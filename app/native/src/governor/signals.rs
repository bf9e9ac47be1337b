//! Host signal port and sampling.

use std::collections::BTreeSet;

use super::settings::PerformanceSettings;
use crate::error::SignalError;

/// Queries the host for the conditions the governor cares about.
///
/// Calls may be slow. The governor never holds the playback lock while
/// calling into a port.
pub trait SystemSignalPort: Send + Sync {
    fn is_on_battery(&self) -> Result<bool, SignalError>;

    /// Battery charge in percent.
    fn battery_percent(&self) -> Result<f32, SignalError>;

    /// Global CPU usage in percent.
    fn cpu_percent(&self) -> Result<f32, SignalError>;

    /// Whether the foreground application covers the screen and is not one of
    /// `excluded`.
    fn is_foreground_fullscreen(&self, excluded: &BTreeSet<String>) -> Result<bool, SignalError> {
        let _ = excluded;
        Err(SignalError::Unsupported)
    }

    fn is_session_locked(&self) -> Result<bool, SignalError> { Err(SignalError::Unsupported) }

    fn is_display_sleeping(&self) -> Result<bool, SignalError> { Err(SignalError::Unsupported) }
}

/// One reading of every signal, with failures already mapped to neutral
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    pub user_paused: bool,
    pub session_locked: bool,
    pub on_battery: bool,
    pub battery_percent: f32,
    pub foreground_fullscreen: bool,
    pub cpu_percent: f32,
    pub display_sleeping: bool,
}

impl Default for SignalSnapshot {
    fn default() -> Self {
        Self {
            user_paused: false,
            session_locked: false,
            on_battery: false,
            battery_percent: 100.0,
            foreground_fullscreen: false,
            cpu_percent: 0.0,
            display_sleeping: false,
        }
    }
}

impl SignalSnapshot {
    /// Samples the port.
    ///
    /// Only signals with an enabled toggle are queried; the display state has
    /// no toggle and is always queried. When the user paused, nothing is
    /// queried at all.
    pub fn sample(
        port: &dyn SystemSignalPort,
        settings: &PerformanceSettings,
        user_paused: bool,
    ) -> Self {
        let mut snapshot = Self { user_paused, ..Self::default() };
        if user_paused {
            return snapshot;
        }

        if settings.pause_on_lock {
            snapshot.session_locked = read("session_locked", port.is_session_locked(), false);
        }

        if settings.pause_on_battery || settings.super_saving_mode {
            snapshot.on_battery = read("on_battery", port.is_on_battery(), false);
        }

        if settings.super_saving_mode && snapshot.on_battery {
            snapshot.battery_percent = read("battery_percent", port.battery_percent(), 100.0);
        }

        if settings.pause_on_fullscreen {
            snapshot.foreground_fullscreen = read(
                "foreground_fullscreen",
                port.is_foreground_fullscreen(&settings.excluded_apps),
                false,
            );
        }

        if settings.pause_on_high_cpu {
            snapshot.cpu_percent = read("cpu_percent", port.cpu_percent(), 0.0);
        }

        snapshot.display_sleeping = read("display_sleeping", port.is_display_sleeping(), false);

        snapshot
    }
}

fn read<T>(signal: &'static str, reading: Result<T, SignalError>, neutral: T) -> T {
    match reading {
        Ok(value) => value,
        Err(SignalError::Unsupported) => {
            tracing::trace!(signal, "signal not supported, using neutral reading");
            neutral
        }
        Err(err) => {
            tracing::debug!(signal, error = %err, "signal unavailable, using neutral reading");
            neutral
        }
    }
}
