//! Application-wide constants.

use std::time::Duration;

/// Application name, used for config directories and thread names.
pub const APP_NAME: &str = "backdrop";

/// Slideshow interval applied when none (or an invalid one) is configured.
pub const DEFAULT_INTERVAL_MINUTES: f64 = 5.0;

/// [`DEFAULT_INTERVAL_MINUTES`] as a duration.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Battery charge (percent) below which super-saving mode pauses playback.
pub const LOW_BATTERY_PERCENT: f32 = 20.0;

/// CPU usage (percent) above which playback pauses when enabled.
pub const DEFAULT_CPU_THRESHOLD: f32 = 85.0;

/// Capacity of the notification broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;
