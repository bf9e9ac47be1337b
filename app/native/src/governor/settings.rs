//! Pause governor settings.

use std::collections::BTreeSet;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CPU_THRESHOLD;

/// How often the governor samples the host.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceMode {
    /// Poll every 5 seconds.
    PowerSave,
    /// Poll every 3 seconds.
    #[default]
    Balanced,
    /// Poll every 1.5 seconds.
    Performance,
}

impl PerformanceMode {
    #[must_use]
    pub const fn poll_interval(self) -> Duration {
        match self {
            Self::PowerSave => Duration::from_secs(5),
            Self::Balanced => Duration::from_secs(3),
            Self::Performance => Duration::from_millis(1500),
        }
    }
}

/// Which host conditions pause the slideshow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceSettings {
    /// Pause while running on battery power.
    pub pause_on_battery: bool,

    /// Pause while a full-screen application is in the foreground.
    pub pause_on_fullscreen: bool,

    /// Pause while CPU usage is above `cpuThreshold`.
    pub pause_on_high_cpu: bool,

    /// Pause while the session is locked.
    pub pause_on_lock: bool,

    /// Pause when on battery and the charge drops below 20%.
    pub super_saving_mode: bool,

    /// CPU usage in percent above which `pauseOnHighCpu` applies.
    pub cpu_threshold: f32,

    /// Sampling cadence.
    pub performance_mode: PerformanceMode,

    /// Applications that never count as full-screen.
    ///
    /// Matched by the host against the foreground application name.
    pub excluded_apps: BTreeSet<String>,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            pause_on_battery: true,
            pause_on_fullscreen: true,
            pause_on_high_cpu: false,
            pause_on_lock: true,
            super_saving_mode: false,
            cpu_threshold: DEFAULT_CPU_THRESHOLD,
            performance_mode: PerformanceMode::default(),
            excluded_apps: BTreeSet::new(),
        }
    }
}
