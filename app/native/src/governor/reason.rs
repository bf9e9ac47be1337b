//! Pause reasons and their priority chain.

use std::fmt;

use serde::Serialize;

use super::settings::PerformanceSettings;
use super::signals::SignalSnapshot;
use crate::constants::LOW_BATTERY_PERCENT;

/// The single authoritative cause suppressing playback.
///
/// Variants after `None` are listed highest priority first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PauseReason {
    #[default]
    None,
    UserPaused,
    SystemLocked,
    OnBatteryLow,
    FullScreenApp,
    HighCpu,
    OnBattery,
    ScreenSleep,
}

impl PauseReason {
    #[must_use]
    pub const fn is_paused(self) -> bool { !matches!(self, Self::None) }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::None => "running",
            Self::UserPaused => "paused by user",
            Self::SystemLocked => "session locked",
            Self::OnBatteryLow => "battery low",
            Self::FullScreenApp => "full-screen application",
            Self::HighCpu => "high CPU usage",
            Self::OnBattery => "on battery power",
            Self::ScreenSleep => "display asleep",
        }
    }
}

impl fmt::Display for PauseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.description()) }
}

/// Resolves the highest-priority active reason. Checks whose toggle is off
/// are skipped.
#[must_use]
pub fn resolve(settings: &PerformanceSettings, signals: &SignalSnapshot) -> PauseReason {
    if signals.user_paused {
        PauseReason::UserPaused
    } else if settings.pause_on_lock && signals.session_locked {
        PauseReason::SystemLocked
    } else if settings.super_saving_mode
        && signals.on_battery
        && signals.battery_percent < LOW_BATTERY_PERCENT
    {
        PauseReason::OnBatteryLow
    } else if settings.pause_on_fullscreen && signals.foreground_fullscreen {
        PauseReason::FullScreenApp
    } else if settings.pause_on_high_cpu && signals.cpu_percent > settings.cpu_threshold {
        PauseReason::HighCpu
    } else if settings.pause_on_battery && signals.on_battery {
        PauseReason::OnBattery
    } else if signals.display_sleeping {
        PauseReason::ScreenSleep
    } else {
        PauseReason::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_active() -> SignalSnapshot {
        SignalSnapshot {
            user_paused: true,
            session_locked: true,
            on_battery: true,
            battery_percent: 10.0,
            foreground_fullscreen: true,
            cpu_percent: 99.0,
            display_sleeping: true,
        }
    }

    fn all_enabled() -> PerformanceSettings {
        PerformanceSettings {
            pause_on_battery: true,
            pause_on_fullscreen: true,
            pause_on_high_cpu: true,
            pause_on_lock: true,
            super_saving_mode: true,
            ..Default::default()
        }
    }

    fn quiet() -> SignalSnapshot { SignalSnapshot::default() }

    #[test]
    fn test_user_pause_overrides_everything() {
        assert_eq!(resolve(&all_enabled(), &all_active()), PauseReason::UserPaused);

        let nothing_enabled = PerformanceSettings {
            pause_on_battery: false,
            pause_on_fullscreen: false,
            pause_on_lock: false,
            ..Default::default()
        };
        assert_eq!(resolve(&nothing_enabled, &all_active()), PauseReason::UserPaused);
    }

    #[test]
    fn test_priority_chain_order() {
        let settings = all_enabled();
        let mut signals = all_active();
        let expected = [
            PauseReason::UserPaused,
            PauseReason::SystemLocked,
            PauseReason::OnBatteryLow,
            PauseReason::FullScreenApp,
            PauseReason::HighCpu,
            PauseReason::OnBattery,
            PauseReason::ScreenSleep,
            PauseReason::None,
        ];

        for reason in expected {
            assert_eq!(resolve(&settings, &signals), reason);
            match reason {
                PauseReason::UserPaused => signals.user_paused = false,
                PauseReason::SystemLocked => signals.session_locked = false,
                PauseReason::OnBatteryLow => signals.battery_percent = 80.0,
                PauseReason::FullScreenApp => signals.foreground_fullscreen = false,
                PauseReason::HighCpu => signals.cpu_percent = 10.0,
                PauseReason::OnBattery => signals.on_battery = false,
                PauseReason::ScreenSleep => signals.display_sleeping = false,
                PauseReason::None => {}
            }
        }
    }

    #[test]
    fn test_high_cpu_scenario() {
        let settings = PerformanceSettings {
            pause_on_high_cpu: true,
            cpu_threshold: 85.0,
            ..Default::default()
        };
        let signals = SignalSnapshot { cpu_percent: 90.0, ..quiet() };
        assert_eq!(resolve(&settings, &signals), PauseReason::HighCpu);
    }

    #[test]
    fn test_cpu_at_threshold_does_not_pause() {
        let settings = PerformanceSettings {
            pause_on_high_cpu: true,
            cpu_threshold: 85.0,
            ..Default::default()
        };
        let signals = SignalSnapshot { cpu_percent: 85.0, ..quiet() };
        assert_eq!(resolve(&settings, &signals), PauseReason::None);
    }

    #[test]
    fn test_disabled_toggles_are_skipped() {
        let settings = PerformanceSettings {
            pause_on_battery: false,
            pause_on_fullscreen: false,
            pause_on_high_cpu: false,
            pause_on_lock: false,
            super_saving_mode: false,
            ..Default::default()
        };
        let signals = SignalSnapshot { user_paused: false, display_sleeping: false, ..all_active() };
        assert_eq!(resolve(&settings, &signals), PauseReason::None);
    }

    #[test]
    fn test_low_battery_requires_super_saving() {
        let signals = SignalSnapshot {
            on_battery: true,
            battery_percent: 12.0,
            ..quiet()
        };

        let plain = PerformanceSettings::default();
        assert_eq!(resolve(&plain, &signals), PauseReason::OnBattery);

        let saving = PerformanceSettings { super_saving_mode: true, ..Default::default() };
        assert_eq!(resolve(&saving, &signals), PauseReason::OnBatteryLow);
    }

    #[test]
    fn test_screen_sleep_has_no_toggle() {
        let settings = PerformanceSettings {
            pause_on_battery: false,
            pause_on_fullscreen: false,
            pause_on_lock: false,
            ..Default::default()
        };
        let signals = SignalSnapshot { display_sleeping: true, ..quiet() };
        assert_eq!(resolve(&settings, &signals), PauseReason::ScreenSleep);
    }

    #[test]
    fn test_reason_serializes_kebab_case() {
        assert_eq!(serde_json::to_value(PauseReason::FullScreenApp).unwrap(), "full-screen-app");
        assert!(!PauseReason::None.is_paused());
        assert!(PauseReason::HighCpu.is_paused());
    }
}
