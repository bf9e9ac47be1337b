//! The `signals` command: samples the host once and shows what the governor
//! would decide.

use std::fmt::Display;

use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::cli::output;
use crate::config::LoadedConfig;
use crate::error::{BackdropError, SignalError};
use crate::governor::{SignalSnapshot, SystemSignalPort, resolve};
use crate::host::HostSignals;

/// Arguments of `backdrop signals`.
#[derive(Args, Debug, Clone, Default)]
pub struct SignalsArgs {
    /// Output as JSON.
    #[arg(long, short)]
    pub json: bool,
}

/// Execute `backdrop signals`.
///
/// # Errors
///
/// Never fails; unreadable signals are reported in the output.
pub fn execute(args: &SignalsArgs, loaded: &LoadedConfig) -> Result<(), BackdropError> {
    let signals = HostSignals::new();
    // CPU usage is a delta between two refreshes.
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    let settings = &loaded.config.performance;
    let readings = [
        ("onBattery", reading(signals.is_on_battery())),
        ("batteryPercent", reading(signals.battery_percent())),
        ("cpuPercent", reading(signals.cpu_percent())),
        ("foregroundFullscreen", reading(signals.is_foreground_fullscreen(&settings.excluded_apps))),
        ("sessionLocked", reading(signals.is_session_locked())),
        ("displaySleeping", reading(signals.is_display_sleeping())),
    ];
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    let reason = resolve(settings, &SignalSnapshot::sample(&signals, settings, false));

    if args.json {
        let mut signals = serde_json::Map::new();
        for (name, reading) in &readings {
            signals.insert((*name).to_string(), reading.json.clone());
        }
        let value = json!({
            "signals": signals,
            "reason": reason,
            "paused": reason.is_paused(),
        });
        output::print_highlighted_json(&value);
        return Ok(());
    }

    for (name, value) in &readings {
        println!("{:<22} {}", name.bold(), value.text);
    }
    let reason_text =
        if reason.is_paused() { reason.to_string().yellow() } else { reason.to_string().green() };
    println!("{:<22} {reason_text}", "reason".bold());
    Ok(())
}

/// One signal reading rendered for both output formats.
struct Reading {
    text: String,
    json: serde_json::Value,
}

fn reading<T: Display + serde::Serialize>(result: Result<T, SignalError>) -> Reading {
    match result {
        Ok(value) => Reading {
            text: value.to_string(),
            json: serde_json::to_value(&value).unwrap_or_default(),
        },
        Err(SignalError::Unsupported) => Reading {
            text: "unsupported".dimmed().to_string(),
            json: serde_json::Value::Null,
        },
        Err(SignalError::Unavailable(message)) => Reading {
            text: format!("{} ({message})", "unavailable".red()),
            json: json!({ "error": message }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_of_value() {
        let reading = reading::<bool>(Ok(true));
        assert_eq!(reading.text, "true");
        assert_eq!(reading.json, serde_json::Value::Bool(true));
    }

    #[test]
    fn test_reading_of_unsupported_signal_is_null() {
        let reading = reading::<bool>(Err(SignalError::Unsupported));
        assert!(reading.text.contains("unsupported"));
        assert!(reading.json.is_null());
    }

    #[test]
    fn test_reading_of_unavailable_signal_keeps_message() {
        let reading = reading::<f32>(Err(SignalError::Unavailable("no battery api".to_string())));
        assert!(reading.text.contains("no battery api"));
        assert_eq!(reading.json["error"], "no battery api");
    }
}
