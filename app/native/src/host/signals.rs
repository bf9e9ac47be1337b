//! System signals read from the local machine.
//!
//! CPU usage comes from `sysinfo` and power state from `starship-battery`.
//! Full-screen detection, session lock and display power have no portable
//! source and report [`SignalError::Unsupported`], which the governor reads as
//! "not active".

use parking_lot::Mutex;
use starship_battery::units::ratio::percent;
use starship_battery::{Battery, Manager, State};
use sysinfo::System;

use crate::error::SignalError;
use crate::governor::SystemSignalPort;

/// [`SystemSignalPort`] for the machine the process runs on.
pub struct HostSignals {
    system: Mutex<System>,
}

impl HostSignals {
    /// Creates the port and takes the first CPU measurement, so the next
    /// [`cpu_percent`](SystemSignalPort::cpu_percent) call has a baseline.
    #[must_use]
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self { system: Mutex::new(system) }
    }

    /// All batteries the host reports. Desktops have none.
    fn batteries() -> Result<Vec<Battery>, SignalError> {
        let manager = Manager::new().map_err(|err| SignalError::Unavailable(err.to_string()))?;
        let batteries =
            manager.batteries().map_err(|err| SignalError::Unavailable(err.to_string()))?;

        Ok(batteries
            .filter_map(|battery| {
                battery
                    .inspect_err(|err| tracing::debug!(error = %err, "skipping unreadable battery"))
                    .ok()
            })
            .collect())
    }
}

impl Default for HostSignals {
    fn default() -> Self { Self::new() }
}

impl SystemSignalPort for HostSignals {
    fn is_on_battery(&self) -> Result<bool, SignalError> {
        Ok(Self::batteries()?.iter().any(|battery| matches!(battery.state(), State::Discharging)))
    }

    fn battery_percent(&self) -> Result<f32, SignalError> {
        let batteries = Self::batteries()?;
        if batteries.is_empty() {
            return Ok(100.0);
        }

        #[allow(clippy::cast_precision_loss)]
        let count = batteries.len() as f32;
        let total: f32 =
            batteries.iter().map(|battery| battery.state_of_charge().get::<percent>()).sum();
        Ok(total / count)
    }

    fn cpu_percent(&self) -> Result<f32, SignalError> {
        let mut system = self.system.lock();
        system.refresh_cpu_usage();
        Ok(system.global_cpu_usage())
    }
}
