//! System-aware pause governor.
//!
//! The governor samples host signals at a cadence set by
//! [`PerformanceMode`], resolves them into one [`PauseReason`] and pauses or
//! resumes playback when that reason changes.

pub mod monitor;
pub mod reason;
pub mod settings;
pub mod signals;

pub use monitor::PerformanceGovernor;
pub use reason::{PauseReason, resolve};
pub use settings::{PerformanceMode, PerformanceSettings};
pub use signals::{SignalSnapshot, SystemSignalPort};

/// Something the governor can suspend and resume.
pub trait PauseTarget: Send + Sync {
    /// Halts advancement without discarding state. Repeated calls are no-ops.
    fn pause(&self);

    /// Undoes [`pause`](Self::pause).
    fn resume(&self);
}
