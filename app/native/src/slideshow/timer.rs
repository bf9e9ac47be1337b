//! Single-shot interval timer driven by commands.
//!
//! The timer runs as its own tokio task. It fires at most once per arm: on
//! expiry it disarms itself, runs the callback on a blocking worker and waits
//! for it to return before looking at further commands. A callback that wants
//! another tick re-arms the timer through its [`TimerHandle`], so two ticks can
//! never overlap.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::constants::DEFAULT_INTERVAL;

/// Commands accepted by the timer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Schedule the next fire one period from now.
    Arm,
    /// Cancel any pending fire.
    Disarm,
    /// Restart the elapsed time if armed.
    Reset,
    /// Change the period. A pending fire is rescheduled one new period from now.
    SetPeriod(Duration),
}

/// Sending half of the timer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    sender: mpsc::UnboundedSender<TimerCommand>,
}

impl TimerHandle {
    /// Creates a handle and the receiver to pass to [`run_interval_timer`].
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerCommand>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    pub fn arm(&self) { self.send(TimerCommand::Arm); }

    pub fn disarm(&self) { self.send(TimerCommand::Disarm); }

    pub fn reset(&self) { self.send(TimerCommand::Reset); }

    pub fn set_period(&self, period: Duration) { self.send(TimerCommand::SetPeriod(period)); }

    fn send(&self, command: TimerCommand) {
        if self.sender.send(command).is_err() {
            tracing::trace!(?command, "timer task is gone, command dropped");
        }
    }
}

/// Runs the timer until every [`TimerHandle`] has been dropped.
pub async fn run_interval_timer<F>(mut receiver: mpsc::UnboundedReceiver<TimerCommand>, on_fire: F)
where F: Fn() + Send + Sync + 'static {
    let on_fire = Arc::new(on_fire);
    let mut period = DEFAULT_INTERVAL;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = receiver.recv() => {
                let Some(command) = command else { break };
                match command {
                    TimerCommand::Arm => deadline = Some(Instant::now() + period),
                    TimerCommand::Disarm => deadline = None,
                    TimerCommand::Reset => {
                        if deadline.is_some() {
                            deadline = Some(Instant::now() + period);
                        }
                    }
                    TimerCommand::SetPeriod(new_period) => {
                        period = new_period;
                        if deadline.is_some() {
                            deadline = Some(Instant::now() + period);
                        }
                    }
                }
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                let callback = Arc::clone(&on_fire);
                if let Err(err) = tokio::task::spawn_blocking(move || callback()).await {
                    tracing::error!(error = %err, "slideshow tick panicked");
                }
            }
        }
    }

    tracing::debug!("interval timer stopped");
}
