//! The monitoring loop that turns host signals into pause/resume calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};

use super::PauseTarget;
use super::reason::{PauseReason, resolve};
use super::settings::PerformanceSettings;
use super::signals::{SignalSnapshot, SystemSignalPort};
use crate::events::{self, BackdropEvent};

/// Polls a [`SystemSignalPort`] and pauses or resumes a [`PauseTarget`]
/// whenever the resolved [`PauseReason`] changes.
///
/// Sampling, resolving and applying run as one step under the governor's
/// `evaluation` lock, so a sample always resolves against the settings and
/// user pause it was taken with, and the newest change wins. The playback
/// lock is never held while sampling; the target never calls back, so the
/// lock order is always governor then playback.
pub struct PerformanceGovernor {
    signals: Arc<dyn SystemSignalPort>,
    target: Arc<dyn PauseTarget>,
    events: broadcast::Sender<BackdropEvent>,
    settings: Mutex<PerformanceSettings>,
    user_paused: AtomicBool,
    last_reason: Mutex<PauseReason>,
    evaluation: Mutex<()>,
    wake: Notify,
    shutdown: AtomicBool,
}

impl PerformanceGovernor {
    #[must_use]
    pub fn new(
        signals: Arc<dyn SystemSignalPort>,
        target: Arc<dyn PauseTarget>,
        settings: PerformanceSettings,
        events: broadcast::Sender<BackdropEvent>,
    ) -> Self {
        Self {
            signals,
            target,
            events,
            settings: Mutex::new(settings),
            user_paused: AtomicBool::new(false),
            last_reason: Mutex::new(PauseReason::None),
            evaluation: Mutex::new(()),
            wake: Notify::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    /// The last reason broadcast to subscribers.
    #[must_use]
    pub fn current_reason(&self) -> PauseReason { *self.last_reason.lock() }

    #[must_use]
    pub fn settings(&self) -> PerformanceSettings { self.settings.lock().clone() }

    #[must_use]
    pub fn is_user_paused(&self) -> bool { self.user_paused.load(Ordering::SeqCst) }

    /// Samples the host and applies the resolved reason.
    pub fn evaluate(&self) -> PauseReason {
        let _evaluation = self.evaluation.lock();
        self.sample_and_apply()
    }

    /// Sets or clears the user pause.
    ///
    /// Pausing takes effect at once without sampling. Clearing re-samples
    /// first, so a still-active host reason replaces `UserPaused` directly
    /// instead of resuming in between.
    pub fn set_user_pause(&self, paused: bool) -> PauseReason {
        let _evaluation = self.evaluation.lock();
        self.user_paused.store(paused, Ordering::SeqCst);
        tracing::debug!(paused, "user pause toggled");

        if paused {
            let settings = self.settings();
            self.apply(&settings, &SignalSnapshot { user_paused: true, ..Default::default() })
        } else {
            self.sample_and_apply()
        }
    }

    /// Replaces the settings, adopts the new cadence and re-evaluates.
    pub fn update_settings(&self, settings: PerformanceSettings) -> PauseReason {
        let _evaluation = self.evaluation.lock();
        *self.settings.lock() = settings;
        self.wake.notify_one();
        self.sample_and_apply()
    }

    /// Makes [`run`](Self::run) return after its current iteration.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Runs the monitoring loop until [`shutdown`](Self::shutdown).
    ///
    /// Each sample runs on a blocking worker since host queries can be slow.
    pub async fn run(self: Arc<Self>) {
        tracing::debug!("performance governor started");

        while !self.shutdown.load(Ordering::SeqCst) {
            let governor = Arc::clone(&self);
            if let Err(err) = tokio::task::spawn_blocking(move || governor.evaluate()).await {
                tracing::error!(error = %err, "governor evaluation panicked");
            }

            let interval = self.settings.lock().performance_mode.poll_interval();
            tokio::select! {
                () = tokio::time::sleep(interval) => {}
                () = self.wake.notified() => {}
            }
        }

        tracing::debug!("performance governor stopped");
    }

    /// Caller holds `evaluation`.
    fn sample_and_apply(&self) -> PauseReason {
        let settings = self.settings();
        let snapshot =
            SignalSnapshot::sample(self.signals.as_ref(), &settings, self.is_user_paused());
        self.apply(&settings, &snapshot)
    }

    fn apply(&self, settings: &PerformanceSettings, snapshot: &SignalSnapshot) -> PauseReason {
        let reason = resolve(settings, snapshot);
        let mut last = self.last_reason.lock();
        if *last == reason {
            return reason;
        }

        let previous = std::mem::replace(&mut *last, reason);
        tracing::info!(from = %previous, to = %reason, "pause state changed");
        events::emit(&self.events, BackdropEvent::PauseStateChanged { reason });

        if reason.is_paused() {
            self.target.pause();
        } else {
            self.target.resume();
        }
        reason
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::error::SignalError;
    use crate::governor::PerformanceMode;

    // ========================================================================
    // Test Doubles
    // ========================================================================

    /// Parks the first host query until released.
    struct Gate {
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
    }

    #[derive(Default)]
    struct FakeHost {
        on_battery: AtomicBool,
        cpu: Mutex<f32>,
        samples: AtomicUsize,
        gate: Mutex<Option<Gate>>,
    }

    impl FakeHost {
        /// Returns the "query entered" receiver and the release sender.
        fn hold_next_query(&self) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
            let (entered, entered_rx) = mpsc::channel();
            let (release_tx, release) = mpsc::channel();
            *self.gate.lock() = Some(Gate { entered, release });
            (entered_rx, release_tx)
        }

        fn pass_gate(&self) {
            let gate = self.gate.lock().take();
            if let Some(gate) = gate {
                gate.entered.send(()).unwrap();
                gate.release.recv().unwrap();
            }
        }
    }

    impl SystemSignalPort for FakeHost {
        fn is_on_battery(&self) -> Result<bool, SignalError> {
            self.pass_gate();
            Ok(self.on_battery.load(Ordering::SeqCst))
        }

        fn battery_percent(&self) -> Result<f32, SignalError> { Ok(80.0) }

        fn cpu_percent(&self) -> Result<f32, SignalError> {
            self.samples.fetch_add(1, Ordering::SeqCst);
            self.pass_gate();
            Ok(*self.cpu.lock())
        }
    }

    #[derive(Default)]
    struct RecordingTarget {
        calls: Mutex<Vec<&'static str>>,
    }

    impl PauseTarget for RecordingTarget {
        fn pause(&self) { self.calls.lock().push("pause"); }

        fn resume(&self) { self.calls.lock().push("resume"); }
    }

    struct Fixture {
        governor: Arc<PerformanceGovernor>,
        host: Arc<FakeHost>,
        target: Arc<RecordingTarget>,
        events: broadcast::Receiver<BackdropEvent>,
    }

    impl Fixture {
        fn new(settings: PerformanceSettings) -> Self {
            let host = Arc::new(FakeHost::default());
            let target = Arc::new(RecordingTarget::default());
            let sender = events::channel();
            let events = sender.subscribe();
            let governor = Arc::new(PerformanceGovernor::new(
                Arc::clone(&host) as Arc<dyn SystemSignalPort>,
                Arc::clone(&target) as Arc<dyn PauseTarget>,
                settings,
                sender,
            ));
            Self { governor, host, target, events }
        }

        fn calls(&self) -> Vec<&'static str> { self.target.calls.lock().clone() }

        fn reasons(&mut self) -> Vec<PauseReason> {
            std::iter::from_fn(|| self.events.try_recv().ok())
                .filter_map(|event| match event {
                    BackdropEvent::PauseStateChanged { reason } => Some(reason),
                    _ => None,
                })
                .collect()
        }
    }

    fn cpu_watch() -> PerformanceSettings {
        PerformanceSettings {
            pause_on_high_cpu: true,
            cpu_threshold: 85.0,
            ..Default::default()
        }
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    #[test]
    fn test_quiet_host_stays_running() {
        let mut fixture = Fixture::new(cpu_watch());
        assert_eq!(fixture.governor.evaluate(), PauseReason::None);
        assert!(fixture.calls().is_empty());
        assert!(fixture.reasons().is_empty());
    }

    #[test]
    fn test_reason_change_pauses_once() {
        let mut fixture = Fixture::new(cpu_watch());
        *fixture.host.cpu.lock() = 90.0;

        assert_eq!(fixture.governor.evaluate(), PauseReason::HighCpu);
        assert_eq!(fixture.governor.evaluate(), PauseReason::HighCpu);

        assert_eq!(fixture.calls(), vec!["pause"]);
        assert_eq!(fixture.reasons(), vec![PauseReason::HighCpu]);
        assert_eq!(fixture.governor.current_reason(), PauseReason::HighCpu);
    }

    #[test]
    fn test_switching_between_reasons_pauses_again() {
        let mut fixture = Fixture::new(cpu_watch());
        *fixture.host.cpu.lock() = 90.0;
        fixture.governor.evaluate();

        *fixture.host.cpu.lock() = 10.0;
        fixture.host.on_battery.store(true, Ordering::SeqCst);
        assert_eq!(fixture.governor.evaluate(), PauseReason::OnBattery);

        assert_eq!(fixture.calls(), vec!["pause", "pause"]);
        assert_eq!(fixture.reasons(), vec![PauseReason::HighCpu, PauseReason::OnBattery]);
    }

    #[test]
    fn test_cleared_reason_resumes() {
        let mut fixture = Fixture::new(cpu_watch());
        *fixture.host.cpu.lock() = 90.0;
        fixture.governor.evaluate();
        *fixture.host.cpu.lock() = 20.0;

        assert_eq!(fixture.governor.evaluate(), PauseReason::None);
        assert_eq!(fixture.calls(), vec!["pause", "resume"]);
        assert_eq!(fixture.reasons(), vec![PauseReason::HighCpu, PauseReason::None]);
    }

    // ========================================================================
    // User Pause
    // ========================================================================

    #[test]
    fn test_user_pause_applies_without_sampling() {
        let fixture = Fixture::new(cpu_watch());

        assert_eq!(fixture.governor.set_user_pause(true), PauseReason::UserPaused);
        assert_eq!(fixture.host.samples.load(Ordering::SeqCst), 0);
        assert_eq!(fixture.calls(), vec!["pause"]);
    }

    #[test]
    fn test_user_pause_hides_other_reasons() {
        let fixture = Fixture::new(cpu_watch());
        fixture.governor.set_user_pause(true);
        *fixture.host.cpu.lock() = 99.0;

        assert_eq!(fixture.governor.evaluate(), PauseReason::UserPaused);
    }

    #[test]
    fn test_clearing_user_pause_detects_remaining_reason() {
        let mut fixture = Fixture::new(cpu_watch());
        fixture.governor.set_user_pause(true);
        *fixture.host.cpu.lock() = 95.0;

        assert_eq!(fixture.governor.set_user_pause(false), PauseReason::HighCpu);
        assert_eq!(fixture.calls(), vec!["pause", "pause"], "never resumed in between");
        assert_eq!(fixture.reasons(), vec![PauseReason::UserPaused, PauseReason::HighCpu]);
    }

    #[test]
    fn test_clearing_user_pause_resumes() {
        let fixture = Fixture::new(cpu_watch());
        fixture.governor.set_user_pause(true);

        assert_eq!(fixture.governor.set_user_pause(false), PauseReason::None);
        assert_eq!(fixture.calls(), vec!["pause", "resume"]);
    }

    // ========================================================================
    // Settings
    // ========================================================================

    #[test]
    fn test_update_settings_reevaluates() {
        let fixture = Fixture::new(cpu_watch());
        *fixture.host.cpu.lock() = 90.0;
        fixture.governor.evaluate();

        let relaxed = PerformanceSettings { pause_on_high_cpu: false, ..cpu_watch() };
        assert_eq!(fixture.governor.update_settings(relaxed), PauseReason::None);
        assert_eq!(fixture.calls(), vec!["pause", "resume"]);
        assert!(!fixture.governor.settings().pause_on_high_cpu);
    }

    // ========================================================================
    // Concurrent Evaluation
    // ========================================================================

    #[test]
    fn test_poll_waits_for_clearing_user_pause() {
        let mut fixture = Fixture::new(cpu_watch());
        fixture.governor.set_user_pause(true);
        *fixture.host.cpu.lock() = 95.0;
        let (entered, release) = fixture.host.hold_next_query();

        let governor = Arc::clone(&fixture.governor);
        let user = thread::spawn(move || governor.set_user_pause(false));
        entered.recv().unwrap();

        let governor = Arc::clone(&fixture.governor);
        let poll = thread::spawn(move || governor.evaluate());
        thread::sleep(Duration::from_millis(50));
        assert!(!poll.is_finished(), "poll ran while the user change was sampling");

        release.send(()).unwrap();
        assert_eq!(user.join().unwrap(), PauseReason::HighCpu);
        assert_eq!(poll.join().unwrap(), PauseReason::HighCpu);

        assert_eq!(fixture.governor.current_reason(), PauseReason::HighCpu);
        assert_eq!(fixture.calls(), vec!["pause", "pause"], "never resumed in between");
        assert_eq!(fixture.reasons(), vec![PauseReason::UserPaused, PauseReason::HighCpu]);
    }

    #[test]
    fn test_user_pause_waits_for_running_poll() {
        let mut fixture = Fixture::new(cpu_watch());
        *fixture.host.cpu.lock() = 95.0;
        let (entered, release) = fixture.host.hold_next_query();

        let governor = Arc::clone(&fixture.governor);
        let poll = thread::spawn(move || governor.evaluate());
        entered.recv().unwrap();

        let governor = Arc::clone(&fixture.governor);
        let user = thread::spawn(move || governor.set_user_pause(true));
        thread::sleep(Duration::from_millis(50));
        assert!(!user.is_finished(), "user pause applied during a poll");

        release.send(()).unwrap();
        assert_eq!(poll.join().unwrap(), PauseReason::HighCpu);
        assert_eq!(user.join().unwrap(), PauseReason::UserPaused);

        assert_eq!(fixture.governor.current_reason(), PauseReason::UserPaused);
        assert_eq!(fixture.reasons(), vec![PauseReason::HighCpu, PauseReason::UserPaused]);
    }

    #[test]
    fn test_poll_sampled_before_settings_update_does_not_repause() {
        let mut fixture = Fixture::new(PerformanceSettings::default());
        fixture.host.on_battery.store(true, Ordering::SeqCst);
        assert_eq!(fixture.governor.evaluate(), PauseReason::OnBattery);
        let (entered, release) = fixture.host.hold_next_query();

        let governor = Arc::clone(&fixture.governor);
        let poll = thread::spawn(move || governor.evaluate());
        entered.recv().unwrap();

        let governor = Arc::clone(&fixture.governor);
        let relaxed = PerformanceSettings { pause_on_battery: false, ..Default::default() };
        let update = thread::spawn(move || governor.update_settings(relaxed));
        thread::sleep(Duration::from_millis(50));
        assert!(!update.is_finished(), "settings applied during a poll");

        release.send(()).unwrap();
        assert_eq!(poll.join().unwrap(), PauseReason::OnBattery);
        assert_eq!(update.join().unwrap(), PauseReason::None);

        assert_eq!(fixture.governor.current_reason(), PauseReason::None);
        assert_eq!(fixture.calls(), vec!["pause", "resume"]);
        assert_eq!(fixture.reasons(), vec![PauseReason::OnBattery, PauseReason::None]);

        // The next poll keeps the newest settings.
        assert_eq!(fixture.governor.evaluate(), PauseReason::None);
        assert_eq!(fixture.calls(), vec!["pause", "resume"]);
    }

    // ========================================================================
    // Monitoring Loop
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_at_mode_cadence() {
        let fixture = Fixture::new(PerformanceSettings {
            performance_mode: PerformanceMode::PowerSave,
            ..cpu_watch()
        });
        let handle = tokio::spawn(Arc::clone(&fixture.governor).run());

        tokio::time::sleep(Duration::from_secs(12)).await;
        let samples = fixture.host.samples.load(Ordering::SeqCst);
        assert!((2..=4).contains(&samples), "expected about 3 samples in 12s, got {samples}");

        fixture.governor.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_pauses_when_host_gets_busy() {
        let fixture = Fixture::new(cpu_watch());
        let handle = tokio::spawn(Arc::clone(&fixture.governor).run());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(fixture.calls().is_empty());

        *fixture.host.cpu.lock() = 97.0;
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fixture.governor.current_reason(), PauseReason::HighCpu);
        assert_eq!(fixture.calls(), vec!["pause"]);

        fixture.governor.shutdown();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_settings_wakes_loop() {
        let fixture = Fixture::new(PerformanceSettings {
            performance_mode: PerformanceMode::PowerSave,
            ..cpu_watch()
        });
        let handle = tokio::spawn(Arc::clone(&fixture.governor).run());
        tokio::time::sleep(Duration::from_millis(100)).await;

        fixture.governor.update_settings(PerformanceSettings {
            performance_mode: PerformanceMode::Performance,
            ..cpu_watch()
        });
        let before = fixture.host.samples.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(3100)).await;
        let polled = fixture.host.samples.load(Ordering::SeqCst) - before;

        assert!(polled >= 2, "faster cadence should poll at least twice in 3s, got {polled}");

        fixture.governor.shutdown();
        handle.await.unwrap();
    }
}
