//! clock.rs — Cooperative driver for a simulation session
//!
//! Every period (`seconds_per_display / speedup` wall-clock seconds) the clock
//! runs one batch of `seconds_per_display` simulated seconds on the session,
//! then publishes the simulated second reached. Batches run to completion:
//! `stop()` takes effect at the next batch boundary.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SimulationSettings;
use crate::error::ConfigError;
use crate::simulation::Simulation;

pub type SharedSession = Arc<RwLock<Simulation>>;

/// What the clock does after a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Stop,
    /// Keep ticking from wherever the failed batch left the session.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockStatus {
    Running,
    Stopped,
    /// First batch failure, as reported. Terminal under `ErrorPolicy::Stop`.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    pub seconds_per_display: u32,
    pub speedup: f64,
    pub error_policy: ErrorPolicy,
}

impl ClockConfig {
    pub fn from_settings(settings: &SimulationSettings) -> Self {
        Self {
            seconds_per_display: settings.seconds_per_display,
            speedup: settings.speedup,
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_speedup(mut self, speedup: f64) -> Self {
        self.speedup = speedup;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Wall-clock time between batches.
    pub fn period(&self) -> Result<Duration, ConfigError> {
        if self.seconds_per_display == 0 {
            return Err(ConfigError::InvalidClock { reason: "seconds_per_display must be at least 1".into() });
        }
        if !(self.speedup.is_finite() && self.speedup > 0.0) {
            return Err(ConfigError::InvalidClock { reason: format!("speedup {} must be positive", self.speedup) });
        }
        match Duration::try_from_secs_f64(f64::from(self.seconds_per_display) / self.speedup) {
            Ok(p) if !p.is_zero() => Ok(p),
            _ => Err(ConfigError::InvalidClock {
                reason: format!("speedup {} gives no usable tick period", self.speedup),
            }),
        }
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

struct Running {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct SimulationClock {
    session: SharedSession,
    config: ClockConfig,
    period: Duration,
    elapsed: Arc<watch::Sender<u64>>,
    status: Arc<watch::Sender<ClockStatus>>,
    running: Option<Running>,
}

impl SimulationClock {
    pub fn new(session: Simulation, config: ClockConfig) -> Result<Self, ConfigError> {
        let period = config.period()?;
        let (elapsed, _) = watch::channel(session.second());
        let (status, _) = watch::channel(ClockStatus::Stopped);
        Ok(Self {
            session: Arc::new(RwLock::new(session)),
            config,
            period,
            elapsed: Arc::new(elapsed),
            status: Arc::new(status),
            running: None,
        })
    }

    pub fn session(&self) -> SharedSession {
        self.session.clone()
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Simulated seconds reached, updated after every batch.
    pub fn elapsed(&self) -> watch::Receiver<u64> {
        self.elapsed.subscribe()
    }

    pub fn status(&self) -> watch::Receiver<ClockStatus> {
        self.status.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.task.is_finished())
    }

    /// Begin ticking. Must be called inside a tokio runtime. No-op while
    /// already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let (stop, stop_rx) = watch::channel(false);
        let ticker = Ticker {
            session: self.session.clone(),
            seconds: self.config.seconds_per_display,
            period: self.period,
            policy: self.config.error_policy,
            elapsed: self.elapsed.clone(),
            status: self.status.clone(),
        };
        info!(
            "▶ Clock started: {}s per batch every {:?} ({}× real time)",
            self.config.seconds_per_display, self.period, self.config.speedup
        );
        self.running = Some(Running { stop, task: tokio::spawn(ticker.run(stop_rx)) });
    }

    /// Stop at the next batch boundary, waiting for an in-flight batch.
    pub async fn stop(&mut self) {
        let Some(Running { stop, task }) = self.running.take() else {
            return;
        };
        let _ = stop.send(true);
        if let Err(e) = task.await {
            warn!("clock task ended abnormally: {e}");
        }
        self.status.send_if_modified(|s| {
            if *s == ClockStatus::Running {
                *s = ClockStatus::Stopped;
                true
            } else {
                false
            }
        });
        info!("⏸ Clock stopped at t={}", *self.elapsed.borrow());
    }

    /// Stop, then put boats and flows back to the scenario start and clear the log.
    pub async fn reset(&mut self) {
        self.stop().await;
        self.session.write().await.reset();
        self.elapsed.send_replace(0);
        self.status.send_replace(ClockStatus::Stopped);
        info!("↺ Clock reset");
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

struct Ticker {
    session: SharedSession,
    seconds: u32,
    period: Duration,
    policy: ErrorPolicy,
    elapsed: Arc<watch::Sender<u64>>,
    status: Arc<watch::Sender<ClockStatus>>,
}

impl Ticker {
    async fn run(self, mut stop: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.status.send_replace(ClockStatus::Running);
        let mut reported = false;

        loop {
            tokio::select! {
                _ = stop.changed() => break,
                _ = ticker.tick() => {}
            }

            let (outcome, second) = {
                let mut session = self.session.write().await;
                let outcome = session.run_batch(self.seconds);
                (outcome, session.second())
            };
            self.elapsed.send_replace(second);

            let Err(e) = outcome else {
                continue;
            };
            if reported {
                debug!("batch failed again at t={second}: {e}");
                continue;
            }
            warn!("⚠ batch failed at t={second}: {e}");
            self.status.send_replace(ClockStatus::Failed(e.to_string()));
            reported = true;
            if self.policy == ErrorPolicy::Stop {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::MemoryLog;
    use crate::scenarios;

    const LIMIT: Duration = Duration::from_secs(10);

    fn fast() -> ClockConfig {
        ClockConfig { seconds_per_display: 10, speedup: 1000.0, error_policy: ErrorPolicy::Stop }
    }

    fn session(log: &MemoryLog) -> Simulation {
        Simulation::new(scenarios::preset("windward-leeward").unwrap(), Box::new(log.clone()))
    }

    /// A session whose first boat is past the end of the course.
    fn broken(log: &MemoryLog) -> Simulation {
        let mut scenario = scenarios::preset("windward-leeward").unwrap();
        scenario.boats[0].leg = 5;
        Simulation::new(scenario, Box::new(log.clone()))
    }

    #[test]
    fn period_from_speedup() {
        let cfg = ClockConfig { seconds_per_display: 5, speedup: 2.0, error_policy: ErrorPolicy::Stop };
        assert_eq!(cfg.period().unwrap(), Duration::from_millis(2500));
        let stalled = ClockConfig { speedup: 0.0, ..cfg.clone() };
        assert!(matches!(stalled.period(), Err(ConfigError::InvalidClock { .. })));
        let empty = ClockConfig { seconds_per_display: 0, ..cfg };
        assert!(matches!(empty.period(), Err(ConfigError::InvalidClock { .. })));
    }

    #[tokio::test]
    async fn runs_whole_batches_until_stopped() {
        let log = MemoryLog::new();
        let mut clock = SimulationClock::new(session(&log), fast()).unwrap();
        let mut elapsed = clock.elapsed();
        clock.start();
        assert!(clock.is_running());
        tokio::time::timeout(LIMIT, elapsed.wait_for(|s| *s >= 30)).await.unwrap().unwrap();
        clock.stop().await;

        assert!(!clock.is_running());
        assert_eq!(*clock.status().borrow(), ClockStatus::Stopped);
        let reached = *clock.elapsed().borrow();
        assert_eq!(reached % 10, 0);
        assert_eq!(clock.session().read().await.second(), reached);
    }

    #[tokio::test]
    async fn reset_rewinds_session_and_log() {
        let log = MemoryLog::new();
        let mut clock = SimulationClock::new(session(&log), fast()).unwrap();
        let mut elapsed = clock.elapsed();
        clock.start();
        tokio::time::timeout(LIMIT, elapsed.wait_for(|s| *s >= 10)).await.unwrap().unwrap();
        clock.reset().await;

        assert_eq!(*clock.elapsed().borrow(), 0);
        assert_eq!(clock.session().read().await.second(), 0);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn failure_stops_the_clock_by_default() {
        let log = MemoryLog::new();
        let mut clock = SimulationClock::new(broken(&log), fast()).unwrap();
        let mut status = clock.status();
        clock.start();
        let failed = tokio::time::timeout(LIMIT, status.wait_for(|s| matches!(s, ClockStatus::Failed(_))))
            .await
            .unwrap()
            .unwrap()
            .clone();
        let ClockStatus::Failed(message) = failed else { unreachable!() };
        assert!(message.contains("Laser 1"), "{message}");

        clock.stop().await;
        assert!(matches!(*clock.status().borrow(), ClockStatus::Failed(_)));
        // the batch aborted in its first second
        assert_eq!(*clock.elapsed().borrow(), 1);
    }

    #[tokio::test]
    async fn continue_policy_keeps_ticking() {
        let log = MemoryLog::new();
        let cfg = fast().with_error_policy(ErrorPolicy::Continue);
        let mut clock = SimulationClock::new(broken(&log), cfg).unwrap();
        let mut elapsed = clock.elapsed();
        clock.start();
        tokio::time::timeout(LIMIT, elapsed.wait_for(|s| *s >= 3)).await.unwrap().unwrap();
        assert!(clock.is_running());
        assert!(matches!(*clock.status().borrow(), ClockStatus::Failed(_)));
        clock.stop().await;
    }
}
