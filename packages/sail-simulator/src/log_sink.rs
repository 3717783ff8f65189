//! log_sink.rs — Destinations for simulation log events
//!
//! Sinks receive events in production order and own all formatting. A sink
//! that fails to write logs a warning and carries on: the simulation never
//! stops because of its log.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use sail_types::LogEvent;
use tracing::{debug, info, warn};

pub trait LogSink: Send + Sync {
    fn record(&mut self, event: &LogEvent);

    /// Drop everything recorded so far, where the sink can.
    fn clear(&mut self) {}
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn record(&mut self, event: &LogEvent) {
        (**self).record(event)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

// ── In-memory log ─────────────────────────────────────────────────────────────

/// Shared in-memory log. Clones see the same events, so a host can keep one
/// handle while the simulation writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemoryLog {
    fn record(&mut self, event: &LogEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event.clone());
    }

    fn clear(&mut self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

// ── Filter ────────────────────────────────────────────────────────────────────

/// Passes only major events (flow shifts, MAJOR turns, roundings) to `S`.
#[derive(Debug, Clone)]
pub struct MajorOnly<S>(pub S);

impl<S: LogSink> LogSink for MajorOnly<S> {
    fn record(&mut self, event: &LogEvent) {
        if event.is_major() {
            self.0.record(event);
        }
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

// ── tracing ───────────────────────────────────────────────────────────────────

/// Emits events through `tracing`: major ones at info, the rest at debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&mut self, event: &LogEvent) {
        match event {
            LogEvent::BoatPosition { second, boat, location, heading } => {
                debug!("t={second} {boat} at {location} heading {heading}");
            }
            LogEvent::Decision { second, boat, decision, reason } if event.is_major() => {
                info!("⛵ t={second} {boat}: {decision} ({reason})");
            }
            LogEvent::Decision { second, boat, decision, reason } => {
                debug!("t={second} {boat}: {decision} ({reason})");
            }
            LogEvent::FlowShift { second, field, mean_direction } => {
                info!("🌬  t={second} {field} mean now {mean_direction}");
            }
        }
    }
}

// ── JSON lines ────────────────────────────────────────────────────────────────

/// One JSON object per line on any writer.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write + Send + Sync> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + Sync> LogSink for JsonLinesSink<W> {
    fn record(&mut self, event: &LogEvent) {
        let line = match serde_json::to_string(event) {
            Ok(l) => l,
            Err(e) => {
                warn!("log: serialize failed: {e}");
                return;
            }
        };
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("log: write failed: {e}");
        }
    }
}
