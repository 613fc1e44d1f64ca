//! Event sinks.
//!
//! The engine hands each emitted event to exactly one sink call and moves
//! on: sinks must not block, and the engine never retries delivery. What a
//! sink does with the event (display, storage, notification) is its own
//! business.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::types::EngineEvent;

/// Receives emitted engine events. Implementations must return promptly.
pub trait EventSink: Send {
    fn emit(&mut self, event: &EngineEvent);
}

impl EventSink for Box<dyn EventSink> {
    fn emit(&mut self, event: &EngineEvent) {
        (**self).emit(event);
    }
}

// ============================================================================
// Tracing Sink
// ============================================================================

/// Logs every event as a structured tracing line.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::PostureAlert { issue, .. } | EngineEvent::DistanceAlert { issue, .. } => {
                info!(kind = event.kind(), %issue, t = event.timestamp_ms(), "Alert");
            }
            EngineEvent::PersonLost { timestamp_ms } => {
                info!(kind = "person_lost", t = timestamp_ms, "Person left the frame");
            }
            EngineEvent::CoachReminder { reminder, .. } => {
                info!(
                    kind = "coach_reminder",
                    primary = %reminder.primary,
                    top_bad = reminder.top_bad.map(|i| i.to_string()),
                    bad_ms = reminder.bad_ms,
                    good_ms = reminder.good_ms,
                    t = event.timestamp_ms(),
                    "Coaching reminder"
                );
            }
        }
    }
}

// ============================================================================
// JSONL Writer Sink
// ============================================================================

/// Event serialized for external consumers, stamped with wall-clock time at
/// the emission boundary (the engine itself only knows monotonic time).
#[derive(Serialize)]
struct EmittedEvent<'a> {
    wall_time: DateTime<Utc>,
    #[serde(flatten)]
    event: &'a EngineEvent,
}

/// Writes each event as one JSON line to a writer (typically stdout).
///
/// Write failures are logged and dropped — a broken pipe must not stall the
/// tick loop.
pub struct JsonlWriterSink<W: std::io::Write + Send> {
    out: W,
}

impl<W: std::io::Write + Send> JsonlWriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl JsonlWriterSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: std::io::Write + Send> EventSink for JsonlWriterSink<W> {
    fn emit(&mut self, event: &EngineEvent) {
        let emitted = EmittedEvent {
            wall_time: Utc::now(),
            event,
        };
        match serde_json::to_string(&emitted) {
            Ok(line) => {
                if let Err(e) = writeln!(self.out, "{line}") {
                    warn!(error = %e, "Failed to write event line");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize event"),
        }
    }
}

// ============================================================================
// Channel Sink
// ============================================================================

/// Forwards events into a bounded channel without ever blocking the tick
/// loop: when the receiver lags and the channel fills, the event is dropped
/// with a warning.
pub struct ChannelSink {
    tx: tokio::sync::mpsc::Sender<EngineEvent>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: tokio::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Events dropped due to a full or closed channel.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: &EngineEvent) {
        if let Err(e) = self.tx.try_send(event.clone()) {
            self.dropped += 1;
            warn!(kind = event.kind(), error = %e, dropped = self.dropped, "Event dropped");
        }
    }
}

// ============================================================================
// Collecting Sink
// ============================================================================

/// Collects events into memory. Used by tests and short replays.
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<EngineEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }
}

// ============================================================================
// Tests
// ============================================================================
