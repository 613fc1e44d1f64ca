//! Engine Controller — lifecycle and the capped tick loop.
//!
//! The controller owns every piece of pipeline state and is the single
//! logical thread of execution: there is never more than one in-flight tick,
//! so nothing here needs a lock. `pause()` and `stop()` take effect at tick
//! boundaries, never mid-tick.
//!
//! Embedding applications either drive [`EngineController::tick`] themselves
//! (alternating commands and ticks, fully cooperative) or hand the loop to
//! [`EngineController::run`], which ticks at the capped rate until
//! cancellation or end of input. Frames arriving faster than the cap are
//! dropped, never queued: the interval uses skip-missed-tick behavior and
//! the source is only pulled once per tick.

use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::clock::{Clock, MonotonicClock};
use super::sink::EventSink;
use super::source::{FrameEvent, LandmarkSource, SourceProvider};
use super::state::{EngineState, EngineStats, EngineStatus};
use crate::config::EngineConfig;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum EngineError {
    /// Source acquisition failed at `start()`. The engine remains idle.
    #[error("landmark source unavailable: {0}")]
    SourceUnavailable(#[source] anyhow::Error),

    /// An operation was invoked from a status that does not allow it.
    #[error("engine is {status}, cannot {op}")]
    InvalidTransition {
        status: EngineStatus,
        op: &'static str,
    },
}

/// Result of one driven tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame (or absence) was processed; `events` were emitted.
    Processed { events: usize },
    /// The engine is paused; nothing was pulled or processed.
    Paused,
    /// The source is exhausted.
    Eof,
}

// ============================================================================
// Controller
// ============================================================================

/// Orchestrates the per-tick pipeline and owns its lifecycle.
pub struct EngineController<P: SourceProvider, K: EventSink, C: Clock = MonotonicClock> {
    config: EngineConfig,
    provider: P,
    sink: K,
    clock: C,
    status: EngineStatus,
    state: EngineState,
    source: Option<Box<dyn LandmarkSource>>,
}

impl<P: SourceProvider, K: EventSink> EngineController<P, K, MonotonicClock> {
    pub fn new(config: EngineConfig, provider: P, sink: K) -> Self {
        Self::with_clock(config, provider, sink, MonotonicClock::new())
    }
}

impl<P: SourceProvider, K: EventSink, C: Clock> EngineController<P, K, C> {
    pub fn with_clock(config: EngineConfig, provider: P, sink: K, clock: C) -> Self {
        let state = EngineState::new(&config);
        Self {
            config,
            provider,
            sink,
            clock,
            status: EngineStatus::Idle,
            state,
            source: None,
        }
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    /// Read access to pipeline state (primary issue, baseline, stats).
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Acquire the landmark source and enter `Running`.
    ///
    /// Valid from `Idle` or `Stopped`; a restart rebuilds the pipeline state
    /// from scratch, so no baseline, debounce, or coaching state survives.
    /// Acquisition failure is fatal to the call and leaves the engine idle.
    pub async fn start(&mut self) -> Result<(), EngineError> {
        match self.status {
            EngineStatus::Idle | EngineStatus::Stopped => {}
            status => {
                return Err(EngineError::InvalidTransition { status, op: "start" });
            }
        }

        self.state = EngineState::new(&self.config);
        self.status = EngineStatus::Idle;

        let source = self
            .provider
            .acquire()
            .await
            .map_err(EngineError::SourceUnavailable)?;
        info!(source = source.source_name(), "Engine started");
        self.source = Some(source);
        self.status = EngineStatus::Running;
        Ok(())
    }

    /// Toggle between `Running` and `Paused` without losing state.
    ///
    /// Resuming continues exactly where processing left off; debounce,
    /// coaching, and baseline state stay frozen in place while paused.
    pub fn pause(&mut self) {
        match self.status {
            EngineStatus::Running => {
                self.status = EngineStatus::Paused;
                info!("Engine paused");
            }
            EngineStatus::Paused => {
                self.status = EngineStatus::Running;
                info!("Engine resumed");
            }
            status => warn!(%status, "pause() ignored"),
        }
    }

    /// Release the source and reset every piece of pipeline state.
    pub fn stop(&mut self) {
        self.source = None;
        self.state = EngineState::new(&self.config);
        self.status = EngineStatus::Stopped;
        info!("Engine stopped — state reset");
    }

    /// Run one cooperative tick: pull a frame, process it, emit events.
    pub async fn tick(&mut self) -> Result<TickOutcome, EngineError> {
        match self.status {
            EngineStatus::Running => {}
            EngineStatus::Paused => return Ok(TickOutcome::Paused),
            status => {
                return Err(EngineError::InvalidTransition { status, op: "tick" });
            }
        }
        let Some(source) = self.source.as_mut() else {
            return Err(EngineError::InvalidTransition {
                status: self.status,
                op: "tick without source",
            });
        };

        let event = match source.next_frame().await {
            Ok(ev) => ev,
            Err(e) => {
                // A dead source ends the session; transient bad data never
                // reaches this path (malformed input is skipped upstream).
                warn!(error = %e, "Source error — treating as end of input");
                return Ok(TickOutcome::Eof);
            }
        };

        let now_ms = self.clock.now_ms();
        let events = match event {
            FrameEvent::Frame(frame) => self.state.process_tick(Some(&frame), now_ms),
            FrameEvent::NoPerson => self.state.process_tick(None, now_ms),
            FrameEvent::Eof => return Ok(TickOutcome::Eof),
        };

        let count = events.len();
        for event in &events {
            self.sink.emit(event);
        }
        Ok(TickOutcome::Processed { events: count })
    }

    /// Tick at the capped rate until cancellation or end of input.
    ///
    /// Returns the session statistics. The engine is left `Running` (or
    /// `Paused`) — callers decide whether the session ends with `stop()`.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<EngineStats, EngineError> {
        if !matches!(self.status, EngineStatus::Running | EngineStatus::Paused) {
            return Err(EngineError::InvalidTransition {
                status: self.status,
                op: "run",
            });
        }

        let tick_ms = 1_000 / u64::from(self.config.engine.target_fps.max(1));
        let mut interval = tokio::time::interval(tokio::time::Duration::from_millis(tick_ms.max(1)));
        // Drop-newest-excess backpressure: a slow tick skips frames instead
        // of queueing catch-up ticks.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_ms,
            fps = self.config.engine.target_fps,
            "Processing landmark frames"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }
                _ = interval.tick() => {
                    match self.tick().await? {
                        TickOutcome::Eof => {
                            info!("Source reached end of input");
                            break;
                        }
                        TickOutcome::Processed { .. } | TickOutcome::Paused => {}
                    }
                }
            }
        }

        let stats = self.state.stats();
        info!(
            ticks = stats.ticks_processed,
            alerts = stats.alerts_emitted,
            reminders = stats.reminders_emitted,
            person_lost = stats.person_lost_transitions,
            skipped_low_visibility = stats.frames_skipped_low_visibility,
            "Run finished"
        );
        Ok(stats)
    }
}

// ============================================================================
// Tests
// ============================================================================
