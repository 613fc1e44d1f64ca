//! Processing Pipeline Module
//!
//! ## Per-Tick Pipeline
//!
//! ```text
//! TICK:  pull frame  →  extract features  →  calibrate (while learning)
//!        →  classify candidates  →  stabilize (debounce + primary)
//!        →  coaching aggregation  →  emit events to sink
//! ```
//!
//! The controller pulls frames at a capped rate (excess frames are dropped,
//! never queued) and owns all pipeline state on a single logical thread.

mod clock;
mod controller;
mod sink;
mod source;
mod state;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use controller::{EngineController, EngineError, TickOutcome};
pub use sink::{ChannelSink, EventSink, JsonlWriterSink, TracingSink, VecSink};
pub use source::{
    FrameEvent, JsonlFileProvider, JsonlSource, LandmarkSource, ReplayProvider, ReplaySource,
    SourceProvider, StdinProvider,
};
pub use state::{EngineState, EngineStats, EngineStatus};
