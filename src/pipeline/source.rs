//! Landmark source abstraction for frame ingestion.
//!
//! Provides a unified trait for pulling landmark frames from different
//! producers: pre-loaded replays and JSONL streams (stdin or files). The
//! controller calls [`LandmarkSource::next_frame`] once per tick; producing
//! a frame faster than the tick cap buys nothing — excess frames are simply
//! never pulled (drop, not queue).

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::types::Frame;

/// Events produced by a landmark source.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    /// A landmark frame for the current tick.
    Frame(Frame),
    /// The source ran but no person is currently visible.
    NoPerson,
    /// Source reached end of data (EOF for files/stdin).
    Eof,
}

/// Trait abstracting where landmark frames come from.
///
/// Implementations handle parsing and pacing internally. The controller
/// treats `NoPerson` as a first-class state, never as an error.
#[async_trait]
pub trait LandmarkSource: Send + 'static {
    /// Pull the frame for the current tick.
    async fn next_frame(&mut self) -> Result<FrameEvent>;

    /// Human-readable name for logging (e.g. "replay", "stdin").
    fn source_name(&self) -> &str;
}

/// Acquires a [`LandmarkSource`] when the engine starts.
///
/// Acquisition is the engine's only fallible async boundary: a failure here
/// is fatal to `start()` and leaves the engine idle.
#[async_trait]
pub trait SourceProvider: Send {
    async fn acquire(&mut self) -> Result<Box<dyn LandmarkSource>>;
}

#[async_trait]
impl SourceProvider for Box<dyn SourceProvider> {
    async fn acquire(&mut self) -> Result<Box<dyn LandmarkSource>> {
        (**self).acquire().await
    }
}

// ============================================================================
// Replay Source (pre-loaded frames)
// ============================================================================

/// Replays pre-loaded frames with optional inter-frame delay.
///
/// `None` entries model ticks on which no person was visible.
pub struct ReplaySource {
    frames: std::vec::IntoIter<Option<Frame>>,
    delay_ms: u64,
    yielded_first: bool,
}

impl ReplaySource {
    pub fn new(frames: Vec<Option<Frame>>, delay_ms: u64) -> Self {
        Self {
            frames: frames.into_iter(),
            delay_ms,
            yielded_first: false,
        }
    }
}

#[async_trait]
impl LandmarkSource for ReplaySource {
    async fn next_frame(&mut self) -> Result<FrameEvent> {
        // Delay between frames (skip the delay before the first frame).
        if self.yielded_first && self.delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        }
        match self.frames.next() {
            Some(Some(frame)) => {
                self.yielded_first = true;
                Ok(FrameEvent::Frame(frame))
            }
            Some(None) => {
                self.yielded_first = true;
                Ok(FrameEvent::NoPerson)
            }
            None => Ok(FrameEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        "replay"
    }
}

/// Provider wrapping a pre-built frame list.
pub struct ReplayProvider {
    frames: Option<Vec<Option<Frame>>>,
    delay_ms: u64,
}

impl ReplayProvider {
    pub fn new(frames: Vec<Option<Frame>>, delay_ms: u64) -> Self {
        Self {
            frames: Some(frames),
            delay_ms,
        }
    }
}

#[async_trait]
impl SourceProvider for ReplayProvider {
    async fn acquire(&mut self) -> Result<Box<dyn LandmarkSource>> {
        let frames = self
            .frames
            .take()
            .ok_or_else(|| anyhow::anyhow!("replay frames already consumed by a previous start"))?;
        Ok(Box::new(ReplaySource::new(frames, self.delay_ms)))
    }
}

// ============================================================================
// JSONL Source (one frame per line)
// ============================================================================

/// Reads JSON-formatted frames, one per line.
///
/// The literal `null` denotes a tick with no person visible. Malformed lines
/// are warned about and skipped — the stream self-heals on the next good
/// line. Used with the simulation harness:
/// `simulation | posture-coach --stdin`
pub struct JsonlSource<R> {
    reader: R,
    line_buffer: String,
    name: String,
}

impl JsonlSource<BufReader<Stdin>> {
    /// JSONL frames from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), "stdin")
    }
}

impl<R: AsyncBufRead + Unpin + Send + 'static> JsonlSource<R> {
    pub fn new(reader: R, name: &str) -> Self {
        Self {
            reader,
            line_buffer: String::with_capacity(4096),
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send + 'static> LandmarkSource for JsonlSource<R> {
    async fn next_frame(&mut self) -> Result<FrameEvent> {
        loop {
            self.line_buffer.clear();
            let bytes = self.reader.read_line(&mut self.line_buffer).await?;
            if bytes == 0 {
                return Ok(FrameEvent::Eof);
            }
            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }
            if line == "null" {
                return Ok(FrameEvent::NoPerson);
            }
            match serde_json::from_str::<Frame>(line) {
                Ok(frame) => return Ok(FrameEvent::Frame(frame)),
                Err(e) => {
                    tracing::warn!(source = %self.name, error = %e, "Skipping malformed frame line");
                }
            }
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// Provider yielding a stdin JSONL source.
pub struct StdinProvider;

#[async_trait]
impl SourceProvider for StdinProvider {
    async fn acquire(&mut self) -> Result<Box<dyn LandmarkSource>> {
        Ok(Box::new(JsonlSource::stdin()))
    }
}

/// Provider that loads a JSONL frame file into a replay source.
///
/// Reading happens at acquisition time, so a missing or unreadable file
/// fails `start()` rather than the first tick.
pub struct JsonlFileProvider {
    path: std::path::PathBuf,
    delay_ms: u64,
}

impl JsonlFileProvider {
    pub fn new(path: impl Into<std::path::PathBuf>, delay_ms: u64) -> Self {
        Self {
            path: path.into(),
            delay_ms,
        }
    }
}

#[async_trait]
impl SourceProvider for JsonlFileProvider {
    async fn acquire(&mut self) -> Result<Box<dyn LandmarkSource>> {
        use anyhow::Context;
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read frame file {}", self.path.display()))?;
        let mut frames = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "null" {
                frames.push(None);
                continue;
            }
            match serde_json::from_str::<Frame>(line) {
                Ok(frame) => frames.push(Some(frame)),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "Skipping malformed frame line");
                }
            }
        }
        tracing::info!(path = %self.path.display(), frames = frames.len(), "Loaded replay frames");
        Ok(Box::new(ReplaySource::new(frames, self.delay_ms)))
    }
}

// ============================================================================
// Tests
// ============================================================================
