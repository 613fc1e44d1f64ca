//! posture-coach — real-time posture classification and coaching
//!
//! # Usage
//!
//! ```bash
//! # Run against the synthetic frame generator
//! cargo run --bin simulation -- --seconds 300 --fps 15 | cargo run -- --stdin
//!
//! # Replay a recorded JSONL frame file
//! cargo run -- --replay session.jsonl --speed 10
//!
//! # Emit events as JSON lines instead of log output
//! cargo run -- --stdin --emit-json
//! ```
//!
//! # Environment Variables
//!
//! - `POSTURE_COACH_CONFIG`: path to a TOML config file
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{bail, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use posture_coach::pipeline::{
    EngineController, EventSink, JsonlFileProvider, JsonlWriterSink, SourceProvider,
    StdinProvider, TracingSink,
};
use posture_coach::EngineConfig;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "posture-coach")]
#[command(about = "Real-time posture classification and coaching engine")]
#[command(version)]
struct CliArgs {
    /// Read landmark frames from stdin (JSON lines, `null` = no person).
    /// Use with the simulator: simulation | posture-coach --stdin
    #[arg(long)]
    stdin: bool,

    /// Path to a JSONL file of recorded frames to replay
    #[arg(long, value_name = "FILE")]
    replay: Option<String>,

    /// Replay speed multiplier (1 = paced at the tick rate, 0 = no delay)
    #[arg(long, default_value = "1")]
    speed: u64,

    /// Source preview is mirrored: flip landmark x so left/right issues
    /// match the user's own left and right
    #[arg(long)]
    mirror: bool,

    /// Path to the engine config TOML (overrides the default search order)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Emit events as JSON lines on stdout instead of log output
    #[arg(long)]
    emit_json: bool,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(std::path::Path::new(path))?,
        None => EngineConfig::load(),
    };
    if args.mirror {
        config.engine.mirror = true;
    }

    let provider: Box<dyn SourceProvider> = if args.stdin {
        Box::new(StdinProvider)
    } else if let Some(path) = &args.replay {
        let tick_ms = 1_000 / u64::from(config.engine.target_fps.max(1));
        let delay_ms = if args.speed == 0 { 0 } else { tick_ms / args.speed };
        Box::new(JsonlFileProvider::new(path, delay_ms))
    } else {
        bail!("no frame source selected — pass --stdin or --replay <file>");
    };

    let sink: Box<dyn EventSink> = if args.emit_json {
        Box::new(JsonlWriterSink::stdout())
    } else {
        Box::new(TracingSink)
    };

    let mut controller = EngineController::new(config, provider, sink);
    controller.start().await?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl-c");
            return;
        }
        signal_cancel.cancel();
    });

    let stats = controller.run(cancel).await?;
    controller.stop();

    info!(
        ticks = stats.ticks_processed,
        alerts = stats.alerts_emitted,
        reminders = stats.reminders_emitted,
        "Session complete"
    );
    Ok(())
}
