//! Engine Configuration Module
//!
//! Provides configuration loaded from TOML files, replacing hardcoded
//! thresholds with tunable values.
//!
//! ## Loading Order
//!
//! 1. `POSTURE_COACH_CONFIG` environment variable (path to TOML file)
//! 2. `posture_coach.toml` in the current working directory
//! 3. Built-in defaults (the reference constants)
//!
//! Configuration is loaded once at startup and threaded explicitly into the
//! controller — the pipeline holds no global state.

mod engine_config;
pub mod defaults;

pub use engine_config::*;
