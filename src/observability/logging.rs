//! Structured logging.
//!
//! Uses the `tracing` facade with a `fmt` subscriber. The default filter
//! depends on the run mode (`debug` in dev, `info` in pro); `RUST_LOG`
//! overrides it.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::RunMode;

/// Default filter directive for a run mode.
pub fn default_filter(run_mode: RunMode) -> &'static str {
    match run_mode {
        RunMode::Dev => "lotus=debug,tower_http=debug",
        RunMode::Pro => "lotus=info,tower_http=info",
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(run_mode: RunMode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(run_mode).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(run_mode == RunMode::Dev))
        .try_init();
}
