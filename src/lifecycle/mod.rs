//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Publish first snapshot → Start watcher → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → watcher task + HTTP server exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Force config reload
//! ```
//!
//! # Design Decisions
//! - Fail fast: a missing config file or watcher is fatal at startup
//! - Steady-state failures are logged, never fatal

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, App, StartupError};
