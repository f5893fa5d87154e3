//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config pipeline, HTTP handlers
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (reload counters, snapshot generation)
//! ```

pub mod logging;
pub mod metrics;
