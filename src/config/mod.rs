//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! conf/app.ini
//!     → raw.rs (parse sections & keys, all-or-nothing)
//!     → loader.rs (ConfigStore: owns RawConfig, typed getters)
//!     → schema.rs (AppSettings snapshot, StartupSettings)
//!     → publisher.rs (ArcSwap<Snapshot>: settings + generation, read by handlers)
//!
//! On file change:
//!     watcher.rs receives notify event (extension filter)
//!     → pipeline.rs: stat → debounce.rs gate → ConfigStore::reload
//!     → AppSettings::from_raw → SettingsPublisher::swap
//! ```
//!
//! # Design Decisions
//! - A snapshot is immutable once published; reloads replace it wholesale
//! - A failed reload leaves the last good configuration live
//! - Only the reload thread mutates configuration; readers never block

pub mod debounce;
pub mod loader;
pub mod pipeline;
pub mod publisher;
pub mod raw;
pub mod schema;
pub mod watcher;

pub use debounce::DebounceFilter;
pub use loader::{ConfigError, ConfigStore};
pub use pipeline::{ReloadOutcome, ReloadPipeline};
pub use publisher::{SettingsPublisher, Snapshot};
pub use raw::RawConfig;
pub use schema::{AppSettings, RunMode, StartupSettings};
pub use watcher::{ConfigWatcher, WatchError, WatcherHandle};
