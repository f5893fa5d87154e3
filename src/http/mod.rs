//! HTTP surface consuming the live settings.
//!
//! # Data Flow
//! ```text
//! request → server.rs (router, middleware)
//!         → handlers.rs (SettingsPublisher::current() → JSON)
//!             → locale.rs (language from query / cookie / Accept-Language)
//! ```

pub mod handlers;
pub mod locale;
pub mod server;

pub use server::{AppState, HttpServer};
