//! Lotus web application core: configuration with live reload.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{AppSettings, SettingsPublisher};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
