//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware
//! - Hand the settings publisher to handlers through `AppState`
//! - Serve until the shutdown broadcast fires

use axum::{
    http::{header, HeaderValue},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use crate::config::{SettingsPublisher, StartupSettings};
use crate::http::handlers;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: SettingsPublisher,
}

/// HTTP server rendering from the live settings snapshot.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Startup settings are read once here; handlers only see the publisher.
    pub fn new(startup: &StartupSettings, settings: SettingsPublisher) -> Self {
        let server_name = HeaderValue::from_str(&startup.server_name)
            .unwrap_or_else(|_| HeaderValue::from_static("lotus"));
        let state = AppState { settings };
        Self {
            router: Self::build_router(state, server_name),
        }
    }

    fn build_router(state: AppState, server_name: HeaderValue) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/settings", get(handlers::settings))
            .route("/health", get(handlers::health))
            .with_state(state)
            .layer(SetResponseHeaderLayer::overriding(header::SERVER, server_name))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
