//! Lotus server.
//!
//! ```text
//!   conf/app.ini ──notify──▶ ConfigWatcher ──▶ ReloadPipeline ──swap──▶ SettingsPublisher
//!                                                                          │
//!   Client ─────────────────────────────▶ HttpServer (handlers) ──current()┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use tokio::net::TcpListener;

use lotus::config::{ConfigStore, RunMode, StartupSettings};
use lotus::config::schema::APP_VER;
use lotus::http::HttpServer;
use lotus::lifecycle::{bootstrap, signals, Shutdown};
use lotus::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lotus", version, about = "Lotus web application server")]
struct Args {
    /// Path to the configuration file; its directory is watched for changes.
    #[arg(short, long, env = "LOTUS_CONFIG", default_value = "conf/app.ini")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let store = match ConfigStore::load(&args.config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Fail to load configuration file: {}", e);
            return ExitCode::from(2);
        }
    };

    let run_mode = StartupSettings::from_raw(store.raw()).run_mode;
    logging::init_logging(run_mode);
    tracing::info!(version = APP_VER, pro = run_mode == RunMode::Pro, "lotus starting");

    match run(store).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal startup error");
            eprintln!("lotus: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(store: ConfigStore) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let app = bootstrap(store, &shutdown)?;

    if let Some(addr) = &app.startup.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let hangup = signals::spawn_reload_on_hangup(app.pipeline.clone(), shutdown.subscribe());

    let listener = TcpListener::bind(("0.0.0.0", app.startup.http_port)).await?;
    let server = HttpServer::new(&app.startup, app.publisher.clone());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_terminate().await;
    tracing::info!("Shutting down");
    shutdown.trigger();

    match server_task.await {
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server error"),
        Err(e) => tracing::error!(error = %e, "HTTP server task failed"),
        Ok(Ok(())) => {}
    }
    let _ = hangup.await;
    app.watcher.stop().await;
    Ok(())
}
