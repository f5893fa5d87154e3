//! Startup orchestration.
//!
//! Every error returned from here is fatal: the process must not serve
//! without a configuration or without the watcher that keeps it current.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use crate::config::{
    AppSettings, ConfigError, ConfigStore, ConfigWatcher, ReloadPipeline, SettingsPublisher,
    StartupSettings, WatchError, WatcherHandle,
};
use crate::lifecycle::Shutdown;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to start config watcher: {0}")]
    Watch(#[from] WatchError),
}

/// Running application state produced by [`bootstrap`].
pub struct App {
    pub startup: StartupSettings,
    pub publisher: SettingsPublisher,
    pub pipeline: Arc<ReloadPipeline>,
    pub watcher: WatcherHandle,
}

/// Publish the first snapshot from `store` and start watching its directory.
///
/// Must be called from within a tokio runtime.
pub fn bootstrap(store: ConfigStore, shutdown: &Shutdown) -> Result<App, StartupError> {
    let startup = StartupSettings::from_raw(store.raw());
    let settings = AppSettings::from_raw(store.raw());

    tracing::info!(
        path = %store.path().display(),
        app_name = %settings.app_name,
        run_mode = startup.run_mode.as_str(),
        http_port = startup.http_port,
        session_provider = %startup.session.provider,
        xsrf = startup.xsrf.enabled,
        orm_driver = %startup.orm.driver_name,
        "Configuration loaded"
    );

    let watch_dir = config_dir(store.path());
    let publisher = SettingsPublisher::new(settings);
    let pipeline = Arc::new(ReloadPipeline::new(store, publisher.clone()));

    let watcher = ConfigWatcher::new(watch_dir).spawn(pipeline.clone(), shutdown.subscribe())?;

    Ok(App {
        startup,
        publisher,
        pipeline,
        watcher,
    })
}

/// Directory holding the config file; `.` for a bare file name.
pub fn config_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        assert_eq!(config_dir(Path::new("conf/app.ini")), PathBuf::from("conf"));
        assert_eq!(config_dir(Path::new("app.ini")), PathBuf::from("."));
        assert_eq!(config_dir(Path::new("/etc/lotus/app.ini")), PathBuf::from("/etc/lotus"));
    }

    #[tokio::test]
    async fn test_bootstrap_publishes_initial_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");
        std::fs::write(&path, "[app]\napp_name = Lotus\nrun_mode = pro\nhttp_port = 9001\n").unwrap();

        let shutdown = Shutdown::new();
        let app = bootstrap(ConfigStore::load(&path).unwrap(), &shutdown).unwrap();

        assert_eq!(app.publisher.current().app_name, "Lotus");
        assert!(app.publisher.current().is_pro_mode);
        assert_eq!(app.startup.http_port, 9001);
        assert_eq!(app.pipeline.config_path(), path);

        shutdown.trigger();
        app.watcher.stop().await;
    }
}
