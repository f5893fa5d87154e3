//! Shared utilities for integration tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use lotus::config::{AppSettings, ConfigStore, ConfigWatcher, ReloadPipeline, SettingsPublisher, WatcherHandle};
use lotus::lifecycle::Shutdown;

/// Replace `path` the way editors do: write a sibling temp file, then rename.
pub fn write_atomic(path: &Path, content: &str) {
    let tmp = path.with_extension("ini.tmp");
    fs::write(&tmp, content).unwrap();
    fs::rename(&tmp, path).unwrap();
}

/// Poll `cond` until it holds or `timeout` elapses.
pub async fn wait_for<F: Fn() -> bool>(cond: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

/// A config directory with a live watcher attached.
#[allow(dead_code)]
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub path: PathBuf,
    pub publisher: SettingsPublisher,
    pub pipeline: Arc<ReloadPipeline>,
    pub shutdown: Shutdown,
    pub watcher: Option<WatcherHandle>,
}

#[allow(dead_code)]
impl Harness {
    pub async fn start(initial: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, initial).unwrap();

        let store = ConfigStore::load(&path).unwrap();
        let publisher = SettingsPublisher::new(AppSettings::from_raw(store.raw()));
        let pipeline = Arc::new(ReloadPipeline::new(store, publisher.clone()));
        let shutdown = Shutdown::new();
        let watcher = ConfigWatcher::new(dir.path())
            .spawn(pipeline.clone(), shutdown.subscribe())
            .unwrap();

        // Let the OS subscription settle before the first edit.
        tokio::time::sleep(Duration::from_millis(100)).await;

        Self {
            dir,
            path,
            publisher,
            pipeline,
            shutdown,
            watcher: Some(watcher),
        }
    }

    pub async fn wait_for_generation(&self, generation: u64) -> bool {
        let publisher = self.publisher.clone();
        wait_for(move || publisher.generation() >= generation, Duration::from_secs(5)).await
    }
}
