//! Reload orchestration: event → debounce → reload → derive → publish.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinError;
use crate::config::debounce::{mod_time, DebounceFilter};
use crate::config::loader::{ConfigError, ConfigStore};
use crate::config::publisher::{SettingsPublisher, Snapshot};
use crate::config::schema::AppSettings;
use crate::observability::metrics;

/// Result of handling one change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Stat failed or the modification time was already seen; no attempt made.
    Filtered,
    /// A new snapshot was published.
    Reloaded,
    /// The file could not be loaded; the previous snapshot stays live.
    Failed,
}

impl ReloadOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReloadOutcome::Filtered => "filtered",
            ReloadOutcome::Reloaded => "reloaded",
            ReloadOutcome::Failed => "failed",
        }
    }
}

/// Turns change notifications into published settings snapshots.
///
/// Holds the only mutable [`ConfigStore`]. The store lock is taken for the
/// duration of a reload, so reloads are serialized; readers of the publisher
/// never touch it.
pub struct ReloadPipeline {
    store: Mutex<ConfigStore>,
    debounce: DebounceFilter,
    publisher: SettingsPublisher,
}

impl ReloadPipeline {
    pub fn new(store: ConfigStore, publisher: SettingsPublisher) -> Self {
        Self {
            store: Mutex::new(store),
            debounce: DebounceFilter::new(),
            publisher,
        }
    }

    /// Handle a notification for `path`.
    pub fn on_event(&self, path: &Path) -> ReloadOutcome {
        let mtime = mod_time(path);
        if !self.debounce.should_process(path, mtime) {
            metrics::record_filtered_event();
            return ReloadOutcome::Filtered;
        }

        tracing::info!(path = %path.display(), "Config file change detected, reloading");
        self.reload()
    }

    /// Reload unconditionally, bypassing the debounce filter.
    pub fn force_reload(&self) -> ReloadOutcome {
        tracing::info!("Forced config reload requested");
        self.reload()
    }

    /// [`force_reload`](Self::force_reload) on the blocking pool, for callers
    /// running on an async worker.
    pub async fn force_reload_blocking(self: &Arc<Self>) -> Result<ReloadOutcome, JoinError> {
        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || pipeline.force_reload()).await
    }

    fn reload(&self) -> ReloadOutcome {
        let outcome = match self.try_reload() {
            Ok(snapshot) => {
                tracing::info!(
                    app_name = %snapshot.app_name,
                    run_mode = snapshot.run_mode.as_str(),
                    generation = snapshot.generation,
                    "Config reloaded"
                );
                ReloadOutcome::Reloaded
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config. Keeping current configuration.");
                ReloadOutcome::Failed
            }
        };
        metrics::record_reload(outcome.as_str());
        outcome
    }

    fn try_reload(&self) -> Result<Arc<Snapshot>, ConfigError> {
        let mut store = self.store.lock();
        let settings = AppSettings::from_raw(store.reload()?);
        let snapshot = self.publisher.swap(settings);
        metrics::record_generation(snapshot.generation);
        Ok(snapshot)
    }

    pub fn publisher(&self) -> &SettingsPublisher {
        &self.publisher
    }

    /// Path of the configuration file being reloaded.
    pub fn config_path(&self) -> PathBuf {
        self.store.lock().path().to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{Duration, SystemTime};

    fn setup(content: &str) -> (tempfile::TempDir, PathBuf, ReloadPipeline) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, content).unwrap();
        let store = ConfigStore::load(&path).unwrap();
        let publisher = SettingsPublisher::new(AppSettings::from_raw(store.raw()));
        (dir, path, ReloadPipeline::new(store, publisher))
    }

    fn set_mtime(path: &Path, secs: u64) {
        let f = fs::OpenOptions::new().write(true).open(path).unwrap();
        f.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
    }

    #[test]
    fn test_edit_to_pro_reloads_once() {
        let (_dir, path, pipeline) = setup("[app]\napp_name = Lotus\nrun_mode = dev\nhttp_port = 8080\n");
        assert_eq!(pipeline.publisher().current().app_name, "Lotus");
        assert!(!pipeline.publisher().current().is_pro_mode);

        fs::write(&path, "[app]\napp_name = Lotus\nrun_mode = pro\n").unwrap();
        set_mtime(&path, 1_000);

        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Filtered);
        assert!(pipeline.publisher().current().is_pro_mode);
        assert_eq!(pipeline.publisher().generation(), 1);
    }

    #[test]
    fn test_distinct_mod_times_each_reload() {
        let (_dir, path, pipeline) = setup("[app]\nrun_mode = dev\n");

        set_mtime(&path, 1_000);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);
        set_mtime(&path, 1_001);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);
        assert_eq!(pipeline.publisher().generation(), 2);
    }

    #[test]
    fn test_malformed_edit_keeps_previous_snapshot() {
        let (_dir, path, pipeline) = setup("[app]\nrun_mode = dev\n");
        let before = pipeline.publisher().current();

        fs::write(&path, "[app]\nrun_mode = pro\n[session\n").unwrap();
        set_mtime(&path, 2_000);

        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Failed);
        assert_eq!(*pipeline.publisher().current(), *before);
        assert!(!pipeline.publisher().current().is_pro_mode);
        assert_eq!(pipeline.publisher().generation(), 0);
    }

    #[test]
    fn test_fixing_file_after_failure_recovers() {
        let (_dir, path, pipeline) = setup("[app]\nrun_mode = dev\n");

        fs::write(&path, "[app\n").unwrap();
        set_mtime(&path, 3_000);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Failed);

        fs::write(&path, "[app]\nrun_mode = pro\n").unwrap();
        set_mtime(&path, 3_001);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);
        assert!(pipeline.publisher().current().is_pro_mode);
    }

    #[test]
    fn test_deleted_file_is_filtered() {
        let (_dir, path, pipeline) = setup("[app]\nrun_mode = dev\n");
        fs::remove_file(&path).unwrap();

        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Filtered);
        assert_eq!(pipeline.publisher().generation(), 0);
    }

    #[test]
    fn test_reload_history_does_not_matter() {
        let a = "[app]\napp_name = A\nrun_mode = pro\n[old]\nx = 1\n";
        let b = "[app]\napp_name = B\n[i18n]\nlangs = fr-FR\n";

        let (_dir, path, pipeline) = setup(a);
        fs::write(&path, b).unwrap();
        set_mtime(&path, 4_000);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);

        let (_cold_dir, _cold_path, cold) = setup(b);
        assert_eq!(pipeline.publisher().current().settings, cold.publisher().current().settings);
    }

    #[test]
    fn test_force_reload_bypasses_debounce() {
        let (_dir, path, pipeline) = setup("[app]\napp_name = A\n");
        set_mtime(&path, 5_000);
        assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);

        assert_eq!(pipeline.force_reload(), ReloadOutcome::Reloaded);
        assert_eq!(pipeline.publisher().generation(), 2);
        assert_eq!(pipeline.config_path(), path);
    }

    #[test]
    fn test_filtered_events_are_not_counted_as_attempts() {
        let (_dir, path, pipeline) = setup("[app]\napp_name = A\n");
        set_mtime(&path, 6_000);

        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        ::metrics::with_local_recorder(&recorder, || {
            assert_eq!(pipeline.on_event(&path), ReloadOutcome::Reloaded);
            assert_eq!(pipeline.on_event(&path), ReloadOutcome::Filtered);
            assert_eq!(pipeline.on_event(&path), ReloadOutcome::Filtered);
        });

        let rendered = handle.render();
        assert!(rendered.contains("lotus_config_reloads_total{outcome=\"reloaded\"} 1"));
        assert!(rendered.contains("lotus_config_events_filtered_total 2"));
        assert!(!rendered.contains("outcome=\"filtered\""));
    }

    #[tokio::test]
    async fn test_forced_reload_leaves_runtime_free() {
        let (_dir, path, pipeline) = setup("[app]\nrun_mode = dev\n");
        fs::write(&path, "[app]\nrun_mode = pro\n").unwrap();
        let pipeline = Arc::new(pipeline);

        // The reload parks on the store lock; the runtime thread must not.
        let held = pipeline.store.lock();
        let reload = tokio::spawn({
            let pipeline = pipeline.clone();
            async move { pipeline.force_reload_blocking().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!reload.is_finished());
        drop(held);

        assert_eq!(reload.await.unwrap().unwrap(), ReloadOutcome::Reloaded);
        assert!(pipeline.publisher().current().is_pro_mode);
    }
}
