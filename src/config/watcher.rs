//! Configuration directory watcher for hot reload.
//!
//! The OS notification callback only forwards raw events into a channel; a
//! single dedicated thread consumes them in delivery order and drives the
//! [`ReloadPipeline`], so two reloads never overlap. Reloads do file IO and
//! take the store lock, which is why they stay off the async workers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use crate::config::pipeline::ReloadPipeline;

/// Extension of files that trigger a reload.
pub const CONFIG_EXTENSION: &str = "ini";

/// Failure to establish or extend a filesystem watch.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("failed to create watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("failed to watch {}: {source}", .path.display())]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to start watcher thread: {0}")]
    Thread(#[source] std::io::Error),
}

/// What the consumer thread receives.
enum WatchMsg {
    Event(notify::Result<Event>),
    Shutdown,
}

/// Watches one directory (non-recursively) for config file changes.
pub struct ConfigWatcher {
    dir: PathBuf,
    extension: String,
}

impl ConfigWatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: CONFIG_EXTENSION.to_string(),
        }
    }

    /// Only files with this extension (case-insensitive, no dot) are forwarded.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Subscribe to the directory and start the consumer thread.
    ///
    /// Must be called from within a tokio runtime: a small task forwards the
    /// shutdown broadcast to the thread. The thread runs until that signal
    /// fires or the returned handle is stopped.
    pub fn spawn(
        self,
        pipeline: Arc<ReloadPipeline>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<WatcherHandle, WatchError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<WatchMsg>();

        let events = tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = events.send(WatchMsg::Event(res));
            },
            Config::default(),
        )
        .map_err(WatchError::Init)?;

        watcher
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Register {
                path: self.dir.clone(),
                source,
            })?;

        let extension = self.extension.clone();
        let consumer = thread::Builder::new()
            .name("config-watcher".into())
            .spawn(move || {
                while let Some(msg) = rx.blocking_recv() {
                    match msg {
                        WatchMsg::Event(Ok(event)) => handle_event(&pipeline, &extension, event),
                        WatchMsg::Event(Err(e)) => tracing::error!(error = %e, "Watch error"),
                        WatchMsg::Shutdown => {
                            tracing::debug!("Config watcher received shutdown");
                            break;
                        }
                    }
                }
                tracing::info!("Config watcher stopped");
            })
            .map_err(WatchError::Thread)?;

        let forward = tx.clone();
        let forwarder = tokio::spawn(async move {
            // A closed broadcast means the coordinator is gone; stop as well.
            let _ = shutdown.recv().await;
            let _ = forward.send(WatchMsg::Shutdown);
        });

        tracing::info!(path = %self.dir.display(), extension = %self.extension, "Config watcher started");

        Ok(WatcherHandle {
            watcher: Some(watcher),
            control: tx,
            forwarder,
            consumer,
        })
    }
}

fn handle_event(pipeline: &ReloadPipeline, extension: &str, event: Event) {
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return;
    }
    for path in event.paths.iter().filter(|p| has_extension(p, extension)) {
        tracing::debug!(path = %path.display(), kind = ?event.kind, "Config event");
        pipeline.on_event(path);
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Running watcher: owns the OS subscription and the consumer thread.
pub struct WatcherHandle {
    watcher: Option<RecommendedWatcher>,
    control: mpsc::UnboundedSender<WatchMsg>,
    forwarder: JoinHandle<()>,
    consumer: thread::JoinHandle<()>,
}

impl WatcherHandle {
    /// Watch an additional directory.
    ///
    /// Failures are logged and returned; the existing watches keep working.
    pub fn add_watch(&mut self, dir: &Path) -> Result<(), WatchError> {
        let Some(watcher) = self.watcher.as_mut() else {
            return Ok(());
        };
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                tracing::info!(path = %dir.display(), "Watching additional config directory");
                Ok(())
            }
            Err(source) => {
                tracing::error!(path = %dir.display(), error = %source, "Failed to watch config directory");
                Err(WatchError::Register {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Whether the consumer thread has exited.
    pub fn is_finished(&self) -> bool {
        self.consumer.is_finished()
    }

    /// Close the event source and wait for the consumer thread to exit.
    ///
    /// Events already queued are handled first, so a reload in progress
    /// completes.
    pub async fn stop(self) {
        let WatcherHandle {
            watcher,
            control,
            forwarder,
            consumer,
        } = self;
        drop(watcher);
        let _ = control.send(WatchMsg::Shutdown);
        forwarder.abort();

        match tokio::task::spawn_blocking(move || consumer.join()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => tracing::error!("Config watcher thread panicked"),
            Err(e) => tracing::error!(error = %e, "Failed to join config watcher thread"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_filter() {
        assert!(has_extension(Path::new("conf/app.ini"), "ini"));
        assert!(has_extension(Path::new("conf/APP.INI"), "ini"));
        assert!(!has_extension(Path::new("conf/app.ini.swp"), "ini"));
        assert!(!has_extension(Path::new("conf/app.toml"), "ini"));
        assert!(!has_extension(Path::new("conf/ini"), "ini"));
    }

    #[test]
    fn test_with_extension_strips_dot() {
        let watcher = ConfigWatcher::new("conf").with_extension(".conf");
        assert_eq!(watcher.extension, "conf");
    }

    #[tokio::test]
    async fn test_missing_directory_fails_to_register() {
        use crate::config::{AppSettings, ConfigStore, SettingsPublisher};
        use crate::config::raw::RawConfig;

        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::from_raw(dir.path().join("app.ini"), RawConfig::default());
        let pipeline = Arc::new(ReloadPipeline::new(
            store,
            SettingsPublisher::new(AppSettings::default()),
        ));
        let (_tx, rx) = broadcast::channel(1);

        let result = ConfigWatcher::new(dir.path().join("missing")).spawn(pipeline, rx);
        assert!(matches!(result, Err(WatchError::Register { .. })));
    }
}
