//! Lock-free publication of the current [`AppSettings`] snapshot.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use serde::Serialize;
use std::ops::Deref;
use std::sync::Arc;
use crate::config::schema::AppSettings;

/// A published settings value together with the swap that produced it.
///
/// Built by the writer, so the generation always belongs to these settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Number of swaps before this snapshot became live (0 = startup).
    pub generation: u64,

    #[serde(flatten)]
    pub settings: AppSettings,
}

impl Deref for Snapshot {
    type Target = AppSettings;

    fn deref(&self) -> &AppSettings {
        &self.settings
    }
}

/// Shared handle to the live settings snapshot.
///
/// Readers get an `Arc` to an immutable snapshot without taking a lock; a
/// swap replaces the pointer wholesale, so a reader sees either the old or the
/// new snapshot and never a mix. Clones share the same cell.
#[derive(Clone)]
pub struct SettingsPublisher {
    inner: Arc<Inner>,
}

struct Inner {
    current: ArcSwap<Snapshot>,
    /// Serializes writers only; readers never take it.
    write: Mutex<()>,
}

impl SettingsPublisher {
    /// Publish the startup snapshot.
    pub fn new(initial: AppSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: ArcSwap::from_pointee(Snapshot {
                    generation: 0,
                    settings: initial,
                }),
                write: Mutex::new(()),
            }),
        }
    }

    /// The live snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.current.load_full()
    }

    /// Replace the live snapshot and return it.
    pub fn swap(&self, next: AppSettings) -> Arc<Snapshot> {
        let _guard = self.inner.write.lock();
        let snapshot = Arc::new(Snapshot {
            generation: self.inner.current.load().generation + 1,
            settings: next,
        });
        self.inner.current.store(snapshot.clone());
        snapshot
    }

    /// Number of swaps since startup.
    pub fn generation(&self) -> u64 {
        self.inner.current.load().generation
    }
}

impl std::fmt::Debug for SettingsPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsPublisher")
            .field("current", &self.current())
            .finish()
    }
}
