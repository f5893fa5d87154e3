//! Duplicate-event suppression for config file notifications.
//!
//! Notification backends commonly deliver several events per logical write
//! (data write, then metadata update). The filter remembers the last accepted
//! modification time per path and lets an event through only when that time
//! has moved.
//!
//! # Design Decisions
//! - Fail open: a path that cannot be stat'ed counts as already processed
//! - Keys are normalized (`\` → `/`) so both spellings share one record
//! - No quiet-period coalescing: every distinct modification time is accepted

use dashmap::DashMap;
use std::path::Path;
use std::time::SystemTime;

/// Per-path record of the last accepted modification time.
#[derive(Debug, Default)]
pub struct DebounceFilter {
    seen: DashMap<String, SystemTime>,
}

impl DebounceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether an event for `path` should trigger a reload.
    ///
    /// `mod_time` is `None` when the file could not be stat'ed.
    pub fn should_process(&self, path: &Path, mod_time: Option<SystemTime>) -> bool {
        let Some(mod_time) = mod_time else {
            return false;
        };
        let key = normalize(path);

        if self.seen.get(&key).is_some_and(|last| *last == mod_time) {
            tracing::trace!(path = %key, "Modification time unchanged, skipping");
            return false;
        }

        self.seen.insert(key, mod_time);
        true
    }

    /// Number of paths with a recorded modification time.
    pub fn tracked(&self) -> usize {
        self.seen.len()
    }
}

/// Stat a file for its modification time.
///
/// Failures are expected during editor save-rename sequences, so they are
/// logged at debug level only.
pub fn mod_time(path: &Path) -> Option<SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Could not stat changed file");
            None
        }
    }
}

fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
