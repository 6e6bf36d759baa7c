//! Polling file watcher
//!
//! Tracks modification times of a changing set of files and reports which
//! ones moved since the last poll. Creation and deletion count as changes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::refresh::{RefreshOutcome, Refresher, Trigger};

/// Modification-time snapshot of watched files.
#[derive(Debug, Default)]
pub struct MtimeWatcher {
    seen: HashMap<PathBuf, Option<SystemTime>>,
}

impl MtimeWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state of `files` without reporting anything.
    pub fn prime(&mut self, files: &[PathBuf]) {
        self.seen = files.iter().map(|f| (f.clone(), modified(f))).collect();
    }

    /// Files among `files` whose state differs from the last poll. Files
    /// new to the watch set are recorded, not reported.
    pub fn poll(&mut self, files: &[PathBuf]) -> Vec<PathBuf> {
        let mut changed = Vec::new();
        let mut next = HashMap::with_capacity(files.len());

        for file in files {
            let current = modified(file);
            if let Some(previous) = self.seen.get(file) {
                if *previous != current {
                    changed.push(file.clone());
                }
            }
            next.insert(file.clone(), current);
        }

        self.seen = next;
        changed
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Poll the refresher's watched files until `stop` is set.
pub fn watch_loop(refresher: &Refresher, interval: Duration, stop: Arc<AtomicBool>) {
    let mut watcher = MtimeWatcher::new();
    watcher.prime(&refresher.watched_files());
    tracing::info!(files = refresher.watched_files().len(), "watching theme sources");

    while !stop.load(Ordering::SeqCst) {
        std::thread::sleep(interval);

        for path in watcher.poll(&refresher.watched_files()) {
            match refresher.trigger(Trigger::FileChanged(path.clone())) {
                RefreshOutcome::Completed(report) => {
                    tracing::debug!(path = %path.display(), passes = report.passes, "refresh completed");
                }
                RefreshOutcome::Failed(message) => {
                    tracing::warn!(path = %path.display(), error = %message, "refresh failed");
                }
                RefreshOutcome::Coalesced | RefreshOutcome::Ignored => {}
            }
        }
    }

    tracing::info!("stopped watching");
}
