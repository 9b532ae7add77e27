//! Trace watcher for `slidenav replay --watch`.
//!
//! notify runs its callback on an internal thread; change notifications are
//! forwarded over an mpsc channel and consumed by the replay loop.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Quiet period that collapses an editor's burst of writes into one rerun.
const SETTLE: Duration = Duration::from_millis(50);

pub struct TraceWatcher {
    rx: mpsc::Receiver<()>,
    _watcher: RecommendedWatcher, // Drop stops watching
}

impl TraceWatcher {
    /// Watch `path` for modification.
    ///
    /// Atomic saves replace the file, which drops an inotify watch on the
    /// file itself, so the parent directory is watched and events filtered.
    pub fn new(path: &Path) -> Result<Self> {
        let target = path
            .canonicalize()
            .with_context(|| format!("cannot watch {}", path.display()))?;
        let parent = target
            .parent()
            .ok_or_else(|| anyhow::anyhow!("cannot watch root path"))?
            .to_path_buf();
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                if let Ok(event) = res
                    && (event.kind.is_modify() || event.kind.is_create())
                    && event.paths.iter().any(|p| p == &target)
                {
                    let _ = tx.send(());
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        debug!("watch: watching {}", parent.display());

        Ok(Self {
            rx,
            _watcher: watcher,
        })
    }

    /// Block until the trace changes. Returns false if the watcher died.
    pub fn wait_for_change(&self) -> bool {
        if self.rx.recv().is_err() {
            return false;
        }
        // Drain the rest of the burst.
        while self.rx.recv_timeout(SETTLE).is_ok() {}
        true
    }
}
