//! Filesystem watch capability
//!
//! The store asks a [`WatchAdapter`] to observe each path a loader reports
//! and keeps one [`WatchSubscription`] per distinct path. Releasing a
//! subscription is idempotent, so the adapter sees exactly one release per
//! registration no matter how often the store is disposed.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use strum::Display;

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WatchEventKind {
    Change,
    Create,
    Delete,
}

/// One filesystem notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Callback invoked for every event on a watched path. May be called from
/// any thread.
pub type WatchListener = Arc<dyn Fn(WatchEvent) + Send + Sync>;

/// Live registration returned by an adapter.
pub trait WatchHandle: Send {
    /// Stop delivering events. Called at most once per handle by
    /// [`WatchSubscription`].
    fn release(&mut self);
}

/// Capability to observe a path.
pub trait WatchAdapter: Send + Sync {
    fn watch(&self, path: &Path, listener: WatchListener) -> Result<Box<dyn WatchHandle>>;
}

/// A registered watch on one path.
///
/// Dropping a subscription releases it.
pub struct WatchSubscription {
    path: PathBuf,
    handle: Box<dyn WatchHandle>,
    disposed: bool,
}

impl WatchSubscription {
    /// Register `listener` on `path` through `adapter`.
    pub fn create(
        adapter: &dyn WatchAdapter,
        path: impl Into<PathBuf>,
        listener: WatchListener,
    ) -> Result<Self> {
        let path = path.into();
        let handle = adapter.watch(&path, listener)?;
        tracing::debug!(path = %path.display(), "Watch subscription created");
        Ok(Self {
            path,
            handle,
            disposed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the underlying handle. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.handle.release();
        tracing::debug!(path = %self.path.display(), "Watch subscription disposed");
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("path", &self.path)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// NOTIFY BACKEND
// ═══════════════════════════════════════════════════════════════════════════

/// Adapter backed by the platform's native watcher.
///
/// Each path gets its own non-recursive watcher; the store handles
/// coalescing, so no debouncing happens here.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyWatchAdapter;

struct NotifyHandle {
    watcher: Option<RecommendedWatcher>,
}

impl WatchHandle for NotifyHandle {
    fn release(&mut self) {
        self.watcher.take();
    }
}

impl WatchAdapter for NotifyWatchAdapter {
    fn watch(&self, path: &Path, listener: WatchListener) -> Result<Box<dyn WatchHandle>> {
        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if let Some(kind) = map_event_kind(event.kind) {
                        event
                            .paths
                            .into_iter()
                            .for_each(|path| listener(WatchEvent::new(kind, path)));
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Filesystem watch error"),
            })
            .map_err(|e| Error::watch(format!("Failed to create file watcher: {e}")))?;

        watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| Error::watch(format!("Failed to watch {}: {e}", path.display())))?;

        Ok(Box::new(NotifyHandle {
            watcher: Some(watcher),
        }))
    }
}

/// Access and unclassified events carry no content change and are dropped.
const fn map_event_kind(kind: EventKind) -> Option<WatchEventKind> {
    match kind {
        EventKind::Create(_) => Some(WatchEventKind::Create),
        EventKind::Modify(_) | EventKind::Any => Some(WatchEventKind::Change),
        EventKind::Remove(_) => Some(WatchEventKind::Delete),
        _ => None,
    }
}
