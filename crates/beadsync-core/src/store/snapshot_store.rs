//! Multi-workspace snapshot store
//!
//! The store owns the current [`Snapshot`] and the watch subscriptions that
//! keep it fresh.
//!
//! - [`SnapshotStore::refresh`] loads every target concurrently. Either all
//!   targets load and the snapshot is replaced, or the previous snapshot and
//!   subscriptions are kept and the first failure is returned.
//! - Watch events are coalesced: a reload runs once no event has arrived
//!   for `watch_debounce_ms`. Events that arrive while a reload is running
//!   cause exactly one follow-up reload.
//! - Explicit and debounced reloads never overlap.
//! - [`SnapshotStore::dispose`] releases every subscription exactly once;
//!   calling it again does nothing.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use futures::future::try_join_all;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use super::{
    loader::{LoadedDocument, Loader, WorkspaceTarget},
    snapshot::Snapshot,
    watch::{WatchAdapter, WatchEvent, WatchListener, WatchSubscription},
};
use crate::{
    error::{Error, Result},
    item::Item,
};

// ═══════════════════════════════════════════════════════════════════════════
// OPTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Source of "now" for staleness checks.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub const DEFAULT_WATCH_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_STALE_THRESHOLD_HOURS: u64 = 24;

/// Runtime options for a [`SnapshotStore`].
#[derive(Clone)]
pub struct StoreOptions {
    /// Quiet period after the last watch event before reloading.
    pub watch_debounce_ms: u64,
    /// Age after which an in-progress item counts as stale.
    pub stale_threshold_hours: u64,
    pub clock: Clock,
}

impl StoreOptions {
    #[must_use]
    pub const fn with_watch_debounce_ms(mut self, watch_debounce_ms: u64) -> Self {
        self.watch_debounce_ms = watch_debounce_ms;
        self
    }

    #[must_use]
    pub const fn with_stale_threshold_hours(mut self, hours: u64) -> Self {
        self.stale_threshold_hours = hours;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub const fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }

    /// `None` when the threshold is too large to represent; nothing is
    /// stale then.
    pub fn stale_threshold(&self) -> Option<TimeDelta> {
        i64::try_from(self.stale_threshold_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            watch_debounce_ms: DEFAULT_WATCH_DEBOUNCE_MS,
            stale_threshold_hours: DEFAULT_STALE_THRESHOLD_HOURS,
            clock: Arc::new(Utc::now),
        }
    }
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("watch_debounce_ms", &self.watch_debounce_ms)
            .field("stale_threshold_hours", &self.stale_threshold_hours)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE
// ═══════════════════════════════════════════════════════════════════════════

/// Merged, self-refreshing view over several workspaces.
///
/// Must be refreshed from within a tokio runtime; the first refresh starts
/// the background task that turns watch events into reloads.
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    loader: Arc<dyn Loader>,
    watcher: Arc<dyn WatchAdapter>,
    options: StoreOptions,
    /// Held for the whole of every reload.
    reload_gate: tokio::sync::Mutex<()>,
    state: Mutex<StoreState>,
    snapshots: watch::Sender<Arc<Snapshot>>,
    notify_tx: mpsc::UnboundedSender<()>,
}

struct StoreState {
    targets: Vec<WorkspaceTarget>,
    subscriptions: BTreeMap<PathBuf, WatchSubscription>,
    /// Taken when the debounce task is started.
    notify_rx: Option<mpsc::UnboundedReceiver<()>>,
    driver: Option<JoinHandle<()>>,
    disposed: bool,
}

impl SnapshotStore {
    pub fn new(
        loader: Arc<dyn Loader>,
        watcher: Arc<dyn WatchAdapter>,
        options: StoreOptions,
    ) -> Self {
        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(Arc::new(Snapshot::empty()));

        Self {
            inner: Arc::new(StoreInner {
                loader,
                watcher,
                options,
                reload_gate: tokio::sync::Mutex::new(()),
                state: Mutex::new(StoreState {
                    targets: Vec::new(),
                    subscriptions: BTreeMap::new(),
                    notify_rx: Some(notify_rx),
                    driver: None,
                    disposed: false,
                }),
                snapshots,
                notify_tx,
            }),
        }
    }

    /// Load `targets` and replace the snapshot.
    ///
    /// The targets become the set used by later watch-triggered reloads,
    /// even if this load fails.
    ///
    /// # Errors
    ///
    /// - [`Error::Disposed`] after [`SnapshotStore::dispose`]
    /// - [`Error::Load`] naming the first target that failed
    pub async fn refresh(&self, targets: Vec<WorkspaceTarget>) -> Result<Arc<Snapshot>> {
        {
            let mut state = self.inner.lock_state();
            if state.disposed {
                return Err(Error::Disposed);
            }
            state.targets.clone_from(&targets);
            self.start_driver(&mut state);
        }
        self.inner.reload(&targets).await
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.snapshots.borrow())
    }

    /// Receiver that observes every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.snapshots.subscribe()
    }

    /// In-progress items older than the stale threshold at the clock's now.
    pub fn get_stale_items(&self) -> Vec<Item> {
        let now = (self.inner.options.clock)();
        self.inner
            .options
            .stale_threshold()
            .map(|threshold| self.snapshot().stale_items(now, threshold))
            .unwrap_or_default()
    }

    pub fn targets(&self) -> Vec<WorkspaceTarget> {
        self.inner.lock_state().targets.clone()
    }

    /// Paths with a live watch subscription, in sorted order.
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.inner
            .lock_state()
            .subscriptions
            .keys()
            .cloned()
            .collect()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock_state().disposed
    }

    /// Release all subscriptions and stop reacting to events.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        let (subscriptions, driver) = {
            let mut state = self.inner.lock_state();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.notify_rx = None;
            (
                std::mem::take(&mut state.subscriptions),
                state.driver.take(),
            )
        };

        if let Some(driver) = driver {
            driver.abort();
        }
        let released = subscriptions.len();
        subscriptions.into_values().for_each(|mut sub| sub.dispose());
        tracing::debug!(released, "Snapshot store disposed");
    }

    fn start_driver(&self, state: &mut StoreState) {
        if let Some(rx) = state.notify_rx.take() {
            let debounce = self.inner.options.watch_debounce();
            state.driver = Some(tokio::spawn(run_debounce_loop(
                Arc::downgrade(&self.inner),
                rx,
                debounce,
            )));
        }
    }
}

impl Drop for SnapshotStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("options", &self.inner.options)
            .field("targets", &self.targets())
            .field("items", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// RELOAD
// ═══════════════════════════════════════════════════════════════════════════

impl StoreInner {
    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.lock_state().disposed {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    async fn reload(&self, targets: &[WorkspaceTarget]) -> Result<Arc<Snapshot>> {
        let _gate = self.reload_gate.lock().await;
        self.ensure_live()?;

        let documents = try_join_all(targets.iter().map(|target| self.load_target(target))).await?;

        // Disposed while loading: the result has nowhere to go.
        self.ensure_live()?;

        let watch_paths: BTreeSet<PathBuf> = documents
            .iter()
            .flat_map(|doc| doc.watch_paths.iter().cloned())
            .collect();
        let loaded_at = (self.options.clock)();
        let snapshot = Arc::new(Snapshot::new(
            documents.into_iter().zip(targets).flat_map(|(doc, target)| {
                doc.items
                    .into_iter()
                    .map(move |item| item.with_workspace(target.id.clone()))
            }),
            loaded_at,
        ));

        self.reconcile_subscriptions(&watch_paths);
        self.snapshots.send_replace(Arc::clone(&snapshot));

        tracing::info!(
            targets = targets.len(),
            items = snapshot.len(),
            "Snapshot replaced"
        );
        Ok(snapshot)
    }

    async fn load_target(&self, target: &WorkspaceTarget) -> Result<LoadedDocument> {
        self.loader.load(target).await.map_err(|e| match e {
            Error::Load { .. } => e,
            other => Error::load(&target.id, other),
        })
    }

    /// Reload triggered by the debounce task. Failures keep the previous
    /// snapshot.
    async fn reload_from_watch(&self) {
        let targets = {
            let state = self.lock_state();
            if state.disposed {
                return;
            }
            state.targets.clone()
        };

        if let Err(e) = self.reload(&targets).await {
            tracing::warn!(error = %e, "Debounced reload failed, keeping previous snapshot");
        }
    }

    /// Keep subscriptions for paths still wanted, release the rest and
    /// register new ones. A path that cannot be watched is skipped and
    /// retried on the next reload.
    fn reconcile_subscriptions(&self, wanted: &BTreeSet<PathBuf>) {
        let mut state = self.lock_state();
        if state.disposed {
            return;
        }

        state.subscriptions.retain(|path, sub| {
            let keep = wanted.contains(path);
            if !keep {
                sub.dispose();
            }
            keep
        });

        for path in wanted {
            if state.subscriptions.contains_key(path) {
                continue;
            }
            match WatchSubscription::create(self.watcher.as_ref(), path.clone(), self.listener()) {
                Ok(sub) => {
                    state.subscriptions.insert(path.clone(), sub);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Could not watch path");
                }
            }
        }
    }

    fn listener(&self) -> WatchListener {
        let tx = self.notify_tx.clone();
        Arc::new(move |event: WatchEvent| {
            tracing::trace!(kind = %event.kind, path = %event.path.display(), "Watch event");
            // Closed only once the store is gone.
            let _ = tx.send(());
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DEBOUNCE TASK
// ═══════════════════════════════════════════════════════════════════════════

async fn run_debounce_loop(
    inner: Weak<StoreInner>,
    mut rx: mpsc::UnboundedReceiver<()>,
    debounce: Duration,
) {
    while rx.recv().await.is_some() {
        if !wait_for_quiet(&mut rx, debounce).await {
            break;
        }
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.reload_from_watch().await;
    }
}

/// Absorb events until none arrives for `debounce`. Returns `false` when
/// the channel closed.
async fn wait_for_quiet(rx: &mut mpsc::UnboundedReceiver<()>, debounce: Duration) -> bool {
    loop {
        match tokio::time::timeout(debounce, rx.recv()).await {
            Ok(Some(())) => {}
            Ok(None) => return false,
            Err(_) => return true,
        }
    }
}
