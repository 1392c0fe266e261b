//! Command implementations and the shared context they run in

pub mod check_dep;
pub mod list;
pub mod set_status;
pub mod version;
pub mod watch;

use std::{collections::HashSet, path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result};
use beadsync_core::{
    cli::{resolve_workspace_root, BdClient, TokioExecutor},
    config::{load_config, Config},
    store::{
        CliLoader, Snapshot, SnapshotStore, WatchAdapter, WatchHandle, WatchListener,
        WorkspaceTarget,
    },
    Item,
};
use clap::ArgMatches;
use serde::Serialize;

/// Resolved configuration, bd client and workspace targets for one run.
pub struct Context {
    pub config: Config,
    pub client: BdClient,
    pub targets: Vec<WorkspaceTarget>,
}

impl Context {
    /// Load configuration and apply global command-line flags on top.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = load_config()?;

        if let Some(bd) = matches.get_one::<String>("bd") {
            config.cli.bd_path.clone_from(bd);
        }
        if let Some(timeout_ms) = matches.get_one::<u64>("timeout-ms") {
            config.cli.timeout_ms = *timeout_ms;
        }
        if let Some(retries) = matches.get_one::<u32>("retries") {
            config.cli.retry_count = *retries;
        }
        config.validate()?;

        let roots: Vec<PathBuf> = match matches.get_many::<PathBuf>("workspace") {
            Some(paths) => paths.cloned().collect(),
            None if !config.workspaces.is_empty() => config.workspaces.clone(),
            None => vec![std::env::current_dir().context("Failed to get current directory")?],
        };

        let client = BdClient::new(Arc::new(TokioExecutor), config.cli_policy())
            .with_program(config.cli.bd_path.clone());

        let roots = roots.iter().map(|root| resolve_workspace_root(root)).collect();

        Ok(Self {
            config,
            client,
            targets: workspace_targets(roots),
        })
    }

    pub fn store(&self, watcher: Arc<dyn WatchAdapter>) -> SnapshotStore {
        SnapshotStore::new(
            Arc::new(CliLoader::new(self.client.clone())),
            watcher,
            self.config.store_options(),
        )
    }

    /// Load every target once, without watching.
    pub async fn load_once(&self) -> Result<(SnapshotStore, Arc<Snapshot>)> {
        let store = self.store(Arc::new(Unwatched));
        let snapshot = store.refresh(self.targets.clone()).await?;
        Ok((store, snapshot))
    }

    /// Client running bd inside the workspace the item was loaded from.
    pub fn client_for(&self, item: &Item) -> Result<BdClient> {
        let target = item
            .workspace
            .as_deref()
            .and_then(|id| self.targets.iter().find(|t| t.id == id))
            .or_else(|| self.targets.first())
            .ok_or_else(|| anyhow::anyhow!("No workspace configured"))?;
        Ok(self.client.in_workspace(&target.root))
    }
}

/// Targets named after their directory. A name seen twice falls back to
/// the full path.
fn workspace_targets(roots: Vec<PathBuf>) -> Vec<WorkspaceTarget> {
    let mut seen = HashSet::new();
    roots
        .into_iter()
        .map(WorkspaceTarget::from_root)
        .map(|target| {
            if seen.insert(target.id.clone()) {
                target
            } else {
                let id = target.root.display().to_string();
                seen.insert(id.clone());
                WorkspaceTarget::new(id, target.root)
            }
        })
        .collect()
}

/// Watch adapter for one-shot commands.
struct Unwatched;

struct NoHandle;

impl WatchHandle for NoHandle {
    fn release(&mut self) {}
}

impl WatchAdapter for Unwatched {
    fn watch(
        &self,
        _path: &std::path::Path,
        _listener: WatchListener,
    ) -> beadsync_core::Result<Box<dyn WatchHandle>> {
        Ok(Box::new(NoHandle))
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

pub fn find_item<'a>(snapshot: &'a Snapshot, id: &str) -> Result<&'a Item> {
    snapshot
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Unknown issue: {id}"))
}
