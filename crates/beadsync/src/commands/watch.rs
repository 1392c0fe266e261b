//! `beadsync watch` - live summary until interrupted

use std::sync::Arc;

use anyhow::{bail, Result};
use beadsync_core::store::{NotifyWatchAdapter, Snapshot, SnapshotStore};
use clap::ArgMatches;
use serde::Serialize;

use super::{list::summary_line, print_json, Context};

#[derive(Serialize)]
struct WatchUpdate {
    /// RFC 3339
    loaded_at: Option<String>,
    items: usize,
    stale: Vec<String>,
}

pub async fn run(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    if !ctx.config.store.watch_enabled {
        bail!("Watching is disabled in configuration (store.watch_enabled = false)");
    }

    let json = matches.get_flag("json");
    let store = ctx.store(Arc::new(NotifyWatchAdapter));
    let mut updates = store.subscribe();

    let snapshot = store.refresh(ctx.targets.clone()).await?;
    updates.mark_unchanged();
    report(&store, &snapshot, json)?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = Arc::clone(&updates.borrow_and_update());
                report(&store, &snapshot, json)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    store.dispose();
    Ok(())
}

fn report(store: &SnapshotStore, snapshot: &Snapshot, json: bool) -> Result<()> {
    let stale: Vec<String> = store
        .get_stale_items()
        .into_iter()
        .map(|item| item.id)
        .collect();

    if json {
        return print_json(&WatchUpdate {
            loaded_at: snapshot.loaded_at().map(|at| at.to_rfc3339()),
            items: snapshot.len(),
            stale,
        });
    }

    println!("{}", summary_line(snapshot));
    if !stale.is_empty() {
        println!("  stale: {}", stale.join(", "));
    }
    Ok(())
}
