//! `beadsync list` - merged issue listing

use anyhow::Result;
use beadsync_core::{status::format_status_label, store::Snapshot, Item};
use clap::ArgMatches;

use super::{print_json, Context};

pub async fn run(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let (store, snapshot) = ctx.load_once().await?;

    if matches.get_flag("stale") {
        let stale = store.get_stale_items();
        if matches.get_flag("json") {
            return print_json(&stale);
        }
        if stale.is_empty() {
            println!(
                "No issues in progress for more than {}h",
                ctx.config.store.stale_threshold_hours
            );
        }
        stale.iter().for_each(print_item);
        return Ok(());
    }

    if matches.get_flag("json") {
        return print_json(&snapshot.items());
    }

    if matches.get_flag("group") {
        print_grouped(&snapshot);
    } else {
        snapshot.items().iter().for_each(print_item);
    }
    println!();
    println!("{}", summary_line(&snapshot));
    Ok(())
}

pub fn print_item(item: &Item) {
    let workspace = item
        .workspace
        .as_deref()
        .map(|ws| format!("  [{ws}]"))
        .unwrap_or_default();
    println!(
        "{:<14} {:<12} {}{workspace}",
        item.id,
        format_status_label(&item.status),
        item.title
    );
}

fn print_grouped(snapshot: &Snapshot) {
    for (status, items) in snapshot.grouped_by_status() {
        let heading = status.map_or_else(|| "Other".to_string(), |s| s.label());
        println!("{heading} ({})", items.len());
        items.iter().for_each(|item| {
            print!("  ");
            print_item(item);
        });
    }
}

pub fn summary_line(snapshot: &Snapshot) -> String {
    let counts = snapshot.count_by_status();
    format!(
        "{} issues: {} open, {} in progress, {} blocked, {} closed",
        counts.total(),
        counts.open,
        counts.in_progress,
        counts.blocked,
        counts.closed
    )
}
