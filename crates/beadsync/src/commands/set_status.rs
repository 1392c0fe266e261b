//! `beadsync set-status` - validated status change

use anyhow::Result;
use beadsync_core::{
    status::{format_status_label, validate_transition},
    IssueStatus,
};
use clap::ArgMatches;
use serde::Serialize;

use super::{check_dep::required, find_item, print_json, Context};

#[derive(Serialize)]
struct StatusChange<'a> {
    id: &'a str,
    from: &'a str,
    to: IssueStatus,
    applied: bool,
}

pub async fn run(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let id = required(matches, "id")?;
    let target = required(matches, "status")?;
    let dry_run = matches.get_flag("dry-run");

    let (_store, snapshot) = ctx.load_once().await?;
    let item = find_item(&snapshot, id)?;

    let next = validate_transition(Some(item.status.as_str()), target)?;
    if !dry_run {
        ctx.client_for(item)?.update_status(id, next).await?;
        tracing::info!(id, status = %next, "Status updated");
    }

    if matches.get_flag("json") {
        return print_json(&StatusChange {
            id,
            from: &item.status,
            to: next,
            applied: !dry_run,
        });
    }

    let verb = if dry_run { "Would move" } else { "Moved" };
    println!(
        "{verb} {id}: {} -> {}",
        format_status_label(&item.status),
        next.label()
    );
    Ok(())
}
