//! `beadsync check-dep` - dependency edge validation

use anyhow::{anyhow, Result};
use beadsync_core::dependency::{
    rejection_message, validate_dependency_edge, DependencyRejection,
};
use clap::ArgMatches;
use serde::Serialize;

use super::{find_item, print_json, Context};

#[derive(Serialize)]
struct DependencyCheck<'a> {
    from: &'a str,
    to: &'a str,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    applied: bool,
}

pub async fn run(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let from = required(matches, "from")?;
    let to = required(matches, "to")?;
    let json = matches.get_flag("json");

    let (_store, snapshot) = ctx.load_once().await?;
    let source = find_item(&snapshot, from)?;
    find_item(&snapshot, to)?;

    let verdict = validate_dependency_edge(snapshot.items(), from, to);
    let apply = verdict.is_ok() && matches.get_flag("apply");
    if apply {
        ctx.client_for(source)?.dep_add(from, to).await?;
        tracing::info!(from, to, "Dependency added");
    }

    if json {
        print_json(&DependencyCheck {
            from,
            to,
            valid: verdict.is_ok(),
            reason: verdict.err().map(DependencyRejection::reason),
            message: verdict.err().map(rejection_message),
            applied: apply,
        })?;
    }

    match verdict {
        Ok(()) => {
            if !json {
                let action = if apply { "Added" } else { "OK:" };
                println!("{action} {from} -> {to}");
            }
            Ok(())
        }
        Err(rejection) => Err(anyhow!(rejection)),
    }
}

pub fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{name} is required"))
}
