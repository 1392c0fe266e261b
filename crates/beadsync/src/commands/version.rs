//! `beadsync version` - installed bd version

use anyhow::{bail, Result};
use beadsync_core::cli::parse_cli_version;
use clap::ArgMatches;
use serde::Serialize;

use super::{print_json, Context};

#[derive(Serialize)]
struct VersionReport {
    version: String,
    raw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    satisfies: Option<bool>,
}

pub async fn run(ctx: &Context, matches: &ArgMatches) -> Result<()> {
    let installed = ctx.client.version().await?;
    let minimum = matches.get_one::<String>("at-least").map(|v| parse_cli_version(v));
    let satisfies = minimum.as_ref().map(|min| installed.is_at_least(min));

    if matches.get_flag("json") {
        print_json(&VersionReport {
            version: installed.to_string(),
            raw: installed.raw.trim().to_string(),
            satisfies,
        })?;
    } else {
        println!("bd {installed}");
    }

    match (minimum, satisfies) {
        (Some(min), Some(false)) => bail!("bd {installed} is older than required {min}"),
        _ => Ok(()),
    }
}
