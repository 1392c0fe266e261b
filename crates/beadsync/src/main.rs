//! Beadsync CLI - live, merged view over bd issue trackers
//!
//! Binary name: `beadsync`

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::process::ExitCode;

use anyhow::Result;
use beadsync_core::{CliErrorKind, Error as CoreError};
use clap::ArgMatches;

mod cli;
mod commands;

use commands::Context;

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match run_cli(&matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {}", format_error(&e));
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_cli(matches: &ArgMatches) -> Result<()> {
    let ctx = Context::from_matches(matches)?;

    match matches.subcommand() {
        Some(("list", sub_m)) => commands::list::run(&ctx, sub_m).await,
        Some(("watch", sub_m)) => commands::watch::run(&ctx, sub_m).await,
        Some(("check-dep", sub_m)) => commands::check_dep::run(&ctx, sub_m).await,
        Some(("set-status", sub_m)) => commands::set_status::run(&ctx, sub_m).await,
        Some(("version", sub_m)) => commands::version::run(&ctx, sub_m).await,
        _ => Err(anyhow::anyhow!("Use 'beadsync --help' for more information.")),
    }
}

/// Error text with a hint when bd itself is unreachable.
fn format_error(err: &anyhow::Error) -> String {
    let offline = err
        .downcast_ref::<CoreError>()
        .and_then(CoreError::cli_kind)
        .or_else(|| {
            err.downcast_ref::<beadsync_core::CliError>()
                .map(|e| e.kind)
        })
        == Some(CliErrorKind::Offline);

    let text = render_chain(err);
    if offline {
        format!("{text}\n\nbd did not respond. Check that its daemon is running, or raise --timeout-ms.")
    } else {
        text
    }
}

/// Error and its causes on one line, skipping causes already quoted.
fn render_chain(err: &anyhow::Error) -> String {
    err.chain().skip(1).fold(err.to_string(), |text, cause| {
        let cause = cause.to_string();
        if text.contains(&cause) {
            text
        } else {
            format!("{text}: {cause}")
        }
    })
}
