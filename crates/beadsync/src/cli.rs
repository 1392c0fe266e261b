//! CLI command definitions using `clap`

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

pub fn after_help_text(examples: &[&str]) -> String {
    let mut text = String::from("EXAMPLES:\n");
    for example in examples {
        text.push_str("  ");
        text.push_str(example);
        text.push('\n');
    }
    text
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

pub fn cmd_list() -> ClapCommand {
    ClapCommand::new("list")
        .about("List issues from every workspace, merged and ordered by id")
        .arg(
            Arg::new("stale")
                .long("stale")
                .action(ArgAction::SetTrue)
                .help("Only in-progress issues older than the stale threshold"),
        )
        .arg(
            Arg::new("group")
                .long("group")
                .action(ArgAction::SetTrue)
                .conflicts_with("json")
                .help("Group issues by status"),
        )
        .arg(json_arg())
        .after_help(after_help_text(&[
            "beadsync list                         All issues in the current workspace",
            "beadsync -w ../api -w ../web list     Merge two workspaces",
            "beadsync list --stale                 Work that has been in progress too long",
        ]))
}

pub fn cmd_watch() -> ClapCommand {
    ClapCommand::new("watch")
        .about("Keep the merged view live and print a summary on every change")
        .arg(json_arg())
}

pub fn cmd_check_dep() -> ClapCommand {
    ClapCommand::new("check-dep")
        .about("Check whether FROM may depend on TO")
        .arg(Arg::new("from").required(true).help("Issue that would gain the dependency"))
        .arg(Arg::new("to").required(true).help("Issue it would depend on"))
        .arg(
            Arg::new("apply")
                .long("apply")
                .action(ArgAction::SetTrue)
                .help("Add the dependency with bd when it is valid"),
        )
        .arg(json_arg())
        .after_help(after_help_text(&[
            "beadsync check-dep bd-4 bd-2          Would bd-4 -> bd-2 be accepted?",
            "beadsync check-dep bd-4 bd-2 --apply  Validate, then run bd dep add",
        ]))
}

pub fn cmd_set_status() -> ClapCommand {
    ClapCommand::new("set-status")
        .about("Validate and apply a status change")
        .arg(Arg::new("id").required(true).help("Issue to update"))
        .arg(
            Arg::new("status")
                .required(true)
                .help("Target status: open, in_progress, blocked or closed"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Validate without running bd update"),
        )
        .arg(json_arg())
}

pub fn cmd_version() -> ClapCommand {
    ClapCommand::new("version")
        .about("Show the installed bd version")
        .arg(
            Arg::new("at-least")
                .long("at-least")
                .value_name("VERSION")
                .help("Fail unless bd is at least this version"),
        )
        .arg(json_arg())
}

pub fn build_cli() -> ClapCommand {
    ClapCommand::new("beadsync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live, merged view over bd issue trackers")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("workspace")
                .short('w')
                .long("workspace")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .action(ArgAction::Append)
                .global(true)
                .help("Workspace root to load (repeatable; defaults to config or current dir)"),
        )
        .arg(
            Arg::new("bd")
                .long("bd")
                .value_name("PATH")
                .global(true)
                .help("bd program to run"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .global(true)
                .help("Per-attempt timeout for bd calls"),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .global(true)
                .help("Retries for transient bd failures"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Debug logging on stderr"),
        )
        .subcommand(cmd_list())
        .subcommand(cmd_watch())
        .subcommand(cmd_check_dep())
        .subcommand(cmd_set_status())
        .subcommand(cmd_version())
}
