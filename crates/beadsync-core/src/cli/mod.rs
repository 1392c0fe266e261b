//! bd command-line client
//!
//! - `args`: argument validation and error-message scrubbing
//! - `policy`: timeout/retry/offline configuration
//! - `exec`: injectable process execution capability
//! - `client`: the retrying, classifying client and its command wrappers
//! - `version`: `bd --version` parsing and comparison

mod args;
mod client;
mod exec;
mod policy;
mod version;

pub use args::{
    build_safe_bd_args, resolve_workspace_root, sanitize_message, workspace_path_forms,
    WORKSPACE_PLACEHOLDER,
};
pub use client::{extract_created_id, parse_items, BdClient, DEFAULT_BD_PROGRAM};
pub use exec::{ExecFailure, ProcessExecutor, ProcessOutput, TokioExecutor};
pub use policy::CliPolicy;
pub use version::{is_cli_version_at_least, parse_cli_version, CliVersion};
