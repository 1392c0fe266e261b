//! Argument and message hygiene for bd invocations
//!
//! Arguments are checked before any process is spawned. Error text is
//! scrubbed of workspace paths before it leaves the client.

use std::path::{Component, Path, PathBuf};

use crate::error::CliError;

/// Replacement for a workspace path found in error text.
pub const WORKSPACE_PLACEHOLDER: &str = "<workspace>";

/// Validate and copy an argument vector for bd.
///
/// Rejects blank arguments and arguments containing line breaks, which
/// would let one argument smuggle a second command line into the tool.
pub fn build_safe_bd_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<String>, CliError> {
    args.iter()
        .enumerate()
        .map(|(position, arg)| {
            let arg = arg.as_ref();
            if arg.trim().is_empty() {
                return Err(CliError::invalid_argument(format!(
                    "bd argument {position} cannot be empty"
                )));
            }
            if arg.contains(['\n', '\r']) {
                return Err(CliError::invalid_argument(format!(
                    "bd argument {position} must not contain newlines"
                )));
            }
            Ok(arg.to_string())
        })
        .collect()
}

/// Remove every occurrence of the given paths from `message`.
///
/// Longer paths are replaced first so a nested workspace is not left
/// half-redacted by its parent.
#[must_use]
pub fn sanitize_message(message: &str, paths: &[PathBuf]) -> String {
    let mut needles: Vec<String> = paths
        .iter()
        .filter_map(|p| path_text(p.as_path()))
        .collect();
    needles.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    needles.dedup();

    needles
        .iter()
        .fold(message.to_string(), |acc, needle| {
            acc.replace(needle.as_str(), WORKSPACE_PLACEHOLDER)
        })
}

/// Absolute form of a workspace root.
///
/// Prefers the canonical path; a root that does not exist yet is joined
/// onto the current directory and normalized lexically.
#[must_use]
pub fn resolve_workspace_root(root: &Path) -> PathBuf {
    root.canonicalize()
        .ok()
        .or_else(|| lexical_absolute(root))
        .unwrap_or_else(|| root.to_path_buf())
}

/// Every spelling of `root` that may show up in bd's output: as given,
/// joined onto the current directory, and canonical.
#[must_use]
pub fn workspace_path_forms(root: &Path) -> Vec<PathBuf> {
    let mut forms = vec![root.to_path_buf()];
    forms.extend(lexical_absolute(root));
    forms.extend(root.canonicalize().ok());
    forms.dedup();
    forms
}

fn lexical_absolute(root: &Path) -> Option<PathBuf> {
    let joined = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(root)
    };
    Some(
        joined
            .components()
            .fold(PathBuf::new(), |mut out, component| {
                match component {
                    Component::ParentDir => {
                        out.pop();
                    }
                    Component::CurDir => {}
                    other => out.push(other.as_os_str()),
                }
                out
            }),
    )
}

/// Path as it would appear in tool output, without a trailing separator.
/// The filesystem root and empty paths are never redacted.
fn path_text(path: &Path) -> Option<String> {
    let text = path.to_string_lossy();
    let trimmed = text.trim().trim_end_matches(std::path::MAIN_SEPARATOR);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
