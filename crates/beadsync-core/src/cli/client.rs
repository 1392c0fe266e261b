//! Hardened bd process client
//!
//! Every call goes through [`BdClient::run`]:
//!
//! 1. Arguments are validated ([`build_safe_bd_args`]); failures never
//!    reach a process and are never retried.
//! 2. Each attempt is bounded by the policy timeout.
//! 3. Retryable failures (transient errors, timeouts) are retried up to
//!    `retry_count` more times with `retry_backoff_ms` between attempts.
//! 4. A final timeout after more than `offline_threshold_ms` of cumulative
//!    time is reported as [`CliErrorKind::Offline`].
//! 5. Workspace paths are scrubbed from the message of whatever error
//!    comes out.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    time::Duration,
};

use regex::Regex;
use serde::Deserialize;
use tokio::time::Instant;

use super::{
    args::{build_safe_bd_args, resolve_workspace_root, sanitize_message, workspace_path_forms},
    exec::{ProcessExecutor, ProcessOutput},
    policy::CliPolicy,
    version::{parse_cli_version, CliVersion},
};
use crate::{
    error::{CliError, CliErrorKind},
    item::Item,
    status::IssueStatus,
};

/// Default program name for the tracker CLI.
pub const DEFAULT_BD_PROGRAM: &str = "bd";

/// Client for the bd command-line tracker.
///
/// Cheap to clone; clones share the executor.
#[derive(Clone)]
pub struct BdClient {
    executor: Arc<dyn ProcessExecutor>,
    policy: CliPolicy,
    program: String,
    cwd: Option<PathBuf>,
    redacted_paths: Vec<PathBuf>,
}

impl std::fmt::Debug for BdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BdClient")
            .field("policy", &self.policy)
            .field("program", &self.program)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

impl BdClient {
    pub fn new(executor: Arc<dyn ProcessExecutor>, policy: CliPolicy) -> Self {
        Self {
            executor,
            policy,
            program: DEFAULT_BD_PROGRAM.to_string(),
            cwd: None,
            redacted_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Paths that must never appear in surfaced error messages.
    #[must_use]
    pub fn with_redacted_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.redacted_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// A client running bd inside `root`. The root is redacted from errors
    /// in its given, absolute and canonical spellings.
    #[must_use]
    pub fn in_workspace(&self, root: &Path) -> Self {
        let mut client = self.clone().with_redacted_paths(workspace_path_forms(root));
        client.cwd = Some(resolve_workspace_root(root));
        client
    }

    pub const fn policy(&self) -> &CliPolicy {
        &self.policy
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CORE INVOCATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Run bd once with the policy's timeout, retry and offline rules.
    pub async fn run<S: AsRef<str>>(&self, args: &[S]) -> Result<ProcessOutput, CliError> {
        let args = build_safe_bd_args(args).map_err(|e| self.sanitize(e))?;
        let command = args.first().map_or("", String::as_str);
        let started = Instant::now();
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 1;

        loop {
            tracing::debug!(command, attempt, "invoking bd");

            let err = match self.attempt(&args).await {
                Ok(output) => return Ok(output),
                Err(err) => err,
            };

            if !err.kind.is_retryable() || attempt >= max_attempts {
                return Err(self.finalize(err, started.elapsed()));
            }

            tracing::warn!(
                command,
                attempt,
                kind = %err.kind,
                backoff_ms = self.policy.retry_backoff_ms,
                "bd attempt failed, retrying"
            );
            tokio::time::sleep(self.policy.retry_backoff()).await;
            attempt = attempt.saturating_add(1);
        }
    }

    async fn attempt(&self, args: &[String]) -> Result<ProcessOutput, CliError> {
        let command = args.first().map_or("", String::as_str);
        let execution = self
            .executor
            .execute(&self.program, args, self.cwd.as_deref());

        match tokio::time::timeout(self.policy.timeout(), execution).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(failure)) => Err(CliError::new(
                failure.classify(),
                format!("bd {command} failed: {failure}"),
            )),
            Err(_) => Err(CliError::timeout(format!(
                "bd {command} timed out after {} ms",
                self.policy.timeout_ms
            ))),
        }
    }

    fn finalize(&self, err: CliError, elapsed: Duration) -> CliError {
        let err = if err.kind == CliErrorKind::Timeout && elapsed > self.policy.offline_threshold()
        {
            tracing::warn!(
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                threshold_ms = self.policy.offline_threshold_ms,
                "bd unresponsive past offline threshold"
            );
            err.reclassify(CliErrorKind::Offline)
                .map_message(|m| format!("bd appears to be offline: {m}"))
        } else {
            err
        };
        self.sanitize(err)
    }

    fn sanitize(&self, err: CliError) -> CliError {
        err.map_message(|m| sanitize_message(&m, &self.redacted_paths))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // COMMAND WRAPPERS
    // ═══════════════════════════════════════════════════════════════════════

    /// `bd list --json` as raw JSON. `null` output is returned as `Null`.
    pub async fn list_json(&self) -> Result<serde_json::Value, CliError> {
        let output = self.run(&["list", "--json"]).await?;
        let text = output.stdout.trim();
        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(text).map_err(|e| {
            self.sanitize(CliError::fatal(format!(
                "bd list returned invalid JSON: {e}"
            )))
        })
    }

    /// All items in the current workspace.
    pub async fn list(&self) -> Result<Vec<Item>, CliError> {
        let raw = self.list_json().await?;
        parse_items(raw).map_err(|e| self.sanitize(e))
    }

    /// Create an issue and return its new identifier.
    pub async fn create(&self, title: &str, priority: Option<u8>) -> Result<String, CliError> {
        let mut args = vec!["create".to_string(), title.to_string()];
        if let Some(p) = priority {
            args.extend(["--priority".to_string(), p.to_string()]);
        }
        let output = self.run(&args).await?;
        extract_created_id(&output.stdout).ok_or_else(|| {
            self.sanitize(CliError::fatal(format!(
                "bd create did not report an issue id: {}",
                output.stdout.trim()
            )))
        })
    }

    pub async fn update_status(&self, id: &str, status: IssueStatus) -> Result<(), CliError> {
        self.run(&["update", id, "--status", status.as_ref()])
            .await
            .map(drop)
    }

    pub async fn add_label(&self, id: &str, label: &str) -> Result<(), CliError> {
        self.run(&["label", "add", id, label]).await.map(drop)
    }

    pub async fn remove_label(&self, id: &str, label: &str) -> Result<(), CliError> {
        self.run(&["label", "remove", id, label]).await.map(drop)
    }

    pub async fn close(&self, id: &str) -> Result<(), CliError> {
        self.run(&["close", id]).await.map(drop)
    }

    /// Add the dependency edge `from -> to`.
    pub async fn dep_add(&self, from: &str, to: &str) -> Result<(), CliError> {
        self.run(&["dep", "add", from, to]).await.map(drop)
    }

    /// Free-text statistics as printed by `bd stats`.
    pub async fn stats(&self) -> Result<String, CliError> {
        self.run(&["stats"]).await.map(|out| out.stdout)
    }

    /// Single item via `bd show <id> --json`.
    pub async fn show(&self, id: &str) -> Result<Item, CliError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ShowOutput {
            Many(Vec<Item>),
            One(Item),
        }

        let output = self.run(&["show", id, "--json"]).await?;
        let parsed: ShowOutput = serde_json::from_str(output.stdout.trim()).map_err(|e| {
            self.sanitize(CliError::fatal(format!("bd show returned invalid JSON: {e}")))
        })?;
        match parsed {
            ShowOutput::One(item) => Ok(item),
            ShowOutput::Many(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| CliError::fatal(format!("bd show returned no issue for {id}"))),
        }
    }

    pub async fn version(&self) -> Result<CliVersion, CliError> {
        self.run(&["--version"])
            .await
            .map(|out| parse_cli_version(&out.stdout))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OUTPUT PARSING
// ═══════════════════════════════════════════════════════════════════════════

/// Items from `bd list --json` output; an array or `null`.
pub fn parse_items(raw: serde_json::Value) -> Result<Vec<Item>, CliError> {
    serde_json::from_value::<Option<Vec<Item>>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|e| CliError::fatal(format!("bd list returned unexpected items: {e}")))
}

/// Identifier from a `Created issue: <ID>` line.
#[must_use]
pub fn extract_created_id(stdout: &str) -> Option<String> {
    static CREATED_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let created_re =
        CREATED_RE.get_or_init(|| Regex::new(r"Created issue:\s*([A-Za-z0-9][\w.-]*)").ok());

    created_re
        .as_ref()
        .and_then(|re| re.captures(stdout))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
