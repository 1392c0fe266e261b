//! Process execution capability
//!
//! The client never spawns processes directly. It goes through a
//! [`ProcessExecutor`], so tests can script outcomes without a real bd
//! binary. [`TokioExecutor`] is the production implementation.

use std::{io, path::Path, process::Stdio};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::error::CliErrorKind;

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Why an invocation did not produce output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecFailure {
    /// Spawning or waiting failed at the OS level.
    #[error("{message}")]
    Io { kind: io::ErrorKind, message: String },

    /// The process ran and exited unsuccessfully.
    #[error("exited with status {}: {}", .code.map_or_else(|| "unknown".to_string(), |c| c.to_string()), .stderr.trim())]
    Exit {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl ExecFailure {
    pub fn io(kind: io::ErrorKind, message: impl Into<String>) -> Self {
        Self::Io {
            kind,
            message: message.into(),
        }
    }

    /// Map to the client's error taxonomy.
    #[must_use]
    pub const fn classify(&self) -> CliErrorKind {
        match self {
            Self::Io { kind, .. } => match kind {
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::Interrupted
                | io::ErrorKind::WouldBlock => CliErrorKind::Transient,
                io::ErrorKind::TimedOut => CliErrorKind::Timeout,
                _ => CliErrorKind::Fatal,
            },
            Self::Exit { .. } => CliErrorKind::Fatal,
        }
    }
}

impl From<io::Error> for ExecFailure {
    fn from(err: io::Error) -> Self {
        Self::io(err.kind(), err.to_string())
    }
}

/// Capability to run one external command to completion.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ExecFailure>;
}

/// Executor backed by `tokio::process`.
///
/// Children are killed when the wait is dropped, so an attempt cancelled
/// by a timeout does not leave a process behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioExecutor;

#[async_trait]
impl ProcessExecutor for TokioExecutor {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<ProcessOutput, ExecFailure> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ExecFailure::io(e.kind(), format!("'{program}' is not installed or not in PATH"))
            } else {
                ExecFailure::from(e)
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            Ok(ProcessOutput { stdout, stderr })
        } else {
            Err(ExecFailure::Exit {
                code: output.status.code(),
                stdout,
                stderr,
            })
        }
    }
}
