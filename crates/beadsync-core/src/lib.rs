//! # Beadsync Core
//!
//! Hardened access to the bd issue tracker and a live, merged view over
//! several bd workspaces.
//!
//! - [`cli`]: the bd process client (timeouts, retries, offline detection,
//!   argument and error hygiene, version parsing)
//! - [`store`]: the multi-workspace snapshot store with debounced reloads
//! - [`status`] and [`dependency`]: pure validators for status changes and
//!   dependency edges
//! - [`config`]: layered configuration
//!
//! ## Laws (Compiler Enforced)
//!
//! - No `unwrap()` - returns `Result` instead
//! - No `expect()` - returns `Result` instead
//! - No `panic!()` - returns `Result` instead
//! - No `unsafe` - safe Rust only
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. bd failures surface
//! as [`CliError`] with a [`CliErrorKind`] that callers can match on.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cli;
pub mod config;
pub mod dependency;
mod error;
pub mod item;
pub mod status;
pub mod store;

pub use error::{CliError, CliErrorKind, Error, Result};
pub use item::Item;
pub use status::IssueStatus;
