//! bd version parsing and compatibility checking

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::Serialize;

/// Version reported by `bd --version`.
///
/// Parsing never fails: text without a `major.minor.patch` triple yields
/// `0.0.0` with the raw input preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub raw: String,
}

impl CliVersion {
    #[must_use]
    pub const fn triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }

    /// Compare major, then minor, then patch.
    #[must_use]
    pub fn is_at_least(&self, minimum: &Self) -> bool {
        self.triple() >= minimum.triple()
    }

    /// True when no version number could be found in the raw text.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.patch == 0
    }
}

impl fmt::Display for CliVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Extract the first `major.minor.patch` triple found anywhere in `raw`.
#[must_use]
pub fn parse_cli_version(raw: &str) -> CliVersion {
    static VERSION_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let version_re = VERSION_RE.get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").ok());

    let parts = version_re
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| {
            let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
            Some((part(1)?, part(2)?, part(3)?))
        });

    let (major, minor, patch) = parts.unwrap_or((0, 0, 0));
    CliVersion {
        major,
        minor,
        patch,
        raw: raw.to_string(),
    }
}

/// Whether `version` is at least `minimum`, both given as raw text.
#[must_use]
pub fn is_cli_version_at_least(version: &str, minimum: &str) -> bool {
    parse_cli_version(version).is_at_least(&parse_cli_version(minimum))
}
