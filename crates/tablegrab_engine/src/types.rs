use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;

/// The shared fallback profile name used when nothing more specific is set.
pub const DEFAULT_PROFILE: &str = "general";

/// Names the configuration profile to use for each extraction phase, plus
/// the ordinal position of the wanted table among the matches.
///
/// An empty name for a phase means "skip this phase" (see
/// [`Resolution::ProfileSkipped`](crate::Resolution::ProfileSkipped)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProfile {
    pub table: String,
    pub table_index: usize,
    pub header: String,
    pub body: String,
    pub row: String,
    pub column: String,
}

impl Default for TableProfile {
    fn default() -> Self {
        Self {
            table: DEFAULT_PROFILE.to_string(),
            table_index: 0,
            header: DEFAULT_PROFILE.to_string(),
            body: DEFAULT_PROFILE.to_string(),
            row: DEFAULT_PROFILE.to_string(),
            column: DEFAULT_PROFILE.to_string(),
        }
    }
}

impl TableProfile {
    /// All five phase names set to `name`, table ordinal set to `index`.
    ///
    /// Panics if `name` is shorter than two characters; single characters
    /// are indistinguishable from typos and the empty string is the skip
    /// sentinel.
    pub fn named(name: &str, index: usize) -> Self {
        assert!(
            name.len() >= 2,
            "profile name must be at least two characters, got {name:?}"
        );
        Self {
            table: name.to_string(),
            table_index: index,
            header: name.to_string(),
            body: name.to_string(),
            row: name.to_string(),
            column: name.to_string(),
        }
    }
}

/// A row-oriented extraction result. Built fresh per call; the engine never
/// touches it again after returning it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// Column names from the header region, if one was found and non-empty.
    pub columns: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Timeout,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Hard failures of an extraction call.
///
/// Transient misses (page unavailable, table absent) are not errors; they
/// come back as `Ok(None)` with a logged warning.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("selector config error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::{TableProfile, DEFAULT_PROFILE};

    #[test]
    fn default_profile_uses_the_shared_sentinel() {
        let profile = TableProfile::default();
        assert_eq!(profile.table, DEFAULT_PROFILE);
        assert_eq!(profile.header, DEFAULT_PROFILE);
        assert_eq!(profile.body, DEFAULT_PROFILE);
        assert_eq!(profile.row, DEFAULT_PROFILE);
        assert_eq!(profile.column, DEFAULT_PROFILE);
        assert_eq!(profile.table_index, 0);
    }

    #[test]
    fn named_profile_sets_every_phase() {
        let profile = TableProfile::named("zerodha", 3);
        assert_eq!(profile.table, "zerodha");
        assert_eq!(profile.column, "zerodha");
        assert_eq!(profile.table_index, 3);
    }

    #[test]
    #[should_panic(expected = "at least two characters")]
    fn one_character_profile_name_is_rejected() {
        let _ = TableProfile::named("x", 0);
    }
}
