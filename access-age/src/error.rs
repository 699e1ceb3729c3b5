use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A line passed the entry filter but its date token is not `dd/Mon/yyyy`.
    #[error("unparseable request date `{date}`")]
    InvalidDate {
        date: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("request date `{date}` is too close to the start of the calendar")]
    DateOutOfRange { date: String },

    /// The local clock skips midnight on this day (DST gap).
    #[error("local midnight does not exist on {date}")]
    NonexistentMidnight { date: NaiveDate },

    /// A line passed every validity check but its `since` is not a number.
    #[error("unparseable since value `{value}` logged on {date}")]
    InvalidSince {
        date: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("failed to read log source {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log root {path} is not a readable directory")]
    LogRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid host pattern `{pattern}`")]
    HostPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no host matches {patterns:?}; available hosts: {}", .available.join(", "))]
    UnmatchedHosts {
        patterns: Vec<String>,
        available: Vec<String>,
    },

    #[error("invalid config file {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from reading a source rather than from its content.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
