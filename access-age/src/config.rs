use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Which line-scanning strategy decides validity and extracts the interval.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    /// Plain substring markers, `since=`/`until=` picked out anywhere in the line.
    #[default]
    Markers,
    /// Markers plus a decoded query string on the request URL.
    Query,
}

/// What an unreadable log file does to the rest of its host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Report the file and keep aggregating the host's other files.
    #[default]
    Partial,
    /// Abort on the first unreadable file.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_root: PathBuf,
    pub markers: Vec<String>,
    pub parser: ParserKind,
    pub policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_root: PathBuf::from("logs"),
            markers: default_markers(),
            parser: ParserKind::default(),
            policy: FailurePolicy::default(),
        }
    }
}

pub fn default_markers() -> Vec<String> {
    ["RP: GET", "mentions/search/", "since"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
        let config = serde_json::from_str(&raw).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded config file");
        Ok(config)
    }
}
