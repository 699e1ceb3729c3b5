//! Finding hosts and their log files under the log root. Every sub-directory
//! of the root is one host; every regular file in it is one log source.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::invariants::Hostname;

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Host directories under `log_root`, sorted by name. Hidden entries and
/// not-yet-extracted `.tgz` archives are skipped.
pub fn discover_hosts(log_root: &Path) -> Result<Vec<Hostname>> {
    let entries = fs::read_dir(log_root).map_err(|source| Error::LogRoot {
        path: log_root.to_path_buf(),
        source,
    })?;
    let mut hosts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::LogRoot {
            path: log_root.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) || name.ends_with(".tgz") || !entry.path().is_dir() {
            continue;
        }
        hosts.push(Hostname::from(name));
    }
    hosts.sort();
    info!(log_root = %log_root.display(), hosts = hosts.len(), "discovered hosts");
    Ok(hosts)
}

/// Hosts matched by any of `patterns`, each an unanchored regex, in discovery
/// order. Fails if a pattern matches nothing.
pub fn match_hosts(available: &[Hostname], patterns: &[String]) -> Result<Vec<Hostname>> {
    let mut matched: Vec<Hostname> = Vec::new();
    let mut unmatched = Vec::new();
    for pattern in patterns {
        let regex = Regex::new(pattern).map_err(|source| Error::HostPattern {
            pattern: pattern.clone(),
            source,
        })?;
        let hits: Vec<_> = available
            .iter()
            .filter(|host| regex.is_match(host.as_str()))
            .collect();
        if hits.is_empty() {
            unmatched.push(pattern.clone());
        }
        for host in hits {
            if !matched.contains(host) {
                matched.push(host.clone());
            }
        }
    }
    if !unmatched.is_empty() {
        return Err(Error::UnmatchedHosts {
            patterns: unmatched,
            available: available.iter().map(ToString::to_string).collect(),
        });
    }
    // keep discovery order regardless of pattern order
    matched.sort_by_key(|host| available.iter().position(|h| h == host));
    Ok(matched)
}

/// Log files of one host directory, sorted by path. Symlinks count unless
/// they point at a directory.
pub fn list_sources(host_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(host_dir).map_err(|source| Error::io(host_dir, source))?;
    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::io(host_dir, source))?;
        let name = entry.file_name();
        if is_hidden(&name.to_string_lossy()) {
            continue;
        }
        let file_type = entry
            .file_type()
            .map_err(|source| Error::io(entry.path(), source))?;
        let path = entry.path();
        // a dangling link is still listed so reading it fails loudly
        if file_type.is_file() || (file_type.is_symlink() && !path.is_dir()) {
            sources.push(path);
        }
    }
    sources.sort();
    debug!(host_dir = %host_dir.display(), sources = sources.len(), "listed log sources");
    Ok(sources)
}
