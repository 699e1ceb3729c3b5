pub mod analytics;
pub mod config;
pub mod error;
pub mod histogram;
pub mod ingest;
pub mod invariants;
pub mod models;
pub mod parser;
pub mod prometheus;
pub mod report;

use tracing::info;

pub use analytics::{HostLogs, HostSummary};
pub use config::{Config, FailurePolicy, ParserKind};
pub use error::{Error, Result};
pub use histogram::LogHistogramBuilder;
pub use invariants::{Hostname, RequestDate};
pub use models::{BucketVector, DayHistogram};
pub use parser::EntryParser;

/// Summarizes every host under the log root matched by `patterns`, or every
/// host when `patterns` is empty.
pub fn run(config: &Config, patterns: &[String]) -> Result<Vec<HostSummary>> {
    let available = ingest::discover_hosts(&config.log_root)?;
    let hosts = if patterns.is_empty() {
        available
    } else {
        ingest::match_hosts(&available, patterns)?
    };
    info!(hosts = ?hosts, parser = ?config.parser, policy = ?config.policy, "starting analysis");

    let parser = parser::from_config(config);
    let builder = LogHistogramBuilder::new(parser.as_ref());
    hosts
        .into_iter()
        .map(|host| HostLogs::new(&config.log_root, host).summarize(&builder, config.policy))
        .collect()
}
