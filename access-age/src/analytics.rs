use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::FailurePolicy;
use crate::error::{Error, Result};
use crate::histogram::LogHistogramBuilder;
use crate::ingest::list_sources;
use crate::invariants::{Hostname, RequestDate};
use crate::models::{BucketVector, DayHistogram};

/// All of one host's log sources merged into a single day map.
pub type HostHistogram = DayHistogram;

/// Sums day maps; vectors add pointwise when two maps share a day.
pub fn merge<I>(histograms: I) -> HostHistogram
where
    I: IntoIterator<Item = DayHistogram>,
{
    let mut merged = HostHistogram::new();
    for histogram in histograms {
        for (date, vector) in histogram {
            *merged.entry(date).or_default() += &vector;
        }
    }
    merged
}

/// Requests per age band, all days combined.
pub fn totals_by_bucket(histogram: &HostHistogram) -> BucketVector {
    histogram.values().sum()
}

/// Requests per day, all age bands combined.
pub fn totals_by_day(histogram: &HostHistogram) -> BTreeMap<RequestDate, u64> {
    histogram
        .iter()
        .map(|(date, vector)| (date.clone(), vector.total()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub path: PathBuf,
    pub error: String,
}

/// What downstream reporting gets for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSummary {
    pub host: Hostname,
    pub by_bucket: BucketVector,
    pub by_day: BTreeMap<RequestDate, u64>,
    pub sources_read: usize,
    pub failures: Vec<SourceFailure>,
}

impl HostSummary {
    pub fn new(host: Hostname, histogram: &HostHistogram) -> Self {
        Self {
            host,
            by_bucket: totals_by_bucket(histogram),
            by_day: totals_by_day(histogram),
            sources_read: 0,
            failures: Vec::new(),
        }
    }

    pub fn total(&self) -> u64 {
        self.by_bucket.total()
    }
}

/// One host directory under the log root.
#[derive(Debug, Clone)]
pub struct HostLogs {
    host: Hostname,
    dir: PathBuf,
}

impl HostLogs {
    pub fn new(log_root: &Path, host: Hostname) -> Self {
        let dir = log_root.join(host.as_str());
        Self { host, dir }
    }

    /// Runs the builder over every log file of the host and merges the
    /// results. Unreadable files are handled per `policy`; content errors
    /// always abort.
    pub fn summarize(
        &self,
        builder: &LogHistogramBuilder<'_>,
        policy: FailurePolicy,
    ) -> Result<HostSummary> {
        let mut histograms = Vec::new();
        let mut failures = Vec::new();
        for path in list_sources(&self.dir)? {
            match builder.compute_file(&path) {
                Ok(histogram) => histograms.push(histogram),
                Err(err) if err.is_io() && policy == FailurePolicy::Partial => {
                    warn!(host = %self.host, path = %path.display(), error = %err, "skipping unreadable log source");
                    failures.push(SourceFailure {
                        path,
                        error: error_chain(&err),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let sources_read = histograms.len();
        let histogram = merge(histograms);
        let mut summary = HostSummary::new(self.host.clone(), &histogram);
        summary.sources_read = sources_read;
        summary.failures = failures;
        info!(
            host = %self.host,
            sources = sources_read,
            failed = summary.failures.len(),
            days = summary.by_day.len(),
            requests = summary.total(),
            "aggregated host"
        );
        Ok(summary)
    }
}

fn error_chain(err: &Error) -> String {
    let mut message = err.to_string();
    let mut source = StdError::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
