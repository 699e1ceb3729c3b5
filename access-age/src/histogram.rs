use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::Days;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::invariants::{RequestDate, local_midnight};
use crate::models::{
    AccessInterval, BAND_COUNT, BAND_WIDTH_DAYS, BucketVector, DayHistogram, OVERFLOW_INDEX,
};
use crate::parser::EntryParser;

/// Epoch seconds of local midnight 5, 10, ... 90 days before the request day,
/// closest first.
pub type Thresholds = [f64; BAND_COUNT];

/// Turns the lines of one log source into a per-day histogram.
pub struct LogHistogramBuilder<'a> {
    parser: &'a dyn EntryParser,
}

impl<'a> LogHistogramBuilder<'a> {
    pub fn new(parser: &'a dyn EntryParser) -> Self {
        Self { parser }
    }

    pub fn group_by_day<I, S>(&self, lines: I) -> Result<HashMap<RequestDate, Vec<AccessInterval>>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_day: HashMap<RequestDate, Vec<AccessInterval>> = HashMap::new();
        let mut skipped_entries = 0usize;
        let mut skipped_intervals = 0usize;
        for line in lines {
            let line = line.as_ref();
            if !self.parser.is_entry_valid(line) {
                skipped_entries += 1;
                continue;
            }
            let date = self.parser.parse_date(line);
            let interval = self.parser.parse_interval(line)?;
            if !self.parser.is_interval_valid(&interval) {
                skipped_intervals += 1;
                continue;
            }
            let Some(interval) = interval.into_access() else {
                skipped_intervals += 1;
                continue;
            };
            by_day.entry(date).or_default().push(interval);
        }
        trace!(skipped_entries, skipped_intervals, "grouped entries by day");
        Ok(by_day)
    }

    pub fn compute<I, S>(&self, lines: I) -> Result<DayHistogram>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.group_by_day(lines)?
            .into_iter()
            .map(|(date, intervals)| {
                let thresholds = age_thresholds(&date)?;
                let vector = bucket(&date, &thresholds, &intervals)?;
                Ok((date, vector))
            })
            .collect()
    }

    /// Reads the whole file into memory, then runs [`Self::compute`] on it.
    /// Bytes that are not UTF-8 are replaced, so only failing to open or read
    /// the file is an I/O error.
    pub fn compute_file(&self, path: &Path) -> Result<DayHistogram> {
        let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
        let content = String::from_utf8_lossy(&bytes);
        let histogram = self.compute(content.lines())?;
        debug!(
            path = %path.display(),
            days = histogram.len(),
            entries = histogram.values().map(BucketVector::total).sum::<u64>(),
            "computed log source histogram"
        );
        Ok(histogram)
    }
}

pub fn age_thresholds(date: &RequestDate) -> Result<Thresholds> {
    let day = date.to_naive()?;
    let mut thresholds = [0f64; BAND_COUNT];
    for (band, threshold) in thresholds.iter_mut().enumerate() {
        let offset = Days::new((band as u64 + 1) * BAND_WIDTH_DAYS);
        let earlier = day
            .checked_sub_days(offset)
            .ok_or_else(|| Error::DateOutOfRange {
                date: date.to_string(),
            })?;
        *threshold = local_midnight(earlier)? as f64;
    }
    Ok(thresholds)
}

/// Places each interval in the first band whose threshold its `since` is
/// strictly newer than, or in the overflow band if none.
pub fn bucket(
    date: &RequestDate,
    thresholds: &Thresholds,
    intervals: &[AccessInterval],
) -> Result<BucketVector> {
    let mut vector = BucketVector::default();
    for interval in intervals {
        let since: f64 = interval
            .since()
            .trim()
            .parse()
            .map_err(|source| Error::InvalidSince {
                date: date.to_string(),
                value: interval.since().to_string(),
                source,
            })?;
        let index = thresholds
            .iter()
            .position(|threshold| since > *threshold)
            .unwrap_or(OVERFLOW_INDEX);
        trace!(
            %date,
            since = interval.since(),
            until = interval.until(),
            band = index,
            "bucketed interval"
        );
        vector.increment(index);
    }
    Ok(vector)
}
