use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{Local, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use derive_more::{AsRef, Debug, Display};
use serde::Serialize;

use crate::error::{Error, Result};

/// Layout of the date token at the start of every log line, e.g. `17/Jun/2015`.
pub const DATE_FORMAT: &str = "%d/%b/%Y";

#[derive(Debug, Display, AsRef, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for Hostname {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl FromStr for Hostname {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.into()))
    }
}

/// The raw day token of a log line. Kept verbatim so it can serve as a map
/// key even before it has been checked; the parsed day rides along.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize)]
#[display("{raw}")]
#[serde(transparent)]
pub struct RequestDate {
    raw: String,
    #[serde(skip)]
    day: Option<NaiveDate>,
}

/// Chronological where both tokens are dates; unparseable tokens sort first.
impl Ord for RequestDate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.day, &self.raw).cmp(&(other.day, &other.raw))
    }
}

impl PartialOrd for RequestDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RequestDate {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let day = NaiveDate::parse_from_str(&raw, DATE_FORMAT).ok();
        Self { raw, day }
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    pub fn to_naive(&self) -> Result<NaiveDate> {
        match self.day {
            Some(day) => Ok(day),
            None => NaiveDate::parse_from_str(&self.raw, DATE_FORMAT)
                .map_err(|source| Error::InvalidDate {
                    date: self.raw.clone(),
                    source,
                }),
        }
    }

    /// Epoch seconds of this day's midnight on the local clock.
    pub fn local_midnight(&self) -> Result<i64> {
        local_midnight(self.to_naive()?)
    }
}

impl From<NaiveDate> for RequestDate {
    fn from(value: NaiveDate) -> Self {
        Self {
            raw: value.format(DATE_FORMAT).to_string(),
            day: Some(value),
        }
    }
}

pub fn local_midnight(date: NaiveDate) -> Result<i64> {
    midnight_in(&Local, date)
}

/// Epoch seconds of `date`'s midnight in `tz`. An ambiguous midnight takes
/// the earlier instant; a midnight inside a DST gap resolves to the first
/// quarter hour after the gap.
pub fn midnight_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<i64> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(moment) | LocalResult::Ambiguous(moment, _) => Ok(moment.timestamp()),
        LocalResult::None => (1..=96)
            .find_map(|quarter| {
                tz.from_local_datetime(&(midnight + TimeDelta::minutes(15 * quarter)))
                    .earliest()
            })
            .map(|moment| moment.timestamp())
            .ok_or(Error::NonexistentMidnight { date }),
    }
}
