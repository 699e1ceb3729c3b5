use std::collections::HashMap;
use std::ops::{Add, AddAssign, Index};

use serde::Serialize;

use crate::invariants::RequestDate;

/// Width of one age band, in days.
pub const BAND_WIDTH_DAYS: u64 = 5;
/// Number of bounded bands; band `k` covers `[5k, 5k + 5)` days.
pub const BAND_COUNT: usize = 18;
/// Bounded bands plus the overflow band.
pub const BUCKET_COUNT: usize = BAND_COUNT + 1;
pub const OVERFLOW_INDEX: usize = BAND_COUNT;

/// `(since, until)` as pulled out of a line, before any validity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub since: Option<String>,
    pub until: String,
}

impl Interval {
    pub(crate) fn into_access(self) -> Option<AccessInterval> {
        self.since.map(|since| AccessInterval::new(since, self.until))
    }
}

/// An interval whose `since` is present and not zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessInterval {
    since: String,
    until: String,
}

impl AccessInterval {
    pub(crate) fn new(since: String, until: String) -> Self {
        Self { since, until }
    }

    pub fn since(&self) -> &str {
        &self.since
    }

    pub(crate) fn until(&self) -> &str {
        &self.until
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct BucketVector([u64; BUCKET_COUNT]);

impl BucketVector {
    pub fn increment(&mut self, index: usize) {
        self.0[index] += 1;
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn counts(&self) -> &[u64; BUCKET_COUNT] {
        &self.0
    }

    /// `(label, count)` pairs in band order.
    pub fn labelled(&self) -> impl Iterator<Item = (String, u64)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(index, count)| (bucket_label(index), *count))
    }
}

impl From<[u64; BUCKET_COUNT]> for BucketVector {
    fn from(value: [u64; BUCKET_COUNT]) -> Self {
        Self(value)
    }
}

impl Index<usize> for BucketVector {
    type Output = u64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AddAssign<&BucketVector> for BucketVector {
    fn add_assign(&mut self, rhs: &BucketVector) {
        for (acc, count) in self.0.iter_mut().zip(rhs.0.iter()) {
            *acc += count;
        }
    }
}

impl Add for BucketVector {
    type Output = BucketVector;

    fn add(mut self, rhs: BucketVector) -> Self::Output {
        self += &rhs;
        self
    }
}

impl<'a> std::iter::Sum<&'a BucketVector> for BucketVector {
    fn sum<I: Iterator<Item = &'a BucketVector>>(iter: I) -> Self {
        iter.fold(BucketVector::default(), |mut acc, vector| {
            acc += vector;
            acc
        })
    }
}

/// Display label of a bucket: the band's upper bound in days, or `older`.
pub fn bucket_label(index: usize) -> String {
    if index >= OVERFLOW_INDEX {
        "older".to_string()
    } else {
        ((index as u64 + 1) * BAND_WIDTH_DAYS).to_string()
    }
}

pub type DayHistogram = HashMap<RequestDate, BucketVector>;
