//! Line-level parsing: deciding whether a log line is a qualifying data
//! request and pulling its day and `(since, until)` interval out of it.
//!
//! Expected call order is `is_entry_valid`, then `parse_date` /
//! `parse_interval`, then `is_interval_valid`. The extraction methods assume
//! the line already passed the entry filter.

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded;

use crate::config::{Config, ParserKind};
use crate::error::Result;
use crate::invariants::RequestDate;
use crate::models::Interval;

// Raw values up to the next separator; numeric checks happen downstream.
static SINCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"since=([^&\s"]+)"#).expect("valid since pattern"));
static UNTIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"until=([^&\s"]+)"#).expect("valid until pattern"));

pub trait EntryParser {
    /// Coarse shape check: every required marker occurs in the line.
    fn is_entry_valid(&self, line: &str) -> bool;

    /// The request day. Garbage in, garbage out: the token is only checked
    /// when it is used as a date.
    fn parse_date(&self, line: &str) -> RequestDate;

    fn get_since(&self, line: &str) -> Option<String>;

    /// The explicit `until`, or local midnight of `date` when the line has none.
    fn get_until(&self, line: &str, date: &RequestDate) -> Result<String>;

    fn parse_interval(&self, line: &str) -> Result<Interval> {
        let date = self.parse_date(line);
        Ok(Interval {
            since: self.get_since(line),
            until: self.get_until(line, &date)?,
        })
    }

    fn is_interval_valid(&self, interval: &Interval) -> bool {
        is_interval_valid(interval)
    }
}

/// `since=0` shows up in real logs and means nothing; drop it, however the
/// zero is spelled. A non-numeric `since` is let through so the bucketing
/// stage can report it.
pub fn is_interval_valid(interval: &Interval) -> bool {
    match interval.since.as_deref() {
        None => false,
        Some(since) => !matches!(since.trim().parse::<f64>(), Ok(value) if value.trunc() == 0.0),
    }
}

pub fn from_config(config: &Config) -> Box<dyn EntryParser> {
    match config.parser {
        ParserKind::Markers => Box::new(MarkerParser::new(config.markers.clone())),
        ParserKind::Query => Box::new(QueryParser::new(config.markers.clone())),
    }
}

fn fallback_until(date: &RequestDate) -> Result<String> {
    Ok(date.local_midnight()?.to_string())
}

fn contains_all(line: &str, markers: &[String]) -> bool {
    markers.iter().all(|marker| line.contains(marker.as_str()))
}

/// Substring filtering, with `since=`/`until=` found anywhere in the line.
/// Lines start with `[dd/Mon/yyyy:`.
#[derive(Debug, Clone)]
pub struct MarkerParser {
    markers: Vec<String>,
}

impl MarkerParser {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    fn capture(pattern: &Regex, line: &str) -> Option<String> {
        pattern
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl EntryParser for MarkerParser {
    fn is_entry_valid(&self, line: &str) -> bool {
        line.contains("since") && contains_all(line, &self.markers)
    }

    fn parse_date(&self, line: &str) -> RequestDate {
        let mut chars = line.chars();
        chars.next(); // skip '['
        let rest = chars.as_str();
        RequestDate::new(rest.split(':').next().unwrap_or(rest))
    }

    fn get_since(&self, line: &str) -> Option<String> {
        Self::capture(&SINCE, line)
    }

    fn get_until(&self, line: &str, date: &RequestDate) -> Result<String> {
        match Self::capture(&UNTIL, line) {
            Some(until) => Ok(until),
            None => fallback_until(date),
        }
    }
}

/// Reads `since`/`until` from the decoded query string of the request URL,
/// so `nosince=1` or a `since` in a referrer does not count. The date may
/// sit anywhere in the line as `[dd/Mon/yyyy:...]`.
#[derive(Debug, Clone)]
pub struct QueryParser {
    markers: Vec<String>,
}

impl QueryParser {
    pub fn new(markers: Vec<String>) -> Self {
        Self { markers }
    }

    fn query(line: &str) -> Option<&str> {
        line.split_whitespace().find_map(|token| {
            let token = token.trim_matches('"');
            token.split_once('?').map(|(_, query)| query)
        })
    }

    fn query_value(line: &str, key: &str) -> Option<String> {
        let query = Self::query(line)?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

impl EntryParser for QueryParser {
    fn is_entry_valid(&self, line: &str) -> bool {
        contains_all(line, &self.markers)
            && Self::query(line)
                .is_some_and(|q| form_urlencoded::parse(q.as_bytes()).any(|(k, _)| k == "since"))
    }

    fn parse_date(&self, line: &str) -> RequestDate {
        let rest = line.split_once('[').map_or(line, |(_, rest)| rest);
        RequestDate::new(rest.split(':').next().unwrap_or(rest))
    }

    fn get_since(&self, line: &str) -> Option<String> {
        Self::query_value(line, "since")
    }

    fn get_until(&self, line: &str, date: &RequestDate) -> Result<String> {
        match Self::query_value(line, "until") {
            Some(until) => Ok(until),
            None => fallback_until(date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_markers;
    use crate::error::Error;
    use asserting::prelude::*;

    const LINE: &str = "[17/Jun/2015:10:12:01 +0200] 10.0.0.7 RP: GET \
        /api/v1/mentions/search/?q=rust&since=1434326400&until=1434412800 200 512";

    fn markers() -> MarkerParser {
        MarkerParser::new(default_markers())
    }

    fn query() -> QueryParser {
        QueryParser::new(default_markers())
    }

    #[test]
    fn parse_date_stops_at_first_colon() {
        assert_eq!(markers().parse_date(LINE).as_str(), "17/Jun/2015");
    }

    #[test]
    fn parse_date_on_short_line_does_not_panic() {
        assert_eq!(markers().parse_date("").as_str(), "");
        assert_eq!(markers().parse_date("[").as_str(), "");
    }

    #[test]
    fn since_and_until_are_extracted() {
        let interval = markers().parse_interval(LINE).unwrap();
        assert_eq!(interval.since.as_deref(), Some("1434326400"));
        assert_eq!(interval.until, "1434412800");
    }

    #[test]
    fn since_is_truncated_at_separator() {
        let line = "[17/Jun/2015:10:12:01] RP: GET mentions/search/?since=123&x=1 since=9";
        assert_that!(markers().get_since(line)).is_equal_to(Some("123".to_string()));
    }

    #[test]
    fn missing_since_yields_none() {
        let line = "[17/Jun/2015:10:12:01] RP: GET mentions/search/?q=since";
        assert_that!(markers().get_since(line)).is_none();
    }

    #[test]
    fn missing_until_defaults_to_local_midnight() {
        let line = "[17/Jun/2015:10:12:01] RP: GET mentions/search/?since=1434326400";
        let date = RequestDate::new("17/Jun/2015");
        let expected = date.local_midnight().unwrap().to_string();
        assert_eq!(markers().get_until(line, &date).unwrap(), expected);
    }

    #[test]
    fn explicit_until_wins_over_default() {
        let date = RequestDate::new("17/Jun/2015");
        assert_eq!(markers().get_until(LINE, &date).unwrap(), "1434412800");
    }

    #[test]
    fn missing_until_on_garbage_date_is_an_error() {
        let line = "xRP: GET mentions/search/?since=5";
        let result = markers().parse_interval(line);
        assert!(matches!(result, Err(Error::InvalidDate { .. })));
    }

    #[test]
    fn entry_valid_requires_every_marker() {
        let parser = markers();
        assert_that!(parser.is_entry_valid(LINE)).is_true();
        for marker in default_markers() {
            let stripped = LINE.replace(marker.as_str(), "");
            assert!(!parser.is_entry_valid(&stripped), "still valid without {marker}");
        }
    }

    #[test]
    fn entry_valid_always_requires_since() {
        let parser = MarkerParser::new(vec!["GET".into()]);
        assert_that!(parser.is_entry_valid("[01/Jan/2020:00:00:00] GET /")).is_false();
        assert_that!(parser.is_entry_valid("[01/Jan/2020:00:00:00] GET /?since=1")).is_true();
    }

    #[test]
    fn zero_since_is_invalid() {
        let interval = Interval {
            since: Some("0".into()),
            until: "1".into(),
        };
        assert_that!(is_interval_valid(&interval)).is_false();
        let interval = Interval {
            since: Some("000".into()),
            until: "1".into(),
        };
        assert_that!(is_interval_valid(&interval)).is_false();
    }

    #[test]
    fn fractional_and_signed_zero_since_are_invalid() {
        for zero in ["0.0", "-0", "+0", " 0.00 "] {
            let interval = Interval {
                since: Some(zero.into()),
                until: "1".into(),
            };
            assert!(!is_interval_valid(&interval), "since={zero:?}");
        }
    }

    #[test]
    fn non_numeric_since_passes_to_bucketing() {
        let interval = Interval {
            since: Some("abc".into()),
            until: "1".into(),
        };
        assert_that!(is_interval_valid(&interval)).is_true();
    }

    #[test]
    fn marker_parser_keeps_non_numeric_since() {
        let line = "[01/Jan/2020:08:00:00] RP: GET /mentions/search/?since=abc&until=5";
        assert_that!(markers().get_since(line)).is_equal_to(Some("abc".to_string()));
        let line = r#"[01/Jan/2020:08:00:00] "RP: GET /mentions/search/?since=-5""#;
        assert_that!(markers().get_since(line)).is_equal_to(Some("-5".to_string()));
    }

    #[test]
    fn absent_since_is_invalid() {
        let interval = Interval {
            since: None,
            until: "1".into(),
        };
        assert_that!(is_interval_valid(&interval)).is_false();
    }

    #[test]
    fn positive_since_is_valid() {
        let interval = Interval {
            since: Some("1434326400".into()),
            until: "1".into(),
        };
        assert_that!(is_interval_valid(&interval)).is_true();
    }

    #[test]
    fn query_parser_reads_decoded_query() {
        let parser = query();
        assert_that!(parser.is_entry_valid(LINE)).is_true();
        let interval = parser.parse_interval(LINE).unwrap();
        assert_eq!(interval.since.as_deref(), Some("1434326400"));
        assert_eq!(interval.until, "1434412800");
    }

    #[test]
    fn query_parser_ignores_since_outside_query() {
        let line = "[17/Jun/2015:10:12:01] RP: GET /mentions/search/?nosince=5 since=3";
        assert_that!(query().is_entry_valid(line)).is_false();
        // the substring strategy takes it
        assert_that!(markers().is_entry_valid(line)).is_true();
    }

    #[test]
    fn query_parser_finds_bracket_after_prefix() {
        let line = r#"10.0.0.7 - - [01/Jan/2020:00:00:59 +0000] "RP: GET /mentions/search/?since=1""#;
        let parser = query();
        assert_eq!(parser.parse_date(line).as_str(), "01/Jan/2020");
        assert_that!(parser.get_since(line)).is_equal_to(Some("1".to_string()));
    }

    #[test]
    fn query_parser_treats_empty_since_as_absent() {
        let line = "[01/Jan/2020:00:00:59] RP: GET /mentions/search/?since=&until=5";
        assert_that!(query().get_since(line)).is_none();
    }

    #[test]
    fn from_config_selects_strategy() {
        let mut config = Config::default();
        let line = "[17/Jun/2015:10:12:01] RP: GET /mentions/search/?nosince=5 since=3";
        assert_that!(from_config(&config).is_entry_valid(line)).is_true();
        config.parser = ParserKind::Query;
        assert_that!(from_config(&config).is_entry_valid(line)).is_false();
    }
}
