use chrono::{Local, NaiveDate, NaiveTime, TimeZone};
use rand::{Rng, seq::IndexedRandom};

/// Oldest `since` generated, in days before the log day.
pub const MAX_AGE_DAYS: u64 = 120;

const VERBS: [(&str, u8); 4] = [("GET", 6), ("POST", 2), ("PUT", 1), ("DELETE", 1)];
const PATHS: [(&str, u8); 4] = [
    ("/api/v1/mentions/search/", 60),
    ("/api/v1/mentions/", 10),
    ("/login", 10),
    ("/", 20),
];
const STATUS: [(u16, u8); 4] = [(200, 80), (304, 10), (404, 5), (500, 1)];
const TERMS: [&str; 5] = ["rust", "release", "outage", "pricing", "support"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Since {
    Age,
    Zero,
    Missing,
}
const SINCE: [(Since, u8); 3] = [(Since::Age, 85), (Since::Zero, 10), (Since::Missing, 5)];

fn epoch<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> i64 {
    let time = NaiveTime::from_num_seconds_from_midnight_opt(rng.random_range(0..86_400), 0)
        .unwrap_or(NaiveTime::MIN);
    let moment = day.and_time(time);
    Local
        .from_local_datetime(&moment)
        .earliest()
        .map_or_else(|| moment.and_utc().timestamp(), |t| t.timestamp())
}

fn query<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> String {
    let term = TERMS.choose(rng).unwrap();
    let mut query = format!("q={term}");
    match SINCE.choose_weighted(rng, |(_, w)| *w).unwrap().0 {
        Since::Age => {
            let back = day - chrono::Days::new(rng.random_range(0..=MAX_AGE_DAYS));
            query.push_str(&format!("&since={}", epoch(rng, back)));
        }
        Since::Zero => query.push_str("&since=0"),
        Since::Missing => {}
    }
    if rng.random_bool(0.5) {
        query.push_str(&format!("&until={}", epoch(rng, day)));
    }
    query
}

/// One access log line logged on `day`, e.g.
/// `[17/Jun/2015:10:12:01 +0000] 192.168.0.7 RP: GET /api/v1/mentions/search/?q=rust&since=... 200 512`
pub fn generate_line<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> String {
    let ip = format!(
        "192.168.{}.{}",
        rng.random_range(0..256),
        rng.random_range(0..256)
    );
    let time = NaiveTime::from_num_seconds_from_midnight_opt(rng.random_range(0..86_400), 0)
        .unwrap_or(NaiveTime::MIN);
    let timestamp = day.and_time(time).format("%d/%b/%Y:%H:%M:%S");
    let verb = VERBS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let path = PATHS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let status = STATUS.choose_weighted(rng, |(_, w)| *w).unwrap().0;
    let size = rng.random_range(100..2000);
    let target = if path.starts_with("/api/") {
        format!("{path}?{}", query(rng, day))
    } else {
        path.to_string()
    };

    format!("[{timestamp} +0000] {ip} RP: {verb} {target} {status} {size}")
}
