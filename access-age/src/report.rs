use clap::ValueEnum;
use num_format::{Locale, ToFormattedString};

use crate::analytics::HostSummary;
use crate::error::Result;
use crate::prometheus::PromMetrics;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Prometheus,
}

pub fn render(summaries: &[HostSummary], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(summaries)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(summaries)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Prometheus => {
            let metrics = PromMetrics::new()?;
            for summary in summaries {
                metrics.record(summary);
            }
            metrics.encode()
        }
    }
}

fn render_text(summaries: &[HostSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        out.push_str(&format!(
            "{}: {} requests from {} log files\n",
            summary.host,
            summary.total().to_formatted_string(&Locale::en),
            summary.sources_read
        ));
        for failure in &summary.failures {
            out.push_str(&format!(
                "  unreadable {}: {}\n",
                failure.path.display(),
                failure.error
            ));
        }

        out.push_str("  days ago   requests\n");
        for (band, count) in summary.by_bucket.labelled() {
            out.push_str(&format!(
                "  {band:>8}   {:>8}\n",
                count.to_formatted_string(&Locale::en)
            ));
        }

        if !summary.by_day.is_empty() {
            out.push_str("  day           requests\n");
            for (day, count) in &summary.by_day {
                out.push_str(&format!(
                    "  {:<12}  {:>8}\n",
                    day.as_str(),
                    count.to_formatted_string(&Locale::en)
                ));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::{Hostname, RequestDate};
    use crate::models::{BucketVector, DayHistogram, OVERFLOW_INDEX};
    use asserting::prelude::*;

    fn summary() -> HostSummary {
        let mut vector = BucketVector::default();
        for _ in 0..1200 {
            vector.increment(OVERFLOW_INDEX);
        }
        let histogram = DayHistogram::from([(RequestDate::new("01/Jan/2020"), vector)]);
        let mut summary = HostSummary::new(Hostname::from("prod-api1".to_string()), &histogram);
        summary.sources_read = 2;
        summary
    }

    #[test]
    fn text_groups_thousands() {
        let text = render(&[summary()], OutputFormat::Text).unwrap();
        assert_that!(text.as_str()).contains("prod-api1: 1,200 requests from 2 log files");
        assert_that!(text.as_str()).contains("older");
        assert_that!(text.as_str()).contains("01/Jan/2020");
    }

    #[test]
    fn json_is_an_array_of_hosts() {
        let json = render(&[summary()], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["host"], "prod-api1");
        assert_eq!(value[0]["by_bucket"][OVERFLOW_INDEX], 1200);
        assert_eq!(value[0]["by_day"]["01/Jan/2020"], 1200);
    }

    #[test]
    fn prometheus_output_has_both_families() {
        let text = render(&[summary()], OutputFormat::Prometheus).unwrap();
        assert_that!(text.as_str()).contains("# TYPE access_age_requests gauge");
        assert_that!(text.as_str()).contains("# TYPE access_age_daily_requests gauge");
    }
}
