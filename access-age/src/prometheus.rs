use prometheus::{IntGaugeVec, Registry, TextEncoder, opts};

use crate::analytics::HostSummary;
use crate::error::Result;

pub struct PromMetrics {
    pub requests_by_band: IntGaugeVec,
    pub requests_by_day: IntGaugeVec,
    pub registry: Registry,
}

impl PromMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_by_band = IntGaugeVec::new(
            opts!(
                "access_age_requests",
                "Data requests per host by days between since and the log day"
            ),
            &["host", "band"],
        )?;
        let requests_by_day = IntGaugeVec::new(
            opts!(
                "access_age_daily_requests",
                "Data requests per host and log day"
            ),
            &["host", "day"],
        )?;

        registry.register(Box::new(requests_by_band.clone()))?;
        registry.register(Box::new(requests_by_day.clone()))?;

        Ok(Self {
            requests_by_band,
            requests_by_day,
            registry,
        })
    }

    pub fn record(&self, summary: &HostSummary) {
        let host = summary.host.as_str();
        for (band, count) in summary.by_bucket.labelled() {
            self.requests_by_band
                .with_label_values(&[host, band.as_str()])
                .set(count as i64);
        }
        for (day, count) in &summary.by_day {
            self.requests_by_day
                .with_label_values(&[host, day.as_str()])
                .set(*count as i64);
        }
    }

    pub fn encode(&self) -> Result<String> {
        let mut buffer = String::new();
        TextEncoder::new().encode_utf8(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
