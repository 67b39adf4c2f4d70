// src/summary.rs
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::{BucketCounts, SignalType};

/// Time interval used to bucket signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl GroupBy {
    /// Unknown or missing values fall back to `Day`
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("week") => GroupBy::Week,
            Some("month") => GroupBy::Month,
            _ => GroupBy::Day,
        }
    }

    /// Bucket label for a timestamp, always computed in UTC
    pub fn label(&self, ts: &DateTime<Utc>) -> String {
        match self {
            GroupBy::Day => ts.format("%Y-%m-%d").to_string(),
            GroupBy::Month => ts.format("%Y-%m").to_string(),
            GroupBy::Week => {
                let week = ts.iso_week();
                format!("{:04}-W{:02}", week.year(), week.week())
            }
        }
    }

    /// `to_char` pattern producing the same labels as [`GroupBy::label`]
    pub fn pg_format(&self) -> &'static str {
        match self {
            GroupBy::Day => "YYYY-MM-DD",
            GroupBy::Month => "YYYY-MM",
            GroupBy::Week => "IYYY-\"W\"IW",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        }
    }
}

/// Count signals per bucket. Buckets come back sorted ascending by label and
/// only buckets that saw at least one signal are present.
pub fn aggregate<'a, I>(group_by: GroupBy, signals: I) -> Vec<BucketCounts>
where
    I: IntoIterator<Item = (&'a DateTime<Utc>, SignalType)>,
{
    let mut buckets: BTreeMap<String, (i64, i64, i64)> = BTreeMap::new();

    for (ts, signal) in signals {
        let entry = buckets.entry(group_by.label(ts)).or_default();
        match signal {
            SignalType::Buy => entry.0 += 1,
            SignalType::Sell => entry.1 += 1,
            SignalType::Hold => entry.2 += 1,
        }
    }

    buckets
        .into_iter()
        .map(|(bucket, (buy, sell, hold))| BucketCounts { bucket, buy, sell, hold })
        .collect()
}

/// Aggregate row returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryBucket {
    pub bucket: String,
    pub buy: i64,
    pub sell: i64,
    pub hold: i64,
    pub net: i64,
    pub total: i64,
}

impl From<BucketCounts> for SummaryBucket {
    fn from(counts: BucketCounts) -> Self {
        Self {
            net: counts.buy - counts.sell,
            total: counts.buy + counts.sell + counts.hold,
            bucket: counts.bucket,
            buy: counts.buy,
            sell: counts.sell,
            hold: counts.hold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn unknown_group_by_falls_back_to_day() {
        assert_eq!(GroupBy::parse_lenient(None), GroupBy::Day);
        assert_eq!(GroupBy::parse_lenient(Some("quarter")), GroupBy::Day);
        assert_eq!(GroupBy::parse_lenient(Some("WEEK")), GroupBy::Week);
        assert_eq!(GroupBy::parse_lenient(Some(" month ")), GroupBy::Month);
    }

    #[test]
    fn labels_per_granularity() {
        let ts = at(2025, 3, 7, 23);
        assert_eq!(GroupBy::Day.label(&ts), "2025-03-07");
        assert_eq!(GroupBy::Month.label(&ts), "2025-03");
        assert_eq!(GroupBy::Week.label(&ts), "2025-W10");
    }

    #[test]
    fn week_label_uses_iso_week_year() {
        // Monday 2024-12-30 opens ISO week 1 of 2025
        assert_eq!(GroupBy::Week.label(&at(2024, 12, 30, 12)), "2025-W01");
        assert_eq!(GroupBy::Week.label(&at(2024, 12, 31, 12)), "2025-W01");
        // Friday 2021-01-01 still belongs to 2020's last week
        assert_eq!(GroupBy::Week.label(&at(2021, 1, 1, 12)), "2020-W53");
    }

    // Expands the handful of to_char fields used by pg_format
    fn expand_to_char(pattern: &str, ts: &DateTime<Utc>) -> String {
        let week = ts.iso_week();
        pattern
            .replace("IYYY", &format!("{:04}", week.year()))
            .replace("YYYY", &format!("{:04}", ts.year()))
            .replace("\"W\"", "W")
            .replace("IW", &format!("{:02}", week.week()))
            .replace("MM", &format!("{:02}", ts.month()))
            .replace("DD", &format!("{:02}", ts.day()))
    }

    #[test]
    fn pg_format_patterns_match_labels() {
        assert_eq!(GroupBy::Day.pg_format(), "YYYY-MM-DD");
        assert_eq!(GroupBy::Month.pg_format(), "YYYY-MM");
        assert_eq!(GroupBy::Week.pg_format(), "IYYY-\"W\"IW");

        let samples = [at(2024, 12, 30, 12), at(2021, 1, 1, 12), at(2025, 3, 7, 23), at(2026, 1, 5, 0)];
        for group_by in [GroupBy::Day, GroupBy::Week, GroupBy::Month] {
            for ts in &samples {
                assert_eq!(expand_to_char(group_by.pg_format(), ts), group_by.label(ts));
            }
        }
    }

    #[test]
    fn day_buckets_count_each_signal() {
        let rows = [
            (at(2025, 1, 1, 10), SignalType::Buy),
            (at(2025, 1, 1, 15), SignalType::Sell),
            (at(2025, 1, 2, 9), SignalType::Buy),
        ];
        let buckets = aggregate(GroupBy::Day, rows.iter().map(|(ts, s)| (ts, *s)));
        assert_eq!(
            buckets,
            vec![
                BucketCounts { bucket: "2025-01-01".to_string(), buy: 1, sell: 1, hold: 0 },
                BucketCounts { bucket: "2025-01-02".to_string(), buy: 1, sell: 0, hold: 0 },
            ]
        );
    }

    #[test]
    fn gaps_are_not_zero_filled() {
        let rows = [
            (at(2025, 1, 1, 0), SignalType::Hold),
            (at(2025, 4, 1, 0), SignalType::Hold),
        ];
        let buckets = aggregate(GroupBy::Month, rows.iter().map(|(ts, s)| (ts, *s)));
        let labels: Vec<_> = buckets.iter().map(|b| b.bucket.as_str()).collect();
        assert_eq!(labels, ["2025-01", "2025-04"]);
    }

    #[test]
    fn summary_bucket_derives_net_and_total() {
        let bucket = SummaryBucket::from(BucketCounts {
            bucket: "2025-W02".to_string(),
            buy: 2,
            sell: 5,
            hold: 1,
        });
        assert_eq!(bucket.net, -3);
        assert_eq!(bucket.total, 8);
    }
}
