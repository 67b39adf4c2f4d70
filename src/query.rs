// src/query.rs
//! Explicit query construction for signal lookups.
//!
//! Every search is one of four shapes depending on which of symbol/model the
//! caller supplied. The shape, the time range and the page are resolved here
//! once, and each storage backend only has to translate them.

use chrono::{DateTime, Utc};

use crate::database::models::SignalRecord;
use crate::error::{ServiceError, ServiceResult};
use crate::summary::GroupBy;

pub const DEFAULT_PAGE: u32 = 0;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// Which of symbol/model name constrain the query. Values are lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalFilter {
    SymbolAndModel { symbol: String, model_name: String },
    Symbol(String),
    Model(String),
    All,
}

impl SignalFilter {
    pub fn new(symbol: Option<&str>, model_name: Option<&str>) -> Self {
        match (normalize(symbol), normalize(model_name)) {
            (Some(symbol), Some(model_name)) => SignalFilter::SymbolAndModel { symbol, model_name },
            (Some(symbol), None) => SignalFilter::Symbol(symbol),
            (None, Some(model_name)) => SignalFilter::Model(model_name),
            (None, None) => SignalFilter::All,
        }
    }

    pub fn symbol(&self) -> Option<&str> {
        match self {
            SignalFilter::SymbolAndModel { symbol, .. } | SignalFilter::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn model_name(&self) -> Option<&str> {
        match self {
            SignalFilter::SymbolAndModel { model_name, .. } | SignalFilter::Model(model_name) => {
                Some(model_name)
            }
            _ => None,
        }
    }

    pub fn matches(&self, record: &SignalRecord) -> bool {
        let symbol_ok = self
            .symbol()
            .map_or(true, |s| record.symbol.to_lowercase() == s);
        let model_ok = self
            .model_name()
            .map_or(true, |m| record.model_name.to_lowercase() == m);
        symbol_ok && model_ok
    }
}

/// Inclusive `[from, to]` timestamp window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Missing `from` means the Unix epoch, missing `to` means `now`.
    pub fn resolve(from: Option<&str>, to: Option<&str>, now: DateTime<Utc>) -> ServiceResult<Self> {
        let from = match from {
            Some(raw) => parse_timestamp("from", raw)?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };
        let to = match to {
            Some(raw) => parse_timestamp("to", raw)?,
            None => now,
        };
        Ok(Self { from, to })
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.from && *ts <= self.to
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> ServiceResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ServiceError::InvalidTimestamp {
            field,
            value: raw.to_string(),
            source,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, size: Option<u32>) -> ServiceResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if size == 0 {
            return Err(ServiceError::InvalidPagination(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self { page, size })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.size))
    }
}

/// Filtered, time-bounded, paginated lookup sorted by `ts` descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: SignalFilter,
    pub range: TimeRange,
    pub pagination: Pagination,
}

/// Filtered, time-bounded aggregation into buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pub filter: SignalFilter,
    pub range: TimeRange,
    pub group_by: GroupBy,
}

impl SummaryQuery {
    pub fn matches(&self, record: &SignalRecord) -> bool {
        self.range.contains(&record.ts) && self.filter.matches(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filter_picks_variant_from_present_fields() {
        assert_eq!(
            SignalFilter::new(Some("XAUUSD"), Some("LSTM-v2")),
            SignalFilter::SymbolAndModel {
                symbol: "xauusd".to_string(),
                model_name: "lstm-v2".to_string()
            }
        );
        assert_eq!(SignalFilter::new(Some("wti"), None), SignalFilter::Symbol("wti".to_string()));
        assert_eq!(SignalFilter::new(None, Some("m")), SignalFilter::Model("m".to_string()));
        assert_eq!(SignalFilter::new(None, None), SignalFilter::All);
    }

    #[test]
    fn blank_values_count_as_absent() {
        assert_eq!(SignalFilter::new(Some("  "), Some("")), SignalFilter::All);
        assert_eq!(
            SignalFilter::new(Some(" brent "), Some(" ")),
            SignalFilter::Symbol("brent".to_string())
        );
    }

    #[test]
    fn range_defaults_to_epoch_and_now() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let range = TimeRange::resolve(None, None, now).unwrap();
        assert_eq!(range.from, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(range.to, now);
    }

    #[test]
    fn range_is_inclusive_and_accepts_offsets() {
        let now = Utc::now();
        let range = TimeRange::resolve(
            Some("2025-01-01T03:00:00+03:00"),
            Some("2025-01-31T23:59:59Z"),
            now,
        )
        .unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(range.contains(&range.from));
        assert!(range.contains(&range.to));
    }

    #[test]
    fn malformed_timestamp_names_the_field() {
        let err = TimeRange::resolve(None, Some("yesterday"), Utc::now()).unwrap_err();
        match err {
            ServiceError::InvalidTimestamp { field, value, .. } => {
                assert_eq!(field, "to");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pagination_defaults_and_rejects_zero_size() {
        let p = Pagination::new(None, None).unwrap();
        assert_eq!((p.page, p.size), (0, 50));
        assert_eq!(Pagination::new(Some(3), Some(20)).unwrap().offset(), 60);
        assert_eq!(p.total_pages(101), 3);
        assert_eq!(p.total_pages(0), 0);
        assert!(Pagination::new(None, Some(0)).is_err());
    }
}
