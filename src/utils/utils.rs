use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::debug;

// Measure execution time of a storage round trip
pub async fn measure_time<F, T, E>(operation_name: &str, f: F) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = f.await;
    let elapsed = start.elapsed();

    debug!("{} completed in {:.2?}", operation_name, elapsed);

    result
}

// Format a timestamp for terminal output
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Sort values ignoring case and drop entries that differ only by case.
/// Of several spellings, the one that sorts first byte-wise is kept.
pub fn sorted_distinct_ignore_case(mut values: Vec<String>) -> Vec<String> {
    values.sort_by(|a, b| {
        a.to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b))
    });
    values.dedup_by(|next, kept| next.to_lowercase() == kept.to_lowercase());
    values
}

// Utility to truncate long strings for table output
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn distinct_ignores_case_and_sorts() {
        let values = vec![
            "xauusd".to_string(),
            "WTI".to_string(),
            "XAUUSD".to_string(),
            "brent".to_string(),
            "wti".to_string(),
        ];
        assert_eq!(sorted_distinct_ignore_case(values), ["brent", "WTI", "XAUUSD"]);
    }

    #[test]
    fn distinct_of_empty_is_empty() {
        assert!(sorted_distinct_ignore_case(Vec::new()).is_empty());
    }

    #[test]
    fn format_time_is_utc() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_time(&ts), "2025-01-02 03:04:05 UTC");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_string("lstm", 10), "lstm");
        assert_eq!(truncate_string("çok-uzun-model", 3), "çok...");
    }

    #[tokio::test]
    async fn measure_time_passes_result_through() {
        let value: Result<u8, ()> = measure_time("noop", async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }
}
