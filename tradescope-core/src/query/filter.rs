//! Free-text substring filter.

use crate::domain::Record;

/// Row indices of `dataset` whose cells contain `query`, case-insensitively.
///
/// A blank (empty or whitespace-only) query keeps every row. Otherwise the
/// query is matched as typed, so leading/trailing spaces are significant.
/// Output preserves dataset order.
pub fn filter(dataset: &[Record], query: &str) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..dataset.len()).collect();
    }
    let needle = query.to_lowercase();
    dataset
        .iter()
        .enumerate()
        .filter(|(_, record)| matches(record, &needle))
        .map(|(i, _)| i)
        .collect()
}

fn matches(record: &Record, needle: &str) -> bool {
    record
        .values()
        .any(|v| v.to_text().to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Vec<Record> {
        vec![
            Record::new().with("ticker", "CPI-24-T1").with("taker_side", "yes").with("count", 10i64),
            Record::new().with("ticker", "FED-25-H").with("taker_side", "no").with("count", 3i64),
            Record::new().with("ticker", "cpi-24-t2").with("taker_side", "no").with("count", 105i64),
        ]
    }

    #[test]
    fn blank_query_keeps_everything() {
        let d = dataset();
        assert_eq!(filter(&d, ""), [0, 1, 2]);
        assert_eq!(filter(&d, "   \t"), [0, 1, 2]);
    }

    #[test]
    fn matches_any_column_case_insensitively() {
        let d = dataset();
        assert_eq!(filter(&d, "CPI"), [0, 2]);
        assert_eq!(filter(&d, "No"), [1, 2]);
        // Numbers match on their text.
        assert_eq!(filter(&d, "10"), [0, 2]);
        assert!(filter(&d, "zzz").is_empty());
    }

    #[test]
    fn empty_dataset_yields_empty_view() {
        assert!(filter(&[], "x").is_empty());
        assert!(filter(&[], "").is_empty());
    }
}
