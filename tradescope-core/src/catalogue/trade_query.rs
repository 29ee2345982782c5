//! Trade fetch contract: turning the operator's fetch form into a request.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Page limit used when the operator asks for everything.
pub const FETCH_ALL_LIMIT: u32 = 1000;

/// Page limit used when the form leaves it blank.
pub const DEFAULT_LIMIT: u32 = 100;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// The operator's fetch form. Timestamps are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeForm {
    pub fetch_all: bool,
    pub min_ts: Option<i64>,
    pub max_ts: Option<i64>,
    pub limit: Option<u32>,
}

impl TradeForm {
    /// A form covering the last `days` days up to now.
    pub fn last_days(days: i64, limit: u32) -> Self {
        let now = Utc::now();
        Self {
            fetch_all: false,
            min_ts: Some((now - Duration::days(days)).timestamp()),
            max_ts: Some(now.timestamp()),
            limit: Some(limit),
        }
    }

    /// A form with no window: the backend's own default range applies.
    pub fn unbounded(limit: Option<u32>) -> Self {
        Self {
            fetch_all: false,
            min_ts: None,
            max_ts: None,
            limit,
        }
    }
}

impl Default for TradeForm {
    fn default() -> Self {
        Self::last_days(DEFAULT_LOOKBACK_DAYS, DEFAULT_LIMIT)
    }
}

/// Body of `POST /trades`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeQuery {
    pub ticker: String,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub min_ts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub max_ts: Option<i64>,
    #[serde(rename = "fetchAll")]
    pub fetch_all: bool,
}

impl TradeQuery {
    /// Validate the form against the selected ticker.
    ///
    /// `fetch_all` drops the window and raises the limit to
    /// [`FETCH_ALL_LIMIT`]; otherwise present bounds are passed through and
    /// a missing or zero limit becomes [`DEFAULT_LIMIT`].
    pub fn build(ticker: Option<&str>, form: &TradeForm) -> Result<Self, ValidationError> {
        let ticker = match ticker.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return Err(ValidationError::NoTicker),
        };

        if form.fetch_all {
            return Ok(Self {
                ticker,
                limit: FETCH_ALL_LIMIT,
                min_ts: None,
                max_ts: None,
                fetch_all: true,
            });
        }

        if let (Some(min_ts), Some(max_ts)) = (form.min_ts, form.max_ts) {
            if min_ts > max_ts {
                return Err(ValidationError::InvalidWindow { min_ts, max_ts });
            }
        }

        Ok(Self {
            ticker,
            limit: form.limit.filter(|&l| l > 0).unwrap_or(DEFAULT_LIMIT),
            min_ts: form.min_ts,
            max_ts: form.max_ts,
            fetch_all: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> TradeForm {
        TradeForm {
            fetch_all: false,
            min_ts: Some(1_700_000_000),
            max_ts: Some(1_700_086_400),
            limit: Some(250),
        }
    }

    #[test]
    fn missing_ticker_is_rejected() {
        assert_eq!(TradeQuery::build(None, &window()), Err(ValidationError::NoTicker));
        assert_eq!(TradeQuery::build(Some("  "), &window()), Err(ValidationError::NoTicker));
    }

    #[test]
    fn fetch_all_drops_window_and_raises_limit() {
        let form = TradeForm {
            fetch_all: true,
            ..window()
        };
        let q = TradeQuery::build(Some("CPI-24-T1"), &form).unwrap();
        assert_eq!(q.limit, 1000);
        assert_eq!(q.min_ts, None);
        assert_eq!(q.max_ts, None);
        assert!(q.fetch_all);
    }

    #[test]
    fn bounded_query_passes_window_through() {
        let q = TradeQuery::build(Some("CPI-24-T1"), &window()).unwrap();
        assert_eq!(q.limit, 250);
        assert_eq!(q.min_ts, Some(1_700_000_000));
        assert_eq!(q.max_ts, Some(1_700_086_400));

        let q = TradeQuery::build(Some("X"), &TradeForm::unbounded(None)).unwrap();
        assert_eq!(q.limit, 100);
        let q = TradeQuery::build(Some("X"), &TradeForm::unbounded(Some(0))).unwrap();
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let form = TradeForm {
            min_ts: Some(20),
            max_ts: Some(10),
            ..window()
        };
        assert_eq!(
            TradeQuery::build(Some("X"), &form),
            Err(ValidationError::InvalidWindow { min_ts: 20, max_ts: 10 })
        );
    }

    #[test]
    fn request_body_shape() {
        let q = TradeQuery::build(Some("X"), &TradeForm::unbounded(Some(5))).unwrap();
        let body = serde_json::to_value(&q).unwrap();
        assert_eq!(body, serde_json::json!({"ticker": "X", "limit": 5, "fetchAll": false}));
    }

    #[test]
    fn default_form_covers_a_week() {
        let form = TradeForm::default();
        let span = form.max_ts.unwrap() - form.min_ts.unwrap();
        assert_eq!(span, 7 * 24 * 3600);
        assert_eq!(form.limit, Some(100));
    }
}
