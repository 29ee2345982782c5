//! HTTP backend.
//!
//! Every endpoint answers with the same envelope, `{success, data, error}`.
//! Decoding is kept separate from the transport so it can be tested on
//! captured bodies. No retries: each failure is reported once.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::service::{CatalogueError, CatalogueService};
use super::trade_query::TradeQuery;
use crate::domain::{
    AdvancedMetrics, CategoryMetadata, ChartImage, ChartKind, EventTickers, FullAnalysis, Record,
    SeriesMetadata, TickerListing, TradeStatistics,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5015/api";

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Decode a response body.
///
/// A body that is an envelope reports its own error, whatever the status.
/// A non-2xx body that is not an envelope reports the status.
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, CatalogueError> {
    let ok_status = (200..300).contains(&status);
    let envelope: Envelope<serde_json::Value> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !ok_status => return Err(CatalogueError::Http { status }),
        Err(e) => return Err(CatalogueError::Decode(e.to_string())),
    };

    if !envelope.success || !ok_status {
        return Err(match envelope.error {
            Some(message) => CatalogueError::Remote(message),
            None if !ok_status => CatalogueError::Http { status },
            None => CatalogueError::Remote("request was not successful".into()),
        });
    }

    let data = envelope
        .data
        .ok_or_else(|| CatalogueError::Decode("envelope has no data".into()))?;
    serde_json::from_value(data).map_err(|e| CatalogueError::Decode(e.to_string()))
}

pub struct HttpCatalogue {
    client: Client,
    base: Url,
}

impl HttpCatalogue {
    /// `timeout` of `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, CatalogueError> {
        let base = Url::parse(base_url)
            .map_err(|e| CatalogueError::Transport(format!("invalid base url {base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(CatalogueError::Transport(format!(
                "invalid base url {base_url}: not a hierarchical url"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogueError::Transport(e.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended, each one percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, CatalogueError> {
        let url = self.endpoint(segments);
        debug!(%url, "GET");
        let resp = self.client.get(url).send().map_err(transport)?;
        read(resp)
    }
}

fn transport(e: reqwest::Error) -> CatalogueError {
    CatalogueError::Transport(e.to_string())
}

fn read<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, CatalogueError> {
    let status = resp.status().as_u16();
    let body = resp.text().map_err(transport)?;
    debug!(status, bytes = body.len(), "response");
    decode_envelope(status, &body)
}

impl CatalogueService for HttpCatalogue {
    fn name(&self) -> &str {
        "http"
    }

    fn categories(&self) -> Result<Vec<CategoryMetadata>, CatalogueError> {
        self.get(&["series", "categories"])
    }

    fn series_in_category(&self, category: &str) -> Result<Vec<SeriesMetadata>, CatalogueError> {
        self.get(&["series", "category", category])
    }

    fn series_tickers(&self, series: &str) -> Result<TickerListing, CatalogueError> {
        self.get(&["series", series, "tickers"])
    }

    fn event_tickers(&self, event: &str) -> Result<EventTickers, CatalogueError> {
        self.get(&["markets", "events", event, "tickers"])
    }

    fn trades(&self, query: &TradeQuery) -> Result<Vec<Record>, CatalogueError> {
        let url = self.endpoint(&["trades"]);
        debug!(%url, ticker = %query.ticker, limit = query.limit, "POST");
        let resp = self.client.post(url).json(query).send().map_err(transport)?;
        read(resp)
    }

    fn stats(&self) -> Result<TradeStatistics, CatalogueError> {
        self.get(&["analysis", "stats"])
    }

    fn metrics(&self) -> Result<AdvancedMetrics, CatalogueError> {
        self.get(&["analysis", "metrics"])
    }

    fn chart(&self, kind: ChartKind) -> Result<ChartImage, CatalogueError> {
        self.get(&["analysis", "chart", kind.slug()])
    }

    fn full_analysis(&self) -> Result<FullAnalysis, CatalogueError> {
        self.get(&["analysis", "all"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_encode_segments() {
        let http = HttpCatalogue::new(DEFAULT_BASE_URL, None).unwrap();
        assert_eq!(
            http.endpoint(&["series", "category", "Science and Technology"]).as_str(),
            "http://localhost:5015/api/series/category/Science%20and%20Technology"
        );
        assert_eq!(
            http.endpoint(&["markets", "events", "A/B", "tickers"]).as_str(),
            "http://localhost:5015/api/markets/events/A%2FB/tickers"
        );

        let trailing = HttpCatalogue::new("http://example.test/api/", None).unwrap();
        assert_eq!(
            trailing.endpoint(&["trades"]).as_str(),
            "http://example.test/api/trades"
        );
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(HttpCatalogue::new("not a url", None).is_err());
    }

    #[test]
    fn decodes_success_payload() {
        let body = r#"{"success":true,"data":["Economics","Politics"]}"#;
        let cats: Vec<CategoryMetadata> = decode_envelope(200, body).unwrap();
        assert_eq!(cats, [CategoryMetadata::new("Economics"), CategoryMetadata::new("Politics")]);

        let body = r#"{"success":true,"data":{"tickers":["CPI-24-T1"],"count":1}}"#;
        let event: EventTickers = decode_envelope(200, body).unwrap();
        assert_eq!(event.tickers, ["CPI-24-T1"]);
    }

    #[test]
    fn trades_keep_column_order() {
        let body = r#"{"success":true,"count":1,"data":[{"trade_id":"t1","yes_price":45,"created_time":"2024-05-01T12:00:00Z"}]}"#;
        let rows: Vec<Record> = decode_envelope(200, body).unwrap();
        let cols: Vec<&str> = rows[0].columns().collect();
        assert_eq!(cols, ["trade_id", "yes_price", "created_time"]);
    }

    #[test]
    fn envelope_error_wins_over_status() {
        let body = r#"{"success":false,"error":"No data available. Please fetch trades first."}"#;
        let err = decode_envelope::<TradeStatistics>(400, body).unwrap_err();
        assert_eq!(
            err,
            CatalogueError::Remote("No data available. Please fetch trades first.".into())
        );
        let err = decode_envelope::<TradeStatistics>(200, body).unwrap_err();
        assert!(matches!(err, CatalogueError::Remote(_)));
    }

    #[test]
    fn non_envelope_failure_reports_status() {
        let err = decode_envelope::<TradeStatistics>(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err, CatalogueError::Http { status: 502 });
        let err = decode_envelope::<TradeStatistics>(200, "<html>").unwrap_err();
        assert!(matches!(err, CatalogueError::Decode(_)));
    }

    #[test]
    fn wrong_payload_shape_is_a_decode_error() {
        let body = r#"{"success":true,"data":{"tickers":"nope"}}"#;
        let err = decode_envelope::<EventTickers>(200, body).unwrap_err();
        assert!(matches!(err, CatalogueError::Decode(_)));
        let err = decode_envelope::<EventTickers>(200, r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, CatalogueError::Decode(_)));
    }
}
