//! Read-only catalogue metadata: categories, series, markets.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A top-level grouping of series. The service sends bare names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryMetadata {
    pub name: String,
}

impl CategoryMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A named group of related tickers.
///
/// The market-derived fields are only present when the service aggregates
/// market data into the series listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub ticker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub frequency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default)]
    pub market_count: Option<u64>,
}

/// One tradable market.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketMetadata {
    pub ticker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_ticker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
}

/// Response of "list tickers + markets for a series".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickerListing {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub markets: Vec<MarketMetadata>,
}

impl TickerListing {
    pub fn market(&self, ticker: &str) -> Option<&MarketMetadata> {
        self.markets.iter().find(|m| m.ticker == ticker)
    }
}

/// Response of "list tickers in an event".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventTickers {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// Event grouping inferred from a ticker by stripping its last
/// hyphen-delimited segment: `CPI-24-T1` → `CPI-24`.
///
/// This is a naming convention, not something the service guarantees.
pub fn event_ticker_of(ticker: &str) -> &str {
    match ticker.rsplit_once('-') {
        Some((event, _)) if !event.is_empty() => event,
        _ => ticker,
    }
}
