//! Catalogue service trait and remote error types.
//!
//! The CatalogueService trait abstracts over the trade backend (HTTP, or the
//! in-memory fixture) so the engine and the front ends can be tested without
//! a network.

use thiserror::Error;

use super::request::{CatalogueCall, CatalogueReply};
use super::trade_query::TradeQuery;
use crate::domain::{
    AdvancedMetrics, CategoryMetadata, ChartImage, ChartKind, EventTickers, FullAnalysis, Record,
    SeriesMetadata, TickerListing, TradeStatistics,
};

/// Failure of a remote call. Displayable in both CLI and TUI contexts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogueError {
    #[error("service unreachable: {0}")]
    Transport(String),

    #[error("service returned HTTP {status}")]
    Http { status: u16 },

    #[error("{0}")]
    Remote(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("unexpected payload for {expected}")]
    UnexpectedPayload { expected: &'static str },
}

/// One method per endpoint of the backend contract.
///
/// Implementations block; the host decides which thread they run on.
pub trait CatalogueService: Send {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    fn categories(&self) -> Result<Vec<CategoryMetadata>, CatalogueError>;

    fn series_in_category(&self, category: &str) -> Result<Vec<SeriesMetadata>, CatalogueError>;

    fn series_tickers(&self, series: &str) -> Result<TickerListing, CatalogueError>;

    fn event_tickers(&self, event: &str) -> Result<EventTickers, CatalogueError>;

    /// Fetch trades. The backend also keeps them as the input of the
    /// `analysis` endpoints.
    fn trades(&self, query: &TradeQuery) -> Result<Vec<Record>, CatalogueError>;

    fn stats(&self) -> Result<TradeStatistics, CatalogueError>;

    fn metrics(&self) -> Result<AdvancedMetrics, CatalogueError>;

    fn chart(&self, kind: ChartKind) -> Result<ChartImage, CatalogueError>;

    fn full_analysis(&self) -> Result<FullAnalysis, CatalogueError>;

    /// Run a call emitted by the engine.
    fn execute(&self, call: &CatalogueCall) -> Result<CatalogueReply, CatalogueError> {
        Ok(match call {
            CatalogueCall::Categories => CatalogueReply::Categories(self.categories()?),
            CatalogueCall::SeriesInCategory { category } => {
                CatalogueReply::Series(self.series_in_category(category)?)
            }
            CatalogueCall::SeriesTickers { series } => {
                CatalogueReply::Tickers(self.series_tickers(series)?)
            }
            CatalogueCall::EventTickers { event } => {
                CatalogueReply::EventTickers(self.event_tickers(event)?)
            }
            CatalogueCall::Trades(query) => CatalogueReply::Trades(self.trades(query)?),
            CatalogueCall::Stats => CatalogueReply::Stats(self.stats()?),
            CatalogueCall::Metrics => CatalogueReply::Metrics(self.metrics()?),
            CatalogueCall::Chart(kind) => CatalogueReply::Chart(self.chart(*kind)?),
            CatalogueCall::FullAnalysis => CatalogueReply::FullAnalysis(self.full_analysis()?),
        })
    }
}

impl<S: CatalogueService + ?Sized> CatalogueService for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }
    fn categories(&self) -> Result<Vec<CategoryMetadata>, CatalogueError> {
        (**self).categories()
    }
    fn series_in_category(&self, category: &str) -> Result<Vec<SeriesMetadata>, CatalogueError> {
        (**self).series_in_category(category)
    }
    fn series_tickers(&self, series: &str) -> Result<TickerListing, CatalogueError> {
        (**self).series_tickers(series)
    }
    fn event_tickers(&self, event: &str) -> Result<EventTickers, CatalogueError> {
        (**self).event_tickers(event)
    }
    fn trades(&self, query: &TradeQuery) -> Result<Vec<Record>, CatalogueError> {
        (**self).trades(query)
    }
    fn stats(&self) -> Result<TradeStatistics, CatalogueError> {
        (**self).stats()
    }
    fn metrics(&self) -> Result<AdvancedMetrics, CatalogueError> {
        (**self).metrics()
    }
    fn chart(&self, kind: ChartKind) -> Result<ChartImage, CatalogueError> {
        (**self).chart(kind)
    }
    fn full_analysis(&self) -> Result<FullAnalysis, CatalogueError> {
        (**self).full_analysis()
    }
}
