//! Requests the engine emits and the responses the host feeds back.
//!
//! The engine never performs I/O. A transition that needs the backend
//! returns a [`CatalogueRequest`]; the host runs it with
//! [`CatalogueRequest::execute`] (inline or on a worker thread) and hands
//! the [`CatalogueResponse`] back to the engine, which uses the ticket to
//! drop anything superseded in the meantime.

use std::fmt;

use super::service::{CatalogueError, CatalogueService};
use super::trade_query::TradeQuery;
use crate::domain::{
    AdvancedMetrics, CategoryMetadata, ChartImage, ChartKind, EventTickers, FullAnalysis, Record,
    SeriesMetadata, TickerListing, TradeStatistics,
};

/// Which component a request belongs to. Each channel has its own
/// sequence, so a trade fetch never supersedes a navigation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Navigation,
    Trades,
    Analysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub channel: Channel,
    pub seq: u64,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.channel, self.seq)
    }
}

/// Hands out increasing tickets for one channel.
#[derive(Debug, Clone)]
pub struct TicketCounter {
    channel: Channel,
    last: u64,
}

impl TicketCounter {
    pub fn new(channel: Channel) -> Self {
        Self { channel, last: 0 }
    }

    pub fn issue(&mut self) -> Ticket {
        self.last += 1;
        Ticket {
            channel: self.channel,
            seq: self.last,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogueCall {
    Categories,
    SeriesInCategory { category: String },
    SeriesTickers { series: String },
    EventTickers { event: String },
    Trades(TradeQuery),
    Stats,
    Metrics,
    Chart(ChartKind),
    FullAnalysis,
}

impl CatalogueCall {
    /// Short description for status lines and logs.
    pub fn describe(&self) -> String {
        match self {
            CatalogueCall::Categories => "categories".into(),
            CatalogueCall::SeriesInCategory { category } => format!("series in {category}"),
            CatalogueCall::SeriesTickers { series } => format!("tickers of {series}"),
            CatalogueCall::EventTickers { event } => format!("tickers of event {event}"),
            CatalogueCall::Trades(q) => format!("trades for {}", q.ticker),
            CatalogueCall::Stats => "statistics".into(),
            CatalogueCall::Metrics => "metrics".into(),
            CatalogueCall::Chart(kind) => format!("{} chart", kind.label()),
            CatalogueCall::FullAnalysis => "full analysis".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogueReply {
    Categories(Vec<CategoryMetadata>),
    Series(Vec<SeriesMetadata>),
    Tickers(TickerListing),
    EventTickers(EventTickers),
    Trades(Vec<Record>),
    Stats(TradeStatistics),
    Metrics(AdvancedMetrics),
    Chart(ChartImage),
    FullAnalysis(FullAnalysis),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueRequest {
    pub ticket: Ticket,
    pub call: CatalogueCall,
}

impl CatalogueRequest {
    /// Run the call against `service`, keeping the ticket.
    pub fn execute<S: CatalogueService + ?Sized>(self, service: &S) -> CatalogueResponse {
        let result = service.execute(&self.call);
        CatalogueResponse {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueResponse {
    pub ticket: Ticket,
    pub result: Result<CatalogueReply, CatalogueError>,
}
