//! Domain types: records, field kinds, catalogue metadata, analysis payloads.

pub mod analysis;
pub mod catalogue;
pub mod fields;
pub mod record;
pub mod value;

pub use analysis::{
    AdvancedMetrics, ChartImage, ChartKind, DateRange, FullAnalysis, PriceStats, TradeStatistics,
};
pub use catalogue::{
    event_ticker_of, CategoryMetadata, EventTickers, MarketMetadata, SeriesMetadata,
    TickerListing,
};
pub use fields::{format_header, FieldKind, FieldKinds};
pub use record::Record;
pub use value::Value;
