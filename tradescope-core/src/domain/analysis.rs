//! Analysis payloads computed by the service over the last fetched trades.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Summary of a price-like series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Payload of `/analysis/stats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeStatistics {
    pub total_trades: u64,
    pub unique_tickers: u64,
    pub date_range: DateRange,
    pub taker_side_distribution: BTreeMap<String, u64>,
    pub ticker_distribution: BTreeMap<String, u64>,
    pub yes_price_stats: PriceStats,
    pub no_price_stats: PriceStats,
    pub spread_stats: PriceStats,
}

/// Payload of `/analysis/metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedMetrics {
    pub price_volatility: f64,
    pub price_skewness: f64,
    pub price_kurtosis: f64,
    pub avg_trade_size: f64,
    pub largest_trade: f64,
    pub volume_weighted_avg_price: f64,
    pub buy_sell_ratio: f64,
    pub price_spread: f64,
    pub trading_intensity: f64,
}

impl Default for AdvancedMetrics {
    fn default() -> Self {
        Self {
            price_volatility: 0.0,
            price_skewness: 0.0,
            price_kurtosis: 0.0,
            avg_trade_size: 0.0,
            largest_trade: 0.0,
            volume_weighted_avg_price: 0.0,
            buy_sell_ratio: 1.0,
            price_spread: 0.0,
            trading_intensity: 0.0,
        }
    }
}

/// Chart types the service can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Price,
    Volume,
    SideAnalysis,
    Heatmap,
    PriceDistribution,
    TimeSeries,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Price,
        ChartKind::Volume,
        ChartKind::SideAnalysis,
        ChartKind::Heatmap,
        ChartKind::PriceDistribution,
        ChartKind::TimeSeries,
    ];

    /// Path segment used by `/analysis/chart/{type}`.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::Price => "price",
            ChartKind::Volume => "volume",
            ChartKind::SideAnalysis => "side_analysis",
            ChartKind::Heatmap => "heatmap",
            ChartKind::PriceDistribution => "price_distribution",
            ChartKind::TimeSeries => "time_series",
        }
    }

    /// Key of this chart in the `/analysis/all` chart map.
    pub fn analysis_key(self) -> &'static str {
        match self {
            ChartKind::Price => "price_chart",
            ChartKind::Volume => "volume_chart",
            ChartKind::SideAnalysis => "side_analysis",
            ChartKind::Heatmap => "heatmap",
            ChartKind::PriceDistribution => "price_distribution",
            ChartKind::TimeSeries => "time_series",
        }
    }

    pub fn from_analysis_key(key: &str) -> Option<ChartKind> {
        Self::ALL.into_iter().find(|k| k.analysis_key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Price => "Price Movement",
            ChartKind::Volume => "Volume Analysis",
            ChartKind::SideAnalysis => "Buy/Sell Analysis",
            ChartKind::Heatmap => "Trading Heatmap",
            ChartKind::PriceDistribution => "Price Distribution",
            ChartKind::TimeSeries => "Time Series Analysis",
        }
    }

    pub fn next(self) -> ChartKind {
        let i = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartKind::ALL
            .into_iter()
            .find(|k| k.slug() == s)
            .ok_or_else(|| format!("unknown chart type: {s}"))
    }
}

/// Payload of `/analysis/chart/{type}`: a base64-encoded PNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartImage {
    pub chart_type: String,
    pub image_data: String,
}

/// Payload of `/analysis/all`. Charts are keyed by the service's own names
/// (`price_chart`, `volume_chart`, ...); a chart that failed to render is null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FullAnalysis {
    pub basic_stats: TradeStatistics,
    pub advanced_metrics: AdvancedMetrics,
    pub charts: BTreeMap<String, Option<String>>,
}

impl FullAnalysis {
    /// Charts as (display name, image data). Unknown keys keep their raw
    /// name.
    pub fn labelled_charts(&self) -> impl Iterator<Item = (&str, Option<&str>)> + '_ {
        self.charts.iter().map(|(key, data)| {
            let name = match ChartKind::from_analysis_key(key) {
                Some(kind) => kind.label(),
                None => key.as_str(),
            };
            (name, data.as_deref())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_decode_with_partial_payload() {
        let json = r#"{"total_trades":3,"yes_price_stats":{"mean":45.5,"std":null},"taker_side_distribution":{"yes":2,"no":1}}"#;
        let stats: TradeStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.total_trades, 3);
        assert_eq!(stats.yes_price_stats.mean, Some(45.5));
        assert_eq!(stats.yes_price_stats.std, None);
        assert_eq!(stats.taker_side_distribution["yes"], 2);
        assert!(stats.date_range.start.is_none());
    }

    #[test]
    fn metrics_default_ratio_is_one() {
        let m: AdvancedMetrics = serde_json::from_str("{}").unwrap();
        assert_eq!(m.buy_sell_ratio, 1.0);
        assert_eq!(m.trading_intensity, 0.0);
    }

    #[test]
    fn chart_kind_slugs_roundtrip() {
        for kind in ChartKind::ALL {
            assert_eq!(kind.slug().parse::<ChartKind>().unwrap(), kind);
        }
        assert!("pie".parse::<ChartKind>().is_err());
        assert_eq!(ChartKind::TimeSeries.next(), ChartKind::Price);
    }

    #[test]
    fn full_analysis_keys_map_to_labels() {
        let json = r#"{"charts":{"price_chart":"AAAA","side_analysis":null,"sparkline":"BBBB"}}"#;
        let full: FullAnalysis = serde_json::from_str(json).unwrap();
        let charts: Vec<(&str, Option<&str>)> = full.labelled_charts().collect();
        assert_eq!(
            charts,
            [
                ("Price Movement", Some("AAAA")),
                ("Buy/Sell Analysis", None),
                ("sparkline", Some("BBBB")),
            ]
        );
        for kind in ChartKind::ALL {
            assert_eq!(ChartKind::from_analysis_key(kind.analysis_key()), Some(kind));
        }
        assert_eq!(ChartKind::from_analysis_key("price"), None);
    }
}
