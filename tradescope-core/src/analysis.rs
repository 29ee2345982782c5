//! Analysis session: tabbed views over statistics the service computes
//! from the last fetched trades.
//!
//! Only the active tab's content is held. Switching tabs clears it and
//! issues that tab's fetch; in-flight requests are never cancelled, they
//! are simply dropped on arrival unless they belong to the active tab and
//! are that tab's latest.

use chrono::Local;
use tracing::{debug, warn};

use crate::catalogue::{
    CatalogueCall, CatalogueError, CatalogueReply, CatalogueRequest, CatalogueResponse, Channel,
    Ticket, TicketCounter,
};
use crate::domain::{
    AdvancedMetrics, ChartImage, ChartKind, FullAnalysis, PriceStats, TradeStatistics, Value,
};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnalysisTab {
    #[default]
    Stats,
    Metrics,
    Charts,
    All,
}

impl AnalysisTab {
    pub const ALL: [AnalysisTab; 4] = [
        AnalysisTab::Stats,
        AnalysisTab::Metrics,
        AnalysisTab::Charts,
        AnalysisTab::All,
    ];

    pub fn index(self) -> usize {
        match self {
            AnalysisTab::Stats => 0,
            AnalysisTab::Metrics => 1,
            AnalysisTab::Charts => 2,
            AnalysisTab::All => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisTab::Stats => "Statistics",
            AnalysisTab::Metrics => "Metrics",
            AnalysisTab::Charts => "Charts",
            AnalysisTab::All => "All",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Materialized content of the active tab.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisContent {
    Stats(TradeStatistics),
    Metrics(AdvancedMetrics),
    Chart(ChartImage),
    All(FullAnalysis),
}

/// One titled figure for display, e.g. `Avg Yes Price: $45.50`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl StatCard {
    fn new(title: &'static str, value: String, unit: &'static str) -> Self {
        Self { title, value, unit }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisSession {
    open: bool,
    active: AnalysisTab,
    chart: ChartKind,
    tickets: TicketCounter,
    /// Latest ticket issued per tab, indexed by `AnalysisTab::index`.
    latest: [Option<Ticket>; 4],
    loading: bool,
    content: Option<AnalysisContent>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            open: false,
            active: AnalysisTab::Stats,
            chart: ChartKind::Price,
            tickets: TicketCounter::new(Channel::Analysis),
            latest: [None; 4],
            loading: false,
            content: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn active_tab(&self) -> AnalysisTab {
        self.active
    }

    pub fn chart_kind(&self) -> ChartKind {
        self.chart
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn content(&self) -> Option<&AnalysisContent> {
        self.content.as_ref()
    }

    /// Open on the statistics tab. Needs trades to analyse.
    pub fn open(&mut self, dataset_len: usize) -> Result<CatalogueRequest, ValidationError> {
        if dataset_len == 0 {
            return Err(ValidationError::NoData);
        }
        self.open = true;
        Ok(self.activate(AnalysisTab::Stats))
    }

    /// Switch tabs. `None` when the session is closed.
    pub fn select_tab(&mut self, tab: AnalysisTab) -> Option<CatalogueRequest> {
        if !self.open {
            return None;
        }
        Some(self.activate(tab))
    }

    /// Choose the chart kind. Re-fetches only while the charts tab is active.
    pub fn select_chart(&mut self, kind: ChartKind) -> Option<CatalogueRequest> {
        self.chart = kind;
        if self.open && self.active == AnalysisTab::Charts {
            Some(self.activate(AnalysisTab::Charts))
        } else {
            None
        }
    }

    /// Drop everything; responses still in flight become stale.
    pub fn close(&mut self) {
        self.open = false;
        self.active = AnalysisTab::Stats;
        self.latest = [None; 4];
        self.loading = false;
        self.content = None;
    }

    fn activate(&mut self, tab: AnalysisTab) -> CatalogueRequest {
        self.active = tab;
        self.content = None;
        self.loading = true;
        let ticket = self.tickets.issue();
        self.latest[tab.index()] = Some(ticket);
        let call = match tab {
            AnalysisTab::Stats => CatalogueCall::Stats,
            AnalysisTab::Metrics => CatalogueCall::Metrics,
            AnalysisTab::Charts => CatalogueCall::Chart(self.chart),
            AnalysisTab::All => CatalogueCall::FullAnalysis,
        };
        debug!(tab = tab.label(), %ticket, "analysis tab activated");
        CatalogueRequest { ticket, call }
    }

    /// Apply an analysis response. Returns `Ok(false)` for a stale one.
    pub fn apply(&mut self, response: CatalogueResponse) -> Result<bool, CatalogueError> {
        if !self.open || self.latest[self.active.index()] != Some(response.ticket) {
            debug!(ticket = %response.ticket, "stale analysis response dropped");
            return Ok(false);
        }
        self.loading = false;

        let reply = response.result.map_err(|e| {
            warn!(tab = self.active.label(), error = %e, "analysis fetch failed");
            e
        })?;
        let content = match (self.active, reply) {
            (AnalysisTab::Stats, CatalogueReply::Stats(s)) => AnalysisContent::Stats(s),
            (AnalysisTab::Metrics, CatalogueReply::Metrics(m)) => AnalysisContent::Metrics(m),
            (AnalysisTab::Charts, CatalogueReply::Chart(c)) => AnalysisContent::Chart(c),
            (AnalysisTab::All, CatalogueReply::FullAnalysis(a)) => AnalysisContent::All(a),
            (tab, _) => {
                return Err(CatalogueError::UnexpectedPayload {
                    expected: tab.label(),
                })
            }
        };
        self.content = Some(content);
        Ok(true)
    }
}

// ─── Stat cards ─────────────────────────────────────────────────────

const NA: &str = "N/A";

fn fixed(v: Option<f64>, places: usize) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.places$}"),
        _ => NA.to_string(),
    }
}

fn dollars(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("${x:.2}"),
        _ => NA.to_string(),
    }
}

fn range(s: &PriceStats) -> String {
    format!("{} - {}", dollars(s.min), dollars(s.max))
}

fn local_date(ts: &str) -> String {
    Value::from(ts)
        .as_timestamp()
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn stat_cards(stats: &TradeStatistics) -> Vec<StatCard> {
    let side = |name: &str| {
        stats
            .taker_side_distribution
            .get(name)
            .copied()
            .unwrap_or(0)
            .to_string()
    };
    let date_range = match (&stats.date_range.start, &stats.date_range.end) {
        (Some(start), Some(end)) => format!("{} to {}", local_date(start), local_date(end)),
        _ => NA.to_string(),
    };

    vec![
        StatCard::new("Total Trades", stats.total_trades.to_string(), "trades"),
        StatCard::new("Unique Tickers", stats.unique_tickers.to_string(), "tickers"),
        StatCard::new("Avg Yes Price", dollars(stats.yes_price_stats.mean), ""),
        StatCard::new("Yes Price Range", range(&stats.yes_price_stats), ""),
        StatCard::new("Yes Price Volatility", fixed(stats.yes_price_stats.std, 4), ""),
        StatCard::new("Avg No Price", dollars(stats.no_price_stats.mean), ""),
        StatCard::new("No Price Range", range(&stats.no_price_stats), ""),
        StatCard::new("No Price Volatility", fixed(stats.no_price_stats.std, 4), ""),
        StatCard::new("Avg Spread", dollars(stats.spread_stats.mean), ""),
        StatCard::new("Spread Range", range(&stats.spread_stats), ""),
        StatCard::new("Spread Volatility", fixed(stats.spread_stats.std, 4), ""),
        StatCard::new("Yes Trades", side("yes"), "trades"),
        StatCard::new("No Trades", side("no"), "trades"),
        StatCard::new("Date Range", date_range, ""),
    ]
}

pub fn metric_cards(m: &AdvancedMetrics) -> Vec<StatCard> {
    vec![
        StatCard::new("Price Volatility", fixed(Some(m.price_volatility), 4), ""),
        StatCard::new("Price Skewness", fixed(Some(m.price_skewness), 4), ""),
        StatCard::new("Price Kurtosis", fixed(Some(m.price_kurtosis), 4), ""),
        StatCard::new("Average Trade Size", fixed(Some(m.avg_trade_size), 2), "units"),
        StatCard::new("Largest Trade", fixed(Some(m.largest_trade), 0), "units"),
        StatCard::new("VWAP", dollars(Some(m.volume_weighted_avg_price)), ""),
        StatCard::new("Buy/Sell Ratio", fixed(Some(m.buy_sell_ratio), 2), ""),
        StatCard::new("Price Spread", dollars(Some(m.price_spread)), ""),
        StatCard::new("Trading Intensity", fixed(Some(m.trading_intensity), 2), "trades/hour"),
    ]
}
