//! In-memory backend with a small, deterministic catalogue.
//!
//! Used by the integration tests and by `--demo` in both front ends. Trades
//! are generated from the ticker name, so the same query always yields the
//! same rows. Like the real service, the analysis endpoints work on the
//! trades of the last fetch.

use std::cell::RefCell;
use std::collections::BTreeMap;

use chrono::DateTime;

use super::service::{CatalogueError, CatalogueService};
use super::trade_query::TradeQuery;
use crate::domain::{
    event_ticker_of, AdvancedMetrics, CategoryMetadata, ChartImage, ChartKind, DateRange, EventTickers,
    FullAnalysis, MarketMetadata, PriceStats, Record, SeriesMetadata, TickerListing,
    TradeStatistics,
};

/// Newest trade time when a query has no upper bound (2024-06-01T00:00:00Z).
const ANCHOR_TS: i64 = 1_717_200_000;

/// Most trades a single fixture query returns.
const MAX_GENERATED: u32 = 60;

/// 1x1 transparent PNG.
const PLACEHOLDER_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

const NO_DATA: &str = "No data available. Please fetch trades first.";

pub struct FixtureCatalogue {
    series: Vec<SeriesMetadata>,
    markets: Vec<MarketMetadata>,
    last_trades: RefCell<Vec<Record>>,
    fail_next: RefCell<Option<CatalogueError>>,
}

fn market(ticker: &str, title: &str, status: &str, volume: f64, last_price: f64) -> MarketMetadata {
    let event = event_ticker_of(ticker);
    MarketMetadata {
        ticker: ticker.to_string(),
        event_ticker: event.to_string(),
        title: title.to_string(),
        status: status.to_string(),
        volume: Some(volume),
        last_price: Some(last_price),
        open_time: Some("2024-01-01T00:00:00Z".into()),
        close_time: Some("2024-12-31T23:59:59Z".into()),
    }
}

fn series(ticker: &str, title: &str, category: &str, frequency: &str, tags: &[&str]) -> SeriesMetadata {
    SeriesMetadata {
        ticker: ticker.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        frequency: frequency.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..SeriesMetadata::default()
    }
}

impl FixtureCatalogue {
    /// Catalogue with four series across three categories.
    pub fn demo() -> Self {
        let series = vec![
            series("CPI", "CPI year-over-year", "Economics", "monthly", &["Inflation"]),
            series("FED", "Fed funds target rate", "Economics", "custom", &["Interest rates"]),
            series("PRES", "Presidential election winner", "Politics", "custom", &["Elections"]),
            series("HIGHNY", "Highest temperature in NYC", "Climate and Weather", "daily", &[]),
        ];
        let markets = vec![
            market("CPI-24-T1", "CPI above 3.0%", "active", 15_230.0, 45.0),
            market("CPI-24-T2", "CPI above 3.5%", "active", 8_410.0, 22.0),
            market("CPI-24-T3", "CPI above 4.0%", "closed", 2_005.0, 4.0),
            market("FED-25-H0", "Fed holds rates", "active", 40_112.0, 71.0),
            market("FED-25-C25", "Fed cuts 25bp", "active", 33_870.0, 27.0),
            market("PRES-28-DEM", "Democratic candidate wins", "active", 120_400.0, 48.0),
            market("PRES-28-REP", "Republican candidate wins", "active", 118_950.0, 51.0),
            market("HIGHNY-24JUN01-T80", "High above 80°F", "closed", 3_300.0, 99.0),
            market("HIGHNY-24JUN01-T85", "High above 85°F", "active", 2_950.0, 12.0),
        ];
        Self {
            series,
            markets,
            last_trades: RefCell::new(Vec::new()),
            fail_next: RefCell::new(None),
        }
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: CatalogueError) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    fn check(&self) -> Result<(), CatalogueError> {
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn with_trades<T>(&self, f: impl FnOnce(&[Record]) -> T) -> Result<T, CatalogueError> {
        self.check()?;
        let trades = self.last_trades.borrow();
        if trades.is_empty() {
            return Err(CatalogueError::Remote(NO_DATA.into()));
        }
        Ok(f(&trades))
    }
}

impl Default for FixtureCatalogue {
    fn default() -> Self {
        Self::demo()
    }
}

impl CatalogueService for FixtureCatalogue {
    fn name(&self) -> &str {
        "fixture"
    }

    fn categories(&self) -> Result<Vec<CategoryMetadata>, CatalogueError> {
        self.check()?;
        let mut names: Vec<&str> = Vec::new();
        for s in &self.series {
            if !names.contains(&s.category.as_str()) {
                names.push(&s.category);
            }
        }
        Ok(names.into_iter().map(CategoryMetadata::new).collect())
    }

    fn series_in_category(&self, category: &str) -> Result<Vec<SeriesMetadata>, CatalogueError> {
        self.check()?;
        Ok(self
            .series
            .iter()
            .filter(|s| s.category == category)
            .map(|s| {
                let count = self.markets_of(&s.ticker).count() as u64;
                SeriesMetadata {
                    market_count: Some(count),
                    ..s.clone()
                }
            })
            .collect())
    }

    /// Closed markets are listed by ticker only, so selecting one goes
    /// through the event lookup.
    fn series_tickers(&self, series: &str) -> Result<TickerListing, CatalogueError> {
        self.check()?;
        let markets: Vec<&MarketMetadata> = self.markets_of(series).collect();
        Ok(TickerListing {
            tickers: markets.iter().map(|m| m.ticker.clone()).collect(),
            markets: markets
                .into_iter()
                .filter(|m| m.status == "active")
                .cloned()
                .collect(),
        })
    }

    fn event_tickers(&self, event: &str) -> Result<EventTickers, CatalogueError> {
        self.check()?;
        let tickers: Vec<String> = self
            .markets
            .iter()
            .filter(|m| m.event_ticker == event)
            .map(|m| m.ticker.clone())
            .collect();
        Ok(EventTickers {
            count: tickers.len(),
            tickers,
        })
    }

    fn trades(&self, query: &TradeQuery) -> Result<Vec<Record>, CatalogueError> {
        self.check()?;
        let trades = generate_trades(query);
        *self.last_trades.borrow_mut() = trades.clone();
        Ok(trades)
    }

    fn stats(&self) -> Result<TradeStatistics, CatalogueError> {
        self.with_trades(statistics)
    }

    fn metrics(&self) -> Result<AdvancedMetrics, CatalogueError> {
        self.with_trades(metrics)
    }

    fn chart(&self, kind: ChartKind) -> Result<ChartImage, CatalogueError> {
        self.with_trades(|_| ChartImage {
            chart_type: kind.slug().to_string(),
            image_data: PLACEHOLDER_PNG.to_string(),
        })
    }

    fn full_analysis(&self) -> Result<FullAnalysis, CatalogueError> {
        self.with_trades(|trades| FullAnalysis {
            basic_stats: statistics(trades),
            advanced_metrics: metrics(trades),
            charts: ChartKind::ALL
                .iter()
                .map(|k| (k.analysis_key().to_string(), Some(PLACEHOLDER_PNG.to_string())))
                .collect(),
        })
    }
}

impl FixtureCatalogue {
    fn markets_of<'a>(&'a self, series: &'a str) -> impl Iterator<Item = &'a MarketMetadata> + 'a {
        self.markets.iter().filter(move |m| {
            m.ticker
                .strip_prefix(series)
                .is_some_and(|rest| rest.starts_with('-'))
        })
    }
}

/// FNV-1a over the ticker bytes.
fn seed_of(ticker: &str) -> u64 {
    ticker.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn generate_trades(query: &TradeQuery) -> Vec<Record> {
    let n = query.limit.min(MAX_GENERATED) as i64;
    if n == 0 {
        return Vec::new();
    }
    let seed = seed_of(&query.ticker);
    let newest = query.max_ts.unwrap_or(ANCHOR_TS);
    let step = match query.min_ts {
        Some(min) if newest > min => ((newest - min) / n).max(1),
        Some(_) => 0,
        None => 3_600,
    };

    (0..n)
        .filter_map(|i| {
            let ts = newest - i * step;
            let created = DateTime::from_timestamp(ts, 0)?;
            let mix = seed.wrapping_add(i as u64 * 0x9e37_79b9);
            let yes_price = 1 + (mix % 98) as i64;
            let count = 1 + ((mix >> 8) % 50) as i64;
            let side = if (mix >> 16) % 3 == 0 { "no" } else { "yes" };
            Some(
                Record::new()
                    .with("trade_id", format!("{}-{:04}", query.ticker, i))
                    .with("ticker", query.ticker.clone())
                    .with("count", count)
                    .with("created_time", created.to_rfc3339())
                    .with("yes_price", yes_price)
                    .with("no_price", 100 - yes_price)
                    .with("taker_side", side),
            )
        })
        .collect()
}

fn numbers(trades: &[Record], column: &str) -> Vec<f64> {
    trades
        .iter()
        .filter_map(|r| r.get(column).and_then(|v| v.as_f64()))
        .collect()
}

fn mean(xs: &[f64]) -> Option<f64> {
    (!xs.is_empty()).then(|| xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Sample standard deviation.
fn std_dev(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    if xs.len() < 2 {
        return None;
    }
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    Some(var.sqrt())
}

fn price_stats(xs: &[f64]) -> PriceStats {
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(sorted[n / 2]),
        n => Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0),
    };
    PriceStats {
        mean: mean(xs),
        median,
        min: sorted.first().copied(),
        max: sorted.last().copied(),
        std: std_dev(xs),
    }
}

fn counts(trades: &[Record], column: &str) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    for r in trades {
        if let Some(v) = r.get(column).filter(|v| !v.is_null()) {
            *out.entry(v.to_text()).or_insert(0) += 1;
        }
    }
    out
}

fn statistics(trades: &[Record]) -> TradeStatistics {
    let yes = numbers(trades, "yes_price");
    let no = numbers(trades, "no_price");
    let spread: Vec<f64> = yes.iter().zip(&no).map(|(y, n)| y - n).collect();
    let mut times: Vec<_> = trades
        .iter()
        .filter_map(|r| r.get("created_time").and_then(|v| v.as_timestamp()))
        .collect();
    times.sort();
    let ticker_distribution = counts(trades, "ticker");

    TradeStatistics {
        total_trades: trades.len() as u64,
        unique_tickers: ticker_distribution.len() as u64,
        date_range: DateRange {
            start: times.first().map(|t| t.to_rfc3339()),
            end: times.last().map(|t| t.to_rfc3339()),
        },
        taker_side_distribution: counts(trades, "taker_side"),
        ticker_distribution,
        yes_price_stats: price_stats(&yes),
        no_price_stats: price_stats(&no),
        spread_stats: price_stats(&spread),
    }
}

fn metrics(trades: &[Record]) -> AdvancedMetrics {
    let yes = numbers(trades, "yes_price");
    let no = numbers(trades, "no_price");
    let sizes = numbers(trades, "count");
    let mut m = AdvancedMetrics::default();

    if let (Some(mu), Some(sd)) = (mean(&yes), std_dev(&yes)) {
        m.price_volatility = sd;
        if sd > 0.0 {
            let n = yes.len() as f64;
            let z = |p: i32| yes.iter().map(|x| ((x - mu) / sd).powi(p)).sum::<f64>() / n;
            m.price_skewness = z(3);
            m.price_kurtosis = z(4) - 3.0;
        }
    }
    let spreads: Vec<f64> = yes.iter().zip(&no).map(|(y, n)| y - n).collect();
    m.price_spread = mean(&spreads).unwrap_or(0.0);

    m.avg_trade_size = mean(&sizes).unwrap_or(0.0);
    m.largest_trade = sizes.iter().copied().fold(0.0, f64::max);
    let volume: f64 = sizes.iter().sum();
    if volume > 0.0 {
        m.volume_weighted_avg_price =
            yes.iter().zip(&sizes).map(|(p, c)| p * c).sum::<f64>() / volume;
    }

    let mut sides: Vec<u64> = counts(trades, "taker_side").into_values().collect();
    sides.sort_unstable_by(|a, b| b.cmp(a));
    if let [first, second, ..] = sides[..] {
        m.buy_sell_ratio = first as f64 / second as f64;
    }

    let stats = statistics(trades);
    let span = stats
        .date_range
        .start
        .zip(stats.date_range.end)
        .and_then(|(s, e)| {
            let s = DateTime::parse_from_rfc3339(&s).ok()?;
            let e = DateTime::parse_from_rfc3339(&e).ok()?;
            Some((e - s).num_seconds() as f64 / 3600.0)
        })
        .unwrap_or(0.0);
    if span > 0.0 {
        m.trading_intensity = trades.len() as f64 / span;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::TradeForm;

    fn query(ticker: &str, limit: u32) -> TradeQuery {
        TradeQuery::build(Some(ticker), &TradeForm::unbounded(Some(limit))).unwrap()
    }

    #[test]
    fn catalogue_hierarchy() {
        let f = FixtureCatalogue::demo();
        let cats = f.categories().unwrap();
        assert_eq!(cats[0].name, "Economics");
        assert_eq!(cats.len(), 3);

        let eco = f.series_in_category("Economics").unwrap();
        assert_eq!(eco.len(), 2);
        assert_eq!(eco[0].market_count, Some(3));

        let listing = f.series_tickers("CPI").unwrap();
        assert_eq!(listing.tickers, ["CPI-24-T1", "CPI-24-T2", "CPI-24-T3"]);
        assert!(listing.market("CPI-24-T1").is_some());
        assert!(listing.market("CPI-24-T3").is_none());

        let event = f.event_tickers("CPI-24").unwrap();
        assert_eq!(event.count, 3);
    }

    #[test]
    fn trades_are_deterministic_and_bounded() {
        let f = FixtureCatalogue::demo();
        let a = f.trades(&query("CPI-24-T1", 25)).unwrap();
        let b = f.trades(&query("CPI-24-T1", 25)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 25);
        assert_eq!(f.trades(&query("CPI-24-T1", 1000)).unwrap().len(), 60);
        for r in &a {
            let yes = r.get("yes_price").and_then(|v| v.as_f64()).unwrap();
            let no = r.get("no_price").and_then(|v| v.as_f64()).unwrap();
            assert_eq!(yes + no, 100.0);
        }
    }

    #[test]
    fn analysis_needs_a_prior_fetch() {
        let f = FixtureCatalogue::demo();
        assert_eq!(f.stats().unwrap_err(), CatalogueError::Remote(NO_DATA.into()));
        f.trades(&query("FED-25-H0", 10)).unwrap();
        let stats = f.stats().unwrap();
        assert_eq!(stats.total_trades, 10);
        assert_eq!(stats.unique_tickers, 1);
        assert!(stats.yes_price_stats.mean.is_some());
        let chart = f.chart(ChartKind::Heatmap).unwrap();
        assert_eq!(chart.chart_type, "heatmap");
        let full = f.full_analysis().unwrap();
        assert_eq!(full.charts.len(), 6);
        assert!(full.charts.contains_key("price_chart"));
        assert!(full.charts.contains_key("side_analysis"));
        let names: Vec<&str> = full.labelled_charts().map(|(name, _)| name).collect();
        assert!(names.contains(&"Buy/Sell Analysis"));
    }

    #[test]
    fn injected_failure_is_one_shot() {
        let f = FixtureCatalogue::demo();
        f.fail_next(CatalogueError::Http { status: 503 });
        assert_eq!(f.categories().unwrap_err(), CatalogueError::Http { status: 503 });
        assert!(f.categories().is_ok());
    }

    #[test]
    fn price_stats_median() {
        let s = price_stats(&[3.0, 1.0, 2.0, 10.0]);
        assert_eq!(s.median, Some(2.5));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(10.0));
        assert_eq!(price_stats(&[]).mean, None);
    }
}
