//! Tradescope CLI: one-shot catalogue queries, trade fetches and analysis.
//!
//! Commands:
//! - `categories`: list catalogue categories
//! - `series <category>`: list the series in a category
//! - `tickers <series>`: list a series' tickers and market details
//! - `browse <category> <series> <ticker>`: drill down, then fetch trades
//! - `trades <ticker>`: fetch trades, filter, sort, optionally export CSV
//! - `analysis stats|metrics|all|chart <kind>`: server-side analysis of the last fetch

mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tradescope_core::analysis::{metric_cards, stat_cards, AnalysisContent, AnalysisTab};
use tradescope_core::catalogue::{
    CatalogueCall, CatalogueReply, CatalogueRequest, CatalogueService, FixtureCatalogue, TradeForm,
};
use tradescope_core::domain::ChartKind;
use tradescope_core::{export, Applied, Explorer, ExplorerConfig, Intent};

/// Config file picked up from the working directory when `--config` is absent.
const LOCAL_CONFIG: &str = "tradescope.toml";

#[derive(Parser)]
#[command(
    name = "tradescope",
    about = "Tradescope CLI — browse a market-trade catalogue and analyse trades"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./tradescope.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and TRADESCOPE_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Use the built-in demo catalogue instead of a backend.
    #[arg(long, global = true, default_value_t = false)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalogue categories.
    Categories,
    /// List the series in a category.
    Series {
        category: String,
    },
    /// List a series' tickers with market details when available.
    Tickers {
        series: String,
    },
    /// Drill down category → series → ticker, then fetch its trades.
    Browse {
        category: String,
        series: String,
        ticker: String,

        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Fetch trades for a ticker.
    Trades {
        ticker: String,

        #[command(flatten)]
        fetch: FetchArgs,
    },
    /// Analysis of the most recent trade fetch.
    Analysis {
        #[command(subcommand)]
        action: AnalysisAction,

        /// Fetch this ticker's trades first.
        #[arg(long, global = true)]
        ticker: Option<String>,

        /// Print the raw payload as JSON.
        #[arg(long, global = true, default_value_t = false)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum AnalysisAction {
    /// Basic trade statistics.
    Stats,
    /// Advanced metrics.
    Metrics,
    /// Statistics, metrics and the list of available charts.
    All,
    /// Render a chart to PNG.
    Chart {
        /// price, volume, side_analysis, heatmap, price_distribution, time_series.
        kind: ChartKind,

        /// Output file. Defaults to chart_<kind>_<date>.png in the export directory.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct FetchArgs {
    /// Window start (YYYY-MM-DD, inclusive).
    #[arg(long)]
    from: Option<String>,

    /// Window end (YYYY-MM-DD, inclusive).
    #[arg(long)]
    to: Option<String>,

    /// Maximum trades to request. Defaults to the configured limit.
    #[arg(long)]
    limit: Option<u32>,

    /// Ignore the window and fetch up to 1000 trades.
    #[arg(long, default_value_t = false)]
    all: bool,

    /// Keep rows where any cell contains this text (case-insensitive).
    #[arg(long)]
    query: Option<String>,

    /// Sort by column. Repeat a column to flip it to descending.
    #[arg(long = "sort", value_name = "COLUMN")]
    sort: Vec<String>,

    /// Write the visible rows to trades_<date>.csv.
    #[arg(long, default_value_t = false)]
    export: bool,

    /// Export directory. Defaults to the configured one.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.api_url)?;
    let service: Box<dyn CatalogueService> = if cli.demo {
        Box::new(FixtureCatalogue::demo())
    } else {
        Box::new(
            config
                .connect()
                .with_context(|| format!("connecting to {}", config.api.base_url))?,
        )
    };
    debug!(service = service.name(), "catalogue ready");

    match cli.command {
        Commands::Categories => run_categories(service.as_ref()),
        Commands::Series { category } => run_series(service.as_ref(), &category),
        Commands::Tickers { series } => run_tickers(service.as_ref(), &series),
        Commands::Browse {
            category,
            series,
            ticker,
            fetch,
        } => run_browse(&config, service.as_ref(), &category, &series, &ticker, &fetch),
        Commands::Trades { ticker, fetch } => run_trades(&config, service.as_ref(), &ticker, &fetch),
        Commands::Analysis {
            action,
            ticker,
            json,
        } => run_analysis(&config, service.as_ref(), action, ticker.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>, api_url: Option<String>) -> Result<ExplorerConfig> {
    let config = match path {
        Some(path) => ExplorerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if Path::new(LOCAL_CONFIG).exists() => ExplorerConfig::load(Path::new(LOCAL_CONFIG))
            .with_context(|| format!("loading config {LOCAL_CONFIG}"))?,
        None => ExplorerConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if let Some(url) = api_url {
        config.api.base_url = url;
    }
    Ok(config)
}

/// Execute the request for `intent`, if any, and apply its response.
fn drive(explorer: &mut Explorer, service: &dyn CatalogueService, intent: Intent) -> Result<()> {
    if let Some(request) = explorer.dispatch(intent)? {
        execute(explorer, service, request)?;
    }
    Ok(())
}

fn execute(
    explorer: &mut Explorer,
    service: &dyn CatalogueService,
    request: CatalogueRequest,
) -> Result<Applied> {
    let what = request.call.describe();
    debug!(ticket = %request.ticket, call = %what, "executing");
    let applied = explorer
        .apply(request.execute(service))
        .with_context(|| format!("fetching {what}"))?;
    if applied == Applied::Stale {
        // Requests run one at a time here, so nothing can supersede them.
        bail!("response for {what} arrived stale");
    }
    Ok(applied)
}

// ── Catalogue listings ───────────────────────────────────────────────

fn run_categories(service: &dyn CatalogueService) -> Result<()> {
    let categories = service.categories().context("listing categories")?;
    for category in &categories {
        println!("{}", category.name);
    }
    Ok(())
}

fn run_series(service: &dyn CatalogueService, category: &str) -> Result<()> {
    let series = service
        .series_in_category(category)
        .with_context(|| format!("listing series in {category}"))?;
    if series.is_empty() {
        println!("No series in {category}.");
        return Ok(());
    }
    render::print_series(&series);
    Ok(())
}

fn run_tickers(service: &dyn CatalogueService, series: &str) -> Result<()> {
    let listing = service
        .series_tickers(series)
        .with_context(|| format!("listing tickers of {series}"))?;
    if listing.tickers.is_empty() {
        println!("No tickers in {series}.");
        return Ok(());
    }
    render::print_tickers(&listing);
    Ok(())
}

// ── Trades ───────────────────────────────────────────────────────────

fn run_browse(
    config: &ExplorerConfig,
    service: &dyn CatalogueService,
    category: &str,
    series: &str,
    ticker: &str,
    args: &FetchArgs,
) -> Result<()> {
    let mut explorer = Explorer::new(config.fields.clone(), trade_form(config, args)?);
    drive(&mut explorer, service, Intent::CategorySelected(category.to_string()))?;
    drive(&mut explorer, service, Intent::SeriesSelected(series.to_string()))?;
    drive(&mut explorer, service, Intent::TickerSelected(ticker.to_string()))?;

    println!("{}", explorer.navigation().breadcrumb());
    match explorer.navigator().selected_market() {
        Some(market) => render::print_market(market),
        None => {
            let siblings = explorer.navigator().event_tickers();
            if !siblings.contains(&ticker.to_string()) {
                warn!(ticker, "ticker not found among its event's tickers");
            }
            println!("Event tickers: {}", siblings.join(", "));
        }
    }
    println!();

    drive(&mut explorer, service, Intent::FetchTrades)?;
    show_trades(config, &mut explorer, args)
}

fn run_trades(
    config: &ExplorerConfig,
    service: &dyn CatalogueService,
    ticker: &str,
    args: &FetchArgs,
) -> Result<()> {
    let mut explorer = Explorer::new(config.fields.clone(), trade_form(config, args)?);
    let request = explorer.fetch_ticker(Some(ticker))?;
    execute(&mut explorer, service, request)?;
    show_trades(config, &mut explorer, args)
}

/// Apply query and sorts, print the view, export if asked.
fn show_trades(config: &ExplorerConfig, explorer: &mut Explorer, args: &FetchArgs) -> Result<()> {
    if let Some(query) = &args.query {
        explorer.dispatch(Intent::QueryChanged(query.clone()))?;
    }
    for column in &args.sort {
        explorer.dispatch(Intent::SortColumnSelected(column.clone()))?;
    }

    let store = explorer.store();
    let view = store.current_view();
    if store.is_empty() {
        println!("No trades found.");
        return Ok(());
    }
    render::print_view(&view, store.kinds(), &config.export.preferred_columns);
    println!();
    let sort = store.sort_state();
    match &sort.column {
        Some(column) => println!(
            "{} of {} trades, sorted by {column} {}",
            store.result_count(),
            store.dataset().len(),
            sort.direction.arrow()
        ),
        None => println!("{} of {} trades", store.result_count(), store.dataset().len()),
    }

    if args.export {
        let dir = args.export_dir.as_deref().unwrap_or(&config.export.dir);
        let today = chrono::Local::now().date_naive();
        let path = export::write_csv(&view, &config.export.preferred_columns, dir, today)?;
        println!("Exported to: {}", path.display());
    }
    Ok(())
}

/// Start with the configured window; explicit dates and limit replace it.
fn trade_form(config: &ExplorerConfig, args: &FetchArgs) -> Result<TradeForm> {
    let mut form = if args.from.is_some() || args.to.is_some() {
        TradeForm {
            min_ts: args.from.as_deref().map(day_start).transpose()?,
            max_ts: args.to.as_deref().map(day_end).transpose()?,
            ..TradeForm::unbounded(Some(config.fetch.limit))
        }
    } else {
        config.trade_form()
    };
    if let Some(limit) = args.limit {
        form.limit = Some(limit);
    }
    form.fetch_all = args.all;
    Ok(form)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn day_start(s: &str) -> Result<i64> {
    Ok(parse_date(s)?.and_time(NaiveTime::MIN).and_utc().timestamp())
}

fn day_end(s: &str) -> Result<i64> {
    let next = parse_date(s)? + Duration::days(1);
    Ok(next.and_time(NaiveTime::MIN).and_utc().timestamp() - 1)
}

// ── Analysis ─────────────────────────────────────────────────────────

fn run_analysis(
    config: &ExplorerConfig,
    service: &dyn CatalogueService,
    action: AnalysisAction,
    ticker: Option<&str>,
    json: bool,
) -> Result<()> {
    let (tab, chart, out) = match action {
        AnalysisAction::Stats => (AnalysisTab::Stats, None, None),
        AnalysisAction::Metrics => (AnalysisTab::Metrics, None, None),
        AnalysisAction::All => (AnalysisTab::All, None, None),
        AnalysisAction::Chart { kind, out } => (AnalysisTab::Charts, Some(kind), out),
    };

    let content = match ticker {
        Some(ticker) => analyse_fresh(config, service, ticker, tab, chart)?,
        None => analyse_last(service, tab, chart)?,
    };

    if json {
        let text = match &content {
            AnalysisContent::Stats(s) => serde_json::to_string_pretty(s)?,
            AnalysisContent::Metrics(m) => serde_json::to_string_pretty(m)?,
            AnalysisContent::Chart(c) => serde_json::to_string_pretty(c)?,
            AnalysisContent::All(a) => serde_json::to_string_pretty(a)?,
        };
        println!("{text}");
        return Ok(());
    }

    match &content {
        AnalysisContent::Stats(stats) => render::print_cards("Trade Statistics", &stat_cards(stats)),
        AnalysisContent::Metrics(m) => render::print_cards("Advanced Metrics", &metric_cards(m)),
        AnalysisContent::All(all) => {
            render::print_cards("Trade Statistics", &stat_cards(&all.basic_stats));
            println!();
            render::print_cards("Advanced Metrics", &metric_cards(&all.advanced_metrics));
            println!();
            let charts: Vec<&str> = all
                .labelled_charts()
                .filter(|(_, data)| data.is_some())
                .map(|(name, _)| name)
                .collect();
            println!("Charts available: {}", charts.join(", "));
        }
        AnalysisContent::Chart(image) => {
            let path = match out {
                Some(path) => {
                    let png = export::chart_png(image)?;
                    std::fs::write(&path, png)
                        .with_context(|| format!("writing {}", path.display()))?;
                    path
                }
                None => export::write_chart(image, &config.export.dir, chrono::Local::now().date_naive())?,
            };
            println!("Chart saved to: {}", path.display());
        }
    }
    Ok(())
}

/// Fetch `ticker`'s trades, then run the analysis session on them.
fn analyse_fresh(
    config: &ExplorerConfig,
    service: &dyn CatalogueService,
    ticker: &str,
    tab: AnalysisTab,
    chart: Option<ChartKind>,
) -> Result<AnalysisContent> {
    let mut explorer = Explorer::new(config.fields.clone(), config.trade_form());
    let request = explorer.fetch_ticker(Some(ticker))?;
    execute(&mut explorer, service, request)?;

    drive(&mut explorer, service, Intent::AnalysisOpened)?;
    if let Some(kind) = chart {
        explorer.dispatch(Intent::ChartSelected(kind))?;
    }
    if tab != AnalysisTab::Stats {
        drive(&mut explorer, service, Intent::AnalysisTabSelected(tab))?;
    }
    explorer
        .analysis()
        .content()
        .cloned()
        .context("analysis returned no content")
}

/// Ask the service about whatever it fetched last.
fn analyse_last(
    service: &dyn CatalogueService,
    tab: AnalysisTab,
    chart: Option<ChartKind>,
) -> Result<AnalysisContent> {
    let call = match tab {
        AnalysisTab::Stats => CatalogueCall::Stats,
        AnalysisTab::Metrics => CatalogueCall::Metrics,
        AnalysisTab::Charts => CatalogueCall::Chart(chart.unwrap_or(ChartKind::Price)),
        AnalysisTab::All => CatalogueCall::FullAnalysis,
    };
    let what = call.describe();
    let content = match service.execute(&call).with_context(|| format!("fetching {what}"))? {
        CatalogueReply::Stats(s) => AnalysisContent::Stats(s),
        CatalogueReply::Metrics(m) => AnalysisContent::Metrics(m),
        CatalogueReply::Chart(c) => AnalysisContent::Chart(c),
        CatalogueReply::FullAnalysis(a) => AnalysisContent::All(a),
        other => bail!("unexpected reply to {what}: {other:?}"),
    };
    Ok(content)
}
