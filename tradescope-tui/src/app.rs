//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. Engine state lives in the [`Explorer`]; the
//! worker thread executes the requests it emits and sends the responses
//! back over a channel.

use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tradescope_core::analysis::AnalysisContent;
use tradescope_core::catalogue::{CatalogueRequest, CatalogueResponse, Channel, TradeForm};
use tradescope_core::error::{ExportError, NavigationError};
use tradescope_core::export;
use tradescope_core::navigation::NavigationState;
use tradescope_core::{Applied, Explorer, ExplorerConfig, ExplorerError, Intent};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Most entries kept in the error history.
pub const ERROR_HISTORY_CAP: usize = 50;

/// Rows moved by PageUp/PageDown; also the scroll estimate between draws.
pub const PAGE_ROWS: usize = 20;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Browse,
    Trades,
    Analysis,
    Help,
}

impl Panel {
    pub const COUNT: usize = 4;

    pub fn index(self) -> usize {
        match self {
            Panel::Browse => 0,
            Panel::Trades => 1,
            Panel::Analysis => 2,
            Panel::Help => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Browse),
            1 => Some(Panel::Trades),
            2 => Some(Panel::Analysis),
            3 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Browse => "Browse",
            Panel::Trades => "Trades",
            Panel::Analysis => "Analysis",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        match self {
            Panel::Browse => Panel::Trades,
            Panel::Trades => Panel::Analysis,
            Panel::Analysis => Panel::Help,
            Panel::Help => Panel::Browse,
        }
    }

    pub fn prev(self) -> Panel {
        match self {
            Panel::Browse => Panel::Help,
            Panel::Trades => Panel::Browse,
            Panel::Analysis => Panel::Trades,
            Panel::Help => Panel::Analysis,
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Input,
    Navigation,
    Export,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Navigation => "NAV",
            ErrorCategory::Export => "EXPORT",
            ErrorCategory::Other => "ERR",
        }
    }

    pub fn of(err: &ExplorerError) -> Self {
        match err {
            ExplorerError::Validation(_) => ErrorCategory::Input,
            ExplorerError::Navigation(NavigationError::Remote(_)) => ErrorCategory::Network,
            ExplorerError::Navigation(_) => ErrorCategory::Navigation,
            ExplorerError::Catalogue(_) => ErrorCategory::Network,
            ExplorerError::Export(_) => ErrorCategory::Export,
        }
    }
}

/// Which field of the fetch form has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FetchAll,
    Limit,
    Days,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::FetchAll => FormField::Limit,
            FormField::Limit => FormField::Days,
            FormField::Days => FormField::FetchAll,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::FetchAll => FormField::Days,
            FormField::Limit => FormField::FetchAll,
            FormField::Days => FormField::Limit,
        }
    }
}

/// Editable fetch form. Numeric fields are kept as typed text; blanks fall
/// back to the engine defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFormState {
    pub field: FormField,
    pub fetch_all: bool,
    pub limit: String,
    pub days: String,
}

impl FetchFormState {
    pub fn from_config(config: &ExplorerConfig) -> Self {
        Self {
            field: FormField::FetchAll,
            fetch_all: false,
            limit: config.fetch.limit.to_string(),
            days: config.fetch.lookback_days.to_string(),
        }
    }

    /// The form as the engine sees it. The window ends now.
    pub fn to_trade_form(&self) -> TradeForm {
        let limit = self.limit.trim().parse::<u32>().ok();
        if self.fetch_all {
            return TradeForm {
                fetch_all: true,
                ..TradeForm::unbounded(limit)
            };
        }
        match self.days.trim().parse::<i64>() {
            Ok(days) if days > 0 => TradeForm {
                limit,
                ..TradeForm::last_days(days, 0)
            },
            _ => TradeForm::unbounded(limit),
        }
    }

    pub fn focused_text(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::FetchAll => None,
            FormField::Limit => Some(&mut self.limit),
            FormField::Days => Some(&mut self.days),
        }
    }
}

/// Cursor over the current drill-down level.
#[derive(Debug, Clone, Default)]
pub struct BrowseState {
    pub cursor: usize,
}

/// Cursor and scroll over the trades table.
#[derive(Debug, Clone, Default)]
pub struct TradesState {
    pub row: usize,
    pub scroll: usize,
    /// Column the sort key acts on, as an index into the visible columns.
    pub column: usize,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    Search,
    FetchForm,
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Engine
    pub explorer: Explorer,
    pub config: ExplorerConfig,

    // Panel states
    pub browse: BrowseState,
    pub trades: TradesState,
    pub form: FetchFormState,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub search_input: String,
}

impl AppState {
    pub fn new(
        config: ExplorerConfig,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
    ) -> Self {
        let form = FetchFormState::from_config(&config);
        let explorer = Explorer::new(config.fields.clone(), form.to_trade_form());
        Self {
            active_panel: Panel::Browse,
            running: true,
            explorer,
            config,
            browse: BrowseState::default(),
            trades: TradesState::default(),
            form,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            search_input: String::new(),
        }
    }

    // ── Errors and status ────────────────────────────────────────────

    /// Push an error to the history, capping at [`ERROR_HISTORY_CAP`].
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        warn!(category = category.label(), %message, %context, "error");
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    fn push_explorer_error(&mut self, err: ExplorerError, context: impl Into<String>) {
        self.push_error(ErrorCategory::of(&err), err.to_string(), context.into());
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    // ── Engine round trip ────────────────────────────────────────────

    /// Dispatch an intent; hand any request to the worker. Returns whether
    /// the intent was accepted.
    pub fn submit(&mut self, intent: Intent) -> bool {
        let context = format!("{intent:?}");
        match self.explorer.dispatch(intent) {
            Ok(Some(request)) => {
                self.send(request);
                true
            }
            Ok(None) => true,
            Err(e) => {
                self.push_explorer_error(e, context);
                false
            }
        }
    }

    fn send(&mut self, request: CatalogueRequest) {
        let what = request.call.describe();
        if self.worker_tx.send(WorkerCommand::Execute(request)).is_err() {
            self.push_error(ErrorCategory::Other, "worker thread is not running".into(), what);
            return;
        }
        self.set_status(format!("Loading {what}..."));
    }

    pub fn handle_worker_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Completed(resp) => self.handle_response(resp),
        }
    }

    fn handle_response(&mut self, response: CatalogueResponse) {
        let channel = response.ticket.channel;
        match self.explorer.apply(response) {
            Ok(Applied::Navigation) => {
                self.browse.cursor = self.selected_browse_index().unwrap_or(0);
                self.set_status(self.explorer.navigation().breadcrumb());
            }
            Ok(Applied::Dataset { count }) => {
                self.trades = TradesState::default();
                let ticker = self.explorer.loaded_ticker().unwrap_or_default().to_string();
                let visible = self.explorer.store().result_count();
                if count == 0 {
                    self.set_warning(format!("No trades found for {ticker}"));
                } else {
                    self.set_status(format!("Loaded {count} trades for {ticker} ({visible} shown)"));
                }
            }
            Ok(Applied::Analysis) => {
                let tab = self.explorer.analysis().active_tab();
                self.set_status(format!("{} loaded", tab.label()));
            }
            Ok(Applied::Stale) => {}
            Err(e) => {
                let context = match channel {
                    Channel::Navigation => "browsing",
                    Channel::Trades => "fetching trades",
                    Channel::Analysis => "analysis",
                };
                self.push_explorer_error(e, context);
            }
        }
    }

    // ── Browse ───────────────────────────────────────────────────────

    /// Keys of the entries at the current drill-down level.
    pub fn browse_items(&self) -> Vec<String> {
        let nav = self.explorer.navigator();
        match nav.state() {
            NavigationState::AtCategories => {
                nav.categories().iter().map(|c| c.name.clone()).collect()
            }
            NavigationState::AtSeriesList { .. } => {
                nav.series_list().iter().map(|s| s.ticker.clone()).collect()
            }
            NavigationState::AtTickerList { .. } | NavigationState::TickerSelected { .. } => {
                nav.ticker_listing().tickers.clone()
            }
        }
    }

    fn selected_browse_index(&self) -> Option<usize> {
        let ticker = self.explorer.navigation().ticker()?;
        self.browse_items().iter().position(|t| t == ticker)
    }

    pub fn browse_move(&mut self, delta: isize) {
        let len = self.browse_items().len();
        self.browse.cursor = step(self.browse.cursor, delta, len);
    }

    /// Descend into (or switch to) the entry under the cursor.
    pub fn browse_select(&mut self) {
        let Some(item) = self.browse_items().into_iter().nth(self.browse.cursor) else {
            return;
        };
        let intent = match self.explorer.navigation() {
            NavigationState::AtCategories => Intent::CategorySelected(item),
            NavigationState::AtSeriesList { .. } => Intent::SeriesSelected(item),
            _ => Intent::TickerSelected(item),
        };
        if self.submit(intent) && !self.explorer.is_busy() {
            // Cached ticker selection: applied at once.
            self.set_status(self.explorer.navigation().breadcrumb());
        }
    }

    pub fn browse_back(&mut self) {
        if self.submit(Intent::Back) {
            self.browse.cursor = 0;
            self.set_status(self.explorer.navigation().breadcrumb());
        }
    }

    pub fn refresh_categories(&mut self) {
        self.browse.cursor = 0;
        self.submit(Intent::RefreshCategories);
    }

    // ── Trades ───────────────────────────────────────────────────────

    pub fn fetch_trades(&mut self) {
        if self.submit(Intent::FetchTrades) {
            self.active_panel = Panel::Trades;
        }
    }

    /// Push the form to the engine, then fetch with it.
    pub fn apply_form_and_fetch(&mut self) {
        self.submit(Intent::FormChanged(self.form.to_trade_form()));
        self.fetch_trades();
    }

    pub fn set_query(&mut self, text: String) {
        self.submit(Intent::QueryChanged(text));
        self.trades.row = 0;
        self.trades.scroll = 0;
    }

    /// Visible columns in display order.
    pub fn columns(&self) -> Vec<String> {
        let view = self.explorer.store().current_view();
        export::export_columns(&view, &self.config.export.preferred_columns)
    }

    pub fn trades_move(&mut self, delta: isize) {
        let len = self.explorer.store().result_count();
        self.trades.row = step(self.trades.row, delta, len);
        self.trades.scroll = scroll_window(self.trades.row, self.trades.scroll, PAGE_ROWS);
    }

    pub fn column_move(&mut self, delta: isize) {
        let len = self.columns().len();
        self.trades.column = step(self.trades.column, delta, len);
    }

    pub fn sort_by_selected_column(&mut self) {
        let Some(column) = self.columns().into_iter().nth(self.trades.column) else {
            return;
        };
        if self.submit(Intent::SortColumnSelected(column.clone())) {
            let dir = self.explorer.store().sort_state().direction;
            self.set_status(format!("Sorted by {column} {}", dir.arrow()));
        }
    }

    pub fn export_csv(&mut self) {
        let today = chrono::Local::now().date_naive();
        let result = export::write_csv(
            &self.explorer.store().current_view(),
            &self.config.export.preferred_columns,
            &self.config.export.dir,
            today,
        );
        match result {
            Ok(path) => self.set_status(format!("Exported to {}", path.display())),
            Err(ExportError::NothingToExport) => self.set_warning("No data to export"),
            Err(e) => self.push_explorer_error(e.into(), "exporting CSV"),
        }
    }

    // ── Analysis ─────────────────────────────────────────────────────

    pub fn open_analysis(&mut self) {
        if self.submit(Intent::AnalysisOpened) {
            self.active_panel = Panel::Analysis;
        }
    }

    pub fn save_chart(&mut self) {
        let Some(AnalysisContent::Chart(image)) = self.explorer.analysis().content().cloned() else {
            self.set_warning("No chart loaded");
            return;
        };
        let today = chrono::Local::now().date_naive();
        match export::write_chart(&image, &self.config.export.dir, today) {
            Ok(path) => {
                info!(path = %path.display(), "chart saved");
                self.set_status(format!("Chart saved to {}", path.display()));
            }
            Err(e) => self.push_explorer_error(e.into(), "saving chart"),
        }
    }
}

/// Move `cursor` by `delta` within `0..len`.
pub fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}

/// First visible row so that `cursor` stays inside a window of `height`
/// rows, moving the window as little as possible.
pub fn scroll_window(cursor: usize, offset: usize, height: usize) -> usize {
    if height == 0 {
        return cursor;
    }
    if cursor < offset {
        cursor
    } else if cursor >= offset + height {
        cursor + 1 - height
    } else {
        offset
    }
}
