//! Intent dispatch: the single entry point front ends drive.
//!
//! A front end turns operator input into an [`Intent`], passes it to
//! [`Explorer::dispatch`], runs any returned request against its catalogue
//! service, and feeds the response to [`Explorer::apply`].

use tracing::{debug, info, warn};

use crate::analysis::{AnalysisSession, AnalysisTab};
use crate::catalogue::{
    CatalogueCall, CatalogueError, CatalogueReply, CatalogueRequest, CatalogueResponse, Channel, Ticket,
    TicketCounter, TradeForm, TradeQuery,
};
use crate::domain::{ChartKind, FieldKinds};
use crate::error::{ExplorerError, ExportError, ValidationError};
use crate::export;
use crate::navigation::{NavigationState, Navigator};
use crate::store::DatasetStore;

/// Everything the operator can ask for.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    QueryChanged(String),
    SortColumnSelected(String),
    RefreshCategories,
    CategorySelected(String),
    SeriesSelected(String),
    TickerSelected(String),
    Back,
    FormChanged(TradeForm),
    FetchTrades,
    AnalysisOpened,
    AnalysisTabSelected(AnalysisTab),
    ChartSelected(ChartKind),
    AnalysisClosed,
}

/// What applying a response changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Navigation,
    Dataset { count: usize },
    Analysis,
    /// Superseded before it arrived; nothing changed.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Explorer {
    store: DatasetStore,
    navigator: Navigator,
    analysis: AnalysisSession,
    form: TradeForm,
    trade_tickets: TicketCounter,
    /// In-flight trade fetch and the ticker it was issued for.
    pending_trades: Option<(Ticket, String)>,
    loaded_ticker: Option<String>,
}

impl Explorer {
    pub fn new(kinds: FieldKinds, form: TradeForm) -> Self {
        Self {
            store: DatasetStore::new(kinds),
            navigator: Navigator::new(),
            analysis: AnalysisSession::new(),
            form,
            trade_tickets: TicketCounter::new(Channel::Trades),
            pending_trades: None,
            loaded_ticker: None,
        }
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigation(&self) -> &NavigationState {
        self.navigator.state()
    }

    pub fn analysis(&self) -> &AnalysisSession {
        &self.analysis
    }

    pub fn form(&self) -> &TradeForm {
        &self.form
    }

    /// Ticker of the trades currently in the store.
    pub fn loaded_ticker(&self) -> Option<&str> {
        self.loaded_ticker.as_deref()
    }

    pub fn is_fetching_trades(&self) -> bool {
        self.pending_trades.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.is_fetching_trades() || self.navigator.is_loading() || self.analysis.is_loading()
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<Option<CatalogueRequest>, ExplorerError> {
        debug!(?intent, "dispatch");
        let request = match intent {
            Intent::QueryChanged(text) => {
                self.store.set_query(text);
                None
            }
            Intent::SortColumnSelected(column) => {
                self.store.sort_by(&column);
                None
            }
            Intent::RefreshCategories => Some(self.navigator.load_categories()?),
            Intent::CategorySelected(c) => Some(self.navigator.select_category(&c)?),
            Intent::SeriesSelected(s) => Some(self.navigator.select_series(&s)?),
            Intent::TickerSelected(t) => self.navigator.select_ticker(&t)?,
            Intent::Back => {
                self.navigator.back()?;
                None
            }
            Intent::FormChanged(form) => {
                self.form = form;
                None
            }
            Intent::FetchTrades => {
                let ticker = self.navigator.state().ticker().map(str::to_string);
                Some(self.fetch_ticker(ticker.as_deref())?)
            }
            Intent::AnalysisOpened => Some(self.analysis.open(self.store.dataset().len())?),
            Intent::AnalysisTabSelected(tab) => self.analysis.select_tab(tab),
            Intent::ChartSelected(kind) => self.analysis.select_chart(kind),
            Intent::AnalysisClosed => {
                self.analysis.close();
                None
            }
        };
        Ok(request)
    }

    /// Request trades for `ticker` with the current form, bypassing
    /// navigation. Supersedes any trade fetch in flight.
    pub fn fetch_ticker(&mut self, ticker: Option<&str>) -> Result<CatalogueRequest, ValidationError> {
        let query = TradeQuery::build(ticker, &self.form)?;
        let ticket = self.trade_tickets.issue();
        if let Some((old, _)) = self.pending_trades.replace((ticket, query.ticker.clone())) {
            debug!(%old, new = %ticket, "trade fetch superseded");
        }
        info!(ticker = %query.ticker, limit = query.limit, fetch_all = query.fetch_all, "fetching trades");
        Ok(CatalogueRequest {
            ticket,
            call: CatalogueCall::Trades(query),
        })
    }

    pub fn apply(&mut self, response: CatalogueResponse) -> Result<Applied, ExplorerError> {
        match response.ticket.channel {
            Channel::Navigation => Ok(match self.navigator.apply(response)? {
                true => Applied::Navigation,
                false => Applied::Stale,
            }),
            Channel::Analysis => Ok(match self.analysis.apply(response)? {
                true => Applied::Analysis,
                false => Applied::Stale,
            }),
            Channel::Trades => self.apply_trades(response),
        }
    }

    fn apply_trades(&mut self, response: CatalogueResponse) -> Result<Applied, ExplorerError> {
        let ticker = match self.pending_trades.take() {
            Some((ticket, ticker)) if ticket == response.ticket => ticker,
            other => {
                debug!(ticket = %response.ticket, "stale trade response dropped");
                self.pending_trades = other;
                return Ok(Applied::Stale);
            }
        };

        let rows = match response.result {
            Ok(CatalogueReply::Trades(rows)) => rows,
            Ok(_) => {
                return Err(CatalogueError::UnexpectedPayload { expected: "trades" }.into())
            }
            Err(e) => {
                warn!(error = %e, "trade fetch failed");
                return Err(e.into());
            }
        };

        let count = rows.len();
        self.loaded_ticker = Some(ticker);
        self.store.replace_dataset(rows);
        // Analysis content described the previous dataset.
        self.analysis.close();
        info!(count, visible = self.store.result_count(), "trades loaded");
        Ok(Applied::Dataset { count })
    }

    /// CSV text of the current view.
    pub fn export_csv<S: AsRef<str>>(&self, preferred: &[S]) -> Result<String, ExportError> {
        export::serialize(&self.store.current_view(), preferred)
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(FieldKinds::default(), TradeForm::default())
    }
}
