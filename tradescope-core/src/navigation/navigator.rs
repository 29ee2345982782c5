//! The drill-down state machine.
//!
//! Transitions that need the catalogue return a [`CatalogueRequest`] and
//! are committed only when the matching response is applied. At most one
//! request is pending: a newer transition (or `back()`) supersedes it, and
//! a response carrying any other ticket is dropped.

use tracing::{debug, warn};

use super::state::NavigationState;
use crate::catalogue::{
    CatalogueCall, CatalogueError, CatalogueReply, CatalogueRequest, CatalogueResponse, Channel,
    Ticket, TicketCounter,
};
use crate::domain::{
    event_ticker_of, CategoryMetadata, MarketMetadata, SeriesMetadata, TickerListing,
};
use crate::error::NavigationError;

/// Transition waiting for its response.
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Categories,
    Series {
        category: String,
    },
    Tickers {
        series: String,
        category: String,
    },
    EventLookup {
        ticker: String,
        series: String,
        category: String,
    },
}

#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigationState,
    tickets: TicketCounter,
    pending: Option<(Ticket, Pending)>,

    categories: Vec<CategoryMetadata>,
    series: Vec<SeriesMetadata>,
    listing: TickerListing,
    series_title: Option<String>,
    selected_market: Option<MarketMetadata>,
    event_tickers: Vec<String>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            state: NavigationState::AtCategories,
            tickets: TicketCounter::new(Channel::Navigation),
            pending: None,
            categories: Vec::new(),
            series: Vec::new(),
            listing: TickerListing::default(),
            series_title: None,
            selected_market: None,
            event_tickers: Vec::new(),
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|(t, _)| *t)
    }

    pub fn categories(&self) -> &[CategoryMetadata] {
        &self.categories
    }

    pub fn series_list(&self) -> &[SeriesMetadata] {
        &self.series
    }

    pub fn ticker_listing(&self) -> &TickerListing {
        &self.listing
    }

    pub fn series_title(&self) -> Option<&str> {
        self.series_title.as_deref()
    }

    /// Market details of the selected ticker, when the ticker list had them.
    pub fn selected_market(&self) -> Option<&MarketMetadata> {
        self.selected_market.as_ref()
    }

    /// Sibling tickers returned by the event lookup of the last cache miss.
    pub fn event_tickers(&self) -> &[String] {
        &self.event_tickers
    }

    fn invalid(&self, action: &'static str) -> NavigationError {
        NavigationError::InvalidTransition {
            action,
            state: self.state.description(),
        }
    }

    fn request(&mut self, pending: Pending, call: CatalogueCall) -> CatalogueRequest {
        let ticket = self.tickets.issue();
        if let Some((old, _)) = self.pending.replace((ticket, pending)) {
            debug!(%old, new = %ticket, "navigation request superseded");
        }
        CatalogueRequest { ticket, call }
    }

    /// Request the category list. Only valid at the top level.
    pub fn load_categories(&mut self) -> Result<CatalogueRequest, NavigationError> {
        if !self.state.is_top_level() {
            return Err(self.invalid("load categories"));
        }
        Ok(self.request(Pending::Categories, CatalogueCall::Categories))
    }

    pub fn select_category(&mut self, category: &str) -> Result<CatalogueRequest, NavigationError> {
        if !self.state.is_top_level() {
            return Err(self.invalid("select a category"));
        }
        Ok(self.request(
            Pending::Series {
                category: category.to_string(),
            },
            CatalogueCall::SeriesInCategory {
                category: category.to_string(),
            },
        ))
    }

    pub fn select_series(&mut self, series: &str) -> Result<CatalogueRequest, NavigationError> {
        let NavigationState::AtSeriesList { category } = &self.state else {
            return Err(self.invalid("select a series"));
        };
        let pending = Pending::Tickers {
            series: series.to_string(),
            category: category.clone(),
        };
        Ok(self.request(
            pending,
            CatalogueCall::SeriesTickers {
                series: series.to_string(),
            },
        ))
    }

    /// Choose a ticker from the current list, or switch to another one.
    ///
    /// When the ticker list came with this ticker's market details the
    /// transition happens at once and `None` is returned. Otherwise the
    /// ticker's event (the ticker minus its last hyphen segment) is looked
    /// up first.
    pub fn select_ticker(
        &mut self,
        ticker: &str,
    ) -> Result<Option<CatalogueRequest>, NavigationError> {
        let (series, category) = match &self.state {
            NavigationState::AtTickerList { series, category }
            | NavigationState::TickerSelected {
                series, category, ..
            } => (series.clone(), category.clone()),
            _ => return Err(self.invalid("select a ticker")),
        };

        if let Some(market) = self.listing.market(ticker).cloned() {
            if let Some((old, _)) = self.pending.take() {
                debug!(%old, "navigation request superseded by cached selection");
            }
            debug!(ticker, "ticker selected from cached market data");
            self.selected_market = Some(market);
            self.event_tickers.clear();
            self.state = NavigationState::TickerSelected {
                ticker: ticker.to_string(),
                series,
                category,
            };
            return Ok(None);
        }

        let event = event_ticker_of(ticker).to_string();
        let pending = Pending::EventLookup {
            ticker: ticker.to_string(),
            series,
            category,
        };
        Ok(Some(self.request(pending, CatalogueCall::EventTickers { event })))
    }

    /// Return to the parent level, discarding the metadata of the level
    /// being left. Always drops any pending request.
    pub fn back(&mut self) -> Result<(), NavigationError> {
        if let Some((old, _)) = self.pending.take() {
            debug!(%old, "navigation request cancelled by back");
        }
        let parent = self.state.parent().ok_or(NavigationError::AlreadyAtTop)?;
        match &self.state {
            NavigationState::AtSeriesList { .. } => self.series.clear(),
            NavigationState::AtTickerList { .. } => {
                self.listing = TickerListing::default();
                self.series_title = None;
            }
            NavigationState::TickerSelected { .. } => {
                self.selected_market = None;
                self.event_tickers.clear();
            }
            NavigationState::AtCategories => {}
        }
        debug!(from = self.state.description(), to = parent.description(), "navigated back");
        self.state = parent;
        Ok(())
    }

    /// Apply a navigation response. Returns `Ok(false)` for a stale one.
    ///
    /// On failure the state stays where it was before the transition.
    pub fn apply(&mut self, response: CatalogueResponse) -> Result<bool, NavigationError> {
        let pending = match self.pending.take() {
            Some((ticket, pending)) if ticket == response.ticket => pending,
            other => {
                debug!(ticket = %response.ticket, "stale navigation response dropped");
                self.pending = other;
                return Ok(false);
            }
        };

        let reply = response.result.map_err(|e| {
            warn!(error = %e, "navigation lookup failed");
            NavigationError::Remote(e)
        })?;

        match (pending, reply) {
            (Pending::Categories, CatalogueReply::Categories(categories)) => {
                debug!(count = categories.len(), "categories loaded");
                self.categories = categories;
            }
            (Pending::Series { category }, CatalogueReply::Series(series)) => {
                debug!(category, count = series.len(), "series loaded");
                self.series = series;
                self.state = NavigationState::AtSeriesList { category };
            }
            (Pending::Tickers { series, category }, CatalogueReply::Tickers(listing)) => {
                debug!(series, count = listing.tickers.len(), "tickers loaded");
                self.series_title = self
                    .series
                    .iter()
                    .find(|s| s.ticker == series)
                    .map(|s| s.title.clone());
                self.listing = listing;
                self.selected_market = None;
                self.state = NavigationState::AtTickerList { series, category };
            }
            (
                Pending::EventLookup {
                    ticker,
                    series,
                    category,
                },
                CatalogueReply::EventTickers(event),
            ) => {
                if !event.tickers.contains(&ticker) {
                    warn!(ticker, event = event_ticker_of(&ticker), "ticker not listed in its inferred event");
                }
                self.selected_market = None;
                self.event_tickers = event.tickers;
                self.state = NavigationState::TickerSelected {
                    ticker,
                    series,
                    category,
                };
            }
            (pending, _) => {
                let expected = match pending {
                    Pending::Categories => "categories",
                    Pending::Series { .. } => "series list",
                    Pending::Tickers { .. } => "ticker list",
                    Pending::EventLookup { .. } => "event tickers",
                };
                return Err(NavigationError::Remote(CatalogueError::UnexpectedPayload {
                    expected,
                }));
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{CatalogueService, FixtureCatalogue};

    fn run(nav: &mut Navigator, req: CatalogueRequest, svc: &FixtureCatalogue) -> bool {
        nav.apply(req.execute(svc)).unwrap()
    }

    fn at_ticker_list(svc: &FixtureCatalogue) -> Navigator {
        let mut nav = Navigator::new();
        let req = nav.select_category("Economics").unwrap();
        assert!(run(&mut nav, req, svc));
        let req = nav.select_series("CPI").unwrap();
        assert!(run(&mut nav, req, svc));
        nav
    }

    #[test]
    fn test_load_categories_only_at_top() {
        let svc = FixtureCatalogue::demo();
        let mut nav = Navigator::new();
        let req = nav.load_categories().unwrap();
        assert_eq!(req.call, CatalogueCall::Categories);
        assert!(run(&mut nav, req, &svc));
        assert_eq!(nav.categories().len(), 3);

        let mut nav = at_ticker_list(&svc);
        assert!(matches!(
            nav.load_categories(),
            Err(NavigationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_transition_waits_for_response() {
        let svc = FixtureCatalogue::demo();
        let mut nav = Navigator::new();
        let req = nav.select_category("Economics").unwrap();
        assert!(nav.is_loading());
        assert_eq!(nav.state(), &NavigationState::AtCategories);
        assert!(run(&mut nav, req, &svc));
        assert_eq!(
            nav.state(),
            &NavigationState::AtSeriesList {
                category: "Economics".into()
            }
        );
        assert!(!nav.is_loading());
        assert_eq!(nav.series_list().len(), 2);
    }

    #[test]
    fn test_series_title_retained() {
        let svc = FixtureCatalogue::demo();
        let nav = at_ticker_list(&svc);
        assert_eq!(nav.series_title(), Some("CPI year-over-year"));
        assert_eq!(nav.ticker_listing().tickers.len(), 3);
    }

    #[test]
    fn test_cached_ticker_selection_issues_no_request() {
        let svc = FixtureCatalogue::demo();
        let mut nav = at_ticker_list(&svc);
        assert_eq!(nav.select_ticker("CPI-24-T1").unwrap(), None);
        assert_eq!(nav.state().ticker(), Some("CPI-24-T1"));
        assert_eq!(nav.selected_market().map(|m| m.title.as_str()), Some("CPI above 3.0%"));

        // In-place reselection from TickerSelected.
        assert_eq!(nav.select_ticker("CPI-24-T2").unwrap(), None);
        assert_eq!(nav.state().ticker(), Some("CPI-24-T2"));
    }

    #[test]
    fn test_uncached_ticker_looks_up_event() {
        let svc = FixtureCatalogue::demo();
        let mut nav = at_ticker_list(&svc);
        let req = nav.select_ticker("CPI-24-T3").unwrap().unwrap();
        assert_eq!(
            req.call,
            CatalogueCall::EventTickers {
                event: "CPI-24".into()
            }
        );
        assert!(run(&mut nav, req, &svc));
        assert_eq!(nav.state().ticker(), Some("CPI-24-T3"));
        assert!(nav.selected_market().is_none());
        assert_eq!(nav.event_tickers().len(), 3);
    }

    #[test]
    fn test_failure_leaves_state_unchanged() {
        let svc = FixtureCatalogue::demo();
        let mut nav = at_ticker_list(&svc);
        let before = nav.state().clone();
        svc.fail_next(CatalogueError::Remote("boom".into()));
        let req = nav.select_ticker("CPI-24-T3").unwrap().unwrap();
        let err = nav.apply(req.execute(&svc)).unwrap_err();
        assert_eq!(err, NavigationError::Remote(CatalogueError::Remote("boom".into())));
        assert_eq!(nav.state(), &before);
        assert!(!nav.is_loading());
    }

    #[test]
    fn test_newer_transition_supersedes_pending() {
        let svc = FixtureCatalogue::demo();
        let mut nav = Navigator::new();
        let first = nav.select_category("Economics").unwrap();
        let second = nav.select_category("Politics").unwrap();
        let first_resp = first.execute(&svc);
        assert!(!nav.apply(first_resp).unwrap());
        assert!(nav.is_loading());
        assert!(run(&mut nav, second, &svc));
        assert_eq!(nav.state().category(), Some("Politics"));
    }

    #[test]
    fn test_back_discards_child_metadata_and_pending() {
        let svc = FixtureCatalogue::demo();
        let mut nav = at_ticker_list(&svc);
        nav.select_ticker("CPI-24-T1").unwrap();

        nav.back().unwrap();
        assert!(nav.selected_market().is_none());
        assert_eq!(nav.state().series(), Some("CPI"));

        let late = nav.select_ticker("CPI-24-T3").unwrap().unwrap();
        nav.back().unwrap();
        assert!(nav.ticker_listing().tickers.is_empty());
        assert!(nav.series_title().is_none());
        assert!(!nav.apply(late.execute(&svc)).unwrap());
        assert_eq!(nav.state().category(), Some("Economics"));

        nav.back().unwrap();
        assert!(nav.series_list().is_empty());
        assert_eq!(nav.back(), Err(NavigationError::AlreadyAtTop));
    }

    #[test]
    fn test_back_at_top_supersedes_pending() {
        let svc = FixtureCatalogue::demo();
        let mut nav = Navigator::new();
        let req = nav.select_category("Economics").unwrap();
        assert_eq!(nav.back(), Err(NavigationError::AlreadyAtTop));
        assert!(!nav.apply(req.execute(&svc)).unwrap());
        assert!(nav.state().is_top_level());
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mut nav = Navigator::new();
        assert!(matches!(
            nav.select_series("CPI"),
            Err(NavigationError::InvalidTransition { .. })
        ));
        assert!(matches!(
            nav.select_ticker("CPI-24-T1"),
            Err(NavigationError::InvalidTransition { .. })
        ));
        assert!(nav.state().is_top_level());
    }

    #[test]
    fn test_mismatched_payload_rejected() {
        let mut nav = Navigator::new();
        let req = nav.load_categories().unwrap();
        let resp = CatalogueResponse {
            ticket: req.ticket,
            result: Ok(CatalogueReply::Trades(Vec::new())),
        };
        assert!(matches!(
            nav.apply(resp),
            Err(NavigationError::Remote(CatalogueError::UnexpectedPayload { .. }))
        ));
        // Service trait is object safe.
        let svc: Box<dyn CatalogueService> = Box::new(FixtureCatalogue::demo());
        assert_eq!(svc.name(), "fixture");
    }
}
