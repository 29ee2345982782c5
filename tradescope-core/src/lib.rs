//! Tradescope Core: query and navigation engine for a market-trade catalogue.
//!
//! This crate contains everything except the front ends:
//! - Domain types (values, records, field kinds, catalogue metadata, analysis payloads)
//! - Type-aware comparator, substring filter and stable multi-column sort
//! - Dataset store owning the fetched trades and the derived view
//! - Category → series → ticker drill-down state machine
//! - Trade fetch contract, CSV export, tabbed analysis session
//! - Catalogue service trait with HTTP and in-memory implementations
//!
//! The engine performs no I/O itself. Components emit
//! [`catalogue::CatalogueRequest`]s; the host executes them and feeds the
//! responses back through [`explorer::Explorer::apply`].

pub mod analysis;
pub mod catalogue;
pub mod config;
pub mod domain;
pub mod error;
pub mod explorer;
pub mod export;
pub mod navigation;
pub mod query;
pub mod store;

pub use config::ExplorerConfig;
pub use error::{ExplorerError, ValidationError};
pub use explorer::{Applied, Explorer, Intent};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine state can move to and be shared with a
    /// worker thread, and requests/responses can cross channels.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Explorer>();
        require_sync::<Explorer>();
        require_send::<domain::Record>();
        require_sync::<domain::Record>();
        require_send::<catalogue::CatalogueRequest>();
        require_send::<catalogue::CatalogueResponse>();
        require_send::<catalogue::HttpCatalogue>();
        require_sync::<catalogue::HttpCatalogue>();

        // The fixture keeps interior state and is only Send.
        require_send::<catalogue::FixtureCatalogue>();
        require_send::<Box<dyn catalogue::CatalogueService>>();
    }

    /// The service trait must stay object safe: the TUI worker holds a
    /// `Box<dyn CatalogueService>`.
    #[test]
    fn catalogue_service_is_object_safe() {
        let svc: Box<dyn catalogue::CatalogueService> =
            Box::new(catalogue::FixtureCatalogue::demo());
        let req = catalogue::CatalogueRequest {
            ticket: catalogue::Ticket {
                channel: catalogue::Channel::Navigation,
                seq: 1,
            },
            call: catalogue::CatalogueCall::Categories,
        };
        let resp = req.execute(&svc);
        assert!(resp.result.is_ok());
    }
}
