//! Remote catalogue: the backend contract, its HTTP and in-memory
//! implementations, and the request/response types the engine exchanges
//! with its host.

pub mod fixture;
pub mod http;
pub mod request;
pub mod service;
pub mod trade_query;

pub use fixture::FixtureCatalogue;
pub use http::{decode_envelope, Envelope, HttpCatalogue, DEFAULT_BASE_URL};
pub use request::{
    CatalogueCall, CatalogueReply, CatalogueRequest, CatalogueResponse, Channel, Ticket,
    TicketCounter,
};
pub use service::{CatalogueError, CatalogueService};
pub use trade_query::{TradeForm, TradeQuery, DEFAULT_LIMIT, DEFAULT_LOOKBACK_DAYS, FETCH_ALL_LIMIT};
