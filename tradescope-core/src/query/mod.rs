//! In-memory query engine: comparator, substring filter, stable sort.

pub mod compare;
pub mod filter;
pub mod sort;
pub mod view;

pub use compare::{compare, SortKey};
pub use filter::filter;
pub use sort::{order_rows, sort, SortDirection, SortState};
pub use view::View;
