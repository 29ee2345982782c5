//! Hierarchical catalogue navigation: category → series → ticker.

pub mod navigator;
pub mod state;

pub use navigator::Navigator;
pub use state::NavigationState;
