//! Structured error types shared by the engine and its front ends.
//!
//! Remote failures live in [`crate::catalogue::CatalogueError`]; everything
//! here is raised locally. All of them display cleanly in both the CLI and
//! the TUI error history.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::catalogue::CatalogueError;

/// Input rejected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select a ticker before fetching trades")]
    NoTicker,

    #[error("no trades loaded, fetch data first")]
    NoData,

    #[error("time window is inverted: min_ts {min_ts} is after max_ts {max_ts}")]
    InvalidWindow { min_ts: i64, max_ts: i64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavigationError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("already at the top level")]
    AlreadyAtTop,

    #[error("catalogue lookup failed: {0}")]
    Remote(#[from] CatalogueError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no data to export")]
    NothingToExport,

    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart image is not valid base64: {0}")]
    InvalidImage(#[from] base64::DecodeError),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Everything an intent or an applied response can fail with.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
