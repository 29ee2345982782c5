//! Explorer configuration, loaded from TOML.
//!
//! Every section is optional:
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5015/api"
//! timeout_secs = 30
//!
//! [fetch]
//! limit = 100
//! lookback_days = 7
//!
//! [fields]
//! numeric = ["price", "yes_price", "no_price", "count"]
//! currency = ["price"]
//!
//! [export]
//! dir = "exports"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalogue::{
    CatalogueError, HttpCatalogue, TradeForm, DEFAULT_BASE_URL, DEFAULT_LIMIT,
    DEFAULT_LOOKBACK_DAYS,
};
use crate::domain::FieldKinds;
use crate::error::ConfigError;
use crate::export::PREFERRED_COLUMNS;

/// Environment variable that overrides `[api] base_url`.
pub const API_URL_ENV: &str = "TRADESCOPE_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub limit: u32,
    pub lookback_days: i64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub dir: PathBuf,
    pub preferred_columns: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            preferred_columns: PREFERRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub api: ApiConfig,
    pub fetch: FetchConfig,
    pub fields: FieldKinds,
    pub export: ExportConfig,
}

impl ExplorerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml(&content)
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup` in place of `std::env`.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            debug!(url, "api url overridden from environment");
            self.api.base_url = url;
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }

    /// A fetch form prefilled with the configured window and limit.
    pub fn trade_form(&self) -> TradeForm {
        TradeForm::last_days(self.fetch.lookback_days, self.fetch.limit)
    }

    pub fn connect(&self) -> Result<HttpCatalogue, CatalogueError> {
        HttpCatalogue::new(&self.api.base_url, self.timeout())
    }
}
