//! UI state persistence: JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use tradescope_core::Intent;

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub active_panel: Panel,
    pub last_query: String,
    pub fetch_all: bool,
    pub limit: String,
    pub lookback_days: String,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_panel: Panel::Browse,
            last_query: String::new(),
            fetch_all: false,
            limit: String::new(),
            lookback_days: String::new(),
            welcome_dismissed: false,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        active_panel: app.active_panel,
        last_query: app.explorer.store().query().to_string(),
        fetch_all: app.form.fetch_all,
        limit: app.form.limit.clone(),
        lookback_days: app.form.days.clone(),
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state to a fresh AppState. Blank form fields keep the
/// configured defaults.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.active_panel = state.active_panel;
    app.form.fetch_all = state.fetch_all;
    if !state.limit.is_empty() {
        app.form.limit = state.limit;
    }
    if !state.lookback_days.is_empty() {
        app.form.days = state.lookback_days;
    }
    app.submit(Intent::FormChanged(app.form.to_trade_form()));
    if !state.last_query.is_empty() {
        app.search_input = state.last_query.clone();
        app.submit(Intent::QueryChanged(state.last_query));
    }
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}
