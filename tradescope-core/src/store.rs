//! Dataset store: the fetched trades plus the query and sort that shape the
//! visible view.

use tracing::debug;

use crate::domain::{FieldKinds, Record};
use crate::query::{self, SortDirection, SortState, View};

/// Owns the dataset and the view derived from it.
///
/// Every mutation computes the new row list completely before swapping it
/// in, so the view is never observed half-updated.
///
/// The view is always re-derived from the dataset: filter by the query, then
/// apply the sort history oldest-first. Earlier sorts break ties of later
/// ones, and re-entering the same query never reorders anything.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    dataset: Vec<Record>,
    query: String,
    sort: SortState,
    /// One entry per sorted column, most recent last.
    history: Vec<(String, SortDirection)>,
    rows: Vec<usize>,
    kinds: FieldKinds,
}

impl DatasetStore {
    pub fn new(kinds: FieldKinds) -> Self {
        Self {
            kinds,
            ..Self::default()
        }
    }

    /// Swap in a freshly fetched dataset. The sort column resets; the query
    /// is kept and re-applied.
    pub fn replace_dataset(&mut self, rows: Vec<Record>) {
        self.dataset = rows;
        self.sort = SortState::default();
        self.history.clear();
        self.rows = self.derive(&self.query);
        debug!(rows = self.dataset.len(), visible = self.rows.len(), "dataset replaced");
    }

    /// Re-filter from the full dataset, then re-apply the sort history
    /// without toggling anything.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        let view = self.derive(&text);
        self.query = text;
        self.rows = view;
    }

    /// Toggle the sort state for `column` and re-derive the view with it as
    /// the primary key.
    pub fn sort_by(&mut self, column: &str) {
        let state = self.sort.toggled(column);
        // An older entry for the same column cannot break any tie of the new one.
        self.history.retain(|(c, _)| c != column);
        self.history.push((column.to_string(), state.direction));
        debug!(column, direction = ?state.direction, keys = self.history.len(), "sorted view");
        self.sort = state;
        self.rows = self.derive(&self.query);
    }

    fn derive(&self, text: &str) -> Vec<usize> {
        let mut view = query::filter(&self.dataset, text);
        for (column, direction) in &self.history {
            query::order_rows(&self.dataset, &mut view, column, *direction, &self.kinds);
        }
        view
    }

    pub fn current_view(&self) -> View<'_> {
        View::over(&self.dataset, &self.rows)
    }

    pub fn result_count(&self) -> usize {
        self.rows.len()
    }

    pub fn dataset(&self) -> &[Record] {
        &self.dataset
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn kinds(&self) -> &FieldKinds {
        &self.kinds
    }
}
