//! Stable, type-aware column sort with the click-to-toggle direction rule.

use serde::{Deserialize, Serialize};

use super::compare::SortKey;
use crate::domain::{FieldKinds, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Column and direction of the active sort; `column` is `None` until the
/// first sort after a dataset replacement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// State after the operator selects `column`.
    ///
    /// Same column while ascending flips to descending; anything else
    /// (a new column, or the same column while descending) is ascending.
    pub fn toggled(&self, column: &str) -> SortState {
        let direction = match (&self.column, self.direction) {
            (Some(current), SortDirection::Ascending) if current == column => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        SortState {
            column: Some(column.to_string()),
            direction,
        }
    }

    pub fn is_sorted_by(&self, column: &str) -> bool {
        self.column.as_deref() == Some(column)
    }
}

/// Stable in-place sort of `rows` by `column` in `direction`.
///
/// Each cell is parsed once into a [`SortKey`]; equal keys keep their input
/// order, so sorting by B then by A yields A-major, B-minor order.
pub fn order_rows(
    dataset: &[Record],
    rows: &mut Vec<usize>,
    column: &str,
    direction: SortDirection,
    kinds: &FieldKinds,
) {
    let kind = kinds.kind_of(column);
    let mut keyed: Vec<(SortKey, usize)> = rows
        .iter()
        .map(|&r| (SortKey::of(dataset[r].get(column), kind), r))
        .collect();

    // slice::sort_by is stable.
    keyed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Ascending => a.compare(b),
        SortDirection::Descending => b.compare(a),
    });

    rows.clear();
    rows.extend(keyed.into_iter().map(|(_, r)| r));
}

/// Toggle `state` for `column` and return the re-ordered view with the new
/// state. Membership of the view never changes.
pub fn sort(
    dataset: &[Record],
    view: &[usize],
    column: &str,
    state: &SortState,
    kinds: &FieldKinds,
) -> (Vec<usize>, SortState) {
    let next = state.toggled(column);
    let mut rows = view.to_vec();
    order_rows(dataset, &mut rows, column, next.direction, kinds);
    (rows, next)
}
