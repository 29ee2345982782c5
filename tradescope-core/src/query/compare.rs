//! Type-aware three-way comparison of cell values.
//!
//! Values that do not parse under the declared kind always sort after every
//! value that does (NaN and invalid dates included); two unparseable values
//! compare equal.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::{FieldKind, Value};

/// Pre-parsed comparison key, so a sort parses each cell once.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(Option<f64>),
    Time(Option<DateTime<Utc>>),
    Text(String),
}

impl SortKey {
    pub fn of(value: Option<&Value>, kind: FieldKind) -> Self {
        match kind {
            FieldKind::Numeric => SortKey::Number(value.and_then(Value::as_f64)),
            FieldKind::Temporal => SortKey::Time(value.and_then(Value::as_timestamp)),
            FieldKind::Text => {
                SortKey::Text(value.map(Value::to_text).unwrap_or_default().to_lowercase())
            }
        }
    }

    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => {
                invalid_last(a.as_ref(), b.as_ref(), |x, y| {
                    x.partial_cmp(y).unwrap_or(Ordering::Equal)
                })
            }
            (SortKey::Time(a), SortKey::Time(b)) => invalid_last(a.as_ref(), b.as_ref(), Ord::cmp),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Keys of one sort always share a kind.
            _ => Ordering::Equal,
        }
    }
}

fn invalid_last<T>(a: Option<&T>, b: Option<&T>, cmp: impl FnOnce(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Compare two cells under a declared kind.
pub fn compare(a: &Value, b: &Value, kind: FieldKind) -> Ordering {
    SortKey::of(Some(a), kind).compare(&SortKey::of(Some(b), kind))
}
