//! Declarative field-kind table.
//!
//! Sorting and display both consult this one table, so a column is never
//! compared as a number while being rendered as text (or vice versa).

use std::collections::BTreeSet;

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::value::Value;

/// How a column's values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Numeric,
    Temporal,
    Text,
}

/// Per-column kind declarations plus display hints.
///
/// Columns not listed anywhere are text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldKinds {
    pub numeric: BTreeSet<String>,
    pub temporal: BTreeSet<String>,
    /// Numeric columns rendered as `$x.xx`.
    pub currency: BTreeSet<String>,
    /// Text columns rendered upper-case.
    pub upper_case: BTreeSet<String>,
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldKinds {
    fn default() -> Self {
        Self {
            numeric: set(&[
                "price",
                "yes_price",
                "no_price",
                "quantity",
                "count",
                "volume",
                "last_price",
            ]),
            temporal: set(&[
                "created_time",
                "created_at",
                "timestamp",
                "open_time",
                "close_time",
                "expiration_time",
            ]),
            currency: set(&["price"]),
            upper_case: set(&["side", "taker_side"]),
        }
    }
}

impl FieldKinds {
    pub fn kind_of(&self, column: &str) -> FieldKind {
        if self.temporal.contains(column) {
            FieldKind::Temporal
        } else if self.numeric.contains(column) {
            FieldKind::Numeric
        } else {
            FieldKind::Text
        }
    }

    /// Display string for a cell. Values that fail to parse under their
    /// declared kind fall back to their raw text.
    pub fn format_cell(&self, column: &str, value: &Value) -> String {
        match self.kind_of(column) {
            FieldKind::Temporal => match value.as_timestamp() {
                Some(ts) => ts
                    .with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                None => value.to_text(),
            },
            FieldKind::Numeric if self.currency.contains(column) => match value.as_f64() {
                Some(n) => format!("${n:.2}"),
                None => value.to_text(),
            },
            FieldKind::Text if self.upper_case.contains(column) => value.to_text().to_uppercase(),
            _ => value.to_text(),
        }
    }
}

/// `created_time` → `Created Time`.
pub fn format_header(column: &str) -> String {
    column
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_declares_kinds() {
        let kinds = FieldKinds::default();
        assert_eq!(kinds.kind_of("created_time"), FieldKind::Temporal);
        assert_eq!(kinds.kind_of("yes_price"), FieldKind::Numeric);
        assert_eq!(kinds.kind_of("count"), FieldKind::Numeric);
        assert_eq!(kinds.kind_of("ticker"), FieldKind::Text);
        assert_eq!(kinds.kind_of("price_notes"), FieldKind::Text);
    }

    #[test]
    fn format_cell_uses_declared_kind() {
        let kinds = FieldKinds::default();
        assert_eq!(kinds.format_cell("price", &Value::from("1.5")), "$1.50");
        assert_eq!(kinds.format_cell("price", &Value::from("n/a")), "n/a");
        assert_eq!(kinds.format_cell("taker_side", &Value::from("yes")), "YES");
        assert_eq!(kinds.format_cell("count", &Value::Integer(12)), "12");
        assert_eq!(kinds.format_cell("created_time", &Value::from("soon")), "soon");

        let expected = Value::from("2024-05-01T12:00:00Z")
            .as_timestamp()
            .unwrap()
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(
            kinds.format_cell("created_time", &Value::from("2024-05-01T12:00:00Z")),
            expected
        );
    }

    #[test]
    fn header_formatting() {
        assert_eq!(format_header("created_time"), "Created Time");
        assert_eq!(format_header("ticker"), "Ticker");
        assert_eq!(format_header("yes__price"), "Yes Price");
    }

    #[test]
    fn table_deserializes_partially_from_toml() {
        let kinds: FieldKinds = toml::from_str(r#"numeric = ["strike"]"#).unwrap();
        assert_eq!(kinds.kind_of("strike"), FieldKind::Numeric);
        assert_eq!(kinds.kind_of("price"), FieldKind::Text);
        assert_eq!(kinds.kind_of("created_time"), FieldKind::Temporal);
    }
}
