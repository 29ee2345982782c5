//! Property tests for query engine invariants.
//!
//! Uses proptest to verify:
//! 1. Filter: subset of the dataset, dataset order, blank query keeps all
//! 2. Sort: permutation of the view, ordered by the comparator, stable
//! 3. Toggle: direction alternates on repeated selection of one column
//! 4. Export: CSV parses back to the textual cell values

use std::cmp::Ordering;

use proptest::prelude::*;
use tradescope_core::domain::{FieldKinds, Record, Value};
use tradescope_core::export;
use tradescope_core::query::{compare, filter, sort, SortDirection, SortState, View};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_price() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (1i64..100).prop_map(Value::Integer),
        2 => (0.01f64..0.99).prop_map(|p| Value::Text(format!("{p:.2}"))),
        1 => Just(Value::Text("n/a".into())),
        1 => Just(Value::Null),
    ]
}

fn arb_time() -> impl Strategy<Value = Value> {
    prop_oneof![
        5 => (1_700_000_000i64..1_720_000_000).prop_map(|ts| {
            let t = chrono::DateTime::from_timestamp(ts, 0).unwrap();
            Value::Text(t.to_rfc3339())
        }),
        1 => Just(Value::Text("not a date".into())),
    ]
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        "[A-Z]{2,4}-[0-9]{2}",
        arb_price(),
        prop_oneof![Just("yes"), Just("no")],
        arb_time(),
        "[a-zA-Z ,\"]{0,10}",
    )
        .prop_map(|(ticker, price, side, time, note)| {
            Record::new()
                .with("ticker", ticker)
                .with("yes_price", price)
                .with("taker_side", side)
                .with("created_time", time)
                .with("note", note)
        })
}

fn arb_dataset() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..40)
}

fn arb_column() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("ticker"),
        Just("yes_price"),
        Just("taker_side"),
        Just("created_time"),
        Just("note"),
    ]
}

fn cell(record: &Record, column: &str) -> Value {
    record.get(column).cloned().unwrap_or(Value::Null)
}

// ── 1. Filter ────────────────────────────────────────────────────────

proptest! {
    /// Filter output is an increasing list of dataset indices, and a row is
    /// kept exactly when one of its cells contains the query.
    #[test]
    fn filter_is_ordered_subset(dataset in arb_dataset(), query in "[a-zA-Z0-9 -]{1,3}") {
        let rows = filter(&dataset, &query);
        prop_assert!(rows.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(rows.len() <= dataset.len());

        if query.trim().is_empty() {
            prop_assert_eq!(rows.len(), dataset.len());
        } else {
            let needle = query.to_lowercase();
            for (i, record) in dataset.iter().enumerate() {
                let hit = record.values().any(|v| v.to_text().to_lowercase().contains(&needle));
                prop_assert_eq!(hit, rows.contains(&i));
            }
        }
    }

    /// Whitespace-only queries keep every row.
    #[test]
    fn blank_query_keeps_all(dataset in arb_dataset(), query in "[ \t]{0,4}") {
        let rows = filter(&dataset, &query);
        prop_assert_eq!(rows, (0..dataset.len()).collect::<Vec<_>>());
    }
}

// ── 2. Sort ──────────────────────────────────────────────────────────

proptest! {
    /// Sorting permutes the view and leaves adjacent rows in comparator order.
    #[test]
    fn sort_orders_and_permutes(dataset in arb_dataset(), column in arb_column(), query in "[a-z]{0,1}") {
        let kinds = FieldKinds::default();
        let view = filter(&dataset, &query);
        let (sorted, state) = sort(&dataset, &view, column, &SortState::default(), &kinds);
        prop_assert_eq!(state.direction, SortDirection::Ascending);

        let mut a = sorted.clone();
        let mut b = view.clone();
        a.sort_unstable();
        b.sort_unstable();
        prop_assert_eq!(a, b);

        let kind = kinds.kind_of(column);
        for w in sorted.windows(2) {
            let ord = compare(&cell(&dataset[w[0]], column), &cell(&dataset[w[1]], column), kind);
            prop_assert_ne!(ord, Ordering::Greater);
        }
    }

    /// Rows with equal keys keep their relative input order, ascending or
    /// descending.
    #[test]
    fn sort_is_stable(dataset in arb_dataset(), column in arb_column(), descending in any::<bool>()) {
        let kinds = FieldKinds::default();
        let kind = kinds.kind_of(column);
        let view: Vec<usize> = (0..dataset.len()).rev().collect();
        let mut state = SortState::default();
        let (mut sorted, s) = sort(&dataset, &view, column, &state, &kinds);
        state = s;
        if descending {
            let (again, s) = sort(&dataset, &view, column, &state, &kinds);
            prop_assert_eq!(s.direction, SortDirection::Descending);
            sorted = again;
        }

        let position = |row: usize| view.iter().position(|&r| r == row).unwrap();
        for w in sorted.windows(2) {
            let ord = compare(&cell(&dataset[w[0]], column), &cell(&dataset[w[1]], column), kind);
            if ord == Ordering::Equal {
                prop_assert!(position(w[0]) < position(w[1]));
            }
        }
    }

    /// Unparseable prices sit at the end ascending and at the start descending.
    #[test]
    fn invalid_numbers_go_last_then_first(dataset in arb_dataset()) {
        let kinds = FieldKinds::default();
        let view: Vec<usize> = (0..dataset.len()).collect();
        let invalid = |r: &usize| dataset[*r].get("yes_price").and_then(Value::as_f64).is_none();
        let n_invalid = view.iter().filter(|r| invalid(r)).count();

        let (asc, state) = sort(&dataset, &view, "yes_price", &SortState::default(), &kinds);
        prop_assert!(asc[asc.len() - n_invalid..].iter().all(|r| invalid(r)));
        let (desc, _) = sort(&dataset, &asc, "yes_price", &state, &kinds);
        prop_assert!(desc[..n_invalid].iter().all(|r| invalid(r)));
    }
}

// ── 3. Toggle ────────────────────────────────────────────────────────

proptest! {
    /// Selecting one column n times ends descending iff n is even.
    #[test]
    fn toggle_alternates(n in 1usize..10, column in arb_column()) {
        let mut state = SortState::default();
        for _ in 0..n {
            state = state.toggled(column);
        }
        let expected = if n % 2 == 0 { SortDirection::Descending } else { SortDirection::Ascending };
        prop_assert_eq!(state.direction, expected);
    }

    /// Switching to another column always starts ascending.
    #[test]
    fn new_column_starts_ascending(first in arb_column(), second in arb_column(), flips in 0usize..3) {
        prop_assume!(first != second);
        let mut state = SortState::default().toggled(first);
        for _ in 0..flips {
            state = state.toggled(first);
        }
        prop_assert_eq!(state.toggled(second).direction, SortDirection::Ascending);
    }
}

// ── 4. Export ────────────────────────────────────────────────────────

proptest! {
    /// The CSV reader recovers every cell's text, in view order.
    #[test]
    fn csv_parses_back(dataset in prop::collection::vec(arb_record(), 1..20)) {
        let rows: Vec<usize> = (0..dataset.len()).rev().collect();
        let view = View::new(&dataset, &rows).unwrap();
        let text = export::serialize(&view, &export::PREFERRED_COLUMNS).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        prop_assert_eq!(&headers, &export::export_columns(&view, &export::PREFERRED_COLUMNS));

        let parsed: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        prop_assert_eq!(parsed.len(), rows.len());
        for (line, &row) in parsed.iter().zip(&rows) {
            for (i, column) in headers.iter().enumerate() {
                let expected = cell(&dataset[row], column).to_text();
                prop_assert_eq!(&line[i], expected.as_str());
            }
        }
    }
}
