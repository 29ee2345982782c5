//! End-to-end explorer flows: fetch contract, sort scenarios, export and
//! stale-response handling, all against the in-memory catalogue.

use tradescope_core::catalogue::{
    CatalogueCall, CatalogueReply, CatalogueRequest, CatalogueResponse, Channel, FixtureCatalogue,
    Ticket, TradeForm, FETCH_ALL_LIMIT,
};
use tradescope_core::domain::{FieldKinds, Record};
use tradescope_core::error::ExportError;
use tradescope_core::query::SortDirection;
use tradescope_core::{Applied, Explorer, Intent};

fn trades_response(req: &CatalogueRequest, rows: Vec<Record>) -> CatalogueResponse {
    CatalogueResponse {
        ticket: req.ticket,
        result: Ok(CatalogueReply::Trades(rows)),
    }
}

/// Load `rows` as if the catalogue had returned them for `ticker`.
fn load(ex: &mut Explorer, ticker: &str, rows: Vec<Record>) {
    let req = ex.fetch_ticker(Some(ticker)).unwrap();
    let applied = ex.apply(trades_response(&req, rows)).unwrap();
    assert!(matches!(applied, Applied::Dataset { .. }));
}

fn prices(ex: &Explorer) -> Vec<String> {
    ex.store()
        .current_view()
        .iter()
        .map(|r| r.text("price"))
        .collect()
}

#[test]
fn fetch_all_drops_window_and_raises_limit() {
    let mut ex = Explorer::default();
    let form = TradeForm {
        fetch_all: true,
        min_ts: Some(1_717_000_000),
        max_ts: Some(1_717_200_000),
        limit: Some(25),
    };
    ex.dispatch(Intent::FormChanged(form)).unwrap();
    let req = ex.fetch_ticker(Some("CPI-24-T1")).unwrap();
    let CatalogueCall::Trades(query) = &req.call else {
        panic!("expected a trades call, got {:?}", req.call);
    };
    assert_eq!(query.limit, FETCH_ALL_LIMIT);
    assert_eq!(query.min_ts, None);
    assert_eq!(query.max_ts, None);

    let body = serde_json::to_value(query).unwrap();
    assert_eq!(body["fetchAll"], true);
    assert!(body.get("min_ts").is_none());
    assert!(body.get("max_ts").is_none());
}

#[test]
fn price_sort_ascending_then_descending() {
    let mut ex = Explorer::default();
    let rows = ["1.50", "0.75", "2.00"]
        .iter()
        .map(|p| Record::new().with("price", *p))
        .collect();
    load(&mut ex, "CPI-24-T1", rows);

    ex.dispatch(Intent::SortColumnSelected("price".into())).unwrap();
    assert_eq!(prices(&ex), ["0.75", "1.50", "2.00"]);
    assert_eq!(ex.store().sort_state().direction, SortDirection::Ascending);

    ex.dispatch(Intent::SortColumnSelected("price".into())).unwrap();
    assert_eq!(prices(&ex), ["2.00", "1.50", "0.75"]);
    assert_eq!(ex.store().sort_state().direction, SortDirection::Descending);
}

#[test]
fn sort_survives_query_changes() {
    let mut ex = Explorer::default();
    let rows = vec![
        Record::new().with("price", "3").with("taker_side", "yes"),
        Record::new().with("price", "1").with("taker_side", "no"),
        Record::new().with("price", "2").with("taker_side", "yes"),
    ];
    load(&mut ex, "FED-25-H0", rows);
    ex.dispatch(Intent::SortColumnSelected("price".into())).unwrap();
    ex.dispatch(Intent::QueryChanged("YES".into())).unwrap();
    assert_eq!(prices(&ex), ["2", "3"]);
    assert_eq!(ex.store().result_count(), 2);

    ex.dispatch(Intent::QueryChanged(String::new())).unwrap();
    assert_eq!(prices(&ex), ["1", "2", "3"]);
}

#[test]
fn empty_dataset_has_empty_view() {
    let mut ex = Explorer::default();
    load(&mut ex, "HIGHNY-24JUN01-T85", Vec::new());
    assert_eq!(ex.store().current_view().len(), 0);
    assert_eq!(ex.store().result_count(), 0);

    ex.dispatch(Intent::SortColumnSelected("price".into())).unwrap();
    ex.dispatch(Intent::QueryChanged("anything".into())).unwrap();
    assert_eq!(ex.store().result_count(), 0);
    assert!(matches!(
        ex.export_csv(&["price"]),
        Err(ExportError::NothingToExport)
    ));
}

#[test]
fn export_quotes_every_data_cell() {
    let mut ex = Explorer::default();
    let rows = vec![Record::new()
        .with("created_time", "2024-06-01T00:00:00Z")
        .with("note", r#"He said "hi", once"#)];
    load(&mut ex, "PRES-28-DEM", rows);

    let csv = ex.export_csv(&["created_time"]).unwrap();
    assert_eq!(
        csv,
        "created_time,note\n\"2024-06-01T00:00:00Z\",\"He said \"\"hi\"\", once\"\n"
    );
}

#[test]
fn stale_trades_never_overwrite_newer_ones() {
    let svc = FixtureCatalogue::demo();
    let mut ex = Explorer::default();
    let old = ex.fetch_ticker(Some("CPI-24-T1")).unwrap();
    let new = ex.fetch_ticker(Some("CPI-24-T2")).unwrap();

    let new_resp = new.execute(&svc);
    let old_resp = old.execute(&svc);
    assert!(matches!(ex.apply(new_resp).unwrap(), Applied::Dataset { .. }));
    let count = ex.store().result_count();
    assert_eq!(ex.apply(old_resp).unwrap(), Applied::Stale);
    assert_eq!(ex.store().result_count(), count);
    assert_eq!(ex.loaded_ticker(), Some("CPI-24-T2"));
    assert!(ex
        .store()
        .dataset()
        .iter()
        .all(|r| r.text("ticker") == "CPI-24-T2"));
}

#[test]
fn unknown_ticket_is_stale() {
    let mut ex = Explorer::default();
    let resp = CatalogueResponse {
        ticket: Ticket {
            channel: Channel::Trades,
            seq: 99,
        },
        result: Ok(CatalogueReply::Trades(vec![Record::new().with("price", 1)])),
    };
    assert_eq!(ex.apply(resp).unwrap(), Applied::Stale);
    assert!(ex.store().is_empty());
}

#[test]
fn new_kinds_change_sort_semantics() {
    let mut kinds = FieldKinds::default();
    kinds.numeric.insert("strike".into());
    let mut ex = Explorer::new(kinds, TradeForm::unbounded(None));
    let rows = ["10", "9", "100"]
        .iter()
        .map(|s| Record::new().with("strike", *s))
        .collect();
    load(&mut ex, "HIGHNY-24JUN01-T80", rows);
    ex.dispatch(Intent::SortColumnSelected("strike".into())).unwrap();
    let strikes: Vec<String> = ex
        .store()
        .current_view()
        .iter()
        .map(|r| r.text("strike"))
        .collect();
    assert_eq!(strikes, ["9", "10", "100"]);
}
