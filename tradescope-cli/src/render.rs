//! Plain-text tables for terminal output.

use tradescope_core::analysis::StatCard;
use tradescope_core::domain::{format_header, FieldKinds, MarketMetadata, SeriesMetadata, TickerListing};
use tradescope_core::export::export_columns;
use tradescope_core::query::View;

/// Widest a column may grow before cells are truncated.
const MAX_WIDTH: usize = 32;

fn clip(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_WIDTH)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{:<w$}", clip(c, w)))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(headers));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        println!("{}", line(row));
    }
}

fn opt_num(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |n| format!("{n}"))
}

pub fn print_series(series: &[SeriesMetadata]) {
    let headers = ["Ticker", "Title", "Frequency", "Markets", "Tags"].map(String::from);
    let rows: Vec<Vec<String>> = series
        .iter()
        .map(|s| {
            vec![
                s.ticker.clone(),
                s.title.clone(),
                s.frequency.clone(),
                s.market_count.map_or_else(|| "-".to_string(), |n| n.to_string()),
                s.tags.join(", "),
            ]
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn print_tickers(listing: &TickerListing) {
    let headers = ["Ticker", "Status", "Last Price", "Volume", "Title"].map(String::from);
    let rows: Vec<Vec<String>> = listing
        .tickers
        .iter()
        .map(|t| match listing.market(t) {
            Some(m) => vec![
                t.clone(),
                m.status.clone(),
                opt_num(m.last_price),
                opt_num(m.volume),
                m.title.clone(),
            ],
            None => vec![t.clone(), "-".into(), "-".into(), "-".into(), String::new()],
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn print_market(market: &MarketMetadata) {
    println!("{} ({})", market.title, market.status);
    println!("Event:      {}", market.event_ticker);
    println!("Last price: {}", opt_num(market.last_price));
    println!("Volume:     {}", opt_num(market.volume));
    if let (Some(open), Some(close)) = (&market.open_time, &market.close_time) {
        println!("Trading:    {open} to {close}");
    }
}

/// The view with display formatting, preferred columns first.
pub fn print_view(view: &View<'_>, kinds: &FieldKinds, preferred: &[String]) {
    let columns = export_columns(view, preferred);
    let headers: Vec<String> = columns.iter().map(|c| format_header(c)).collect();
    let rows: Vec<Vec<String>> = view
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).map(|v| kinds.format_cell(c, v)).unwrap_or_default())
                .collect()
        })
        .collect();
    print_table(&headers, &rows);
}

pub fn print_cards(title: &str, cards: &[StatCard]) {
    println!("=== {title} ===");
    let width = cards.iter().map(|c| c.title.len()).max().unwrap_or(0);
    for card in cards {
        if card.unit.is_empty() {
            println!("{:<width$}  {}", card.title, card.value);
        } else {
            println!("{:<width$}  {} {}", card.title, card.value, card.unit);
        }
    }
}
