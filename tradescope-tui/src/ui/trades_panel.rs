//! Panel 2, Trades: the filtered and sorted trade table.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use tradescope_core::domain::{format_header, FieldKinds};
use tradescope_core::query::View;

use crate::app::{scroll_window, AppState};
use crate::theme;
use crate::ui::truncate;

/// Widest a column may grow.
const MAX_COL_WIDTH: usize = 24;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let store = app.explorer.store();
    let sort = store.sort_state();
    let mut lines: Vec<Line> = Vec::new();

    // Header
    let ticker = app.explorer.loaded_ticker().unwrap_or("-");
    let mut header = vec![
        Span::styled(format!("{ticker} | "), theme::accent_bold()),
        Span::styled(
            format!("{} of {} trades", store.result_count(), store.dataset().len()),
            theme::accent(),
        ),
    ];
    if !store.query().is_empty() {
        header.push(Span::styled(format!(" | filter: \"{}\"", store.query()), theme::neutral()));
    }
    if let Some(column) = &sort.column {
        header.push(Span::styled(
            format!(" | {} {}", format_header(column), sort.direction.arrow()),
            theme::neutral(),
        ));
    }
    if app.explorer.is_fetching_trades() {
        header.push(Span::styled(" | fetching…", theme::warning()));
    }
    lines.push(Line::from(header));
    lines.push(Line::from(Span::styled(
        "[j/k]rows [h/l]column [s]ort [/]search [x]export [f]orm [a]nalyse",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    if store.is_empty() {
        lines.push(Line::from(Span::styled(
            "No trades loaded. Select a ticker in Browse and press f.",
            theme::muted(),
        )));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    let view = store.current_view();
    let columns = app.columns();
    let widths = column_widths(&view, &columns, store.kinds());

    // Column headers
    let mut spans = Vec::new();
    for (i, (column, &w)) in columns.iter().zip(&widths).enumerate() {
        let mut title = format_header(column);
        if sort.column.as_deref() == Some(column.as_str()) {
            title.push(' ');
            title.push_str(sort.direction.arrow());
        }
        let style = if i == app.trades.column {
            theme::accent_bold().add_modifier(Modifier::UNDERLINED)
        } else {
            theme::accent_bold()
        };
        spans.push(Span::styled(format!("{:<w$} ", truncate(&title, w)), style));
    }
    lines.push(Line::from(spans));

    if view.is_empty() {
        lines.push(Line::from(Span::styled(
            "No trades match the filter.",
            theme::muted(),
        )));
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    // Visible rows
    let height = area.height.saturating_sub(4) as usize;
    let start = scroll_window(app.trades.row, app.trades.scroll, height);
    let end = (start + height).min(view.len());
    for pos in start..end {
        let Some(record) = view.get(pos) else { break };
        let is_cursor = pos == app.trades.row;
        let spans: Vec<Span> = columns
            .iter()
            .zip(&widths)
            .map(|(column, &w)| {
                let text = record
                    .get(column)
                    .map(|v| store.kinds().format_cell(column, v))
                    .unwrap_or_default();
                let style = if is_cursor {
                    theme::selected()
                } else if column.ends_with("side") {
                    theme::side(&text)
                } else {
                    theme::text()
                };
                Span::styled(format!("{:<w$} ", truncate(&text, w)), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines), area);
}

/// Width of each column: the longest formatted cell or header, capped.
fn column_widths(view: &View<'_>, columns: &[String], kinds: &FieldKinds) -> Vec<usize> {
    columns
        .iter()
        .map(|column| {
            let header = format_header(column).chars().count() + 2;
            view.iter()
                .take(500)
                .filter_map(|r| r.get(column))
                .map(|v| kinds.format_cell(column, v).chars().count())
                .fold(header, usize::max)
                .min(MAX_COL_WIDTH)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradescope_core::domain::Record;

    #[test]
    fn widths_cover_header_and_cells() {
        let rows = vec![
            Record::new().with("price", 1.5).with("note", "a very long note that keeps going"),
            Record::new().with("price", 12.25),
        ];
        let order = [0, 1];
        let view = View::new(&rows, &order).unwrap();
        let columns = vec!["price".to_string(), "note".to_string()];
        let widths = column_widths(&view, &columns, &FieldKinds::default());
        // "Price" + arrow room vs "$12.25"
        assert_eq!(widths[0], 7);
        assert_eq!(widths[1], MAX_COL_WIDTH);
    }
}
