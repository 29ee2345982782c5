//! Panel 4, Help: keyboard shortcuts.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "q / Ctrl+C", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 1 — Browse");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "l / Enter", "Open category, series or ticker");
    key(&mut lines, "h / Backspace", "Go back one level");
    key(&mut lines, "r", "Reload categories");
    key(&mut lines, "f", "Fetch trades for the selected ticker");
    key(&mut lines, "F", "Edit the fetch form");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 2 — Trades");
    key(&mut lines, "j / k, PgUp / PgDn", "Move through rows");
    key(&mut lines, "h / l", "Select column");
    key(&mut lines, "s", "Sort by column (again to reverse)");
    key(&mut lines, "/", "Search all columns");
    key(&mut lines, "x", "Export the visible rows to CSV");
    key(&mut lines, "f", "Edit the fetch form and refetch");
    key(&mut lines, "r", "Refetch with the current form");
    key(&mut lines, "a", "Analyse the loaded trades");
    lines.push(Line::from(""));

    section(&mut lines, "Panel 3 — Analysis");
    key(&mut lines, "Enter / o", "Open analysis");
    key(&mut lines, "h / l", "Previous / next tab");
    key(&mut lines, "c", "Next chart type");
    key(&mut lines, "w", "Save the chart as PNG");
    key(&mut lines, "Esc", "Close analysis");
    lines.push(Line::from(""));

    section(&mut lines, "Fetch Form");
    key(&mut lines, "Tab / Shift+Tab", "Next / previous field");
    key(&mut lines, "Space", "Toggle fetch all");
    key(&mut lines, "0-9 / Backspace", "Edit limit or days");
    key(&mut lines, "Enter", "Apply and fetch");

    let para = Paragraph::new(lines);
    f.render_widget(para, area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>20}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
