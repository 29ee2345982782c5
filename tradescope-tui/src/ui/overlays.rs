//! Overlay widgets: welcome, error history, search, fetch form.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use tradescope_core::catalogue::{DEFAULT_LIMIT, FETCH_ALL_LIMIT};

use crate::app::{AppState, FormField};
use crate::theme;
use crate::ui::centered_rect;

/// First-run welcome overlay.
pub fn render_welcome(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Welcome to Tradescope ")
        .title_style(theme::accent_bold());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Getting started:", theme::accent_bold())),
        Line::from(""),
        Line::from(Span::styled("  1. Pick a category, series and ticker in Browse", theme::muted())),
        Line::from(Span::styled("  2. Press f to fetch its trades", theme::muted())),
        Line::from(Span::styled("  3. Sort with s, search with /, export with x", theme::muted())),
        Line::from(Span::styled("  4. Press a to analyse the loaded trades", theme::muted())),
        Line::from(""),
        Line::from(Span::styled("Press any key to dismiss...", theme::neutral())),
    ];

    let para = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", err.timestamp.format("%H:%M:%S")), theme::muted()),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Live search overlay.
pub fn render_search(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(50, 20, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Search [Enter]keep [Esc]clear ")
        .title_style(theme::accent_bold());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let store = app.explorer.store();
    let text = vec![
        Line::from(Span::styled("Match any column (case-insensitive):", theme::muted())),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", theme::accent()),
            Span::styled(app.search_input.as_str(), theme::accent_bold()),
            Span::styled("_", theme::accent()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} of {} trades", store.result_count(), store.dataset().len()),
            theme::neutral(),
        )),
    ];

    f.render_widget(Paragraph::new(text), inner);
}

/// Fetch form overlay.
pub fn render_fetch_form(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(50, 40, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Fetch Trades [Tab]field [Enter]fetch [Esc]cancel ")
        .title_style(theme::accent_bold());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let form = &app.form;
    let ticker = app.explorer.navigation().ticker().unwrap_or("(no ticker selected)");
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Ticker: ", theme::muted()),
            Span::styled(ticker, theme::accent_bold()),
        ]),
        Line::from(""),
    ];

    field(
        &mut lines,
        form.field == FormField::FetchAll,
        "Fetch all",
        if form.fetch_all { "[x]" } else { "[ ]" },
    );
    field(&mut lines, form.field == FormField::Limit, "Limit", &form.limit);
    let days = if form.fetch_all { "(ignored)" } else { form.days.as_str() };
    field(&mut lines, form.field == FormField::Days, "Last days", days);

    lines.push(Line::from(""));
    let hint = if form.fetch_all {
        format!("Fetch all ignores the window and asks for up to {FETCH_ALL_LIMIT} trades.")
    } else {
        format!("Blank limit uses {DEFAULT_LIMIT}; blank days fetches without a window.")
    };
    lines.push(Line::from(Span::styled(hint, theme::muted())));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn field(lines: &mut Vec<Line<'_>>, focused: bool, label: &str, value: &str) {
    let style = if focused { theme::selected() } else { theme::text() };
    lines.push(Line::from(vec![
        Span::styled(format!("  {label:<10} "), theme::muted()),
        Span::styled(value.to_string(), style),
    ]));
}
