//! Panel 1, Browse: categories → series → tickers, with the selected
//! market's details.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use tradescope_core::navigation::NavigationState;

use crate::app::{scroll_window, AppState};
use crate::theme;
use crate::ui::truncate;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let nav = app.explorer.navigator();
    let state = nav.state();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    // Left: breadcrumb + list.
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled(state.breadcrumb(), theme::accent_bold()),
        Span::styled(format!("  ({})", state.description()), theme::muted()),
    ]));
    lines.push(Line::from(Span::styled(
        "[j/k]move [l]open [h]back [r]eload [f]etch [F]orm",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    let items = app.browse_items();
    if items.is_empty() {
        let hint = if nav.is_loading() {
            "Loading…"
        } else if state.is_top_level() {
            "No categories loaded. Press r to reload."
        } else {
            "Nothing here."
        };
        lines.push(Line::from(Span::styled(hint, theme::muted())));
    } else {
        let height = chunks[0].height.saturating_sub(3) as usize;
        let start = scroll_window(app.browse.cursor, 0, height);
        let end = (start + height).min(items.len());
        let width = chunks[0].width.saturating_sub(2) as usize;
        let selected_ticker = state.ticker();

        for (i, key) in items.iter().enumerate().take(end).skip(start) {
            let is_cursor = i == app.browse.cursor;
            let label = item_label(app, state, key);
            let marker = if selected_ticker == Some(key.as_str()) { "● " } else { "  " };
            let style = if is_cursor { theme::selected() } else { theme::text() };
            let mut spans = vec![
                Span::styled(marker, theme::positive()),
                Span::styled(truncate(&label, width.saturating_sub(12)), style),
            ];
            if let Some(status) = status_of(app, state, key) {
                spans.push(Span::styled(format!("  {status}"), theme::status(&status)));
            }
            lines.push(Line::from(spans));
        }
    }
    f.render_widget(Paragraph::new(lines), chunks[0]);

    render_details(f, chunks[1], app);
}

fn item_label(app: &AppState, state: &NavigationState, key: &str) -> String {
    let nav = app.explorer.navigator();
    match state {
        NavigationState::AtCategories => key.to_string(),
        NavigationState::AtSeriesList { .. } => match nav.series_list().iter().find(|s| s.ticker == key) {
            Some(s) if !s.title.is_empty() => format!("{key}  {}", s.title),
            _ => key.to_string(),
        },
        _ => match nav.ticker_listing().market(key) {
            Some(m) if !m.title.is_empty() => format!("{key}  {}", m.title),
            _ => key.to_string(),
        },
    }
}

fn status_of(app: &AppState, state: &NavigationState, key: &str) -> Option<String> {
    match state {
        NavigationState::AtTickerList { .. } | NavigationState::TickerSelected { .. } => app
            .explorer
            .navigator()
            .ticker_listing()
            .market(key)
            .map(|m| m.status.clone()),
        _ => None,
    }
}

fn render_details(f: &mut Frame, area: Rect, app: &AppState) {
    let nav = app.explorer.navigator();
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(theme::muted())
        .title(" Details ")
        .title_style(theme::neutral());
    let mut lines: Vec<Line> = Vec::new();

    if let Some(title) = nav.series_title() {
        lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
        lines.push(Line::from(""));
    }

    if let Some(market) = nav.selected_market() {
        lines.push(Line::from(Span::styled(market.title.clone(), theme::text())));
        detail(&mut lines, "Ticker", &market.ticker);
        detail(&mut lines, "Event", &market.event_ticker);
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<12}", "Status"), theme::muted()),
            Span::styled(market.status.clone(), theme::status(&market.status)),
        ]));
        detail(&mut lines, "Last price", &opt_num(market.last_price));
        detail(&mut lines, "Volume", &opt_num(market.volume));
        if let Some(open) = &market.open_time {
            detail(&mut lines, "Opens", open);
        }
        if let Some(close) = &market.close_time {
            detail(&mut lines, "Closes", close);
        }
    } else if let Some(ticker) = nav.state().ticker() {
        detail(&mut lines, "Ticker", ticker);
        let related = nav.event_tickers();
        if nav.is_loading() {
            lines.push(Line::from(Span::styled("  Looking up event…", theme::warning())));
        } else if !related.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  Event markets ({})", related.len()),
                theme::neutral(),
            )));
            for t in related {
                lines.push(Line::from(Span::styled(format!("    {t}"), theme::muted())));
            }
        }
    } else if let Some(series) = nav.state().series() {
        let listing = nav.ticker_listing();
        detail(&mut lines, "Series", series);
        detail(&mut lines, "Markets", &listing.tickers.len().to_string());
    } else if let Some(category) = nav.state().category() {
        detail(&mut lines, "Category", category);
        detail(&mut lines, "Series", &nav.series_list().len().to_string());
    }

    if let Some(loaded) = app.explorer.loaded_ticker() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  Loaded trades: ", theme::muted()),
            Span::styled(loaded.to_string(), theme::positive()),
            Span::styled(
                format!(" ({})", app.explorer.store().dataset().len()),
                theme::muted(),
            ),
        ]));
    }

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn detail(lines: &mut Vec<Line<'_>>, label: &str, value: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {label:<12}"), theme::muted()),
        Span::styled(value.to_string(), theme::text()),
    ]));
}

fn opt_num(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |n| format!("{n}"))
}
