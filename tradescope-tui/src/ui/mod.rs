//! Top-level UI layout: four-panel frame with status bar.

pub mod analysis_panel;
pub mod browse_panel;
pub mod help_panel;
pub mod overlays;
pub mod status_bar;
pub mod trades_panel;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match &app.overlay {
        Overlay::Welcome => overlays::render_welcome(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::Search => overlays::render_search(f, main_area, app),
        Overlay::FetchForm => overlays::render_fetch_form(f, main_area, app),
        Overlay::None => {}
    }
}

/// Draw the active panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    match panel {
        Panel::Browse => browse_panel::render(f, inner, app),
        Panel::Trades => trades_panel::render(f, inner, app),
        Panel::Analysis => analysis_panel::render(f, inner, app),
        Panel::Help => help_panel::render(f, inner, app),
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Clip `s` to `width` characters, marking the cut.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
