//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use tradescope_core::Intent;

use crate::app::{AppState, FormField, Overlay, Panel, PAGE_ROWS};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Windows sends both Press and Release.
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::Welcome => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Search => {
            handle_search_overlay(app, key);
            return;
        }
        Overlay::FetchForm => {
            handle_form_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => { app.active_panel = Panel::Browse; return; }
        KeyCode::Char('2') => { app.active_panel = Panel::Trades; return; }
        KeyCode::Char('3') => { app.active_panel = Panel::Analysis; return; }
        KeyCode::Char('4') => { app.active_panel = Panel::Help; return; }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Browse => handle_browse_key(app, key),
        Panel::Trades => handle_trades_key(app, key),
        Panel::Analysis => handle_analysis_key(app, key),
        Panel::Help => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

/// The query is applied on every keystroke; Esc drops it.
fn handle_search_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_input.clear();
            app.set_query(String::new());
            app.overlay = Overlay::None;
        }
        KeyCode::Enter => {
            app.overlay = Overlay::None;
            let shown = app.explorer.store().result_count();
            app.set_status(format!("{shown} matching trades"));
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.set_query(app.search_input.clone());
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.set_query(app.search_input.clone());
        }
        _ => {}
    }
}

fn handle_form_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
        }
        KeyCode::Enter => {
            app.overlay = Overlay::None;
            app.apply_form_and_fetch();
        }
        KeyCode::Tab | KeyCode::Down => {
            app.form.field = app.form.field.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.field = app.form.field.prev();
        }
        KeyCode::Char(' ') if app.form.field == FormField::FetchAll => {
            app.form.fetch_all = !app.form.fetch_all;
        }
        KeyCode::Backspace => {
            if let Some(text) = app.form.focused_text() {
                text.pop();
            }
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(text) = app.form.focused_text() {
                text.push(c);
            }
        }
        _ => {}
    }
}

fn handle_browse_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.browse_move(1),
        KeyCode::Char('k') | KeyCode::Up => app.browse_move(-1),
        KeyCode::Char('g') | KeyCode::Home => app.browse.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.browse_move(isize::MAX),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => app.browse_select(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace | KeyCode::Esc => {
            app.browse_back()
        }
        KeyCode::Char('r') => app.refresh_categories(),
        KeyCode::Char('f') => app.fetch_trades(),
        KeyCode::Char('F') => app.overlay = Overlay::FetchForm,
        _ => {}
    }
}

fn handle_trades_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.trades_move(1),
        KeyCode::Char('k') | KeyCode::Up => app.trades_move(-1),
        KeyCode::PageDown => app.trades_move(PAGE_ROWS as isize),
        KeyCode::PageUp => app.trades_move(-(PAGE_ROWS as isize)),
        KeyCode::Char('g') | KeyCode::Home => app.trades_move(isize::MIN),
        KeyCode::Char('G') | KeyCode::End => app.trades_move(isize::MAX),
        KeyCode::Char('h') | KeyCode::Left => app.column_move(-1),
        KeyCode::Char('l') | KeyCode::Right => app.column_move(1),
        KeyCode::Char('s') => app.sort_by_selected_column(),
        KeyCode::Char('/') => {
            app.search_input = app.explorer.store().query().to_string();
            app.overlay = Overlay::Search;
        }
        KeyCode::Char('x') => app.export_csv(),
        KeyCode::Char('f') => app.overlay = Overlay::FetchForm,
        KeyCode::Char('r') => app.fetch_trades(),
        KeyCode::Char('a') => app.open_analysis(),
        _ => {}
    }
}

fn handle_analysis_key(app: &mut AppState, key: KeyEvent) {
    let session = app.explorer.analysis();
    let is_open = session.is_open();
    let tab = session.active_tab();
    let chart = session.chart_kind();

    match key.code {
        KeyCode::Enter | KeyCode::Char('o') if !is_open => app.open_analysis(),
        KeyCode::Char('l') | KeyCode::Right if is_open => {
            app.submit(Intent::AnalysisTabSelected(tab.next()));
        }
        KeyCode::Char('h') | KeyCode::Left if is_open => {
            app.submit(Intent::AnalysisTabSelected(tab.prev()));
        }
        KeyCode::Char('c') if is_open => {
            app.submit(Intent::ChartSelected(chart.next()));
        }
        KeyCode::Char('w') => app.save_chart(),
        KeyCode::Esc if is_open => {
            app.submit(Intent::AnalysisClosed);
            app.set_status("Analysis closed");
        }
        _ => {}
    }
}
