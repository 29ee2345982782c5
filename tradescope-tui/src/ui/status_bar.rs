//! Bottom status bar: loading indicator, last status message, panel hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    spans.push(Span::styled(
        " 1:Browse 2:Trades 3:Analysis 4:Help e:Errors",
        theme::muted(),
    ));
    spans.push(Span::raw(" | "));

    if app.explorer.is_busy() {
        spans.push(Span::styled("Loading… ", theme::warning()));
    }

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    let para = Paragraph::new(Line::from(spans));
    f.render_widget(para, area);
}
