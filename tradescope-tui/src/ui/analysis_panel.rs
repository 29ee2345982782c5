//! Panel 3, Analysis: tabbed statistics, metrics and charts for the loaded
//! trades.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use tradescope_core::analysis::{metric_cards, stat_cards, AnalysisContent, AnalysisTab, StatCard};
use tradescope_core::domain::{ChartImage, ChartKind};
use tradescope_core::export;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let session = app.explorer.analysis();
    let mut lines: Vec<Line> = Vec::new();

    if !session.is_open() {
        let rows = app.explorer.store().dataset().len();
        lines.push(Line::from(""));
        if rows == 0 {
            lines.push(Line::from(Span::styled(
                "Fetch trades first, then press Enter to analyse them.",
                theme::muted(),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                format!("{rows} trades loaded. Press Enter to analyse."),
                theme::accent(),
            )));
        }
        f.render_widget(Paragraph::new(lines), area);
        return;
    }

    // Tab strip
    let mut tabs = Vec::new();
    for tab in AnalysisTab::ALL {
        let style = if tab == session.active_tab() {
            theme::selected()
        } else {
            theme::muted()
        };
        tabs.push(Span::styled(format!(" {} ", tab.label()), style));
        tabs.push(Span::raw(" "));
    }
    lines.push(Line::from(tabs));
    lines.push(Line::from(Span::styled(
        "[h/l]tab [c]hart type [w]rite PNG [Esc]close",
        theme::muted(),
    )));
    lines.push(Line::from(""));

    if session.is_loading() {
        lines.push(Line::from(Span::styled("Loading…", theme::warning())));
    }

    match session.content() {
        Some(AnalysisContent::Stats(stats)) => cards(&mut lines, &stat_cards(stats)),
        Some(AnalysisContent::Metrics(metrics)) => cards(&mut lines, &metric_cards(metrics)),
        Some(AnalysisContent::Chart(image)) => chart(&mut lines, image, session.chart_kind()),
        Some(AnalysisContent::All(full)) => {
            heading(&mut lines, "Statistics");
            cards(&mut lines, &stat_cards(&full.basic_stats));
            lines.push(Line::from(""));
            heading(&mut lines, "Metrics");
            cards(&mut lines, &metric_cards(&full.advanced_metrics));
            lines.push(Line::from(""));
            heading(&mut lines, "Charts");
            for (name, data) in full.labelled_charts() {
                let (mark, style) = match data {
                    Some(_) => ("ready", theme::positive()),
                    None => ("unavailable", theme::negative()),
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {name:<24}"), theme::text()),
                    Span::styled(mark, style),
                ]));
            }
        }
        None if !session.is_loading() => {
            lines.push(Line::from(Span::styled("Nothing to show.", theme::muted())));
        }
        None => {}
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn heading(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn cards(lines: &mut Vec<Line<'_>>, cards: &[StatCard]) {
    for card in cards {
        let mut spans = vec![
            Span::styled(format!("  {:<24}", card.title), theme::muted()),
            Span::styled(card.value.clone(), theme::text()),
        ];
        if !card.unit.is_empty() {
            spans.push(Span::styled(format!(" {}", card.unit), theme::neutral()));
        }
        lines.push(Line::from(spans));
    }
}

/// The terminal cannot show the image itself; describe it and list the
/// other chart types.
fn chart(lines: &mut Vec<Line<'_>>, image: &ChartImage, active: ChartKind) {
    heading(lines, active.label());
    match export::chart_png(image) {
        Ok(bytes) => lines.push(Line::from(Span::styled(
            format!("  PNG, {} bytes. Press w to save it.", bytes.len()),
            theme::text(),
        ))),
        Err(e) => lines.push(Line::from(Span::styled(
            format!("  Chart data unreadable: {e}"),
            theme::negative(),
        ))),
    }
    lines.push(Line::from(""));
    for kind in ChartKind::ALL {
        let style = if kind == active { theme::accent() } else { theme::muted() };
        lines.push(Line::from(Span::styled(format!("  {}", kind.label()), style)));
    }
}
