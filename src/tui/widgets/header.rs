use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::OverallSummary;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, today: NaiveDate, summary: &OverallSummary) {
    let date_str = today.format("%A, %b %d, %Y").to_string();
    let overall = &summary.projection;

    let title_line = Line::from(vec![
        Span::styled("  lastminute  ", theme::accent().add_modifier(Modifier::BOLD)),
        Span::styled("attendance", theme::dim()),
    ]);

    let overall_span = if overall.total == 0 {
        Span::styled("no classes marked yet", theme::dim())
    } else {
        Span::styled(
            format!("overall {}% of {} classes", overall.percentage, overall.total),
            theme::for_status(overall.status).add_modifier(Modifier::BOLD),
        )
    };

    let date_line = Line::from(vec![
        Span::styled(date_str, theme::dim()),
        Span::styled("  ·  ", theme::dim()),
        overall_span,
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(vec![title_line, Line::from(""), date_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
