use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::DayStatus;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, days: &[(NaiveDate, DayStatus)]) {
    let block = Block::default()
        .title(Span::styled(
            format!(" Last {} days ", days.len()),
            theme::accent(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let mut weekday_spans = vec![Span::styled("  ", theme::dim())];
    let mut mark_spans = vec![Span::styled("  ", theme::dim())];
    for (date, mark) in days {
        let initial = date.format("%a").to_string();
        let initial = initial.chars().next().unwrap_or(' ');
        weekday_spans.push(Span::styled(format!("{} ", initial), theme::dim()));
        mark_spans.push(Span::styled(format!("{} ", mark.icon()), theme::for_day(*mark)));
    }

    let legend = Line::from(vec![
        Span::styled("  ● ", theme::green()),
        Span::styled("present ", theme::dim()),
        Span::styled("✗ ", theme::red()),
        Span::styled("absent ", theme::dim()),
        Span::styled("– ", theme::amber()),
        Span::styled("no class ", theme::dim()),
        Span::styled("○ ", theme::dim()),
        Span::styled("unmarked", theme::dim()),
    ]);

    let text = vec![
        Line::from(""),
        Line::from(weekday_spans),
        Line::from(mark_spans),
        Line::from(""),
        legend,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
