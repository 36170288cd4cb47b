use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

use crate::models::ProjectionStatus;
use crate::tui::app::SubjectView;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, subject: Option<&SubjectView>) {
    let title = subject
        .map(|s| format!(" {} ", s.attendance.name))
        .unwrap_or_else(|| " Details ".to_string());

    let block = Block::default()
        .title(Span::styled(title, theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let Some(s) = subject else {
        frame.render_widget(block, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // spacer
            Constraint::Length(1), // gauge
            Constraint::Min(0),    // text
        ])
        .split(inner);

    let p = &s.projection;
    let gauge = Gauge::default()
        .gauge_style(theme::for_status(p.status))
        .percent(p.percentage.min(100) as u16)
        .label(Span::styled(format!("{}%", p.percentage), theme::bold()));
    frame.render_widget(gauge, chunks[1]);

    let status_label = match p.status {
        ProjectionStatus::Safe => "SAFE",
        ProjectionStatus::Danger => "DANGER",
        ProjectionStatus::Neutral => "NO DATA",
    };

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Status      ", theme::dim()),
            Span::styled(
                status_label,
                theme::for_status(p.status).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Goal        ", theme::dim()),
            Span::styled(format!("{}%", p.goal), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Attended    ", theme::dim()),
            Span::styled(format!("{} / {}", p.attended, p.total), theme::bold()),
        ]),
        Line::from(vec![
            Span::styled("  Today       ", theme::dim()),
            Span::styled(s.today.as_str(), theme::for_day(s.today)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", p.message),
            theme::for_status(p.status).add_modifier(Modifier::BOLD),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), chunks[2]);
}
