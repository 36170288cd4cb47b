use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState},
    Frame,
};

use crate::tui::app::SubjectView;
use crate::tui::theme;
use crate::utils::format::{fit_width, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, subjects: &[SubjectView], focused_idx: usize) {
    let block = Block::default()
        .title(Span::styled(" Subjects ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::accent())
        .style(theme::surface());

    if subjects.is_empty() {
        let items = vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(
                "  No subjects yet, press [A] to add one",
                theme::dim(),
            ))),
        ];
        frame.render_widget(List::new(items).block(block), area);
        return;
    }

    // Name column shrinks with the terminal; the rest is fixed width.
    let name_width = (area.width as usize).saturating_sub(30).clamp(6, 28);

    let items: Vec<ListItem> = subjects
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let p = &s.projection;
            let name_style = if i == focused_idx {
                theme::accent().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };
            let pointer = if i == focused_idx { "▸ " } else { "  " };

            ListItem::new(Line::from(vec![
                Span::styled(pointer, theme::accent()),
                Span::styled(fit_width(&s.attendance.name, name_width), name_style),
                Span::styled(format!(" {:>3}% ", p.percentage), theme::for_status(p.status)),
                Span::styled(progress_bar(p.percentage, 10), theme::for_status(p.status)),
                Span::styled("  ", theme::dim()),
                Span::styled(s.today.icon(), theme::for_day(s.today)),
            ]))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(focused_idx));
    let list = List::new(items).block(block);
    frame.render_stateful_widget(list, area, &mut state);
}
