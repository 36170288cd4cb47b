use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::Flash;
use crate::tui::theme;

/// Key hints, or the last action's outcome when there is one.
pub fn render(frame: &mut Frame, area: Rect, flash: Option<&Flash>) {
    let line = match flash {
        Some(f) if f.error => Line::from(Span::styled(format!("✗ {}", f.text), theme::red())),
        Some(f) => Line::from(Span::styled(f.text.as_str(), theme::green())),
        None => {
            let hints = [
                ("[p]", " present  "),
                ("[a]", " absent  "),
                ("[n]", " no class  "),
                ("[u]", " unmark  "),
                ("[g]", " goal  "),
                ("[A]", " add  "),
                ("[s]", " stats  "),
                ("[?]", " help  "),
                ("[Esc]", " quit"),
            ];
            let mut spans = Vec::new();
            for (key, label) in &hints {
                spans.push(Span::styled(*key, theme::accent()));
                spans.push(Span::styled(*label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
