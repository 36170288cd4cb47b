use ratatui::style::{Color, Modifier, Style};

use crate::models::{DayStatus, ProjectionStatus};

pub const BG: Color = Color::Rgb(14, 17, 22);
pub const SURFACE: Color = Color::Rgb(22, 27, 34);
pub const BORDER: Color = Color::Rgb(48, 56, 68);
pub const TEXT: Color = Color::Rgb(220, 226, 232);
pub const TEXT_DIM: Color = Color::Rgb(120, 132, 146);
pub const ACCENT: Color = Color::Rgb(72, 170, 160);
pub const GREEN: Color = Color::Rgb(86, 166, 96);
pub const AMBER: Color = Color::Rgb(214, 154, 64);
pub const RED: Color = Color::Rgb(200, 84, 72);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}

pub fn border() -> Style {
    Style::default().fg(BORDER)
}

pub fn for_status(status: ProjectionStatus) -> Style {
    match status {
        ProjectionStatus::Safe => green(),
        ProjectionStatus::Danger => red(),
        ProjectionStatus::Neutral => dim(),
    }
}

pub fn for_day(day: DayStatus) -> Style {
    match day {
        DayStatus::Present => green(),
        DayStatus::Absent => red(),
        DayStatus::NoClass => amber(),
        DayStatus::NotMarked => dim(),
    }
}
