use anyhow::Result;
use chrono::{Duration, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::{RecordRepo, StatsRepo, SubjectRepo};
use crate::models::{
    AttendanceProjection, AttendanceStatus, DailyStats, DayStatus, OverallSummary, Subject,
    SubjectAttendance,
};
use crate::projector;
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{calendar, detail, header, statusbar, subjects};
use crate::utils::dates::today;
use crate::utils::format::progress_bar;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    AddSubject,
    EditGoal,
}

/// One row of the dashboard: stored subject, its history and what it projects to.
#[derive(Debug, Clone)]
pub struct SubjectView {
    pub subject: Subject,
    pub attendance: SubjectAttendance,
    pub projection: AttendanceProjection,
    pub today: DayStatus,
}

/// Outcome of the last action, shown in the status bar until the next key.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub text: String,
    pub error: bool,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub focus_idx: usize,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>,
    pub flash: Option<Flash>,

    // Cached state (refreshed after every write)
    pub today: NaiveDate,
    pub subjects: Vec<SubjectView>,
    pub summary: OverallSummary,
    pub weekly: Vec<DailyStats>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let summary = projector::summarize(&[], config.attendance.default_goal);
        App {
            view: View::Dashboard,
            config,
            focus_idx: 0,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            flash: None,
            today: today(),
            subjects: Vec::new(),
            summary,
            weekly: Vec::new(),
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        self.subjects = RecordRepo::load_all(conn)?
            .into_iter()
            .map(|(subject, attendance)| SubjectView {
                projection: projector::project(&attendance),
                today: projector::day_status(&attendance.history, self.today),
                subject,
                attendance,
            })
            .collect();

        let snapshots: Vec<SubjectAttendance> =
            self.subjects.iter().map(|s| s.attendance.clone()).collect();
        self.summary = projector::summarize(&snapshots, self.config.attendance.default_goal);
        self.weekly = StatsRepo::daily_counts(conn, self.today - Duration::days(6), self.today)?;

        if self.focus_idx >= self.subjects.len() {
            self.focus_idx = self.subjects.len().saturating_sub(1);
        }
        Ok(())
    }

    /// Reload when the date rolls over while the dashboard is open.
    pub fn tick(&mut self, conn: &Connection) {
        let now = today();
        if now != self.today {
            self.today = now;
            self.reload(conn);
        }
    }

    pub fn focused(&self) -> Option<&SubjectView> {
        self.subjects.get(self.focus_idx)
    }

    fn reload(&mut self, conn: &Connection) {
        if let Err(e) = self.load(conn) {
            log::error!("Reload failed: {:#}", e);
            self.flash_error(format!("{:#}", e));
        }
    }

    fn flash_ok(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            error: false,
        });
    }

    fn flash_error(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            error: true,
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses — ignore release/repeat events from some terminals
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.input_mode {
            InputMode::Normal => {
                self.flash = None;
                match self.view {
                    View::Dashboard => self.handle_dashboard_key(key, conn),
                    View::Stats => self.handle_stats_key(key),
                    View::Help => self.handle_help_key(key),
                }
            }
            InputMode::AddSubject | InputMode::EditGoal => self.handle_input_key(key, conn),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.focus_idx = self.focus_idx.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.focus_idx + 1 < self.subjects.len() {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Char('p') => self.mark_focused(conn, AttendanceStatus::Present),
            KeyCode::Char('a') => self.mark_focused(conn, AttendanceStatus::Absent),
            KeyCode::Char('n') => self.mark_focused(conn, AttendanceStatus::NoClass),
            KeyCode::Char('u') => self.unmark_focused(conn),
            KeyCode::Char('g') => {
                if let Some(goal) = self.focused().map(|s| s.subject.goal) {
                    self.input_mode = InputMode::EditGoal;
                    self.input_buffer = goal.to_string();
                    self.input_error = None;
                }
            }
            KeyCode::Char('A') => {
                self.input_mode = InputMode::AddSubject;
                self.input_buffer.clear();
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('s') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if let KeyCode::Esc | KeyCode::Char('?') = key.code {
            self.view = View::Dashboard;
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => self.close_input(),
            KeyCode::Enter => self.submit_input(conn),
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) => {
                let accepted = match self.input_mode {
                    InputMode::EditGoal => c.is_ascii_digit() && self.input_buffer.len() < 3,
                    _ => self.input_buffer.chars().count() < 48,
                };
                if accepted {
                    self.input_buffer.push(c);
                    self.input_error = None;
                }
            }
            _ => {}
        }
    }

    fn close_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.input_error = None;
    }

    fn submit_input(&mut self, conn: &Connection) {
        let trimmed = self.input_buffer.trim().to_string();
        let result = match self.input_mode {
            InputMode::AddSubject => SubjectRepo::add(
                conn,
                &trimmed,
                self.config.attendance.default_goal as i64,
            )
            .map(|_| format!("Added {}", trimmed)),
            InputMode::EditGoal => {
                let Some(name) = self.focused().map(|s| s.subject.name.clone()) else {
                    self.close_input();
                    return;
                };
                match trimmed.parse::<i64>() {
                    Ok(goal) => SubjectRepo::set_goal(conn, &name, goal)
                        .map(|_| format!("Goal for {} set to {}%", name, goal)),
                    Err(_) => Err(anyhow::anyhow!("Enter a whole number between 1 and 100")),
                }
            }
            InputMode::Normal => return,
        };

        match result {
            Ok(message) => {
                let added = self.input_mode == InputMode::AddSubject;
                self.close_input();
                self.reload(conn);
                if added {
                    self.focus_idx = self.subjects.len().saturating_sub(1);
                }
                self.flash_ok(message);
            }
            Err(e) => {
                self.input_error = Some(format!("{:#}", e));
            }
        }
    }

    fn mark_focused(&mut self, conn: &Connection, status: AttendanceStatus) {
        let Some((id, name)) = self.focused().map(|s| (s.subject.id, s.subject.name.clone())) else {
            return;
        };
        match RecordRepo::mark(conn, id, self.today, status) {
            Ok(()) => {
                self.reload(conn);
                let message = self
                    .focused()
                    .map(|s| s.projection.message.clone())
                    .unwrap_or_default();
                self.flash_ok(format!("{} marked {}  ·  {}", name, status, message));
            }
            Err(e) => {
                log::error!("Marking {} failed: {:#}", name, e);
                self.flash_error(format!("{:#}", e));
            }
        }
    }

    fn unmark_focused(&mut self, conn: &Connection) {
        let Some((id, name)) = self.focused().map(|s| (s.subject.id, s.subject.name.clone())) else {
            return;
        };
        match RecordRepo::unmark(conn, id, self.today) {
            Ok(true) => {
                self.reload(conn);
                self.flash_ok(format!("Cleared today's mark for {}", name));
            }
            Ok(false) => self.flash_ok(format!("{} is not marked today", name)),
            Err(e) => self.flash_error(format!("{:#}", e)),
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode != InputMode::Normal {
            self.draw_input_popup(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0], self.today, &self.summary);
        statusbar::render(frame, outer_chunks[2], self.flash.as_ref());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        subjects::render(frame, columns[0], &self.subjects, self.focus_idx);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(11),   // detail
                Constraint::Length(7), // calendar
            ])
            .split(columns[1]);

        let focused = self.focused();
        detail::render(frame, right_chunks[0], focused);

        let days = self.config.tui.calendar_days.max(1) as i64;
        let start = self.today - Duration::days(days - 1);
        let strip = focused
            .map(|s| projector::calendar(&s.attendance.history, start, self.today))
            .unwrap_or_default();
        calendar::render(frame, right_chunks[1], &strip);
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::accent().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let overall = &self.summary.projection;
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Overall:           ", theme::dim()),
                Span::styled(
                    format!("{}%  {}", overall.percentage, progress_bar(overall.percentage, 12)),
                    theme::for_status(overall.status).add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Attended:          ", theme::dim()),
                Span::styled(format!("{} of {}", overall.attended, overall.total), theme::bold()),
            ]),
            Line::from(vec![
                Span::styled("  Goal:              ", theme::dim()),
                Span::styled(format!("{}%", overall.goal), theme::bold()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Safe subjects:     ", theme::dim()),
                Span::styled(self.summary.safe.to_string(), theme::green()),
            ]),
            Line::from(vec![
                Span::styled("  In danger:         ", theme::dim()),
                Span::styled(self.summary.danger.to_string(), theme::red()),
            ]),
            Line::from(vec![
                Span::styled("  Without data:      ", theme::dim()),
                Span::styled(self.summary.neutral.to_string(), theme::dim()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Last 7 Days", theme::accent())),
            Line::from(""),
        ];

        for day in &self.weekly {
            let pct = (day.completion_ratio() * 100.0).round() as u32;
            let style = if day.held() == 0 {
                theme::dim()
            } else if pct >= overall.goal {
                theme::green()
            } else {
                theme::amber()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", progress_bar(pct, 12)), style),
                Span::styled(
                    format!("{}  {}/{}", day.date, day.present, day.held()),
                    theme::dim(),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).max(14).min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let bindings = [
            ("[↑ ↓]", "Select subject"),
            ("[p]", "Mark present today"),
            ("[a]", "Mark absent today"),
            ("[n]", "Mark no class today"),
            ("[u]", "Clear today's mark"),
            ("[g]", "Edit goal"),
            ("[A]", "Add subject"),
            ("[s]", "Stats view"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::accent().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in bindings {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<8}", key), theme::accent()),
                Span::styled(label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::accent())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_input_popup(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(3),
            width: area.width / 2,
            height: height.min(area.height),
        };

        frame.render_widget(Clear, popup_area);

        let (title, prompt) = match self.input_mode {
            InputMode::EditGoal => (" Edit Goal ", "  Goal (%): "),
            _ => (" Add Subject ", "  Name: "),
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(prompt, theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::accent().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::amber()),
            ]),
            Line::from(""),
            Line::from(Span::styled("  [Enter] save  ·  [Esc] cancel", theme::dim())),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::amber()
        };

        let block = Block::default()
            .title(Span::styled(title, theme::accent()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let tick_rate = config.tui.tick_rate_ms;
    let mut app = App::new(config);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(tick_rate);

    let result = (|| -> Result<()> {
        loop {
            terminal.draw(|frame| app.draw(frame))?;

            match events.next()? {
                Event::Key(key) => {
                    app.handle_key(key, &conn);
                    if app.should_quit {
                        return Ok(());
                    }
                }
                Event::Resize => {}
                Event::Tick => app.tick(&conn),
            }
        }
    })();

    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::ProjectionStatus;
    use crossterm::event::KeyModifiers;

    fn setup() -> (Connection, App) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        SubjectRepo::add(&conn, "DBMS", 75).unwrap();
        SubjectRepo::add(&conn, "OS", 75).unwrap();
        let mut app = App::new(AppConfig::default());
        app.today = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        app.load(&conn).unwrap();
        (conn, app)
    }

    fn press(app: &mut App, conn: &Connection, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), conn);
    }

    fn type_str(app: &mut App, conn: &Connection, s: &str) {
        for c in s.chars() {
            press(app, conn, KeyCode::Char(c));
        }
    }

    #[test]
    fn marking_updates_projection_and_today() {
        let (conn, mut app) = setup();
        assert_eq!(app.subjects[0].today, DayStatus::NotMarked);
        assert_eq!(app.subjects[0].projection.status, ProjectionStatus::Neutral);

        press(&mut app, &conn, KeyCode::Char('p'));
        assert_eq!(app.subjects[0].today, DayStatus::Present);
        assert_eq!(app.subjects[0].projection.percentage, 100);

        // same day again replaces the mark
        press(&mut app, &conn, KeyCode::Char('a'));
        assert_eq!(app.subjects[0].today, DayStatus::Absent);
        assert_eq!(app.subjects[0].projection.total, 1);
        assert_eq!(app.subjects[0].projection.status, ProjectionStatus::Danger);
        assert!(app.flash.as_ref().is_some_and(|f| !f.error));

        press(&mut app, &conn, KeyCode::Char('u'));
        assert_eq!(app.subjects[0].today, DayStatus::NotMarked);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Up);
        assert_eq!(app.focus_idx, 0);
        press(&mut app, &conn, KeyCode::Down);
        press(&mut app, &conn, KeyCode::Down);
        assert_eq!(app.focus_idx, 1);

        press(&mut app, &conn, KeyCode::Char('n'));
        assert_eq!(app.subjects[1].today, DayStatus::NoClass);
        assert_eq!(app.subjects[0].today, DayStatus::NotMarked);
    }

    #[test]
    fn edit_goal_validates() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('g'));
        assert_eq!(app.input_mode, InputMode::EditGoal);
        assert_eq!(app.input_buffer, "75");

        press(&mut app, &conn, KeyCode::Backspace);
        press(&mut app, &conn, KeyCode::Backspace);
        type_str(&mut app, &conn, "0");
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::EditGoal);
        assert!(app.input_error.is_some());

        press(&mut app, &conn, KeyCode::Backspace);
        type_str(&mut app, &conn, "80");
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.subjects[0].subject.goal, 80);
        assert_eq!(app.subjects[0].projection.goal, 80);
    }

    #[test]
    fn add_subject_focuses_it() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('A'));
        type_str(&mut app, &conn, "Compilers");
        press(&mut app, &conn, KeyCode::Enter);

        assert_eq!(app.subjects.len(), 3);
        assert_eq!(app.focus_idx, 2);
        assert_eq!(app.focused().unwrap().attendance.name, "Compilers");

        press(&mut app, &conn, KeyCode::Char('A'));
        type_str(&mut app, &conn, "os");
        press(&mut app, &conn, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::AddSubject);
        assert!(app.input_error.as_deref().unwrap().contains("already exists"));

        press(&mut app, &conn, KeyCode::Esc);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.subjects.len(), 3);
    }

    #[test]
    fn views_toggle_and_quit() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('s'));
        assert_eq!(app.view, View::Stats);
        press(&mut app, &conn, KeyCode::Esc);
        assert_eq!(app.view, View::Dashboard);
        press(&mut app, &conn, KeyCode::Char('?'));
        assert_eq!(app.view, View::Help);
        press(&mut app, &conn, KeyCode::Char('?'));
        press(&mut app, &conn, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn summary_tracks_marks() {
        let (conn, mut app) = setup();
        press(&mut app, &conn, KeyCode::Char('p'));
        press(&mut app, &conn, KeyCode::Down);
        press(&mut app, &conn, KeyCode::Char('a'));

        assert_eq!(app.summary.projection.attended, 1);
        assert_eq!(app.summary.projection.total, 2);
        assert_eq!(app.summary.safe, 1);
        assert_eq!(app.summary.danger, 1);
        let today = app.weekly.last().unwrap();
        assert_eq!(today.date, "2026-08-20");
        assert_eq!((today.present, today.absent), (1, 1));

        let stored = RecordRepo::history(&conn, app.subjects[0].subject.id).unwrap();
        assert_eq!(stored[0].date, "2026-08-20");
    }
}
