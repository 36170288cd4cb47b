use anyhow::{Context, Result};
use chrono::{Duration, Local};
use rusqlite::Connection;
use std::path::Path;
use std::str::FromStr;

use crate::cli::args::SubjectCommands;
use crate::cli::transfer::{ExportDocument, ExportedSubject, parse_import};
use crate::config::AppConfig;
use crate::db::repository::{MetaRepo, RecordRepo, StatsRepo, SubjectRepo};
use crate::models::subject::validate_goal;
use crate::models::{AttendanceProjection, AttendanceStatus, DayStatus, ProjectionStatus};
use crate::projector;
use crate::utils::dates::{date_or_today, format_date, parse_date, today};
use crate::utils::format::{fit_width, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const TEAL: &str = "\x1b[38;2;72;170;160m";

fn status_color(status: ProjectionStatus) -> &'static str {
    match status {
        ProjectionStatus::Safe => GREEN,
        ProjectionStatus::Danger => RED,
        ProjectionStatus::Neutral => DIM,
    }
}

fn day_color(day: DayStatus) -> &'static str {
    match day {
        DayStatus::Present => GREEN,
        DayStatus::Absent => RED,
        DayStatus::NoClass => AMBER,
        DayStatus::NotMarked => DIM,
    }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

pub fn handle_subject(conn: &Connection, config: &AppConfig, action: &SubjectCommands) -> Result<()> {
    match action {
        SubjectCommands::Add { name, goal } => {
            let goal = goal.unwrap_or(config.attendance.default_goal as i64);
            SubjectRepo::add(conn, name, goal)?;
            println_colored!(GREEN, "  ✓ Added {} (goal {}%)", name.trim(), goal);
        }
        SubjectCommands::List => {
            let subjects = SubjectRepo::list(conn)?;
            println!();
            if subjects.is_empty() {
                println_colored!(DIM, "  No subjects yet. Add one with `lastminute subject add <name>`");
            } else {
                println_colored!(TEAL, "  Subjects");
                println!();
                for subject in &subjects {
                    println!("  {}  goal {}%", fit_width(&subject.name, 24), subject.goal);
                }
            }
            println!();
        }
        SubjectCommands::Remove { name } => {
            SubjectRepo::remove(conn, name)?;
            println_colored!(AMBER, "  Removed {} and its history", name.trim());
        }
        SubjectCommands::Goal { name, goal } => {
            SubjectRepo::set_goal(conn, name, *goal)?;
            let subject = SubjectRepo::require(conn, name)?;
            let projection = projector::project(&RecordRepo::load_subject(conn, &subject)?);
            println_colored!(GREEN, "  ✓ Goal for {} set to {}%", subject.name, goal);
            println_colored!(status_color(projection.status), "  {}", projection.message);
        }
        SubjectCommands::Rename { old, new } => {
            SubjectRepo::rename(conn, old, new)?;
            println_colored!(GREEN, "  ✓ Renamed {} to {}", old.trim(), new.trim());
        }
    }
    Ok(())
}

// ─── Mark / unmark ───────────────────────────────────────────────────────────

pub fn handle_mark(
    conn: &Connection,
    subject_name: &str,
    status_str: &str,
    date: Option<&str>,
) -> Result<()> {
    let status = AttendanceStatus::from_str(status_str)?;
    let date = date_or_today(date)?;
    let subject = SubjectRepo::require(conn, subject_name)?;

    RecordRepo::mark(conn, subject.id, date, status)?;
    let projection = projector::project(&RecordRepo::load_subject(conn, &subject)?);

    println_colored!(
        day_color(DayStatus::from(status)),
        "  {} {} marked {} on {}",
        DayStatus::from(status).icon(),
        subject.name,
        status.display_name().to_lowercase(),
        format_date(date)
    );
    print_projection_line(&subject.name, &projection);
    Ok(())
}

pub fn handle_unmark(conn: &Connection, subject_name: &str, date: Option<&str>) -> Result<()> {
    let date = date_or_today(date)?;
    let subject = SubjectRepo::require(conn, subject_name)?;

    if RecordRepo::unmark(conn, subject.id, date)? {
        println_colored!(AMBER, "  Cleared {} on {}", subject.name, format_date(date));
    } else {
        println_colored!(DIM, "  {} was not marked on {}", subject.name, format_date(date));
    }
    Ok(())
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn handle_status(conn: &Connection, config: &AppConfig, subject: Option<&str>) -> Result<()> {
    let today = today();
    let all = match subject {
        Some(name) => {
            let s = SubjectRepo::require(conn, name)?;
            let attendance = RecordRepo::load_subject(conn, &s)?;
            vec![(s, attendance)]
        }
        None => RecordRepo::load_all(conn)?,
    };

    println!();
    if all.is_empty() {
        println_colored!(DIM, "  No subjects yet. Add one with `lastminute subject add <name>`");
        println!();
        return Ok(());
    }

    println_colored!(TEAL, "  Attendance — {}", format_date(today));
    println!();
    for (_, attendance) in &all {
        let projection = projector::project(attendance);
        let mark = projector::day_status(&attendance.history, today);
        print_projection_line(&attendance.name, &projection);
        println_colored!(
            day_color(mark),
            "  {}  today: {}  ·  {}/{} attended  ·  goal {}%",
            " ".repeat(24),
            mark,
            projection.attended,
            projection.total,
            projection.goal
        );
    }

    if subject.is_none() {
        let subjects: Vec<_> = all.into_iter().map(|(_, a)| a).collect();
        let summary = projector::summarize(&subjects, config.attendance.default_goal);
        println!();
        println_colored!(
            BOLD,
            "  Overall: {}% ({}/{})  ·  {} safe, {} in danger, {} without data",
            summary.projection.percentage,
            summary.projection.attended,
            summary.projection.total,
            summary.safe,
            summary.danger,
            summary.neutral
        );
    }
    println!();
    Ok(())
}

fn print_projection_line(name: &str, projection: &AttendanceProjection) {
    println_colored!(
        status_color(projection.status),
        "  {}  {:>3}%  {}  {}",
        fit_width(name, 24),
        projection.percentage,
        progress_bar(projection.percentage, 12),
        projection.message
    );
}

// ─── History ─────────────────────────────────────────────────────────────────

pub fn handle_history(
    conn: &Connection,
    config: &AppConfig,
    subject_name: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let end = date_or_today(to)?;
    let start = match from {
        Some(s) => parse_date(s)?,
        None => config.calendar_start(end),
    };
    let subject = SubjectRepo::require(conn, subject_name)?;
    let attendance = RecordRepo::load_subject(conn, &subject)?;
    let days = projector::calendar(&attendance.history, start, end);

    println!();
    println_colored!(
        TEAL,
        "  {} — {} to {}",
        subject.name,
        format_date(start),
        format_date(end)
    );
    println!();
    if days.is_empty() {
        println_colored!(DIM, "  Empty range");
    }
    for (date, mark) in &days {
        println_colored!(
            day_color(*mark),
            "  {}  {}  {}  {}",
            format_date(*date),
            date.format("%a"),
            mark.icon(),
            mark
        );
    }
    println!();
    print_projection_line(&subject.name, &projector::project(&attendance));
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, config: &AppConfig, week: bool) -> Result<()> {
    let all = RecordRepo::load_all(conn)?;
    let subjects: Vec<_> = all.into_iter().map(|(_, a)| a).collect();
    let summary = projector::summarize(&subjects, config.attendance.default_goal);
    let overall = &summary.projection;

    println!();
    println_colored!(TEAL, "  Statistics");
    println!();
    println_colored!(
        status_color(overall.status),
        "  Overall:     {}%  {}  (goal {}%)",
        overall.percentage,
        progress_bar(overall.percentage, 12),
        overall.goal
    );
    println!("  Attended:    {} of {} classes", overall.attended, overall.total);
    println!("  Subjects:    {}", summary.subjects);
    println_colored!(GREEN, "  Safe:        {}", summary.safe);
    if summary.danger > 0 {
        println_colored!(RED, "  In danger:   {}", summary.danger);
    } else {
        println_colored!(GREEN, "  In danger:   0 ✓");
    }
    println_colored!(DIM, "  No data:     {}", summary.neutral);
    println_colored!(status_color(overall.status), "  {}", overall.message);

    if week {
        let end = today();
        let start = end - Duration::days(6);
        println!();
        println_colored!(DIM, "  Last 7 days  (present/held across subjects)");
        println!();
        for day in StatsRepo::daily_counts(conn, start, end)? {
            let pct = (day.completion_ratio() * 100.0).round() as u32;
            let color = if day.held() == 0 {
                DIM
            } else if pct >= overall.goal {
                GREEN
            } else {
                AMBER
            };
            println_colored!(
                color,
                "  {}  {}  {}/{}{}",
                day.date,
                progress_bar(pct, 10),
                day.present,
                day.held(),
                if day.no_class > 0 {
                    format!("  ({} no-class)", day.no_class)
                } else {
                    String::new()
                }
            );
        }
    }

    println!();
    Ok(())
}

// ─── Export / import ─────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, config: &AppConfig) -> Result<()> {
    let today = today();
    let all = RecordRepo::load_all(conn)?;
    let subjects: Vec<_> = all.into_iter().map(|(_, a)| a).collect();

    let doc = ExportDocument {
        generated_on: format_date(today),
        subjects: subjects
            .iter()
            .map(|s| ExportedSubject {
                subject: s,
                today: projector::day_status(&s.history, today),
                projection: projector::project(s),
            })
            .collect(),
        overall: projector::summarize(&subjects, config.attendance.default_goal),
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&doc).context("Serializing export")?
    );
    Ok(())
}

pub fn handle_import(conn: &Connection, config: &AppConfig, path: &Path) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
    let parsed = parse_import(&content)?;

    let outcome =
        RecordRepo::import_all(conn, &parsed.subjects, config.attendance.default_goal)?;
    let imported = outcome.imported;
    let skipped = outcome.skipped + parsed.unknown_status;
    MetaRepo::set(conn, "last_import", &Local::now().to_rfc3339())?;

    println_colored!(
        GREEN,
        "  ✓ Imported {} records across {} subjects",
        imported,
        parsed.subjects.len()
    );
    if skipped > 0 {
        println_colored!(AMBER, "  Skipped {} malformed records", skipped);
    }
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(
    conn: &Connection,
    config: &mut AppConfig,
    default_goal: Option<i64>,
    semester_start: Option<&str>,
) -> Result<()> {
    let mut changed = false;
    if let Some(goal) = default_goal {
        config.attendance.default_goal = validate_goal(goal)?;
        changed = true;
    }
    if let Some(start) = semester_start {
        config.attendance.semester_start = Some(format_date(parse_date(start)?));
        changed = true;
    }
    if changed {
        config.save()?;
        println_colored!(GREEN, "  ✓ Configuration saved");
    }

    println!();
    println!("  Config file:     {}", AppConfig::config_path()?.display());
    println!("  Database:        {}", AppConfig::db_path()?.display());
    println!("  Default goal:    {}%", config.attendance.default_goal);
    println!(
        "  Semester start:  {}",
        config.attendance.semester_start.as_deref().unwrap_or("not set")
    );
    if let Some(last) = MetaRepo::get(conn, "last_import")? {
        println!("  Last import:     {}", last);
    }
    println!();
    Ok(())
}
