use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{
    AttendanceProjection, AttendanceRecord, AttendanceStatus, DayStatus, OverallSummary,
    ProjectionStatus, SubjectAttendance,
};
use crate::utils::format::pluralize;

pub const DEFAULT_GOAL: i32 = 75;

/// Goal used by the algebra: missing, zero or negative falls back to the
/// default, anything above 100 is clamped to 100.
pub fn effective_goal(goal: Option<i32>) -> u32 {
    match goal {
        Some(g) if g > 0 => g.min(100) as u32,
        _ => DEFAULT_GOAL as u32,
    }
}

/// Count `(attended, total)` over records with a well-formed date.
pub fn tally(history: &[AttendanceRecord]) -> (u32, u32) {
    let mut attended = 0u32;
    let mut total = 0u32;

    for record in history {
        if record.parsed_date().is_none() {
            log::debug!("Ignoring record with malformed date '{}'", record.date);
            continue;
        }
        match record.status {
            AttendanceStatus::Present => {
                attended += 1;
                total += 1;
            }
            AttendanceStatus::Absent => total += 1,
            AttendanceStatus::NoClass => {}
        }
    }
    (attended, total)
}

/// Project a subject's history against its goal.
pub fn project(subject: &SubjectAttendance) -> AttendanceProjection {
    let (attended, total) = tally(&subject.history);
    project_counts(attended, total, subject.goal)
}

/// Projection from raw counts. `attended` is clamped to `total`.
pub fn project_counts(attended: u32, total: u32, goal: Option<i32>) -> AttendanceProjection {
    let goal = effective_goal(goal);
    let attended = attended.min(total);

    if total == 0 {
        return AttendanceProjection {
            attended: 0,
            total: 0,
            percentage: 0,
            goal,
            status: ProjectionStatus::Neutral,
            classes_needed: 0,
            can_bunk: 0,
            goal_reachable: true,
            message: advisory_message(ProjectionStatus::Neutral, 0, 0, true),
        };
    }

    let percentage = round_percentage(attended, total);
    let (a, t, g) = (attended as u64, total as u64, goal as u64);

    let mut classes_needed = 0u32;
    let mut can_bunk = 0u32;
    let mut goal_reachable = true;

    let status = if percentage >= goal {
        // max y with 100a >= g(t + y)
        let surplus = (100 * a).saturating_sub(g * t);
        can_bunk = clamp_u32(surplus / g);
        ProjectionStatus::Safe
    } else {
        if goal >= 100 {
            goal_reachable = false;
        } else {
            // min x with 100(a + x) >= g(t + x)
            let deficit = (g * t).saturating_sub(100 * a);
            classes_needed = clamp_u32(deficit.div_ceil(100 - g));
        }
        ProjectionStatus::Danger
    };

    AttendanceProjection {
        attended,
        total,
        percentage,
        goal,
        status,
        classes_needed,
        can_bunk,
        goal_reachable,
        message: advisory_message(status, classes_needed, can_bunk, goal_reachable),
    }
}

/// `round(100 * attended / total)`, half up, in `0..=100`.
fn round_percentage(attended: u32, total: u32) -> u32 {
    let (a, t) = (attended as u64, total as u64);
    clamp_u32((200 * a + t) / (2 * t)).min(100)
}

fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

pub fn advisory_message(
    status: ProjectionStatus,
    classes_needed: u32,
    can_bunk: u32,
    goal_reachable: bool,
) -> String {
    match status {
        ProjectionStatus::Neutral => "No attendance data".to_string(),
        ProjectionStatus::Safe if can_bunk > 0 => {
            format!("Safe! Can miss {}", pluralize(can_bunk, "class", "classes"))
        }
        ProjectionStatus::Safe => "Attendance is safe".to_string(),
        ProjectionStatus::Danger if !goal_reachable => {
            "Goal unreachable: every remaining class must be attended".to_string()
        }
        ProjectionStatus::Danger => format!(
            "Need {}",
            pluralize(classes_needed, "consecutive present", "consecutive presents")
        ),
    }
}

/// Status recorded for `day`, or `NotMarked`. The last matching entry wins.
pub fn day_status(history: &[AttendanceRecord], day: NaiveDate) -> DayStatus {
    history
        .iter()
        .rev()
        .find(|r| r.parsed_date() == Some(day))
        .map(|r| DayStatus::from(r.status))
        .unwrap_or(DayStatus::NotMarked)
}

/// One entry per day in `[start, end]`; empty when the range is reversed.
pub fn calendar(
    history: &[AttendanceRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<(NaiveDate, DayStatus)> {
    let by_date: HashMap<NaiveDate, AttendanceStatus> = history
        .iter()
        .filter_map(|r| r.parsed_date().map(|d| (d, r.status)))
        .collect();

    start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| {
            let status = by_date
                .get(&d)
                .map(|s| DayStatus::from(*s))
                .unwrap_or(DayStatus::NotMarked);
            (d, status)
        })
        .collect()
}

/// Sum every subject's counts and project the totals against `default_goal`.
pub fn summarize(subjects: &[SubjectAttendance], default_goal: i32) -> OverallSummary {
    let mut attended = 0u32;
    let mut total = 0u32;
    let (mut safe, mut danger, mut neutral) = (0u32, 0u32, 0u32);

    for subject in subjects {
        let p = project(subject);
        attended += p.attended;
        total += p.total;
        match p.status {
            ProjectionStatus::Safe => safe += 1,
            ProjectionStatus::Danger => danger += 1,
            ProjectionStatus::Neutral => neutral += 1,
        }
    }

    OverallSummary {
        subjects: subjects.len() as u32,
        safe,
        danger,
        neutral,
        projection: project_counts(attended, total, Some(default_goal)),
    }
}
