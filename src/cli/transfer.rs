use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{
    AttendanceProjection, AttendanceRecord, AttendanceStatus, DayStatus, OverallSummary,
    SubjectAttendance,
};

/// One subject as written by `export`.
#[derive(Debug, Serialize)]
pub struct ExportedSubject<'a> {
    #[serde(flatten)]
    pub subject: &'a SubjectAttendance,
    pub today: DayStatus,
    pub projection: AttendanceProjection,
}

#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub generated_on: String,
    pub subjects: Vec<ExportedSubject<'a>>,
    pub overall: OverallSummary,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct RawSubject {
    name: String,
    #[serde(default)]
    goal: Option<i64>,
    #[serde(default)]
    history: Vec<RawRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<RawSubject>),
    Wrapped { subjects: Vec<RawSubject> },
}

/// Subjects parsed from an import file plus the number of records dropped
/// for an unknown status. Malformed dates are left in place; the store
/// skips them when merging.
#[derive(Debug)]
pub struct ParsedImport {
    pub subjects: Vec<SubjectAttendance>,
    pub unknown_status: u32,
}

/// Accepts either a bare array of subjects or an `export` document.
pub fn parse_import(content: &str) -> Result<ParsedImport> {
    let raw: RawDocument = serde_json::from_str(content).context("Parsing import JSON")?;
    let raw_subjects = match raw {
        RawDocument::List(list) => list,
        RawDocument::Wrapped { subjects } => subjects,
    };

    let mut unknown_status = 0u32;
    let mut subjects = Vec::with_capacity(raw_subjects.len());

    for raw in raw_subjects {
        let mut history = Vec::with_capacity(raw.history.len());
        for record in raw.history {
            match AttendanceStatus::from_str(&record.status) {
                Ok(status) => history.push(AttendanceRecord {
                    date: record.date,
                    status,
                }),
                Err(e) => {
                    log::warn!("Skipping '{}' record on {}: {}", raw.name, record.date, e);
                    unknown_status += 1;
                }
            }
        }
        let goal = raw.goal.and_then(|g| i32::try_from(g).ok());
        subjects.push(SubjectAttendance::new(raw.name, goal).with_history(history));
    }

    Ok(ParsedImport {
        subjects,
        unknown_status,
    })
}
