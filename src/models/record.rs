use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AttendanceError;
use crate::utils::dates::parse_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    NoClass,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::NoClass => "no-class",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::NoClass => "No class",
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AttendanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "p" => Ok(AttendanceStatus::Present),
            "absent" | "a" => Ok(AttendanceStatus::Absent),
            "no-class" | "noclass" | "no_class" | "n" => Ok(AttendanceStatus::NoClass),
            _ => Err(AttendanceError::UnknownStatus(s.to_string())),
        }
    }
}

/// One calendar entry for one subject.
///
/// The date is kept as the raw `YYYY-MM-DD` string it was stored or imported
/// with; records whose date does not parse are ignored by every aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub date: String,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate, status: AttendanceStatus) -> Self {
        Self {
            date: date.format(crate::utils::dates::DATE_FORMAT).to_string(),
            status,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date).ok()
    }
}

/// Mark for a single day, with `NotMarked` when the subject has no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    Present,
    Absent,
    NoClass,
    NotMarked,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Present => "present",
            DayStatus::Absent => "absent",
            DayStatus::NoClass => "no-class",
            DayStatus::NotMarked => "not-marked",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DayStatus::Present => "●",
            DayStatus::Absent => "✗",
            DayStatus::NoClass => "–",
            DayStatus::NotMarked => "○",
        }
    }
}

impl From<AttendanceStatus> for DayStatus {
    fn from(status: AttendanceStatus) -> Self {
        match status {
            AttendanceStatus::Present => DayStatus::Present,
            AttendanceStatus::Absent => DayStatus::Absent,
            AttendanceStatus::NoClass => DayStatus::NoClass,
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_short_and_long_forms() {
        assert_eq!("present".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Present));
        assert_eq!("A".parse::<AttendanceStatus>(), Ok(AttendanceStatus::Absent));
        assert_eq!("no-class".parse::<AttendanceStatus>(), Ok(AttendanceStatus::NoClass));
        assert_eq!(
            "late".parse::<AttendanceStatus>(),
            Err(AttendanceError::UnknownStatus("late".to_string()))
        );
    }

    #[test]
    fn status_serializes_with_hyphen() {
        let json = serde_json::to_string(&AttendanceStatus::NoClass).unwrap();
        assert_eq!(json, "\"no-class\"");
        let day = serde_json::to_string(&DayStatus::NotMarked).unwrap();
        assert_eq!(day, "\"not-marked\"");
    }

    #[test]
    fn malformed_date_does_not_parse() {
        let record = AttendanceRecord {
            date: "2026-13-40".to_string(),
            status: AttendanceStatus::Present,
        };
        assert!(record.parsed_date().is_none());

        let ok = AttendanceRecord::new(
            NaiveDate::from_ymd_opt(2026, 8, 3).unwrap(),
            AttendanceStatus::Absent,
        );
        assert_eq!(ok.date, "2026-08-03");
        assert_eq!(ok.parsed_date(), NaiveDate::from_ymd_opt(2026, 8, 3));
    }
}
