use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::models::AttendanceRecord;

/// A subject row as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub goal: i32,
    pub created_at: Option<String>,
}

/// Snapshot handed to the projector: name, goal and the full history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAttendance {
    pub name: String,
    #[serde(default)]
    pub goal: Option<i32>,
    #[serde(default)]
    pub history: Vec<AttendanceRecord>,
}

impl SubjectAttendance {
    pub fn new(name: impl Into<String>, goal: Option<i32>) -> Self {
        Self {
            name: name.into(),
            goal,
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<AttendanceRecord>) -> Self {
        self.history = history;
        self
    }
}

/// Accepts goals in `1..=100`; everything else is rejected.
pub fn validate_goal(goal: i64) -> Result<i32, AttendanceError> {
    if (1..=100).contains(&goal) {
        Ok(goal as i32)
    } else {
        Err(AttendanceError::InvalidGoal(goal))
    }
}

/// Trims the name and rejects it when nothing is left.
pub fn validate_name(name: &str) -> Result<String, AttendanceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(AttendanceError::EmptySubjectName)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_bounds() {
        assert_eq!(validate_goal(1), Ok(1));
        assert_eq!(validate_goal(100), Ok(100));
        assert_eq!(validate_goal(0), Err(AttendanceError::InvalidGoal(0)));
        assert_eq!(validate_goal(101), Err(AttendanceError::InvalidGoal(101)));
        assert_eq!(validate_goal(-5), Err(AttendanceError::InvalidGoal(-5)));
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  DBMS "), Ok("DBMS".to_string()));
        assert_eq!(validate_name("   "), Err(AttendanceError::EmptySubjectName));
    }

    #[test]
    fn json_without_goal_or_history_deserializes() {
        let subject: SubjectAttendance = serde_json::from_str(r#"{"name":"OS"}"#).unwrap();
        assert_eq!(subject.name, "OS");
        assert_eq!(subject.goal, None);
        assert!(subject.history.is_empty());
    }
}
