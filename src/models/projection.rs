use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionStatus {
    Safe,
    Danger,
    Neutral,
}

impl ProjectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionStatus::Safe => "safe",
            ProjectionStatus::Danger => "danger",
            ProjectionStatus::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived view of a subject's attendance. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceProjection {
    pub attended: u32,
    pub total: u32,
    pub percentage: u32,
    /// Goal actually used after defaulting and clamping.
    pub goal: u32,
    pub status: ProjectionStatus,
    pub classes_needed: u32,
    pub can_bunk: u32,
    /// False only when the goal is 100 and an absence is already on record.
    pub goal_reachable: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub subjects: u32,
    pub safe: u32,
    pub danger: u32,
    pub neutral: u32,
    pub projection: AttendanceProjection,
}
