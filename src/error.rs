use thiserror::Error;

/// Validation failures raised before anything reaches the store or the projector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error("Goal must be between 1 and 100, got {0}")]
    InvalidGoal(i64),

    #[error("Subject name cannot be empty")]
    EmptySubjectName,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Unknown attendance status '{0}'. Use: present, absent, no-class")]
    UnknownStatus(String),

    #[error("Subject '{0}' not found")]
    SubjectNotFound(String),

    #[error("Subject '{0}' already exists")]
    DuplicateSubject(String),
}
