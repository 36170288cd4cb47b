pub mod projection;
pub mod record;
pub mod stats;
pub mod subject;

pub use projection::{AttendanceProjection, OverallSummary, ProjectionStatus};
pub use record::{AttendanceRecord, AttendanceStatus, DayStatus};
pub use stats::DailyStats;
pub use subject::{Subject, SubjectAttendance};
