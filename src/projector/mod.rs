pub mod calculator;

pub use calculator::{DEFAULT_GOAL, calendar, day_status, project, summarize};
