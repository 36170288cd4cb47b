use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lastminute", version, author, about = "Attendance tracker that tells you how many classes you can miss")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        action: SubjectCommands,
    },
    /// Mark a subject present, absent or no-class for a day
    Mark {
        /// Subject name
        subject: String,
        /// present, absent or no-class
        status: String,
        /// Day to mark (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove the mark for a day
    Unmark {
        /// Subject name
        subject: String,
        /// Day to clear (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Show attendance projections
    Status {
        /// Only this subject
        subject: Option<String>,
    },
    /// Show a day-by-day calendar for a subject
    History {
        /// Subject name
        subject: String,
        /// First day (YYYY-MM-DD), defaults to semester start or two weeks back
        #[arg(long)]
        from: Option<String>,
        /// Last day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,
    },
    /// Show overall statistics
    Stats {
        /// Show a grid for the last 7 days
        #[arg(long)]
        week: bool,
    },
    /// Print every subject with history and projection as JSON
    Export,
    /// Load subjects and history from a JSON file
    Import {
        /// Path to a JSON array of subjects
        file: PathBuf,
    },
    /// Show or update configuration
    Config {
        /// Goal used for new subjects and the overall figure
        #[arg(long)]
        default_goal: Option<i64>,
        /// First day of term (YYYY-MM-DD)
        #[arg(long)]
        semester_start: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubjectCommands {
    /// Add a subject
    Add {
        /// Subject name
        name: String,
        /// Target attendance percentage (1-100), defaults to the configured goal
        #[arg(long)]
        goal: Option<i64>,
    },
    /// List subjects
    List,
    /// Remove a subject and its history
    Remove {
        /// Subject name
        name: String,
    },
    /// Change a subject's goal
    Goal {
        /// Subject name
        name: String,
        /// Target attendance percentage (1-100)
        goal: i64,
    },
    /// Rename a subject
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },
}
