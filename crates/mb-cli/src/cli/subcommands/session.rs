use chrono::NaiveDate;
use clap::Subcommand;

/// Rostered session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum SessionCommands {
    /// Book a student with a mentor on a date.
    Book {
        #[arg(long)]
        chapter_id: String,
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        on: NaiveDate,
    },
    /// Remove a booking that has no report yet.
    Remove { student_session_id: String },
    /// Get one booking.
    Get { student_session_id: String },
    /// Sessions in a date range.
    List {
        #[arg(long)]
        chapter_id: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Term roster, one row per session day.
    Roster {
        #[arg(long)]
        chapter_id: String,
        /// Term ID (defaults to the current term).
        #[arg(long)]
        term: Option<String>,
        /// Session weekday (defaults to `general.session_weekday`).
        #[arg(long)]
        weekday: Option<String>,
    },
}
