use chrono::NaiveDate;
use clap::Subcommand;

/// Reminder commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RemindCommands {
    /// Email mentors whose session reports are overdue.
    Reports {
        /// Days after the session before a report is overdue.
        #[arg(long)]
        days: Option<i64>,
        #[arg(long)]
        on: Option<NaiveDate>,
        /// List what would be sent without sending.
        #[arg(long)]
        dry_run: bool,
    },
}
