use clap::{ArgGroup, Subcommand};

/// Report workflow commands. Each takes a student-session ID.
#[derive(Clone, Debug, Subcommand)]
pub enum ReportCommands {
    /// Save report text.
    #[command(group(ArgGroup::new("body").required(true).args(["text", "file"])))]
    Save {
        id: String,
        #[arg(long)]
        text: Option<String>,
        /// Read the report from a file.
        #[arg(long)]
        file: Option<String>,
    },
    /// Mark the report complete.
    Submit { id: String },
    /// Return a completed report to draft.
    Reopen { id: String },
    /// Sign off a completed report.
    SignOff {
        id: String,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Revoke a sign-off.
    Revoke { id: String },
    /// Cancel the booking.
    Cancel {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Restore a cancelled booking.
    Restore { id: String },
    /// Reports waiting for sign-off in a chapter.
    Pending {
        #[arg(long)]
        chapter_id: String,
    },
}
