use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Flags for recording a police or WWC check.
#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    #[arg(long)]
    pub mentor_id: String,
    #[arg(long)]
    pub expiry: NaiveDate,
    #[arg(long)]
    pub reference_number: Option<String>,
    /// Path to the scanned certificate.
    #[arg(long)]
    pub file: Option<String>,
}

/// Mentor compliance commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ComplianceCommands {
    /// Referees.
    Reference {
        #[command(subcommand)]
        action: ReferenceCommands,
    },
    /// Record a police check.
    Police(CheckArgs),
    /// Record a working-with-children check.
    Wwc(CheckArgs),
    /// Record a completed induction.
    Induction {
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        on: NaiveDate,
        #[arg(long)]
        run_by: String,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Record mentor review committee approval.
    Approval {
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        on: NaiveDate,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Compliance summary for one mentor.
    Status {
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Checks expired or expiring soon.
    Expiring {
        #[arg(long)]
        chapter_id: Option<String>,
        #[arg(long)]
        on: Option<NaiveDate>,
        /// Warning window (defaults to `general.compliance_warning_days`).
        #[arg(long)]
        days: Option<i64>,
    },
}

/// Referee commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ReferenceCommands {
    /// Add a referee.
    Add {
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        mobile: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        relationship: Option<String>,
    },
    /// Record the outcome of a reference call.
    Call {
        id: String,
        #[arg(long)]
        on: NaiveDate,
        #[arg(long)]
        recommended: bool,
        #[arg(long)]
        outcome: Option<String>,
    },
    /// Referees for a mentor.
    List {
        #[arg(long)]
        mentor_id: String,
    },
}
