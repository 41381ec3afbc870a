use chrono::NaiveDate;
use clap::{ArgGroup, Args, Subcommand};

use crate::cli::subcommands::{
    ChapterCommands, ComplianceCommands, EoiCommands, ExportCommands, GoalCommands,
    GuardianCommands, ImportCommands, MentorCommands, RemindCommands, ReportCommands,
    SessionCommands, StudentCommands, TeacherCommands, TermCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Write a starter config and create the database.
    Init(InitArgs),
    /// Chapters.
    Chapter {
        #[command(subcommand)]
        action: ChapterCommands,
    },
    /// Mentors.
    Mentor {
        #[command(subcommand)]
        action: MentorCommands,
    },
    /// Students.
    Student {
        #[command(subcommand)]
        action: StudentCommands,
    },
    /// Assign a student to a mentor.
    Assign(AssignArgs),
    /// Remove a mentor-student assignment.
    Unassign(AssignArgs),
    /// Rostered sessions.
    Session {
        #[command(subcommand)]
        action: SessionCommands,
    },
    /// Session reports and sign-off.
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
    /// Attendance counts for a student or a chapter.
    Attendance(AttendanceArgs),
    /// Student goals.
    Goal {
        #[command(subcommand)]
        action: GoalCommands,
    },
    /// School terms.
    Term {
        #[command(subcommand)]
        action: TermCommands,
    },
    /// Mentor references, checks, induction, and approval.
    Compliance {
        #[command(subcommand)]
        action: ComplianceCommands,
    },
    /// Student guardians.
    Guardian {
        #[command(subcommand)]
        action: GuardianCommands,
    },
    /// Student school teachers.
    Teacher {
        #[command(subcommand)]
        action: TeacherCommands,
    },
    /// Mentor expression-of-interest answers.
    Eoi {
        #[command(subcommand)]
        action: EoiCommands,
    },
    /// Bulk import from JSON Lines files.
    Import {
        #[command(subcommand)]
        action: ImportCommands,
    },
    /// Export records as JSON Lines.
    Export {
        #[command(subcommand)]
        action: ExportCommands,
    },
    /// Send reminders.
    Remind {
        #[command(subcommand)]
        action: RemindCommands,
    },
    /// View audit trail.
    Audit(AuditArgs),
}

/// Arguments for `mb init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing mentorbase.toml.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `mb assign` and `mb unassign`.
#[derive(Clone, Debug, Args)]
pub struct AssignArgs {
    #[arg(long)]
    pub mentor_id: String,
    #[arg(long)]
    pub student_id: String,
}

/// Arguments for `mb attendance`.
#[derive(Clone, Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["student_id", "chapter_id"])))]
pub struct AttendanceArgs {
    #[arg(long)]
    pub student_id: Option<String>,
    #[arg(long)]
    pub chapter_id: Option<String>,
    /// Term to count (defaults to the current term for chapters).
    #[arg(long)]
    pub term: Option<String>,
    /// Date that separates attended from upcoming (defaults to today).
    #[arg(long)]
    pub on: Option<NaiveDate>,
}

/// Arguments for `mb audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub actor_id: Option<String>,
    /// Only entries on or after this date.
    #[arg(long)]
    pub since: Option<NaiveDate>,
}
