use chrono::NaiveDate;
use clap::Subcommand;

/// Student goal commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GoalCommands {
    /// Create a goal.
    Create {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        mentor_id: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// Get a goal by ID.
    Get { id: String },
    /// Goals for a student.
    List {
        #[arg(long)]
        student_id: String,
    },
    /// Update a goal.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long)]
        mentor_id: Option<String>,
    },
    /// Mark a goal achieved.
    Achieve {
        id: String,
        /// Mark not achieved instead.
        #[arg(long)]
        undo: bool,
    },
    /// Delete a goal.
    Delete { id: String },
}
