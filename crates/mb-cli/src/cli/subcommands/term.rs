use chrono::NaiveDate;
use clap::Subcommand;

/// School term commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TermCommands {
    /// Create a term.
    Create {
        #[arg(long)]
        label: String,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
    /// List terms.
    List {
        #[arg(long)]
        year: Option<i32>,
    },
    /// The term in progress, or the next one.
    Current {
        #[arg(long)]
        on: Option<NaiveDate>,
    },
    /// Delete a term.
    Delete { id: String },
}
