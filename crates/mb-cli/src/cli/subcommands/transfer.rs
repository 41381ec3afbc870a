use chrono::NaiveDate;
use clap::Subcommand;

/// Import commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ImportCommands {
    /// Import mentors from a `.jsonl` file.
    Mentors { file: String },
    /// Import students from a `.jsonl` file.
    Students { file: String },
    /// Row outcomes of an earlier batch.
    History { batch_id: String },
}

/// Export commands. Without `--out` rows go to stdout.
#[derive(Clone, Debug, Subcommand)]
pub enum ExportCommands {
    /// Export mentors.
    Mentors {
        #[arg(long)]
        chapter_id: Option<String>,
        #[arg(long)]
        out: Option<String>,
    },
    /// Export students.
    Students {
        #[arg(long)]
        chapter_id: Option<String>,
        #[arg(long)]
        out: Option<String>,
    },
    /// Export session bookings and reports.
    Sessions {
        #[arg(long)]
        chapter_id: String,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        out: Option<String>,
    },
}
