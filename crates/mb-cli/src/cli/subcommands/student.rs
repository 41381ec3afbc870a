use chrono::NaiveDate;
use clap::Subcommand;

/// Student commands.
#[derive(Clone, Debug, Subcommand)]
pub enum StudentCommands {
    /// Enrol a student.
    Create {
        #[arg(long)]
        chapter_id: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        preferred_name: Option<String>,
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,
        #[arg(long)]
        year_level: Option<u8>,
        #[arg(long)]
        school_name: Option<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long)]
        photo_consent: bool,
    },
    /// Get a student by ID.
    Get { id: String },
    /// List students.
    List {
        #[arg(long)]
        chapter_id: Option<String>,
        /// Match first, last, or preferred name.
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        year_level: Option<u8>,
        /// active, archived, or all
        #[arg(long, default_value = "active")]
        archive: String,
        /// last_name, first_name, year_level, or created_at
        #[arg(long, default_value = "last_name")]
        sort: String,
        #[arg(long)]
        desc: bool,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Update profile fields.
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        preferred_name: Option<String>,
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,
        #[arg(long)]
        year_level: Option<u8>,
        #[arg(long)]
        school_name: Option<String>,
        #[arg(long)]
        allergies: Option<String>,
        #[arg(long)]
        photo_consent: Option<bool>,
    },
    /// Archive (withdraw) a student.
    Archive {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Re-enrol an archived student.
    Unarchive { id: String },
    /// Move a student to another chapter.
    Move { id: String, chapter_id: String },
    /// Mentors assigned to a student.
    Mentors { id: String },
}
