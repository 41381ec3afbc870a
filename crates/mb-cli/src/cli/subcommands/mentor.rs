use chrono::NaiveDate;
use clap::Subcommand;

/// Mentor commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MentorCommands {
    /// Register a mentor.
    Create {
        #[arg(long)]
        chapter_id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        preferred_name: Option<String>,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,
    },
    /// Get a mentor by ID or email.
    Get {
        #[arg(required_unless_present = "email")]
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        email: Option<String>,
    },
    /// List mentors.
    List {
        #[arg(long)]
        chapter_id: Option<String>,
        /// Match name or email.
        #[arg(long)]
        search: Option<String>,
        /// active, archived, or all
        #[arg(long, default_value = "active")]
        archive: String,
        /// last_name, first_name, email, or created_at
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
        mobile: Option<String>,
        #[arg(long)]
        date_of_birth: Option<NaiveDate>,
    },
    /// Change the login email.
    Email { id: String, email: String },
    /// Link an identity-provider subject.
    Link { id: String, subject: String },
    /// Remove the identity-provider link.
    Unlink { id: String },
    /// Archive (end) a mentor.
    Archive {
        id: String,
        #[arg(long)]
        reason: String,
    },
    /// Reinstate an archived mentor.
    Unarchive { id: String },
    /// Move a mentor to another chapter.
    Move { id: String, chapter_id: String },
    /// Students assigned to a mentor.
    Students { id: String },
}
