use clap::Subcommand;

/// Guardian commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GuardianCommands {
    /// Add a guardian to a student.
    Add {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        relationship: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Guardians of a student.
    List {
        #[arg(long)]
        student_id: String,
    },
    /// Remove a guardian.
    Remove { id: String },
}

/// School teacher commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TeacherCommands {
    /// Add a teacher to a student.
    Add {
        #[arg(long)]
        student_id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        school: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Teachers of a student.
    List {
        #[arg(long)]
        student_id: String,
    },
    /// Remove a teacher.
    Remove { id: String },
}

/// Expression-of-interest commands.
#[derive(Clone, Debug, Subcommand)]
pub enum EoiCommands {
    /// Replace a mentor's answers. Omitted answers are cleared.
    Set {
        #[arg(long)]
        mentor_id: String,
        #[arg(long)]
        best_time_to_contact: Option<String>,
        #[arg(long)]
        occupation: Option<String>,
        #[arg(long)]
        volunteer_experience: Option<String>,
        #[arg(long)]
        mentoring_level: Option<String>,
        #[arg(long)]
        hobbies: Option<String>,
        #[arg(long)]
        mentoring_subjects: Option<String>,
        #[arg(long)]
        how_did_you_hear: Option<String>,
        #[arg(long)]
        why_mentor: Option<String>,
        #[arg(long)]
        about_me: Option<String>,
        #[arg(long)]
        preferred_frequency: Option<String>,
    },
    /// Show a mentor's answers.
    Get {
        #[arg(long)]
        mentor_id: String,
    },
}
