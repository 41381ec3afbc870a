use clap::{Args, Subcommand};

/// Postal address flags shared by chapter commands.
#[derive(Clone, Debug, Default, Args)]
pub struct AddressArgs {
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub suburb: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub postcode: Option<String>,
}

/// Chapter commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ChapterCommands {
    /// Create a chapter.
    Create {
        name: String,
        #[command(flatten)]
        address: AddressArgs,
    },
    /// Get a chapter by ID or name.
    Get {
        #[arg(required_unless_present = "name")]
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        name: Option<String>,
    },
    /// List chapters.
    List,
    /// Rename or relocate a chapter.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        address: AddressArgs,
        /// Remove the chapter address.
        #[arg(long, conflicts_with_all = ["street", "suburb", "state", "postcode"])]
        clear_address: bool,
    },
    /// Delete a chapter with no mentors or students.
    Delete { id: String },
}
