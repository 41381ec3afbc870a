use clap::ValueEnum;
use mb_core::enums::Role;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// Role the operator acts as.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Coordinator,
    Mentor,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Self::Admin,
            RoleArg::Coordinator => Self::ChapterCoordinator,
            RoleArg::Mentor => Self::Mentor,
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub quiet: bool,
    pub verbose: bool,
    pub config: Option<String>,
    pub db: Option<String>,
    pub actor: Option<String>,
    pub role: RoleArg,
    pub chapters: Vec<String>,
}
