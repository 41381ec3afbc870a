use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat, RoleArg};
pub use root_commands::Commands;

/// Top-level CLI parser for the `mb` binary.
#[derive(Debug, Parser)]
#[command(name = "mb", version, about = "mentorbase - mentoring program records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to layered lookup)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Database path, overriding `database.path`
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Acting user ID (a mentor ID when --role mentor)
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Role to act as
    #[arg(long, global = true, default_value = "admin")]
    pub role: RoleArg,

    /// Chapter managed by a coordinator (repeatable)
    #[arg(long = "chapter", global = true)]
    pub chapters: Vec<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
            db: self.db.clone(),
            actor: self.actor.clone(),
            role: self.role,
            chapters: self.chapters.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};

    use super::subcommands::{
        ComplianceCommands, MentorCommands, ReferenceCommands, ReportCommands, SessionCommands,
    };
    use super::{Cli, Commands, GlobalFlags, OutputFormat, RoleArg};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "mb", "--format", "table", "--limit", "10", "--verbose", "term", "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Term { .. }));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["mb", "chapter", "list", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["mb", "--format", "xml", "chapter", "list"]).is_err());
    }

    #[test]
    fn role_defaults_to_admin() {
        let cli = Cli::try_parse_from(["mb", "chapter", "list"]).expect("cli should parse");
        assert_eq!(cli.role, RoleArg::Admin);
        assert!(cli.chapters.is_empty());
    }

    #[test]
    fn coordinator_scope_is_repeatable() {
        let cli = Cli::try_parse_from([
            "mb", "--role", "coordinator", "--actor", "ops-7", "--chapter", "chp-1", "--chapter",
            "chp-2", "report", "pending", "--chapter-id", "chp-1",
        ])
        .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.role, RoleArg::Coordinator);
        assert_eq!(flags.actor.as_deref(), Some("ops-7"));
        assert_eq!(flags.chapters, vec!["chp-1", "chp-2"]);
    }

    #[test]
    fn session_book_parses_dates() {
        let cli = Cli::try_parse_from([
            "mb", "session", "book", "--chapter-id", "chp-1", "--mentor-id", "mtr-1",
            "--student-id", "stu-1", "--on", "2026-02-07",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Session {
                action: SessionCommands::Book { on, .. },
            } => assert_eq!(on, NaiveDate::from_ymd_opt(2026, 2, 7).unwrap()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bad_date_is_rejected() {
        let parsed = Cli::try_parse_from([
            "mb", "session", "book", "--chapter-id", "chp-1", "--mentor-id", "mtr-1",
            "--student-id", "stu-1", "--on", "07/02/2026",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn report_sign_off_uses_kebab_case() {
        let cli = Cli::try_parse_from(["mb", "report", "sign-off", "sts-1", "--feedback", "Great"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Report {
                action: ReportCommands::SignOff { .. }
            }
        ));
    }

    #[test]
    fn compliance_reference_is_nested() {
        let cli = Cli::try_parse_from([
            "mb", "compliance", "reference", "call", "ref-1", "--on", "2026-03-01", "--recommended",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Compliance {
                action:
                    ComplianceCommands::Reference {
                        action: ReferenceCommands::Call { recommended, .. },
                    },
            } => assert!(recommended),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn remind_reports_dry_run() {
        let cli = Cli::try_parse_from(["mb", "remind", "reports", "--dry-run"])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::Remind { .. }));
    }

    #[test]
    fn attendance_needs_student_or_chapter() {
        assert!(Cli::try_parse_from(["mb", "attendance"]).is_err());
        assert!(
            Cli::try_parse_from(["mb", "attendance", "--student-id", "s", "--chapter-id", "c"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["mb", "attendance", "--student-id", "stu-1"]).is_ok());
    }

    #[test]
    fn mentor_get_by_id_or_email() {
        let cli = Cli::try_parse_from(["mb", "mentor", "get", "--email", "jo@example.org"])
            .expect("cli should parse");
        match cli.command {
            Commands::Mentor {
                action: MentorCommands::Get { id, email },
            } => {
                assert!(id.is_none());
                assert_eq!(email.as_deref(), Some("jo@example.org"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["mb", "mentor", "get"]).is_err());
        assert!(Cli::try_parse_from(["mb", "mentor", "get", "mtr-1", "--email", "a@b.org"]).is_err());
    }

    #[test]
    fn chapter_get_by_name() {
        assert!(Cli::try_parse_from(["mb", "chapter", "get", "--name", "Carlton"]).is_ok());
        assert!(Cli::try_parse_from(["mb", "chapter", "get", "chp-1"]).is_ok());
        assert!(Cli::try_parse_from(["mb", "chapter", "get"]).is_err());
    }
}
