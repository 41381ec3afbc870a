use std::path::Path;

use anyhow::Context;
use mb_config::MentorbaseConfig;
use mb_core::access::Actor;
use mb_db::service::ProgramService;

use crate::cli::{GlobalFlags, RoleArg};

/// Operator ID used when `--actor` is omitted for staff roles.
const DEFAULT_OPERATOR: &str = "cli-operator";

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ProgramService,
    pub config: MentorbaseConfig,
    pub actor: Actor,
}

impl AppContext {
    /// Open the configured database and resolve the acting user.
    pub async fn init(config: MentorbaseConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let actor = build_actor(flags)?;
        let service = ProgramService::new_local(&config.database.path)
            .await
            .with_context(|| format!("failed to open database '{}'", config.database.path))?;
        tracing::debug!(actor = %actor.id, role = %actor.role, db = %config.database.path, "context ready");
        Ok(Self {
            service,
            config,
            actor,
        })
    }
}

/// Load layered config, or the file named by `--config`, then apply `--db`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<MentorbaseConfig> {
    let mut config = match flags.config.as_deref() {
        Some(path) => MentorbaseConfig::load_from(Path::new(path))
            .with_context(|| format!("failed to load config from {path}"))?,
        None => MentorbaseConfig::load_with_dotenv().context("failed to load config")?,
    };
    if let Some(db) = &flags.db {
        config.database.path.clone_from(db);
    }
    Ok(config)
}

/// Build the acting user from `--role`, `--actor`, and `--chapter`.
pub fn build_actor(flags: &GlobalFlags) -> anyhow::Result<Actor> {
    let operator = || flags.actor.clone().unwrap_or_else(|| DEFAULT_OPERATOR.to_string());
    match flags.role {
        RoleArg::Admin => Ok(Actor::admin(operator())),
        RoleArg::Coordinator => {
            if flags.chapters.is_empty() {
                anyhow::bail!("--role coordinator needs at least one --chapter");
            }
            Ok(Actor::coordinator(operator(), flags.chapters.clone()))
        }
        RoleArg::Mentor => {
            let mentor_id = flags
                .actor
                .clone()
                .context("--role mentor needs --actor <mentor id>")?;
            Ok(Actor::mentor(mentor_id))
        }
    }
}
