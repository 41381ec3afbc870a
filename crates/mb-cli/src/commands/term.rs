use anyhow::Context;
use chrono::NaiveDate;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TermCommands;
use crate::commands::shared::date::on_or_today;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb term`.
pub async fn handle(action: &TermCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        TermCommands::Create { label, start, end } => {
            output(&svc.create_term(&ctx.actor, label, *start, *end).await?, flags.format)
        }
        TermCommands::List { year } => output(&svc.list_terms(*year).await?, flags.format),
        TermCommands::Current { on } => {
            output(&svc.current_term(on_or_today(*on)).await?, flags.format)
        }
        TermCommands::Delete { id } => {
            svc.delete_term(&ctx.actor, id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}

/// The given term ID, or the term current on `today`.
pub async fn resolve_term_id(ctx: &AppContext, term: Option<&str>, today: NaiveDate) -> anyhow::Result<String> {
    if let Some(id) = term {
        return Ok(id.to_string());
    }
    let current = ctx
        .service
        .current_term(today)
        .await?
        .with_context(|| format!("no current or upcoming term on {today}; pass --term"))?;
    Ok(current.id)
}
