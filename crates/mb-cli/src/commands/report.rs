use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReportCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb report`.
pub async fn handle(action: &ReportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let actor = &ctx.actor;
    let booking = match action {
        ReportCommands::Save { id, text, file } => {
            let body = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read report from {path}"))?,
                (None, None) => anyhow::bail!("pass --text or --file"),
            };
            svc.save_report(actor, id, &body).await?
        }
        ReportCommands::Submit { id } => svc.submit_report(actor, id).await?,
        ReportCommands::Reopen { id } => svc.reopen_report(actor, id).await?,
        ReportCommands::SignOff { id, feedback } => {
            svc.sign_off_report(actor, id, feedback.as_deref()).await?
        }
        ReportCommands::Revoke { id } => svc.revoke_sign_off(actor, id).await?,
        ReportCommands::Cancel { id, reason } => svc.cancel_student_session(actor, id, reason).await?,
        ReportCommands::Restore { id } => svc.restore_student_session(actor, id).await?,
        ReportCommands::Pending { chapter_id } => {
            let pending = svc.list_reports_awaiting_sign_off(chapter_id).await?;
            return output(&pending, flags.format);
        }
    };
    output(&booking, flags.format)
}
