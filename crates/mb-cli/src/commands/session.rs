use anyhow::Context;
use chrono::Weekday;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SessionCommands;
use crate::commands::shared::date::today;
use crate::commands::term::resolve_term_id;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb session`.
pub async fn handle(action: &SessionCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        SessionCommands::Book {
            chapter_id,
            mentor_id,
            student_id,
            on,
        } => {
            let (session, booking) = svc
                .book_session(&ctx.actor, chapter_id, mentor_id, student_id, *on)
                .await?;
            output(&json!({ "session": session, "booking": booking }), flags.format)
        }
        SessionCommands::Remove { student_session_id } => {
            let session_deleted = svc
                .remove_student_from_session(&ctx.actor, student_session_id)
                .await?;
            output(
                &json!({ "removed": student_session_id, "session_deleted": session_deleted }),
                flags.format,
            )
        }
        SessionCommands::Get { student_session_id } => {
            let booking = svc.get_student_session(student_session_id).await?;
            let session = svc.get_session(&booking.session_id).await?;
            output(&json!({ "session": session, "booking": booking }), flags.format)
        }
        SessionCommands::List { chapter_id, from, to } => {
            if from > to {
                anyhow::bail!("--from {from} is after --to {to}");
            }
            output(&svc.list_sessions(chapter_id, *from, *to).await?, flags.format)
        }
        SessionCommands::Roster {
            chapter_id,
            term,
            weekday,
        } => {
            let term_id = resolve_term_id(ctx, term.as_deref(), today()).await?;
            let weekday = match weekday {
                Some(raw) => parse_weekday(raw)?,
                None => ctx.config.general.weekday()?,
            };
            output(&svc.roster(chapter_id, &term_id, weekday).await?, flags.format)
        }
    }
}

fn parse_weekday(raw: &str) -> anyhow::Result<Weekday> {
    raw.trim()
        .parse::<Weekday>()
        .ok()
        .with_context(|| format!("invalid weekday '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::parse_weekday;
    use chrono::Weekday;

    #[test]
    fn weekday_names() {
        assert_eq!(parse_weekday("saturday").unwrap(), Weekday::Sat);
        assert_eq!(parse_weekday(" Wed ").unwrap(), Weekday::Wed);
        assert!(parse_weekday("funday").is_err());
    }
}
