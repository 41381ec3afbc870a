use std::path::Path;

use anyhow::Context;
use mb_core::entities::{MentorImportRow, StudentImportRow};
use mb_db::repos::transfer::{read_jsonl, write_jsonl};
use serde::Serialize;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{ExportCommands, ImportCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb import`.
pub async fn handle_import(action: &ImportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = match action {
        ImportCommands::Mentors { file } => {
            let rows: Vec<MentorImportRow> =
                read_jsonl(Path::new(file)).with_context(|| format!("failed to read {file}"))?;
            ctx.service.import_mentors(&ctx.actor, rows).await?
        }
        ImportCommands::Students { file } => {
            let rows: Vec<StudentImportRow> =
                read_jsonl(Path::new(file)).with_context(|| format!("failed to read {file}"))?;
            ctx.service.import_students(&ctx.actor, rows).await?
        }
        ImportCommands::History { batch_id } => {
            return output(&ctx.service.list_import_history(batch_id).await?, flags.format);
        }
    };
    if report.failed > 0 && !flags.quiet {
        eprintln!(
            "{} of {} rows failed; see outcomes or `mb import history {}`",
            report.failed,
            report.imported + report.failed,
            report.batch_id
        );
    }
    output(&report, flags.format)
}

/// Handle `mb export`.
pub async fn handle_export(action: &ExportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ExportCommands::Mentors { chapter_id, out } => {
            let rows = ctx.service.export_mentors(chapter_id.as_deref()).await?;
            emit(&rows, out.as_deref(), flags)
        }
        ExportCommands::Students { chapter_id, out } => {
            let rows = ctx.service.export_students(chapter_id.as_deref()).await?;
            emit(&rows, out.as_deref(), flags)
        }
        ExportCommands::Sessions {
            chapter_id,
            from,
            to,
            out,
        } => {
            let rows = ctx.service.export_sessions(chapter_id, *from, *to).await?;
            emit(&rows, out.as_deref(), flags)
        }
    }
}

/// Write rows to `out` as JSON Lines, or print them.
fn emit<T: Serialize>(rows: &[T], out: Option<&str>, flags: &GlobalFlags) -> anyhow::Result<()> {
    let Some(path) = out else {
        return output(&rows, flags.format);
    };
    write_jsonl(Path::new(path), rows).with_context(|| format!("failed to write {path}"))?;
    tracing::info!(path, rows = rows.len(), "export written");
    output(&json!({ "path": path, "rows": rows.len() }), flags.format)
}
