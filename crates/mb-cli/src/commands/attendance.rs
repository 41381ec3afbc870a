use crate::cli::GlobalFlags;
use crate::cli::root_commands::AttendanceArgs;
use crate::commands::shared::date::on_or_today;
use crate::commands::term::resolve_term_id;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb attendance`.
pub async fn handle(args: &AttendanceArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let today = on_or_today(args.on);
    if let Some(student_id) = &args.student_id {
        let attendance = ctx
            .service
            .attendance_for_student(student_id, args.term.as_deref(), today)
            .await?;
        return output(&attendance, flags.format);
    }
    let Some(chapter_id) = &args.chapter_id else {
        anyhow::bail!("pass --student-id or --chapter-id");
    };
    let term_id = resolve_term_id(ctx, args.term.as_deref(), today).await?;
    let rows = ctx
        .service
        .attendance_for_chapter(chapter_id, &term_id, today)
        .await?;
    output(&rows, flags.format)
}
