use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AssignArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb assign`.
pub async fn handle_assign(args: &AssignArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let assignment = ctx
        .service
        .assign_student(&ctx.actor, &args.mentor_id, &args.student_id)
        .await?;
    output(&assignment, flags.format)
}

/// Handle `mb unassign`.
pub async fn handle_unassign(args: &AssignArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service
        .unassign_student(&ctx.actor, &args.mentor_id, &args.student_id)
        .await?;
    output(
        &json!({ "mentor_id": args.mentor_id, "student_id": args.student_id, "assigned": false }),
        flags.format,
    )
}
