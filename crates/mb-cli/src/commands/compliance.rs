use mb_db::repos::compliance::{CheckInput, NewReference};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{CheckArgs, ComplianceCommands, ReferenceCommands};
use crate::commands::shared::date::on_or_today;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb compliance`.
pub async fn handle(action: &ComplianceCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let actor = &ctx.actor;
    match action {
        ComplianceCommands::Reference { action } => handle_reference(action, ctx, flags).await,
        ComplianceCommands::Police(args) => {
            let check = svc.upsert_police_check(actor, &args.mentor_id, check_input(args)).await?;
            output(&check, flags.format)
        }
        ComplianceCommands::Wwc(args) => {
            let check = svc.upsert_wwc_check(actor, &args.mentor_id, check_input(args)).await?;
            output(&check, flags.format)
        }
        ComplianceCommands::Induction {
            mentor_id,
            on,
            run_by,
            comment,
        } => {
            let induction = svc
                .record_induction(actor, mentor_id, *on, run_by, comment.as_deref())
                .await?;
            output(&induction, flags.format)
        }
        ComplianceCommands::Approval {
            mentor_id,
            on,
            comment,
        } => {
            let approval = svc
                .record_mrc_approval(actor, mentor_id, *on, comment.as_deref())
                .await?;
            output(&approval, flags.format)
        }
        ComplianceCommands::Status { mentor_id, on } => {
            let summary = svc
                .compliance_summary(
                    mentor_id,
                    on_or_today(*on),
                    ctx.config.general.compliance_warning_days,
                )
                .await?;
            output(&summary, flags.format)
        }
        ComplianceCommands::Expiring {
            chapter_id,
            on,
            days,
        } => {
            let days = days.unwrap_or(ctx.config.general.compliance_warning_days);
            let checks = svc
                .list_expiring_checks(chapter_id.as_deref(), on_or_today(*on), days)
                .await?;
            output(&checks, flags.format)
        }
    }
}

async fn handle_reference(
    action: &ReferenceCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        ReferenceCommands::Add {
            mentor_id,
            first_name,
            last_name,
            mobile,
            email,
            relationship,
        } => {
            let new = NewReference {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                mobile: mobile.clone(),
                email: email.clone(),
                relationship: relationship.clone(),
            };
            output(&svc.add_reference(&ctx.actor, mentor_id, new).await?, flags.format)
        }
        ReferenceCommands::Call {
            id,
            on,
            recommended,
            outcome,
        } => {
            let reference = svc
                .record_reference_call(&ctx.actor, id, *on, *recommended, outcome.as_deref())
                .await?;
            output(&reference, flags.format)
        }
        ReferenceCommands::List { mentor_id } => {
            output(&svc.list_references(mentor_id).await?, flags.format)
        }
    }
}

fn check_input(args: &CheckArgs) -> CheckInput {
    CheckInput {
        reference_number: args.reference_number.clone(),
        expiry_date: args.expiry,
        file_path: args.file.clone(),
    }
}
