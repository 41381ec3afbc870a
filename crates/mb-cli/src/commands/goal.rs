use mb_db::repos::goal::NewGoal;
use mb_db::updates::goal::GoalUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GoalCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb goal`.
pub async fn handle(action: &GoalCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let actor = &ctx.actor;
    match action {
        GoalCommands::Create {
            student_id,
            mentor_id,
            title,
            description,
            end_date,
        } => {
            let new = NewGoal {
                student_id: student_id.clone(),
                mentor_id: mentor_id.clone(),
                title: title.clone(),
                description: description.clone(),
                end_date: *end_date,
            };
            output(&svc.create_goal(actor, new).await?, flags.format)
        }
        GoalCommands::Get { id } => output(&svc.get_goal(id).await?, flags.format),
        GoalCommands::List { student_id } => {
            output(&svc.list_goals_for_student(student_id).await?, flags.format)
        }
        GoalCommands::Update {
            id,
            title,
            description,
            end_date,
            mentor_id,
        } => {
            let mut builder = GoalUpdateBuilder::new();
            if let Some(title) = title {
                builder = builder.title(title.as_str());
            }
            if let Some(description) = description {
                builder = builder.description(Some(description.clone()));
            }
            if let Some(end_date) = end_date {
                builder = builder.end_date(Some(*end_date));
            }
            if let Some(mentor_id) = mentor_id {
                builder = builder.mentor_id(Some(mentor_id.clone()));
            }
            output(&svc.update_goal(actor, id, builder.build()).await?, flags.format)
        }
        GoalCommands::Achieve { id, undo } => {
            output(&svc.set_goal_achieved(actor, id, !undo).await?, flags.format)
        }
        GoalCommands::Delete { id } => {
            svc.delete_goal(actor, id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
