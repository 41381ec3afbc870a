use mb_core::entities::MentorEoi;
use mb_db::repos::contact::{NewGuardian, NewTeacher};
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{EoiCommands, GuardianCommands, TeacherCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb guardian`.
pub async fn handle_guardian(
    action: &GuardianCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        GuardianCommands::Add {
            student_id,
            name,
            relationship,
            phone,
            email,
            address,
        } => {
            let new = NewGuardian {
                full_name: name.clone(),
                relationship: relationship.clone(),
                phone: phone.clone(),
                email: email.clone(),
                address: address.clone(),
            };
            let guardian = ctx.service.add_guardian(&ctx.actor, student_id, new).await?;
            output(&guardian, flags.format)
        }
        GuardianCommands::List { student_id } => {
            output(&ctx.service.list_guardians(student_id).await?, flags.format)
        }
        GuardianCommands::Remove { id } => {
            ctx.service.remove_guardian(&ctx.actor, id).await?;
            output(&json!({ "removed": id }), flags.format)
        }
    }
}

/// Handle `mb teacher`.
pub async fn handle_teacher(
    action: &TeacherCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TeacherCommands::Add {
            student_id,
            name,
            school,
            email,
            phone,
        } => {
            let new = NewTeacher {
                full_name: name.clone(),
                school_name: school.clone(),
                email: email.clone(),
                phone: phone.clone(),
            };
            let teacher = ctx.service.add_teacher(&ctx.actor, student_id, new).await?;
            output(&teacher, flags.format)
        }
        TeacherCommands::List { student_id } => {
            output(&ctx.service.list_teachers(student_id).await?, flags.format)
        }
        TeacherCommands::Remove { id } => {
            ctx.service.remove_teacher(&ctx.actor, id).await?;
            output(&json!({ "removed": id }), flags.format)
        }
    }
}

/// Handle `mb eoi`.
pub async fn handle_eoi(action: &EoiCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        EoiCommands::Set {
            mentor_id,
            best_time_to_contact,
            occupation,
            volunteer_experience,
            mentoring_level,
            hobbies,
            mentoring_subjects,
            how_did_you_hear,
            why_mentor,
            about_me,
            preferred_frequency,
        } => {
            let answers = MentorEoi {
                mentor_id: mentor_id.clone(),
                best_time_to_contact: best_time_to_contact.clone(),
                occupation: occupation.clone(),
                volunteer_experience: volunteer_experience.clone(),
                mentoring_level: mentoring_level.clone(),
                hobbies: hobbies.clone(),
                mentoring_subjects: mentoring_subjects.clone(),
                how_did_you_hear: how_did_you_hear.clone(),
                why_mentor: why_mentor.clone(),
                about_me: about_me.clone(),
                preferred_frequency: preferred_frequency.clone(),
                updated_at: None,
            };
            let saved = ctx.service.upsert_mentor_eoi(&ctx.actor, mentor_id, &answers).await?;
            output(&saved, flags.format)
        }
        EoiCommands::Get { mentor_id } => {
            let eoi = ctx
                .service
                .get_mentor_eoi(mentor_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("mentor {mentor_id} has no expression of interest"))?;
            output(&eoi, flags.format)
        }
    }
}
