use mb_core::entities::{MentorProfileUpdate, NewMentor};
use mb_core::enums::SortDirection;
use mb_core::values::Email;
use mb_db::query::{ArchiveFilter, MentorSort, PageRequest};
use mb_db::repos::mentor::MentorFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::MentorCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb mentor`.
pub async fn handle(action: &MentorCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let actor = &ctx.actor;
    match action {
        MentorCommands::Create {
            chapter_id,
            email,
            first_name,
            last_name,
            preferred_name,
            mobile,
            date_of_birth,
        } => {
            let new = NewMentor {
                chapter_id: chapter_id.clone(),
                email: Email::parse(email)?,
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                preferred_name: preferred_name.clone(),
                mobile: mobile.clone(),
                date_of_birth: *date_of_birth,
                address: None,
                emergency_contact: None,
                next_of_kin: None,
            };
            output(&svc.create_mentor(actor, new).await?, flags.format)
        }
        MentorCommands::Get { id, email } => {
            let mentor = match (id, email) {
                (Some(id), _) => svc.get_mentor(id).await?,
                (None, Some(email)) => svc.get_mentor_by_email(&Email::parse(email)?).await?,
                (None, None) => anyhow::bail!("pass a mentor ID or --email"),
            };
            output(&mentor, flags.format)
        }
        MentorCommands::List {
            chapter_id,
            search,
            archive,
            sort,
            desc,
            page,
        } => {
            let filter = MentorFilter {
                chapter_id: chapter_id.clone(),
                search: search.clone(),
                archive: parse_enum::<ArchiveFilter>(archive, "archive")?,
                sort: parse_enum::<MentorSort>(sort, "sort")?,
                direction: if *desc { SortDirection::Desc } else { SortDirection::Asc },
            };
            let page_size = effective_limit(None, flags.limit, ctx.config.general.default_page_size);
            let mentors = svc.list_mentors(&filter, PageRequest::new(page.saturating_sub(1), page_size)).await?;
            output(&mentors, flags.format)
        }
        MentorCommands::Update {
            id,
            first_name,
            last_name,
            preferred_name,
            mobile,
            date_of_birth,
        } => {
            let update = MentorProfileUpdate {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                preferred_name: preferred_name.clone().map(Some),
                mobile: mobile.clone().map(Some),
                date_of_birth: date_of_birth.map(Some),
                ..MentorProfileUpdate::default()
            };
            output(&svc.update_mentor(actor, id, update).await?, flags.format)
        }
        MentorCommands::Email { id, email } => {
            let mentor = svc.change_mentor_email(actor, id, Email::parse(email)?).await?;
            output(&mentor, flags.format)
        }
        MentorCommands::Link { id, subject } => {
            output(&svc.link_mentor_identity(actor, id, subject).await?, flags.format)
        }
        MentorCommands::Unlink { id } => {
            output(&svc.unlink_mentor_identity(actor, id).await?, flags.format)
        }
        MentorCommands::Archive { id, reason } => {
            output(&svc.archive_mentor(actor, id, reason).await?, flags.format)
        }
        MentorCommands::Unarchive { id } => output(&svc.unarchive_mentor(actor, id).await?, flags.format),
        MentorCommands::Move { id, chapter_id } => {
            output(&svc.move_mentor(actor, id, chapter_id).await?, flags.format)
        }
        MentorCommands::Students { id } => {
            output(&svc.list_students_for_mentor(id).await?, flags.format)
        }
    }
}
