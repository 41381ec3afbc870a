use mb_core::entities::{NewStudent, StudentProfileUpdate};
use mb_core::enums::SortDirection;
use mb_db::query::{ArchiveFilter, PageRequest, StudentSort};
use mb_db::repos::student::StudentFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::StudentCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `mb student`.
pub async fn handle(action: &StudentCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    let actor = &ctx.actor;
    match action {
        StudentCommands::Create {
            chapter_id,
            first_name,
            last_name,
            preferred_name,
            date_of_birth,
            year_level,
            school_name,
            allergies,
            photo_consent,
        } => {
            let new = NewStudent {
                chapter_id: chapter_id.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                preferred_name: preferred_name.clone(),
                date_of_birth: *date_of_birth,
                year_level: *year_level,
                school_name: school_name.clone(),
                address: None,
                allergies: allergies.clone(),
                emergency_contact: None,
                photo_consent: *photo_consent,
            };
            output(&svc.create_student(actor, new).await?, flags.format)
        }
        StudentCommands::Get { id } => output(&svc.get_student(id).await?, flags.format),
        StudentCommands::List {
            chapter_id,
            search,
            year_level,
            archive,
            sort,
            desc,
            page,
        } => {
            let filter = StudentFilter {
                chapter_id: chapter_id.clone(),
                search: search.clone(),
                year_level: *year_level,
                archive: parse_enum::<ArchiveFilter>(archive, "archive")?,
                sort: parse_enum::<StudentSort>(sort, "sort")?,
                direction: if *desc { SortDirection::Desc } else { SortDirection::Asc },
            };
            let page_size = effective_limit(None, flags.limit, ctx.config.general.default_page_size);
            let students = svc.list_students(&filter, PageRequest::new(page.saturating_sub(1), page_size)).await?;
            output(&students, flags.format)
        }
        StudentCommands::Update {
            id,
            first_name,
            last_name,
            preferred_name,
            date_of_birth,
            year_level,
            school_name,
            allergies,
            photo_consent,
        } => {
            let update = StudentProfileUpdate {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                preferred_name: preferred_name.clone().map(Some),
                date_of_birth: date_of_birth.map(Some),
                year_level: year_level.map(Some),
                school_name: school_name.clone().map(Some),
                allergies: allergies.clone().map(Some),
                photo_consent: *photo_consent,
                ..StudentProfileUpdate::default()
            };
            output(&svc.update_student(actor, id, update).await?, flags.format)
        }
        StudentCommands::Archive { id, reason } => {
            output(&svc.archive_student(actor, id, reason).await?, flags.format)
        }
        StudentCommands::Unarchive { id } => {
            output(&svc.unarchive_student(actor, id).await?, flags.format)
        }
        StudentCommands::Move { id, chapter_id } => {
            output(&svc.move_student(actor, id, chapter_id).await?, flags.format)
        }
        StudentCommands::Mentors { id } => {
            output(&svc.list_mentors_for_student(id).await?, flags.format)
        }
    }
}
