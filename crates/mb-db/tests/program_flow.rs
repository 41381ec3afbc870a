//! End-to-end flows across repositories:
//! - a term of rostered sessions from booking through sign-off
//! - persistence across reopening a file database
//! - role checks on the report workflow

use chrono::{NaiveDate, Weekday};
use rstest::rstest;
use tempfile::TempDir;

use mb_core::access::Actor;
use mb_core::entities::{MentorImportRow, NewStudent};
use mb_core::enums::{AuditAction, EntityType, ReportStatus};
use mb_db::error::DatabaseError;
use mb_db::query::{ArchiveFilter, PageRequest};
use mb_db::repos::audit::AuditFilter;
use mb_db::repos::mentor::MentorFilter;
use mb_db::service::ProgramService;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn admin() -> Actor {
    Actor::admin("ops-admin")
}

fn mentor_row(email: &str, last_name: &str) -> MentorImportRow {
    serde_json::from_value(serde_json::json!({
        "chapter": "Carlton",
        "email": email,
        "first_name": "Sam",
        "last_name": last_name,
    }))
    .unwrap()
}

fn new_student(chapter_id: &str, last_name: &str) -> NewStudent {
    serde_json::from_value(serde_json::json!({
        "chapter_id": chapter_id,
        "first_name": "Ari",
        "last_name": last_name,
        "year_level": 4,
    }))
    .unwrap()
}

#[tokio::test]
async fn term_roster_to_sign_off() {
    let svc = ProgramService::new_local(":memory:").await.unwrap();
    let chapter = svc.create_chapter(&admin(), "Carlton", None).await.unwrap();
    let coordinator = Actor::coordinator("ops-coord", vec![chapter.id().to_string()]);

    let report = svc
        .import_mentors(
            &coordinator,
            vec![mentor_row("a@example.org", "Adams"), mentor_row("b@example.org", "Brown")],
        )
        .await
        .unwrap();
    assert_eq!(report.imported, 2);
    let mentors = svc
        .list_mentors(
            &MentorFilter {
                chapter_id: Some(chapter.id().to_string()),
                archive: ArchiveFilter::Active,
                ..MentorFilter::default()
            },
            PageRequest::new(1, 10),
        )
        .await
        .unwrap();
    assert_eq!(mentors.total, 2);
    let adams = &mentors.items[0];

    let student = svc
        .create_student(&coordinator, new_student(chapter.id(), "Tran"))
        .await
        .unwrap();
    svc.assign_student(&coordinator, adams.id(), student.id()).await.unwrap();

    let term = svc
        .create_term(&admin(), "Term 1", date(2026, 1, 27), date(2026, 4, 2))
        .await
        .unwrap();
    let mentor_actor = Actor::mentor(adams.id());
    let (_, booking) = svc
        .book_session(&mentor_actor, chapter.id(), adams.id(), student.id(), date(2026, 2, 7))
        .await
        .unwrap();

    let roster = svc.roster(chapter.id(), &term.id, Weekday::Sat).await.unwrap();
    let booked_day = roster.iter().find(|d| d.date == date(2026, 2, 7)).unwrap();
    assert_eq!(booked_day.sessions[0].students[0].student_name, "Ari Tran");

    svc.save_report(&mentor_actor, &booking.id, "Practised reading aloud")
        .await
        .unwrap();
    svc.submit_report(&mentor_actor, &booking.id).await.unwrap();
    assert_eq!(
        svc.list_reports_awaiting_sign_off(chapter.id()).await.unwrap().len(),
        1
    );
    let signed = svc
        .sign_off_report(&coordinator, &booking.id, None)
        .await
        .unwrap();
    assert_eq!(signed.status, ReportStatus::SignedOff);

    let attendance = svc
        .attendance_for_student(student.id(), Some(&term.id), date(2026, 3, 1))
        .await
        .unwrap();
    assert_eq!(attendance.counts.attended, 1);

    let trail = svc
        .query_audit(&AuditFilter {
            entity_type: Some(EntityType::StudentSession),
            entity_id: Some(booking.id.clone()),
            ..AuditFilter::default()
        })
        .await
        .unwrap();
    let actions: Vec<AuditAction> = trail.iter().map(|e| e.action).collect();
    assert!(actions.contains(&AuditAction::Created));
    assert_eq!(
        actions.iter().filter(|a| **a == AuditAction::StatusChanged).count(),
        2
    );
}

#[tokio::test]
async fn data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mentorbase.db");
    let path = path.to_str().unwrap();

    let chapter_id = {
        let svc = ProgramService::new_local(path).await.unwrap();
        let chapter = svc.create_chapter(&admin(), "Footscray", None).await.unwrap();
        svc.create_student(&admin(), new_student(chapter.id(), "Lee"))
            .await
            .unwrap();
        chapter.id().to_string()
    };

    let svc = ProgramService::new_local(path).await.unwrap();
    assert_eq!(svc.get_chapter(&chapter_id).await.unwrap().name(), "Footscray");
    assert_eq!(svc.export_students(Some(&chapter_id)).await.unwrap().len(), 1);
}

#[rstest]
#[case::admin(Actor::admin("ops-admin"), true)]
#[case::own_coordinator(Actor::coordinator("ops-2", vec!["CHAPTER".into()]), true)]
#[case::other_coordinator(Actor::coordinator("ops-3", vec!["chp-elsewhere".into()]), false)]
#[case::mentor(Actor::mentor("MENTOR"), false)]
#[tokio::test]
async fn who_may_sign_off(#[case] actor: Actor, #[case] allowed: bool) {
    let svc = ProgramService::new_local(":memory:").await.unwrap();
    let chapter = svc.create_chapter(&admin(), "Carlton", None).await.unwrap();
    let report = svc
        .import_mentors(&admin(), vec![mentor_row("a@example.org", "Adams")])
        .await
        .unwrap();
    let mentor_id = report.outcomes[0].entity_id.clone().unwrap();
    let student = svc
        .create_student(&admin(), new_student(chapter.id(), "Tran"))
        .await
        .unwrap();
    let (_, booking) = svc
        .book_session(&admin(), chapter.id(), &mentor_id, student.id(), date(2026, 2, 7))
        .await
        .unwrap();
    svc.save_report(&admin(), &booking.id, "Notes").await.unwrap();
    svc.submit_report(&admin(), &booking.id).await.unwrap();

    // Placeholders in the cases stand for IDs only known at runtime.
    let actor = Actor {
        id: actor.id.replace("MENTOR", &mentor_id),
        chapter_ids: actor
            .chapter_ids
            .iter()
            .map(|c| c.replace("CHAPTER", chapter.id()))
            .collect(),
        ..actor
    };
    let result = svc.sign_off_report(&actor, &booking.id, None).await;
    assert_eq!(result.is_ok(), allowed);
    if let Err(e) = result {
        assert!(matches!(e, DatabaseError::Core(_)) && e.is_forbidden());
    }
}
