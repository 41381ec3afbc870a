//! Shared test utilities for mb-db unit tests.

pub(crate) mod helpers {
    use chrono::NaiveDate;
    use mb_core::access::Actor;
    use mb_core::entities::{Chapter, Mentor, NewMentor, NewStudent, Student};
    use mb_core::values::Email;

    use crate::service::ProgramService;

    /// Create an in-memory service.
    pub async fn test_service() -> ProgramService {
        ProgramService::new_local(":memory:").await.unwrap()
    }

    pub fn admin() -> Actor {
        Actor::admin("ops-admin")
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub async fn chapter(svc: &ProgramService, name: &str) -> Chapter {
        svc.create_chapter(&admin(), name, None).await.unwrap()
    }

    pub fn new_mentor(chapter_id: &str, email: &str) -> NewMentor {
        NewMentor {
            chapter_id: chapter_id.into(),
            email: Email::parse(email).unwrap(),
            first_name: "Jo".into(),
            last_name: "Bloggs".into(),
            preferred_name: None,
            mobile: None,
            date_of_birth: None,
            address: None,
            emergency_contact: None,
            next_of_kin: None,
        }
    }

    pub async fn mentor(svc: &ProgramService, chapter_id: &str, email: &str) -> Mentor {
        svc.create_mentor(&admin(), new_mentor(chapter_id, email))
            .await
            .unwrap()
    }

    pub fn new_student(chapter_id: &str, last_name: &str) -> NewStudent {
        NewStudent {
            chapter_id: chapter_id.into(),
            first_name: "Mia".into(),
            last_name: last_name.into(),
            preferred_name: None,
            date_of_birth: None,
            year_level: Some(5),
            school_name: None,
            address: None,
            allergies: None,
            emergency_contact: None,
            photo_consent: false,
        }
    }

    pub async fn student(svc: &ProgramService, chapter_id: &str, last_name: &str) -> Student {
        svc.create_student(&admin(), new_student(chapter_id, last_name))
            .await
            .unwrap()
    }
}
