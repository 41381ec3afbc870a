//! Mentor expression-of-interest answers, one row per mentor.

use mb_core::access::Actor;
use mb_core::entities::MentorEoi;
use mb_core::enums::{AuditAction, EntityType};
use mb_core::values::non_empty;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::ProgramService;

const SELECT_COLS: &str = "mentor_id, best_time_to_contact, occupation, volunteer_experience, \
     mentoring_level, hobbies, mentoring_subjects, how_did_you_hear, why_mentor, about_me, \
     preferred_frequency, updated_at";

fn clean(eoi: &MentorEoi, mentor_id: &str) -> MentorEoi {
    let tidy = |v: &Option<String>| non_empty(v.as_deref());
    MentorEoi {
        mentor_id: mentor_id.to_string(),
        best_time_to_contact: tidy(&eoi.best_time_to_contact),
        occupation: tidy(&eoi.occupation),
        volunteer_experience: tidy(&eoi.volunteer_experience),
        mentoring_level: tidy(&eoi.mentoring_level),
        hobbies: tidy(&eoi.hobbies),
        mentoring_subjects: tidy(&eoi.mentoring_subjects),
        how_did_you_hear: tidy(&eoi.how_did_you_hear),
        why_mentor: tidy(&eoi.why_mentor),
        about_me: tidy(&eoi.about_me),
        preferred_frequency: tidy(&eoi.preferred_frequency),
        updated_at: eoi.updated_at,
    }
}

impl ProgramService {
    /// Replace a mentor's EOI answers. Mentors may edit their own.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or `NoResult` for an unknown mentor.
    pub async fn upsert_mentor_eoi(
        &self,
        actor: &Actor,
        mentor_id: &str,
        answers: &MentorEoi,
    ) -> Result<MentorEoi, DatabaseError> {
        let mentor = self.get_mentor(mentor_id).await?;
        actor.ensure_mentor_or_chapter(mentor_id, mentor.chapter_id())?;

        let mut eoi = clean(answers, mentor_id);
        let now = Self::now();
        eoi.updated_at = Some(now);
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO mentor_eois ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    mentor_id,
                    eoi.best_time_to_contact.as_deref(),
                    eoi.occupation.as_deref(),
                    eoi.volunteer_experience.as_deref(),
                    eoi.mentoring_level.as_deref(),
                    eoi.hobbies.as_deref(),
                    eoi.mentoring_subjects.as_deref(),
                    eoi.how_did_you_hear.as_deref(),
                    eoi.why_mentor.as_deref(),
                    eoi.about_me.as_deref(),
                    eoi.preferred_frequency.as_deref(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        self.audit(actor, EntityType::Eoi, mentor_id, AuditAction::Updated, None)
            .await?;
        Ok(eoi)
    }

    /// `None` until the mentor has answered.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_mentor_eoi(&self, mentor_id: &str) -> Result<Option<MentorEoi>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM mentor_eois WHERE mentor_id = ?1"),
                [mentor_id],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        Ok(Some(MentorEoi {
            mentor_id: row.get(0)?,
            best_time_to_contact: get_opt_string(&row, 1)?,
            occupation: get_opt_string(&row, 2)?,
            volunteer_experience: get_opt_string(&row, 3)?,
            mentoring_level: get_opt_string(&row, 4)?,
            hobbies: get_opt_string(&row, 5)?,
            mentoring_subjects: get_opt_string(&row, 6)?,
            how_did_you_hear: get_opt_string(&row, 7)?,
            why_mentor: get_opt_string(&row, 8)?,
            about_me: get_opt_string(&row, 9)?,
            preferred_frequency: get_opt_string(&row, 10)?,
            updated_at: Some(parse_datetime(&row.get::<String>(11)?)?),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{chapter, mentor, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn mentor_fills_own_eoi() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let me = Actor::mentor(m.id());
        assert!(svc.get_mentor_eoi(m.id()).await.unwrap().is_none());

        let answers = MentorEoi {
            occupation: Some("Engineer".into()),
            hobbies: Some("   ".into()),
            why_mentor: Some("Give back".into()),
            ..MentorEoi::default()
        };
        let saved = svc.upsert_mentor_eoi(&me, m.id(), &answers).await.unwrap();
        assert!(saved.hobbies.is_none());

        let stored = svc.get_mentor_eoi(m.id()).await.unwrap().unwrap();
        assert_eq!(stored, saved);

        let again = MentorEoi {
            occupation: Some("Teacher".into()),
            ..MentorEoi::default()
        };
        svc.upsert_mentor_eoi(&me, m.id(), &again).await.unwrap();
        let stored = svc.get_mentor_eoi(m.id()).await.unwrap().unwrap();
        assert_eq!(stored.occupation.as_deref(), Some("Teacher"));
        assert!(stored.why_mentor.is_none());
    }

    #[tokio::test]
    async fn other_mentor_refused() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let err = svc
            .upsert_mentor_eoi(&Actor::mentor("mtr-x"), m.id(), &MentorEoi::default())
            .await
            .unwrap_err();
        assert!(err.is_forbidden());
    }
}
