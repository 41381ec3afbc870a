//! Overdue report reminders.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use mb_core::access::Actor;
use mb_core::enums::{AuditAction, EntityType, ReportStatus};

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, parse_date};
use crate::service::ProgramService;

/// A draft report whose session is long past, with what a reminder needs.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OverdueReport {
    pub student_session_id: String,
    pub attend_on: NaiveDate,
    pub chapter_id: String,
    pub mentor_id: String,
    pub mentor_name: String,
    pub mentor_email: String,
    pub student_name: String,
    pub days_overdue: i64,
}

impl ProgramService {
    /// Draft reports for sessions at least `days` before `today` that have
    /// not been reminded yet, limited to chapters the actor manages.
    /// Archived mentors are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_overdue_reports(
        &self,
        actor: &Actor,
        today: NaiveDate,
        days: i64,
    ) -> Result<Vec<OverdueReport>, DatabaseError> {
        let cutoff = u64::try_from(days)
            .ok()
            .and_then(|d| today.checked_sub_days(Days::new(d)))
            .unwrap_or(today);
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT ss.id, s.attend_on, s.chapter_id, m.id,
                        COALESCE(m.preferred_name, m.first_name) || ' ' || m.last_name,
                        m.email,
                        COALESCE(st.preferred_name, st.first_name) || ' ' || st.last_name
                 FROM student_sessions ss
                 JOIN sessions s ON s.id = ss.session_id
                 JOIN mentors m ON m.id = s.mentor_id
                 JOIN students st ON st.id = ss.student_id
                 WHERE ss.status = ?1 AND ss.reminder_sent_at IS NULL
                   AND s.attend_on <= ?2 AND m.end_date IS NULL
                 ORDER BY s.attend_on, m.last_name COLLATE NOCASE",
                libsql::params![ReportStatus::Draft.as_str(), fmt_date(cutoff)],
            )
            .await?;
        let mut overdue = Vec::new();
        while let Some(row) = rows.next().await? {
            let chapter_id: String = row.get(2)?;
            if !actor.manages_chapter(&chapter_id) {
                continue;
            }
            let attend_on = parse_date(&row.get::<String>(1)?)?;
            overdue.push(OverdueReport {
                student_session_id: row.get(0)?,
                attend_on,
                chapter_id,
                mentor_id: row.get(3)?,
                mentor_name: row.get(4)?,
                mentor_email: row.get(5)?,
                student_name: row.get(6)?,
                days_overdue: (today - attend_on).num_days(),
            });
        }
        tracing::debug!(count = overdue.len(), %cutoff, "overdue reports");
        Ok(overdue)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` unless the actor manages the session's chapter.
    pub async fn mark_reminder_sent(
        &self,
        actor: &Actor,
        student_session_id: &str,
    ) -> Result<(), DatabaseError> {
        let mut booking = self.get_student_session(student_session_id).await?;
        let session = self.get_session(&booking.session_id).await?;
        actor.ensure_chapter(&session.chapter_id)?;

        let now = Self::now();
        booking.reminder_sent_at = Some(now);
        booking.updated_at = now;
        self.save_student_session(&booking).await?;
        self.audit(
            actor,
            EntityType::StudentSession,
            student_session_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "reminder_sent_at": now })),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, chapter, date, mentor, student, test_service};

    #[tokio::test]
    async fn overdue_until_reminded_or_written() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let s1 = student(&svc, c.id(), "Tran").await;
        let s2 = student(&svc, c.id(), "Adams").await;
        let s3 = student(&svc, c.id(), "Lee").await;
        let (_, old) = svc.book_session(&admin(), c.id(), m.id(), s1.id(), date(2026, 2, 7)).await.unwrap();
        let (_, done) = svc.book_session(&admin(), c.id(), m.id(), s2.id(), date(2026, 2, 7)).await.unwrap();
        svc.book_session(&admin(), c.id(), m.id(), s3.id(), date(2026, 2, 14)).await.unwrap();

        svc.save_report(&admin(), &done.id, "Done").await.unwrap();
        svc.submit_report(&admin(), &done.id).await.unwrap();

        let today = date(2026, 2, 17);
        let overdue = svc.list_overdue_reports(&admin(), today, 7).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].student_session_id, old.id);
        assert_eq!(overdue[0].mentor_email, "jo@example.org");
        assert_eq!(overdue[0].days_overdue, 10);

        svc.mark_reminder_sent(&admin(), &old.id).await.unwrap();
        assert!(svc.list_overdue_reports(&admin(), today, 7).await.unwrap().is_empty());
        assert!(svc.get_student_session(&old.id).await.unwrap().reminder_sent_at.is_some());
    }

    #[tokio::test]
    async fn coordinator_sees_only_own_chapter() {
        let svc = test_service().await;
        let carlton = chapter(&svc, "Carlton").await;
        let footscray = chapter(&svc, "Footscray").await;
        let m1 = mentor(&svc, carlton.id(), "jo@example.org").await;
        let m2 = mentor(&svc, footscray.id(), "sam@example.org").await;
        let s1 = student(&svc, carlton.id(), "Tran").await;
        let s2 = student(&svc, footscray.id(), "Adams").await;
        let (_, own) = svc
            .book_session(&admin(), carlton.id(), m1.id(), s1.id(), date(2026, 2, 7))
            .await
            .unwrap();
        svc.book_session(&admin(), footscray.id(), m2.id(), s2.id(), date(2026, 2, 7))
            .await
            .unwrap();

        let coordinator = Actor::coordinator("coord", vec![carlton.id().to_string()]);
        let overdue = svc.list_overdue_reports(&coordinator, date(2026, 2, 17), 7).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].student_session_id, own.id);

        let as_mentor = svc
            .list_overdue_reports(&Actor::mentor(m1.id()), date(2026, 2, 17), 7)
            .await
            .unwrap();
        assert!(as_mentor.is_empty());
        assert_eq!(svc.list_overdue_reports(&admin(), date(2026, 2, 17), 7).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn mentor_cannot_mark_reminders() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let s = student(&svc, c.id(), "Tran").await;
        let (_, b) = svc.book_session(&admin(), c.id(), m.id(), s.id(), date(2026, 2, 7)).await.unwrap();
        let err = svc.mark_reminder_sent(&Actor::mentor(m.id()), &b.id).await.unwrap_err();
        assert!(err.is_forbidden());
    }
}
