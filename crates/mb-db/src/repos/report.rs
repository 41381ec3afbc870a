//! Session report workflow.
//!
//! Mentors write and submit reports for their own bookings; chapter
//! coordinators sign them off. Every status change is audited with the
//! previous and new status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use mb_core::access::Actor;
use mb_core::entities::{Session, StudentSession};
use mb_core::enums::{AuditAction, EntityType, ReportStatus};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_date, parse_optional_datetime};
use crate::service::ProgramService;

/// A completed report waiting for a coordinator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PendingReport {
    pub student_session_id: String,
    pub attend_on: NaiveDate,
    pub mentor_id: String,
    pub mentor_name: String,
    pub student_id: String,
    pub student_name: String,
    pub completed_on: Option<DateTime<Utc>>,
}

/// Who may touch a booking.
enum Gate {
    MentorOrChapter,
    Chapter,
}

impl ProgramService {
    async fn load_booking(
        &self,
        actor: &Actor,
        id: &str,
        gate: Gate,
    ) -> Result<(Session, StudentSession), DatabaseError> {
        let booking = self.get_student_session(id).await?;
        let session = self.get_session(&booking.session_id).await?;
        match gate {
            Gate::MentorOrChapter => {
                actor.ensure_mentor_or_chapter(&session.mentor_id, &session.chapter_id)?;
            }
            Gate::Chapter => actor.ensure_chapter(&session.chapter_id)?,
        }
        Ok((session, booking))
    }

    pub(crate) async fn save_student_session(
        &self,
        booking: &StudentSession,
    ) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE student_sessions SET status = ?1, report = ?2, completed_on = ?3,
                     signed_off_on = ?4, signed_off_by = ?5, report_feedback = ?6,
                     cancelled_reason = ?7, reminder_sent_at = ?8, updated_at = ?9
                 WHERE id = ?10",
                libsql::params![
                    booking.status.as_str(),
                    booking.report.as_deref(),
                    booking.completed_on.map(|d| d.to_rfc3339()),
                    booking.signed_off_on.map(|d| d.to_rfc3339()),
                    booking.signed_off_by.as_deref(),
                    booking.report_feedback.as_deref(),
                    booking.cancelled_reason.as_deref(),
                    booking.reminder_sent_at.map(|d| d.to_rfc3339()),
                    booking.updated_at.to_rfc3339(),
                    booking.id.as_str()
                ],
            )
            .await?;
        Ok(())
    }

    async fn record_status_change(
        &self,
        actor: &Actor,
        booking: &StudentSession,
        from: ReportStatus,
    ) -> Result<(), DatabaseError> {
        self.save_student_session(booking).await?;
        self.audit(
            actor,
            EntityType::StudentSession,
            &booking.id,
            AuditAction::StatusChanged,
            Some(serde_json::json!({ "from": from, "to": booking.status })),
        )
        .await?;
        tracing::debug!(student_session = %booking.id, %from, to = %booking.status, "report status changed");
        Ok(())
    }

    /// Write or replace the report text. Editable while `draft` or `completed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once signed off or cancelled.
    pub async fn save_report(
        &self,
        actor: &Actor,
        student_session_id: &str,
        text: &str,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::MentorOrChapter)
            .await?;
        booking.save_report(text, Self::now())?;
        self.save_student_session(&booking).await?;
        self.audit(
            actor,
            EntityType::StudentSession,
            student_session_id,
            AuditAction::Updated,
            None,
        )
        .await?;
        Ok(booking)
    }

    /// # Errors
    ///
    /// Returns `Validation` without report text, or `InvalidTransition`
    /// unless the report is a draft.
    pub async fn submit_report(
        &self,
        actor: &Actor,
        student_session_id: &str,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::MentorOrChapter)
            .await?;
        let from = booking.status;
        booking.submit(Self::now())?;
        self.record_status_change(actor, &booking, from).await?;
        Ok(booking)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the report is completed.
    pub async fn reopen_report(
        &self,
        actor: &Actor,
        student_session_id: &str,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::MentorOrChapter)
            .await?;
        let from = booking.status;
        booking.reopen(Self::now())?;
        self.record_status_change(actor, &booking, from).await?;
        Ok(booking)
    }

    /// Coordinator sign-off with optional feedback for the mentor.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for mentors and `InvalidTransition` unless the
    /// report is completed.
    pub async fn sign_off_report(
        &self,
        actor: &Actor,
        student_session_id: &str,
        feedback: Option<&str>,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::Chapter)
            .await?;
        let from = booking.status;
        booking.sign_off(&actor.id, feedback, Self::now())?;
        self.record_status_change(actor, &booking, from).await?;
        Ok(booking)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the report is signed off.
    pub async fn revoke_sign_off(
        &self,
        actor: &Actor,
        student_session_id: &str,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::Chapter)
            .await?;
        let from = booking.status;
        booking.revoke_sign_off(Self::now())?;
        self.record_status_change(actor, &booking, from).await?;
        Ok(booking)
    }

    /// Mark a booked student as absent.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank reason or `InvalidTransition` unless
    /// the report is a draft.
    pub async fn cancel_student_session(
        &self,
        actor: &Actor,
        student_session_id: &str,
        reason: &str,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::MentorOrChapter)
            .await?;
        let from = booking.status;
        booking.cancel(reason, Self::now())?;
        self.record_status_change(actor, &booking, from).await?;
        Ok(booking)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the booking is cancelled.
    pub async fn restore_student_session(
        &self,
        actor: &Actor,
        student_session_id: &str,
    ) -> Result<StudentSession, DatabaseError> {
        let (_, mut booking) = self
            .load_booking(actor, student_session_id, Gate::MentorOrChapter)
            .await?;
        let from = booking.status;
        booking.restore(Self::now())?;
        self.record_status_change(actor, &booking, from).await?;
        Ok(booking)
    }

    /// Completed reports at a chapter, oldest session first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_reports_awaiting_sign_off(
        &self,
        chapter_id: &str,
    ) -> Result<Vec<PendingReport>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT ss.id, s.attend_on, s.mentor_id,
                        COALESCE(m.preferred_name, m.first_name) || ' ' || m.last_name,
                        ss.student_id,
                        COALESCE(st.preferred_name, st.first_name) || ' ' || st.last_name,
                        ss.completed_on
                 FROM student_sessions ss
                 JOIN sessions s ON s.id = ss.session_id
                 JOIN mentors m ON m.id = s.mentor_id
                 JOIN students st ON st.id = ss.student_id
                 WHERE s.chapter_id = ?1 AND ss.status = ?2
                 ORDER BY s.attend_on, ss.completed_on",
                libsql::params![chapter_id, ReportStatus::Completed.as_str()],
            )
            .await?;
        let mut pending = Vec::new();
        while let Some(row) = rows.next().await? {
            pending.push(PendingReport {
                student_session_id: row.get(0)?,
                attend_on: parse_date(&row.get::<String>(1)?)?,
                mentor_id: row.get(2)?,
                mentor_name: row.get(3)?,
                student_id: row.get(4)?,
                student_name: row.get(5)?,
                completed_on: parse_optional_datetime(get_opt_string(&row, 6)?.as_deref())?,
            });
        }
        Ok(pending)
    }
}
