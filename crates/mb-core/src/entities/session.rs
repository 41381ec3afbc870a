use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ReportStatus;
use crate::errors::CoreError;
use crate::values::required;

const ENTITY: &str = "student_session";

/// A mentor's booking at a chapter on a given date.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub chapter_id: String,
    pub mentor_id: String,
    pub attend_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A student booked into a [`Session`], carrying the session report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudentSession {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub status: ReportStatus,
    pub report: Option<String>,
    pub completed_on: Option<DateTime<Utc>>,
    pub signed_off_on: Option<DateTime<Utc>>,
    pub signed_off_by: Option<String>,
    pub report_feedback: Option<String>,
    pub cancelled_reason: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentSession {
    /// A fresh booking in `draft`.
    #[must_use]
    pub fn book(id: String, session_id: String, student_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            session_id,
            student_id,
            status: ReportStatus::Draft,
            report: None,
            completed_on: None,
            signed_off_on: None,
            signed_off_by: None,
            report_feedback: None,
            cancelled_reason: None,
            reminder_sent_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transition(&mut self, next: ReportStatus, now: DateTime<Utc>) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::transition(ENTITY, &self.id, self.status, next));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Replace the report text. A blank text clears the report.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` once the report is signed off or
    /// the session is cancelled.
    pub fn save_report(&mut self, text: &str, now: DateTime<Utc>) -> Result<(), CoreError> {
        if !self.status.is_editable() {
            return Err(CoreError::transition(ENTITY, &self.id, self.status, "edited"));
        }
        let text = text.trim();
        self.report = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self.updated_at = now;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` without a report, or
    /// `CoreError::InvalidTransition` unless in `draft`.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.report.is_none() {
            return Err(CoreError::validation(format!(
                "student session {} has no report to submit",
                self.id
            )));
        }
        self.transition(ReportStatus::Completed, now)?;
        self.completed_on = Some(now);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless in `completed`.
    pub fn reopen(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.status != ReportStatus::Completed {
            return Err(CoreError::transition(
                ENTITY,
                &self.id,
                self.status,
                ReportStatus::Draft,
            ));
        }
        self.transition(ReportStatus::Draft, now)?;
        self.completed_on = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless in `completed`.
    pub fn sign_off(
        &mut self,
        by: &str,
        feedback: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let by = required("signed off by", by)?;
        self.transition(ReportStatus::SignedOff, now)?;
        self.signed_off_on = Some(now);
        self.signed_off_by = Some(by);
        self.report_feedback = feedback
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(String::from);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless in `signed_off`.
    pub fn revoke_sign_off(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.status != ReportStatus::SignedOff {
            return Err(CoreError::transition(
                ENTITY,
                &self.id,
                self.status,
                ReportStatus::Completed,
            ));
        }
        self.transition(ReportStatus::Completed, now)?;
        self.signed_off_on = None;
        self.signed_off_by = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank reason, or
    /// `CoreError::InvalidTransition` unless in `draft`.
    pub fn cancel(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), CoreError> {
        let reason = required("cancel reason", reason)?;
        self.transition(ReportStatus::Cancelled, now)?;
        self.cancelled_reason = Some(reason);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` unless in `cancelled`.
    pub fn restore(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        if self.status != ReportStatus::Cancelled {
            return Err(CoreError::transition(
                ENTITY,
                &self.id,
                self.status,
                ReportStatus::Draft,
            ));
        }
        self.transition(ReportStatus::Draft, now)?;
        self.cancelled_reason = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> StudentSession {
        StudentSession::book("sts-1".into(), "ses-1".into(), "stu-1".into(), Utc::now())
    }

    #[test]
    fn full_report_lifecycle() {
        let mut s = booking();
        s.save_report("Read two chapters together", Utc::now()).unwrap();
        s.submit(Utc::now()).unwrap();
        assert_eq!(s.status, ReportStatus::Completed);
        assert!(s.completed_on.is_some());

        s.sign_off("ops-1", Some(" Great work "), Utc::now()).unwrap();
        assert_eq!(s.status, ReportStatus::SignedOff);
        assert_eq!(s.report_feedback.as_deref(), Some("Great work"));
        assert!(s.save_report("late edit", Utc::now()).is_err());

        s.revoke_sign_off(Utc::now()).unwrap();
        assert_eq!(s.status, ReportStatus::Completed);
        assert!(s.signed_off_by.is_none());

        s.reopen(Utc::now()).unwrap();
        assert_eq!(s.status, ReportStatus::Draft);
        assert!(s.completed_on.is_none());
    }

    #[test]
    fn submit_requires_report() {
        let mut s = booking();
        assert!(matches!(s.submit(Utc::now()), Err(CoreError::Validation(_))));
        s.save_report("   ", Utc::now()).unwrap();
        assert!(s.report.is_none());
        assert!(s.submit(Utc::now()).is_err());
    }

    #[test]
    fn sign_off_requires_completed() {
        let mut s = booking();
        assert!(matches!(
            s.sign_off("ops-1", None, Utc::now()),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_and_restore() {
        let mut s = booking();
        assert!(s.cancel(" ", Utc::now()).is_err());
        s.cancel("Student sick", Utc::now()).unwrap();
        assert_eq!(s.status, ReportStatus::Cancelled);
        assert!(s.save_report("text", Utc::now()).is_err());
        assert!(s.reopen(Utc::now()).is_err());

        s.restore(Utc::now()).unwrap();
        assert_eq!(s.status, ReportStatus::Draft);
        assert!(s.cancelled_reason.is_none());
    }

    #[test]
    fn completed_cannot_be_cancelled() {
        let mut s = booking();
        s.save_report("done", Utc::now()).unwrap();
        s.submit(Utc::now()).unwrap();
        assert!(s.cancel("too late", Utc::now()).is_err());
    }
}
