//! Session rostering repository.
//!
//! A `Session` is one mentor at one chapter on one date; each student booked
//! into it gets a `StudentSession` row carrying the report. Bookings and
//! removals touch both tables, so they run in a transaction.

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

use mb_core::access::Actor;
use mb_core::entities::{Session, StudentSession};
use mb_core::enums::{AuditAction, EntityType, ReportStatus};
use mb_core::ids::{PREFIX_SESSION, PREFIX_STUDENT_SESSION};

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, get_opt_string, parse_date, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::ProgramService;

pub(crate) const STUDENT_SESSION_COLS: &str = "id, session_id, student_id, status, report, \
     completed_on, signed_off_on, signed_off_by, report_feedback, cancelled_reason, \
     reminder_sent_at, created_at, updated_at";

const SESSION_COLS: &str = "id, chapter_id, mentor_id, attend_on, created_at";

fn row_to_session(row: &libsql::Row) -> Result<Session, DatabaseError> {
    Ok(Session {
        id: row.get(0)?,
        chapter_id: row.get(1)?,
        mentor_id: row.get(2)?,
        attend_on: parse_date(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) fn row_to_student_session(row: &libsql::Row) -> Result<StudentSession, DatabaseError> {
    Ok(StudentSession {
        id: row.get(0)?,
        session_id: row.get(1)?,
        student_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        report: get_opt_string(row, 4)?,
        completed_on: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        signed_off_on: parse_optional_datetime(get_opt_string(row, 6)?.as_deref())?,
        signed_off_by: get_opt_string(row, 7)?,
        report_feedback: get_opt_string(row, 8)?,
        cancelled_reason: get_opt_string(row, 9)?,
        reminder_sent_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
        updated_at: parse_datetime(&row.get::<String>(12)?)?,
    })
}

/// A student booked into a session, as shown on a roster.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookedStudent {
    pub student_session_id: String,
    pub student_id: String,
    pub student_name: String,
    pub status: ReportStatus,
}

/// A session with its mentor and booked students.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionView {
    pub session: Session,
    pub mentor_name: String,
    pub students: Vec<BookedStudent>,
}

/// One session date on a term roster.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RosterDay {
    pub date: NaiveDate,
    pub week: Option<u32>,
    pub sessions: Vec<SessionView>,
}

impl ProgramService {
    /// Book a student with a mentor on a date.
    ///
    /// Creates the mentor's session for that date if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the mentor or student is archived or outside the
    /// chapter, and `InvalidState` if the student is already booked at this
    /// chapter on this date.
    pub async fn book_session(
        &self,
        actor: &Actor,
        chapter_id: &str,
        mentor_id: &str,
        student_id: &str,
        attend_on: NaiveDate,
    ) -> Result<(Session, StudentSession), DatabaseError> {
        actor.ensure_mentor_or_chapter(mentor_id, chapter_id)?;
        let mentor = self.get_mentor(mentor_id).await?;
        let student = self.get_student(student_id).await?;
        for (what, id, chapter, archived) in [
            ("mentor", mentor.id(), mentor.chapter_id(), mentor.is_archived()),
            ("student", student.id(), student.chapter_id(), student.is_archived()),
        ] {
            if chapter != chapter_id {
                return Err(mb_core::errors::CoreError::Validation(format!(
                    "{what} {id} is not in chapter {chapter_id}"
                ))
                .into());
            }
            if archived {
                return Err(mb_core::errors::CoreError::Validation(format!(
                    "{what} {id} is archived"
                ))
                .into());
            }
        }

        let now = Self::now();
        let date = fmt_date(attend_on);
        let new_session_id = self.db().generate_id(PREFIX_SESSION).await?;
        let student_session_id = self.db().generate_id(PREFIX_STUDENT_SESSION).await?;

        let tx = self.db().conn().transaction().await?;

        let mut existing = tx
            .query(
                "SELECT ss.id FROM student_sessions ss
                 JOIN sessions s ON s.id = ss.session_id
                 WHERE s.chapter_id = ?1 AND s.attend_on = ?2 AND ss.student_id = ?3",
                libsql::params![chapter_id, date.as_str(), student_id],
            )
            .await?;
        if existing.next().await?.is_some() {
            return Err(DatabaseError::InvalidState(format!(
                "student {student_id} is already booked on {date}"
            )));
        }
        drop(existing);

        let mut found = tx
            .query(
                &format!(
                    "SELECT {SESSION_COLS} FROM sessions
                     WHERE chapter_id = ?1 AND mentor_id = ?2 AND attend_on = ?3"
                ),
                libsql::params![chapter_id, mentor_id, date.as_str()],
            )
            .await?;
        let existing_session = match found.next().await? {
            Some(row) => Some(row_to_session(&row)?),
            None => None,
        };
        drop(found);

        let session = if let Some(session) = existing_session {
            session
        } else {
            let session = Session {
                id: new_session_id,
                chapter_id: chapter_id.to_string(),
                mentor_id: mentor_id.to_string(),
                attend_on,
                created_at: now,
            };
            tx.execute(
                &format!("INSERT INTO sessions ({SESSION_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    session.id.as_str(),
                    chapter_id,
                    mentor_id,
                    date.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;
            session
        };

        let booking = StudentSession::book(
            student_session_id,
            session.id.clone(),
            student_id.to_string(),
            now,
        );
        tx.execute(
            "INSERT INTO student_sessions (id, session_id, student_id, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                booking.id.as_str(),
                booking.session_id.as_str(),
                student_id,
                booking.status.as_str(),
                now.to_rfc3339(),
                now.to_rfc3339()
            ],
        )
        .await?;
        tx.commit().await?;

        self.audit(
            actor,
            EntityType::StudentSession,
            &booking.id,
            AuditAction::Created,
            Some(serde_json::json!({
                "session_id": session.id,
                "mentor_id": mentor_id,
                "student_id": student_id,
                "attend_on": date,
            })),
        )
        .await?;
        tracing::debug!(session = %session.id, student_session = %booking.id, "student booked");
        Ok((session, booking))
    }

    /// Remove a student's booking. When it was the session's last student the
    /// session is deleted too. Returns whether the session was deleted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` once a report has been submitted.
    pub async fn remove_student_from_session(
        &self,
        actor: &Actor,
        student_session_id: &str,
    ) -> Result<bool, DatabaseError> {
        let booking = self.get_student_session(student_session_id).await?;
        let session = self.get_session(&booking.session_id).await?;
        actor.ensure_mentor_or_chapter(&session.mentor_id, &session.chapter_id)?;
        if !matches!(booking.status, ReportStatus::Draft | ReportStatus::Cancelled) {
            return Err(DatabaseError::InvalidState(format!(
                "student session {student_session_id} has a {} report",
                booking.status
            )));
        }

        let tx = self.db().conn().transaction().await?;
        tx.execute("DELETE FROM student_sessions WHERE id = ?1", [student_session_id])
            .await?;
        let mut rows = tx
            .query(
                "SELECT COUNT(*) FROM student_sessions WHERE session_id = ?1",
                [session.id.as_str()],
            )
            .await?;
        let remaining: i64 = rows.next().await?.ok_or(DatabaseError::NoResult)?.get(0)?;
        drop(rows);
        let session_deleted = remaining == 0;
        if session_deleted {
            tx.execute("DELETE FROM sessions WHERE id = ?1", [session.id.as_str()])
                .await?;
        }
        tx.commit().await?;

        self.audit(
            actor,
            EntityType::StudentSession,
            student_session_id,
            AuditAction::Deleted,
            Some(serde_json::json!({ "session_id": session.id, "session_deleted": session_deleted })),
        )
        .await?;
        Ok(session_deleted)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no session has this ID.
    pub async fn get_session(&self, id: &str) -> Result<Session, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SESSION_COLS} FROM sessions WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_session(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no booking has this ID.
    pub async fn get_student_session(&self, id: &str) -> Result<StudentSession, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {STUDENT_SESSION_COLS} FROM student_sessions WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_student_session(&row)
    }

    /// Sessions at a chapter between two dates (inclusive), with mentors and
    /// booked students, ordered by date then mentor name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_sessions(
        &self,
        chapter_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionView>, DatabaseError> {
        let (from, to) = (fmt_date(from), fmt_date(to));
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT s.id, s.chapter_id, s.mentor_id, s.attend_on, s.created_at,
                        COALESCE(m.preferred_name, m.first_name) || ' ' || m.last_name
                 FROM sessions s JOIN mentors m ON m.id = s.mentor_id
                 WHERE s.chapter_id = ?1 AND s.attend_on BETWEEN ?2 AND ?3
                 ORDER BY s.attend_on, m.last_name COLLATE NOCASE, m.first_name COLLATE NOCASE",
                libsql::params![chapter_id, from.as_str(), to.as_str()],
            )
            .await?;
        let mut views = Vec::new();
        while let Some(row) = rows.next().await? {
            views.push(SessionView {
                session: row_to_session(&row)?,
                mentor_name: row.get(5)?,
                students: Vec::new(),
            });
        }

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT ss.session_id, ss.id, ss.student_id,
                        COALESCE(st.preferred_name, st.first_name) || ' ' || st.last_name,
                        ss.status
                 FROM student_sessions ss
                 JOIN sessions s ON s.id = ss.session_id
                 JOIN students st ON st.id = ss.student_id
                 WHERE s.chapter_id = ?1 AND s.attend_on BETWEEN ?2 AND ?3
                 ORDER BY st.last_name COLLATE NOCASE, st.first_name COLLATE NOCASE",
                libsql::params![chapter_id, from.as_str(), to.as_str()],
            )
            .await?;
        let mut by_session: HashMap<String, Vec<BookedStudent>> = HashMap::new();
        while let Some(row) = rows.next().await? {
            by_session
                .entry(row.get::<String>(0)?)
                .or_default()
                .push(BookedStudent {
                    student_session_id: row.get(1)?,
                    student_id: row.get(2)?,
                    student_name: row.get(3)?,
                    status: parse_enum(&row.get::<String>(4)?)?,
                });
        }
        for view in &mut views {
            if let Some(students) = by_session.remove(&view.session.id) {
                view.students = students;
            }
        }
        Ok(views)
    }

    /// Every session date of a term on `weekday`, each with its sessions.
    /// Dates with nothing booked are included with no sessions.
    ///
    /// # Errors
    ///
    /// Returns `NoResult` for an unknown term.
    pub async fn roster(
        &self,
        chapter_id: &str,
        term_id: &str,
        weekday: Weekday,
    ) -> Result<Vec<RosterDay>, DatabaseError> {
        let term = self.get_term(term_id).await?;
        let sessions = self
            .list_sessions(chapter_id, term.start_date, term.end_date)
            .await?;

        let mut by_date: HashMap<NaiveDate, Vec<SessionView>> = HashMap::new();
        for view in sessions {
            by_date.entry(view.session.attend_on).or_default().push(view);
        }

        let mut dates = term.session_dates(weekday);
        // Sessions booked off the usual weekday still belong on the roster.
        for date in by_date.keys() {
            if !dates.contains(date) {
                dates.push(*date);
            }
        }
        dates.sort_unstable();

        Ok(dates
            .into_iter()
            .map(|date| RosterDay {
                date,
                week: term.week_number(date),
                sessions: by_date.remove(&date).unwrap_or_default(),
            })
            .collect())
    }
}
