//! Attendance summaries built from session bookings.
//!
//! A booking counts as attended once its date has passed (or is today)
//! and it was not cancelled; future bookings are upcoming.

use chrono::NaiveDate;
use serde::Serialize;

use mb_core::enums::ReportStatus;

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, get_opt_string, parse_date, parse_enum};
use crate::service::ProgramService;

/// One booking in a student's attendance history.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub student_session_id: String,
    pub attend_on: NaiveDate,
    pub chapter_id: String,
    pub mentor_id: String,
    pub mentor_name: String,
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct AttendanceCounts {
    pub attended: u32,
    pub cancelled: u32,
    pub upcoming: u32,
}

impl AttendanceCounts {
    fn tally(&mut self, attend_on: NaiveDate, status: ReportStatus, today: NaiveDate) {
        if status == ReportStatus::Cancelled {
            self.cancelled += 1;
        } else if attend_on > today {
            self.upcoming += 1;
        } else {
            self.attended += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StudentAttendance {
    pub student_id: String,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
    pub sessions: Vec<AttendanceRecord>,
}

/// Per-student line of a chapter attendance report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChapterAttendanceRow {
    pub student_id: String,
    pub student_name: String,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
}

impl ProgramService {
    /// A student's bookings, optionally limited to one term, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NoResult` for an unknown student or term.
    pub async fn attendance_for_student(
        &self,
        student_id: &str,
        term_id: Option<&str>,
        today: NaiveDate,
    ) -> Result<StudentAttendance, DatabaseError> {
        self.get_student(student_id).await?;
        let (from, to) = match term_id {
            Some(id) => {
                let term = self.get_term(id).await?;
                (fmt_date(term.start_date), fmt_date(term.end_date))
            }
            None => (String::from("0000-01-01"), String::from("9999-12-31")),
        };

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT ss.id, s.attend_on, s.chapter_id, s.mentor_id,
                        COALESCE(m.preferred_name, m.first_name) || ' ' || m.last_name,
                        ss.status
                 FROM student_sessions ss
                 JOIN sessions s ON s.id = ss.session_id
                 JOIN mentors m ON m.id = s.mentor_id
                 WHERE ss.student_id = ?1 AND s.attend_on BETWEEN ?2 AND ?3
                 ORDER BY s.attend_on DESC",
                libsql::params![student_id, from.as_str(), to.as_str()],
            )
            .await?;

        let mut counts = AttendanceCounts::default();
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            let record = AttendanceRecord {
                student_session_id: row.get(0)?,
                attend_on: parse_date(&row.get::<String>(1)?)?,
                chapter_id: row.get(2)?,
                mentor_id: row.get(3)?,
                mentor_name: row.get(4)?,
                status: parse_enum(&row.get::<String>(5)?)?,
            };
            counts.tally(record.attend_on, record.status, today);
            sessions.push(record);
        }
        Ok(StudentAttendance {
            student_id: student_id.to_string(),
            counts,
            sessions,
        })
    }

    /// Attendance counts for every student booked at a chapter during a
    /// term, plus active students with no bookings.
    ///
    /// # Errors
    ///
    /// Returns `NoResult` for an unknown term.
    pub async fn attendance_for_chapter(
        &self,
        chapter_id: &str,
        term_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<ChapterAttendanceRow>, DatabaseError> {
        let term = self.get_term(term_id).await?;
        let (from, to) = (fmt_date(term.start_date), fmt_date(term.end_date));

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT st.id,
                        COALESCE(st.preferred_name, st.first_name) || ' ' || st.last_name,
                        b.attend_on, b.status
                 FROM students st
                 LEFT JOIN (
                     SELECT ss.student_id, s.attend_on, ss.status
                     FROM student_sessions ss JOIN sessions s ON s.id = ss.session_id
                     WHERE s.chapter_id = ?1 AND s.attend_on BETWEEN ?2 AND ?3
                 ) b ON b.student_id = st.id
                 WHERE (st.chapter_id = ?1 AND st.end_date IS NULL) OR b.student_id IS NOT NULL
                 ORDER BY st.last_name COLLATE NOCASE, st.first_name COLLATE NOCASE, st.id",
                libsql::params![chapter_id, from.as_str(), to.as_str()],
            )
            .await?;

        let mut report: Vec<ChapterAttendanceRow> = Vec::new();
        while let Some(row) = rows.next().await? {
            let student_id: String = row.get(0)?;
            if report.last().is_none_or(|r| r.student_id != student_id) {
                report.push(ChapterAttendanceRow {
                    student_id,
                    student_name: row.get(1)?,
                    counts: AttendanceCounts::default(),
                });
            }
            let Some(attend_on) = get_opt_string(&row, 2)? else {
                continue;
            };
            let status: ReportStatus = parse_enum(&row.get::<String>(3)?)?;
            if let Some(current) = report.last_mut() {
                current.counts.tally(parse_date(&attend_on)?, status, today);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, chapter, date, mentor, student, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn student_counts_split_by_today() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let s = student(&svc, c.id(), "Tran").await;
        let term = svc
            .create_term(&admin(), "Term 1", date(2026, 1, 27), date(2026, 4, 2))
            .await
            .unwrap();

        let mut ids = Vec::new();
        for day in [7, 14, 21, 28] {
            let (_, b) = svc
                .book_session(&admin(), c.id(), m.id(), s.id(), date(2026, 2, day))
                .await
                .unwrap();
            ids.push(b.id);
        }
        svc.cancel_student_session(&admin(), &ids[1], "Sick").await.unwrap();

        let today = date(2026, 2, 21);
        let summary = svc
            .attendance_for_student(s.id(), Some(&term.id), today)
            .await
            .unwrap();
        assert_eq!(
            summary.counts,
            AttendanceCounts {
                attended: 2,
                cancelled: 1,
                upcoming: 1
            }
        );
        assert_eq!(summary.sessions[0].attend_on, date(2026, 2, 28));
        assert_eq!(summary.sessions[0].mentor_name, "Jo Bloggs");

        let all = svc.attendance_for_student(s.id(), None, today).await.unwrap();
        assert_eq!(all.sessions.len(), 4);
    }

    #[tokio::test]
    async fn chapter_report_includes_unbooked_students() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let booked = student(&svc, c.id(), "Tran").await;
        student(&svc, c.id(), "Adams").await;
        let term = svc
            .create_term(&admin(), "Term 1", date(2026, 1, 27), date(2026, 4, 2))
            .await
            .unwrap();
        for day in [7, 14] {
            svc.book_session(&admin(), c.id(), m.id(), booked.id(), date(2026, 2, day))
                .await
                .unwrap();
        }

        let rows = svc
            .attendance_for_chapter(c.id(), &term.id, date(2026, 2, 10))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].student_name, "Mia Adams");
        assert_eq!(rows[0].counts, AttendanceCounts::default());
        assert_eq!(rows[1].counts.attended, 1);
        assert_eq!(rows[1].counts.upcoming, 1);
    }
}
