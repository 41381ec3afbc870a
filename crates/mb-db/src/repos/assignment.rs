//! Mentor-student assignment repository.

use mb_core::access::Actor;
use mb_core::entities::{Mentor, MentorStudentAssignment, Student};
use mb_core::enums::{AuditAction, EntityType, Role};
use mb_core::ids::PREFIX_ASSIGNMENT;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, unique_violation};
use crate::repos::{mentor, student};
use crate::service::ProgramService;

fn row_to_assignment(row: &libsql::Row) -> Result<MentorStudentAssignment, DatabaseError> {
    Ok(MentorStudentAssignment {
        id: row.get(0)?,
        mentor_id: row.get(1)?,
        student_id: row.get(2)?,
        chapter_id: row.get(3)?,
        assigned_by: row.get(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

fn prefixed(cols: &str, alias: &str) -> String {
    cols.split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fails with `InvalidState` while `id` appears in any assignment under
/// `column` (`mentor_id` or `student_id`). Run inside the move transaction.
pub(crate) async fn ensure_unassigned(
    conn: &libsql::Connection,
    column: &'static str,
    id: &str,
) -> Result<(), DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT COUNT(*) FROM mentor_student_assignments WHERE {column} = ?1"),
            [id],
        )
        .await?;
    let count = match rows.next().await? {
        Some(row) => row.get::<i64>(0)?,
        None => 0,
    };
    if count > 0 {
        return Err(DatabaseError::InvalidState(format!(
            "{id} has {count} assignment(s); unassign before moving chapters"
        )));
    }
    Ok(())
}

impl ProgramService {
    /// Chapter managers, or a mentor assigned to the student.
    pub(crate) async fn ensure_student_access(
        &self,
        actor: &Actor,
        student: &Student,
    ) -> Result<(), DatabaseError> {
        if actor.role == Role::Mentor {
            match self.get_assignment(&actor.id, student.id()).await {
                Ok(_) => return Ok(()),
                Err(DatabaseError::NoResult) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(actor.ensure_chapter(student.chapter_id())?)
    }

    /// Assign a student to a mentor.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for cross-chapter or archived pairs, and
    /// `InvalidState` if the pair is already assigned.
    pub async fn assign_student(
        &self,
        actor: &Actor,
        mentor_id: &str,
        student_id: &str,
    ) -> Result<MentorStudentAssignment, DatabaseError> {
        let mentor = self.get_mentor(mentor_id).await?;
        actor.ensure_chapter(mentor.chapter_id())?;
        let student = self.get_student(student_id).await?;

        let id = self.db().generate_id(PREFIX_ASSIGNMENT).await?;
        let assignment =
            MentorStudentAssignment::create(id, &mentor, &student, &actor.id, Self::now())?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO mentor_student_assignments
                     (id, mentor_id, student_id, chapter_id, assigned_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    assignment.id.as_str(),
                    assignment.mentor_id.as_str(),
                    assignment.student_id.as_str(),
                    assignment.chapter_id.as_str(),
                    assignment.assigned_by.as_str(),
                    assignment.created_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| {
                unique_violation(e, || {
                    format!("student {student_id} is already assigned to mentor {mentor_id}")
                })
            })?;

        self.audit(
            actor,
            EntityType::Assignment,
            &assignment.id,
            AuditAction::Assigned,
            Some(serde_json::json!({ "mentor_id": mentor_id, "student_id": student_id })),
        )
        .await?;
        Ok(assignment)
    }

    /// # Errors
    ///
    /// Returns `NoResult` if the pair is not assigned.
    pub async fn unassign_student(
        &self,
        actor: &Actor,
        mentor_id: &str,
        student_id: &str,
    ) -> Result<(), DatabaseError> {
        let assignment = self.get_assignment(mentor_id, student_id).await?;
        actor.ensure_chapter(&assignment.chapter_id)?;
        self.db()
            .conn()
            .execute(
                "DELETE FROM mentor_student_assignments WHERE id = ?1",
                [assignment.id.as_str()],
            )
            .await?;
        self.audit(
            actor,
            EntityType::Assignment,
            &assignment.id,
            AuditAction::Unassigned,
            Some(serde_json::json!({ "mentor_id": mentor_id, "student_id": student_id })),
        )
        .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `NoResult` if the pair is not assigned.
    pub async fn get_assignment(
        &self,
        mentor_id: &str,
        student_id: &str,
    ) -> Result<MentorStudentAssignment, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, mentor_id, student_id, chapter_id, assigned_by, created_at
                 FROM mentor_student_assignments WHERE mentor_id = ?1 AND student_id = ?2",
                [mentor_id, student_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_assignment(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_students_for_mentor(&self, mentor_id: &str) -> Result<Vec<Student>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM students s
             JOIN mentor_student_assignments a ON a.student_id = s.id
             WHERE a.mentor_id = ?1
             ORDER BY s.last_name COLLATE NOCASE, s.first_name COLLATE NOCASE",
            prefixed(student::SELECT_COLS, "s")
        );
        let mut rows = self.db().conn().query(&sql, [mentor_id]).await?;
        let mut students = Vec::new();
        while let Some(row) = rows.next().await? {
            students.push(student::row_to_student(&row)?);
        }
        Ok(students)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_mentors_for_student(&self, student_id: &str) -> Result<Vec<Mentor>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM mentors m
             JOIN mentor_student_assignments a ON a.mentor_id = m.id
             WHERE a.student_id = ?1
             ORDER BY m.last_name COLLATE NOCASE, m.first_name COLLATE NOCASE",
            prefixed(mentor::SELECT_COLS, "m")
        );
        let mut rows = self.db().conn().query(&sql, [student_id]).await?;
        let mut mentors = Vec::new();
        while let Some(row) = rows.next().await? {
            mentors.push(mentor::row_to_mentor(&row)?);
        }
        Ok(mentors)
    }
}
