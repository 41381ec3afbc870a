use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Mentor, Student};
use crate::errors::CoreError;

/// Pairing of a mentor with a student inside one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MentorStudentAssignment {
    pub id: String,
    pub mentor_id: String,
    pub student_id: String,
    pub chapter_id: String,
    pub assigned_by: String,
    pub created_at: DateTime<Utc>,
}

impl MentorStudentAssignment {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the mentor and student belong to
    /// different chapters, or either of them is archived.
    pub fn create(
        id: String,
        mentor: &Mentor,
        student: &Student,
        assigned_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        if mentor.chapter_id() != student.chapter_id() {
            return Err(CoreError::validation(format!(
                "mentor {} (chapter {}) and student {} (chapter {}) are in different chapters",
                mentor.id(),
                mentor.chapter_id(),
                student.id(),
                student.chapter_id()
            )));
        }
        if mentor.is_archived() {
            return Err(CoreError::validation(format!(
                "mentor {} is archived",
                mentor.id()
            )));
        }
        if student.is_archived() {
            return Err(CoreError::validation(format!(
                "student {} is archived",
                student.id()
            )));
        }
        Ok(Self {
            id,
            mentor_id: mentor.id().to_string(),
            student_id: student.id().to_string(),
            chapter_id: mentor.chapter_id().to_string(),
            assigned_by: assigned_by.to_string(),
            created_at: now,
        })
    }
}
