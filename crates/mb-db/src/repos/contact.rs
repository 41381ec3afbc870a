//! Student guardians and school teachers.

use serde::{Deserialize, Serialize};

use mb_core::access::Actor;
use mb_core::entities::{Guardian, Teacher};
use mb_core::enums::{AuditAction, EntityType};
use mb_core::ids::{PREFIX_GUARDIAN, PREFIX_TEACHER};
use mb_core::values::{non_empty, required};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::ProgramService;

const GUARDIAN_COLS: &str = "id, student_id, full_name, relationship, phone, email, address, created_at";
const TEACHER_COLS: &str = "id, student_id, full_name, school_name, email, phone, created_at";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGuardian {
    pub full_name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTeacher {
    pub full_name: String,
    pub school_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

fn row_to_guardian(row: &libsql::Row) -> Result<Guardian, DatabaseError> {
    Ok(Guardian {
        id: row.get(0)?,
        student_id: row.get(1)?,
        full_name: row.get(2)?,
        relationship: row.get(3)?,
        phone: row.get(4)?,
        email: get_opt_string(row, 5)?,
        address: get_opt_string(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

fn row_to_teacher(row: &libsql::Row) -> Result<Teacher, DatabaseError> {
    Ok(Teacher {
        id: row.get(0)?,
        student_id: row.get(1)?,
        full_name: row.get(2)?,
        school_name: row.get(3)?,
        email: get_opt_string(row, 4)?,
        phone: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl ProgramService {
    async fn student_chapter_guard(&self, actor: &Actor, student_id: &str) -> Result<(), DatabaseError> {
        let student = self.get_student(student_id).await?;
        actor.ensure_chapter(student.chapter_id())?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Validation` when the name, relationship or phone is blank.
    pub async fn add_guardian(
        &self,
        actor: &Actor,
        student_id: &str,
        new: NewGuardian,
    ) -> Result<Guardian, DatabaseError> {
        self.student_chapter_guard(actor, student_id).await?;
        let guardian = Guardian {
            id: self.db().generate_id(PREFIX_GUARDIAN).await?,
            student_id: student_id.to_string(),
            full_name: required("guardian name", &new.full_name)?,
            relationship: required("guardian relationship", &new.relationship)?,
            phone: required("guardian phone", &new.phone)?,
            email: non_empty(new.email.as_deref()),
            address: non_empty(new.address.as_deref()),
            created_at: Self::now(),
        };
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO guardians ({GUARDIAN_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
                libsql::params![
                    guardian.id.as_str(),
                    student_id,
                    guardian.full_name.as_str(),
                    guardian.relationship.as_str(),
                    guardian.phone.as_str(),
                    guardian.email.as_deref(),
                    guardian.address.as_deref(),
                    guardian.created_at.to_rfc3339()
                ],
            )
            .await?;
        self.audit(
            actor,
            EntityType::Guardian,
            &guardian.id,
            AuditAction::Created,
            Some(serde_json::json!({ "student_id": student_id })),
        )
        .await?;
        Ok(guardian)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_guardians(&self, student_id: &str) -> Result<Vec<Guardian>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {GUARDIAN_COLS} FROM guardians WHERE student_id = ?1 ORDER BY created_at"),
                [student_id],
            )
            .await?;
        let mut guardians = Vec::new();
        while let Some(row) = rows.next().await? {
            guardians.push(row_to_guardian(&row)?);
        }
        Ok(guardians)
    }

    /// # Errors
    ///
    /// Returns `NoResult` for an unknown guardian.
    pub async fn remove_guardian(&self, actor: &Actor, id: &str) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {GUARDIAN_COLS} FROM guardians WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let guardian = row_to_guardian(&row)?;
        self.student_chapter_guard(actor, &guardian.student_id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM guardians WHERE id = ?1", [id])
            .await?;
        self.audit(actor, EntityType::Guardian, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Validation` when the name or school is blank.
    pub async fn add_teacher(
        &self,
        actor: &Actor,
        student_id: &str,
        new: NewTeacher,
    ) -> Result<Teacher, DatabaseError> {
        self.student_chapter_guard(actor, student_id).await?;
        let teacher = Teacher {
            id: self.db().generate_id(PREFIX_TEACHER).await?,
            student_id: student_id.to_string(),
            full_name: required("teacher name", &new.full_name)?,
            school_name: required("school name", &new.school_name)?,
            email: non_empty(new.email.as_deref()),
            phone: non_empty(new.phone.as_deref()),
            created_at: Self::now(),
        };
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO teachers ({TEACHER_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                libsql::params![
                    teacher.id.as_str(),
                    student_id,
                    teacher.full_name.as_str(),
                    teacher.school_name.as_str(),
                    teacher.email.as_deref(),
                    teacher.phone.as_deref(),
                    teacher.created_at.to_rfc3339()
                ],
            )
            .await?;
        self.audit(
            actor,
            EntityType::Teacher,
            &teacher.id,
            AuditAction::Created,
            Some(serde_json::json!({ "student_id": student_id })),
        )
        .await?;
        Ok(teacher)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_teachers(&self, student_id: &str) -> Result<Vec<Teacher>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {TEACHER_COLS} FROM teachers WHERE student_id = ?1 ORDER BY created_at"),
                [student_id],
            )
            .await?;
        let mut teachers = Vec::new();
        while let Some(row) = rows.next().await? {
            teachers.push(row_to_teacher(&row)?);
        }
        Ok(teachers)
    }

    /// # Errors
    ///
    /// Returns `NoResult` for an unknown teacher.
    pub async fn remove_teacher(&self, actor: &Actor, id: &str) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {TEACHER_COLS} FROM teachers WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let teacher = row_to_teacher(&row)?;
        self.student_chapter_guard(actor, &teacher.student_id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM teachers WHERE id = ?1", [id])
            .await?;
        self.audit(actor, EntityType::Teacher, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, chapter, student, test_service};

    #[tokio::test]
    async fn guardians_add_list_remove() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let s = student(&svc, c.id(), "Tran").await;

        let g = svc
            .add_guardian(
                &admin(),
                s.id(),
                NewGuardian {
                    full_name: "Linh Tran".into(),
                    relationship: "Mother".into(),
                    phone: "0400 111 222".into(),
                    email: Some(" ".into()),
                    address: None,
                },
            )
            .await
            .unwrap();
        assert!(g.email.is_none());
        assert_eq!(svc.list_guardians(s.id()).await.unwrap(), vec![g.clone()]);

        svc.remove_guardian(&admin(), &g.id).await.unwrap();
        assert!(svc.list_guardians(s.id()).await.unwrap().is_empty());
        assert!(svc.remove_guardian(&admin(), &g.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn teacher_requires_school() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let s = student(&svc, c.id(), "Tran").await;
        let bad = NewTeacher {
            full_name: "Ms Park".into(),
            ..NewTeacher::default()
        };
        assert!(svc.add_teacher(&admin(), s.id(), bad).await.is_err());

        let t = svc
            .add_teacher(
                &admin(),
                s.id(),
                NewTeacher {
                    full_name: "Ms Park".into(),
                    school_name: "Carlton Primary".into(),
                    ..NewTeacher::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(svc.list_teachers(s.id()).await.unwrap().len(), 1);
        svc.remove_teacher(&admin(), &t.id).await.unwrap();
        assert!(svc.list_teachers(s.id()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_chapter_coordinator_refused() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let s = student(&svc, c.id(), "Tran").await;
        let err = svc
            .add_guardian(
                &Actor::coordinator("ops-9", vec!["chp-other".into()]),
                s.id(),
                NewGuardian::default(),
            )
            .await
            .unwrap_err();
        assert!(err.is_forbidden());
    }
}
