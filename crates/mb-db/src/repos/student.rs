//! Student repository.

use mb_core::access::Actor;
use mb_core::entities::{NewStudent, Student, StudentProfileUpdate, StudentSnapshot};
use mb_core::enums::{AuditAction, EntityType, SortDirection};
use mb_core::ids::PREFIX_STUDENT;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_date, get_bool, get_opt_string, parse_datetime, parse_optional_date,
    parse_optional_datetime, parse_optional_value, to_detail, to_optional_json,
};
use crate::repos::assignment::ensure_unassigned;
use crate::query::{ArchiveFilter, Page, PageRequest, StudentSort, WhereClause, order_clause};
use crate::service::ProgramService;

pub(crate) const SELECT_COLS: &str = "id, chapter_id, first_name, last_name, preferred_name, \
     date_of_birth, year_level, school_name, address, allergies, emergency_contact, \
     photo_consent, end_date, end_reason, created_at, updated_at";

pub(crate) fn row_to_student(row: &libsql::Row) -> Result<Student, DatabaseError> {
    let year_level = row
        .get::<Option<i64>>(6)?
        .map(|y| {
            u8::try_from(y)
                .map_err(|_| DatabaseError::Query(format!("year level {y} out of range")))
        })
        .transpose()?;
    let snapshot = StudentSnapshot {
        id: row.get(0)?,
        chapter_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        preferred_name: get_opt_string(row, 4)?,
        date_of_birth: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        year_level,
        school_name: get_opt_string(row, 7)?,
        address: parse_optional_value(row, 8)?,
        allergies: get_opt_string(row, 9)?,
        emergency_contact: parse_optional_value(row, 10)?,
        photo_consent: get_bool(row, 11)?,
        end_date: parse_optional_datetime(get_opt_string(row, 12)?.as_deref())?,
        end_reason: get_opt_string(row, 13)?,
        created_at: parse_datetime(&row.get::<String>(14)?)?,
        updated_at: parse_datetime(&row.get::<String>(15)?)?,
    };
    Ok(Student::restore(snapshot)?)
}

fn student_params(s: &Student) -> Result<Vec<libsql::Value>, DatabaseError> {
    let opt = |v: Option<String>| v.map_or(libsql::Value::Null, libsql::Value::Text);
    Ok(vec![
        s.id().into(),
        s.chapter_id().into(),
        s.first_name().into(),
        s.last_name().into(),
        opt(s.preferred_name().map(String::from)),
        opt(s.date_of_birth().map(fmt_date)),
        s.year_level()
            .map_or(libsql::Value::Null, |y| libsql::Value::Integer(i64::from(y))),
        opt(s.school_name().map(String::from)),
        opt(to_optional_json(s.address())?),
        opt(s.allergies().map(String::from)),
        opt(to_optional_json(s.emergency_contact())?),
        libsql::Value::Integer(i64::from(s.photo_consent())),
        opt(s.end_date().map(|d| d.to_rfc3339())),
        opt(s.end_reason().map(String::from)),
        s.created_at().to_rfc3339().into(),
        s.updated_at().to_rfc3339().into(),
    ])
}

/// Filter and ordering for [`ProgramService::list_students`].
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub chapter_id: Option<String>,
    /// Matched against first, last, and preferred name and school.
    pub search: Option<String>,
    pub year_level: Option<u8>,
    pub archive: ArchiveFilter,
    pub sort: StudentSort,
    pub direction: SortDirection,
}

impl ProgramService {
    /// Enrol a student in a chapter.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the actor manages the chapter, `NoResult`
    /// for an unknown chapter, and `Validation` for bad input.
    pub async fn create_student(&self, actor: &Actor, new: NewStudent) -> Result<Student, DatabaseError> {
        actor.ensure_chapter(&new.chapter_id)?;
        self.get_chapter(&new.chapter_id).await?;

        let id = self.db().generate_id(PREFIX_STUDENT).await?;
        let student = Student::enrol(id, new, Self::now())?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO students ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"
                ),
                libsql::params_from_iter(student_params(&student)?),
            )
            .await?;

        self.audit(actor, EntityType::Student, student.id(), AuditAction::Created, None)
            .await?;
        tracing::info!(student = student.id(), chapter = student.chapter_id(), "student enrolled");
        Ok(student)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no student has this ID.
    pub async fn get_student(&self, id: &str) -> Result<Student, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM students WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_student(&row)
    }

    /// Paged, filtered, sorted student listing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_students(
        &self,
        filter: &StudentFilter,
        page: PageRequest,
    ) -> Result<Page<Student>, DatabaseError> {
        let mut clause = WhereClause::default();
        if let Some(ref chapter_id) = filter.chapter_id {
            clause.bind("chapter_id = {}", chapter_id.as_str());
        }
        if let Some(year) = filter.year_level {
            clause.bind("year_level = {}", i64::from(year));
        }
        clause.archive(filter.archive);
        if let Some(ref term) = filter.search {
            if !term.trim().is_empty() {
                clause.search(&["first_name", "last_name", "preferred_name", "school_name"], term);
            }
        }

        let total = self.count("students", &clause).await?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM students {} {} {}",
            clause.sql(),
            order_clause(filter.sort.column(), filter.direction),
            page.limit_clause()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(clause.params()))
            .await?;
        let mut students = Vec::new();
        while let Some(row) = rows.next().await? {
            students.push(row_to_student(&row)?);
        }
        Ok(Page::new(students, total, page))
    }

    async fn save_student(&self, student: &Student) -> Result<(), DatabaseError> {
        let mut params = student_params(student)?;
        let id = params.remove(0);
        params.push(id);
        self.db()
            .conn()
            .execute(
                "UPDATE students SET chapter_id = ?1, first_name = ?2, last_name = ?3,
                     preferred_name = ?4, date_of_birth = ?5, year_level = ?6, school_name = ?7,
                     address = ?8, allergies = ?9, emergency_contact = ?10, photo_consent = ?11,
                     end_date = ?12, end_reason = ?13, created_at = ?14, updated_at = ?15
                 WHERE id = ?16",
                libsql::params_from_iter(params),
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Forbidden`, `NoResult`, or `Validation`.
    pub async fn update_student(
        &self,
        actor: &Actor,
        id: &str,
        update: StudentProfileUpdate,
    ) -> Result<Student, DatabaseError> {
        let mut student = self.get_student(id).await?;
        actor.ensure_chapter(student.chapter_id())?;
        if update.is_empty() {
            return Ok(student);
        }
        student.update_profile(&update, Self::now())?;
        self.save_student(&student).await?;
        self.audit(actor, EntityType::Student, id, AuditAction::Updated, Some(to_detail(&update)?))
            .await?;
        Ok(student)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank reason and `InvalidTransition` if the
    /// student is already archived.
    pub async fn archive_student(
        &self,
        actor: &Actor,
        id: &str,
        reason: &str,
    ) -> Result<Student, DatabaseError> {
        let mut student = self.get_student(id).await?;
        actor.ensure_chapter(student.chapter_id())?;
        student.archive(reason, Self::now())?;
        self.save_student(&student).await?;
        self.audit(
            actor,
            EntityType::Student,
            id,
            AuditAction::Archived,
            Some(serde_json::json!({ "reason": student.end_reason() })),
        )
        .await?;
        Ok(student)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` if the student is active.
    pub async fn unarchive_student(&self, actor: &Actor, id: &str) -> Result<Student, DatabaseError> {
        let mut student = self.get_student(id).await?;
        actor.ensure_chapter(student.chapter_id())?;
        student.unarchive(Self::now())?;
        self.save_student(&student).await?;
        self.audit(actor, EntityType::Student, id, AuditAction::Unarchived, None)
            .await?;
        Ok(student)
    }

    /// Move a student to another chapter. The actor must manage both.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden`, `NoResult` for an unknown student or chapter, or
    /// `InvalidState` while the student still has assignments.
    pub async fn move_student(
        &self,
        actor: &Actor,
        id: &str,
        chapter_id: &str,
    ) -> Result<Student, DatabaseError> {
        let mut student = self.get_student(id).await?;
        actor.ensure_chapter(student.chapter_id())?;
        actor.ensure_chapter(chapter_id)?;
        self.get_chapter(chapter_id).await?;

        let from = student.chapter_id().to_string();
        if student.move_to_chapter(chapter_id, Self::now())? {
            let tx = self.db().conn().transaction().await?;
            ensure_unassigned(&tx, "student_id", id).await?;
            tx.execute(
                "UPDATE students SET chapter_id = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![chapter_id, student.updated_at().to_rfc3339(), id],
            )
            .await?;
            tx.commit().await?;
            self.audit(
                actor,
                EntityType::Student,
                id,
                AuditAction::Moved,
                Some(serde_json::json!({ "from": from, "to": chapter_id })),
            )
            .await?;
        }
        Ok(student)
    }
}
