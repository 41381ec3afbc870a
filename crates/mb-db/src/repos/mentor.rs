//! Mentor repository.
//!
//! Every write loads the aggregate, applies the change through its methods
//! (which enforce the email lock and archive rules), then stores the whole row.

use mb_core::access::Actor;
use mb_core::entities::{Mentor, MentorProfileUpdate, MentorSnapshot, NewMentor};
use mb_core::enums::{AuditAction, EntityType, SortDirection};
use mb_core::ids::PREFIX_MENTOR;
use mb_core::values::Email;

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_date, get_opt_string, parse_datetime, parse_optional_date, parse_optional_datetime,
    parse_optional_value, to_detail, to_optional_json, unique_violation,
};
use crate::repos::assignment::ensure_unassigned;
use crate::query::{ArchiveFilter, MentorSort, Page, PageRequest, WhereClause, order_clause};
use crate::service::ProgramService;

pub(crate) const SELECT_COLS: &str = "id, chapter_id, email, auth_subject, first_name, last_name, \
     preferred_name, mobile, date_of_birth, address, emergency_contact, next_of_kin, \
     profile_picture_path, end_date, end_reason, created_at, updated_at";

pub(crate) fn row_to_mentor(row: &libsql::Row) -> Result<Mentor, DatabaseError> {
    let snapshot = MentorSnapshot {
        id: row.get(0)?,
        chapter_id: row.get(1)?,
        email: Email::parse(&row.get::<String>(2)?)?,
        auth_subject: get_opt_string(row, 3)?,
        first_name: row.get(4)?,
        last_name: row.get(5)?,
        preferred_name: get_opt_string(row, 6)?,
        mobile: get_opt_string(row, 7)?,
        date_of_birth: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        address: parse_optional_value(row, 9)?,
        emergency_contact: parse_optional_value(row, 10)?,
        next_of_kin: parse_optional_value(row, 11)?,
        profile_picture_path: get_opt_string(row, 12)?,
        end_date: parse_optional_datetime(get_opt_string(row, 13)?.as_deref())?,
        end_reason: get_opt_string(row, 14)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    };
    Ok(Mentor::restore(snapshot)?)
}

fn mentor_params(m: &Mentor) -> Result<Vec<libsql::Value>, DatabaseError> {
    let opt = |v: Option<String>| v.map_or(libsql::Value::Null, libsql::Value::Text);
    Ok(vec![
        m.id().into(),
        m.chapter_id().into(),
        m.email().as_str().into(),
        opt(m.auth_subject().map(String::from)),
        m.first_name().into(),
        m.last_name().into(),
        opt(m.preferred_name().map(String::from)),
        opt(m.mobile().map(String::from)),
        opt(m.date_of_birth().map(fmt_date)),
        opt(to_optional_json(m.address())?),
        opt(to_optional_json(m.emergency_contact())?),
        opt(to_optional_json(m.next_of_kin())?),
        opt(m.profile_picture_path().map(String::from)),
        opt(m.end_date().map(|d| d.to_rfc3339())),
        opt(m.end_reason().map(String::from)),
        m.created_at().to_rfc3339().into(),
        m.updated_at().to_rfc3339().into(),
    ])
}

/// Filter and ordering for [`ProgramService::list_mentors`].
#[derive(Debug, Clone, Default)]
pub struct MentorFilter {
    pub chapter_id: Option<String>,
    /// Matched against first, last, preferred name and email.
    pub search: Option<String>,
    pub archive: ArchiveFilter,
    pub sort: MentorSort,
    pub direction: SortDirection,
}

impl ProgramService {
    /// Register a mentor in a chapter.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` unless the actor manages the chapter, `NoResult`
    /// for an unknown chapter, and `InvalidState` if the email is taken.
    pub async fn create_mentor(&self, actor: &Actor, new: NewMentor) -> Result<Mentor, DatabaseError> {
        actor.ensure_chapter(&new.chapter_id)?;
        self.get_chapter(&new.chapter_id).await?;

        let id = self.db().generate_id(PREFIX_MENTOR).await?;
        let mentor = Mentor::register(id, new, Self::now())?;
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO mentors ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
                ),
                libsql::params_from_iter(mentor_params(&mentor)?),
            )
            .await
            .map_err(|e| unique_violation(e, || format!("email {} is already registered", mentor.email())))?;

        self.audit(actor, EntityType::Mentor, mentor.id(), AuditAction::Created, None)
            .await?;
        tracing::info!(mentor = mentor.id(), chapter = mentor.chapter_id(), "mentor registered");
        Ok(mentor)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no mentor has this ID.
    pub async fn get_mentor(&self, id: &str) -> Result<Mentor, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM mentors WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_mentor(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no mentor has this email.
    pub async fn get_mentor_by_email(&self, email: &Email) -> Result<Mentor, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM mentors WHERE email = ?1"),
                [email.as_str()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_mentor(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no mentor is linked to `subject`.
    pub async fn get_mentor_by_subject(&self, subject: &str) -> Result<Mentor, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM mentors WHERE auth_subject = ?1"),
                [subject],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_mentor(&row)
    }

    /// Paged, filtered, sorted mentor listing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_mentors(
        &self,
        filter: &MentorFilter,
        page: PageRequest,
    ) -> Result<Page<Mentor>, DatabaseError> {
        let mut clause = WhereClause::default();
        if let Some(ref chapter_id) = filter.chapter_id {
            clause.bind("chapter_id = {}", chapter_id.as_str());
        }
        clause.archive(filter.archive);
        if let Some(ref term) = filter.search {
            if !term.trim().is_empty() {
                clause.search(&["first_name", "last_name", "preferred_name", "email"], term);
            }
        }

        let total = self.count("mentors", &clause).await?;
        let sql = format!(
            "SELECT {SELECT_COLS} FROM mentors {} {} {}",
            clause.sql(),
            order_clause(filter.sort.column(), filter.direction),
            page.limit_clause()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(clause.params()))
            .await?;
        let mut mentors = Vec::new();
        while let Some(row) = rows.next().await? {
            mentors.push(row_to_mentor(&row)?);
        }
        Ok(Page::new(mentors, total, page))
    }

    pub(crate) async fn count(&self, table: &str, clause: &WhereClause) -> Result<u64, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT COUNT(*) FROM {table} {}", clause.sql()),
                libsql::params_from_iter(clause.params()),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let n: i64 = row.get(0)?;
        Ok(u64::try_from(n).unwrap_or_default())
    }

    async fn save_mentor(&self, mentor: &Mentor) -> Result<(), DatabaseError> {
        let mut params = mentor_params(mentor)?;
        // Move the id from the first slot to the WHERE clause.
        let id = params.remove(0);
        params.push(id);
        self.db()
            .conn()
            .execute(
                "UPDATE mentors SET chapter_id = ?1, email = ?2, auth_subject = ?3, first_name = ?4,
                     last_name = ?5, preferred_name = ?6, mobile = ?7, date_of_birth = ?8,
                     address = ?9, emergency_contact = ?10, next_of_kin = ?11,
                     profile_picture_path = ?12, end_date = ?13, end_reason = ?14,
                     created_at = ?15, updated_at = ?16
                 WHERE id = ?17",
                libsql::params_from_iter(params),
            )
            .await
            .map_err(|e| {
                unique_violation(e, || {
                    format!("email {} or identity is already in use", mentor.email())
                })
            })?;
        Ok(())
    }

    /// Apply a profile update. Mentors may edit their own profile.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden`, `NoResult`, or `Validation`.
    pub async fn update_mentor(
        &self,
        actor: &Actor,
        id: &str,
        update: MentorProfileUpdate,
    ) -> Result<Mentor, DatabaseError> {
        let mut mentor = self.get_mentor(id).await?;
        actor.ensure_mentor_or_chapter(id, mentor.chapter_id())?;
        if update.is_empty() {
            return Ok(mentor);
        }
        mentor.update_profile(&update, Self::now())?;
        self.save_mentor(&mentor).await?;
        self.audit(actor, EntityType::Mentor, id, AuditAction::Updated, Some(to_detail(&update)?))
            .await?;
        Ok(mentor)
    }

    /// Change a mentor's email.
    ///
    /// # Errors
    ///
    /// Returns `Core(EmailLocked)` once an identity is linked, `InvalidState`
    /// if the address belongs to another mentor, plus the usual access errors.
    pub async fn change_mentor_email(
        &self,
        actor: &Actor,
        id: &str,
        email: Email,
    ) -> Result<Mentor, DatabaseError> {
        let mut mentor = self.get_mentor(id).await?;
        actor.ensure_mentor_or_chapter(id, mentor.chapter_id())?;
        let previous = mentor.email().clone();
        if !mentor.change_email(email, Self::now())? {
            return Ok(mentor);
        }
        self.save_mentor(&mentor).await?;
        self.audit(
            actor,
            EntityType::Mentor,
            id,
            AuditAction::EmailChanged,
            Some(serde_json::json!({ "from": previous.as_str(), "to": mentor.email().as_str() })),
        )
        .await?;
        Ok(mentor)
    }

    /// Link an external identity subject to a mentor. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if linked to a different subject, and
    /// `InvalidState` if the subject belongs to another mentor.
    pub async fn link_mentor_identity(
        &self,
        actor: &Actor,
        id: &str,
        subject: &str,
    ) -> Result<Mentor, DatabaseError> {
        actor.ensure_admin()?;
        let mut mentor = self.get_mentor(id).await?;
        if mentor.link_identity(subject, Self::now())? {
            self.save_mentor(&mentor).await?;
            self.audit(
                actor,
                EntityType::Mentor,
                id,
                AuditAction::IdentityLinked,
                Some(serde_json::json!({ "subject": mentor.auth_subject() })),
            )
            .await?;
        }
        Ok(mentor)
    }

    /// Remove the linked identity, unlocking the email. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or `NoResult`.
    pub async fn unlink_mentor_identity(&self, actor: &Actor, id: &str) -> Result<Mentor, DatabaseError> {
        actor.ensure_admin()?;
        let mut mentor = self.get_mentor(id).await?;
        if mentor.unlink_identity(Self::now()) {
            self.save_mentor(&mentor).await?;
            self.audit(
                actor,
                EntityType::Mentor,
                id,
                AuditAction::IdentityLinked,
                Some(serde_json::json!({ "subject": null })),
            )
            .await?;
        }
        Ok(mentor)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank reason and `InvalidTransition` if the
    /// mentor is already archived.
    pub async fn archive_mentor(
        &self,
        actor: &Actor,
        id: &str,
        reason: &str,
    ) -> Result<Mentor, DatabaseError> {
        let mut mentor = self.get_mentor(id).await?;
        actor.ensure_chapter(mentor.chapter_id())?;
        mentor.archive(reason, Self::now())?;
        self.save_mentor(&mentor).await?;
        self.audit(
            actor,
            EntityType::Mentor,
            id,
            AuditAction::Archived,
            Some(serde_json::json!({ "reason": mentor.end_reason() })),
        )
        .await?;
        Ok(mentor)
    }

    /// # Errors
    ///
    /// Returns `InvalidTransition` if the mentor is active.
    pub async fn unarchive_mentor(&self, actor: &Actor, id: &str) -> Result<Mentor, DatabaseError> {
        let mut mentor = self.get_mentor(id).await?;
        actor.ensure_chapter(mentor.chapter_id())?;
        mentor.unarchive(Self::now())?;
        self.save_mentor(&mentor).await?;
        self.audit(actor, EntityType::Mentor, id, AuditAction::Unarchived, None)
            .await?;
        Ok(mentor)
    }

    /// Move a mentor to another chapter. The actor must manage both.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden`, `NoResult` for an unknown mentor or chapter, or
    /// `InvalidState` while the mentor still has assignments.
    pub async fn move_mentor(
        &self,
        actor: &Actor,
        id: &str,
        chapter_id: &str,
    ) -> Result<Mentor, DatabaseError> {
        let mut mentor = self.get_mentor(id).await?;
        actor.ensure_chapter(mentor.chapter_id())?;
        actor.ensure_chapter(chapter_id)?;
        self.get_chapter(chapter_id).await?;

        let from = mentor.chapter_id().to_string();
        if mentor.move_to_chapter(chapter_id, Self::now())? {
            let tx = self.db().conn().transaction().await?;
            ensure_unassigned(&tx, "mentor_id", id).await?;
            tx.execute(
                "UPDATE mentors SET chapter_id = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![chapter_id, mentor.updated_at().to_rfc3339(), id],
            )
            .await?;
            tx.commit().await?;
            self.audit(
                actor,
                EntityType::Mentor,
                id,
                AuditAction::Moved,
                Some(serde_json::json!({ "from": from, "to": chapter_id })),
            )
            .await?;
        }
        Ok(mentor)
    }
}
