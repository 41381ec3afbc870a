//! Chapter repository.

use mb_core::access::Actor;
use mb_core::entities::{Chapter, ChapterSnapshot};
use mb_core::enums::{AuditAction, EntityType};
use mb_core::ids::PREFIX_CHAPTER;
use mb_core::values::Address;

use crate::error::DatabaseError;
use crate::helpers::{parse_datetime, parse_optional_value, to_detail, to_optional_json, unique_violation};
use crate::service::ProgramService;
use crate::updates::chapter::ChapterUpdate;

const SELECT_COLS: &str = "id, name, address, created_at, updated_at";

fn row_to_chapter(row: &libsql::Row) -> Result<Chapter, DatabaseError> {
    let snapshot = ChapterSnapshot {
        id: row.get(0)?,
        name: row.get(1)?,
        address: parse_optional_value(row, 2)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    };
    Ok(Chapter::try_from(snapshot)?)
}

impl ProgramService {
    /// Create a chapter. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins, `Validation` for a blank name, and
    /// `InvalidState` if the name is taken.
    pub async fn create_chapter(
        &self,
        actor: &Actor,
        name: &str,
        address: Option<Address>,
    ) -> Result<Chapter, DatabaseError> {
        actor.ensure_admin()?;
        let id = self.db().generate_id(PREFIX_CHAPTER).await?;
        let chapter = Chapter::new(id, name, address, Self::now())?;

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO chapters ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
                libsql::params![
                    chapter.id(),
                    chapter.name(),
                    to_optional_json(chapter.address())?,
                    chapter.created_at().to_rfc3339(),
                    chapter.updated_at().to_rfc3339()
                ],
            )
            .await
            .map_err(|e| unique_violation(e, || format!("chapter '{}' already exists", chapter.name())))?;

        self.audit(actor, EntityType::Chapter, chapter.id(), AuditAction::Created, None)
            .await?;
        tracing::info!(chapter = chapter.id(), name = chapter.name(), "chapter created");
        Ok(chapter)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no chapter has this ID.
    pub async fn get_chapter(&self, id: &str) -> Result<Chapter, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM chapters WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_chapter(&row)
    }

    /// Case-insensitive lookup by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no chapter has this name.
    pub async fn get_chapter_by_name(&self, name: &str) -> Result<Chapter, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM chapters WHERE name = ?1 COLLATE NOCASE"),
                [name.trim()],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_chapter(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_chapters(&self) -> Result<Vec<Chapter>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM chapters ORDER BY name COLLATE NOCASE"),
                (),
            )
            .await?;
        let mut chapters = Vec::new();
        while let Some(row) = rows.next().await? {
            chapters.push(row_to_chapter(&row)?);
        }
        Ok(chapters)
    }

    /// Rename and/or relocate a chapter. Coordinators may edit their own.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden`, `Validation` for a blank name, `NoResult`, or
    /// `InvalidState` if the new name is taken.
    pub async fn update_chapter(
        &self,
        actor: &Actor,
        id: &str,
        update: ChapterUpdate,
    ) -> Result<Chapter, DatabaseError> {
        actor.ensure_chapter(id)?;
        let mut chapter = self.get_chapter(id).await?;
        if update.is_empty() {
            return Ok(chapter);
        }

        let now = Self::now();
        if let Some(ref name) = update.name {
            chapter.rename(name, now)?;
        }
        if let Some(ref address) = update.address {
            chapter.relocate(address.clone(), now);
        }

        self.db()
            .conn()
            .execute(
                "UPDATE chapters SET name = ?1, address = ?2, updated_at = ?3 WHERE id = ?4",
                libsql::params![
                    chapter.name(),
                    to_optional_json(chapter.address())?,
                    now.to_rfc3339(),
                    id
                ],
            )
            .await
            .map_err(|e| unique_violation(e, || format!("chapter '{}' already exists", chapter.name())))?;

        self.audit(
            actor,
            EntityType::Chapter,
            id,
            AuditAction::Updated,
            Some(to_detail(&update)?),
        )
        .await?;
        Ok(chapter)
    }

    /// Delete an empty chapter. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` while mentors or students still belong to it.
    pub async fn delete_chapter(&self, actor: &Actor, id: &str) -> Result<(), DatabaseError> {
        actor.ensure_admin()?;
        self.get_chapter(id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT (SELECT COUNT(*) FROM mentors WHERE chapter_id = ?1),
                        (SELECT COUNT(*) FROM students WHERE chapter_id = ?1)",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mentors: i64 = row.get(0)?;
        let students: i64 = row.get(1)?;
        if mentors > 0 || students > 0 {
            return Err(DatabaseError::InvalidState(format!(
                "chapter {id} still has {mentors} mentor(s) and {students} student(s)"
            )));
        }

        self.db()
            .conn()
            .execute("DELETE FROM chapters WHERE id = ?1", [id])
            .await?;
        self.audit(actor, EntityType::Chapter, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, chapter, mentor, test_service};
    use crate::updates::chapter::ChapterUpdateBuilder;

    #[tokio::test]
    async fn create_get_and_list() {
        let svc = test_service().await;
        let carlton = chapter(&svc, "Carlton").await;
        chapter(&svc, "Ashburton").await;

        let fetched = svc.get_chapter(carlton.id()).await.unwrap();
        assert_eq!(fetched, carlton);
        let by_name = svc.get_chapter_by_name("CARLTON").await.unwrap();
        assert_eq!(by_name.id(), carlton.id());

        let names: Vec<String> = svc
            .list_chapters()
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["Ashburton", "Carlton"]);
    }

    #[tokio::test]
    async fn duplicate_name_is_invalid_state() {
        let svc = test_service().await;
        chapter(&svc, "Carlton").await;
        let err = svc.create_chapter(&admin(), "carlton", None).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn only_admin_creates() {
        let svc = test_service().await;
        let err = svc
            .create_chapter(&Actor::coordinator("ops-2", vec![]), "Carlton", None)
            .await
            .unwrap_err();
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn coordinator_updates_own_chapter() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let coord = Actor::coordinator("ops-2", vec![c.id().to_string()]);
        let address = Address::new("1 Main St", "Carlton", Some("VIC"), Some("3053")).unwrap();
        let updated = svc
            .update_chapter(
                &coord,
                c.id(),
                ChapterUpdateBuilder::new()
                    .name("Carlton North")
                    .address(Some(address.clone()))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name(), "Carlton North");
        assert_eq!(svc.get_chapter(c.id()).await.unwrap().address(), Some(&address));
    }

    #[tokio::test]
    async fn delete_requires_empty_chapter() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        mentor(&svc, c.id(), "jo@example.org").await;
        assert!(matches!(
            svc.delete_chapter(&admin(), c.id()).await,
            Err(DatabaseError::InvalidState(_))
        ));

        let empty = chapter(&svc, "Empty").await;
        svc.delete_chapter(&admin(), empty.id()).await.unwrap();
        assert!(svc.get_chapter(empty.id()).await.unwrap_err().is_not_found());
    }
}
