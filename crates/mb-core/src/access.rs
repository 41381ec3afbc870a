//! Role-based access rules.
//!
//! The identity provider is external; by the time a request reaches the
//! service layer it has been reduced to an [`Actor`]. Every mutation in
//! `mb-db` checks one of the `ensure_*` rules before touching the database.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;
use crate::errors::CoreError;

/// The user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Actor {
    /// Mentor ID for mentors, or an opaque operator ID for staff.
    pub id: String,
    pub role: Role,
    /// Chapters a coordinator manages. Ignored for other roles.
    #[serde(default)]
    pub chapter_ids: Vec<String>,
}

impl Actor {
    #[must_use]
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Admin,
            chapter_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn coordinator(id: impl Into<String>, chapter_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::ChapterCoordinator,
            chapter_ids,
        }
    }

    #[must_use]
    pub fn mentor(mentor_id: impl Into<String>) -> Self {
        Self {
            id: mentor_id.into(),
            role: Role::Mentor,
            chapter_ids: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Whether this actor manages `chapter_id` (admins manage all chapters).
    #[must_use]
    pub fn manages_chapter(&self, chapter_id: &str) -> bool {
        match self.role {
            Role::Admin => true,
            Role::ChapterCoordinator => self.chapter_ids.iter().any(|c| c == chapter_id),
            Role::Mentor => false,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` unless the actor is an admin.
    pub fn ensure_admin(&self) -> Result<(), CoreError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "{} {} is not an admin",
                self.role, self.id
            )))
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` unless the actor manages `chapter_id`.
    pub fn ensure_chapter(&self, chapter_id: &str) -> Result<(), CoreError> {
        if self.manages_chapter(chapter_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "{} {} cannot manage chapter {chapter_id}",
                self.role, self.id
            )))
        }
    }

    /// Allow the mentor themself, or anyone who manages the chapter.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Forbidden` otherwise.
    pub fn ensure_mentor_or_chapter(
        &self,
        mentor_id: &str,
        chapter_id: &str,
    ) -> Result<(), CoreError> {
        if self.role == Role::Mentor && self.id == mentor_id {
            return Ok(());
        }
        self.ensure_chapter(chapter_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_passes_every_rule() {
        let admin = Actor::admin("ops-1");
        assert!(admin.ensure_admin().is_ok());
        assert!(admin.ensure_chapter("chp-1").is_ok());
        assert!(admin.ensure_mentor_or_chapter("mtr-1", "chp-1").is_ok());
    }

    #[test]
    fn coordinator_scoped_to_chapters() {
        let coord = Actor::coordinator("ops-2", vec!["chp-1".into()]);
        assert!(coord.ensure_admin().is_err());
        assert!(coord.ensure_chapter("chp-1").is_ok());
        assert!(matches!(
            coord.ensure_chapter("chp-2"),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn mentor_only_acts_on_self() {
        let mentor = Actor::mentor("mtr-1");
        assert!(mentor.ensure_mentor_or_chapter("mtr-1", "chp-1").is_ok());
        assert!(mentor.ensure_mentor_or_chapter("mtr-2", "chp-1").is_err());
        assert!(mentor.ensure_chapter("chp-1").is_err());
    }

    #[test]
    fn coordinator_cannot_impersonate_mentor() {
        let coord = Actor::coordinator("mtr-1", vec![]);
        assert!(coord.ensure_mentor_or_chapter("mtr-1", "chp-1").is_err());
    }
}
