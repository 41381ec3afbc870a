use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::values::{Address, required};

/// A regional branch of the program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "ChapterSnapshot", into = "ChapterSnapshot")]
pub struct Chapter {
    id: String,
    name: String,
    address: Option<Address>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Flat form of a [`Chapter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChapterSnapshot {
    pub id: String,
    pub name: String,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the name is blank.
    pub fn new(
        id: String,
        name: &str,
        address: Option<Address>,
        now: DateTime<Utc>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            name: required("chapter name", name)?,
            address,
            created_at: now,
            updated_at: now,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the new name is blank.
    pub fn rename(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.name = required("chapter name", name)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn relocate(&mut self, address: Option<Address>, now: DateTime<Utc>) {
        self.address = address;
        self.updated_at = now;
    }
}

impl TryFrom<ChapterSnapshot> for Chapter {
    type Error = CoreError;

    fn try_from(s: ChapterSnapshot) -> Result<Self, Self::Error> {
        Ok(Self {
            name: required("chapter name", &s.name)?,
            id: s.id,
            address: s.address,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
    }
}

impl From<Chapter> for ChapterSnapshot {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id,
            name: c.name,
            address: c.address,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
