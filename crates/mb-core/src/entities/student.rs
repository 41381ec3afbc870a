use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::values::{Address, EmergencyContact, non_empty, required};

const ENTITY: &str = "student";

/// A program participant mentored over recurring sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "StudentSnapshot")]
pub struct Student {
    id: String,
    chapter_id: String,
    first_name: String,
    last_name: String,
    preferred_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    year_level: Option<u8>,
    school_name: Option<String>,
    address: Option<Address>,
    allergies: Option<String>,
    emergency_contact: Option<EmergencyContact>,
    photo_consent: bool,
    end_date: Option<DateTime<Utc>>,
    end_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Flat form of a [`Student`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StudentSnapshot {
    pub id: String,
    pub chapter_id: String,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub year_level: Option<u8>,
    pub school_name: Option<String>,
    pub address: Option<Address>,
    pub allergies: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub photo_consent: bool,
    pub end_date: Option<DateTime<Utc>>,
    pub end_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for enrolling a new student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewStudent {
    pub chapter_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub year_level: Option<u8>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub photo_consent: bool,
}

/// Partial profile update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_level: Option<Option<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Option<EmergencyContact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_consent: Option<bool>,
}

impl StudentProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.preferred_name.is_none()
            && self.date_of_birth.is_none()
            && self.year_level.is_none()
            && self.school_name.is_none()
            && self.address.is_none()
            && self.allergies.is_none()
            && self.emergency_contact.is_none()
            && self.photo_consent.is_none()
    }
}

fn check_year_level(year_level: Option<u8>) -> Result<Option<u8>, CoreError> {
    match year_level {
        Some(y) if !(1..=12).contains(&y) => Err(CoreError::Validation(format!(
            "year level must be between 1 and 12, got {y}"
        ))),
        other => Ok(other),
    }
}

impl Student {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank names/chapter or a year level
    /// outside 1..=12.
    pub fn enrol(id: String, new: NewStudent, now: DateTime<Utc>) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            chapter_id: required("chapter", &new.chapter_id)?,
            first_name: required("first name", &new.first_name)?,
            last_name: required("last name", &new.last_name)?,
            preferred_name: non_empty(new.preferred_name.as_deref()),
            date_of_birth: new.date_of_birth,
            year_level: check_year_level(new.year_level)?,
            school_name: non_empty(new.school_name.as_deref()),
            address: new.address,
            allergies: non_empty(new.allergies.as_deref()),
            emergency_contact: new.emergency_contact,
            photo_consent: new.photo_consent,
            end_date: None,
            end_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the stored record breaks an invariant.
    pub fn restore(s: StudentSnapshot) -> Result<Self, CoreError> {
        if s.end_date.is_some() != s.end_reason.is_some() {
            return Err(CoreError::Validation(format!(
                "student {} has inconsistent archive fields",
                s.id
            )));
        }
        Ok(Self {
            chapter_id: required("chapter", &s.chapter_id)?,
            first_name: required("first name", &s.first_name)?,
            last_name: required("last name", &s.last_name)?,
            year_level: check_year_level(s.year_level)?,
            id: s.id,
            preferred_name: s.preferred_name,
            date_of_birth: s.date_of_birth,
            school_name: s.school_name,
            address: s.address,
            allergies: s.allergies,
            emergency_contact: s.emergency_contact,
            photo_consent: s.photo_consent,
            end_date: s.end_date,
            end_reason: s.end_reason,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> StudentSnapshot {
        self.clone().into()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn chapter_id(&self) -> &str {
        &self.chapter_id
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub fn preferred_name(&self) -> Option<&str> {
        self.preferred_name.as_deref()
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        let first = self.preferred_name.as_deref().unwrap_or(&self.first_name);
        format!("{first} {}", self.last_name)
    }

    #[must_use]
    pub const fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    #[must_use]
    pub const fn year_level(&self) -> Option<u8> {
        self.year_level
    }

    #[must_use]
    pub fn school_name(&self) -> Option<&str> {
        self.school_name.as_deref()
    }

    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    #[must_use]
    pub fn allergies(&self) -> Option<&str> {
        self.allergies.as_deref()
    }

    #[must_use]
    pub const fn emergency_contact(&self) -> Option<&EmergencyContact> {
        self.emergency_contact.as_ref()
    }

    #[must_use]
    pub const fn photo_consent(&self) -> bool {
        self.photo_consent
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.end_date.is_some()
    }

    #[must_use]
    pub const fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
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
    /// Returns `CoreError::Validation` for a blank reason and
    /// `CoreError::InvalidTransition` if already archived.
    pub fn archive(&mut self, reason: &str, now: DateTime<Utc>) -> Result<(), CoreError> {
        let reason = required("end reason", reason)?;
        if self.is_archived() {
            return Err(CoreError::transition(ENTITY, &self.id, "archived", "archived"));
        }
        self.end_date = Some(now);
        self.end_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the student is active.
    pub fn unarchive(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        if !self.is_archived() {
            return Err(CoreError::transition(ENTITY, &self.id, "active", "active"));
        }
        self.end_date = None;
        self.end_reason = None;
        self.updated_at = now;
        Ok(())
    }

    /// Returns whether the chapter changed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank chapter ID.
    pub fn move_to_chapter(&mut self, chapter_id: &str, now: DateTime<Utc>) -> Result<bool, CoreError> {
        let chapter_id = required("chapter", chapter_id)?;
        if chapter_id == self.chapter_id {
            return Ok(false);
        }
        self.chapter_id = chapter_id;
        self.updated_at = now;
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a name would become blank or the
    /// year level falls outside 1..=12.
    pub fn update_profile(
        &mut self,
        update: &StudentProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if update.is_empty() {
            return Ok(());
        }
        if let Some(year_level) = update.year_level {
            self.year_level = check_year_level(year_level)?;
        }
        if let Some(ref first) = update.first_name {
            self.first_name = required("first name", first)?;
        }
        if let Some(ref last) = update.last_name {
            self.last_name = required("last name", last)?;
        }
        if let Some(ref preferred) = update.preferred_name {
            self.preferred_name = non_empty(preferred.as_deref());
        }
        if let Some(dob) = update.date_of_birth {
            self.date_of_birth = dob;
        }
        if let Some(ref school) = update.school_name {
            self.school_name = non_empty(school.as_deref());
        }
        if let Some(ref address) = update.address {
            self.address.clone_from(address);
        }
        if let Some(ref allergies) = update.allergies {
            self.allergies = non_empty(allergies.as_deref());
        }
        if let Some(ref contact) = update.emergency_contact {
            self.emergency_contact.clone_from(contact);
        }
        if let Some(consent) = update.photo_consent {
            self.photo_consent = consent;
        }
        self.updated_at = now;
        Ok(())
    }
}

impl From<Student> for StudentSnapshot {
    fn from(s: Student) -> Self {
        Self {
            id: s.id,
            chapter_id: s.chapter_id,
            first_name: s.first_name,
            last_name: s.last_name,
            preferred_name: s.preferred_name,
            date_of_birth: s.date_of_birth,
            year_level: s.year_level,
            school_name: s.school_name,
            address: s.address,
            allergies: s.allergies,
            emergency_contact: s.emergency_contact,
            photo_consent: s.photo_consent,
            end_date: s.end_date,
            end_reason: s.end_reason,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
