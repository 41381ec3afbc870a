use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::values::{Address, Email, EmergencyContact, NextOfKin, non_empty, required};

const ENTITY: &str = "mentor";

/// A volunteer mentor (the `User` record of the program).
///
/// Fields are private; state changes go through methods that hold the
/// aggregate's invariants:
/// - the email cannot change once an external identity is linked
/// - archive/unarchive toggle `end_date` + `end_reason` together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "MentorSnapshot")]
pub struct Mentor {
    id: String,
    chapter_id: String,
    email: Email,
    auth_subject: Option<String>,
    first_name: String,
    last_name: String,
    preferred_name: Option<String>,
    mobile: Option<String>,
    date_of_birth: Option<NaiveDate>,
    address: Option<Address>,
    emergency_contact: Option<EmergencyContact>,
    next_of_kin: Option<NextOfKin>,
    profile_picture_path: Option<String>,
    end_date: Option<DateTime<Utc>>,
    end_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Flat, serializable form of a [`Mentor`] used for storage and export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MentorSnapshot {
    pub id: String,
    pub chapter_id: String,
    pub email: Email,
    pub auth_subject: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub preferred_name: Option<String>,
    pub mobile: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
    pub next_of_kin: Option<NextOfKin>,
    pub profile_picture_path: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub end_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a new mentor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewMentor {
    pub chapter_id: String,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub next_of_kin: Option<NextOfKin>,
}

/// Partial profile update. `None` leaves a field untouched; `Some(None)`
/// clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<Address>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<Option<EmergencyContact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_of_kin: Option<Option<NextOfKin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_path: Option<Option<String>>,
}

impl MentorProfileUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.preferred_name.is_none()
            && self.mobile.is_none()
            && self.date_of_birth.is_none()
            && self.address.is_none()
            && self.emergency_contact.is_none()
            && self.next_of_kin.is_none()
            && self.profile_picture_path.is_none()
    }
}

impl Mentor {
    /// Register a new mentor.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the chapter or either name is blank.
    pub fn register(id: String, new: NewMentor, now: DateTime<Utc>) -> Result<Self, CoreError> {
        Ok(Self {
            id,
            chapter_id: required("chapter", &new.chapter_id)?,
            email: new.email,
            auth_subject: None,
            first_name: required("first name", &new.first_name)?,
            last_name: required("last name", &new.last_name)?,
            preferred_name: non_empty(new.preferred_name.as_deref()),
            mobile: non_empty(new.mobile.as_deref()),
            date_of_birth: new.date_of_birth,
            address: new.address,
            emergency_contact: new.emergency_contact,
            next_of_kin: new.next_of_kin,
            profile_picture_path: None,
            end_date: None,
            end_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate from storage.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the stored record breaks an invariant.
    pub fn restore(s: MentorSnapshot) -> Result<Self, CoreError> {
        if s.end_date.is_some() != s.end_reason.is_some() {
            return Err(CoreError::validation(format!(
                "mentor {} has inconsistent archive fields",
                s.id
            )));
        }
        Ok(Self {
            chapter_id: required("chapter", &s.chapter_id)?,
            first_name: required("first name", &s.first_name)?,
            last_name: required("last name", &s.last_name)?,
            id: s.id,
            email: s.email,
            auth_subject: s.auth_subject,
            preferred_name: s.preferred_name,
            mobile: s.mobile,
            date_of_birth: s.date_of_birth,
            address: s.address,
            emergency_contact: s.emergency_contact,
            next_of_kin: s.next_of_kin,
            profile_picture_path: s.profile_picture_path,
            end_date: s.end_date,
            end_reason: s.end_reason,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> MentorSnapshot {
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
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn auth_subject(&self) -> Option<&str> {
        self.auth_subject.as_deref()
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

    /// Display name: preferred name if set, else first name, then last name.
    #[must_use]
    pub fn full_name(&self) -> String {
        let first = self.preferred_name.as_deref().unwrap_or(&self.first_name);
        format!("{first} {}", self.last_name)
    }

    #[must_use]
    pub fn mobile(&self) -> Option<&str> {
        self.mobile.as_deref()
    }

    #[must_use]
    pub const fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    #[must_use]
    pub const fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    #[must_use]
    pub const fn emergency_contact(&self) -> Option<&EmergencyContact> {
        self.emergency_contact.as_ref()
    }

    #[must_use]
    pub const fn next_of_kin(&self) -> Option<&NextOfKin> {
        self.next_of_kin.as_ref()
    }

    #[must_use]
    pub fn profile_picture_path(&self) -> Option<&str> {
        self.profile_picture_path.as_deref()
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
    pub const fn is_archived(&self) -> bool {
        self.end_date.is_some()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Change the email address. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::EmailLocked` if an external identity is linked and
    /// the new address differs from the current one.
    pub fn change_email(&mut self, email: Email, now: DateTime<Utc>) -> Result<bool, CoreError> {
        if email == self.email {
            return Ok(false);
        }
        if self.auth_subject.is_some() {
            return Err(CoreError::EmailLocked {
                mentor_id: self.id.clone(),
            });
        }
        self.email = email;
        self.updated_at = now;
        Ok(true)
    }

    /// Link an external identity subject. Re-linking the same subject is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the subject is blank or the mentor is
    /// already linked to a different subject.
    pub fn link_identity(&mut self, subject: &str, now: DateTime<Utc>) -> Result<bool, CoreError> {
        let subject = required("identity subject", subject)?;
        match self.auth_subject.as_deref() {
            Some(existing) if existing == subject => Ok(false),
            Some(existing) => Err(CoreError::validation(format!(
                "mentor {} is already linked to identity {existing}",
                self.id
            ))),
            None => {
                self.auth_subject = Some(subject);
                self.updated_at = now;
                Ok(true)
            }
        }
    }

    /// Remove the linked identity, unlocking the email.
    pub fn unlink_identity(&mut self, now: DateTime<Utc>) -> bool {
        if self.auth_subject.take().is_some() {
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    /// Archive the mentor, recording why they left.
    ///
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

    /// Bring an archived mentor back.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidTransition` if the mentor is active.
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

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a name would become blank.
    pub fn update_profile(
        &mut self,
        update: &MentorProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if update.is_empty() {
            return Ok(());
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
        if let Some(ref mobile) = update.mobile {
            self.mobile = non_empty(mobile.as_deref());
        }
        if let Some(dob) = update.date_of_birth {
            self.date_of_birth = dob;
        }
        if let Some(ref address) = update.address {
            self.address.clone_from(address);
        }
        if let Some(ref contact) = update.emergency_contact {
            self.emergency_contact.clone_from(contact);
        }
        if let Some(ref kin) = update.next_of_kin {
            self.next_of_kin.clone_from(kin);
        }
        if let Some(ref path) = update.profile_picture_path {
            self.profile_picture_path = non_empty(path.as_deref());
        }
        self.updated_at = now;
        Ok(())
    }
}

impl From<Mentor> for MentorSnapshot {
    fn from(m: Mentor) -> Self {
        Self {
            id: m.id,
            chapter_id: m.chapter_id,
            email: m.email,
            auth_subject: m.auth_subject,
            first_name: m.first_name,
            last_name: m.last_name,
            preferred_name: m.preferred_name,
            mobile: m.mobile,
            date_of_birth: m.date_of_birth,
            address: m.address,
            emergency_contact: m.emergency_contact,
            next_of_kin: m.next_of_kin,
            profile_picture_path: m.profile_picture_path,
            end_date: m.end_date,
            end_reason: m.end_reason,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
