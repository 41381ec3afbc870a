use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{NewMentor, NewStudent};
use crate::enums::ImportKind;
use crate::errors::CoreError;
use crate::values::{Address, Email, EmergencyContact, NextOfKin};

/// One spreadsheet row describing a mentor, flattened to scalar columns.
///
/// The chapter is named, not referenced by ID; the importer resolves it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MentorImportRow {
    pub chapter: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    #[serde(default)]
    pub emergency_contact_relationship: Option<String>,
    #[serde(default)]
    pub next_of_kin_name: Option<String>,
    #[serde(default)]
    pub next_of_kin_number: Option<String>,
    #[serde(default)]
    pub next_of_kin_relationship: Option<String>,
}

/// One spreadsheet row describing a student.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StudentImportRow {
    pub chapter: String,
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
    pub street: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub emergency_contact_name: Option<String>,
    #[serde(default)]
    pub emergency_contact_number: Option<String>,
    #[serde(default)]
    pub emergency_contact_relationship: Option<String>,
    #[serde(default)]
    pub photo_consent: Option<bool>,
}

fn is_set(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

// A partially filled group of columns is an error; a fully blank one is absent.
fn address(
    street: Option<&String>,
    suburb: Option<&String>,
    state: Option<&String>,
    postcode: Option<&String>,
) -> Result<Option<Address>, CoreError> {
    if !is_set(street) && !is_set(suburb) && !is_set(postcode) {
        return Ok(None);
    }
    Address::new(
        street.map_or("", String::as_str),
        suburb.map_or("", String::as_str),
        state.map(String::as_str),
        postcode.map(String::as_str),
    )
    .map(Some)
}

fn emergency_contact(
    name: Option<&String>,
    number: Option<&String>,
    relationship: Option<&String>,
) -> Result<Option<EmergencyContact>, CoreError> {
    if !is_set(name) && !is_set(number) {
        return Ok(None);
    }
    EmergencyContact::new(
        name.map_or("", String::as_str),
        number.map_or("", String::as_str),
        None,
        relationship.map(String::as_str),
    )
    .map(Some)
}

impl MentorImportRow {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a malformed email or a partially
    /// filled address/contact group.
    pub fn into_new_mentor(self, chapter_id: String) -> Result<NewMentor, CoreError> {
        let address = address(
            self.street.as_ref(),
            self.suburb.as_ref(),
            self.state.as_ref(),
            self.postcode.as_ref(),
        )?;
        let emergency_contact = emergency_contact(
            self.emergency_contact_name.as_ref(),
            self.emergency_contact_number.as_ref(),
            self.emergency_contact_relationship.as_ref(),
        )?;
        let next_of_kin = if is_set(self.next_of_kin_name.as_ref())
            || is_set(self.next_of_kin_number.as_ref())
        {
            Some(NextOfKin::new(
                self.next_of_kin_name.as_deref().unwrap_or_default(),
                self.next_of_kin_number.as_deref().unwrap_or_default(),
                self.next_of_kin_relationship.as_deref(),
            )?)
        } else {
            None
        };
        Ok(NewMentor {
            chapter_id,
            email: Email::parse(&self.email)?,
            first_name: self.first_name,
            last_name: self.last_name,
            preferred_name: self.preferred_name,
            mobile: self.mobile,
            date_of_birth: self.date_of_birth,
            address,
            emergency_contact,
            next_of_kin,
        })
    }
}

impl StudentImportRow {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a partially filled address or
    /// contact group.
    pub fn into_new_student(self, chapter_id: String) -> Result<NewStudent, CoreError> {
        let address = address(
            self.street.as_ref(),
            self.suburb.as_ref(),
            self.state.as_ref(),
            self.postcode.as_ref(),
        )?;
        let emergency_contact = emergency_contact(
            self.emergency_contact_name.as_ref(),
            self.emergency_contact_number.as_ref(),
            self.emergency_contact_relationship.as_ref(),
        )?;
        Ok(NewStudent {
            chapter_id,
            first_name: self.first_name,
            last_name: self.last_name,
            preferred_name: self.preferred_name,
            date_of_birth: self.date_of_birth,
            year_level: self.year_level,
            school_name: self.school_name,
            address,
            allergies: self.allergies,
            emergency_contact,
            photo_consent: self.photo_consent.unwrap_or(false),
        })
    }
}

/// Result of importing a single row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportRowOutcome {
    /// 1-based row number in the source file.
    pub row_number: u32,
    pub entity_id: Option<String>,
    pub error: Option<String>,
}

impl ImportRowOutcome {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.entity_id.is_some()
    }
}

/// Summary of one import batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportReport {
    pub batch_id: String,
    pub kind: ImportKind,
    pub imported: usize,
    pub failed: usize,
    pub outcomes: Vec<ImportRowOutcome>,
}

impl ImportReport {
    #[must_use]
    pub fn new(batch_id: String, kind: ImportKind, outcomes: Vec<ImportRowOutcome>) -> Self {
        let imported = outcomes.iter().filter(|o| o.is_ok()).count();
        Self {
            batch_id,
            kind,
            imported,
            failed: outcomes.len() - imported,
            outcomes,
        }
    }
}

/// A persisted [`ImportRowOutcome`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ImportedHistory {
    pub id: String,
    pub batch_id: String,
    pub kind: ImportKind,
    pub row_number: u32,
    pub entity_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}
