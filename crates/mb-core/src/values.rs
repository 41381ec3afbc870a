//! Value objects shared by the aggregates.
//!
//! Each constructor normalizes its input and rejects values that would
//! violate the record's invariants. Deserialization goes through the same
//! constructors, so a stored value that no longer validates fails to load.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// A normalized (trimmed, lower-cased) email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the address is empty, has no `@`,
    /// has an empty local part, or a domain without a dot.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized = raw.trim().to_ascii_lowercase();
        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(CoreError::validation(format!("invalid email '{raw}'")));
        };
        if local.is_empty()
            || domain.contains('@')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || normalized.chars().any(char::is_whitespace)
        {
            return Err(CoreError::validation(format!("invalid email '{raw}'")));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawAddress")]
pub struct Address {
    street: String,
    suburb: String,
    state: Option<String>,
    postcode: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct RawAddress {
    street: String,
    suburb: String,
    state: Option<String>,
    postcode: Option<String>,
}

impl TryFrom<RawAddress> for Address {
    type Error = CoreError;

    fn try_from(raw: RawAddress) -> Result<Self, Self::Error> {
        Self::new(&raw.street, &raw.suburb, raw.state.as_deref(), raw.postcode.as_deref())
    }
}

impl Address {
    /// Build an address, trimming every part.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if street or suburb is empty, or the
    /// postcode is present but not four digits.
    pub fn new(
        street: &str,
        suburb: &str,
        state: Option<&str>,
        postcode: Option<&str>,
    ) -> Result<Self, CoreError> {
        let street = street.trim();
        let suburb = suburb.trim();
        if street.is_empty() {
            return Err(CoreError::validation("address street is required"));
        }
        if suburb.is_empty() {
            return Err(CoreError::validation("address suburb is required"));
        }
        let postcode = non_empty(postcode);
        if let Some(ref pc) = postcode {
            if pc.len() != 4 || !pc.chars().all(|c| c.is_ascii_digit()) {
                return Err(CoreError::validation(format!("invalid postcode '{pc}'")));
            }
        }
        Ok(Self {
            street: street.to_string(),
            suburb: suburb.to_string(),
            state: non_empty(state),
            postcode,
        })
    }

    #[must_use]
    pub fn street(&self) -> &str {
        &self.street
    }

    #[must_use]
    pub fn suburb(&self) -> &str {
        &self.suburb
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn postcode(&self) -> Option<&str> {
        self.postcode.as_deref()
    }

    /// Single-line rendering, e.g. `"1 Main St, Carlton VIC 3053"`.
    #[must_use]
    pub fn one_line(&self) -> String {
        let mut out = format!("{}, {}", self.street, self.suburb);
        if let Some(ref state) = self.state {
            out.push(' ');
            out.push_str(state);
        }
        if let Some(ref postcode) = self.postcode {
            out.push(' ');
            out.push_str(postcode);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// EmergencyContact
// ---------------------------------------------------------------------------

/// Who to call if something goes wrong during a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawEmergencyContact")]
pub struct EmergencyContact {
    name: String,
    number: String,
    address: Option<String>,
    relationship: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct RawEmergencyContact {
    name: String,
    number: String,
    address: Option<String>,
    relationship: Option<String>,
}

impl TryFrom<RawEmergencyContact> for EmergencyContact {
    type Error = CoreError;

    fn try_from(raw: RawEmergencyContact) -> Result<Self, Self::Error> {
        Self::new(
            &raw.name,
            &raw.number,
            raw.address.as_deref(),
            raw.relationship.as_deref(),
        )
    }
}

impl EmergencyContact {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if name or number is empty.
    pub fn new(
        name: &str,
        number: &str,
        address: Option<&str>,
        relationship: Option<&str>,
    ) -> Result<Self, CoreError> {
        let (name, number) = required_pair("emergency contact", name, number)?;
        Ok(Self {
            name,
            number,
            address: non_empty(address),
            relationship: non_empty(relationship),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    #[must_use]
    pub fn relationship(&self) -> Option<&str> {
        self.relationship.as_deref()
    }
}

// ---------------------------------------------------------------------------
// NextOfKin
// ---------------------------------------------------------------------------

/// A mentor's next of kin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "RawNextOfKin")]
pub struct NextOfKin {
    name: String,
    number: String,
    relationship: Option<String>,
}

#[derive(Deserialize, JsonSchema)]
struct RawNextOfKin {
    name: String,
    number: String,
    relationship: Option<String>,
}

impl TryFrom<RawNextOfKin> for NextOfKin {
    type Error = CoreError;

    fn try_from(raw: RawNextOfKin) -> Result<Self, Self::Error> {
        Self::new(&raw.name, &raw.number, raw.relationship.as_deref())
    }
}

impl NextOfKin {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if name or number is empty.
    pub fn new(name: &str, number: &str, relationship: Option<&str>) -> Result<Self, CoreError> {
        let (name, number) = required_pair("next of kin", name, number)?;
        Ok(Self {
            name,
            number,
            relationship: non_empty(relationship),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    #[must_use]
    pub fn relationship(&self) -> Option<&str> {
        self.relationship.as_deref()
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Trim an optional string, mapping blank to `None`.
#[must_use]
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Trim a required string.
///
/// # Errors
///
/// Returns `CoreError::Validation` naming `field` if the value is blank.
pub fn required(field: &str, value: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn required_pair(what: &str, name: &str, number: &str) -> Result<(String, String), CoreError> {
    Ok((
        required(&format!("{what} name"), name)?,
        required(&format!("{what} number"), number)?,
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn email_is_normalized() {
        let email = Email::parse("  Jane.Doe@Example.ORG ").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.org");
        assert_eq!(email, Email::parse("jane.doe@example.org").unwrap());
    }

    #[rstest]
    #[case("")]
    #[case("no-at-sign")]
    #[case("@example.org")]
    #[case("jane@localhost")]
    #[case("jane@.org")]
    #[case("jane@example.")]
    #[case("ja ne@example.org")]
    #[case("a@b@example.org")]
    fn email_rejects_malformed(#[case] raw: &str) {
        assert!(matches!(Email::parse(raw), Err(CoreError::Validation(_))));
    }

    #[test]
    fn email_deserialize_validates() {
        let ok: Email = serde_json::from_str("\"A@B.CO\"").unwrap();
        assert_eq!(ok.as_str(), "a@b.co");
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }

    #[test]
    fn address_trims_and_renders() {
        let addr = Address::new(" 1 Main St ", "Carlton", Some("VIC"), Some(" 3053 ")).unwrap();
        assert_eq!(addr.street(), "1 Main St");
        assert_eq!(addr.postcode(), Some("3053"));
        assert_eq!(addr.one_line(), "1 Main St, Carlton VIC 3053");

        let bare = Address::new("1 Main St", "Carlton", Some(" "), None).unwrap();
        assert_eq!(bare.state(), None);
        assert_eq!(bare.one_line(), "1 Main St, Carlton");
    }

    #[test]
    fn address_rejects_bad_postcode_and_blank_parts() {
        assert!(Address::new("1 Main St", "Carlton", None, Some("30A3")).is_err());
        assert!(Address::new("", "Carlton", None, None).is_err());
        assert!(Address::new("1 Main St", "  ", None, None).is_err());
    }

    #[test]
    fn address_deserialize_validates() {
        let json = r#"{"street":"1 Main St","suburb":"Carlton","state":null,"postcode":"12345"}"#;
        assert!(serde_json::from_str::<Address>(json).is_err());
    }

    #[test]
    fn contacts_require_name_and_number() {
        assert!(EmergencyContact::new("Pat", "0400 000 000", None, Some("Mother")).is_ok());
        assert!(EmergencyContact::new("", "0400 000 000", None, None).is_err());
        assert!(NextOfKin::new("Sam", " ", None).is_err());

        let kin = NextOfKin::new(" Sam ", "0411", Some("")).unwrap();
        assert_eq!(kin.name(), "Sam");
        assert_eq!(kin.relationship(), None);
    }
}
