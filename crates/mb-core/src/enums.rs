//! Status enums, entity types, roles, and audit actions for mentorbase.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the domain layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Role of an acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ChapterCoordinator,
    Mentor,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::ChapterCoordinator => "chapter_coordinator",
            Self::Mentor => "mentor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReportStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a student session and its report.
///
/// ```text
/// draft → completed → signed_off
///       → cancelled   ↑        |
/// completed → draft   └────────┘ signed_off → completed (revoke)
/// cancelled → draft (restore)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Completed,
    SignedOff,
    Cancelled,
}

impl ReportStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Completed, Self::Cancelled],
            Self::Completed => &[Self::Draft, Self::SignedOff],
            Self::SignedOff => &[Self::Completed],
            Self::Cancelled => &[Self::Draft],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether the mentor may still edit the report text.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft | Self::Completed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Completed => "completed",
            Self::SignedOff => "signed_off",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ComplianceState
// ---------------------------------------------------------------------------

/// State of a single compliance item for a mentor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceState {
    Missing,
    Valid,
    ExpiringSoon,
    Expired,
}

impl ComplianceState {
    /// Whether the item allows the mentor to be rostered.
    #[must_use]
    pub const fn is_satisfied(self) -> bool {
        matches!(self, Self::Valid | Self::ExpiringSoon)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Valid => "valid",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ComplianceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CheckKind
// ---------------------------------------------------------------------------

/// Background checks that carry an expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Police,
    Wwc,
}

impl CheckKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Police => "police",
            Self::Wwc => "wwc",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SortDirection
// ---------------------------------------------------------------------------

/// Ordering direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for the direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ImportKind
// ---------------------------------------------------------------------------

/// What a bulk import batch creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Mentor,
    Student,
}

impl ImportKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mentor => "mentor",
            Self::Student => "student",
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Entity types recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Chapter,
    Mentor,
    Student,
    Assignment,
    Session,
    StudentSession,
    Goal,
    Term,
    Reference,
    PoliceCheck,
    WwcCheck,
    Induction,
    MrcApproval,
    Guardian,
    Teacher,
    Eoi,
    Import,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chapter => "chapter",
            Self::Mentor => "mentor",
            Self::Student => "student",
            Self::Assignment => "assignment",
            Self::Session => "session",
            Self::StudentSession => "student_session",
            Self::Goal => "goal",
            Self::Term => "term",
            Self::Reference => "reference",
            Self::PoliceCheck => "police_check",
            Self::WwcCheck => "wwc_check",
            Self::Induction => "induction",
            Self::MrcApproval => "mrc_approval",
            Self::Guardian => "guardian",
            Self::Teacher => "teacher",
            Self::Eoi => "eoi",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Kind of mutation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Archived,
    Unarchived,
    EmailChanged,
    IdentityLinked,
    Moved,
    Assigned,
    Unassigned,
    StatusChanged,
    Imported,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Archived => "archived",
            Self::Unarchived => "unarchived",
            Self::EmailChanged => "email_changed",
            Self::IdentityLinked => "identity_linked",
            Self::Moved => "moved",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::StatusChanged => "status_changed",
            Self::Imported => "imported",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ReportStatus::Draft, ReportStatus::Completed, true)]
    #[case(ReportStatus::Draft, ReportStatus::Cancelled, true)]
    #[case(ReportStatus::Draft, ReportStatus::SignedOff, false)]
    #[case(ReportStatus::Completed, ReportStatus::SignedOff, true)]
    #[case(ReportStatus::Completed, ReportStatus::Draft, true)]
    #[case(ReportStatus::Completed, ReportStatus::Cancelled, false)]
    #[case(ReportStatus::SignedOff, ReportStatus::Completed, true)]
    #[case(ReportStatus::SignedOff, ReportStatus::Draft, false)]
    #[case(ReportStatus::Cancelled, ReportStatus::Draft, true)]
    #[case(ReportStatus::Cancelled, ReportStatus::Completed, false)]
    fn report_status_transitions(
        #[case] from: ReportStatus,
        #[case] to: ReportStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn as_str_matches_serde() {
        for status in [
            ReportStatus::Draft,
            ReportStatus::Completed,
            ReportStatus::SignedOff,
            ReportStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        let json = serde_json::to_string(&EntityType::StudentSession).unwrap();
        assert_eq!(json, "\"student_session\"");
        let json = serde_json::to_string(&Role::ChapterCoordinator).unwrap();
        assert_eq!(json, "\"chapter_coordinator\"");
    }

    #[test]
    fn compliance_state_satisfaction() {
        assert!(ComplianceState::Valid.is_satisfied());
        assert!(ComplianceState::ExpiringSoon.is_satisfied());
        assert!(!ComplianceState::Expired.is_satisfied());
        assert!(!ComplianceState::Missing.is_satisfied());
    }
}
