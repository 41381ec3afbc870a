use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CheckKind, ComplianceState};

/// Referees that must recommend a mentor before they can be approved.
pub const MIN_RECOMMENDED_REFERENCES: usize = 2;

/// A referee nominated by a mentor.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Reference {
    pub id: String,
    pub mentor_id: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub relationship: Option<String>,
    /// `None` until the referee has been called.
    pub is_recommended: Option<bool>,
    pub called_on: Option<NaiveDate>,
    pub called_by: Option<String>,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A background check with an expiry date (police or WWC).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BackgroundCheck {
    pub mentor_id: String,
    pub kind: CheckKind,
    /// WWC card number. Police checks have none.
    pub reference_number: Option<String>,
    pub expiry_date: NaiveDate,
    pub file_path: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Completion of the mentor induction.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Induction {
    pub mentor_id: String,
    pub completed_on: NaiveDate,
    pub run_by: String,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Final approval by the mentor review committee.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MrcApproval {
    pub mentor_id: String,
    pub approved_on: NaiveDate,
    pub approved_by: String,
    pub comment: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Derive the state of an expiring item.
#[must_use]
pub fn check_state(
    expiry: Option<NaiveDate>,
    today: NaiveDate,
    warning_days: i64,
) -> ComplianceState {
    match expiry {
        None => ComplianceState::Missing,
        Some(date) if date < today => ComplianceState::Expired,
        Some(date) if (date - today).num_days() <= warning_days => ComplianceState::ExpiringSoon,
        Some(_) => ComplianceState::Valid,
    }
}

/// Everything a coordinator needs to decide whether a mentor can be rostered.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ComplianceSummary {
    pub mentor_id: String,
    pub references_total: usize,
    pub references_recommended: usize,
    pub police_check: ComplianceState,
    pub police_expiry: Option<NaiveDate>,
    pub wwc_check: ComplianceState,
    pub wwc_expiry: Option<NaiveDate>,
    pub induction_done: bool,
    pub mrc_approved: bool,
    pub ready_to_mentor: bool,
}

/// Inputs to [`ComplianceSummary::evaluate`].
#[derive(Debug, Clone, Copy)]
pub struct ComplianceRecords<'a> {
    pub references: &'a [Reference],
    pub police: Option<&'a BackgroundCheck>,
    pub wwc: Option<&'a BackgroundCheck>,
    pub induction: Option<&'a Induction>,
    pub approval: Option<&'a MrcApproval>,
}

impl ComplianceSummary {
    #[must_use]
    pub fn evaluate(
        mentor_id: &str,
        records: ComplianceRecords<'_>,
        today: NaiveDate,
        warning_days: i64,
    ) -> Self {
        let recommended = records
            .references
            .iter()
            .filter(|r| r.is_recommended == Some(true))
            .count();
        let police_expiry = records.police.map(|c| c.expiry_date);
        let wwc_expiry = records.wwc.map(|c| c.expiry_date);
        let police_check = check_state(police_expiry, today, warning_days);
        let wwc_check = check_state(wwc_expiry, today, warning_days);
        let induction_done = records.induction.is_some();
        let mrc_approved = records.approval.is_some();

        Self {
            mentor_id: mentor_id.to_string(),
            references_total: records.references.len(),
            references_recommended: recommended,
            police_check,
            police_expiry,
            wwc_check,
            wwc_expiry,
            induction_done,
            mrc_approved,
            ready_to_mentor: recommended >= MIN_RECOMMENDED_REFERENCES
                && police_check.is_satisfied()
                && wwc_check.is_satisfied()
                && induction_done
                && mrc_approved,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn reference(id: &str, recommended: Option<bool>) -> Reference {
        Reference {
            id: id.into(),
            mentor_id: "mtr-1".into(),
            first_name: "Ref".into(),
            last_name: id.into(),
            mobile: "0400".into(),
            email: None,
            relationship: None,
            is_recommended: recommended,
            called_on: None,
            called_by: None,
            outcome: None,
            created_at: Utc::now(),
        }
    }

    fn check(kind: CheckKind, expiry: NaiveDate) -> BackgroundCheck {
        BackgroundCheck {
            mentor_id: "mtr-1".into(),
            kind,
            reference_number: None,
            expiry_date: expiry,
            file_path: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn check_state_windows() {
        let today = d(2026, 6, 1);
        assert_eq!(check_state(None, today, 30), ComplianceState::Missing);
        assert_eq!(check_state(Some(d(2026, 5, 31)), today, 30), ComplianceState::Expired);
        assert_eq!(check_state(Some(today), today, 30), ComplianceState::ExpiringSoon);
        assert_eq!(check_state(Some(d(2026, 7, 1)), today, 30), ComplianceState::ExpiringSoon);
        assert_eq!(check_state(Some(d(2026, 7, 2)), today, 30), ComplianceState::Valid);
    }

    #[test]
    fn ready_when_everything_present() {
        let today = d(2026, 6, 1);
        let refs = [
            reference("a", Some(true)),
            reference("b", Some(true)),
            reference("c", Some(false)),
        ];
        let police = check(CheckKind::Police, d(2027, 1, 1));
        let wwc = check(CheckKind::Wwc, d(2026, 6, 20));
        let induction = Induction {
            mentor_id: "mtr-1".into(),
            completed_on: d(2026, 2, 1),
            run_by: "Coordinator".into(),
            comment: None,
            updated_at: Utc::now(),
        };
        let approval = MrcApproval {
            mentor_id: "mtr-1".into(),
            approved_on: d(2026, 3, 1),
            approved_by: "Committee".into(),
            comment: None,
            updated_at: Utc::now(),
        };
        let summary = ComplianceSummary::evaluate(
            "mtr-1",
            ComplianceRecords {
                references: &refs,
                police: Some(&police),
                wwc: Some(&wwc),
                induction: Some(&induction),
                approval: Some(&approval),
            },
            today,
            30,
        );
        assert_eq!(summary.references_total, 3);
        assert_eq!(summary.references_recommended, 2);
        assert_eq!(summary.wwc_check, ComplianceState::ExpiringSoon);
        assert!(summary.ready_to_mentor);
    }

    #[test]
    fn not_ready_with_expired_check_or_few_references() {
        let today = d(2026, 6, 1);
        let refs = [reference("a", Some(true)), reference("b", None)];
        let police = check(CheckKind::Police, d(2026, 1, 1));
        let summary = ComplianceSummary::evaluate(
            "mtr-1",
            ComplianceRecords {
                references: &refs,
                police: Some(&police),
                wwc: None,
                induction: None,
                approval: None,
            },
            today,
            30,
        );
        assert_eq!(summary.police_check, ComplianceState::Expired);
        assert_eq!(summary.wwc_check, ComplianceState::Missing);
        assert!(!summary.ready_to_mentor);
    }
}
