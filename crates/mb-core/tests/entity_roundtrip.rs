//! Serde roundtrip and JsonSchema validation tests for exported entity types.

use chrono::{NaiveDate, Utc};
use mb_core::entities::*;
use mb_core::enums::*;
use mb_core::values::{Address, Email, EmergencyContact};
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

roundtrip_and_validate!(
    chapter_snapshot_roundtrip,
    ChapterSnapshot,
    ChapterSnapshot {
        id: "chp-a3f8b2c1".into(),
        name: "Carlton".into(),
        address: Some(Address::new("1 Main St", "Carlton", Some("VIC"), Some("3053")).unwrap()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    mentor_snapshot_roundtrip,
    MentorSnapshot,
    MentorSnapshot {
        id: "mtr-a3f8b2c1".into(),
        chapter_id: "chp-a3f8b2c1".into(),
        email: Email::parse("jo@example.org").unwrap(),
        auth_subject: Some("auth0|123".into()),
        first_name: "Jo".into(),
        last_name: "Bloggs".into(),
        preferred_name: None,
        mobile: Some("0400 000 000".into()),
        date_of_birth: Some(date(1990, 5, 17)),
        address: None,
        emergency_contact: Some(EmergencyContact::new("Pat", "0411", None, Some("Partner")).unwrap()),
        next_of_kin: None,
        profile_picture_path: None,
        end_date: None,
        end_reason: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    student_session_roundtrip,
    StudentSession,
    StudentSession {
        id: "sts-a3f8b2c1".into(),
        session_id: "ses-a3f8b2c1".into(),
        student_id: "stu-a3f8b2c1".into(),
        status: ReportStatus::SignedOff,
        report: Some("Worked on fractions.".into()),
        completed_on: Some(Utc::now()),
        signed_off_on: Some(Utc::now()),
        signed_off_by: Some("ops-1".into()),
        report_feedback: None,
        cancelled_reason: None,
        reminder_sent_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    school_term_roundtrip,
    SchoolTerm,
    SchoolTerm {
        id: "trm-a3f8b2c1".into(),
        year: 2026,
        label: "Term 1".into(),
        start_date: date(2026, 1, 27),
        end_date: date(2026, 4, 2),
        created_at: Utc::now(),
    }
);

roundtrip_and_validate!(
    compliance_summary_roundtrip,
    ComplianceSummary,
    ComplianceSummary {
        mentor_id: "mtr-a3f8b2c1".into(),
        references_total: 2,
        references_recommended: 2,
        police_check: ComplianceState::Valid,
        police_expiry: Some(date(2027, 1, 1)),
        wwc_check: ComplianceState::Missing,
        wwc_expiry: None,
        induction_done: true,
        mrc_approved: false,
        ready_to_mentor: false,
    }
);

roundtrip_and_validate!(
    import_report_roundtrip,
    ImportReport,
    ImportReport::new(
        "bat-a3f8b2c1".into(),
        ImportKind::Student,
        vec![ImportRowOutcome {
            row_number: 1,
            entity_id: None,
            error: Some("year level must be between 1 and 12, got 13".into()),
        }],
    )
);

roundtrip_and_validate!(
    audit_entry_roundtrip,
    AuditEntry,
    AuditEntry {
        id: "aud-a3f8b2c1".into(),
        actor_id: "ops-1".into(),
        entity_type: EntityType::Mentor,
        entity_id: "mtr-a3f8b2c1".into(),
        action: AuditAction::EmailChanged,
        detail: Some(serde_json::json!({"from": "a@b.co", "to": "c@d.co"})),
        created_at: Utc::now(),
    }
);

#[test]
fn import_row_schema_rejects_missing_email() {
    let schema = serde_json::to_value(schema_for!(MentorImportRow)).unwrap();
    let row = serde_json::json!({
        "chapter": "Carlton",
        "first_name": "Jo",
        "last_name": "Bloggs"
    });
    assert!(!validate_against_schema(&schema, &row).is_empty());

    let row = serde_json::json!({
        "chapter": "Carlton",
        "email": "jo@example.org",
        "first_name": "Jo",
        "last_name": "Bloggs"
    });
    assert!(validate_against_schema(&schema, &row).is_empty());
}
