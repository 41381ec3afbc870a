//! Mentor compliance repository: references, background checks, induction
//! and committee approval.
//!
//! Police and WWC checks share one table keyed by `(mentor_id, kind)` and are
//! upserted; a mentor only ever has the latest check of each kind.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use mb_core::access::Actor;
use mb_core::entities::{
    BackgroundCheck, ComplianceRecords, ComplianceSummary, Induction, MrcApproval, Reference,
    check_state,
};
use mb_core::enums::{AuditAction, CheckKind, ComplianceState, EntityType};
use mb_core::ids::PREFIX_REFERENCE;
use mb_core::values::{non_empty, required};

use crate::error::DatabaseError;
use crate::helpers::{
    fmt_date, get_opt_bool, get_opt_string, parse_date, parse_datetime, parse_enum,
    parse_optional_date,
};
use crate::service::ProgramService;

const REFERENCE_COLS: &str = "id, mentor_id, first_name, last_name, mobile, email, relationship, \
     is_recommended, called_on, called_by, outcome, created_at";

const CHECK_COLS: &str = "mentor_id, kind, reference_number, expiry_date, file_path, updated_at";

/// Input for [`ProgramService::add_reference`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewReference {
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub relationship: Option<String>,
}

/// Police or WWC check details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInput {
    pub reference_number: Option<String>,
    pub expiry_date: NaiveDate,
    pub file_path: Option<String>,
}

/// A background check at or near expiry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExpiringCheck {
    pub mentor_id: String,
    pub mentor_name: String,
    pub chapter_id: String,
    pub kind: CheckKind,
    pub expiry_date: NaiveDate,
    pub state: ComplianceState,
}

fn row_to_reference(row: &libsql::Row) -> Result<Reference, DatabaseError> {
    Ok(Reference {
        id: row.get(0)?,
        mentor_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        mobile: row.get(4)?,
        email: get_opt_string(row, 5)?,
        relationship: get_opt_string(row, 6)?,
        is_recommended: get_opt_bool(row, 7)?,
        called_on: parse_optional_date(get_opt_string(row, 8)?.as_deref())?,
        called_by: get_opt_string(row, 9)?,
        outcome: get_opt_string(row, 10)?,
        created_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

fn row_to_check(row: &libsql::Row) -> Result<BackgroundCheck, DatabaseError> {
    Ok(BackgroundCheck {
        mentor_id: row.get(0)?,
        kind: parse_enum(&row.get::<String>(1)?)?,
        reference_number: get_opt_string(row, 2)?,
        expiry_date: parse_date(&row.get::<String>(3)?)?,
        file_path: get_opt_string(row, 4)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl ProgramService {
    async fn mentor_chapter(&self, actor: &Actor, mentor_id: &str) -> Result<String, DatabaseError> {
        let mentor = self.get_mentor(mentor_id).await?;
        actor.ensure_chapter(mentor.chapter_id())?;
        Ok(mentor.chapter_id().to_string())
    }

    /// # Errors
    ///
    /// Returns `Validation` when a name or mobile is blank.
    pub async fn add_reference(
        &self,
        actor: &Actor,
        mentor_id: &str,
        new: NewReference,
    ) -> Result<Reference, DatabaseError> {
        self.mentor_chapter(actor, mentor_id).await?;
        let reference = Reference {
            id: self.db().generate_id(PREFIX_REFERENCE).await?,
            mentor_id: mentor_id.to_string(),
            first_name: required("reference first name", &new.first_name)?,
            last_name: required("reference last name", &new.last_name)?,
            mobile: required("reference mobile", &new.mobile)?,
            email: non_empty(new.email.as_deref()),
            relationship: non_empty(new.relationship.as_deref()),
            is_recommended: None,
            called_on: None,
            called_by: None,
            outcome: None,
            created_at: Self::now(),
        };
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO mentor_references ({REFERENCE_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, NULL, NULL, NULL, ?8)"
                ),
                libsql::params![
                    reference.id.as_str(),
                    mentor_id,
                    reference.first_name.as_str(),
                    reference.last_name.as_str(),
                    reference.mobile.as_str(),
                    reference.email.as_deref(),
                    reference.relationship.as_deref(),
                    reference.created_at.to_rfc3339()
                ],
            )
            .await?;
        self.audit(
            actor,
            EntityType::Reference,
            &reference.id,
            AuditAction::Created,
            Some(serde_json::json!({ "mentor_id": mentor_id })),
        )
        .await?;
        Ok(reference)
    }

    /// Record the outcome of calling a referee. The caller is the actor.
    ///
    /// # Errors
    ///
    /// Returns `NoResult` for an unknown reference.
    pub async fn record_reference_call(
        &self,
        actor: &Actor,
        reference_id: &str,
        called_on: NaiveDate,
        recommended: bool,
        outcome: Option<&str>,
    ) -> Result<Reference, DatabaseError> {
        let mut reference = self.get_reference(reference_id).await?;
        self.mentor_chapter(actor, &reference.mentor_id).await?;
        reference.called_on = Some(called_on);
        reference.called_by = Some(actor.id.clone());
        reference.is_recommended = Some(recommended);
        reference.outcome = non_empty(outcome);

        self.db()
            .conn()
            .execute(
                "UPDATE mentor_references
                 SET called_on = ?1, called_by = ?2, is_recommended = ?3, outcome = ?4
                 WHERE id = ?5",
                libsql::params![
                    fmt_date(called_on),
                    actor.id.as_str(),
                    i64::from(recommended),
                    reference.outcome.as_deref(),
                    reference_id
                ],
            )
            .await?;
        self.audit(
            actor,
            EntityType::Reference,
            reference_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "called_on": called_on, "is_recommended": recommended })),
        )
        .await?;
        Ok(reference)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no reference has this ID.
    pub async fn get_reference(&self, id: &str) -> Result<Reference, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {REFERENCE_COLS} FROM mentor_references WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_reference(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_references(&self, mentor_id: &str) -> Result<Vec<Reference>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {REFERENCE_COLS} FROM mentor_references
                     WHERE mentor_id = ?1 ORDER BY created_at"
                ),
                [mentor_id],
            )
            .await?;
        let mut references = Vec::new();
        while let Some(row) = rows.next().await? {
            references.push(row_to_reference(&row)?);
        }
        Ok(references)
    }

    async fn upsert_check(
        &self,
        actor: &Actor,
        mentor_id: &str,
        kind: CheckKind,
        input: CheckInput,
    ) -> Result<BackgroundCheck, DatabaseError> {
        self.mentor_chapter(actor, mentor_id).await?;
        let check = BackgroundCheck {
            mentor_id: mentor_id.to_string(),
            kind,
            reference_number: non_empty(input.reference_number.as_deref()),
            expiry_date: input.expiry_date,
            file_path: non_empty(input.file_path.as_deref()),
            updated_at: Self::now(),
        };
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO background_checks ({CHECK_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT (mentor_id, kind) DO UPDATE SET
                         reference_number = excluded.reference_number,
                         expiry_date = excluded.expiry_date,
                         file_path = excluded.file_path,
                         updated_at = excluded.updated_at"
                ),
                libsql::params![
                    mentor_id,
                    kind.as_str(),
                    check.reference_number.as_deref(),
                    fmt_date(check.expiry_date),
                    check.file_path.as_deref(),
                    check.updated_at.to_rfc3339()
                ],
            )
            .await?;
        let entity_type = match kind {
            CheckKind::Police => EntityType::PoliceCheck,
            CheckKind::Wwc => EntityType::WwcCheck,
        };
        self.audit(
            actor,
            entity_type,
            mentor_id,
            AuditAction::Updated,
            Some(serde_json::json!({ "expiry_date": check.expiry_date })),
        )
        .await?;
        Ok(check)
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NoResult` for an unknown mentor.
    pub async fn upsert_police_check(
        &self,
        actor: &Actor,
        mentor_id: &str,
        input: CheckInput,
    ) -> Result<BackgroundCheck, DatabaseError> {
        self.upsert_check(actor, mentor_id, CheckKind::Police, input).await
    }

    /// # Errors
    ///
    /// Returns `Forbidden` or `NoResult` for an unknown mentor.
    pub async fn upsert_wwc_check(
        &self,
        actor: &Actor,
        mentor_id: &str,
        input: CheckInput,
    ) -> Result<BackgroundCheck, DatabaseError> {
        self.upsert_check(actor, mentor_id, CheckKind::Wwc, input).await
    }

    async fn get_check(
        &self,
        mentor_id: &str,
        kind: CheckKind,
    ) -> Result<Option<BackgroundCheck>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {CHECK_COLS} FROM background_checks WHERE mentor_id = ?1 AND kind = ?2"
                ),
                [mentor_id, kind.as_str()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_check(&row)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `Validation` when `run_by` is blank.
    pub async fn record_induction(
        &self,
        actor: &Actor,
        mentor_id: &str,
        completed_on: NaiveDate,
        run_by: &str,
        comment: Option<&str>,
    ) -> Result<Induction, DatabaseError> {
        self.mentor_chapter(actor, mentor_id).await?;
        let induction = Induction {
            mentor_id: mentor_id.to_string(),
            completed_on,
            run_by: required("induction run by", run_by)?,
            comment: non_empty(comment),
            updated_at: Self::now(),
        };
        self.db()
            .conn()
            .execute(
                "INSERT INTO inductions (mentor_id, completed_on, run_by, comment, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (mentor_id) DO UPDATE SET
                     completed_on = excluded.completed_on,
                     run_by = excluded.run_by,
                     comment = excluded.comment,
                     updated_at = excluded.updated_at",
                libsql::params![
                    mentor_id,
                    fmt_date(completed_on),
                    induction.run_by.as_str(),
                    induction.comment.as_deref(),
                    induction.updated_at.to_rfc3339()
                ],
            )
            .await?;
        self.audit(actor, EntityType::Induction, mentor_id, AuditAction::Updated, None)
            .await?;
        Ok(induction)
    }

    /// Record committee approval. The approver is the actor.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or `NoResult` for an unknown mentor.
    pub async fn record_mrc_approval(
        &self,
        actor: &Actor,
        mentor_id: &str,
        approved_on: NaiveDate,
        comment: Option<&str>,
    ) -> Result<MrcApproval, DatabaseError> {
        self.mentor_chapter(actor, mentor_id).await?;
        let approval = MrcApproval {
            mentor_id: mentor_id.to_string(),
            approved_on,
            approved_by: actor.id.clone(),
            comment: non_empty(comment),
            updated_at: Self::now(),
        };
        self.db()
            .conn()
            .execute(
                "INSERT INTO mrc_approvals (mentor_id, approved_on, approved_by, comment, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (mentor_id) DO UPDATE SET
                     approved_on = excluded.approved_on,
                     approved_by = excluded.approved_by,
                     comment = excluded.comment,
                     updated_at = excluded.updated_at",
                libsql::params![
                    mentor_id,
                    fmt_date(approved_on),
                    approval.approved_by.as_str(),
                    approval.comment.as_deref(),
                    approval.updated_at.to_rfc3339()
                ],
            )
            .await?;
        self.audit(actor, EntityType::MrcApproval, mentor_id, AuditAction::Updated, None)
            .await?;
        Ok(approval)
    }

    async fn get_induction(&self, mentor_id: &str) -> Result<Option<Induction>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT mentor_id, completed_on, run_by, comment, updated_at
                 FROM inductions WHERE mentor_id = ?1",
                [mentor_id],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        Ok(Some(Induction {
            mentor_id: row.get(0)?,
            completed_on: parse_date(&row.get::<String>(1)?)?,
            run_by: row.get(2)?,
            comment: get_opt_string(&row, 3)?,
            updated_at: parse_datetime(&row.get::<String>(4)?)?,
        }))
    }

    async fn get_mrc_approval(&self, mentor_id: &str) -> Result<Option<MrcApproval>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT mentor_id, approved_on, approved_by, comment, updated_at
                 FROM mrc_approvals WHERE mentor_id = ?1",
                [mentor_id],
            )
            .await?;
        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        Ok(Some(MrcApproval {
            mentor_id: row.get(0)?,
            approved_on: parse_date(&row.get::<String>(1)?)?,
            approved_by: row.get(2)?,
            comment: get_opt_string(&row, 3)?,
            updated_at: parse_datetime(&row.get::<String>(4)?)?,
        }))
    }

    /// Everything a mentor needs before they can be rostered.
    ///
    /// # Errors
    ///
    /// Returns `NoResult` for an unknown mentor.
    pub async fn compliance_summary(
        &self,
        mentor_id: &str,
        today: NaiveDate,
        warning_days: i64,
    ) -> Result<ComplianceSummary, DatabaseError> {
        self.get_mentor(mentor_id).await?;
        let references = self.list_references(mentor_id).await?;
        let police = self.get_check(mentor_id, CheckKind::Police).await?;
        let wwc = self.get_check(mentor_id, CheckKind::Wwc).await?;
        let induction = self.get_induction(mentor_id).await?;
        let approval = self.get_mrc_approval(mentor_id).await?;

        Ok(ComplianceSummary::evaluate(
            mentor_id,
            ComplianceRecords {
                references: &references,
                police: police.as_ref(),
                wwc: wwc.as_ref(),
                induction: induction.as_ref(),
                approval: approval.as_ref(),
            },
            today,
            warning_days,
        ))
    }

    /// Checks of active mentors that have expired or expire within
    /// `warning_days`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_expiring_checks(
        &self,
        chapter_id: Option<&str>,
        today: NaiveDate,
        warning_days: i64,
    ) -> Result<Vec<ExpiringCheck>, DatabaseError> {
        let horizon = u64::try_from(warning_days)
            .ok()
            .and_then(|days| today.checked_add_days(Days::new(days)))
            .unwrap_or(today);
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT m.id, COALESCE(m.preferred_name, m.first_name) || ' ' || m.last_name,
                        m.chapter_id, c.kind, c.expiry_date
                 FROM background_checks c JOIN mentors m ON m.id = c.mentor_id
                 WHERE m.end_date IS NULL AND c.expiry_date <= ?1
                   AND (?2 IS NULL OR m.chapter_id = ?2)
                 ORDER BY c.expiry_date, m.last_name COLLATE NOCASE",
                libsql::params![fmt_date(horizon), chapter_id],
            )
            .await?;
        let mut expiring = Vec::new();
        while let Some(row) = rows.next().await? {
            let expiry_date = parse_date(&row.get::<String>(4)?)?;
            expiring.push(ExpiringCheck {
                mentor_id: row.get(0)?,
                mentor_name: row.get(1)?,
                chapter_id: row.get(2)?,
                kind: parse_enum(&row.get::<String>(3)?)?,
                expiry_date,
                state: check_state(Some(expiry_date), today, warning_days),
            });
        }
        Ok(expiring)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, chapter, date, mentor, test_service};

    fn referee(last_name: &str) -> NewReference {
        NewReference {
            first_name: "Sam".into(),
            last_name: last_name.into(),
            mobile: "0400 000 000".into(),
            ..NewReference::default()
        }
    }

    fn check(expiry_date: NaiveDate) -> CheckInput {
        CheckInput {
            reference_number: Some("PC-1".into()),
            expiry_date,
            file_path: None,
        }
    }

    #[tokio::test]
    async fn mentor_becomes_ready() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let today = date(2026, 3, 1);

        let summary = svc.compliance_summary(m.id(), today, 30).await.unwrap();
        assert!(!summary.ready_to_mentor);
        assert_eq!(summary.police_check, ComplianceState::Missing);

        for name in ["One", "Two"] {
            let r = svc.add_reference(&admin(), m.id(), referee(name)).await.unwrap();
            let called = svc
                .record_reference_call(&admin(), &r.id, today, true, Some("Glowing"))
                .await
                .unwrap();
            assert_eq!(called.called_by.as_deref(), Some("ops-admin"));
        }
        svc.upsert_police_check(&admin(), m.id(), check(date(2027, 3, 1))).await.unwrap();
        svc.upsert_wwc_check(&admin(), m.id(), check(date(2030, 1, 1))).await.unwrap();
        svc.record_induction(&admin(), m.id(), today, "Coordinator", None).await.unwrap();
        svc.record_mrc_approval(&admin(), m.id(), today, None).await.unwrap();

        let summary = svc.compliance_summary(m.id(), today, 30).await.unwrap();
        assert_eq!(summary.references_recommended, 2);
        assert!(summary.induction_done);
        assert!(summary.ready_to_mentor);
    }

    #[tokio::test]
    async fn upsert_replaces_previous_check() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        svc.upsert_police_check(&admin(), m.id(), check(date(2026, 1, 1))).await.unwrap();
        svc.upsert_police_check(&admin(), m.id(), check(date(2029, 1, 1))).await.unwrap();
        let stored = svc.get_check(m.id(), CheckKind::Police).await.unwrap().unwrap();
        assert_eq!(stored.expiry_date, date(2029, 1, 1));
    }

    #[tokio::test]
    async fn expiring_checks_by_chapter() {
        let svc = test_service().await;
        let c1 = chapter(&svc, "Carlton").await;
        let c2 = chapter(&svc, "Footscray").await;
        let m1 = mentor(&svc, c1.id(), "a@example.org").await;
        let m2 = mentor(&svc, c2.id(), "b@example.org").await;
        let today = date(2026, 3, 1);

        svc.upsert_police_check(&admin(), m1.id(), check(date(2026, 2, 1))).await.unwrap();
        svc.upsert_wwc_check(&admin(), m1.id(), check(date(2026, 3, 20))).await.unwrap();
        svc.upsert_wwc_check(&admin(), m2.id(), check(date(2026, 3, 10))).await.unwrap();
        svc.upsert_police_check(&admin(), m2.id(), check(date(2028, 1, 1))).await.unwrap();

        let all = svc.list_expiring_checks(None, today, 30).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].state, ComplianceState::Expired);
        assert_eq!(all[1].mentor_id, m2.id());

        let carlton = svc.list_expiring_checks(Some(c1.id()), today, 30).await.unwrap();
        assert_eq!(carlton.len(), 2);
        assert!(carlton.iter().all(|c| c.chapter_id == c1.id()));
    }

    #[tokio::test]
    async fn mentor_cannot_record_own_checks() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let err = svc
            .upsert_police_check(&Actor::mentor(m.id()), m.id(), check(date(2027, 1, 1)))
            .await
            .unwrap_err();
        assert!(err.is_forbidden());
    }
}
