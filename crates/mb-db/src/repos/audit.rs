//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation and the actor behind it.

use chrono::{DateTime, Utc};

use mb_core::access::Actor;
use mb_core::entities::AuditEntry;
use mb_core::enums::{AuditAction, EntityType};
use mb_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::query::WhereClause;
use crate::service::ProgramService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        actor_id: row.get::<String>(1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl ProgramService {
    /// Append an audit entry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "INSERT INTO audit_trail (id, actor_id, entity_type, entity_id, action, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    entry.id.as_str(),
                    entry.actor_id.as_str(),
                    entry.entity_type.as_str(),
                    entry.entity_id.as_str(),
                    entry.action.as_str(),
                    entry.detail.as_ref().map(ToString::to_string),
                    entry.created_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Record a mutation by `actor`. Called by every mutation method.
    pub(crate) async fn audit(
        &self,
        actor: &Actor,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
    ) -> Result<(), DatabaseError> {
        let id = self.db().generate_id(PREFIX_AUDIT).await?;
        self.append_audit(&AuditEntry {
            id,
            actor_id: actor.id.clone(),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at: Self::now(),
        })
        .await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut clause = WhereClause::default();
        if let Some(et) = filter.entity_type {
            clause.bind("entity_type = {}", et.as_str());
        }
        if let Some(ref eid) = filter.entity_id {
            clause.bind("entity_id = {}", eid.as_str());
        }
        if let Some(action) = filter.action {
            clause.bind("action = {}", action.as_str());
        }
        if let Some(ref actor) = filter.actor_id {
            clause.bind("actor_id = {}", actor.as_str());
        }
        if let Some(since) = filter.since {
            clause.bind("created_at >= {}", since.to_rfc3339());
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor_id, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            clause.sql()
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(clause.params()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, test_service};

    #[tokio::test]
    async fn audit_append_and_filter() {
        let svc = test_service().await;
        let actor = admin();
        svc.audit(&actor, EntityType::Mentor, "mtr-1", AuditAction::Created, None)
            .await
            .unwrap();
        svc.audit(
            &actor,
            EntityType::Mentor,
            "mtr-1",
            AuditAction::Archived,
            Some(serde_json::json!({"reason": "Moved"})),
        )
        .await
        .unwrap();
        svc.audit(&Actor::mentor("mtr-2"), EntityType::Student, "stu-1", AuditAction::Updated, None)
            .await
            .unwrap();

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let mentor_entries = svc
            .query_audit(&AuditFilter {
                entity_id: Some("mtr-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(mentor_entries.len(), 2);
        assert_eq!(mentor_entries[0].action, AuditAction::Archived);
        assert_eq!(
            mentor_entries[0].detail,
            Some(serde_json::json!({"reason": "Moved"}))
        );

        let by_actor = svc
            .query_audit(&AuditFilter {
                actor_id: Some("mtr-2".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_actor.len(), 1);
        assert_eq!(by_actor[0].entity_type, EntityType::Student);
    }
}
