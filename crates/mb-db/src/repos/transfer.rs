//! Bulk import and export.
//!
//! Imports take already-parsed rows (spreadsheet conversion happens outside
//! this crate). Each row is created in its own transaction so one bad row
//! never aborts the batch, and every row's outcome lands in
//! `imported_history` under the batch ID. Exports return snapshot structs
//! suitable for JSON Lines.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use mb_core::access::Actor;
use mb_core::entities::{
    ImportReport, ImportRowOutcome, ImportedHistory, MentorImportRow, MentorSnapshot,
    StudentImportRow, StudentSnapshot,
};
use mb_core::enums::{AuditAction, EntityType, ImportKind, ReportStatus};
use mb_core::ids::{PREFIX_IMPORT, PREFIX_IMPORT_BATCH};

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, get_opt_string, parse_date, parse_datetime, parse_enum, parse_optional_datetime};
use crate::repos::{mentor, student};
use crate::service::ProgramService;

/// One booked student in a session export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionExportRow {
    pub session_id: String,
    pub attend_on: NaiveDate,
    pub chapter_id: String,
    pub mentor_id: String,
    pub mentor_name: String,
    pub student_session_id: String,
    pub student_id: String,
    pub student_name: String,
    pub status: ReportStatus,
    pub report: Option<String>,
    pub completed_on: Option<DateTime<Utc>>,
    pub signed_off_on: Option<DateTime<Utc>>,
    pub signed_off_by: Option<String>,
}

/// Read a JSON Lines file into typed rows.
///
/// # Errors
///
/// Returns `DatabaseError::Other` naming the line that failed to parse.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DatabaseError> {
    let lines = serde_jsonlines::json_lines::<T, _>(path)
        .map_err(|e| anyhow::anyhow!("failed to open {}: {e}", path.display()))?;
    let mut rows = Vec::new();
    for (idx, line) in lines.enumerate() {
        rows.push(line.map_err(|e| anyhow::anyhow!("{} line {}: {e}", path.display(), idx + 1))?);
    }
    Ok(rows)
}

/// Write rows to a JSON Lines file, replacing it.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if the file cannot be written.
pub fn write_jsonl<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DatabaseError> {
    serde_jsonlines::write_json_lines(path, rows)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(())
}

/// Chapter name to ID, resolved once per batch.
struct ChapterCache(HashMap<String, Option<String>>);

impl ChapterCache {
    fn new() -> Self {
        Self(HashMap::new())
    }

    async fn resolve(&mut self, svc: &ProgramService, name: &str) -> Result<String, DatabaseError> {
        let key = name.trim().to_lowercase();
        if !self.0.contains_key(&key) {
            let id = match svc.get_chapter_by_name(name).await {
                Ok(chapter) => Some(chapter.id().to_string()),
                Err(DatabaseError::NoResult) => None,
                Err(e) => return Err(e),
            };
            self.0.insert(key.clone(), id);
        }
        self.0
            .get(&key)
            .cloned()
            .flatten()
            .ok_or_else(|| DatabaseError::InvalidState(format!("unknown chapter '{}'", name.trim())))
    }
}

impl ProgramService {
    async fn record_import_row(
        &self,
        batch_id: &str,
        kind: ImportKind,
        outcome: &ImportRowOutcome,
    ) -> Result<(), DatabaseError> {
        let id = self.db().generate_id(PREFIX_IMPORT).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO imported_history (id, batch_id, kind, row_number, entity_id, error, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    id,
                    batch_id,
                    kind.as_str(),
                    i64::from(outcome.row_number),
                    outcome.entity_id.as_deref(),
                    outcome.error.as_deref(),
                    Self::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    async fn finish_import(
        &self,
        actor: &Actor,
        batch_id: String,
        kind: ImportKind,
        outcomes: Vec<ImportRowOutcome>,
    ) -> Result<ImportReport, DatabaseError> {
        let report = ImportReport::new(batch_id, kind, outcomes);
        self.audit(
            actor,
            EntityType::Import,
            &report.batch_id,
            AuditAction::Imported,
            Some(serde_json::json!({
                "kind": kind,
                "imported": report.imported,
                "failed": report.failed,
            })),
        )
        .await?;
        tracing::info!(
            batch = %report.batch_id,
            %kind,
            imported = report.imported,
            failed = report.failed,
            "import finished"
        );
        Ok(report)
    }

    /// Run one row's creation in a transaction, turning row-level failures
    /// into an outcome. Only storage failures outside the row abort.
    async fn import_row<F, Fut>(
        &self,
        kind: ImportKind,
        row_number: u32,
        create: F,
    ) -> Result<ImportRowOutcome, DatabaseError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<String, DatabaseError>>,
    {
        let tx = self.db().conn().transaction().await?;
        match create().await {
            Ok(entity_id) => {
                tx.commit().await?;
                Ok(ImportRowOutcome {
                    row_number,
                    entity_id: Some(entity_id),
                    error: None,
                })
            }
            Err(e) => {
                tx.rollback().await?;
                tracing::warn!(%kind, row = row_number, error = %e, "import row skipped");
                Ok(ImportRowOutcome {
                    row_number,
                    entity_id: None,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// Import mentors. Rows are numbered from 1 in input order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only when history cannot be recorded; row
    /// failures are reported in the outcome list.
    pub async fn import_mentors(
        &self,
        actor: &Actor,
        rows: Vec<MentorImportRow>,
    ) -> Result<ImportReport, DatabaseError> {
        let batch_id = self.db().generate_id(PREFIX_IMPORT_BATCH).await?;
        let mut chapters = ChapterCache::new();
        let mut outcomes = Vec::with_capacity(rows.len());

        for (row_number, row) in (1u32..).zip(rows) {
            let resolved = chapters.resolve(self, &row.chapter).await;
            let outcome = match resolved {
                Ok(chapter_id) => {
                    self.import_row(ImportKind::Mentor, row_number, || async move {
                        let new = row.into_new_mentor(chapter_id)?;
                        Ok::<_, DatabaseError>(self.create_mentor(actor, new).await?.id().to_string())
                    })
                    .await?
                }
                Err(e) => ImportRowOutcome {
                    row_number,
                    entity_id: None,
                    error: Some(e.to_string()),
                },
            };
            self.record_import_row(&batch_id, ImportKind::Mentor, &outcome)
                .await?;
            outcomes.push(outcome);
        }
        self.finish_import(actor, batch_id, ImportKind::Mentor, outcomes)
            .await
    }

    /// Import students. Rows are numbered from 1 in input order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` only when history cannot be recorded; row
    /// failures are reported in the outcome list.
    pub async fn import_students(
        &self,
        actor: &Actor,
        rows: Vec<StudentImportRow>,
    ) -> Result<ImportReport, DatabaseError> {
        let batch_id = self.db().generate_id(PREFIX_IMPORT_BATCH).await?;
        let mut chapters = ChapterCache::new();
        let mut outcomes = Vec::with_capacity(rows.len());

        for (row_number, row) in (1u32..).zip(rows) {
            let resolved = chapters.resolve(self, &row.chapter).await;
            let outcome = match resolved {
                Ok(chapter_id) => {
                    self.import_row(ImportKind::Student, row_number, || async move {
                        let new = row.into_new_student(chapter_id)?;
                        Ok::<_, DatabaseError>(self.create_student(actor, new).await?.id().to_string())
                    })
                    .await?
                }
                Err(e) => ImportRowOutcome {
                    row_number,
                    entity_id: None,
                    error: Some(e.to_string()),
                },
            };
            self.record_import_row(&batch_id, ImportKind::Student, &outcome)
                .await?;
            outcomes.push(outcome);
        }
        self.finish_import(actor, batch_id, ImportKind::Student, outcomes)
            .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_import_history(&self, batch_id: &str) -> Result<Vec<ImportedHistory>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, batch_id, kind, row_number, entity_id, error, created_at
                 FROM imported_history WHERE batch_id = ?1 ORDER BY row_number",
                [batch_id],
            )
            .await?;
        let mut history = Vec::new();
        while let Some(row) = rows.next().await? {
            let row_number: i64 = row.get(3)?;
            history.push(ImportedHistory {
                id: row.get(0)?,
                batch_id: row.get(1)?,
                kind: parse_enum(&row.get::<String>(2)?)?,
                row_number: u32::try_from(row_number)
                    .map_err(|e| DatabaseError::Query(e.to_string()))?,
                entity_id: get_opt_string(&row, 4)?,
                error: get_opt_string(&row, 5)?,
                created_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }
        Ok(history)
    }

    /// Every mentor, archived included, optionally for one chapter.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn export_mentors(&self, chapter_id: Option<&str>) -> Result<Vec<MentorSnapshot>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {} FROM mentors WHERE (?1 IS NULL OR chapter_id = ?1)
                     ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE",
                    mentor::SELECT_COLS
                ),
                libsql::params![chapter_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(mentor::row_to_mentor(&row)?.snapshot());
        }
        Ok(out)
    }

    /// Every student, archived included, optionally for one chapter.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn export_students(&self, chapter_id: Option<&str>) -> Result<Vec<StudentSnapshot>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {} FROM students WHERE (?1 IS NULL OR chapter_id = ?1)
                     ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE",
                    student::SELECT_COLS
                ),
                libsql::params![chapter_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(student::row_to_student(&row)?.snapshot());
        }
        Ok(out)
    }

    /// One row per booked student, by date.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn export_sessions(
        &self,
        chapter_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<SessionExportRow>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT s.id, s.attend_on, s.chapter_id, s.mentor_id,
                        COALESCE(m.preferred_name, m.first_name) || ' ' || m.last_name,
                        ss.id, ss.student_id,
                        COALESCE(st.preferred_name, st.first_name) || ' ' || st.last_name,
                        ss.status, ss.report, ss.completed_on, ss.signed_off_on, ss.signed_off_by
                 FROM student_sessions ss
                 JOIN sessions s ON s.id = ss.session_id
                 JOIN mentors m ON m.id = s.mentor_id
                 JOIN students st ON st.id = ss.student_id
                 WHERE s.chapter_id = ?1 AND s.attend_on BETWEEN ?2 AND ?3
                 ORDER BY s.attend_on, m.last_name COLLATE NOCASE, st.last_name COLLATE NOCASE",
                libsql::params![chapter_id, fmt_date(from), fmt_date(to)],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(SessionExportRow {
                session_id: row.get(0)?,
                attend_on: parse_date(&row.get::<String>(1)?)?,
                chapter_id: row.get(2)?,
                mentor_id: row.get(3)?,
                mentor_name: row.get(4)?,
                student_session_id: row.get(5)?,
                student_id: row.get(6)?,
                student_name: row.get(7)?,
                status: parse_enum(&row.get::<String>(8)?)?,
                report: get_opt_string(&row, 9)?,
                completed_on: parse_optional_datetime(get_opt_string(&row, 10)?.as_deref())?,
                signed_off_on: parse_optional_datetime(get_opt_string(&row, 11)?.as_deref())?,
                signed_off_by: get_opt_string(&row, 12)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{admin, chapter, date, mentor, student, test_service};
    use pretty_assertions::assert_eq;

    fn mentor_row(chapter: &str, email: &str) -> MentorImportRow {
        serde_json::from_value(serde_json::json!({
            "chapter": chapter,
            "email": email,
            "first_name": "Alex",
            "last_name": "Nguyen",
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn bad_rows_do_not_abort_batch() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        mentor(&svc, c.id(), "taken@example.org").await;

        let report = svc
            .import_mentors(
                &admin(),
                vec![
                    mentor_row("carlton", "alex@example.org"),
                    mentor_row("Nowhere", "b@example.org"),
                    mentor_row("Carlton", "TAKEN@example.org"),
                    mentor_row("Carlton", "not-an-email"),
                    mentor_row("Carlton", "sam@example.org"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.failed, 3);
        let failed: Vec<u32> = report
            .outcomes
            .iter()
            .filter(|o| !o.is_ok())
            .map(|o| o.row_number)
            .collect();
        assert_eq!(failed, vec![2, 3, 4]);
        assert!(report.outcomes[1].error.as_deref().unwrap().contains("unknown chapter"));

        let history = svc.list_import_history(&report.batch_id).await.unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history[0].entity_id, report.outcomes[0].entity_id);
        assert!(history.iter().all(|h| h.kind == ImportKind::Mentor));

        let exported = svc.export_mentors(Some(c.id())).await.unwrap();
        assert_eq!(exported.len(), 3);
    }

    #[tokio::test]
    async fn failed_row_leaves_no_audit_entry() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let coord = Actor::coordinator("ops-2", vec!["chp-other".into()]);
        let report = svc
            .import_mentors(&coord, vec![mentor_row(c.name(), "a@example.org")])
            .await
            .unwrap();
        assert_eq!(report.failed, 1);

        let created = svc
            .query_audit(&crate::repos::audit::AuditFilter {
                entity_type: Some(EntityType::Mentor),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn student_import_and_jsonl_roundtrip() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("students.jsonl");
        std::fs::write(
            &input,
            concat!(
                r#"{"chapter":"Carlton","first_name":"Mia","last_name":"Tran","year_level":5}"#,
                "\n",
                r#"{"chapter":"Carlton","first_name":"Leo","last_name":"Adams","street":"1 Main St"}"#,
                "\n",
            ),
        )
        .unwrap();

        let rows: Vec<StudentImportRow> = read_jsonl(&input).unwrap();
        let report = svc.import_students(&admin(), rows).await.unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.outcomes[1].row_number, 2);

        let exported = svc.export_students(None).await.unwrap();
        let output = dir.path().join("out.jsonl");
        write_jsonl(&output, &exported).unwrap();
        let back: Vec<StudentSnapshot> = read_jsonl(&output).unwrap();
        assert_eq!(back, exported);
        assert_eq!(back[0].year_level, Some(5));
    }

    #[tokio::test]
    async fn malformed_jsonl_names_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.jsonl");
        std::fs::write(&input, "{\"chapter\":\"C\",\"first_name\":\"A\",\"last_name\":\"B\"}\nnot json\n").unwrap();
        let err = read_jsonl::<StudentImportRow>(&input).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn session_export_rows() {
        let svc = test_service().await;
        let c = chapter(&svc, "Carlton").await;
        let m = mentor(&svc, c.id(), "jo@example.org").await;
        let s = student(&svc, c.id(), "Tran").await;
        svc.book_session(&admin(), c.id(), m.id(), s.id(), date(2026, 2, 7))
            .await
            .unwrap();
        svc.book_session(&admin(), c.id(), m.id(), s.id(), date(2026, 3, 7))
            .await
            .unwrap();

        let rows = svc
            .export_sessions(c.id(), date(2026, 2, 1), date(2026, 2, 28))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].student_name, "Mia Tran");
        assert_eq!(rows[0].status, ReportStatus::Draft);
    }
}
