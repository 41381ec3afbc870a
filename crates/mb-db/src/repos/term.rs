//! School term repository.

use chrono::NaiveDate;

use mb_core::access::Actor;
use mb_core::entities::SchoolTerm;
use mb_core::enums::{AuditAction, EntityType};
use mb_core::ids::PREFIX_TERM;

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, parse_date, parse_datetime};
use crate::service::ProgramService;

const SELECT_COLS: &str = "id, year, label, start_date, end_date, created_at";

fn row_to_term(row: &libsql::Row) -> Result<SchoolTerm, DatabaseError> {
    let year: i64 = row.get(1)?;
    Ok(SchoolTerm {
        id: row.get(0)?,
        year: i32::try_from(year).map_err(|e| DatabaseError::Query(e.to_string()))?,
        label: row.get(2)?,
        start_date: parse_date(&row.get::<String>(3)?)?,
        end_date: parse_date(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl ProgramService {
    async fn query_terms(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<SchoolTerm>, DatabaseError> {
        let mut rows = self.db().conn().query(sql, params).await?;
        let mut terms = Vec::new();
        while let Some(row) = rows.next().await? {
            terms.push(row_to_term(&row)?);
        }
        Ok(terms)
    }

    /// Create a term. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank label or inverted dates, and
    /// `InvalidState` if the term overlaps an existing one.
    pub async fn create_term(
        &self,
        actor: &Actor,
        label: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<SchoolTerm, DatabaseError> {
        actor.ensure_admin()?;
        let id = self.db().generate_id(PREFIX_TERM).await?;
        let term = SchoolTerm::new(id, label, start_date, end_date, Self::now())?;

        let clashes = self
            .query_terms(
                &format!(
                    "SELECT {SELECT_COLS} FROM school_terms
                     WHERE start_date <= ?1 AND ?2 <= end_date"
                ),
                [fmt_date(term.end_date), fmt_date(term.start_date)],
            )
            .await?;
        if let Some(other) = clashes.first() {
            return Err(DatabaseError::InvalidState(format!(
                "term '{}' overlaps '{}' ({} to {})",
                term.label, other.label, other.start_date, other.end_date
            )));
        }

        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO school_terms ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                libsql::params![
                    term.id.as_str(),
                    i64::from(term.year),
                    term.label.as_str(),
                    fmt_date(term.start_date),
                    fmt_date(term.end_date),
                    term.created_at.to_rfc3339()
                ],
            )
            .await?;
        self.audit(actor, EntityType::Term, &term.id, AuditAction::Created, None)
            .await?;
        Ok(term)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no term has this ID.
    pub async fn get_term(&self, id: &str) -> Result<SchoolTerm, DatabaseError> {
        self.query_terms(&format!("SELECT {SELECT_COLS} FROM school_terms WHERE id = ?1"), [id])
            .await?
            .into_iter()
            .next()
            .ok_or(DatabaseError::NoResult)
    }

    /// Terms in start order, optionally for one year.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_terms(&self, year: Option<i32>) -> Result<Vec<SchoolTerm>, DatabaseError> {
        match year {
            Some(year) => {
                self.query_terms(
                    &format!(
                        "SELECT {SELECT_COLS} FROM school_terms WHERE year = ?1 ORDER BY start_date"
                    ),
                    [i64::from(year)],
                )
                .await
            }
            None => {
                self.query_terms(
                    &format!("SELECT {SELECT_COLS} FROM school_terms ORDER BY start_date"),
                    (),
                )
                .await
            }
        }
    }

    /// The term containing `today`, or failing that the next one to start.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn current_term(&self, today: NaiveDate) -> Result<Option<SchoolTerm>, DatabaseError> {
        let terms = self
            .query_terms(
                &format!(
                    "SELECT {SELECT_COLS} FROM school_terms
                     WHERE end_date >= ?1 ORDER BY start_date LIMIT 1"
                ),
                [fmt_date(today)],
            )
            .await?;
        Ok(terms.into_iter().next())
    }

    /// # Errors
    ///
    /// Returns `Forbidden` for non-admins and `NoResult` for an unknown term.
    pub async fn delete_term(&self, actor: &Actor, id: &str) -> Result<(), DatabaseError> {
        actor.ensure_admin()?;
        self.get_term(id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM school_terms WHERE id = ?1", [id])
            .await?;
        self.audit(actor, EntityType::Term, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}
