//! Student goal repository.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mb_core::access::Actor;
use mb_core::entities::Goal;
use mb_core::enums::{AuditAction, EntityType};
use mb_core::ids::PREFIX_GOAL;
use mb_core::values::{non_empty, required};

use crate::error::DatabaseError;
use crate::helpers::{fmt_date, get_bool, get_opt_string, parse_datetime, parse_optional_date, to_detail};
use crate::service::ProgramService;
use crate::updates::goal::GoalUpdate;

const SELECT_COLS: &str =
    "id, student_id, mentor_id, title, description, end_date, is_achieved, created_at, updated_at";

/// Input for [`ProgramService::create_goal`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGoal {
    pub student_id: String,
    pub mentor_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub end_date: Option<NaiveDate>,
}

fn row_to_goal(row: &libsql::Row) -> Result<Goal, DatabaseError> {
    Ok(Goal {
        id: row.get(0)?,
        student_id: row.get(1)?,
        mentor_id: get_opt_string(row, 2)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        end_date: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        is_achieved: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl ProgramService {
    async fn save_goal(&self, goal: &Goal) -> Result<(), DatabaseError> {
        self.db()
            .conn()
            .execute(
                "UPDATE goals SET mentor_id = ?1, title = ?2, description = ?3, end_date = ?4,
                     is_achieved = ?5, updated_at = ?6
                 WHERE id = ?7",
                libsql::params![
                    goal.mentor_id.as_deref(),
                    goal.title.as_str(),
                    goal.description.as_deref(),
                    goal.end_date.map(fmt_date),
                    i64::from(goal.is_achieved),
                    goal.updated_at.to_rfc3339(),
                    goal.id.as_str()
                ],
            )
            .await?;
        Ok(())
    }

    async fn goal_for_update(&self, actor: &Actor, id: &str) -> Result<Goal, DatabaseError> {
        let goal = self.get_goal(id).await?;
        let student = self.get_student(&goal.student_id).await?;
        self.ensure_student_access(actor, &student).await?;
        Ok(goal)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank title and `NoResult` for an unknown
    /// student or mentor.
    pub async fn create_goal(&self, actor: &Actor, new: NewGoal) -> Result<Goal, DatabaseError> {
        let student = self.get_student(&new.student_id).await?;
        self.ensure_student_access(actor, &student).await?;
        if let Some(ref mentor_id) = new.mentor_id {
            self.get_mentor(mentor_id).await?;
        }

        let now = Self::now();
        let goal = Goal {
            id: self.db().generate_id(PREFIX_GOAL).await?,
            student_id: new.student_id,
            mentor_id: new.mentor_id,
            title: required("goal title", &new.title)?,
            description: non_empty(new.description.as_deref()),
            end_date: new.end_date,
            is_achieved: false,
            created_at: now,
            updated_at: now,
        };
        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO goals ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                ),
                libsql::params![
                    goal.id.as_str(),
                    goal.student_id.as_str(),
                    goal.mentor_id.as_deref(),
                    goal.title.as_str(),
                    goal.description.as_deref(),
                    goal.end_date.map(fmt_date),
                    0_i64,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        self.audit(actor, EntityType::Goal, &goal.id, AuditAction::Created, None)
            .await?;
        Ok(goal)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no goal has this ID.
    pub async fn get_goal(&self, id: &str) -> Result<Goal, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM goals WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_goal(&row)
    }

    /// # Errors
    ///
    /// Returns `Validation` for a blank title.
    pub async fn update_goal(
        &self,
        actor: &Actor,
        id: &str,
        update: GoalUpdate,
    ) -> Result<Goal, DatabaseError> {
        let mut goal = self.goal_for_update(actor, id).await?;
        if let Some(ref title) = update.title {
            goal.title = required("goal title", title)?;
        }
        if let Some(ref description) = update.description {
            goal.description = non_empty(description.as_deref());
        }
        if let Some(end_date) = update.end_date {
            goal.end_date = end_date;
        }
        if let Some(ref mentor_id) = update.mentor_id {
            if let Some(mentor_id) = mentor_id {
                self.get_mentor(mentor_id).await?;
            }
            goal.mentor_id.clone_from(mentor_id);
        }
        goal.updated_at = Self::now();
        self.save_goal(&goal).await?;
        self.audit(
            actor,
            EntityType::Goal,
            id,
            AuditAction::Updated,
            Some(to_detail(&update)?),
        )
        .await?;
        Ok(goal)
    }

    /// # Errors
    ///
    /// Returns `NoResult` if no goal has this ID.
    pub async fn set_goal_achieved(
        &self,
        actor: &Actor,
        id: &str,
        achieved: bool,
    ) -> Result<Goal, DatabaseError> {
        let mut goal = self.goal_for_update(actor, id).await?;
        if goal.is_achieved == achieved {
            return Ok(goal);
        }
        goal.is_achieved = achieved;
        goal.updated_at = Self::now();
        self.save_goal(&goal).await?;
        self.audit(
            actor,
            EntityType::Goal,
            id,
            AuditAction::Updated,
            Some(serde_json::json!({ "is_achieved": achieved })),
        )
        .await?;
        Ok(goal)
    }

    /// Open goals first, then by due date.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_goals_for_student(&self, student_id: &str) -> Result<Vec<Goal>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM goals WHERE student_id = ?1
                     ORDER BY is_achieved, end_date IS NULL, end_date, created_at"
                ),
                [student_id],
            )
            .await?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next().await? {
            goals.push(row_to_goal(&row)?);
        }
        Ok(goals)
    }

    /// # Errors
    ///
    /// Returns `NoResult` if no goal has this ID.
    pub async fn delete_goal(&self, actor: &Actor, id: &str) -> Result<(), DatabaseError> {
        self.goal_for_update(actor, id).await?;
        self.db()
            .conn()
            .execute("DELETE FROM goals WHERE id = ?1", [id])
            .await?;
        self.audit(actor, EntityType::Goal, id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}
