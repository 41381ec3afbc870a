use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A learning goal set for a student, optionally owned by a mentor.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Goal {
    pub id: String,
    pub student_id: String,
    pub mentor_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub end_date: Option<NaiveDate>,
    pub is_achieved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
