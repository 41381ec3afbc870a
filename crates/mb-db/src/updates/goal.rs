//! Goal update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct GoalUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_id: Option<Option<String>>,
}

#[derive(Default)]
pub struct GoalUpdateBuilder(GoalUpdate);

impl GoalUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(GoalUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.0.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn mentor_id(mut self, mentor_id: Option<String>) -> Self {
        self.0.mentor_id = Some(mentor_id);
        self
    }

    #[must_use]
    pub fn build(self) -> GoalUpdate {
        self.0
    }
}
