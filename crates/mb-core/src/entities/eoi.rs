use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Answers from a mentor's expression of interest. One per mentor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MentorEoi {
    pub mentor_id: String,
    pub best_time_to_contact: Option<String>,
    pub occupation: Option<String>,
    pub volunteer_experience: Option<String>,
    pub mentoring_level: Option<String>,
    pub hobbies: Option<String>,
    pub mentoring_subjects: Option<String>,
    pub how_did_you_hear: Option<String>,
    pub why_mentor: Option<String>,
    pub about_me: Option<String>,
    pub preferred_frequency: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
