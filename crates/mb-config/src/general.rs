//! General application configuration.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default page size for list commands.
const fn default_page_size() -> u32 {
    20
}

fn default_session_weekday() -> String {
    "saturday".to_string()
}

const fn default_compliance_warning_days() -> i64 {
    30
}

const fn default_report_reminder_days() -> i64 {
    7
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default page size for list commands.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Day of the week sessions run on (e.g. "saturday", "sat").
    #[serde(default = "default_session_weekday")]
    pub session_weekday: String,

    /// Checks expiring within this many days are flagged.
    #[serde(default = "default_compliance_warning_days")]
    pub compliance_warning_days: i64,

    /// Draft reports this many days past their session get a reminder.
    #[serde(default = "default_report_reminder_days")]
    pub report_reminder_days: i64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            session_weekday: default_session_weekday(),
            compliance_warning_days: default_compliance_warning_days(),
            report_reminder_days: default_report_reminder_days(),
        }
    }
}

impl GeneralConfig {
    /// Parse `session_weekday`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if it is not a weekday name.
    pub fn weekday(&self) -> Result<Weekday, ConfigError> {
        self.session_weekday
            .trim()
            .parse::<Weekday>()
            .map_err(|_| ConfigError::InvalidValue {
                field: "general.session_weekday".into(),
                reason: format!("'{}' is not a day of the week", self.session_weekday),
            })
    }
}
