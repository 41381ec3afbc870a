//! Local database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "mentorbase.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file. `:memory:` opens a throwaway database.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_file_in_cwd() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, "mentorbase.db");
        assert!(!config.is_in_memory());
    }
}
