use std::path::Path;

use anyhow::Context;
use mb_config::{LOCAL_CONFIG_FILE, MentorbaseConfig};
use mb_db::service::ProgramService;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::output::output;

const CONFIG_TEMPLATE: &str = r#"# mentorbase configuration. Environment variables override these values,
# e.g. MENTORBASE_NOTIFICATION__API_KEY.

[database]
path = "mentorbase.db"

[notification]
base_url = ""
api_key = ""
timeout_secs = 10

[general]
default_page_size = 20
session_weekday = "saturday"
compliance_warning_days = 30
report_reminder_days = 7
"#;

/// Handle `mb init`.
pub async fn handle(args: &InitArgs, config: &MentorbaseConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config_path = Path::new(LOCAL_CONFIG_FILE);
    let written = write_template(config_path, args.force)?;

    ProgramService::new_local(&config.database.path)
        .await
        .with_context(|| format!("failed to create database '{}'", config.database.path))?;
    tracing::info!(db = %config.database.path, "database ready");

    output(
        &json!({
            "config_file": config_path.display().to_string(),
            "config_written": written,
            "database": config.database.path,
        }),
        flags.format,
    )
}

fn write_template(path: &Path, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    std::fs::write(path, CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_keeps_existing_file_unless_forced() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);

        assert!(write_template(&path, false).unwrap());
        std::fs::write(&path, "# edited").unwrap();
        assert!(!write_template(&path, false).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# edited");

        assert!(write_template(&path, true).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), CONFIG_TEMPLATE);
    }

    #[test]
    fn template_loads_as_default_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(LOCAL_CONFIG_FILE);
        write_template(&path, false).unwrap();

        let config = MentorbaseConfig::load_from(&path).unwrap();
        assert_eq!(config.database.path, "mentorbase.db");
        assert_eq!(config.general.report_reminder_days, 7);
        assert!(!config.notification.is_configured());
    }
}
