use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

#[cfg(test)]
mod tests {
    use mb_core::enums::{AuditAction, ReportStatus};
    use mb_db::query::ArchiveFilter;

    use super::parse_enum;

    #[test]
    fn parses_snake_case_enum() {
        let status: ReportStatus = parse_enum("signed_off", "status").unwrap();
        assert_eq!(status, ReportStatus::SignedOff);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let action: AuditAction = parse_enum("status-changed", "action").unwrap();
        assert_eq!(action, AuditAction::StatusChanged);
        let archive: ArchiveFilter = parse_enum("all", "archive").unwrap();
        assert_eq!(archive, ArchiveFilter::All);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<ArchiveFilter>("deleted", "archive").unwrap_err();
        assert!(err.to_string().contains("invalid archive 'deleted'"));
    }
}
