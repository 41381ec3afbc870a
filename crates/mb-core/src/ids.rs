//! ID prefix constants.
//!
//! IDs are `"{prefix}-{8 hex chars}"`, generated in SQL by `ProgramDb::generate_id`.

pub const PREFIX_CHAPTER: &str = "chp";
pub const PREFIX_MENTOR: &str = "mtr";
pub const PREFIX_STUDENT: &str = "stu";
pub const PREFIX_ASSIGNMENT: &str = "asg";
pub const PREFIX_SESSION: &str = "ses";
pub const PREFIX_STUDENT_SESSION: &str = "sts";
pub const PREFIX_GOAL: &str = "gol";
pub const PREFIX_TERM: &str = "trm";
pub const PREFIX_REFERENCE: &str = "ref";
pub const PREFIX_GUARDIAN: &str = "grd";
pub const PREFIX_TEACHER: &str = "tch";
pub const PREFIX_IMPORT: &str = "imp";
pub const PREFIX_IMPORT_BATCH: &str = "bat";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for tests that exercise ID generation.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_CHAPTER,
    PREFIX_MENTOR,
    PREFIX_STUDENT,
    PREFIX_ASSIGNMENT,
    PREFIX_SESSION,
    PREFIX_STUDENT_SESSION,
    PREFIX_GOAL,
    PREFIX_TERM,
    PREFIX_REFERENCE,
    PREFIX_GUARDIAN,
    PREFIX_TEACHER,
    PREFIX_IMPORT,
    PREFIX_IMPORT_BATCH,
    PREFIX_AUDIT,
];
