//! Domain records for mentorbase.
//!
//! Mentor, Student, and Chapter are aggregates with private fields whose
//! invariants are enforced by their methods. The remaining records are plain
//! structs mapping one-to-one onto database rows. All of them serialize with
//! serde and derive `JsonSchema` for import/export validation.

mod assignment;
mod audit;
mod chapter;
mod compliance;
mod contact;
mod eoi;
mod goal;
mod import;
mod mentor;
mod session;
mod student;
mod term;

pub use assignment::MentorStudentAssignment;
pub use audit::AuditEntry;
pub use chapter::{Chapter, ChapterSnapshot};
pub use compliance::{
    BackgroundCheck, ComplianceRecords, ComplianceSummary, Induction,
    MIN_RECOMMENDED_REFERENCES, MrcApproval, Reference, check_state,
};
pub use contact::{Guardian, Teacher};
pub use eoi::MentorEoi;
pub use goal::Goal;
pub use import::{ImportReport, ImportRowOutcome, ImportedHistory, MentorImportRow, StudentImportRow};
pub use mentor::{Mentor, MentorProfileUpdate, MentorSnapshot, NewMentor};
pub use session::{Session, StudentSession};
pub use student::{NewStudent, Student, StudentProfileUpdate, StudentSnapshot};
pub use term::SchoolTerm;
