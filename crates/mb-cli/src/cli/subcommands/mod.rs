mod chapter;
mod compliance;
mod contact;
mod goal;
mod mentor;
mod remind;
mod report;
mod session;
mod student;
mod term;
mod transfer;

pub use chapter::{AddressArgs, ChapterCommands};
pub use compliance::{CheckArgs, ComplianceCommands, ReferenceCommands};
pub use contact::{EoiCommands, GuardianCommands, TeacherCommands};
pub use goal::GoalCommands;
pub use mentor::MentorCommands;
pub use remind::RemindCommands;
pub use report::ReportCommands;
pub use session::SessionCommands;
pub use student::StudentCommands;
pub use term::TermCommands;
pub use transfer::{ExportCommands, ImportCommands};
