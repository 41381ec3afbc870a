//! Repository modules implementing operations for all mentorbase records.
//!
//! Each module adds methods to `ProgramService` via `impl ProgramService` blocks.

pub mod assignment;
pub mod attendance;
pub mod audit;
pub mod chapter;
pub mod compliance;
pub mod contact;
pub mod eoi;
pub mod goal;
pub mod mentor;
pub mod reminder;
pub mod report;
pub mod session;
pub mod student;
pub mod term;
pub mod transfer;
