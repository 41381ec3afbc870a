pub mod assignment;
pub mod attendance;
pub mod audit;
pub mod chapter;
pub mod compliance;
pub mod contact;
pub mod dispatch;
pub mod goal;
pub mod init;
pub mod mentor;
pub mod remind;
pub mod report;
pub mod session;
pub mod shared;
pub mod student;
pub mod term;
pub mod transfer;
