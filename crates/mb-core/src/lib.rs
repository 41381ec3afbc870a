//! # mb-core
//!
//! Core types, ID prefixes, and error types for mentorbase.
//!
//! This crate provides the foundational types shared across all mentorbase crates:
//! - Value objects (`Email`, `Address`, `EmergencyContact`, `NextOfKin`)
//! - Aggregates with invariants (`Mentor`, `Chapter`, `Student`,
//!   `MentorStudentAssignment`) and plain record entities
//! - Status enums with state machine transitions
//! - Role-based access rules
//! - ID prefix constants
//! - Cross-cutting error types

pub mod access;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod values;
