//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! are applied. The update is serialized as the audit `detail` payload (changed
//! fields only).

pub mod chapter;
pub mod goal;
