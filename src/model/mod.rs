//! Domain records for accounts, notes and drafts.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Own field-level validation and normalization rules.
//!
//! # Invariants
//! - Every record is identified by a stable UUID and scoped to one owner.
//! - A persisted note always carries a non-empty title and content; partial
//!   state lives only in drafts.

pub mod draft;
pub mod note;
pub mod user;
