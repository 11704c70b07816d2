//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep transport/UI layers decoupled from storage details.
//!
//! # Invariants
//! - Services receive an already-authenticated `UserId`; they never parse
//!   credentials.
//! - Draft cleanup triggered by note writes is best-effort: failures are
//!   logged, never silently swallowed, and never fail the primary write.

pub mod account_service;
pub mod draft_service;
pub mod note_service;
