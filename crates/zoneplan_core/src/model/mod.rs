//! Domain model for users, events and their change history.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep event field comparison closed over declared fields.
//!
//! # Invariants
//! - Every domain object is identified by a stable UUID.
//! - Event history is append-only; records are never edited or removed.

pub mod event;
pub mod user;
