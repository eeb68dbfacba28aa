//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate time resolution and repository calls into use-case
//!   level APIs.
//! - Keep transport/UI layers decoupled from storage details.

pub mod event_service;
pub mod user_service;
