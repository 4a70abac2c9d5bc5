//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate remote store calls into use-case level commands.
//! - Keep UI/FFI layers decoupled from HTTP details.

pub mod note_service;
pub mod notes_state;
