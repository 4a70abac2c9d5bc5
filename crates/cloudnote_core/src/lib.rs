//! Core domain logic for CloudNote.
//! This crate is the single source of truth for note synchronization rules.

pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, RemoteConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LogLevel, LogOptions,
    LoggingError,
};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use service::note_service::{NoteService, NoteServiceError, SearchOutcome, ServiceResult};
pub use service::notes_state::{NotesSnapshot, ViewMode};
pub use store::note_store::{NoteStore, StoreError, StoreResult};
pub use store::rest::RestNoteStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
