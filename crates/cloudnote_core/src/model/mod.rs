//! Domain model for remote-backed notes.
//!
//! # Responsibility
//! - Define the note record exchanged with the remote store.
//! - Define the draft payload used by create/update requests.
//!
//! # Invariants
//! - Every note is identified by a server-assigned `NoteId`.
//! - Notes are immutable values; mutations replace records by id.

pub mod note;
