//! Store contract shared by the HTTP client and test doubles.
//!
//! # Responsibility
//! - Name the five logical note operations.
//! - Classify failures into remote, decode and empty-result errors.
//!
//! # Invariants
//! - `update`/`delete` report an unconfirmed outcome as `Ok(false)`, never
//!   as an error.

use crate::model::note::{Note, NoteDraft};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a single store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Transport failure (`status = None`) or non-success HTTP status.
    Remote {
        status: Option<u16>,
        message: String,
    },
    /// Response body could not be decoded into note records.
    Decode {
        operation: &'static str,
        message: String,
    },
    /// Create was accepted but no record came back.
    EmptyResult { operation: &'static str },
}

impl StoreError {
    /// Short stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Remote { .. } => "remote_error",
            Self::Decode { .. } => "decode_error",
            Self::EmptyResult { .. } => "empty_result",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote {
                status: Some(status),
                message,
            } => write!(f, "remote store returned status {status}: {message}"),
            Self::Remote {
                status: None,
                message,
            } => write!(f, "remote store request failed: {message}"),
            Self::Decode { operation, message } => {
                write!(f, "failed to decode `{operation}` response: {message}")
            }
            Self::EmptyResult { operation } => {
                write!(f, "remote store returned no records for `{operation}`")
            }
        }
    }
}

impl Error for StoreError {}

/// Logical operations against the remote notes collection.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Lists all notes, newest-first by id descending.
    async fn list(&self) -> StoreResult<Vec<Note>>;
    /// Lists notes whose title or content contains `term` case-insensitively.
    async fn search(&self, term: &str) -> StoreResult<Vec<Note>>;
    /// Inserts one note and returns it with its server-assigned id.
    async fn create(&self, draft: &NoteDraft) -> StoreResult<Note>;
    /// Replaces title/content of one note; `Ok(false)` when not confirmed.
    async fn update(&self, id: &str, draft: &NoteDraft) -> StoreResult<bool>;
    /// Deletes one note; `Ok(false)` when not confirmed.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
impl<T: NoteStore + ?Sized> NoteStore for Arc<T> {
    async fn list(&self) -> StoreResult<Vec<Note>> {
        (**self).list().await
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Note>> {
        (**self).search(term).await
    }

    async fn create(&self, draft: &NoteDraft) -> StoreResult<Note> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &str, draft: &NoteDraft) -> StoreResult<bool> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        (**self).delete(id).await
    }
}
