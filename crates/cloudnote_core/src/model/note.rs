//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its wire shape.
//! - Provide draft validation used by presentation adapters.
//!
//! # Invariants
//! - `id` is assigned by the remote store and never generated client-side.
//! - A note is never edited in place; updates produce a new record.

use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Server-assigned opaque note identifier.
pub type NoteId = String;

/// One note as last confirmed by the remote store.
///
/// Wire shape: `{"id": string, "title": string, "content": string}`.
/// Unknown fields are ignored; an integer `id` is accepted and normalized
/// to its decimal string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(deserialize_with = "deserialize_note_id")]
    pub id: NoteId,
    pub title: String,
    pub content: String,
}

impl Note {
    pub fn new(
        id: impl Into<NoteId>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Returns a new record with the same id and the draft's text.
    pub fn revised(&self, draft: &NoteDraft) -> Self {
        Self {
            id: self.id.clone(),
            title: draft.title.clone(),
            content: draft.content.clone(),
        }
    }
}

/// Title/content payload for create and update requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Rejects blank title or content.
    ///
    /// The state manager accepts any text; this check belongs to callers
    /// collecting user input before submission.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::BlankTitle);
        }
        if self.content.trim().is_empty() {
            return Err(NoteValidationError::BlankContent);
        }
        Ok(())
    }
}

/// Draft validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankTitle,
    BlankContent,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::BlankContent => write!(f, "note content must not be blank"),
        }
    }
}

impl Error for NoteValidationError {}

pub(crate) fn deserialize_note_id<'de, D>(deserializer: D) -> Result<NoteId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum WireId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match WireId::deserialize(deserializer)? {
        WireId::Text(value) => value,
        WireId::Signed(value) => value.to_string(),
        WireId::Unsigned(value) => value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteDraft, NoteValidationError};

    #[test]
    fn decodes_string_and_integer_ids() {
        let notes: Vec<Note> = serde_json::from_str(
            r#"[{"id":"abc","title":"a","content":"b"},{"id":42,"title":"c","content":"d","created_at":"x"}]"#,
        )
        .expect("wire notes should decode");
        assert_eq!(notes[0].id, "abc");
        assert_eq!(notes[1].id, "42");
    }

    #[test]
    fn revised_keeps_id_and_replaces_text() {
        let note = Note::new("7", "old", "body");
        let revised = note.revised(&NoteDraft::new("new", "text"));
        assert_eq!(revised, Note::new("7", "new", "text"));
        assert_eq!(note.title, "old");
    }

    #[test]
    fn draft_validation_rejects_blank_fields() {
        assert_eq!(
            NoteDraft::new("  ", "body").validate(),
            Err(NoteValidationError::BlankTitle)
        );
        assert_eq!(
            NoteDraft::new("title", "\n").validate(),
            Err(NoteValidationError::BlankContent)
        );
        assert!(NoteDraft::new("title", "body").validate().is_ok());
    }

    #[test]
    fn draft_serializes_title_and_content_only() {
        let body = serde_json::to_value(NoteDraft::new("Groceries", "Milk")).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Groceries", "content": "Milk"}));
    }
}
