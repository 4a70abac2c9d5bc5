//! Session state published by the notes service.
//!
//! # Responsibility
//! - Model the `Unloaded` / `Unfiltered` / `Filtered(term)` view modes.
//! - Provide pure, id-keyed transitions over the authoritative note list.
//!
//! # Invariants
//! - `visible == all_notes` whenever no filter is active.
//! - `all_notes` is replaced wholesale only by `loaded`; every other
//!   transition inserts, replaces or removes by id.
//! - Transitions return new snapshots; a snapshot is never edited after it
//!   has been published.

use crate::model::note::{Note, NoteDraft};

/// Current view mode of the notes list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Nothing fetched yet.
    #[default]
    Unloaded,
    /// Visible list mirrors the full note list.
    Unfiltered,
    /// Visible list is the latest remote search result for the term.
    Filtered(String),
}

/// Immutable snapshot of the notes session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesSnapshot {
    mode: ViewMode,
    all_notes: Vec<Note>,
    visible: Vec<Note>,
    filter_stale: bool,
}

impl NotesSnapshot {
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    /// Full note list last confirmed by the remote store, newest-first.
    pub fn all_notes(&self) -> &[Note] {
        &self.all_notes
    }

    /// Notes currently exposed for display.
    pub fn visible(&self) -> &[Note] {
        &self.visible
    }

    /// Active search term, or `""` when no filter is active.
    pub fn search_term(&self) -> &str {
        match &self.mode {
            ViewMode::Filtered(term) => term.as_str(),
            ViewMode::Unloaded | ViewMode::Unfiltered => "",
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.mode != ViewMode::Unloaded
    }

    /// True when a confirmed mutation could not be re-filtered remotely and
    /// `visible` still holds the previous search result.
    pub fn is_filter_stale(&self) -> bool {
        self.filter_stale
    }

    /// Finds one note by id in the authoritative list.
    pub fn lookup(&self, id: &str) -> Option<&Note> {
        self.all_notes.iter().find(|note| note.id == id)
    }

    /// Replaces the full list after a successful fetch and clears the filter.
    pub fn loaded(notes: Vec<Note>) -> Self {
        Self {
            mode: ViewMode::Unfiltered,
            visible: notes.clone(),
            all_notes: notes,
            filter_stale: false,
        }
    }

    /// Drops the filter; the visible list becomes the full list.
    pub fn unfiltered(&self) -> Self {
        Self {
            mode: ViewMode::Unfiltered,
            all_notes: self.all_notes.clone(),
            visible: self.all_notes.clone(),
            filter_stale: false,
        }
    }

    /// Enters `Filtered(term)` with `results` as the visible list.
    pub fn filtered(&self, term: &str, results: Vec<Note>) -> Self {
        Self {
            mode: ViewMode::Filtered(term.to_string()),
            all_notes: self.all_notes.clone(),
            visible: results,
            filter_stale: false,
        }
    }

    /// Prepends a confirmed created note. `visible` is left untouched until
    /// the caller recomputes it.
    pub fn with_created(&self, note: Note) -> Self {
        let mut all_notes = Vec::with_capacity(self.all_notes.len() + 1);
        all_notes.push(note);
        all_notes.extend(self.all_notes.iter().cloned());
        Self {
            all_notes,
            ..self.clone()
        }
    }

    /// Replaces the note with `id` in place. Unknown ids leave the list as is.
    pub fn with_updated(&self, id: &str, draft: &NoteDraft) -> Self {
        let all_notes = self
            .all_notes
            .iter()
            .map(|note| {
                if note.id == id {
                    note.revised(draft)
                } else {
                    note.clone()
                }
            })
            .collect();
        Self {
            all_notes,
            ..self.clone()
        }
    }

    /// Removes the note with `id`.
    pub fn with_deleted(&self, id: &str) -> Self {
        let all_notes = self
            .all_notes
            .iter()
            .filter(|note| note.id != id)
            .cloned()
            .collect();
        Self {
            all_notes,
            ..self.clone()
        }
    }

    /// Keeps the current visible list but flags it as not re-filtered.
    pub fn with_stale_filter(&self) -> Self {
        Self {
            filter_stale: true,
            ..self.clone()
        }
    }
}
