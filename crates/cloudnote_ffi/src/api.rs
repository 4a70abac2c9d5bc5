//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the notes state manager to Dart via FRB.
//! - Validate user input before it reaches the remote store.
//! - Keep error semantics simple for UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every command response carries the visible list after the command.
//! - At most one notes service is active per process.

use cloudnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NoteDraft, NoteService, RemoteConfig, RestNoteStore, SearchOutcome, ServiceResult,
};
use log::{info, warn};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::runtime::Runtime;

type ActiveService = Arc<NoteService<RestNoteStore>>;

static RUNTIME: OnceCell<Runtime> = OnceCell::new();
static ACTIVE_SERVICE: Mutex<Option<ActiveService>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note item returned to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Server-assigned note id.
    pub id: String,
    pub title: String,
    pub content: String,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
        }
    }
}

/// Response envelope for notes commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesActionResponse {
    /// Whether the command was applied.
    pub ok: bool,
    /// Affected note id, when the command targets one note.
    pub note_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Visible notes after the command (unchanged on failure).
    pub notes: Vec<NoteItem>,
    /// Active search term, empty when unfiltered.
    pub search_term: String,
}

impl NotesActionResponse {
    fn applied(
        service: &ActiveService,
        message: impl Into<String>,
        note_id: Option<String>,
    ) -> Self {
        Self::from_service(service, true, message, note_id)
    }

    fn rejected(service: &ActiveService, message: impl Into<String>) -> Self {
        Self::from_service(service, false, message, None)
    }

    fn from_service(
        service: &ActiveService,
        ok: bool,
        message: impl Into<String>,
        note_id: Option<String>,
    ) -> Self {
        let snapshot = service.snapshot();
        Self {
            ok,
            note_id,
            message: message.into(),
            notes: snapshot
                .visible()
                .iter()
                .cloned()
                .map(NoteItem::from)
                .collect(),
            search_term: snapshot.search_term().to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
            notes: Vec::new(),
            search_term: String::new(),
        }
    }
}

/// Configures the remote store and performs the initial load.
///
/// # FFI contract
/// - Blocking call; run off the UI thread.
/// - Replaces and disposes any previously configured service.
/// - `ok=true` when the service is configured, even if the initial load
///   fails; the message then carries the load error.
pub fn notes_configure(base_url: String, api_key: String) -> NotesActionResponse {
    let config = match RemoteConfig::new(base_url.as_str(), api_key.as_str()) {
        Ok(config) => config,
        Err(err) => {
            return NotesActionResponse::failure(format!("notes_configure failed: {err}"));
        }
    };
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(message) => return NotesActionResponse::failure(message),
    };

    let service = Arc::new(NoteService::new(RestNoteStore::new(&config)));
    let previous = match ACTIVE_SERVICE.lock() {
        Ok(mut slot) => slot.replace(service.clone()),
        Err(_) => {
            return NotesActionResponse::failure("notes_configure failed: service slot poisoned");
        }
    };
    if let Some(previous) = previous {
        previous.dispose();
    }
    info!(
        "event=notes_configure module=ffi status=ok base_url={}",
        config.base_url()
    );

    let loaded = runtime.block_on(service.load());
    match loaded {
        Ok(count) => {
            NotesActionResponse::applied(&service, format!("Loaded {count} note(s)."), None)
        }
        Err(err) => {
            warn!("event=notes_configure module=ffi status=error stage=initial_load");
            NotesActionResponse::applied(
                &service,
                format!("Configured; initial load failed: {err}"),
                None,
            )
        }
    }
}

/// Reloads all notes and clears the search filter.
pub fn notes_load() -> NotesActionResponse {
    run_command("notes_load", |service| async move {
        match service.load().await {
            Ok(count) => {
                NotesActionResponse::applied(&service, format!("Loaded {count} note(s)."), None)
            }
            Err(err) => {
                NotesActionResponse::rejected(&service, format!("notes_load failed: {err}"))
            }
        }
    })
}

/// Applies a search term; blank input shows all notes.
///
/// A search overtaken by a newer one is not an error: the response is
/// `ok=true` and carries the list published by the newer search.
pub fn notes_search(term: String) -> NotesActionResponse {
    run_command("notes_search", |service| async move {
        let (ok, message) = search_reply(service.search(term.as_str()).await);
        NotesActionResponse::from_service(&service, ok, message, None)
    })
}

fn search_reply(outcome: ServiceResult<SearchOutcome>) -> (bool, String) {
    match outcome {
        Ok(SearchOutcome::Unfiltered) => (true, "Showing all notes.".to_string()),
        Ok(SearchOutcome::Filtered { matches }) => (true, format!("Found {matches} note(s).")),
        Ok(SearchOutcome::Superseded) => (true, "Newer search in progress.".to_string()),
        Err(err) => (false, format!("notes_search failed: {err}")),
    }
}

/// Creates a note. Title and content must not be blank.
pub fn notes_add(title: String, content: String) -> NotesActionResponse {
    let draft = NoteDraft::new(title.trim(), content.trim());
    if let Err(err) = draft.validate() {
        return NotesActionResponse::failure(format!("notes_add rejected: {err}"));
    }
    run_command("notes_add", |service| async move {
        match service.add(&draft.title, &draft.content).await {
            Ok(note) => NotesActionResponse::applied(&service, "Note created.", Some(note.id)),
            Err(err) => {
                NotesActionResponse::rejected(&service, format!("notes_add failed: {err}"))
            }
        }
    })
}

/// Updates a note. Title and content must not be blank.
pub fn notes_update(id: String, title: String, content: String) -> NotesActionResponse {
    let draft = NoteDraft::new(title.trim(), content.trim());
    if let Err(err) = draft.validate() {
        return NotesActionResponse::failure(format!("notes_update rejected: {err}"));
    }
    run_command("notes_update", |service| async move {
        let confirmed = service.update(&id, &draft.title, &draft.content).await;
        match confirmed {
            Ok(true) => NotesActionResponse::applied(&service, "Note updated.", Some(id)),
            Ok(false) => NotesActionResponse::rejected(&service, "Note update was not confirmed."),
            Err(err) => {
                NotesActionResponse::rejected(&service, format!("notes_update failed: {err}"))
            }
        }
    })
}

/// Deletes a note by id.
pub fn notes_delete(id: String) -> NotesActionResponse {
    run_command("notes_delete", |service| async move {
        let confirmed = service.delete(&id).await;
        match confirmed {
            Ok(true) => NotesActionResponse::applied(&service, "Note deleted.", Some(id)),
            Ok(false) => NotesActionResponse::rejected(&service, "Note delete was not confirmed."),
            Err(err) => {
                NotesActionResponse::rejected(&service, format!("notes_delete failed: {err}"))
            }
        }
    })
}

/// Returns the currently visible notes.
///
/// # FFI contract
/// - Sync call, no network access.
/// - Empty when no service is configured.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_visible() -> Vec<NoteItem> {
    active_service()
        .map(|service| {
            service
                .visible_notes()
                .into_iter()
                .map(NoteItem::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Looks up one note by id in the loaded list.
///
/// # FFI contract
/// - Sync call, no network access.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_lookup(id: String) -> Option<NoteItem> {
    active_service()?.lookup(id.as_str()).map(NoteItem::from)
}

/// Disposes the active service. Returns false when none was configured.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_dispose() -> bool {
    let previous = match ACTIVE_SERVICE.lock() {
        Ok(mut slot) => slot.take(),
        Err(_) => None,
    };
    match previous {
        Some(service) => {
            service.dispose();
            true
        }
        None => false,
    }
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("cloudnote-ffi")
            .enable_all()
            .build()
            .map_err(|err| format!("failed to start async runtime: {err}"))
    })
}

fn active_service() -> Option<ActiveService> {
    ACTIVE_SERVICE.lock().ok()?.clone()
}

fn run_command<F, Fut>(command: &'static str, f: F) -> NotesActionResponse
where
    F: FnOnce(ActiveService) -> Fut,
    Fut: Future<Output = NotesActionResponse>,
{
    let Some(service) = active_service() else {
        return NotesActionResponse::failure(format!(
            "{command} failed: notes service not configured"
        ));
    };
    match runtime() {
        Ok(runtime) => runtime.block_on(f(service)),
        Err(message) => NotesActionResponse::failure(format!("{command} failed: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, notes_add, notes_configure, notes_lookup, notes_update,
        notes_visible, ping, search_reply,
    };
    use cloudnote_core::{NoteServiceError, SearchOutcome};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/cloudnote-logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn notes_configure_rejects_invalid_url() {
        let response = notes_configure("not a url".to_string(), "key".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("notes_configure failed"));
    }

    #[test]
    fn blank_drafts_are_rejected_before_any_remote_call() {
        let add = notes_add("   ".to_string(), "body".to_string());
        assert!(!add.ok);
        assert!(add.message.contains("title"));

        let update = notes_update("5".to_string(), "title".to_string(), "\n".to_string());
        assert!(!update.ok);
        assert!(update.message.contains("content"));
    }

    #[test]
    fn reads_are_empty_without_configured_service() {
        assert!(notes_visible().is_empty());
        assert!(notes_lookup("5".to_string()).is_none());
    }

    #[test]
    fn superseded_search_is_not_reported_as_failure() {
        let (ok, message) = search_reply(Ok(SearchOutcome::Superseded));
        assert!(ok);
        assert!(!message.contains("failed"));

        assert_eq!(
            search_reply(Ok(SearchOutcome::Filtered { matches: 2 })),
            (true, "Found 2 note(s).".to_string())
        );
        let (ok, message) = search_reply(Err(NoteServiceError::Disposed));
        assert!(!ok);
        assert!(message.starts_with("notes_search failed"));
    }
}
