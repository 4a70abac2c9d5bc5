//! Notes state manager over a remote note store.
//!
//! # Responsibility
//! - Own the authoritative note list and the active search term.
//! - Publish the visible note list to subscribers after every completed
//!   command.
//! - Serialize load/search/add/update/delete so presentation code never
//!   talks to the store directly.
//!
//! # Invariants
//! - A failed or unconfirmed command leaves the published snapshot unchanged.
//! - Mutations are applied only after the store confirms them.
//! - While a filter is active, the visible list after a mutation comes from
//!   a fresh remote search, never from local filtering.
//! - Within one command the note-list update is published before the
//!   visible list is recomputed.
//! - At most one command runs at a time per service instance (FIFO).
//! - Nothing is published once `dispose()` has been called, including by a
//!   command whose remote call was already in flight.

use crate::model::note::{Note, NoteDraft};
use crate::service::notes_state::NotesSnapshot;
use crate::store::note_store::{NoteStore, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::{watch, Mutex, MutexGuard};

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteServiceError {
    /// Remote store failure; state was left unchanged.
    Store(StoreError),
    /// Service was disposed before the command could complete.
    Disposed,
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Disposed => write!(f, "notes service has been disposed"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Disposed => None,
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Result of a `search` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank term; the filter was cleared without a remote call.
    Unfiltered,
    /// Remote search succeeded with this many matches.
    Filtered { matches: usize },
    /// A newer search was issued first; this result was discarded.
    Superseded,
}

/// Single-writer notes state manager.
pub struct NoteService<S: NoteStore> {
    store: S,
    state: watch::Sender<NotesSnapshot>,
    commands: Mutex<()>,
    search_generation: AtomicU64,
    disposed: AtomicBool,
}

impl<S: NoteStore> NoteService<S> {
    /// Creates an unloaded service over `store`.
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(NotesSnapshot::default());
        Self {
            store,
            state,
            commands: Mutex::new(()),
            search_generation: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    /// Subscribes to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<NotesSnapshot> {
        self.state.subscribe()
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> NotesSnapshot {
        self.state.borrow().clone()
    }

    /// Returns the latest published visible list.
    pub fn visible_notes(&self) -> Vec<Note> {
        self.state.borrow().visible().to_vec()
    }

    /// Local lookup over the full note list. Never touches the store.
    pub fn lookup(&self, id: &str) -> Option<Note> {
        self.state.borrow().lookup(id).cloned()
    }

    /// Stops accepting commands. Snapshot reads keep working.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            info!("event=notes_dispose module=service status=ok");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Fetches all notes and clears any active filter.
    ///
    /// Returns the number of notes loaded.
    pub async fn load(&self) -> ServiceResult<usize> {
        let _guard = self.begin().await?;
        let started_at = Instant::now();

        let notes = self
            .store
            .list()
            .await
            .map_err(|err| command_failed("load", err))?;
        self.ensure_still_active("load")?;
        let count = notes.len();
        self.publish(NotesSnapshot::loaded(notes));
        info!(
            "event=notes_load module=service status=ok count={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }

    /// Applies a search term.
    ///
    /// A blank term clears the filter immediately. A non-blank term runs a
    /// remote search; when a newer search is issued before this one
    /// completes, its result is dropped.
    pub async fn search(&self, term: &str) -> ServiceResult<SearchOutcome> {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.begin().await?;

        if self.is_superseded(generation) {
            debug!("event=notes_search module=service status=superseded stage=queued");
            return Ok(SearchOutcome::Superseded);
        }

        if term.trim().is_empty() {
            self.publish(self.snapshot().unfiltered());
            debug!("event=notes_search module=service status=ok filter=cleared");
            return Ok(SearchOutcome::Unfiltered);
        }

        let results = self
            .store
            .search(term)
            .await
            .map_err(|err| command_failed("search", err))?;
        self.ensure_still_active("search")?;

        if self.is_superseded(generation) {
            debug!("event=notes_search module=service status=superseded stage=remote");
            return Ok(SearchOutcome::Superseded);
        }

        let matches = results.len();
        self.publish(self.snapshot().filtered(term, results));
        info!("event=notes_search module=service status=ok matches={matches}");
        Ok(SearchOutcome::Filtered { matches })
    }

    /// Creates a note remotely and prepends it to the note list.
    pub async fn add(&self, title: &str, content: &str) -> ServiceResult<Note> {
        let draft = NoteDraft::new(title, content);
        let _guard = self.begin().await?;

        let created = self
            .store
            .create(&draft)
            .await
            .map_err(|err| command_failed("add", err))?;
        self.apply_mutation("add", self.snapshot().with_created(created.clone()))
            .await?;
        info!("event=notes_add module=service status=ok");
        Ok(created)
    }

    /// Updates a note remotely and replaces it in place once confirmed.
    ///
    /// Returns `Ok(false)` when the store did not confirm the id.
    pub async fn update(&self, id: &str, title: &str, content: &str) -> ServiceResult<bool> {
        let draft = NoteDraft::new(title, content);
        let _guard = self.begin().await?;

        let confirmed = self
            .store
            .update(id, &draft)
            .await
            .map_err(|err| command_failed("update", err))?;
        if !confirmed {
            info!("event=notes_update module=service status=unconfirmed");
            return Ok(false);
        }

        self.apply_mutation("update", self.snapshot().with_updated(id, &draft))
            .await?;
        info!("event=notes_update module=service status=ok");
        Ok(true)
    }

    /// Deletes a note remotely and removes it once confirmed.
    ///
    /// Returns `Ok(false)` when the store did not confirm the deletion.
    pub async fn delete(&self, id: &str) -> ServiceResult<bool> {
        let _guard = self.begin().await?;

        let confirmed = self
            .store
            .delete(id)
            .await
            .map_err(|err| command_failed("delete", err))?;
        if !confirmed {
            info!("event=notes_delete module=service status=unconfirmed");
            return Ok(false);
        }

        self.apply_mutation("delete", self.snapshot().with_deleted(id))
            .await?;
        info!("event=notes_delete module=service status=ok");
        Ok(true)
    }

    async fn begin(&self) -> ServiceResult<MutexGuard<'_, ()>> {
        self.ensure_active()?;
        let guard = self.commands.lock().await;
        // Commands queued before dispose() must not run after it.
        self.ensure_active()?;
        Ok(guard)
    }

    fn ensure_active(&self) -> ServiceResult<()> {
        if self.is_disposed() {
            return Err(NoteServiceError::Disposed);
        }
        Ok(())
    }

    /// Re-checks disposal after a remote call returns.
    fn ensure_still_active(&self, command: &'static str) -> ServiceResult<()> {
        if self.is_disposed() {
            info!("event=notes_{command} module=service status=discarded reason=disposed");
            return Err(NoteServiceError::Disposed);
        }
        Ok(())
    }

    fn is_superseded(&self, generation: u64) -> bool {
        self.search_generation.load(Ordering::SeqCst) != generation
    }

    /// Publishes a confirmed note-list change, then recomputes `visible`.
    async fn apply_mutation(
        &self,
        command: &'static str,
        next: NotesSnapshot,
    ) -> ServiceResult<()> {
        self.ensure_still_active(command)?;
        let term = next.search_term().to_string();
        if term.is_empty() {
            self.publish(next.unfiltered());
            return Ok(());
        }

        self.publish(next.clone());
        let refiltered = self.store.search(&term).await;
        self.ensure_still_active(command)?;
        match refiltered {
            Ok(results) => self.publish(next.filtered(&term, results)),
            Err(err) => {
                warn!(
                    "event=notes_refilter module=service status=error command={} error_code={} error={}",
                    command,
                    err.code(),
                    err
                );
                self.publish(next.with_stale_filter());
            }
        }
        Ok(())
    }

    fn publish(&self, snapshot: NotesSnapshot) {
        self.state.send_replace(snapshot);
    }
}

fn command_failed(command: &'static str, err: StoreError) -> NoteServiceError {
    warn!(
        "event=notes_{} module=service status=error error_code={} error={}",
        command,
        err.code(),
        err
    );
    NoteServiceError::Store(err)
}
