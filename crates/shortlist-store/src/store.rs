//! Store trait and the mode-holding session container.

use serde::{Deserialize, Serialize};
use shortlist_core::dashboard::DashboardStats;
use shortlist_core::validate::{JobDraft, JobPatch};
use shortlist_core::{Job, JobPage, ListQuery, Note, StoreError};

use crate::local::LocalStore;
use crate::remote::{RemoteBackend, RemoteStore};

/// Common surface of the two persistence adapters. Everything above
/// this trait (state container, reconciler) is mode-agnostic.
pub trait JobStore {
    /// List jobs matching a filter/sort/pagination query.
    ///
    /// # Errors
    ///
    /// Adapter-specific; the local adapter never fails here.
    fn list(&mut self, query: &ListQuery) -> Result<JobPage, StoreError>;

    /// Fetch one job with its notes embedded.
    ///
    /// # Errors
    ///
    /// `NotFound` if no job has that id.
    fn get(&mut self, id: i64) -> Result<Job, StoreError>;

    /// Persist a validated draft as a new record.
    ///
    /// # Errors
    ///
    /// Adapter-specific; the local adapter never fails here.
    fn create(&mut self, draft: &JobDraft) -> Result<Job, StoreError>;

    /// Shallow-merge a patch into an existing record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no job has that id.
    fn update(&mut self, id: i64, patch: &JobPatch) -> Result<Job, StoreError>;

    /// Remove a record and its notes. `Ok(false)` means nothing
    /// matched.
    ///
    /// # Errors
    ///
    /// Adapter-specific; the local adapter never fails here.
    fn delete(&mut self, id: i64) -> Result<bool, StoreError>;

    /// Attach a note to a job, newest first.
    ///
    /// # Errors
    ///
    /// `NotFound` if no job has that id.
    fn add_note(&mut self, job_id: i64, content: &str) -> Result<Note, StoreError>;

    /// Aggregate counts and recent records over the full collection.
    ///
    /// # Errors
    ///
    /// Adapter-specific; the local adapter never fails here.
    fn dashboard(&mut self) -> Result<DashboardStats, StoreError>;
}

/// Which adapter is the current system of record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Guest: file-backed local store.
    #[default]
    Local,
    /// Authenticated: remote backend.
    Remote,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds both adapters plus the mode that selects between them.
///
/// The mode is an explicit field here rather than ambient global state,
/// so every dispatch reads the same value and tests can flip it
/// directly. Only the session reconciler should change it in
/// production flow.
#[derive(Debug)]
pub struct Session<B: RemoteBackend> {
    mode: Mode,
    local: LocalStore,
    remote: RemoteStore<B>,
}

impl<B: RemoteBackend> Session<B> {
    /// Start in guest mode over the given adapters.
    pub const fn new(local: LocalStore, backend: B) -> Self {
        Self {
            mode: Mode::Local,
            local,
            remote: RemoteStore::new(backend),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self.mode, Mode::Local)
    }

    /// The adapter selected by the current mode.
    pub fn store(&mut self) -> &mut dyn JobStore {
        match self.mode {
            Mode::Local => &mut self.local,
            Mode::Remote => &mut self.remote,
        }
    }

    #[must_use]
    pub const fn local(&self) -> &LocalStore {
        &self.local
    }

    pub const fn remote(&mut self) -> &mut RemoteStore<B> {
        &mut self.remote
    }
}
