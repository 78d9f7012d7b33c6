//! Remote store adapter: a thin pass-through to the authenticated
//! backend.
//!
//! The adapter is transport-agnostic: any type implementing
//! [`RemoteBackend`] can sit behind it (HTTP client, in-memory
//! reference backend, test double). The backend is authoritative — it
//! assigns ids, clamps limits, and re-validates input; the adapter adds
//! nothing beyond the [`JobStore`] shape the state container dispatches
//! on.

use serde::{Deserialize, Serialize};
use shortlist_core::dashboard::DashboardStats;
use shortlist_core::validate::{JobDraft, JobPatch};
use shortlist_core::{Job, JobPage, ListQuery, Note, StoreError};

use crate::store::JobStore;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Abstraction over the remote job/note/dashboard resources.
///
/// Mirrors the backend REST surface one method per endpoint. Every call
/// may fail with a [`StoreError`]: `Unauthorized` without a session,
/// `NotFound` for records the user does not own, `Network` for
/// transport failures.
pub trait RemoteBackend {
    /// `GET /jobs` with filter/sort/pagination parameters. The backend
    /// clamps `limit` and computes `total`/`has_more` itself.
    fn list_jobs(&mut self, query: &ListQuery) -> Result<JobPage, StoreError>;

    /// `GET /jobs/{id}`, notes embedded.
    fn get_job(&mut self, id: i64) -> Result<Job, StoreError>;

    /// `POST /jobs`. The backend allocates the id and `created_at`.
    fn create_job(&mut self, draft: &JobDraft) -> Result<Job, StoreError>;

    /// `PATCH /jobs/{id}`.
    fn update_job(&mut self, id: i64, patch: &JobPatch) -> Result<Job, StoreError>;

    /// `DELETE /jobs/{id}`. Returns whether anything was removed;
    /// notes cascade with the job.
    fn delete_job(&mut self, id: i64) -> Result<bool, StoreError>;

    /// `GET /jobs/{id}/notes`.
    fn list_notes(&mut self, job_id: i64) -> Result<Vec<Note>, StoreError>;

    /// `POST /jobs/{id}/notes`.
    fn add_note(&mut self, job_id: i64, content: &str) -> Result<Note, StoreError>;

    /// `GET /dashboard`.
    fn dashboard(&mut self) -> Result<DashboardStats, StoreError>;

    /// `POST /jobs/migrate`: bulk-import guest jobs with signature
    /// dedup. Safe to re-run; duplicates come back as skips.
    fn migrate(&mut self, jobs: &[Job]) -> Result<MigrationReport, StoreError>;
}

// ---------------------------------------------------------------------------
// Migration report
// ---------------------------------------------------------------------------

/// Summary of one migration upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Jobs created on the remote side.
    pub imported_jobs: u64,
    /// Jobs skipped because an identical signature already existed.
    pub skipped_jobs: u64,
    /// Notes created alongside the imported jobs.
    pub imported_notes: u64,
}

impl MigrationReport {
    /// Returns `true` if the upload changed nothing remotely.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.imported_jobs == 0 && self.imported_notes == 0
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// [`JobStore`] view over a [`RemoteBackend`].
#[derive(Debug)]
pub struct RemoteStore<B: RemoteBackend> {
    backend: B,
}

impl<B: RemoteBackend> RemoteStore<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Upload a guest job collection for one-time import.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`StoreError`].
    pub fn migrate(&mut self, jobs: &[Job]) -> Result<MigrationReport, StoreError> {
        self.backend.migrate(jobs)
    }

    /// Fetch the notes of one job.
    ///
    /// # Errors
    ///
    /// Propagates the backend's [`StoreError`].
    pub fn list_notes(&mut self, job_id: i64) -> Result<Vec<Note>, StoreError> {
        self.backend.list_notes(job_id)
    }
}

impl<B: RemoteBackend> JobStore for RemoteStore<B> {
    fn list(&mut self, query: &ListQuery) -> Result<JobPage, StoreError> {
        self.backend.list_jobs(query)
    }

    fn get(&mut self, id: i64) -> Result<Job, StoreError> {
        self.backend.get_job(id)
    }

    fn create(&mut self, draft: &JobDraft) -> Result<Job, StoreError> {
        self.backend.create_job(draft)
    }

    fn update(&mut self, id: i64, patch: &JobPatch) -> Result<Job, StoreError> {
        self.backend.update_job(id, patch)
    }

    fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        self.backend.delete_job(id)
    }

    fn add_note(&mut self, job_id: i64, content: &str) -> Result<Note, StoreError> {
        self.backend.add_note(job_id, content)
    }

    fn dashboard(&mut self) -> Result<DashboardStats, StoreError> {
        self.backend.dashboard()
    }
}
