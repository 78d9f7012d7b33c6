//! Local store adapter: the guest-mode system of record.
//!
//! The whole collection lives in one JSON blob (`jobs.json`) under the
//! store directory, jobs carrying their notes inline, newest first. A
//! legacy `notes.json` key is reserved but never read; `clear` removes
//! it along with the blob.
//!
//! Reads and writes are deliberately forgiving: a missing, corrupt, or
//! unwritable blob degrades to an empty collection or a dropped write
//! (logged via `tracing`), never an error. Guest data is a convenience
//! cache until migration, not durable truth.

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use shortlist_core::dashboard::{self, DashboardStats};
use shortlist_core::query;
use shortlist_core::validate::{JobDraft, JobPatch};
use shortlist_core::{Job, JobPage, ListQuery, Note, StoreError};

use crate::store::JobStore;

/// Fixed storage key for the job collection.
pub const JOBS_FILE: &str = "jobs.json";
/// Legacy key: reserved, never read.
const LEGACY_NOTES_FILE: &str = "notes.json";

/// File-backed guest store. Owns id allocation for guest-created
/// records.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory for the app, when one exists.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("shortlist"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn jobs_path(&self) -> PathBuf {
        self.dir.join(JOBS_FILE)
    }

    /// Read the full collection. Absent, corrupt, or unreadable
    /// storage yields `[]`.
    #[must_use]
    pub fn load(&self) -> Vec<Job> {
        let path = self.jobs_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read local jobs");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt local jobs blob");
                Vec::new()
            }
        }
    }

    /// Overwrite the blob. Best-effort: failures (missing directory
    /// that cannot be created, quota, permissions) are logged and
    /// swallowed.
    pub fn save(&self, jobs: &[Job]) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "failed to create store dir");
            return;
        }

        let serialized = match serde_json::to_string(jobs) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize local jobs");
                return;
            }
        };

        let path = self.jobs_path();
        if let Err(e) = fs::write(&path, serialized) {
            tracing::warn!(path = %path.display(), error = %e, "failed to write local jobs");
        }
    }

    /// Create a record from a validated draft: id = max existing + 1,
    /// `created_at` stamped now, prepended so the collection stays
    /// newest-first.
    pub fn create(&self, draft: &JobDraft) -> Job {
        let mut jobs = self.load();
        let id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;

        let job = Job {
            id,
            company: draft.company.clone(),
            position: draft.position.clone(),
            status: draft.status,
            description: draft.description.clone(),
            job_url: draft.job_url.clone(),
            apply_date: draft.apply_date,
            created_at: Utc::now(),
            notes: Vec::new(),
        };

        jobs.insert(0, job.clone());
        self.save(&jobs);
        job
    }

    /// Shallow-merge a patch into the matching record.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has that id.
    pub fn update(&self, id: i64, patch: &JobPatch) -> Result<Job, StoreError> {
        let mut jobs = self.load();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound)?;

        patch.apply_to(job);
        let updated = job.clone();
        self.save(&jobs);
        Ok(updated)
    }

    /// Remove a record (and, implicitly, its notes). Returns whether
    /// anything was removed.
    pub fn remove(&self, id: i64) -> bool {
        let mut jobs = self.load();
        let before = jobs.len();
        jobs.retain(|j| j.id != id);

        if jobs.len() == before {
            return false;
        }
        self.save(&jobs);
        true
    }

    /// Prepend a note to a job. Note ids are scoped to that job's
    /// existing notes (`max + 1`, or 1).
    ///
    /// # Errors
    ///
    /// `NotFound` if no job has that id.
    pub fn add_note(&self, job_id: i64, content: &str) -> Result<Note, StoreError> {
        let mut jobs = self.load();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or(StoreError::NotFound)?;

        let id = job.notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let note = Note {
            id,
            content: content.to_string(),
            job_application_id: job_id,
            created_at: Utc::now(),
        };

        job.notes.insert(0, note.clone());
        self.save(&jobs);
        Ok(note)
    }

    /// Aggregate stats over the full collection.
    #[must_use]
    pub fn dashboard_stats(&self) -> DashboardStats {
        dashboard::compute(&self.load())
    }

    /// Destroy all guest data, including the legacy notes key. Only
    /// the session reconciler calls this, after a verified migration.
    pub fn clear(&self) {
        for name in [JOBS_FILE, LEGACY_NOTES_FILE] {
            let path = self.dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to clear local data");
                }
            }
        }
    }

    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.load().is_empty()
    }
}

impl JobStore for LocalStore {
    fn list(&mut self, query: &ListQuery) -> Result<JobPage, StoreError> {
        Ok(query::run(&self.load(), query))
    }

    fn get(&mut self, id: i64) -> Result<Job, StoreError> {
        self.load()
            .into_iter()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound)
    }

    fn create(&mut self, draft: &JobDraft) -> Result<Job, StoreError> {
        Ok(Self::create(self, draft))
    }

    fn update(&mut self, id: i64, patch: &JobPatch) -> Result<Job, StoreError> {
        Self::update(self, id, patch)
    }

    fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        Ok(self.remove(id))
    }

    fn add_note(&mut self, job_id: i64, content: &str) -> Result<Note, StoreError> {
        Self::add_note(self, job_id, content)
    }

    fn dashboard(&mut self) -> Result<DashboardStats, StoreError> {
        Ok(self.dashboard_stats())
    }
}
