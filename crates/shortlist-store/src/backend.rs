//! In-memory reference backend.
//!
//! Plays the remote API for tests and offline development: same auth
//! gate, same validation, same clamping, and the same query engine the
//! local store runs, so list results cannot drift between modes. Fault
//! injection lets tests exercise the failure paths of the state
//! container and session reconciler.

use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;

use shortlist_core::dashboard::{self, DashboardStats};
use shortlist_core::query;
use shortlist_core::signature::job_signature;
use shortlist_core::validate::{
    self, CreateJobInput, JobDraft, JobPatch, MAX_IMPORT_JOBS, MAX_NOTES_PER_JOB, ValidationError,
};
use shortlist_core::{Job, JobPage, ListQuery, Note, StoreError};

use crate::remote::{MigrationReport, RemoteBackend};

/// Which operation should fail with a network error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fault {
    #[default]
    None,
    /// Fail `list_jobs`.
    List,
    /// Fail `dashboard`.
    Dashboard,
    /// Fail `migrate`.
    Migrate,
    /// Fail everything.
    All,
}

/// Reference implementation of [`RemoteBackend`] over a plain `Vec`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    jobs: Vec<Job>,
    next_job_id: i64,
    next_note_id: i64,
    authenticated: bool,
    fault: Fault,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_job_id: 1,
            next_note_id: 1,
            ..Default::default()
        }
    }

    /// Seed the backend with existing rows, newest first, as a real
    /// backend would return them.
    #[must_use]
    pub fn with_jobs(mut jobs: Vec<Job>) -> Self {
        let next_job_id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;
        let next_note_id = jobs
            .iter()
            .flat_map(|j| &j.notes)
            .map(|n| n.id)
            .max()
            .unwrap_or(0)
            + 1;
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Self {
            jobs,
            next_job_id,
            next_note_id,
            ..Default::default()
        }
    }

    pub const fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    /// Make the selected operation fail with `StoreError::Network`
    /// until reset.
    pub const fn inject_fault(&mut self, fault: Fault) {
        self.fault = fault;
    }

    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    fn guard(&self, op: Fault) -> Result<(), StoreError> {
        if !self.authenticated {
            return Err(StoreError::Unauthorized);
        }
        if self.fault != Fault::None && (self.fault == Fault::All || self.fault == op) {
            return Err(StoreError::Network("injected fault".to_string()));
        }
        Ok(())
    }

    fn find_mut(&mut self, id: i64) -> Result<&mut Job, StoreError> {
        self.jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(StoreError::NotFound)
    }

    fn insert(&mut self, draft: &JobDraft, created_at: chrono::DateTime<Utc>) -> i64 {
        let id = self.next_job_id;
        self.next_job_id += 1;
        self.jobs.insert(
            0,
            Job {
                id,
                company: draft.company.clone(),
                position: draft.position.clone(),
                status: draft.status,
                description: draft.description.clone(),
                job_url: draft.job_url.clone(),
                apply_date: draft.apply_date,
                created_at,
                notes: Vec::new(),
            },
        );
        id
    }
}

/// Re-run create validation on an untrusted import row. Guest blobs are
/// client-writable, so the server trusts nothing about them.
fn revalidate(job: &Job) -> Result<JobDraft, ValidationError> {
    validate::validate_create(&CreateJobInput {
        company: job.company.clone(),
        position: job.position.clone(),
        status: job.status.as_str().to_string(),
        description: job.description.clone(),
        job_url: job.job_url.clone(),
        apply_date: job
            .apply_date
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true)),
    })
}

impl RemoteBackend for MemoryBackend {
    fn list_jobs(&mut self, query: &ListQuery) -> Result<JobPage, StoreError> {
        self.guard(Fault::List)?;
        Ok(query::run(&self.jobs, query))
    }

    fn get_job(&mut self, id: i64) -> Result<Job, StoreError> {
        self.guard(Fault::None)?;
        self.jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn create_job(&mut self, draft: &JobDraft) -> Result<Job, StoreError> {
        self.guard(Fault::None)?;
        self.insert(draft, Utc::now());
        Ok(self.jobs[0].clone())
    }

    fn update_job(&mut self, id: i64, patch: &JobPatch) -> Result<Job, StoreError> {
        self.guard(Fault::None)?;
        let job = self.find_mut(id)?;
        patch.apply_to(job);
        Ok(job.clone())
    }

    fn delete_job(&mut self, id: i64) -> Result<bool, StoreError> {
        self.guard(Fault::None)?;
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != id);
        Ok(self.jobs.len() != before)
    }

    fn list_notes(&mut self, job_id: i64) -> Result<Vec<Note>, StoreError> {
        self.guard(Fault::None)?;
        self.jobs
            .iter()
            .find(|j| j.id == job_id)
            .map(|j| j.notes.clone())
            .ok_or(StoreError::NotFound)
    }

    fn add_note(&mut self, job_id: i64, content: &str) -> Result<Note, StoreError> {
        self.guard(Fault::None)?;
        let content = validate::validate_note_content(content)?;

        let id = self.next_note_id;
        self.next_note_id += 1;
        let job = self.find_mut(job_id)?;
        let note = Note {
            id,
            content,
            job_application_id: job_id,
            created_at: Utc::now(),
        };
        job.notes.insert(0, note.clone());
        Ok(note)
    }

    fn dashboard(&mut self) -> Result<DashboardStats, StoreError> {
        self.guard(Fault::Dashboard)?;
        Ok(dashboard::compute(&self.jobs))
    }

    fn migrate(&mut self, jobs: &[Job]) -> Result<MigrationReport, StoreError> {
        self.guard(Fault::Migrate)?;
        if jobs.len() > MAX_IMPORT_JOBS {
            return Err(StoreError::Validation(ValidationError::BatchTooLarge));
        }

        let mut seen: HashSet<String> = self.jobs.iter().map(job_signature).collect();
        let mut report = MigrationReport::default();

        for incoming in jobs {
            // Rows that fail server-side validation count as skips,
            // same as duplicates.
            let Ok(draft) = revalidate(incoming) else {
                report.skipped_jobs += 1;
                continue;
            };

            let mut candidate = incoming.clone();
            candidate.company.clone_from(&draft.company);
            candidate.position.clone_from(&draft.position);
            candidate.description.clone_from(&draft.description);
            candidate.job_url.clone_from(&draft.job_url);

            let sig = job_signature(&candidate);
            if !seen.insert(sig) {
                report.skipped_jobs += 1;
                continue;
            }

            // Guest creation time is preserved so history survives the
            // import.
            let id = self.insert(&draft, incoming.created_at);
            report.imported_jobs += 1;

            for note in incoming.notes.iter().take(MAX_NOTES_PER_JOB) {
                let Ok(content) = validate::validate_note_content(&note.content) else {
                    continue;
                };
                let note_id = self.next_note_id;
                self.next_note_id += 1;
                let job = self.find_mut(id)?;
                job.notes.push(Note {
                    id: note_id,
                    content,
                    job_application_id: id,
                    created_at: note.created_at,
                });
                report.imported_notes += 1;
            }
        }

        tracing::info!(
            imported = report.imported_jobs,
            skipped = report.skipped_jobs,
            notes = report.imported_notes,
            "migration batch processed"
        );
        Ok(report)
    }
}
