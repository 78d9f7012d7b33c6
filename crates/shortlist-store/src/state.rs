//! Jobs state container.
//!
//! Caches the current list page, the focused job, and dashboard stats,
//! with loading/error flags tracked per concern rather than globally,
//! so a failed dashboard fetch never blocks the list view.
//!
//! Every request passes through a two-phase ticket protocol: `begin`
//! hands out a per-concern sequence number, completion is only applied
//! if no newer request for that concern has already landed. Stale fetch
//! completions are discarded whole, so a slow page-1 response can never
//! overwrite the page-2 data the user has since navigated to.

use serde::{Deserialize, Serialize};

use shortlist_core::dashboard::DashboardStats;
use shortlist_core::query::{DEFAULT_LIMIT, SortBy};
use shortlist_core::validate::{self, CreateJobInput, UpdateJobInput};
use shortlist_core::{Job, JobPage, ListQuery, Note, StoreError};

use crate::remote::RemoteBackend;
use crate::store::Session;

// ---------------------------------------------------------------------------
// Concerns and tickets
// ---------------------------------------------------------------------------

/// Independent slices of async state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concern {
    /// The list page; creates and deletes run under it.
    List,
    /// The focused job; note additions run under it.
    Current,
    /// Dashboard aggregates.
    Dashboard,
}

/// Loading/error flags plus the sequence counters that fence out stale
/// completions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConcernState {
    pub loading: bool,
    pub error: Option<StoreError>,
    issued: u64,
    accepted: u64,
}

/// Proof that a request was started; redeemed exactly once at
/// completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Ticket {
    concern: Concern,
    seq: u64,
}

/// Pagination and sort metadata of the cached list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortBy,
    pub has_more: bool,
}

impl Default for ListMeta {
    fn default() -> Self {
        Self {
            total: 0,
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_by: SortBy::default(),
            has_more: false,
        }
    }
}

// ---------------------------------------------------------------------------
// State container
// ---------------------------------------------------------------------------

/// Cached job data plus per-concern request state.
#[derive(Debug, Default)]
pub struct JobsState {
    jobs: Vec<Job>,
    meta: ListMeta,
    current: Option<Job>,
    dashboard: Option<DashboardStats>,
    list_state: ConcernState,
    current_state: ConcernState,
    dashboard_state: ConcernState,
}

impl JobsState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    #[must_use]
    pub const fn meta(&self) -> &ListMeta {
        &self.meta
    }

    #[must_use]
    pub const fn current(&self) -> Option<&Job> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn dashboard(&self) -> Option<&DashboardStats> {
        self.dashboard.as_ref()
    }

    #[must_use]
    pub const fn concern(&self, concern: Concern) -> &ConcernState {
        match concern {
            Concern::List => &self.list_state,
            Concern::Current => &self.current_state,
            Concern::Dashboard => &self.dashboard_state,
        }
    }

    const fn concern_mut(&mut self, concern: Concern) -> &mut ConcernState {
        match concern {
            Concern::List => &mut self.list_state,
            Concern::Current => &mut self.current_state,
            Concern::Dashboard => &mut self.dashboard_state,
        }
    }

    #[must_use]
    pub const fn is_loading(&self, concern: Concern) -> bool {
        self.concern(concern).loading
    }

    #[must_use]
    pub const fn error(&self, concern: Concern) -> Option<&StoreError> {
        self.concern(concern).error.as_ref()
    }

    pub fn dismiss_error(&mut self, concern: Concern) {
        self.concern_mut(concern).error = None;
    }

    /// Drop the focused job (navigating away from the detail view).
    pub fn clear_current(&mut self) {
        self.current = None;
        self.current_state.error = None;
    }

    /// Wipe every cached record and error. Sequence counters survive
    /// so in-flight completions from before the wipe still get fenced.
    pub fn clear_cached_data(&mut self) {
        self.jobs.clear();
        self.meta = ListMeta::default();
        self.current = None;
        self.dashboard = None;
        self.list_state.error = None;
        self.current_state.error = None;
        self.dashboard_state.error = None;
    }

    // ---- Ticket protocol ----

    /// Start a request: marks the concern loading and returns the
    /// ticket its completion must present.
    pub const fn begin(&mut self, concern: Concern) -> Ticket {
        let state = self.concern_mut(concern);
        state.issued += 1;
        state.loading = true;
        Ticket {
            concern,
            seq: state.issued,
        }
    }

    /// Accept a completion if nothing newer has landed. Returns
    /// whether the ticket was fresh; flags are untouched for stale
    /// tickets.
    fn settle(&mut self, ticket: Ticket, error: Option<StoreError>) -> bool {
        let state = self.concern_mut(ticket.concern);
        if ticket.seq <= state.accepted {
            tracing::debug!(concern = ?ticket.concern, seq = ticket.seq, "stale completion discarded");
            return false;
        }
        state.accepted = ticket.seq;
        state.loading = state.accepted < state.issued;
        state.error = error;
        true
    }

    /// Redeem a list-fetch ticket. Stale completions are discarded
    /// whole. Returns whether the result was applied.
    pub fn complete_list(&mut self, ticket: Ticket, result: Result<JobPage, StoreError>) -> bool {
        debug_assert!(matches!(ticket.concern, Concern::List));
        match result {
            Ok(page) => {
                if !self.settle(ticket, None) {
                    return false;
                }
                self.jobs = page.items;
                self.meta = ListMeta {
                    total: page.total,
                    limit: page.limit,
                    offset: page.offset,
                    sort_by: page.sort_by,
                    has_more: page.has_more,
                };
                true
            }
            Err(e) => self.settle(ticket, Some(e)),
        }
    }

    /// Redeem a focused-job fetch ticket.
    pub fn complete_current(&mut self, ticket: Ticket, result: Result<Job, StoreError>) -> bool {
        debug_assert!(matches!(ticket.concern, Concern::Current));
        match result {
            Ok(job) => {
                if !self.settle(ticket, None) {
                    return false;
                }
                self.current = Some(job);
                true
            }
            Err(e) => self.settle(ticket, Some(e)),
        }
    }

    /// Redeem a dashboard fetch ticket.
    pub fn complete_dashboard(
        &mut self,
        ticket: Ticket,
        result: Result<DashboardStats, StoreError>,
    ) -> bool {
        debug_assert!(matches!(ticket.concern, Concern::Dashboard));
        match result {
            Ok(stats) => {
                if !self.settle(ticket, None) {
                    return false;
                }
                self.dashboard = Some(stats);
                true
            }
            Err(e) => self.settle(ticket, Some(e)),
        }
    }

    // ---- Cache maintenance after mutations ----

    /// Splice a created job into the cache. The record only enters the
    /// visible page when that page starts at the top of the newest-
    /// first ordering; the count and has-more flag update regardless.
    fn apply_created(&mut self, job: Job) {
        if self.meta.offset == 0 {
            self.jobs.insert(0, job);
        }
        self.meta.total += 1;
        self.refresh_has_more();
    }

    fn apply_updated(&mut self, job: &Job) {
        if let Some(slot) = self.jobs.iter_mut().find(|j| j.id == job.id) {
            *slot = job.clone();
        }
        if let Some(current) = &mut self.current
            && current.id == job.id
        {
            *current = job.clone();
        }
    }

    fn apply_deleted(&mut self, id: i64) {
        self.jobs.retain(|j| j.id != id);
        self.meta.total = self.meta.total.saturating_sub(1);
        self.refresh_has_more();
        if self.current.as_ref().is_some_and(|c| c.id == id) {
            self.current = None;
        }
    }

    fn apply_note(&mut self, note: &Note) {
        if let Some(current) = &mut self.current
            && current.id == note.job_application_id
        {
            current.notes.insert(0, note.clone());
        }
        if let Some(job) = self
            .jobs
            .iter_mut()
            .find(|j| j.id == note.job_application_id)
        {
            job.notes.insert(0, note.clone());
        }
    }

    fn refresh_has_more(&mut self) {
        let shown = u64::from(self.meta.offset)
            + u64::try_from(self.jobs.len()).unwrap_or(u64::MAX);
        self.meta.has_more = shown < self.meta.total;
    }

    // ---- One-shot operations ----

    /// Fetch a list page through the session's active store.
    ///
    /// # Errors
    ///
    /// Returns the store error; it is also recorded on the list
    /// concern.
    pub fn fetch_jobs<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
        query: &ListQuery,
    ) -> Result<(), StoreError> {
        let ticket = self.begin(Concern::List);
        let result = session.store().list(query);
        let err = result.as_ref().err().cloned();
        self.complete_list(ticket, result);
        err.map_or(Ok(()), Err)
    }

    /// Fetch one job into the focused slot.
    ///
    /// # Errors
    ///
    /// Returns the store error; it is also recorded on the current
    /// concern.
    pub fn fetch_job<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
        id: i64,
    ) -> Result<(), StoreError> {
        let ticket = self.begin(Concern::Current);
        let result = session.store().get(id);
        let err = result.as_ref().err().cloned();
        self.complete_current(ticket, result);
        err.map_or(Ok(()), Err)
    }

    /// Fetch dashboard aggregates.
    ///
    /// # Errors
    ///
    /// Returns the store error; it is also recorded on the dashboard
    /// concern.
    pub fn fetch_dashboard<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
    ) -> Result<(), StoreError> {
        let ticket = self.begin(Concern::Dashboard);
        let result = session.store().dashboard();
        let err = result.as_ref().err().cloned();
        self.complete_dashboard(ticket, result);
        err.map_or(Ok(()), Err)
    }

    /// Validate and persist a new job, splicing it into the cache.
    ///
    /// # Errors
    ///
    /// Validation and store errors; both are recorded on the list
    /// concern.
    pub fn create_job<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
        input: &CreateJobInput,
    ) -> Result<Job, StoreError> {
        let ticket = self.begin(Concern::List);
        let result = validate::validate_create(input)
            .map_err(StoreError::from)
            .and_then(|draft| session.store().create(&draft));

        match result {
            Ok(job) => {
                self.apply_created(job.clone());
                self.settle(ticket, None);
                Ok(job)
            }
            Err(e) => {
                self.settle(ticket, Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Validate and apply a partial update, refreshing cached copies.
    ///
    /// # Errors
    ///
    /// Validation and store errors; both are recorded on the list
    /// concern.
    pub fn update_job<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
        id: i64,
        input: &UpdateJobInput,
    ) -> Result<Job, StoreError> {
        let ticket = self.begin(Concern::List);
        let result = validate::validate_update(input)
            .map_err(StoreError::from)
            .and_then(|patch| session.store().update(id, &patch));

        match result {
            Ok(job) => {
                self.apply_updated(&job);
                self.settle(ticket, None);
                Ok(job)
            }
            Err(e) => {
                self.settle(ticket, Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Delete a job, dropping it from every cache slot.
    ///
    /// # Errors
    ///
    /// Store errors; recorded on the list concern.
    pub fn delete_job<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
        id: i64,
    ) -> Result<bool, StoreError> {
        let ticket = self.begin(Concern::List);
        match session.store().delete(id) {
            Ok(removed) => {
                if removed {
                    self.apply_deleted(id);
                }
                self.settle(ticket, None);
                Ok(removed)
            }
            Err(e) => {
                self.settle(ticket, Some(e.clone()));
                Err(e)
            }
        }
    }

    /// Validate and attach a note to a job. Runs under the current
    /// concern: note edits belong to the detail view, so their
    /// failures must not disturb the list.
    ///
    /// # Errors
    ///
    /// Validation and store errors; both are recorded on the current
    /// concern.
    pub fn add_note<B: RemoteBackend>(
        &mut self,
        session: &mut Session<B>,
        job_id: i64,
        content: &str,
    ) -> Result<Note, StoreError> {
        let ticket = self.begin(Concern::Current);
        let result = validate::validate_note_content(content)
            .map_err(StoreError::from)
            .and_then(|content| session.store().add_note(job_id, &content));

        match result {
            Ok(note) => {
                self.apply_note(&note);
                self.settle(ticket, None);
                Ok(note)
            }
            Err(e) => {
                self.settle(ticket, Some(e.clone()));
                Err(e)
            }
        }
    }
}
