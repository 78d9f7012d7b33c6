//! Session reconciler: reacts to auth transitions.
//!
//! Sign-in is the only moment guest data crosses into the remote
//! backend, and the ordering is deliberate: flip to remote mode, upload
//! the guest collection, then prove the remote side is readable with a
//! list fetch and a dashboard fetch before the local blob is destroyed.
//! Any failure along the way reverts to guest mode with local data
//! intact; the worst outcome of a broken sign-in is a duplicate-free
//! retry later, never data loss.
//!
//! A per-user guard makes the whole transition idempotent: repeated
//! sign-in events for the same user (auth libraries re-emit them
//! freely) are no-ops after the first.

use crate::remote::{MigrationReport, RemoteBackend};
use crate::state::JobsState;
use crate::store::{Mode, Session};
use shortlist_core::{ListQuery, StoreError};

/// Auth transition as reported by the surrounding app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Auth state not yet known; do nothing.
    Loading,
    /// A user session is established.
    SignedIn { user_id: String, email: String },
    /// The session ended.
    SignedOut,
}

/// Where the reconciler currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Guest mode; local store is the system of record.
    #[default]
    Guest,
    /// Sign-in observed; migration and verification in progress.
    Syncing,
    /// Remote mode verified for the current user.
    Synced,
}

/// Drives [`Session`] mode and guest-data migration off auth events.
#[derive(Debug, Default)]
pub struct SessionReconciler {
    synced_user: Option<String>,
    phase: Phase,
}

impl SessionReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn synced_user(&self) -> Option<&str> {
        self.synced_user.as_deref()
    }

    /// Feed one auth event through the reconciler.
    ///
    /// Returns the migration report when a guest upload ran, `None`
    /// when there was nothing to upload or the event was a no-op.
    ///
    /// # Errors
    ///
    /// Any migration or verification failure; the session is already
    /// reverted to guest mode when this returns `Err`.
    pub fn observe<B: RemoteBackend>(
        &mut self,
        event: &SessionEvent,
        session: &mut Session<B>,
        state: &mut JobsState,
    ) -> Result<Option<MigrationReport>, StoreError> {
        match event {
            SessionEvent::Loading => Ok(None),
            SessionEvent::SignedIn { user_id, email } => {
                if self.synced_user.as_deref() == Some(user_id) {
                    tracing::debug!(user = %user_id, "sign-in already reconciled");
                    return Ok(None);
                }
                tracing::info!(user = %user_id, email = %email, "sign-in observed");
                self.sign_in(user_id, session, state)
            }
            SessionEvent::SignedOut => {
                self.sign_out(session, state);
                Ok(None)
            }
        }
    }

    fn sign_in<B: RemoteBackend>(
        &mut self,
        user_id: &str,
        session: &mut Session<B>,
        state: &mut JobsState,
    ) -> Result<Option<MigrationReport>, StoreError> {
        self.phase = Phase::Syncing;
        session.set_mode(Mode::Remote);

        let guest_jobs = session.local().load();
        let report = if guest_jobs.is_empty() {
            None
        } else {
            match session.remote().migrate(&guest_jobs) {
                Ok(report) => {
                    tracing::info!(
                        imported = report.imported_jobs,
                        skipped = report.skipped_jobs,
                        "guest data uploaded"
                    );
                    Some(report)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "migration failed; staying in guest mode");
                    self.revert(session, state);
                    return Err(e);
                }
            }
        };

        // Both reads must succeed before guest data may be destroyed.
        // On failure the cached guest view stays on screen untouched;
        // only the per-concern error is set.
        let jobs_res = state.fetch_jobs(session, &ListQuery::default());
        let dash_res = state.fetch_dashboard(session);
        if let Err(e) = jobs_res.and(dash_res) {
            tracing::warn!(error = %e, "post-sign-in verification failed; reverting");
            self.revert(session, state);
            return Err(e);
        }
        // A guest-focused record must not survive into the remote
        // session; the list and dashboard were just replaced.
        state.clear_current();

        if report.is_some() {
            session.local().clear();
            tracing::info!("guest data cleared after verified migration");
        }

        self.synced_user = Some(user_id.to_string());
        self.phase = Phase::Synced;
        Ok(report)
    }

    fn sign_out<B: RemoteBackend>(&mut self, session: &mut Session<B>, state: &mut JobsState) {
        tracing::info!("sign-out observed; back to guest mode");
        session.set_mode(Mode::Local);
        state.clear_cached_data();
        self.synced_user = None;
        self.phase = Phase::Guest;

        // Repopulate from the guest store; local reads cannot fail.
        let _ = state.fetch_jobs(session, &ListQuery::default());
        let _ = state.fetch_dashboard(session);
    }

    /// Abort a sign-in: back to guest mode with the guest view
    /// restored. The failure itself travels up through the caller's
    /// `Result`; the visible data must never blank.
    fn revert<B: RemoteBackend>(&mut self, session: &mut Session<B>, state: &mut JobsState) {
        session.set_mode(Mode::Local);
        self.synced_user = None;
        self.phase = Phase::Guest;

        // Local reads cannot fail; this undoes any partial remote
        // fetch that landed before the failure.
        let _ = state.fetch_jobs(session, &ListQuery::default());
        let _ = state.fetch_dashboard(session);
    }
}
