//! Dual-mode persistence for the shortlist job tracker.
//!
//! Two adapters implement the same [`JobStore`] trait: a file-backed
//! [`LocalStore`] for guest sessions and a [`RemoteStore`] over any
//! [`RemoteBackend`] for authenticated ones. A [`Session`] holds both
//! plus the mode that selects between them, [`JobsState`] caches query
//! results with per-concern loading/error tracking, and the
//! [`SessionReconciler`] moves guest data to the remote side exactly
//! once on sign-in.
//!
//! [`MemoryBackend`] is the reference remote: it runs the same query
//! engine as the local store, which is what keeps list behavior
//! identical across modes.

pub mod backend;
pub mod local;
pub mod remote;
pub mod session;
pub mod state;
pub mod store;

pub use backend::{Fault, MemoryBackend};
pub use local::LocalStore;
pub use remote::{MigrationReport, RemoteBackend, RemoteStore};
pub use session::{Phase, SessionEvent, SessionReconciler};
pub use state::{Concern, JobsState, ListMeta, Ticket};
pub use store::{JobStore, Mode, Session};
