//! Aggregate progress counters for the dashboard view.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Job;

/// Maximum records in the `recent` list, both modes.
pub const RECENT_LIMIT: usize = 10;

/// Dashboard aggregates, recomputed from the full collection on every
/// fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub recent: Vec<Job>,
}

/// Compute stats over a collection.
///
/// `recent` is explicitly re-sorted by `created_at` (newest first, id
/// as tie-break) rather than trusting list order: migration can insert
/// backdated records, which silently breaks an insertion-order
/// assumption.
#[must_use]
pub fn compute(jobs: &[Job]) -> DashboardStats {
    let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
    for job in jobs {
        *by_status.entry(job.status.as_str().to_string()).or_insert(0) += 1;
    }

    let mut recent: Vec<Job> = jobs.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    recent.truncate(RECENT_LIMIT);

    DashboardStats {
        total: u64::try_from(jobs.len()).unwrap_or(u64::MAX),
        by_status,
        recent,
    }
}
