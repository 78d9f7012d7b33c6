use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note attached to a job application.
///
/// `job_application_id` is a back-reference, not ownership: notes live
/// inside their parent job's `notes` list and are deleted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub job_application_id: i64,
    pub created_at: DateTime<Utc>,
}
