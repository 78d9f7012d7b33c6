//! Deduplication signatures for migration imports.
//!
//! A signature is a BLAKE3 digest over every job field except `id` and
//! `notes`. The import endpoint skips any incoming job whose signature
//! matches one the user already owns, so re-running the same batch is
//! safe and reports skips instead of creating duplicates. Notes stay
//! out of the digest to keep re-import checks cheap at scale.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::Job;

const FIELD_SEPARATOR: [u8; 1] = [0];

fn update_opt(hasher: &mut blake3::Hasher, value: Option<&str>) {
    match value {
        Some(v) => hasher.update(v.as_bytes()),
        None => hasher.update(b"-"),
    };
    hasher.update(&FIELD_SEPARATOR);
}

fn date_repr(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Compute the dedup signature of a job's non-note fields.
#[must_use]
pub fn job_signature(job: &Job) -> String {
    let mut hasher = blake3::Hasher::new();

    update_opt(&mut hasher, Some(&job.company));
    update_opt(&mut hasher, Some(&job.position));
    update_opt(&mut hasher, Some(job.status.as_str()));
    update_opt(&mut hasher, job.description.as_deref());
    update_opt(&mut hasher, job.job_url.as_deref());
    update_opt(&mut hasher, date_repr(job.apply_date).as_deref());
    update_opt(&mut hasher, date_repr(Some(job.created_at)).as_deref());

    format!("blake3:{}", hasher.finalize().to_hex())
}
