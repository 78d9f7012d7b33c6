//! Typed validation for job and note input.
//!
//! Raw wire-shaped input ([`CreateJobInput`], [`UpdateJobInput`]) is
//! decoded into validated, typed values ([`JobDraft`], [`JobPatch`])
//! before any store sees it. The remote reference backend re-runs the
//! same checks server-side, so a client skipping validation cannot
//! smuggle malformed records in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::model::{Job, Status};

// ---------------------------------------------------------------------------
// Field limits
// ---------------------------------------------------------------------------

pub const MAX_COMPANY_LENGTH: usize = 120;
pub const MAX_POSITION_LENGTH: usize = 160;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
pub const MAX_JOB_URL_LENGTH: usize = 2048;
pub const MAX_NOTE_LENGTH: usize = 2000;

/// Upper bound on jobs accepted by one migration batch.
pub const MAX_IMPORT_JOBS: usize = 500;
/// Upper bound on notes imported per job in a migration batch.
pub const MAX_NOTES_PER_JOB: usize = 200;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A user-correctable input problem, tagged by field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must be a non-empty string")]
    Empty(&'static str),

    #[error("{field} exceeds maximum length of {max}")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid status: '{0}'")]
    InvalidStatus(String),

    #[error("invalid apply date: '{0}'")]
    InvalidDate(String),

    #[error("jobs exceeds maximum of {MAX_IMPORT_JOBS} items")]
    BatchTooLarge,
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// Untrusted create payload, shaped like the wire request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobInput {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub apply_date: Option<String>,
}

/// Untrusted update payload. Absent fields are left untouched; an
/// empty string on an optional field clears it (wire sends null or "").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobInput {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub apply_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated output
// ---------------------------------------------------------------------------

/// A fully validated create payload: trimmed strings, parsed enum and
/// dates. Everything a store needs except the id and timestamps it
/// allocates itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    pub company: String,
    pub position: String,
    pub status: Status,
    pub description: Option<String>,
    pub job_url: Option<String>,
    pub apply_date: Option<DateTime<Utc>>,
}

/// A validated partial update. Outer `None` = leave the field alone;
/// inner `None` on the optional fields = clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub status: Option<Status>,
    pub description: Option<Option<String>>,
    pub job_url: Option<Option<String>>,
    pub apply_date: Option<Option<DateTime<Utc>>>,
}

impl JobPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.position.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.job_url.is_none()
            && self.apply_date.is_none()
    }

    /// Shallow-merge into an existing record. `id`, `created_at`, and
    /// `notes` are never touched by a patch.
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(company) = &self.company {
            job.company.clone_from(company);
        }
        if let Some(position) = &self.position {
            job.position.clone_from(position);
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(description) = &self.description {
            job.description.clone_from(description);
        }
        if let Some(job_url) = &self.job_url {
            job.job_url.clone_from(job_url);
        }
        if let Some(apply_date) = self.apply_date {
            job.apply_date = apply_date;
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn trimmed(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn check_len(value: &str, field: &'static str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        Err(ValidationError::TooLong { field, max })
    } else {
        Ok(())
    }
}

/// Parse a wire date: RFC 3339 first, then a bare `YYYY-MM-DD`
/// interpreted as midnight UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Validate a create payload.
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered: missing required
/// field, oversize field, unknown status, or unparseable date.
pub fn validate_create(input: &CreateJobInput) -> Result<JobDraft, ValidationError> {
    let company = trimmed(&input.company).ok_or(ValidationError::Missing("company"))?;
    let position = trimmed(&input.position).ok_or(ValidationError::Missing("position"))?;
    let status_raw = trimmed(&input.status).ok_or(ValidationError::Missing("status"))?;

    check_len(&company, "company", MAX_COMPANY_LENGTH)?;
    check_len(&position, "position", MAX_POSITION_LENGTH)?;

    let status = Status::from_str(&status_raw)
        .map_err(|e| ValidationError::InvalidStatus(e.got))?;

    let description = match input.description.as_deref().and_then(trimmed) {
        Some(d) => {
            check_len(&d, "description", MAX_DESCRIPTION_LENGTH)?;
            Some(d)
        }
        None => None,
    };
    let job_url = match input.job_url.as_deref().and_then(trimmed) {
        Some(u) => {
            check_len(&u, "jobUrl", MAX_JOB_URL_LENGTH)?;
            Some(u)
        }
        None => None,
    };
    let apply_date = match input.apply_date.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => {
            Some(parse_date(raw).ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))?)
        }
    };

    Ok(JobDraft {
        company,
        position,
        status,
        description,
        job_url,
        apply_date,
    })
}

/// Validate a partial update payload.
///
/// Required fields (company, position, status), when present, must
/// stay non-empty. Optional fields accept an empty string as "clear".
///
/// # Errors
///
/// Returns the first [`ValidationError`] encountered.
pub fn validate_update(input: &UpdateJobInput) -> Result<JobPatch, ValidationError> {
    let mut patch = JobPatch::default();

    if let Some(raw) = &input.company {
        let company = trimmed(raw).ok_or(ValidationError::Empty("company"))?;
        check_len(&company, "company", MAX_COMPANY_LENGTH)?;
        patch.company = Some(company);
    }
    if let Some(raw) = &input.position {
        let position = trimmed(raw).ok_or(ValidationError::Empty("position"))?;
        check_len(&position, "position", MAX_POSITION_LENGTH)?;
        patch.position = Some(position);
    }
    if let Some(raw) = &input.status {
        let status_raw = trimmed(raw).ok_or(ValidationError::Empty("status"))?;
        let status = Status::from_str(&status_raw)
            .map_err(|e| ValidationError::InvalidStatus(e.got))?;
        patch.status = Some(status);
    }
    if let Some(raw) = &input.description {
        patch.description = Some(match trimmed(raw) {
            Some(d) => {
                check_len(&d, "description", MAX_DESCRIPTION_LENGTH)?;
                Some(d)
            }
            None => None,
        });
    }
    if let Some(raw) = &input.job_url {
        patch.job_url = Some(match trimmed(raw) {
            Some(u) => {
                check_len(&u, "jobUrl", MAX_JOB_URL_LENGTH)?;
                Some(u)
            }
            None => None,
        });
    }
    if let Some(raw) = &input.apply_date {
        let raw = raw.trim();
        patch.apply_date = Some(if raw.is_empty() {
            None
        } else {
            Some(parse_date(raw).ok_or_else(|| ValidationError::InvalidDate(raw.to_string()))?)
        });
    }

    Ok(patch)
}

/// Validate note content: trimmed, non-empty, bounded.
///
/// # Errors
///
/// Returns a [`ValidationError`] for empty or oversize content.
pub fn validate_note_content(content: &str) -> Result<String, ValidationError> {
    let content = trimmed(content).ok_or(ValidationError::Empty("content"))?;
    check_len(&content, "content", MAX_NOTE_LENGTH)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::{TimeZone, Utc};

    fn create_input(company: &str, position: &str, status: &str) -> CreateJobInput {
        CreateJobInput {
            company: company.to_string(),
            position: position.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn create_trims_and_parses() {
        let mut input = create_input("  Acme  ", " Engineer ", "applied");
        input.apply_date = Some("2026-03-01".to_string());

        let draft = validate_create(&input).unwrap();
        assert_eq!(draft.company, "Acme");
        assert_eq!(draft.position, "Engineer");
        assert_eq!(draft.status, Status::Applied);
        assert_eq!(
            draft.apply_date,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn create_rejects_missing_required_fields() {
        assert_eq!(
            validate_create(&create_input("", "Engineer", "applied")),
            Err(ValidationError::Missing("company"))
        );
        assert_eq!(
            validate_create(&create_input("Acme", "   ", "applied")),
            Err(ValidationError::Missing("position"))
        );
        assert_eq!(
            validate_create(&create_input("Acme", "Engineer", "")),
            Err(ValidationError::Missing("status"))
        );
    }

    #[test]
    fn create_rejects_unknown_status_and_bad_date() {
        assert_eq!(
            validate_create(&create_input("Acme", "Engineer", "ghosted")),
            Err(ValidationError::InvalidStatus("ghosted".to_string()))
        );

        let mut input = create_input("Acme", "Engineer", "applied");
        input.apply_date = Some("not-a-date".to_string());
        assert_eq!(
            validate_create(&input),
            Err(ValidationError::InvalidDate("not-a-date".to_string()))
        );
    }

    #[test]
    fn create_rejects_oversize_fields() {
        let input = create_input(&"x".repeat(MAX_COMPANY_LENGTH + 1), "Engineer", "applied");
        assert_eq!(
            validate_create(&input),
            Err(ValidationError::TooLong {
                field: "company",
                max: MAX_COMPANY_LENGTH
            })
        );
    }

    #[test]
    fn create_drops_blank_optionals() {
        let mut input = create_input("Acme", "Engineer", "applied");
        input.description = Some("   ".to_string());
        input.job_url = Some(String::new());

        let draft = validate_create(&input).unwrap();
        assert!(draft.description.is_none());
        assert!(draft.job_url.is_none());
    }

    #[test]
    fn update_empty_required_field_is_rejected() {
        let input = UpdateJobInput {
            company: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_update(&input),
            Err(ValidationError::Empty("company"))
        );
    }

    #[test]
    fn update_clears_optional_fields_with_empty_string() {
        let input = UpdateJobInput {
            description: Some(String::new()),
            apply_date: Some(String::new()),
            ..Default::default()
        };

        let patch = validate_update(&input).unwrap();
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.apply_date, Some(None));
        assert!(patch.company.is_none());
    }

    #[test]
    fn update_absent_fields_stay_untouched() {
        let patch = validate_update(&UpdateJobInput::default()).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn patch_apply_merges_without_touching_identity() {
        let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let mut job = crate::model::Job {
            id: 9,
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            status: Status::Applied,
            description: Some("old".to_string()),
            job_url: None,
            apply_date: None,
            created_at: created,
            notes: vec![],
        };

        let patch = JobPatch {
            status: Some(Status::Interview),
            description: Some(None),
            ..Default::default()
        };
        patch.apply_to(&mut job);

        assert_eq!(job.id, 9);
        assert_eq!(job.created_at, created);
        assert_eq!(job.status, Status::Interview);
        assert!(job.description.is_none());
        assert_eq!(job.company, "Acme");
    }

    #[test]
    fn note_content_is_trimmed_and_bounded() {
        assert_eq!(
            validate_note_content("  call back Tuesday  ").unwrap(),
            "call back Tuesday"
        );
        assert_eq!(
            validate_note_content("   "),
            Err(ValidationError::Empty("content"))
        );
        assert_eq!(
            validate_note_content(&"x".repeat(MAX_NOTE_LENGTH + 1)),
            Err(ValidationError::TooLong {
                field: "content",
                max: MAX_NOTE_LENGTH
            })
        );
    }

    #[test]
    fn parse_date_accepts_rfc3339_and_bare_dates() {
        assert_eq!(
            parse_date("2026-03-01T10:30:00Z"),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2026-03-01"),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );
        assert!(parse_date("03/01/2026").is_none());
    }
}
