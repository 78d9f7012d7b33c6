use crate::validate::ValidationError;

/// Failure taxonomy shared by both store adapters.
///
/// Expected absence is expressed as `NotFound` (or a `false` return for
/// deletes), never as a panic. The state container renders these into
/// per-concern messages via `Display`; prior data stays visible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Malformed, missing, or oversize input. User-correctable.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Referenced job or note is absent or not owned by the caller.
    #[error("Job not found")]
    NotFound,

    /// No valid session on the remote side.
    #[error("Unauthorized")]
    Unauthorized,

    /// Local persistence failed. The local adapter swallows these on
    /// its own read/write paths; the variant exists for callers that
    /// need to report an explicit storage problem.
    #[error("local storage error: {0}")]
    Storage(String),

    /// Remote call failed in transit.
    #[error("network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::validate::ValidationError;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(StoreError::NotFound.to_string(), "Job not found");
        assert_eq!(StoreError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            StoreError::Network("connection reset".to_string()).to_string(),
            "network error: connection reset"
        );
        assert_eq!(
            StoreError::from(ValidationError::Missing("company")).to_string(),
            "company is required"
        );
    }
}
