//! Persisted record types shared by both store adapters.

pub mod job;
pub mod note;

pub use job::{Job, ParseStatusError, Status};
pub use note::Note;
