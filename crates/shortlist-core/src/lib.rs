//! shortlist-core: data model, validation, and the list query engine.
//!
//! # Conventions
//!
//! - **Errors**: typed enums via `thiserror`; expected absence is
//!   `NotFound`/`None`, never a panic.
//! - **Wire shape**: serde derives with camelCase field names.

pub mod dashboard;
pub mod error;
pub mod model;
pub mod query;
pub mod signature;
pub mod validate;

pub use error::StoreError;
pub use model::{Job, Note, Status};
pub use query::{JobPage, ListQuery, SortBy};
