use thiserror::Error;

/// Validation errors raised by the domain model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("invalid date {raw:?}, expected YYYY-MM-DD")]
    InvalidDate { raw: String },
}
