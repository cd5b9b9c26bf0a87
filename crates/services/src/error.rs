//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use tracker_core::ModelError;
use tracker_core::model::{ChapterId, SubjectId};

use crate::sync::MutationState;

/// Failures reported by a Remote Store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    /// Rejected input, e.g. an empty name.
    #[error("{0}")]
    Validation(String),
    /// Stale id: the entity was deleted elsewhere.
    #[error("{0}")]
    NotFound(String),
    #[error("store request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("invalid store url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lookups against the Local Cache that found nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheError {
    #[error("subject {0} is not in the local cache")]
    SubjectNotFound(SubjectId),
    #[error("chapter {chapter_id} of subject {subject_id} is not in the local cache")]
    ChapterNotFound {
        subject_id: SubjectId,
        chapter_id: ChapterId,
    },
    #[error("local cache lock poisoned")]
    Poisoned,
}

/// Errors emitted by the Sync Controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// Rejected before any request was sent; the cache is untouched.
    #[error(transparent)]
    Validation(#[from] ModelError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    /// The request failed and the optimistic change was reverted.
    #[error("change was not saved: {0}")]
    RolledBack(#[source] RemoteError),
    /// A request-first operation failed; nothing was added to the cache.
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("mutation cannot move on from state {0:?}")]
    InvalidTransition(MutationState),
}

/// Errors raised while wiring the app-facing services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}
