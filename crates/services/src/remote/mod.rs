//! Remote Store contract consumed by the Sync Controller.

mod http;

use async_trait::async_trait;
use tracker_core::model::{
    Chapter, ChapterId, ChapterPatch, Config, ConfigPatch, Subject, SubjectId,
};

use crate::error::RemoteError;

pub use http::HttpRemoteStore;

pub const SUBJECT_NAME_REQUIRED: &str = "Subject name is required.";
pub const CHAPTER_NAME_REQUIRED: &str = "Chapter name is required.";
pub const SUBJECT_NOT_FOUND: &str = "Subject not found.";
pub const CHAPTER_NOT_FOUND: &str = "Chapter not found.";

/// Authoritative persistence for subjects, chapters and config. Transport
/// agnostic: any request/response mechanism can implement it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `RemoteError` if the store is unreachable.
    async fn list_subjects(&self) -> Result<Vec<Subject>, RemoteError>;

    /// Create a subject; the store assigns id and `createdAt`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Validation` for an empty name.
    async fn create_subject(&self, name: &str) -> Result<Subject, RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` or `RemoteError::Validation`.
    async fn rename_subject(&self, id: SubjectId, name: &str) -> Result<Subject, RemoteError>;

    /// Delete a subject together with all its chapters.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` for an unknown id.
    async fn delete_subject(&self, id: SubjectId) -> Result<(), RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` for an unknown subject.
    async fn list_chapters(&self, subject_id: SubjectId) -> Result<Vec<Chapter>, RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` (subject) or `RemoteError::Validation`.
    async fn add_chapter(&self, subject_id: SubjectId, name: &str)
    -> Result<Chapter, RemoteError>;

    /// Apply the fields present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` for an unknown subject or chapter.
    async fn update_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        patch: &ChapterPatch,
    ) -> Result<Chapter, RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` for an unknown subject or chapter.
    async fn delete_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<(), RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError` if the store is unreachable.
    async fn get_config(&self) -> Result<Config, RemoteError>;

    /// # Errors
    ///
    /// Returns `RemoteError` if the store is unreachable.
    async fn update_config(&self, patch: &ConfigPatch) -> Result<Config, RemoteError>;
}
