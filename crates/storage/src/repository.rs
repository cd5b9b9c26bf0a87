use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::document::StudyDocument;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-document persistence for the study tree.
///
/// Writers follow a read/modify/write cycle; the last `save` wins.
#[async_trait]
pub trait StudyRepository: Send + Sync {
    /// Read the current document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing store cannot be read or parsed.
    async fn load(&self) -> Result<StudyDocument, StorageError>;

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn save(&self, document: &StudyDocument) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    document: Arc<Mutex<StudyDocument>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StudyRepository for InMemoryRepository {
    async fn load(&self) -> Result<StudyDocument, StorageError> {
        let guard = self
            .document
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, document: &StudyDocument) -> Result<(), StorageError> {
        let mut guard = self
            .document
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = document.clone();
        Ok(())
    }
}

/// Holds the repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub study: Arc<dyn StudyRepository>,
}
