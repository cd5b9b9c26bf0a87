use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;

use crate::document::{Layout, StudyDocument};
use crate::repository::{Storage, StorageError, StudyRepository};

/// Flat JSON-file backend. The file is created on first use and legacy
/// layouts are rewritten in the current layout the first time they are read.
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty document if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory or file cannot be created.
    pub async fn ensure_exists(&self) -> Result<(), StorageError> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        self.save(&StudyDocument::default()).await?;
        tracing::info!(path = %self.path.display(), "created empty study document");
        Ok(())
    }
}

#[async_trait]
impl StudyRepository for JsonFileRepository {
    async fn load(&self) -> Result<StudyDocument, StorageError> {
        self.ensure_exists().await?;
        let raw = fs::read_to_string(&self.path).await?;
        let (document, layout) = StudyDocument::from_json(&raw)?;
        if layout == Layout::Legacy {
            tracing::info!(
                path = %self.path.display(),
                subjects = document.subjects.len(),
                "upgrading legacy subject list to current layout"
            );
            self.save(&document).await?;
        }
        Ok(document)
    }

    async fn save(&self, document: &StudyDocument) -> Result<(), StorageError> {
        let json = document.to_json()?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

impl Storage {
    /// Build a `Storage` backed by a JSON file, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be created or read.
    pub async fn json_file(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let repo = JsonFileRepository::new(path);
        repo.ensure_exists().await?;
        Ok(Self {
            study: Arc::new(repo),
        })
    }
}
