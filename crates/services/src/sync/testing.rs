//! A switchable failing remote over an in-memory `StoreService`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use storage::{InMemoryRepository, StorageError};
use tracker_core::model::{Chapter, ChapterId, ChapterPatch, Config, ConfigPatch, Subject, SubjectId};
use tracker_core::time::fixed_clock;

use crate::error::RemoteError;
use crate::remote::RemoteStore;
use crate::store_service::StoreService;

pub(crate) struct FlakyRemote {
    inner: StoreService,
    failing: AtomicBool,
    requests: AtomicUsize,
}

impl FlakyRemote {
    pub(crate) fn new(inner: StoreService) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        }
    }

    pub(crate) fn fail_requests(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<(), RemoteError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("store offline".into()).into());
        }
        Ok(())
    }
}

/// One subject, "Financial Reporting", holding one blank chapter.
pub(crate) async fn seeded_remote() -> FlakyRemote {
    let inner = StoreService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
    let subject = inner.create_subject("Financial Reporting").await.unwrap();
    inner.add_chapter(subject.id(), "Ind AS 2").await.unwrap();
    FlakyRemote::new(inner)
}

#[async_trait]
impl RemoteStore for FlakyRemote {
    async fn list_subjects(&self) -> Result<Vec<Subject>, RemoteError> {
        self.gate()?;
        self.inner.list_subjects().await
    }

    async fn create_subject(&self, name: &str) -> Result<Subject, RemoteError> {
        self.gate()?;
        self.inner.create_subject(name).await
    }

    async fn rename_subject(&self, id: SubjectId, name: &str) -> Result<Subject, RemoteError> {
        self.gate()?;
        self.inner.rename_subject(id, name).await
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), RemoteError> {
        self.gate()?;
        self.inner.delete_subject(id).await
    }

    async fn list_chapters(&self, subject_id: SubjectId) -> Result<Vec<Chapter>, RemoteError> {
        self.gate()?;
        self.inner.list_chapters(subject_id).await
    }

    async fn add_chapter(&self, subject_id: SubjectId, name: &str) -> Result<Chapter, RemoteError> {
        self.gate()?;
        self.inner.add_chapter(subject_id, name).await
    }

    async fn update_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        patch: &ChapterPatch,
    ) -> Result<Chapter, RemoteError> {
        self.gate()?;
        self.inner.update_chapter(subject_id, chapter_id, patch).await
    }

    async fn delete_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<(), RemoteError> {
        self.gate()?;
        self.inner.delete_chapter(subject_id, chapter_id).await
    }

    async fn get_config(&self) -> Result<Config, RemoteError> {
        self.gate()?;
        self.inner.get_config().await
    }

    async fn update_config(&self, patch: &ConfigPatch) -> Result<Config, RemoteError> {
        self.gate()?;
        self.inner.update_config(patch).await
    }
}
