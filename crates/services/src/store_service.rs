use std::sync::Arc;

use async_trait::async_trait;
use storage::{StudyDocument, StudyRepository};
use tokio::sync::Mutex;
use tracker_core::model::{
    Chapter, ChapterId, ChapterPatch, Config, ConfigPatch, Name, Subject, SubjectId,
};

use crate::Clock;
use crate::error::RemoteError;
use crate::remote::{
    CHAPTER_NAME_REQUIRED, CHAPTER_NOT_FOUND, RemoteStore, SUBJECT_NAME_REQUIRED,
    SUBJECT_NOT_FOUND,
};

/// In-process authority over a `StudyRepository`: validates, stamps ids and
/// timestamps, and runs one read/modify/write cycle per request.
pub struct StoreService {
    clock: Clock,
    repo: Arc<dyn StudyRepository>,
    // Serializes read/modify/write cycles issued from this process.
    write_gate: Mutex<()>,
}

impl StoreService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn StudyRepository>) -> Self {
        Self {
            clock,
            repo,
            write_gate: Mutex::new(()),
        }
    }

    async fn modify<T: Send>(
        &self,
        change: impl FnOnce(&mut StudyDocument) -> Result<T, RemoteError> + Send,
    ) -> Result<T, RemoteError> {
        let _guard = self.write_gate.lock().await;
        let mut document = self.repo.load().await?;
        let result = change(&mut document)?;
        self.repo.save(&document).await?;
        Ok(result)
    }
}

fn subject_mut(doc: &mut StudyDocument, id: SubjectId) -> Result<&mut Subject, RemoteError> {
    doc.subjects
        .iter_mut()
        .find(|s| s.id() == id)
        .ok_or_else(|| RemoteError::NotFound(SUBJECT_NOT_FOUND.into()))
}

fn chapter_mut(
    doc: &mut StudyDocument,
    subject_id: SubjectId,
    chapter_id: ChapterId,
) -> Result<&mut Chapter, RemoteError> {
    subject_mut(doc, subject_id)?
        .chapter_mut(chapter_id)
        .ok_or_else(|| RemoteError::NotFound(CHAPTER_NOT_FOUND.into()))
}

fn validated(name: &str, message: &str) -> Result<Name, RemoteError> {
    Name::new(name).map_err(|_| RemoteError::Validation(message.into()))
}

#[async_trait]
impl RemoteStore for StoreService {
    async fn list_subjects(&self) -> Result<Vec<Subject>, RemoteError> {
        Ok(self.repo.load().await?.subjects)
    }

    async fn create_subject(&self, name: &str) -> Result<Subject, RemoteError> {
        let name = validated(name, SUBJECT_NAME_REQUIRED)?;
        let subject = Subject::new(SubjectId::generate(), name, self.clock.now());
        let created = subject.clone();
        self.modify(move |doc| {
            doc.subjects.push(subject);
            Ok(())
        })
        .await?;
        tracing::debug!(subject_id = %created.id(), "subject created");
        Ok(created)
    }

    async fn rename_subject(&self, id: SubjectId, name: &str) -> Result<Subject, RemoteError> {
        let name = validated(name, SUBJECT_NAME_REQUIRED)?;
        self.modify(move |doc| {
            let subject = subject_mut(doc, id)?;
            subject.rename(name);
            Ok(subject.clone())
        })
        .await
    }

    async fn delete_subject(&self, id: SubjectId) -> Result<(), RemoteError> {
        self.modify(move |doc| {
            let index = doc
                .subjects
                .iter()
                .position(|s| s.id() == id)
                .ok_or_else(|| RemoteError::NotFound(SUBJECT_NOT_FOUND.into()))?;
            // Chapters are owned inline, so they go with the subject.
            doc.subjects.remove(index);
            Ok(())
        })
        .await
    }

    async fn list_chapters(&self, subject_id: SubjectId) -> Result<Vec<Chapter>, RemoteError> {
        let doc = self.repo.load().await?;
        doc.subjects
            .into_iter()
            .find(|s| s.id() == subject_id)
            .map(|s| s.chapters().to_vec())
            .ok_or_else(|| RemoteError::NotFound(SUBJECT_NOT_FOUND.into()))
    }

    async fn add_chapter(
        &self,
        subject_id: SubjectId,
        name: &str,
    ) -> Result<Chapter, RemoteError> {
        let name = validated(name, CHAPTER_NAME_REQUIRED)?;
        let chapter = Chapter::new(ChapterId::generate(), name, self.clock.now());
        self.modify(move |doc| {
            subject_mut(doc, subject_id)?.push_chapter(chapter.clone());
            Ok(chapter)
        })
        .await
    }

    async fn update_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        patch: &ChapterPatch,
    ) -> Result<Chapter, RemoteError> {
        let patch = patch.clone();
        self.modify(move |doc| {
            let chapter = chapter_mut(doc, subject_id, chapter_id)?;
            chapter
                .apply_patch(&patch)
                .map_err(|_| RemoteError::Validation(CHAPTER_NAME_REQUIRED.into()))?;
            Ok(chapter.clone())
        })
        .await
    }

    async fn delete_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<(), RemoteError> {
        self.modify(move |doc| {
            subject_mut(doc, subject_id)?
                .remove_chapter(chapter_id)
                .map(|_| ())
                .ok_or_else(|| RemoteError::NotFound(CHAPTER_NOT_FOUND.into()))
        })
        .await
    }

    async fn get_config(&self) -> Result<Config, RemoteError> {
        Ok(self.repo.load().await?.config)
    }

    async fn update_config(&self, patch: &ConfigPatch) -> Result<Config, RemoteError> {
        let patch = patch.clone();
        self.modify(move |doc| {
            doc.config.apply_patch(&patch);
            Ok(doc.config.clone())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::InMemoryRepository;
    use tracker_core::model::Criterion;
    use tracker_core::time::fixed_clock;

    fn service() -> (StoreService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (StoreService::new(fixed_clock(), Arc::new(repo.clone())), repo)
    }

    #[tokio::test]
    async fn create_subject_trims_and_stamps() {
        let (store, repo) = service();
        let subject = store.create_subject("  Audit ").await.unwrap();
        assert_eq!(subject.name().as_str(), "Audit");
        assert_eq!(subject.created_at(), tracker_core::time::fixed_now());
        assert_eq!(repo.load().await.unwrap().subjects, vec![subject]);
    }

    #[tokio::test]
    async fn empty_names_are_validation_errors() {
        let (store, _) = service();
        let err = store.create_subject("   ").await.unwrap_err();
        assert!(matches!(err, RemoteError::Validation(ref m) if m == SUBJECT_NAME_REQUIRED));

        let subject = store.create_subject("Tax").await.unwrap();
        let err = store.add_chapter(subject.id(), "").await.unwrap_err();
        assert!(matches!(err, RemoteError::Validation(ref m) if m == CHAPTER_NAME_REQUIRED));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let (store, _) = service();
        let err = store.rename_subject(SubjectId::generate(), "x").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(ref m) if m == SUBJECT_NOT_FOUND));

        let subject = store.create_subject("Tax").await.unwrap();
        let err = store
            .update_chapter(subject.id(), ChapterId::generate(), &ChapterPatch::revisions(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound(ref m) if m == CHAPTER_NOT_FOUND));
    }

    #[tokio::test]
    async fn update_chapter_applies_only_present_fields() {
        let (store, _) = service();
        let subject = store.create_subject("Law").await.unwrap();
        let chapter = store.add_chapter(subject.id(), "Contracts").await.unwrap();

        let mut patch = ChapterPatch::toggle(Criterion::Pyq, true);
        patch.revision_count = Some(2);
        let updated = store
            .update_chapter(subject.id(), chapter.id(), &patch)
            .await
            .unwrap();
        assert!(updated.criterion(Criterion::Pyq));
        assert!(!updated.criterion(Criterion::Concepts));
        assert_eq!(updated.revision_count(), 2);
        assert_eq!(updated.name().as_str(), "Contracts");

        let listed = store.list_chapters(subject.id()).await.unwrap();
        assert_eq!(listed, vec![updated]);
    }

    #[tokio::test]
    async fn delete_subject_cascades_chapters() {
        let (store, repo) = service();
        let subject = store.create_subject("Costing").await.unwrap();
        store.add_chapter(subject.id(), "Standard costing").await.unwrap();

        store.delete_subject(subject.id()).await.unwrap();
        let doc = repo.load().await.unwrap();
        assert!(doc.subjects.is_empty());
        assert!(store.list_chapters(subject.id()).await.is_err());
    }

    #[tokio::test]
    async fn config_patch_updates_only_given_fields() {
        let (store, _) = service();
        let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 1);
        let updated = store
            .update_config(&ConfigPatch {
                start_date: Some(start),
                brand_title: Some("CA Final".into()),
                ..ConfigPatch::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.start_date(), start);
        assert_eq!(updated.target_date(), None);
        assert_eq!(store.get_config().await.unwrap(), updated);
    }
}
