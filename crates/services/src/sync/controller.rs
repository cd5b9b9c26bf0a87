use std::sync::{Arc, Mutex};

use tracker_core::dashboard::DashboardSnapshot;
use tracker_core::model::{
    Chapter, ChapterId, Config, ConfigPatch, Criterion, Name, Subject, SubjectId,
};

use super::commands::{
    AdjustRevision, DeleteChapter, DeleteSubject, RenameChapter, RenameSubject, RevisionStep,
    ToggleCriterion, UpdateConfig,
};
use super::mutation::{Mutation, OptimisticCommand, Scope};
use super::notice::Notice;
use crate::Clock;
use crate::cache::{DerivedProgress, LocalCache, Selection};
use crate::error::{CacheError, SyncError};
use crate::remote::RemoteStore;

pub const CONNECT_FAILED: &str = "Could not connect to server.";

/// How the initial bulk load went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    /// The store was unreachable; the cache starts empty.
    Offline,
}

/// Result of a cache-first mutation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No-op: nothing applied, no request issued.
    Unchanged,
    Confirmed(DerivedProgress),
}

/// Sole writer of the Local Cache.
///
/// The cache lock is only ever held for synchronous apply/commit/rollback
/// steps, never across a request, so independent mutations can be in flight
/// at the same time. Responses are applied in arrival order.
pub struct SyncController {
    cache: Arc<Mutex<LocalCache>>,
    remote: Arc<dyn RemoteStore>,
    clock: Clock,
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl SyncController {
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteStore>, clock: Clock) -> Self {
        Self {
            cache: Arc::new(Mutex::new(LocalCache::new())),
            remote,
            clock,
            notices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Bulk-load subjects and config from the store.
    ///
    /// An unreachable store is not an error: the cache is reset to an empty
    /// subject list and a connectivity notice is queued.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Cache` only if the cache lock is poisoned.
    pub async fn load(&self) -> Result<LoadStatus, SyncError> {
        let subjects = match self.remote.list_subjects().await {
            Ok(subjects) => subjects,
            Err(error) => {
                tracing::warn!(%error, "initial load failed; starting with an empty cache");
                self.with_cache(|cache| {
                    cache.replace_all(Vec::new(), Config::default());
                    Ok(())
                })?;
                self.push_notice(Notice::error(CONNECT_FAILED));
                return Ok(LoadStatus::Offline);
            }
        };
        let config = self.remote.get_config().await.unwrap_or_else(|error| {
            tracing::warn!(%error, "config unavailable; using defaults");
            Config::default()
        });
        tracing::info!(subjects = subjects.len(), "loaded study data");
        self.with_cache(|cache| {
            cache.replace_all(subjects, config);
            Ok(())
        })?;
        Ok(LoadStatus::Loaded)
    }

    /// Drive one command through apply, send and commit or rollback.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::RolledBack` when the request failed and the cache
    /// was restored, or the command's own validation/cache error.
    pub async fn run<C: OptimisticCommand>(&self, command: C) -> Result<SyncOutcome, SyncError> {
        let mut mutation = Mutation::new(command);
        let applied = self.with_cache(|cache| mutation.apply(cache))?;
        if !applied {
            tracing::debug!("mutation is a no-op; no request issued");
            return Ok(SyncOutcome::Unchanged);
        }
        let scope = mutation.command().scope();
        tracing::debug!(?scope, "applied locally");

        match mutation.send(self.remote.as_ref()).await {
            Ok(response) => {
                self.with_cache(|cache| mutation.commit(cache, response))?;
                tracing::debug!(?scope, "confirmed");
                if let Some(message) = mutation.command().success_notice() {
                    self.push_notice(Notice::success(message));
                }
                Ok(SyncOutcome::Confirmed(self.derived(scope)?))
            }
            Err(SyncError::Remote(error)) => {
                // Queued first: the failure is reported even if restoring fails.
                self.push_notice(Notice::error(mutation.command().failure_notice(&error)));
                self.with_cache(|cache| mutation.rollback(cache))?;
                tracing::warn!(?scope, %error, "rolled back");
                Err(SyncError::RolledBack(error))
            }
            Err(other) => Err(other),
        }
    }

    //
    // ─── SUBJECTS ──────────────────────────────────────────────────────────────
    //

    /// Request-first: the subject enters the cache only once the store has
    /// assigned its id. The new subject becomes the selection.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a blank name (nothing sent), or
    /// `SyncError::Remote` if the store rejects the request.
    pub async fn add_subject(&self, name: &str) -> Result<Subject, SyncError> {
        let name = Name::new(name)?;
        let subject = match self.remote.create_subject(name.as_str()).await {
            Ok(subject) => subject,
            Err(error) => return Err(self.create_failed(error)),
        };
        self.with_cache(|cache| {
            cache.upsert_subject(subject.clone());
            cache.select(Selection::Subject(subject.id()));
            Ok(())
        })?;
        tracing::debug!(subject = %subject.id(), "subject created");
        self.push_notice(Notice::success(format!(
            "Subject \"{}\" added.",
            subject.name()
        )));
        Ok(subject)
    }

    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a blank name, `SyncError::RolledBack`
    /// if the store rejects the rename.
    pub async fn rename_subject(
        &self,
        subject_id: SubjectId,
        name: &str,
    ) -> Result<SyncOutcome, SyncError> {
        let name = Name::new(name)?;
        self.run(RenameSubject { subject_id, name }).await
    }

    /// Removes the subject and every chapter it owns.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::RolledBack` if the store rejects the delete.
    pub async fn delete_subject(&self, subject_id: SubjectId) -> Result<SyncOutcome, SyncError> {
        self.run(DeleteSubject { subject_id }).await
    }

    //
    // ─── CHAPTERS ──────────────────────────────────────────────────────────────
    //

    /// Request-first, like [`SyncController::add_subject`].
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a blank name, `SyncError::Remote`
    /// if the store rejects the request.
    pub async fn add_chapter(&self, subject_id: SubjectId, name: &str) -> Result<Chapter, SyncError> {
        let name = Name::new(name)?;
        let chapter = match self.remote.add_chapter(subject_id, name.as_str()).await {
            Ok(chapter) => chapter,
            Err(error) => return Err(self.create_failed(error)),
        };
        self.with_cache(|cache| {
            cache.upsert_chapter(subject_id, chapter.clone())?;
            Ok(())
        })?;
        tracing::debug!(subject = %subject_id, chapter = %chapter.id(), "chapter created");
        self.push_notice(Notice::success(format!(
            "Chapter \"{}\" added.",
            chapter.name()
        )));
        Ok(chapter)
    }

    /// # Errors
    ///
    /// Returns `SyncError::Validation` for a blank name, `SyncError::RolledBack`
    /// if the store rejects the rename.
    pub async fn rename_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        name: &str,
    ) -> Result<SyncOutcome, SyncError> {
        let name = Name::new(name)?;
        self.run(RenameChapter {
            subject_id,
            chapter_id,
            name,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `SyncError::RolledBack` if the store rejects the delete.
    pub async fn delete_chapter(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<SyncOutcome, SyncError> {
        self.run(DeleteChapter {
            subject_id,
            chapter_id,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `SyncError::RolledBack` if the store rejects the update.
    pub async fn toggle_criterion(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        criterion: Criterion,
        value: bool,
    ) -> Result<SyncOutcome, SyncError> {
        self.run(ToggleCriterion {
            subject_id,
            chapter_id,
            criterion,
            value,
        })
        .await
    }

    /// A decrement at zero is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::RolledBack` if the store rejects the update.
    pub async fn adjust_revision(
        &self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        step: RevisionStep,
    ) -> Result<SyncOutcome, SyncError> {
        self.run(AdjustRevision {
            subject_id,
            chapter_id,
            step,
        })
        .await
    }

    //
    // ─── CONFIG ────────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `SyncError::RolledBack` if the store rejects the update.
    pub async fn update_config(&self, patch: ConfigPatch) -> Result<SyncOutcome, SyncError> {
        if patch.is_empty() {
            return Ok(SyncOutcome::Unchanged);
        }
        self.run(UpdateConfig { patch }).await
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    /// Run a read against the cache.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Cache` if the cache lock is poisoned.
    pub fn read<T>(&self, read: impl FnOnce(&LocalCache) -> T) -> Result<T, SyncError> {
        let cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(read(&cache))
    }

    /// # Errors
    ///
    /// Returns `SyncError::Cache` if the cache lock is poisoned.
    pub fn snapshot(&self) -> Result<LocalCache, SyncError> {
        self.read(LocalCache::clone)
    }

    /// # Errors
    ///
    /// Returns `SyncError::Cache` if the cache lock is poisoned.
    pub fn dashboard(&self) -> Result<DashboardSnapshot, SyncError> {
        let today = self.clock.today();
        self.read(|cache| cache.dashboard(today))
    }

    /// Change the selection. Selecting an unknown subject is rejected.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::SubjectNotFound` for an unknown subject.
    pub fn select(&self, selection: Selection) -> Result<Selection, SyncError> {
        self.with_cache(|cache| {
            if let Selection::Subject(id) = selection {
                cache.subject(id).ok_or(CacheError::SubjectNotFound(id))?;
            }
            Ok(cache.select(selection))
        })
    }

    /// Drain queued notices, oldest first.
    #[must_use]
    pub fn take_notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut notices) => std::mem::take(&mut *notices),
            Err(_) => Vec::new(),
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn with_cache<T>(
        &self,
        change: impl FnOnce(&mut LocalCache) -> Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        let mut cache = self.cache.lock().map_err(|_| CacheError::Poisoned)?;
        change(&mut cache)
    }

    fn derived(&self, scope: Scope) -> Result<DerivedProgress, SyncError> {
        let today = self.clock.today();
        self.read(|cache| cache.derived_progress(scope.subject_id, scope.chapter_id, today))
    }

    fn create_failed(&self, error: crate::error::RemoteError) -> SyncError {
        tracing::warn!(%error, "create rejected; cache untouched");
        self.push_notice(Notice::error(error.to_string()));
        SyncError::Remote(error)
    }

    fn push_notice(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::testing::{FlakyRemote, seeded_remote};
    use crate::sync::NoticeLevel;
    use tracker_core::time::fixed_clock;

    async fn controller() -> (SyncController, Arc<FlakyRemote>) {
        let remote = Arc::new(seeded_remote().await);
        let controller = SyncController::new(remote.clone(), fixed_clock());
        assert_eq!(controller.load().await.unwrap(), LoadStatus::Loaded);
        (controller, remote)
    }

    fn first_ids(controller: &SyncController) -> (SubjectId, ChapterId) {
        controller
            .read(|cache| {
                let subject = &cache.subjects()[0];
                (subject.id(), subject.chapters()[0].id())
            })
            .unwrap()
    }

    #[tokio::test]
    async fn toggle_confirms_and_recomputes() {
        let (controller, _) = controller().await;
        let (s, c) = first_ids(&controller);

        let outcome = controller
            .toggle_criterion(s, c, Criterion::Concepts, true)
            .await
            .unwrap();

        let SyncOutcome::Confirmed(derived) = outcome else {
            panic!("expected a confirmed toggle");
        };
        assert_eq!(derived.chapter_percent, Some(14));
        assert_eq!(derived.subject_percent, Some(14));
        assert!(controller.take_notices().is_empty());
    }

    #[tokio::test]
    async fn failed_toggle_restores_cache_and_queues_notice() {
        let (controller, remote) = controller().await;
        let (s, c) = first_ids(&controller);
        let before = controller.snapshot().unwrap();

        remote.fail_requests(true);
        let err = controller
            .toggle_criterion(s, c, Criterion::Tyk, true)
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::RolledBack(_)));
        assert_eq!(controller.snapshot().unwrap(), before);
        let notices = controller.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert_eq!(notices[0].message, "Failed to save. Please retry.");
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_request() {
        let (controller, remote) = controller().await;
        let (s, _) = first_ids(&controller);
        let sent = remote.request_count();

        let err = controller.rename_subject(s, "   ").await.unwrap_err();

        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(remote.request_count(), sent);
    }

    #[tokio::test]
    async fn add_subject_selects_it() {
        let (controller, _) = controller().await;
        let subject = controller.add_subject("  Audit  ").await.unwrap();

        assert_eq!(subject.name().as_str(), "Audit");
        assert_eq!(
            controller.read(LocalCache::selection).unwrap(),
            Selection::Subject(subject.id())
        );
        assert_eq!(
            controller.take_notices(),
            vec![Notice::success("Subject \"Audit\" added.")]
        );
    }

    #[tokio::test]
    async fn failed_create_never_touches_cache() {
        let (controller, remote) = controller().await;
        let before = controller.snapshot().unwrap();

        remote.fail_requests(true);
        let err = controller.add_subject("Audit").await.unwrap_err();

        assert!(matches!(err, SyncError::Remote(_)));
        assert_eq!(controller.snapshot().unwrap(), before);
    }

    #[tokio::test]
    async fn offline_load_starts_empty() {
        let remote = Arc::new(seeded_remote().await);
        remote.fail_requests(true);
        let controller = SyncController::new(remote, fixed_clock());

        assert_eq!(controller.load().await.unwrap(), LoadStatus::Offline);
        assert!(controller.read(|c| c.subjects().is_empty()).unwrap());
        assert_eq!(
            controller.take_notices(),
            vec![Notice::error(CONNECT_FAILED)]
        );
    }

    #[tokio::test]
    async fn selecting_unknown_subject_fails() {
        let (controller, _) = controller().await;
        let err = controller
            .select(Selection::Subject(SubjectId::generate()))
            .unwrap_err();
        assert!(matches!(err, SyncError::Cache(CacheError::SubjectNotFound(_))));
    }
}
