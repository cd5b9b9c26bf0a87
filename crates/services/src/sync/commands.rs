use async_trait::async_trait;
use tracker_core::model::{
    Chapter, ChapterId, ChapterPatch, Config, ConfigPatch, Criterion, Name, Subject, SubjectId,
};

use super::mutation::{OptimisticCommand, Scope};
use crate::cache::{LocalCache, Selection};
use crate::error::{CacheError, RemoteError, SyncError};
use crate::remote::RemoteStore;

pub const SAVE_FAILED: &str = "Failed to save. Please retry.";
pub const REVISION_SAVE_FAILED: &str = "Failed to save revision. Please retry.";
pub const SETTINGS_SAVE_FAILED: &str = "Failed to save settings. Please retry.";

/// A target that left the cache while its request was in flight (a delete
/// confirmed first) has nothing left to update or restore. Responses for it
/// are dropped rather than re-inserted.
fn unless_gone<T>(result: Result<T, CacheError>) -> Result<(), CacheError> {
    match result {
        Ok(_) => Ok(()),
        Err(CacheError::SubjectNotFound(_) | CacheError::ChapterNotFound { .. }) => {
            tracing::debug!("target left the cache; nothing to update");
            Ok(())
        }
        Err(other) => Err(other),
    }
}

fn missing_chapter(subject_id: SubjectId, chapter_id: ChapterId) -> CacheError {
    CacheError::ChapterNotFound {
        subject_id,
        chapter_id,
    }
}

//
// ─── TOGGLE CRITERION ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCriterion {
    pub subject_id: SubjectId,
    pub chapter_id: ChapterId,
    pub criterion: Criterion,
    pub value: bool,
}

#[async_trait]
impl OptimisticCommand for ToggleCriterion {
    type Prior = bool;
    type Response = Chapter;

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<bool>, SyncError> {
        let prior =
            cache.patch_chapter_field(self.subject_id, self.chapter_id, self.criterion, self.value)?;
        Ok((prior != self.value).then_some(prior))
    }

    async fn send(&self, remote: &dyn RemoteStore, _prior: &bool) -> Result<Chapter, RemoteError> {
        let patch = ChapterPatch::toggle(self.criterion, self.value);
        remote
            .update_chapter(self.subject_id, self.chapter_id, &patch)
            .await
    }

    fn commit(&self, cache: &mut LocalCache, response: Chapter) -> Result<(), CacheError> {
        unless_gone(cache.replace_chapter(self.subject_id, response))
    }

    fn rollback(&self, cache: &mut LocalCache, prior: bool) -> Result<(), CacheError> {
        unless_gone(cache.patch_chapter_field(
            self.subject_id,
            self.chapter_id,
            self.criterion,
            prior,
        ))
    }

    fn scope(&self) -> Scope {
        Scope::chapter(self.subject_id, self.chapter_id)
    }

    fn failure_notice(&self, _error: &RemoteError) -> String {
        SAVE_FAILED.to_string()
    }
}

//
// ─── ADJUST REVISION ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionStep {
    Up,
    Down,
}

impl RevisionStep {
    /// Next count, floored at zero.
    #[must_use]
    pub fn step(self, count: u32) -> u32 {
        match self {
            RevisionStep::Up => count.saturating_add(1),
            RevisionStep::Down => count.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionChange {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustRevision {
    pub subject_id: SubjectId,
    pub chapter_id: ChapterId,
    pub step: RevisionStep,
}

#[async_trait]
impl OptimisticCommand for AdjustRevision {
    type Prior = RevisionChange;
    type Response = Chapter;

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<RevisionChange>, SyncError> {
        let current = cache
            .chapter(self.subject_id, self.chapter_id)
            .ok_or_else(|| missing_chapter(self.subject_id, self.chapter_id))?
            .revision_count();
        let next = self.step.step(current);
        if next == current {
            return Ok(None);
        }
        cache.patch_chapter_revision(self.subject_id, self.chapter_id, next)?;
        Ok(Some(RevisionChange {
            from: current,
            to: next,
        }))
    }

    async fn send(
        &self,
        remote: &dyn RemoteStore,
        prior: &RevisionChange,
    ) -> Result<Chapter, RemoteError> {
        let patch = ChapterPatch::revisions(prior.to);
        remote
            .update_chapter(self.subject_id, self.chapter_id, &patch)
            .await
    }

    fn commit(&self, cache: &mut LocalCache, response: Chapter) -> Result<(), CacheError> {
        unless_gone(cache.replace_chapter(self.subject_id, response))
    }

    fn rollback(&self, cache: &mut LocalCache, prior: RevisionChange) -> Result<(), CacheError> {
        unless_gone(cache.patch_chapter_revision(
            self.subject_id,
            self.chapter_id,
            prior.from,
        ))
    }

    fn scope(&self) -> Scope {
        Scope::chapter(self.subject_id, self.chapter_id)
    }

    fn failure_notice(&self, _error: &RemoteError) -> String {
        REVISION_SAVE_FAILED.to_string()
    }
}

//
// ─── RENAME ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSubject {
    pub subject_id: SubjectId,
    pub name: Name,
}

#[async_trait]
impl OptimisticCommand for RenameSubject {
    type Prior = Name;
    type Response = Subject;

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<Name>, SyncError> {
        let current = cache
            .subject(self.subject_id)
            .ok_or(CacheError::SubjectNotFound(self.subject_id))?;
        if current.name() == &self.name {
            return Ok(None);
        }
        Ok(Some(cache.rename_subject(self.subject_id, self.name.clone())?))
    }

    async fn send(&self, remote: &dyn RemoteStore, _prior: &Name) -> Result<Subject, RemoteError> {
        remote
            .rename_subject(self.subject_id, self.name.as_str())
            .await
    }

    // Only the name was applied optimistically; the chapters may carry other
    // in-flight changes, so they are left alone.
    fn commit(&self, cache: &mut LocalCache, response: Subject) -> Result<(), CacheError> {
        unless_gone(cache.rename_subject(self.subject_id, response.name().clone()))
    }

    fn rollback(&self, cache: &mut LocalCache, prior: Name) -> Result<(), CacheError> {
        unless_gone(cache.rename_subject(self.subject_id, prior))
    }

    fn scope(&self) -> Scope {
        Scope::subject(self.subject_id)
    }

    fn success_notice(&self) -> Option<String> {
        Some("Subject name updated.".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameChapter {
    pub subject_id: SubjectId,
    pub chapter_id: ChapterId,
    pub name: Name,
}

#[async_trait]
impl OptimisticCommand for RenameChapter {
    type Prior = Name;
    type Response = Chapter;

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<Name>, SyncError> {
        let current = cache
            .chapter(self.subject_id, self.chapter_id)
            .ok_or_else(|| missing_chapter(self.subject_id, self.chapter_id))?;
        if current.name() == &self.name {
            return Ok(None);
        }
        Ok(Some(cache.rename_chapter(
            self.subject_id,
            self.chapter_id,
            self.name.clone(),
        )?))
    }

    async fn send(&self, remote: &dyn RemoteStore, _prior: &Name) -> Result<Chapter, RemoteError> {
        let patch = ChapterPatch::rename(self.name.as_str());
        remote
            .update_chapter(self.subject_id, self.chapter_id, &patch)
            .await
    }

    fn commit(&self, cache: &mut LocalCache, response: Chapter) -> Result<(), CacheError> {
        unless_gone(cache.replace_chapter(self.subject_id, response))
    }

    fn rollback(&self, cache: &mut LocalCache, prior: Name) -> Result<(), CacheError> {
        unless_gone(cache.rename_chapter(self.subject_id, self.chapter_id, prior))
    }

    fn scope(&self) -> Scope {
        Scope::chapter(self.subject_id, self.chapter_id)
    }

    fn success_notice(&self) -> Option<String> {
        Some("Chapter updated.".to_string())
    }
}

//
// ─── DELETE ────────────────────────────────────────────────────────────────────
//

/// A subject held off-cache until its delete is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedSubject {
    pub index: usize,
    pub subject: Subject,
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSubject {
    pub subject_id: SubjectId,
}

#[async_trait]
impl OptimisticCommand for DeleteSubject {
    type Prior = DeletedSubject;
    type Response = ();

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<DeletedSubject>, SyncError> {
        let (index, subject) = cache
            .remove_subject(self.subject_id)
            .ok_or(CacheError::SubjectNotFound(self.subject_id))?;
        let selection = cache.selection();
        if selection == Selection::Subject(self.subject_id) {
            cache.select(Selection::Dashboard);
        }
        Ok(Some(DeletedSubject {
            index,
            subject,
            selection,
        }))
    }

    async fn send(
        &self,
        remote: &dyn RemoteStore,
        _prior: &DeletedSubject,
    ) -> Result<(), RemoteError> {
        remote.delete_subject(self.subject_id).await
    }

    fn commit(&self, _cache: &mut LocalCache, _response: ()) -> Result<(), CacheError> {
        Ok(())
    }

    fn rollback(&self, cache: &mut LocalCache, prior: DeletedSubject) -> Result<(), CacheError> {
        cache.insert_subject(prior.index, prior.subject);
        cache.select(prior.selection);
        Ok(())
    }

    fn scope(&self) -> Scope {
        Scope::overall()
    }

    fn success_notice(&self) -> Option<String> {
        Some("Subject deleted.".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteChapter {
    pub subject_id: SubjectId,
    pub chapter_id: ChapterId,
}

#[async_trait]
impl OptimisticCommand for DeleteChapter {
    type Prior = (usize, Chapter);
    type Response = ();

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<(usize, Chapter)>, SyncError> {
        Ok(Some(cache.remove_chapter(self.subject_id, self.chapter_id)?))
    }

    async fn send(
        &self,
        remote: &dyn RemoteStore,
        _prior: &(usize, Chapter),
    ) -> Result<(), RemoteError> {
        remote
            .delete_chapter(self.subject_id, self.chapter_id)
            .await
    }

    fn commit(&self, _cache: &mut LocalCache, _response: ()) -> Result<(), CacheError> {
        Ok(())
    }

    fn rollback(&self, cache: &mut LocalCache, prior: (usize, Chapter)) -> Result<(), CacheError> {
        let (index, chapter) = prior;
        unless_gone(cache.insert_chapter(self.subject_id, index, chapter))
    }

    fn scope(&self) -> Scope {
        Scope::subject(self.subject_id)
    }

    fn success_notice(&self) -> Option<String> {
        Some("Chapter deleted.".to_string())
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    pub patch: ConfigPatch,
}

#[async_trait]
impl OptimisticCommand for UpdateConfig {
    type Prior = Config;
    type Response = Config;

    fn apply(&self, cache: &mut LocalCache) -> Result<Option<Config>, SyncError> {
        let mut next = cache.config().clone();
        next.apply_patch(&self.patch);
        if &next == cache.config() {
            return Ok(None);
        }
        Ok(Some(cache.set_config(next)))
    }

    async fn send(&self, remote: &dyn RemoteStore, _prior: &Config) -> Result<Config, RemoteError> {
        remote.update_config(&self.patch).await
    }

    fn commit(&self, cache: &mut LocalCache, response: Config) -> Result<(), CacheError> {
        cache.set_config(response);
        Ok(())
    }

    fn rollback(&self, cache: &mut LocalCache, prior: Config) -> Result<(), CacheError> {
        cache.set_config(prior);
        Ok(())
    }

    fn scope(&self) -> Scope {
        Scope::overall()
    }

    fn success_notice(&self) -> Option<String> {
        Some("Settings saved.".to_string())
    }

    fn failure_notice(&self, _error: &RemoteError) -> String {
        SETTINGS_SAVE_FAILED.to_string()
    }
}
