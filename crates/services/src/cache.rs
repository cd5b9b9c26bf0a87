use chrono::NaiveDate;
use tracker_core::dashboard::DashboardSnapshot;
use tracker_core::model::{Chapter, ChapterId, Config, Criterion, Name, Subject, SubjectId};
use tracker_core::progress::{
    Pace, chapter_completion_percent, overall_completion_percent, overall_pace,
    subject_completion_percent,
};

use crate::error::CacheError;

/// What the Presentation Layer is focused on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Dashboard,
    Subject(SubjectId),
}

/// Derived values recomputed after a confirmed mutation, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedProgress {
    pub chapter_percent: Option<u8>,
    pub subject_percent: Option<u8>,
    pub overall_percent: u8,
    /// Only present when a study window is configured.
    pub pace: Option<Pace>,
}

/// In-memory mirror of the authoritative store.
///
/// Every mutator is synchronous and returns what it overwrote so callers can
/// roll back exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCache {
    subjects: Vec<Subject>,
    config: Config,
    selection: Selection,
}

impl LocalCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    #[must_use]
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id() == id)
    }

    #[must_use]
    pub fn chapter(&self, subject_id: SubjectId, chapter_id: ChapterId) -> Option<&Chapter> {
        self.subject(subject_id)?.chapter(chapter_id)
    }

    /// The selected subject, if the selection points at one that still exists.
    #[must_use]
    pub fn selected_subject(&self) -> Option<&Subject> {
        match self.selection {
            Selection::Subject(id) => self.subject(id),
            Selection::Dashboard => None,
        }
    }

    #[must_use]
    pub fn dashboard(&self, today: NaiveDate) -> DashboardSnapshot {
        DashboardSnapshot::build(&self.subjects, &self.config, today)
    }

    /// Chapter percent, then its subject, then overall, then pace.
    #[must_use]
    pub fn derived_progress(
        &self,
        subject_id: Option<SubjectId>,
        chapter_id: Option<ChapterId>,
        today: NaiveDate,
    ) -> DerivedProgress {
        let chapter_percent = subject_id
            .zip(chapter_id)
            .and_then(|(s, c)| self.chapter(s, c))
            .map(chapter_completion_percent);
        let subject_percent = subject_id
            .and_then(|s| self.subject(s))
            .map(subject_completion_percent);
        DerivedProgress {
            chapter_percent,
            subject_percent,
            overall_percent: overall_completion_percent(&self.subjects),
            pace: overall_pace(&self.subjects, &self.config, today),
        }
    }

    //
    // ─── MUTATIONS ─────────────────────────────────────────────────────────────
    //

    /// Replace the whole tree. A selection pointing at a subject that no longer
    /// exists falls back to the dashboard.
    pub fn replace_all(&mut self, subjects: Vec<Subject>, config: Config) -> (Vec<Subject>, Config) {
        let prior = (
            std::mem::replace(&mut self.subjects, subjects),
            std::mem::replace(&mut self.config, config),
        );
        if self.selected_subject().is_none() {
            self.selection = Selection::Dashboard;
        }
        prior
    }

    pub fn select(&mut self, selection: Selection) -> Selection {
        std::mem::replace(&mut self.selection, selection)
    }

    pub fn set_config(&mut self, config: Config) -> Config {
        std::mem::replace(&mut self.config, config)
    }

    /// Replace the subject with the same id in place, or append it.
    pub fn upsert_subject(&mut self, subject: Subject) -> Option<Subject> {
        match self.subjects.iter_mut().find(|s| s.id() == subject.id()) {
            Some(slot) => Some(std::mem::replace(slot, subject)),
            None => {
                self.subjects.push(subject);
                None
            }
        }
    }

    /// Insert at `index`, clamped to the end of the sequence.
    pub fn insert_subject(&mut self, index: usize, subject: Subject) {
        let index = index.min(self.subjects.len());
        self.subjects.insert(index, subject);
    }

    /// Remove a subject and, with it, every chapter it owns.
    pub fn remove_subject(&mut self, id: SubjectId) -> Option<(usize, Subject)> {
        let index = self.subjects.iter().position(|s| s.id() == id)?;
        Some((index, self.subjects.remove(index)))
    }

    /// # Errors
    ///
    /// Returns `CacheError::SubjectNotFound` for an unknown id.
    pub fn rename_subject(&mut self, id: SubjectId, name: Name) -> Result<Name, CacheError> {
        Ok(self.subject_mut(id)?.rename(name))
    }

    /// # Errors
    ///
    /// Returns `CacheError::SubjectNotFound` for an unknown subject.
    pub fn upsert_chapter(
        &mut self,
        subject_id: SubjectId,
        chapter: Chapter,
    ) -> Result<Option<Chapter>, CacheError> {
        let subject = self.subject_mut(subject_id)?;
        if subject.chapter(chapter.id()).is_some() {
            return Ok(subject.replace_chapter(chapter));
        }
        subject.push_chapter(chapter);
        Ok(None)
    }

    /// Overwrite an existing chapter in place; never inserts.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the subject or chapter is unknown.
    pub fn replace_chapter(
        &mut self,
        subject_id: SubjectId,
        chapter: Chapter,
    ) -> Result<Chapter, CacheError> {
        let chapter_id = chapter.id();
        self.subject_mut(subject_id)?
            .replace_chapter(chapter)
            .ok_or(CacheError::ChapterNotFound {
                subject_id,
                chapter_id,
            })
    }

    /// # Errors
    ///
    /// Returns `CacheError::SubjectNotFound` for an unknown subject.
    pub fn insert_chapter(
        &mut self,
        subject_id: SubjectId,
        index: usize,
        chapter: Chapter,
    ) -> Result<(), CacheError> {
        self.subject_mut(subject_id)?.insert_chapter(index, chapter);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CacheError` if the subject or chapter is unknown.
    pub fn remove_chapter(
        &mut self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<(usize, Chapter), CacheError> {
        self.subject_mut(subject_id)?
            .remove_chapter(chapter_id)
            .ok_or(CacheError::ChapterNotFound {
                subject_id,
                chapter_id,
            })
    }

    /// # Errors
    ///
    /// Returns `CacheError` if the subject or chapter is unknown.
    pub fn patch_chapter_field(
        &mut self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        criterion: Criterion,
        value: bool,
    ) -> Result<bool, CacheError> {
        Ok(self
            .chapter_mut(subject_id, chapter_id)?
            .set_criterion(criterion, value))
    }

    /// # Errors
    ///
    /// Returns `CacheError` if the subject or chapter is unknown.
    pub fn patch_chapter_revision(
        &mut self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        new_count: u32,
    ) -> Result<u32, CacheError> {
        Ok(self
            .chapter_mut(subject_id, chapter_id)?
            .set_revision_count(new_count))
    }

    /// # Errors
    ///
    /// Returns `CacheError` if the subject or chapter is unknown.
    pub fn rename_chapter(
        &mut self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
        name: Name,
    ) -> Result<Name, CacheError> {
        Ok(self.chapter_mut(subject_id, chapter_id)?.rename(name))
    }

    fn subject_mut(&mut self, id: SubjectId) -> Result<&mut Subject, CacheError> {
        self.subjects
            .iter_mut()
            .find(|s| s.id() == id)
            .ok_or(CacheError::SubjectNotFound(id))
    }

    fn chapter_mut(
        &mut self,
        subject_id: SubjectId,
        chapter_id: ChapterId,
    ) -> Result<&mut Chapter, CacheError> {
        self.subject_mut(subject_id)?
            .chapter_mut(chapter_id)
            .ok_or(CacheError::ChapterNotFound {
                subject_id,
                chapter_id,
            })
    }
}
