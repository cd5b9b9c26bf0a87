use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::chapter::Chapter;
use crate::model::ids::{ChapterId, SubjectId};
use crate::model::name::Name;

/// Named container of chapters. Chapter order is display order only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    id: SubjectId,
    name: Name,
    #[serde(default)]
    chapters: Vec<Chapter>,
    created_at: DateTime<Utc>,
}

impl Subject {
    #[must_use]
    pub fn new(id: SubjectId, name: Name, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            chapters: Vec::new(),
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn chapter(&self, id: ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id() == id)
    }

    pub fn chapter_mut(&mut self, id: ChapterId) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.id() == id)
    }

    #[must_use]
    pub fn chapter_position(&self, id: ChapterId) -> Option<usize> {
        self.chapters.iter().position(|c| c.id() == id)
    }

    pub fn rename(&mut self, name: Name) -> Name {
        std::mem::replace(&mut self.name, name)
    }

    pub fn push_chapter(&mut self, chapter: Chapter) {
        self.chapters.push(chapter);
    }

    /// Insert at `index`, clamped to the end of the sequence.
    pub fn insert_chapter(&mut self, index: usize, chapter: Chapter) {
        let index = index.min(self.chapters.len());
        self.chapters.insert(index, chapter);
    }

    /// Replace the chapter with the same id in place, returning the old one.
    pub fn replace_chapter(&mut self, chapter: Chapter) -> Option<Chapter> {
        let slot = self.chapter_mut(chapter.id())?;
        Some(std::mem::replace(slot, chapter))
    }

    /// Remove a chapter, returning its former position and value.
    pub fn remove_chapter(&mut self, id: ChapterId) -> Option<(usize, Chapter)> {
        let index = self.chapter_position(id)?;
        Some((index, self.chapters.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn named(name: &str) -> Name {
        Name::new(name).unwrap()
    }

    #[test]
    fn remove_then_insert_restores_order() {
        let mut subject = Subject::new(SubjectId::generate(), named("FR"), fixed_now());
        for name in ["a", "b", "c"] {
            subject.push_chapter(Chapter::new(ChapterId::generate(), named(name), fixed_now()));
        }
        let before = subject.clone();
        let middle = subject.chapters()[1].id();

        let (index, removed) = subject.remove_chapter(middle).unwrap();
        assert_eq!(index, 1);
        assert_eq!(subject.chapters().len(), 2);

        subject.insert_chapter(index, removed);
        assert_eq!(subject, before);
    }

    #[test]
    fn missing_chapters_field_defaults_to_empty() {
        let json = r#"{
            "id": "6f1c2a9e-3b4d-4e5f-8a7b-1c2d3e4f5a6b",
            "name": "Audit",
            "createdAt": "2024-01-02T03:04:05Z"
        }"#;
        let subject: Subject = serde_json::from_str(json).unwrap();
        assert!(subject.chapters().is_empty());
    }
}
