use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::ids::ChapterId;
use crate::model::name::Name;

//
// ─── CRITERIA ──────────────────────────────────────────────────────────────────
//

/// The six boolean completion criteria of a chapter, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    Concepts,
    Illustrations,
    Tyk,
    Rtp,
    Mtp,
    Pyq,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::Concepts,
        Criterion::Illustrations,
        Criterion::Tyk,
        Criterion::Rtp,
        Criterion::Mtp,
        Criterion::Pyq,
    ];

    /// Field name used on the wire and in the persisted document.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Criterion::Concepts => "concepts",
            Criterion::Illustrations => "illustrations",
            Criterion::Tyk => "tyk",
            Criterion::Rtp => "rtp",
            Criterion::Mtp => "mtp",
            Criterion::Pyq => "pyq",
        }
    }

    #[must_use]
    pub fn from_field_name(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.field_name().eq_ignore_ascii_case(raw.trim()))
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

//
// ─── CHAPTER ───────────────────────────────────────────────────────────────────
//

/// Smallest tracked unit of study: six boolean criteria plus a revision counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Chapter {
    id: ChapterId,
    name: Name,
    #[serde(default)]
    concepts: bool,
    #[serde(default)]
    illustrations: bool,
    #[serde(default)]
    tyk: bool,
    #[serde(default)]
    rtp: bool,
    #[serde(default)]
    mtp: bool,
    #[serde(default)]
    pyq: bool,
    #[serde(default)]
    revision_count: u32,
    created_at: DateTime<Utc>,
}

impl Chapter {
    /// A fresh chapter with every criterion unset and no revisions.
    #[must_use]
    pub fn new(id: ChapterId, name: Name, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            concepts: false,
            illustrations: false,
            tyk: false,
            rtp: false,
            mtp: false,
            pyq: false,
            revision_count: 0,
            created_at,
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ChapterId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[must_use]
    pub fn revision_count(&self) -> u32 {
        self.revision_count
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn criterion(&self, criterion: Criterion) -> bool {
        match criterion {
            Criterion::Concepts => self.concepts,
            Criterion::Illustrations => self.illustrations,
            Criterion::Tyk => self.tyk,
            Criterion::Rtp => self.rtp,
            Criterion::Mtp => self.mtp,
            Criterion::Pyq => self.pyq,
        }
    }

    /// Number of boolean criteria currently satisfied.
    #[must_use]
    pub fn criteria_done(&self) -> usize {
        Criterion::ALL
            .into_iter()
            .filter(|c| self.criterion(*c))
            .count()
    }

    // Mutators return the value they replaced.

    pub fn set_criterion(&mut self, criterion: Criterion, value: bool) -> bool {
        let slot = match criterion {
            Criterion::Concepts => &mut self.concepts,
            Criterion::Illustrations => &mut self.illustrations,
            Criterion::Tyk => &mut self.tyk,
            Criterion::Rtp => &mut self.rtp,
            Criterion::Mtp => &mut self.mtp,
            Criterion::Pyq => &mut self.pyq,
        };
        std::mem::replace(slot, value)
    }

    pub fn set_revision_count(&mut self, count: u32) -> u32 {
        std::mem::replace(&mut self.revision_count, count)
    }

    pub fn rename(&mut self, name: Name) -> Name {
        std::mem::replace(&mut self.name, name)
    }

    /// Apply every field present in `patch`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptyName` if the patch carries a blank name; the
    /// chapter is left untouched in that case.
    pub fn apply_patch(&mut self, patch: &ChapterPatch) -> Result<(), ModelError> {
        let name = patch.name.as_deref().map(Name::new).transpose()?;
        if let Some(name) = name {
            self.name = name;
        }
        for criterion in Criterion::ALL {
            if let Some(value) = patch.criterion(criterion) {
                self.set_criterion(criterion, value);
            }
        }
        if let Some(count) = patch.revision_count {
            self.revision_count = count;
        }
        Ok(())
    }
}

//
// ─── PATCH ─────────────────────────────────────────────────────────────────────
//

/// Partial field set for "update chapter". Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concepts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustrations: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tyk: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pyq: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_count: Option<u32>,
}

impl ChapterPatch {
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn toggle(criterion: Criterion, value: bool) -> Self {
        let mut patch = Self::default();
        *patch.criterion_slot(criterion) = Some(value);
        patch
    }

    #[must_use]
    pub fn revisions(count: u32) -> Self {
        Self {
            revision_count: Some(count),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn criterion(&self, criterion: Criterion) -> Option<bool> {
        match criterion {
            Criterion::Concepts => self.concepts,
            Criterion::Illustrations => self.illustrations,
            Criterion::Tyk => self.tyk,
            Criterion::Rtp => self.rtp,
            Criterion::Mtp => self.mtp,
            Criterion::Pyq => self.pyq,
        }
    }

    fn criterion_slot(&mut self, criterion: Criterion) -> &mut Option<bool> {
        match criterion {
            Criterion::Concepts => &mut self.concepts,
            Criterion::Illustrations => &mut self.illustrations,
            Criterion::Tyk => &mut self.tyk,
            Criterion::Rtp => &mut self.rtp,
            Criterion::Mtp => &mut self.mtp,
            Criterion::Pyq => &mut self.pyq,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn chapter() -> Chapter {
        Chapter::new(ChapterId::generate(), Name::new("Leases").unwrap(), fixed_now())
    }

    #[test]
    fn new_chapter_starts_blank() {
        let ch = chapter();
        assert_eq!(ch.criteria_done(), 0);
        assert_eq!(ch.revision_count(), 0);
    }

    #[test]
    fn set_criterion_returns_prior_value() {
        let mut ch = chapter();
        assert!(!ch.set_criterion(Criterion::Rtp, true));
        assert!(ch.set_criterion(Criterion::Rtp, false));
        assert!(!ch.criterion(Criterion::Rtp));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let json = serde_json::to_string(&ChapterPatch::toggle(Criterion::Tyk, true)).unwrap();
        assert_eq!(json, r#"{"tyk":true}"#);
        let json = serde_json::to_string(&ChapterPatch::revisions(2)).unwrap();
        assert_eq!(json, r#"{"revisionCount":2}"#);
    }

    #[test]
    fn blank_patch_name_leaves_chapter_untouched() {
        let mut ch = chapter();
        let before = ch.clone();
        let mut patch = ChapterPatch::rename("  ");
        patch.pyq = Some(true);
        assert_eq!(ch.apply_patch(&patch).unwrap_err(), ModelError::EmptyName);
        assert_eq!(ch, before);
    }

    #[test]
    fn deserializes_persisted_shape_with_defaults() {
        let json = r#"{
            "id": "6f1c2a9e-3b4d-4e5f-8a7b-1c2d3e4f5a6b",
            "name": "Ind AS 116",
            "concepts": true,
            "createdAt": "2024-01-02T03:04:05.000Z"
        }"#;
        let ch: Chapter = serde_json::from_str(json).unwrap();
        assert!(ch.criterion(Criterion::Concepts));
        assert!(!ch.criterion(Criterion::Pyq));
        assert_eq!(ch.revision_count(), 0);
    }

    #[test]
    fn criterion_parses_field_names() {
        assert_eq!(Criterion::from_field_name("TYK"), Some(Criterion::Tyk));
        assert_eq!(Criterion::from_field_name("revision"), None);
    }
}
