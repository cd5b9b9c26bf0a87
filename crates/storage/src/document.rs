use serde::{Deserialize, Serialize};
use tracker_core::model::{Config, Subject};

use crate::repository::StorageError;

/// Persisted layout: one document holding the config and every subject, with
/// chapters embedded inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyDocument {
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Which on-disk layout a document was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Current,
    /// Bare array of subjects with no config wrapper.
    Legacy,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyLayout {
    Legacy(Vec<Subject>),
    Current(StudyDocument),
}

impl StudyDocument {
    /// Parse either layout. A legacy document comes back upgraded, with config
    /// fields defaulted to empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the text matches neither layout.
    pub fn from_json(raw: &str) -> Result<(Self, Layout), StorageError> {
        let parsed: AnyLayout =
            serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(match parsed {
            AnyLayout::Legacy(subjects) => (
                Self {
                    config: Config::default(),
                    subjects,
                },
                Layout::Legacy,
            ),
            AnyLayout::Current(doc) => (doc, Layout::Current),
        })
    }

    /// Pretty-printed JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"[
      {
        "id": "6f1c2a9e-3b4d-4e5f-8a7b-1c2d3e4f5a6b",
        "name": "Financial Reporting",
        "chapters": [
          {
            "id": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
            "name": "Ind AS 115",
            "concepts": true,
            "illustrations": false,
            "tyk": false,
            "rtp": false,
            "mtp": false,
            "pyq": false,
            "revisionCount": 2,
            "createdAt": "2024-01-02T03:04:05.000Z"
          }
        ],
        "createdAt": "2024-01-01T00:00:00.000Z"
      }
    ]"#;

    #[test]
    fn legacy_array_is_upgraded_with_empty_config() {
        let (doc, layout) = StudyDocument::from_json(LEGACY).unwrap();
        assert_eq!(layout, Layout::Legacy);
        assert_eq!(doc.subjects.len(), 1);
        assert_eq!(doc.subjects[0].chapters()[0].revision_count(), 2);
        assert_eq!(doc.config, Config::default());

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["config"]["startDate"], "");
        assert_eq!(value["config"]["targetDate"], "");
    }

    #[test]
    fn empty_legacy_array_parses() {
        let (doc, layout) = StudyDocument::from_json("[]").unwrap();
        assert_eq!(layout, Layout::Legacy);
        assert!(doc.subjects.is_empty());
    }

    #[test]
    fn current_layout_round_trips() {
        let raw = r#"{"config":{"startDate":"2026-01-01","targetDate":"2026-11-01","brandTitle":"CA Final","brandSubtitle":""},"subjects":[]}"#;
        let (doc, layout) = StudyDocument::from_json(raw).unwrap();
        assert_eq!(layout, Layout::Current);
        assert_eq!(doc.config.brand_title(), "CA Final");
        let (again, _) = StudyDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(again, doc);
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let err = StudyDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
