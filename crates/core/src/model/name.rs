use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Validated display name for subjects and chapters (trimmed, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Create a validated name.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Name {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Name> for String {
    fn from(value: Name) -> Self {
        value.0
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let name = Name::new("  Audit  ").unwrap();
        assert_eq!(name.as_str(), "Audit");
    }

    #[test]
    fn rejects_whitespace_only() {
        assert_eq!(Name::new(" \t ").unwrap_err(), ModelError::EmptyName);
    }

    #[test]
    fn deserialization_validates() {
        let err = serde_json::from_str::<Name>("\"   \"").unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }
}
