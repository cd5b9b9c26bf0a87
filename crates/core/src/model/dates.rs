//! Serde helpers for calendar dates persisted as `YYYY-MM-DD`, where the empty
//! string means "unset".

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer, de};

use crate::error::ModelError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a user- or wire-supplied date. Blank input is `None`.
///
/// # Errors
///
/// Returns `ModelError::InvalidDate` if the input is neither blank nor `YYYY-MM-DD`.
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, ModelError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ModelError::InvalidDate {
            raw: trimmed.to_string(),
        })
}

#[must_use]
pub fn format_optional_date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

pub mod blank_date {
    use super::*;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_optional_date(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw {
            Some(raw) => parse_optional_date(&raw).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Patch variant: outer `None` = field absent, `Some(None)` = clear the date.
pub mod blank_date_patch {
    use super::*;

    #[allow(clippy::ref_option, clippy::option_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Option<NaiveDate>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => blank_date::serialize(inner, s),
            None => s.serialize_none(),
        }
    }

    #[allow(clippy::option_option)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<NaiveDate>>, D::Error> {
        blank_date::deserialize(d).map(Some)
    }
}
