use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::dates::{blank_date, blank_date_patch};

pub const DEFAULT_BRAND_TITLE: &str = "Study Tracker";
pub const DEFAULT_BRAND_SUBTITLE: &str = "Exam preparation progress";

/// Process-wide settings persisted alongside the subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, with = "blank_date")]
    start_date: Option<NaiveDate>,
    #[serde(default, with = "blank_date")]
    target_date: Option<NaiveDate>,
    #[serde(default)]
    brand_title: String,
    #[serde(default)]
    brand_subtitle: String,
}

impl Config {
    #[must_use]
    pub fn new(start_date: Option<NaiveDate>, target_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            target_date,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    #[must_use]
    pub fn target_date(&self) -> Option<NaiveDate> {
        self.target_date
    }

    /// Brand title, falling back to the default when unset or blank.
    #[must_use]
    pub fn brand_title(&self) -> &str {
        non_blank_or(&self.brand_title, DEFAULT_BRAND_TITLE)
    }

    #[must_use]
    pub fn brand_subtitle(&self) -> &str {
        non_blank_or(&self.brand_subtitle, DEFAULT_BRAND_SUBTITLE)
    }

    /// Apply every field present in `patch`. Brand strings are trimmed.
    pub fn apply_patch(&mut self, patch: &ConfigPatch) {
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(target) = patch.target_date {
            self.target_date = target;
        }
        if let Some(title) = &patch.brand_title {
            self.brand_title = title.trim().to_string();
        }
        if let Some(subtitle) = &patch.brand_subtitle {
            self.brand_subtitle = subtitle.trim().to_string();
        }
    }
}

fn non_blank_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Partial field set for "update config". A date may be set or cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::option_option)]
pub struct ConfigPatch {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "blank_date_patch"
    )]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "blank_date_patch"
    )]
    pub target_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_subtitle: Option<String>,
}

impl ConfigPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn brand_falls_back_when_blank() {
        let mut config = Config::default();
        assert_eq!(config.brand_title(), DEFAULT_BRAND_TITLE);
        config.apply_patch(&ConfigPatch {
            brand_title: Some("  CA Final  ".into()),
            brand_subtitle: Some("   ".into()),
            ..ConfigPatch::default()
        });
        assert_eq!(config.brand_title(), "CA Final");
        assert_eq!(config.brand_subtitle(), DEFAULT_BRAND_SUBTITLE);
    }

    #[test]
    fn unset_dates_persist_as_empty_strings() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["startDate"], "");
        assert_eq!(json["targetDate"], "");
    }

    #[test]
    fn patch_distinguishes_absent_from_cleared() {
        let patch: ConfigPatch = serde_json::from_str(r#"{"targetDate": ""}"#).unwrap();
        assert_eq!(patch.start_date, None);
        assert_eq!(patch.target_date, Some(None));

        let mut config = Config::new(Some(date(2026, 1, 1)), Some(date(2026, 11, 1)));
        config.apply_patch(&patch);
        assert_eq!(config.start_date(), Some(date(2026, 1, 1)));
        assert_eq!(config.target_date(), None);
    }

    #[test]
    fn patch_round_trips_set_dates() {
        let patch = ConfigPatch {
            start_date: Some(Some(date(2026, 2, 3))),
            ..ConfigPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"startDate":"2026-02-03"}"#);
    }
}
