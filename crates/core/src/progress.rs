//! Aggregation engine: pure functions deriving completion percentages and pace
//! from the chapter/subject tree. Nothing here is ever persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Chapter, Config, Criterion, Subject};

/// Six boolean criteria plus the revision criterion.
pub const CRITERIA_PER_CHAPTER: u32 = 7;

/// Half-width of the dead band around the expected percentage.
pub const PACE_BAND: i32 = 3;

/// Round `numerator / denominator * 100` half away from zero.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_percent(numerator: u64, denominator: u64) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let pct = (numerator as f64 / denominator as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_mean(values: impl Iterator<Item = u8>) -> u8 {
    let (sum, count) = values.fold((0u64, 0u64), |(sum, count), v| (sum + u64::from(v), count + 1));
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u8
}

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

#[must_use]
pub fn chapter_completion_percent(chapter: &Chapter) -> u8 {
    let revision_credit = u64::from(chapter.revision_count() >= 1);
    let done = chapter.criteria_done() as u64 + revision_credit;
    rounded_percent(done, u64::from(CRITERIA_PER_CHAPTER))
}

/// Exact conjunction of all seven criteria. Kept separate from the rounded
/// percentage on purpose.
#[must_use]
pub fn is_chapter_complete(chapter: &Chapter) -> bool {
    Criterion::ALL.into_iter().all(|c| chapter.criterion(c)) && chapter.revision_count() >= 1
}

/// Mean of the chapter percentages; `0` for a subject without chapters.
#[must_use]
pub fn subject_completion_percent(subject: &Subject) -> u8 {
    rounded_mean(subject.chapters().iter().map(chapter_completion_percent))
}

/// Mean of subject percentages (mean of means); `0` when there are no subjects.
#[must_use]
pub fn overall_completion_percent(subjects: &[Subject]) -> u8 {
    rounded_mean(subjects.iter().map(subject_completion_percent))
}

//
// ─── DATES & PACE ──────────────────────────────────────────────────────────────
//

/// Share of the study window elapsed by `today`, clamped to `0..=100`.
///
/// `None` if either date is unset or the window is empty or inverted.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn expected_progress_percent(
    start_date: Option<NaiveDate>,
    target_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<u8> {
    let (start, target) = (start_date?, target_date?);
    if target <= start {
        return None;
    }
    let total = (target - start).num_days() as f64;
    let elapsed = (today - start).num_days() as f64;
    Some((elapsed / total * 100.0).round().clamp(0.0, 100.0) as u8)
}

/// Whole days until the target: positive in the future, `0` on the day,
/// negative once overdue.
#[must_use]
pub fn days_remaining(target_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    target_date.map(|target| (target - today).num_days())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pace {
    Ahead,
    OnTrack,
    Behind,
}

impl Pace {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Pace::Ahead => "Ahead of schedule",
            Pace::OnTrack => "On track",
            Pace::Behind => "Behind schedule",
        }
    }
}

#[must_use]
pub fn pace_classification(actual_percent: u8, expected_percent: Option<u8>) -> Option<Pace> {
    let diff = i32::from(actual_percent) - i32::from(expected_percent?);
    Some(if diff >= PACE_BAND {
        Pace::Ahead
    } else if diff <= -PACE_BAND {
        Pace::Behind
    } else {
        Pace::OnTrack
    })
}

/// Pace of the whole tree against the configured study window.
#[must_use]
pub fn overall_pace(subjects: &[Subject], config: &Config, today: NaiveDate) -> Option<Pace> {
    let expected = expected_progress_percent(config.start_date(), config.target_date(), today);
    pace_classification(overall_completion_percent(subjects), expected)
}

//
// ─── TRIAGE ────────────────────────────────────────────────────────────────────
//

/// Every chapter at 0%, in subject-then-chapter order. Unbounded.
#[must_use]
pub fn unstarted_chapters(subjects: &[Subject]) -> Vec<(&Subject, &Chapter)> {
    subjects
        .iter()
        .flat_map(|s| s.chapters().iter().map(move |c| (s, c)))
        .filter(|(_, c)| chapter_completion_percent(c) == 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChapterId, Name, SubjectId};
    use crate::time::fixed_now;

    fn chapter(done: usize, revisions: u32) -> Chapter {
        let mut ch = Chapter::new(ChapterId::generate(), Name::new("ch").unwrap(), fixed_now());
        for c in Criterion::ALL.into_iter().take(done) {
            ch.set_criterion(c, true);
        }
        ch.set_revision_count(revisions);
        ch
    }

    fn subject(chapters: Vec<Chapter>) -> Subject {
        let mut s = Subject::new(SubjectId::generate(), Name::new("s").unwrap(), fixed_now());
        for ch in chapters {
            s.push_chapter(ch);
        }
        s
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn chapter_percent_follows_seven_criteria() {
        assert_eq!(chapter_completion_percent(&chapter(0, 0)), 0);
        assert_eq!(chapter_completion_percent(&chapter(1, 0)), 14);
        assert_eq!(chapter_completion_percent(&chapter(0, 3)), 14);
        assert_eq!(chapter_completion_percent(&chapter(3, 0)), 43);
        assert_eq!(chapter_completion_percent(&chapter(6, 0)), 86);
        assert_eq!(chapter_completion_percent(&chapter(6, 1)), 100);
    }

    #[test]
    fn every_combination_agrees_with_completeness() {
        for done in 0..=6 {
            for revisions in 0..=2 {
                let ch = chapter(done, revisions);
                let pct = chapter_completion_percent(&ch);
                let expected = ((done as f64 + f64::from(u8::from(revisions >= 1))) / 7.0 * 100.0)
                    .round() as u8;
                assert_eq!(pct, expected);
                assert_eq!(pct == 100, is_chapter_complete(&ch));
            }
        }
    }

    #[test]
    fn empty_inputs_are_zero() {
        assert_eq!(subject_completion_percent(&subject(vec![])), 0);
        assert_eq!(overall_completion_percent(&[]), 0);
    }

    #[test]
    fn subject_percent_is_rounded_mean() {
        // 100, 14, 0 -> 38
        let s = subject(vec![chapter(6, 1), chapter(1, 0), chapter(0, 0)]);
        assert_eq!(subject_completion_percent(&s), 38);
    }

    #[test]
    fn overall_is_mean_of_subject_means() {
        let small = subject(vec![chapter(6, 1)]);
        let large = subject((0..50).map(|_| chapter(0, 0)).collect());
        assert_eq!(overall_completion_percent(&[small, large]), 50);
    }

    #[test]
    fn expected_progress_requires_valid_window() {
        let today = date(2026, 3, 1);
        assert_eq!(expected_progress_percent(None, Some(today), today), None);
        assert_eq!(expected_progress_percent(Some(today), None, today), None);
        assert_eq!(expected_progress_percent(Some(today), Some(today), today), None);
        assert_eq!(
            expected_progress_percent(Some(date(2026, 4, 1)), Some(date(2026, 3, 1)), today),
            None
        );
    }

    #[test]
    fn expected_progress_is_clamped() {
        let start = Some(date(2026, 1, 1));
        let target = Some(date(2026, 1, 11));
        assert_eq!(expected_progress_percent(start, target, date(2025, 12, 1)), Some(0));
        assert_eq!(expected_progress_percent(start, target, date(2026, 1, 6)), Some(50));
        assert_eq!(expected_progress_percent(start, target, date(2026, 2, 1)), Some(100));
    }

    #[test]
    fn days_remaining_signs() {
        let today = date(2026, 10, 16);
        assert_eq!(days_remaining(None, today), None);
        assert_eq!(days_remaining(Some(today), today), Some(0));
        assert_eq!(days_remaining(Some(date(2026, 10, 15)), today), Some(-1));
        assert_eq!(days_remaining(Some(date(2026, 10, 20)), today), Some(4));
    }

    #[test]
    fn pace_dead_band() {
        assert_eq!(pace_classification(60, Some(55)), Some(Pace::Ahead));
        assert_eq!(pace_classification(60, Some(61)), Some(Pace::OnTrack));
        assert_eq!(pace_classification(50, Some(54)), Some(Pace::Behind));
        assert_eq!(pace_classification(58, Some(55)), Some(Pace::Ahead));
        assert_eq!(pace_classification(52, Some(55)), Some(Pace::Behind));
        assert_eq!(pace_classification(50, None), None);
    }

    #[test]
    fn unstarted_chapters_keep_tree_order() {
        let first = subject(vec![chapter(0, 0), chapter(2, 0), chapter(0, 0)]);
        let second = subject(vec![chapter(0, 1), chapter(0, 0)]);
        let subjects = vec![first, second];
        let found = unstarted_chapters(&subjects);
        let ids: Vec<_> = found.iter().map(|(_, c)| c.id()).collect();
        assert_eq!(
            ids,
            vec![
                subjects[0].chapters()[0].id(),
                subjects[0].chapters()[2].id(),
                subjects[1].chapters()[1].id(),
            ]
        );
        assert_eq!(found[2].0.id(), subjects[1].id());
    }
}
