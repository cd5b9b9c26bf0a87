use chrono::NaiveDate;

use crate::model::{ChapterId, Config, Subject, SubjectId};
use crate::progress::{
    Pace, days_remaining, expected_progress_percent, is_chapter_complete,
    overall_completion_percent, pace_classification, unstarted_chapters,
};

/// Maximum number of unstarted chapters listed on the dashboard.
pub const TRIAGE_DISPLAY_LIMIT: usize = 10;

/// One chapter needing attention, labelled with its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageEntry {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub chapter_id: ChapterId,
    pub chapter_name: String,
}

/// The three display states of the attention list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Triage {
    NoSubjects,
    AllStarted,
    Unstarted {
        entries: Vec<TriageEntry>,
        overflow: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceBadge {
    pub pace: Pace,
    pub actual_percent: u8,
    pub expected_percent: u8,
    pub days_remaining: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub overall_percent: u8,
    pub subject_count: usize,
    pub total_chapters: usize,
    pub complete_chapters: usize,
    pub triage: Triage,
    pub pace: Option<PaceBadge>,
    pub days_remaining: Option<i64>,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn build(subjects: &[Subject], config: &Config, today: NaiveDate) -> Self {
        let overall_percent = overall_completion_percent(subjects);
        let chapters = subjects.iter().flat_map(Subject::chapters);
        let total_chapters = chapters.clone().count();
        let complete_chapters = chapters.filter(|c| is_chapter_complete(c)).count();
        let remaining = days_remaining(config.target_date(), today);

        let pace = expected_progress_percent(config.start_date(), config.target_date(), today)
            .and_then(|expected| {
                pace_classification(overall_percent, Some(expected)).map(|pace| PaceBadge {
                    pace,
                    actual_percent: overall_percent,
                    expected_percent: expected,
                    days_remaining: remaining,
                })
            });

        Self {
            overall_percent,
            subject_count: subjects.len(),
            total_chapters,
            complete_chapters,
            triage: build_triage(subjects),
            pace,
            days_remaining: remaining,
        }
    }
}

fn build_triage(subjects: &[Subject]) -> Triage {
    if subjects.is_empty() {
        return Triage::NoSubjects;
    }
    let unstarted = unstarted_chapters(subjects);
    if unstarted.is_empty() {
        return Triage::AllStarted;
    }
    let overflow = unstarted.len().saturating_sub(TRIAGE_DISPLAY_LIMIT);
    let entries = unstarted
        .into_iter()
        .take(TRIAGE_DISPLAY_LIMIT)
        .map(|(subject, chapter)| TriageEntry {
            subject_id: subject.id(),
            subject_name: subject.name().to_string(),
            chapter_id: chapter.id(),
            chapter_name: chapter.name().to_string(),
        })
        .collect();
    Triage::Unstarted { entries, overflow }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chapter, Criterion, Name};
    use crate::time::fixed_now;

    fn subject_with(chapters: usize) -> Subject {
        let mut s = Subject::new(SubjectId::generate(), Name::new("Law").unwrap(), fixed_now());
        for i in 0..chapters {
            let name = Name::new(format!("Chapter {i}")).unwrap();
            s.push_chapter(Chapter::new(ChapterId::generate(), name, fixed_now()));
        }
        s
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn no_subjects_state() {
        let snap = DashboardSnapshot::build(&[], &Config::default(), today());
        assert_eq!(snap.triage, Triage::NoSubjects);
        assert_eq!(snap.overall_percent, 0);
        assert_eq!(snap.pace, None);
    }

    #[test]
    fn triage_caps_at_ten_with_overflow() {
        let snap = DashboardSnapshot::build(&[subject_with(11)], &Config::default(), today());
        match snap.triage {
            Triage::Unstarted { entries, overflow } => {
                assert_eq!(entries.len(), 10);
                assert_eq!(overflow, 1);
                assert_eq!(entries[0].chapter_name, "Chapter 0");
            }
            other => panic!("unexpected triage {other:?}"),
        }
        assert_eq!(snap.total_chapters, 11);
    }

    #[test]
    fn all_started_state_and_complete_count() {
        let mut s = subject_with(2);
        let ids: Vec<_> = s.chapters().iter().map(Chapter::id).collect();
        let done = s.chapter_mut(ids[0]).unwrap();
        for c in Criterion::ALL {
            done.set_criterion(c, true);
        }
        done.set_revision_count(1);
        s.chapter_mut(ids[1]).unwrap().set_criterion(Criterion::Mtp, true);

        let snap = DashboardSnapshot::build(&[s], &Config::default(), today());
        assert_eq!(snap.triage, Triage::AllStarted);
        assert_eq!(snap.complete_chapters, 1);
        assert_eq!(snap.total_chapters, 2);
    }

    #[test]
    fn pace_badge_uses_study_window() {
        let config = Config::new(
            NaiveDate::from_ymd_opt(2026, 2, 1),
            NaiveDate::from_ymd_opt(2026, 3, 31),
        );
        let snap = DashboardSnapshot::build(&[subject_with(1)], &config, today());
        let badge = snap.pace.unwrap();
        assert_eq!(badge.pace, Pace::Behind);
        assert_eq!(badge.actual_percent, 0);
        assert_eq!(badge.expected_percent, 48);
        assert_eq!(badge.days_remaining, Some(30));
    }
}
