//! Plain-text views of the cache for the terminal.

use std::fmt::Write as _;

use services::cache::LocalCache;
use tracker_core::dashboard::{DashboardSnapshot, Triage};
use tracker_core::model::dates::format_optional_date;
use tracker_core::model::{Criterion, Subject};
use tracker_core::progress::{
    chapter_completion_percent, is_chapter_complete, subject_completion_percent,
};

pub fn days_label(days: i64) -> String {
    match days {
        0 => "due today".to_string(),
        1 => "1 day left".to_string(),
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d => format!("{d} days left"),
    }
}

pub fn dashboard(cache: &LocalCache, snapshot: &DashboardSnapshot) -> String {
    let config = cache.config();
    let mut out = String::new();
    let _ = writeln!(out, "{}", config.brand_title());
    let _ = writeln!(out, "{}", config.brand_subtitle());
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall progress   {}%", snapshot.overall_percent);
    let _ = writeln!(out, "Subjects           {}", snapshot.subject_count);
    let _ = writeln!(
        out,
        "Chapters complete  {}/{}",
        snapshot.complete_chapters, snapshot.total_chapters
    );

    let window = match (config.start_date(), config.target_date()) {
        (None, None) => None,
        (start, target) => Some(format!(
            "{} -> {}",
            or_unset(&format_optional_date(start)),
            or_unset(&format_optional_date(target))
        )),
    };
    if let Some(window) = window {
        let _ = writeln!(out, "Study window       {window}");
    }
    match (snapshot.pace, snapshot.days_remaining) {
        (Some(badge), _) => {
            let _ = write!(
                out,
                "Pace               {} ({}% done, {}% expected",
                badge.pace.label(),
                badge.actual_percent,
                badge.expected_percent
            );
            if let Some(days) = badge.days_remaining {
                let _ = write!(out, ", {}", days_label(days));
            }
            let _ = writeln!(out, ")");
        }
        (None, Some(days)) => {
            let _ = writeln!(out, "Target             {}", days_label(days));
        }
        (None, None) => {}
    }

    let _ = writeln!(out);
    match &snapshot.triage {
        Triage::NoSubjects => {
            let _ = writeln!(out, "No subjects yet. Add one with `add-subject <name>`.");
        }
        Triage::AllStarted => {
            let _ = writeln!(out, "Every chapter has been started. Keep going!");
        }
        Triage::Unstarted { entries, overflow } => {
            let _ = writeln!(out, "Not started yet:");
            for entry in entries {
                let _ = writeln!(out, "  {} / {}", entry.subject_name, entry.chapter_name);
            }
            if *overflow > 0 {
                let _ = writeln!(out, "  ...and {overflow} more");
            }
        }
    }
    out
}

pub fn subject_list(cache: &LocalCache) -> String {
    if cache.subjects().is_empty() {
        return "No subjects yet.\n".to_string();
    }
    let mut out = String::new();
    for subject in cache.subjects() {
        let complete = subject
            .chapters()
            .iter()
            .filter(|c| is_chapter_complete(c))
            .count();
        let _ = writeln!(
            out,
            "{:>3}%  {}  {} ({}/{} chapters complete)",
            subject_completion_percent(subject),
            subject.id(),
            subject.name(),
            complete,
            subject.chapters().len()
        );
    }
    out
}

pub fn chapter_table(subject: &Subject) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}%",
        subject.name(),
        subject_completion_percent(subject)
    );
    if subject.chapters().is_empty() {
        let _ = writeln!(out, "  (no chapters)");
        return out;
    }
    let header: Vec<String> = Criterion::ALL
        .iter()
        .map(|c| c.field_name().to_uppercase())
        .collect();
    let _ = writeln!(out, "  {:>4}  {}  REV  {:<36}  NAME", "%", header.join(" "), "ID");
    for chapter in subject.chapters() {
        let marks: Vec<String> = Criterion::ALL
            .iter()
            .map(|c| {
                let width = c.field_name().len();
                let mark = if chapter.criterion(*c) { "x" } else { "." };
                format!("{mark:^width$}")
            })
            .collect();
        let _ = writeln!(
            out,
            "  {:>3}%  {}  {:>3}  {}  {}",
            chapter_completion_percent(chapter),
            marks.join(" "),
            chapter.revision_count(),
            chapter.id(),
            chapter.name()
        );
    }
    out
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "unset" } else { value }
}
