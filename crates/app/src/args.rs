use std::fmt;
use std::path::PathBuf;

use services::sync::RevisionStep;
use tracker_core::model::dates::parse_optional_date;
use tracker_core::model::{ChapterId, ConfigPatch, Criterion, SubjectId};

pub const DEFAULT_DATA_FILE: &str = "data/subjects.json";

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, name: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidId { raw: String },
    InvalidCriterion { raw: String },
    InvalidSwitch { raw: String },
    InvalidStep { raw: String },
    InvalidDate { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, name } => {
                write!(f, "{command} requires <{name}>")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw}"),
            ArgsError::InvalidCriterion { raw } => write!(
                f,
                "invalid criterion: {raw} (expected concepts, illustrations, tyk, rtp, mtp or pyq)"
            ),
            ArgsError::InvalidSwitch { raw } => write!(f, "expected on or off, got: {raw}"),
            ArgsError::InvalidStep { raw } => write!(f, "expected up or down, got: {raw}"),
            ArgsError::InvalidDate { raw } => {
                write!(f, "invalid date: {raw} (expected YYYY-MM-DD, or \"\" to clear)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  tracker [--data <path>] [--remote <url>] <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                                   dashboard (default)");
    eprintln!("  subjects                                 list subjects with progress");
    eprintln!("  show <subject-id>                        chapter table for one subject");
    eprintln!("  add-subject <name>");
    eprintln!("  rename-subject <subject-id> <name>");
    eprintln!("  delete-subject <subject-id>");
    eprintln!("  add-chapter <subject-id> <name>");
    eprintln!("  rename-chapter <subject-id> <chapter-id> <name>");
    eprintln!("  delete-chapter <subject-id> <chapter-id>");
    eprintln!("  toggle <subject-id> <chapter-id> <criterion> <on|off>");
    eprintln!("  revise <subject-id> <chapter-id> <up|down>");
    eprintln!("  config [--start <date>] [--target <date>] [--title <text>] [--subtitle <text>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --data {DEFAULT_DATA_FILE}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRACKER_DATA_FILE, TRACKER_REMOTE_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    Subjects,
    Show {
        subject: SubjectId,
    },
    AddSubject {
        name: String,
    },
    RenameSubject {
        subject: SubjectId,
        name: String,
    },
    DeleteSubject {
        subject: SubjectId,
    },
    AddChapter {
        subject: SubjectId,
        name: String,
    },
    RenameChapter {
        subject: SubjectId,
        chapter: ChapterId,
        name: String,
    },
    DeleteChapter {
        subject: SubjectId,
        chapter: ChapterId,
    },
    Toggle {
        subject: SubjectId,
        chapter: ChapterId,
        criterion: Criterion,
        value: bool,
    },
    Revise {
        subject: SubjectId,
        chapter: ChapterId,
        step: RevisionStep,
    },
    Config(ConfigPatch),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub data_file: PathBuf,
    pub remote_url: Option<String>,
    pub command: Command,
}

impl Args {
    pub fn from_env() -> Result<Self, ArgsError> {
        let data_file = std::env::var("TRACKER_DATA_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let remote_url = std::env::var("TRACKER_REMOTE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self::parse(std::env::args().skip(1), data_file, remote_url)
    }

    /// Global flags may appear anywhere; the first positional is the command.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        data_file: Option<String>,
        remote_url: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut data_file = PathBuf::from(data_file.unwrap_or_else(|| DEFAULT_DATA_FILE.into()));
        let mut remote_url = remote_url;
        let mut rest = Vec::new();
        let mut help = false;

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--data" => data_file = PathBuf::from(require_value(&mut args, "--data")?),
                "--remote" => remote_url = Some(require_value(&mut args, "--remote")?),
                "--help" | "-h" => help = true,
                _ => rest.push(arg),
            }
        }

        let mut rest = rest.into_iter();
        let command = match rest.next() {
            _ if help => Command::Help,
            None => Command::Status,
            Some(name) => parse_command(&name, &mut rest)?,
        };

        Ok(Self {
            data_file,
            remote_url,
            command,
        })
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_command(
    name: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<Command, ArgsError> {
    let command = match name {
        "help" => Command::Help,
        "status" => Command::Status,
        "subjects" => Command::Subjects,
        "show" => Command::Show {
            subject: subject_arg(args, "show")?,
        },
        "add-subject" => Command::AddSubject {
            name: name_arg(args, "add-subject")?,
        },
        "rename-subject" => Command::RenameSubject {
            subject: subject_arg(args, "rename-subject")?,
            name: name_arg(args, "rename-subject")?,
        },
        "delete-subject" => Command::DeleteSubject {
            subject: subject_arg(args, "delete-subject")?,
        },
        "add-chapter" => Command::AddChapter {
            subject: subject_arg(args, "add-chapter")?,
            name: name_arg(args, "add-chapter")?,
        },
        "rename-chapter" => Command::RenameChapter {
            subject: subject_arg(args, "rename-chapter")?,
            chapter: chapter_arg(args, "rename-chapter")?,
            name: name_arg(args, "rename-chapter")?,
        },
        "delete-chapter" => Command::DeleteChapter {
            subject: subject_arg(args, "delete-chapter")?,
            chapter: chapter_arg(args, "delete-chapter")?,
        },
        "toggle" => Command::Toggle {
            subject: subject_arg(args, "toggle")?,
            chapter: chapter_arg(args, "toggle")?,
            criterion: {
                let raw = positional(args, "toggle", "criterion")?;
                Criterion::from_field_name(&raw).ok_or(ArgsError::InvalidCriterion { raw })?
            },
            value: match positional(args, "toggle", "on|off")?.as_str() {
                "on" | "true" | "yes" => true,
                "off" | "false" | "no" => false,
                other => {
                    return Err(ArgsError::InvalidSwitch {
                        raw: other.to_string(),
                    });
                }
            },
        },
        "revise" => Command::Revise {
            subject: subject_arg(args, "revise")?,
            chapter: chapter_arg(args, "revise")?,
            step: match positional(args, "revise", "up|down")?.as_str() {
                "up" | "+" => RevisionStep::Up,
                "down" | "-" => RevisionStep::Down,
                other => {
                    return Err(ArgsError::InvalidStep {
                        raw: other.to_string(),
                    });
                }
            },
        },
        "config" => Command::Config(parse_config(args)?),
        other => return Err(ArgsError::UnknownCommand(other.to_string())),
    };

    match args.next() {
        Some(extra) => Err(ArgsError::UnknownArg(extra)),
        None => Ok(command),
    }
}

fn positional(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    name: &'static str,
) -> Result<String, ArgsError> {
    args.next()
        .ok_or(ArgsError::MissingArgument { command, name })
}

fn subject_arg(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<SubjectId, ArgsError> {
    let raw = positional(args, command, "subject-id")?;
    raw.parse().map_err(|_| ArgsError::InvalidId { raw })
}

fn chapter_arg(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<ChapterId, ArgsError> {
    let raw = positional(args, command, "chapter-id")?;
    raw.parse().map_err(|_| ArgsError::InvalidId { raw })
}

/// Names are the remaining words, so quoting is optional.
fn name_arg(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
) -> Result<String, ArgsError> {
    let words: Vec<String> = args.collect();
    if words.is_empty() {
        return Err(ArgsError::MissingArgument {
            command,
            name: "name",
        });
    }
    Ok(words.join(" "))
}

fn parse_config(args: &mut impl Iterator<Item = String>) -> Result<ConfigPatch, ArgsError> {
    let mut patch = ConfigPatch::default();
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--start" => patch.start_date = Some(date_value(args, "--start")?),
            "--target" => patch.target_date = Some(date_value(args, "--target")?),
            "--title" => patch.brand_title = Some(require_value(args, "--title")?),
            "--subtitle" => patch.brand_subtitle = Some(require_value(args, "--subtitle")?),
            _ => return Err(ArgsError::UnknownArg(flag)),
        }
    }
    Ok(patch)
}

fn date_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<Option<chrono::NaiveDate>, ArgsError> {
    let raw = require_value(args, flag)?;
    parse_optional_date(&raw).map_err(|_| ArgsError::InvalidDate { raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(argv.iter().map(|s| (*s).to_string()), None, None)
    }

    const SUBJECT: &str = "7f1d3c8e-2a0b-4c53-9d1e-0f6a2b3c4d5e";
    const CHAPTER: &str = "0b8e4c1a-6d2f-4e3b-8a9c-1d2e3f4a5b6c";

    #[test]
    fn defaults_to_status_and_default_file() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Status);
        assert_eq!(args.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(args.remote_url, None);
    }

    #[test]
    fn environment_values_are_overridden_by_flags() {
        let args = Args::parse(
            ["--data", "/tmp/x.json", "subjects"].map(String::from),
            Some("env.json".into()),
            Some("http://localhost:3000".into()),
        )
        .unwrap();
        assert_eq!(args.data_file, PathBuf::from("/tmp/x.json"));
        assert_eq!(args.remote_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(args.command, Command::Subjects);
    }

    #[test]
    fn names_join_remaining_words() {
        let args = parse(&["add-subject", "Financial", "Reporting"]).unwrap();
        assert_eq!(
            args.command,
            Command::AddSubject {
                name: "Financial Reporting".into()
            }
        );
    }

    #[test]
    fn toggle_parses_criterion_and_switch() {
        let args = parse(&["toggle", SUBJECT, CHAPTER, "RTP", "on"]).unwrap();
        let Command::Toggle {
            criterion, value, ..
        } = args.command
        else {
            panic!("expected toggle");
        };
        assert_eq!(criterion, Criterion::Rtp);
        assert!(value);
    }

    #[test]
    fn bad_inputs_are_reported() {
        assert_eq!(
            parse(&["show", "nope"]).unwrap_err(),
            ArgsError::InvalidId { raw: "nope".into() }
        );
        assert_eq!(
            parse(&["revise", SUBJECT, CHAPTER, "sideways"]).unwrap_err(),
            ArgsError::InvalidStep {
                raw: "sideways".into()
            }
        );
        assert_eq!(
            parse(&["delete-subject"]).unwrap_err(),
            ArgsError::MissingArgument {
                command: "delete-subject",
                name: "subject-id"
            }
        );
        assert!(matches!(
            parse(&["frobnicate"]).unwrap_err(),
            ArgsError::UnknownCommand(_)
        ));
    }

    #[test]
    fn config_flags_distinguish_clear_from_absent() {
        let args = parse(&["config", "--target", "2026-05-01", "--start", ""]).unwrap();
        let Command::Config(patch) = args.command else {
            panic!("expected config");
        };
        assert_eq!(patch.start_date, Some(None));
        assert_eq!(
            patch.target_date,
            Some(chrono::NaiveDate::from_ymd_opt(2026, 5, 1))
        );
        assert_eq!(patch.brand_title, None);
    }
}
