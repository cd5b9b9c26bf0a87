mod args;
mod render;

use std::process::ExitCode;

use services::cache::Selection;
use services::error::SyncError;
use services::sync::{SyncController, SyncOutcome};
use services::{AppServices, Clock, LoadStatus, NoticeLevel};

use crate::args::{Args, Command, print_usage};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn build_services(args: &Args, clock: Clock) -> Result<AppServices, Box<dyn std::error::Error>> {
    let services = match &args.remote_url {
        Some(url) => AppServices::new_http(url, clock)?,
        None => AppServices::new_json_file(&args.data_file, clock).await?,
    };
    tracing::debug!(backend = ?services.backend(), "services ready");
    Ok(services)
}

async fn execute(controller: &SyncController, command: Command) -> Result<(), SyncError> {
    match command {
        Command::Help => print_usage(),
        Command::Status => {
            let snapshot = controller.dashboard()?;
            let text = controller.read(|cache| render::dashboard(cache, &snapshot))?;
            print!("{text}");
        }
        Command::Subjects => print!("{}", controller.read(render::subject_list)?),
        Command::Show { subject } => {
            controller.select(Selection::Subject(subject))?;
            let text = controller.read(|cache| cache.selected_subject().map(render::chapter_table))?;
            if let Some(text) = text {
                print!("{text}");
            }
        }
        Command::AddSubject { name } => {
            let subject = controller.add_subject(&name).await?;
            println!("{}", subject.id());
        }
        Command::RenameSubject { subject, name } => {
            report(controller.rename_subject(subject, &name).await?);
        }
        Command::DeleteSubject { subject } => {
            report(controller.delete_subject(subject).await?);
        }
        Command::AddChapter { subject, name } => {
            let chapter = controller.add_chapter(subject, &name).await?;
            println!("{}", chapter.id());
        }
        Command::RenameChapter {
            subject,
            chapter,
            name,
        } => report(controller.rename_chapter(subject, chapter, &name).await?),
        Command::DeleteChapter { subject, chapter } => {
            report(controller.delete_chapter(subject, chapter).await?);
        }
        Command::Toggle {
            subject,
            chapter,
            criterion,
            value,
        } => report(
            controller
                .toggle_criterion(subject, chapter, criterion, value)
                .await?,
        ),
        Command::Revise {
            subject,
            chapter,
            step,
        } => report(controller.adjust_revision(subject, chapter, step).await?),
        Command::Config(patch) => report(controller.update_config(patch).await?),
    }
    Ok(())
}

fn report(outcome: SyncOutcome) {
    match outcome {
        SyncOutcome::Unchanged => println!("No change."),
        SyncOutcome::Confirmed(derived) => {
            if let Some(percent) = derived.chapter_percent {
                println!("Chapter  {percent}%");
            }
            if let Some(percent) = derived.subject_percent {
                println!("Subject  {percent}%");
            }
            println!("Overall  {}%", derived.overall_percent);
            if let Some(pace) = derived.pace {
                println!("Pace     {}", pace.label());
            }
        }
    }
}

fn flush_notices(controller: &SyncController) {
    for notice in controller.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::from_env().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    if args.command == Command::Help {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    let clock = Clock::default_clock();
    let services = build_services(&args, clock).await?;
    let controller = services.controller();

    if controller.load().await? == LoadStatus::Offline {
        flush_notices(&controller);
        return Ok(ExitCode::from(3));
    }

    let result = execute(&controller, args.command).await;
    flush_notices(&controller);
    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // Already reported through the notice queue.
        Err(SyncError::RolledBack(_) | SyncError::Remote(_)) => Ok(ExitCode::FAILURE),
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}
