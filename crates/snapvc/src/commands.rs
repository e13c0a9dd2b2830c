//! Command handlers.
//!
//! Each handler opens the repository at the current directory, performs one
//! operation, and prints its result. Errors bubble up to `main`, which
//! prints them and exits 1.

use crate::output;
use crate::Commands;
use anyhow::bail;
use chrono::Utc;
use crossterm::style::Stylize;
use snapvc_store::{FileState, InitOutcome, Repository, VersionRecord};
use snapvc_util::current_user;
use std::fs;
use tracing::debug;

pub fn run(command: Commands) -> anyhow::Result<()> {
    debug!(?command, "Dispatching command");
    match command {
        Commands::Init => init(),
        Commands::Track { file } => track(&file),
        Commands::Untrack { file } => untrack(&file),
        Commands::Status => status(),
        Commands::Find => find(),
        Commands::Diff { file } => diff(&file),
        Commands::Save { file } => save(&file),
        Commands::Revert { file, version } => revert(&file, version),
        Commands::History => history(),
    }
}

fn init() -> anyhow::Result<()> {
    match Repository::init(".", &current_user(), Utc::now())? {
        InitOutcome::AlreadyExists => {
            output::notice("Repository already exists!");
        }
        InitOutcome::Created { imported } => {
            for name in &imported {
                println!(" {} {}", "+".green(), name.clone().green());
            }
            if imported.is_empty() {
                output::success("Initialized empty repository");
            } else {
                output::success(&format!(
                    "Initialized repository with {} files",
                    imported.len()
                ));
            }
        }
    }
    Ok(())
}

fn track(file: &str) -> anyhow::Result<()> {
    let metadata = match fs::metadata(file) {
        Ok(metadata) => metadata,
        Err(_) => bail!("File not found: {file}"),
    };
    if metadata.is_dir() {
        bail!("Cannot track directory: {file}");
    }

    let repo = Repository::open(".")?;
    if repo.is_tracked(file)? {
        output::notice(&format!("Already tracking: {file}"));
        return Ok(());
    }

    let record = repo.track(file, &current_user(), Utc::now())?;
    output::success(&format!("Now tracking: {file}"));
    output::success(&format!("Saved version {} of {file}", record.version));
    Ok(())
}

fn untrack(file: &str) -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    repo.untrack(file)?;
    output::success(&format!("No longer tracking: {file}"));
    Ok(())
}

fn status() -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    let statuses = repo.status()?;

    if statuses.is_empty() {
        output::notice("No tracked files");
        return Ok(());
    }

    output::notice("Tracked files:");
    for entry in statuses {
        match entry.state {
            FileState::Clean => println!(" {}", entry.path.green()),
            FileState::Modified => println!(" {}", format!("{} (modified)", entry.path).red()),
            FileState::Deleted => println!(" {}", format!("{} (deleted)", entry.path).red()),
        }
    }
    Ok(())
}

fn find() -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    for (path, tracked) in repo.find()? {
        if tracked {
            println!(" {}", path.green());
        } else {
            println!(" {}", format!("{path} (untracked)").yellow());
        }
    }
    Ok(())
}

fn diff(file: &str) -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    output::patch(&repo.diff_against_latest(file)?);
    Ok(())
}

fn save(file: &str) -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    let record = repo.save(file, &current_user(), Utc::now())?;
    output::success(&format!("Saved version {} of {file}", record.version));
    Ok(())
}

fn revert(file: &str, version: Option<u32>) -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    let version = match version {
        Some(version) => version,
        None => repo.latest_version(file)?,
    };
    repo.revert(file, version)?;
    output::success(&format!("Reverted {file} to version {version}"));
    Ok(())
}

fn history() -> anyhow::Result<()> {
    let repo = Repository::open(".")?;
    let records = repo.history()?;

    output::notice("Version History:");
    for record in records {
        print_record(&record);
    }
    Ok(())
}

fn print_record(record: &VersionRecord) {
    let exists = fs::metadata(&record.filename).is_ok();
    let marker = if exists {
        "(exists)".to_string().green()
    } else {
        "(deleted)".to_string().red()
    };

    println!(
        "\n{} - File: {} {}",
        format!("Version {}", record.version).cyan(),
        record.filename.clone().yellow(),
        marker
    );
    println!(
        "By: {} at {}",
        record.author,
        record.timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    if record.version > 1 {
        println!(
            "Changes: {}, {} lines",
            format!("+{}", record.lines_added).green(),
            format!("-{}", record.lines_removed).red()
        );
        if !record.changes.is_empty() {
            println!("Modified lines:");
            for op in &record.changes {
                let line = format!("{}{}", op.kind.prefix(), op.line);
                match op.kind {
                    snapvc_diff::EditKind::Delete => println!("{}", line.red()),
                    _ => println!("{}", line.green()),
                }
            }
        }
    }
}
