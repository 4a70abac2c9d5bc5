//! Developer CLI for the CloudNote core.
//!
//! # Responsibility
//! - Drive the notes service against a live backend from a terminal.
//! - Keep output line-oriented for quick manual checks.

use clap::{Parser, Subcommand};
use cloudnote_core::{
    core_version, default_log_level, init_logging_with, LogOptions, Note, NoteDraft, NoteService,
    RemoteConfig, RestNoteStore, SearchOutcome,
};
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cloudnote")]
#[command(about = "CloudNote: remote-backed notes from the terminal")]
struct Cli {
    /// Read SUPABASE_URL/SUPABASE_KEY from this file instead of the environment.
    #[arg(long, value_name = "PATH", global = true)]
    env_file: Option<PathBuf>,
    /// Absolute directory for rolling log files; logging is off when omitted.
    #[arg(long, value_name = "DIR", global = true)]
    log_dir: Option<String>,
    /// Log level used with --log-dir.
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the core version.
    Version,
    /// List all notes, newest first.
    List,
    /// List notes whose title or content contains TERM.
    Search {
        #[arg(value_name = "TERM")]
        term: String,
    },
    /// Create a note.
    Add { title: String, content: String },
    /// Replace a note's title and content.
    Update {
        id: String,
        title: String,
        content: String,
    },
    /// Delete a note.
    Delete { id: String },
    /// Show one note by id.
    Show { id: String },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::List => "list",
            Self::Search { .. } => "search",
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Show { .. } => "show",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Commands::Version = cli.command {
        println!("cloudnote_core version={}", core_version());
        return ExitCode::SUCCESS;
    }

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let started = LogOptions::new(level, log_dir)
            .and_then(|options| init_logging_with(options.with_stderr_echo()));
        if let Err(err) = started {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let config = match cli.env_file.as_ref() {
        Some(path) => RemoteConfig::from_env_file(path),
        None => RemoteConfig::from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let service = NoteService::new(RestNoteStore::new(&config));
    let command = cli.command.name();
    match run(&service, cli.command).await {
        Ok(()) => {
            info!("event=cli_command module=cli status=ok command={command}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            warn!("event=cli_command module=cli status=error command={command}");
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(service: &NoteService<RestNoteStore>, command: Commands) -> Result<(), String> {
    match command {
        Commands::Version => Ok(()),
        Commands::List => {
            service.load().await.map_err(|err| err.to_string())?;
            print_notes(&service.visible_notes());
            Ok(())
        }
        Commands::Search { term } => {
            service.load().await.map_err(|err| err.to_string())?;
            match service.search(&term).await.map_err(|err| err.to_string())? {
                SearchOutcome::Superseded => Err("search superseded".to_string()),
                SearchOutcome::Unfiltered | SearchOutcome::Filtered { .. } => {
                    print_notes(&service.visible_notes());
                    Ok(())
                }
            }
        }
        Commands::Add { title, content } => {
            let draft = checked_draft(title, content)?;
            let note = service
                .add(&draft.title, &draft.content)
                .await
                .map_err(|err| err.to_string())?;
            println!("created {}", note.id);
            Ok(())
        }
        Commands::Update { id, title, content } => {
            let draft = checked_draft(title, content)?;
            let confirmed = service
                .update(&id, &draft.title, &draft.content)
                .await
                .map_err(|err| err.to_string())?;
            if confirmed {
                println!("updated {id}");
                Ok(())
            } else {
                Err(format!("update of {id} was not confirmed"))
            }
        }
        Commands::Delete { id } => {
            let confirmed = service.delete(&id).await.map_err(|err| err.to_string())?;
            if confirmed {
                println!("deleted {id}");
                Ok(())
            } else {
                Err(format!("delete of {id} was not confirmed"))
            }
        }
        Commands::Show { id } => {
            service.load().await.map_err(|err| err.to_string())?;
            match service.lookup(&id) {
                Some(note) => {
                    println!("id: {}", note.id);
                    println!("title: {}", note.title);
                    println!();
                    println!("{}", note.content);
                    Ok(())
                }
                None => Err(format!("note {id} not found")),
            }
        }
    }
}

fn checked_draft(title: String, content: String) -> Result<NoteDraft, String> {
    let draft = NoteDraft::new(title.trim(), content.trim());
    draft.validate().map_err(|err| err.to_string())?;
    Ok(draft)
}

fn print_notes(notes: &[Note]) {
    println!("{} note(s)", notes.len());
    for note in notes {
        let first_line = note.content.lines().next().unwrap_or("").trim();
        let preview: String = first_line.chars().take(60).collect();
        let ellipsis = if first_line.chars().count() > 60 { "..." } else { "" };
        println!("  {}\t{}\t{}{}", note.id, note.title, preview, ellipsis);
    }
}
