use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use council_core::clock::SystemClock;
use council_core::rng::SystemRng;
use council_event_store::{FileEventRepository, SessionPaths};
use council_session::application::query_handlers::{AwaitOptions, DEFAULT_AWAIT_TIMEOUT};
use tracing_subscriber::EnvFilter;

mod commands;
mod format;

#[derive(Parser)]
#[command(name = "council")]
#[command(about = "Turn-based collaboration between agents over a shared session log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new collaboration session and print its id
    New,
    /// Join a session as a participant
    Join {
        /// Session to join
        session_id: String,
        /// Participant name (prompted for if omitted)
        #[arg(short, long)]
        participant: Option<String>,
    },
    /// Leave a session
    Leave {
        /// Session to leave
        session_id: String,
        /// Participant name (prompted for if omitted)
        #[arg(short, long)]
        participant: Option<String>,
    },
    /// Post a message, read from a file or stdin
    Post {
        /// Session to post to
        session_id: String,
        /// Participant posting the message
        #[arg(short, long)]
        participant: String,
        /// Only post if the session holds exactly N events
        #[arg(long, value_name = "N")]
        after: usize,
        /// Read content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Designate the next speaker (defaults to the previous speaker)
        #[arg(short, long)]
        next: Option<String>,
    },
    /// Display the session transcript
    Status {
        /// Session to display
        session_id: String,
        /// Only show events after event number N
        #[arg(long, value_name = "N", default_value_t = 0)]
        after: usize,
        /// Block until new events arrive and it is your turn
        #[arg(long = "await", requires = "participant")]
        wait: bool,
        /// Your participant name (required with --await)
        #[arg(short, long)]
        participant: Option<String>,
        /// Seconds to wait with --await
        #[arg(long, value_name = "SECS", default_value_t = DEFAULT_AWAIT_TIMEOUT.as_secs())]
        timeout: u64,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    let repo = FileEventRepository::new(SessionPaths::from_env()?);
    let clock = SystemClock;

    match command {
        Commands::New => {
            let session_id = commands::new_session(&repo, &clock, &mut SystemRng::from_entropy())?;
            println!("{session_id}");
        }
        Commands::Join {
            session_id,
            participant,
        } => {
            let name = participant_or_prompt(participant)?;
            let event_number = commands::join(&repo, &clock, &session_id, &name)?;
            println!(
                "Joined session as event #{event_number}. Use --after {event_number} for your first post."
            );
        }
        Commands::Leave {
            session_id,
            participant,
        } => {
            let name = participant_or_prompt(participant)?;
            commands::leave(&repo, &clock, &session_id, &name)?;
        }
        Commands::Post {
            session_id,
            participant,
            after,
            file,
            next,
        } => {
            let content = read_content(file)?;
            let event_number = commands::post(
                &repo,
                &clock,
                &mut SystemRng::from_entropy(),
                &commands::PostArgs {
                    session_id,
                    participant,
                    content,
                    next,
                    after,
                },
            )?;
            println!("Posted as event #{event_number}.");
        }
        Commands::Status {
            session_id,
            after,
            wait,
            participant,
            timeout,
        } => {
            let output = match participant.filter(|_| wait) {
                Some(participant) => {
                    let options = AwaitOptions {
                        timeout: Duration::from_secs(timeout),
                        ..AwaitOptions::default()
                    };
                    commands::await_status(&repo, &session_id, &participant, after, &options)?
                }
                None => commands::status(&repo, &session_id, after)?,
            };
            print!("{output}");
        }
    }

    Ok(())
}

fn participant_or_prompt(participant: Option<String>) -> Result<String> {
    let name = match participant {
        Some(name) => name,
        None => {
            print!("Enter your participant name: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_owned()
        }
    };
    if name.is_empty() {
        bail!("participant name must not be empty");
    }
    Ok(name)
}

fn read_content(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
        }
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("failed to read message from stdin")?;
            Ok(content)
        }
    }
}
