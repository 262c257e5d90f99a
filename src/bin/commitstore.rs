//! `commitstore` command-line entry point.
//!
//! Parses a subcommand, runs it against the repository in the working
//! directory, and reports failures as a single line on stderr with exit
//! status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use commitstore::{Repository, Result};

/// A tiny content-addressed version-control system.
#[derive(Parser, Debug)]
#[command(name = "commitstore", version, about)]
struct Cli {
    /// Working directory holding the repository.
    #[arg(short = 'C', long = "dir", env = "COMMITSTORE_DIR", default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a repository with an initial empty commit.
    Init,
    /// Stage a file's current contents.
    Add { filename: String },
    /// Unstage a file, or stage its removal if it is tracked.
    Rm { filename: String },
    /// Record the staged changes as a new commit.
    Commit { message: String },
    /// Show the history from the head, most recent first.
    Log,
    /// Show staged additions and removals.
    Status,
    /// Restore a file from a commit: `checkout [commit] -- <filename>`.
    Checkout {
        commit: Option<String>,
        #[arg(last = true, required = true)]
        filename: String,
    },
    /// Compare the head version of a file with the working copy.
    Diff { filename: String },
    /// Show every move of the head.
    Reflog,
}

fn run(cli: Cli) -> Result<()> {
    let dir = cli.dir;
    match cli.command {
        Command::Init => {
            Repository::init(&dir)?;
        }
        Command::Add { filename } => {
            Repository::open(&dir)?.add(&filename)?;
        }
        Command::Rm { filename } => {
            Repository::open(&dir)?.rm(&filename)?;
        }
        Command::Commit { message } => {
            Repository::open(&dir)?.commit(&message)?;
        }
        Command::Log => {
            print!("{}", Repository::open(&dir)?.format_log()?);
        }
        Command::Status => {
            print!("{}", Repository::open(&dir)?.status()?);
        }
        Command::Checkout { commit, filename } => {
            Repository::open(&dir)?.checkout(commit.as_deref(), &filename)?;
        }
        Command::Diff { filename } => {
            print!("{}", Repository::open(&dir)?.diff(&filename)?);
        }
        Command::Reflog => {
            for entry in Repository::open(&dir)?.reflog()? {
                println!("{} {}", entry.new.short(), entry.message);
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
