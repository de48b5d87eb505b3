//! sprig CLI - minimal single-user version control

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sprig::ops::{
    add, branch, checkout_branch, checkout_file, commit, find, global_log, log, merge, remove,
    reset, rm_branch, status, MergeOutcome,
};
use sprig::Repo;

#[derive(Parser)]
#[command(name = "sprig")]
#[command(about = "minimal single-user version control")]
#[command(version)]
struct Cli {
    /// working tree containing the repository
    #[arg(short = 'C', long, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a repository in the working tree
    Init,

    /// stage a file for the next commit
    Add {
        /// file name
        file: String,
    },

    /// record the staged changes
    Commit {
        /// commit message
        message: String,
    },

    /// unstage a file, or mark a tracked file for removal
    Rm {
        /// file name
        file: String,
    },

    /// show history of the current head
    Log,

    /// show every commit ever made
    GlobalLog,

    /// print ids of commits with the given message
    Find {
        /// exact commit message
        message: String,
    },

    /// show branches, staged, removed, modified and untracked files
    Status,

    /// `checkout <branch>`, or `checkout [<commit>] -- <file>`
    Checkout {
        /// branch name, or commit id when a file follows `--`
        #[arg(required_unless_present = "file")]
        target: Option<String>,

        /// file to restore
        #[arg(last = true)]
        file: Option<String>,
    },

    /// create a branch at the head commit
    Branch {
        /// branch name
        name: String,
    },

    /// delete a branch pointer
    RmBranch {
        /// branch name
        name: String,
    },

    /// check out a commit and move the current branch to it
    Reset {
        /// full or abbreviated commit id
        commit: String,
    },

    /// merge a branch into the current one
    Merge {
        /// branch to merge from
        branch: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> sprig::Result<()> {
    if let Commands::Init = cli.command {
        Repo::init(&cli.repo)?;
        println!("initialized sprig repository in {}", cli.repo.display());
        return Ok(());
    }

    let repo = Repo::open(&cli.repo)?;

    match cli.command {
        Commands::Init => {}

        Commands::Add { file } => {
            add(&repo, &file)?;
        }

        Commands::Commit { message } => {
            let id = commit(&repo, &message)?;
            println!("{}", id.short());
        }

        Commands::Rm { file } => {
            remove(&repo, &file)?;
        }

        Commands::Log => {
            for entry in log(&repo)? {
                println!("{}", entry);
            }
        }

        Commands::GlobalLog => {
            for entry in global_log(&repo)? {
                println!("{}", entry);
            }
        }

        Commands::Find { message } => {
            for id in find(&repo, &message)? {
                println!("{}", id);
            }
        }

        Commands::Status => {
            print!("{}", status(&repo)?);
        }

        Commands::Checkout { target, file } => match file {
            Some(file) => checkout_file(&repo, target.as_deref(), &file)?,
            None => {
                if let Some(name) = target {
                    checkout_branch(&repo, &name)?;
                }
            }
        },

        Commands::Branch { name } => {
            branch(&repo, &name)?;
        }

        Commands::RmBranch { name } => {
            rm_branch(&repo, &name)?;
        }

        Commands::Reset { commit } => {
            reset(&repo, &commit)?;
        }

        Commands::Merge { branch } => match merge(&repo, &branch)? {
            MergeOutcome::FastForwarded(id) => {
                println!("Current branch fast-forwarded to {}.", id.short());
            }
            MergeOutcome::Merged(id) => {
                println!("{}", id.short());
            }
            MergeOutcome::Conflicted(_) => {
                println!("Encountered a merge conflict.");
            }
        },
    }

    Ok(())
}
