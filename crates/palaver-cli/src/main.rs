//! CLI frontend for the Palaver branching-dialogue engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(
    name = "palaver",
    about = "Palaver — a branching-dialogue engine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a dialogue template and report diagnostics
    Check {
        /// Template document (JSON)
        file: PathBuf,
    },

    /// Summarize the states and choice edges of a template
    Show {
        /// Template document (JSON)
        file: PathBuf,
    },

    /// Play a dialogue interactively in the terminal
    Play {
        /// Template document (JSON)
        file: PathBuf,

        /// Set a predicate flag: NAME or NAME=true|false (repeatable).
        /// Predicates not set default to false.
        #[arg(short, long = "flag", value_name = "NAME[=BOOL]")]
        flags: Vec<String>,

        /// Start from a specific state instead of the template's start
        #[arg(short, long)]
        state: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::Show { file } => commands::show::run(&file),
        Commands::Play { file, flags, state } => {
            commands::play::run(&file, &flags, state.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {e}", "error:".red().bold());
        process::exit(1);
    }
}
