//! monotable
//!
//! Validate and inspect single-table schema documents. Each command loads a
//! JSON or TOML table document, builds the canonical table, and reports it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use monotable_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "monotable", about = "Validate and inspect single-table schema documents")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Also append log output to this file
    #[arg(long, global = true, env = "MONOTABLE_LOG_FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the table described by a document and report any schema error
    Check {
        /// Table document (.json or .toml)
        file: PathBuf,
    },

    /// Print the canonical schema
    Show {
        /// Table document (.json or .toml)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List secondary indexes with their classification
    Indexes {
        /// Table document (.json or .toml)
        file: PathBuf,
    },

    /// List registered entities and their attribute mappings
    Entities {
        /// Table document (.json or .toml)
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig::new("monotable")
        .with_verbose(cli.verbose)
        .with_log_file(cli.log_file.clone());
    if let Err(err) = init_logging(log_config) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}

fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Check { file } => cli::check::run(cli::check::CheckArgs { file }),
        Commands::Show { file, json } => cli::show::run(cli::show::ShowArgs { file, json }),
        Commands::Indexes { file } => cli::indexes::run(cli::indexes::IndexesArgs { file }),
        Commands::Entities { file } => cli::entities::run(cli::entities::EntitiesArgs { file }),
    }
}
