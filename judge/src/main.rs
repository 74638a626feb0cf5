mod cli;
mod config;
mod outcome;
mod report;
mod results;
mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use harness::core::types::Language;
use harness::exit_codes;

use crate::cli::RunArgs;
use crate::config::ConfigOverrides;

#[derive(Parser)]
#[command(
    name = "judge",
    version,
    about = "Run C++ and Python solutions against declaration-line test cases"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the solution, run every case and grade the outputs.
    Run {
        /// Solution source (`.cpp` or `.py`).
        solution: PathBuf,
        /// Workspace holding `test_cases/` and `harness.toml`.
        #[arg(long, default_value = ".")]
        workspace: PathBuf,
        /// Override the language detected from the file extension.
        #[arg(long)]
        language: Option<Language>,
        /// Kill each case after this many seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Python interpreter to use.
        #[arg(long)]
        interpreter: Option<String>,
        /// C++ compiler to use.
        #[arg(long)]
        compiler: Option<String>,
        /// Also write an HTML result page here.
        #[arg(long)]
        html: Option<PathBuf>,
        /// Print verdicts as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Print parsed bindings and serialized stdin for every declaration line.
    Inspect {
        #[arg(long, default_value = ".")]
        workspace: PathBuf,
    },
    /// Aggregate captured runs.
    Report {
        #[arg(long, default_value = ".")]
        workspace: PathBuf,
    },
    /// Remove captured runs, `output.txt` and the compiled artifact.
    Clean {
        #[arg(long, default_value = ".")]
        workspace: PathBuf,
    },
}

fn main() {
    harness::logging::init();
    let code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Run {
            solution,
            workspace,
            language,
            timeout_secs,
            interpreter,
            compiler,
            html,
            json,
        } => cli::run_command(RunArgs {
            solution: &solution,
            workspace: &workspace,
            language,
            overrides: ConfigOverrides {
                timeout_secs,
                interpreter,
                compiler,
            },
            html: html.as_deref(),
            json,
        }),
        Command::Inspect { workspace } => cli::inspect_command(&workspace),
        Command::Report { workspace } => cli::report_command(&workspace),
        Command::Clean { workspace } => cli::clean_command(&workspace),
    }
}
