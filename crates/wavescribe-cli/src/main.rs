//! Wavescribe CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use wavescribe_cli::cli_args::{Cli, Commands};
use wavescribe_cli::commands;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Transcribe(args) => commands::transcribe::run(args),
        Commands::Inspect { input, json } => commands::inspect::run(input, *json),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
