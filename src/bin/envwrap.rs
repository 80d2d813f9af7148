//! Envwrap CLI Binary
//!
//! Command-line interface for inspecting environment overrides.

use clap::Parser;
use envwrap::logging::init_logging;
use envwrap::tooling::cli::{Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let logging = match cli.logging_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading settings: {:#}", e);
            process::exit(1);
        }
    };
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    let context = CliContext::new();
    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
