// src/main.rs
mod cli;
mod clock;
mod config;
mod engine;
mod error;
mod export;
mod models;
mod schema;
mod store;

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting passman");

    let cli_args = cli::Cli::parse();
    let config = config::load_config();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = cli::handle_cli_command(cli_args, &config, &clock::SystemClock, &mut out)
        .and_then(|()| out.flush().map_err(error::AppError::from));

    match result {
        Ok(()) => {
            log::info!("Command finished successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::debug!("Command failed: {:#?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
