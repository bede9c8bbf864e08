// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{bail, Context};
use clap::Parser;
use integration_core::params::IntegrationParameters;
use integration_server::input_handler::InputHandler;
use integration_server::server::{JobOutcome, Server};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Coordinator for the distributed integration of 1/ln(x).
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TCP port to listen on for workers
    #[arg(long, default_value_t = 5555)]
    port: u16,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    println!(
        "Server for distributed integration of 1/ln(x) (v{})",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let lower_limit = prompt_for(&mut lines, "Enter a lower integration limit: ")?;
    let upper_limit = prompt_for(&mut lines, "Enter an upper integration limit: ")?;
    let step = prompt_for(&mut lines, "Enter integration step size: ")?;
    drop(lines);

    let params = IntegrationParameters::new(lower_limit, upper_limit, step);
    let server = Arc::new(Server::new(cli.port));

    let ctrlc_server = server.clone();
    ctrlc::set_handler(move || {
        println!("\nCtrl+C received, shutting down");
        ctrlc_server.shutdown();
    })
    .context("failed to install Ctrl+C handler")?;

    let mut input_handler = InputHandler::new();
    let start_server = server.clone();
    input_handler.start(move || start_server.request_start());

    println!("========================================");
    println!("Waiting for workers to connect...");
    println!("Type 'START' and press Enter to begin integration");
    println!("========================================");

    match server.run(&params)? {
        Some(outcome) => {
            input_handler.stop();
            print_final_result(&outcome, &params);
            Ok(())
        }
        None => {
            input_handler.stop();
            println!("Server stopped before START");
            Ok(())
        }
    }
}

fn prompt_for(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    prompt: &str,
) -> anyhow::Result<f64> {
    loop {
        print!("{prompt}");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            bail!("unexpected end of input while reading parameters");
        };

        match line?.trim().parse::<f64>() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Invalid input. Please enter a number."),
        }
    }
}

fn print_final_result(outcome: &JobOutcome, params: &IntegrationParameters) {
    println!("========================================");
    println!("       INTEGRATION COMPLETED");
    println!("========================================");
    println!(
        "Integral of 1/ln(x) from {} to {}",
        params.lower_limit, params.upper_limit
    );
    println!("Result = {:.15}", outcome.final_result);
    if !outcome.completed {
        println!(
            "WARNING: only {}/{} results arrived before the timeout; this is a partial sum",
            outcome.received_results, outcome.expected_results
        );
    }
    if outcome.failed_results > 0 {
        println!(
            "WARNING: {} of {} tasks failed on workers",
            outcome.failed_results, outcome.expected_results
        );
    }
    println!("========================================");
}
