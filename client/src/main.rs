// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use clap::Parser;
use integration_client::client::Client;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Worker for the distributed integration of 1/ln(x).
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Coordinator host name or IP address
    server_ip: String,
    /// Coordinator TCP port
    server_port: u16,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!(
        "Client for distributed integration of 1/ln(x) (v{})",
        env!("CARGO_PKG_VERSION")
    );

    let mut client = Client::new(cli.server_ip, cli.server_port);
    match client.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("client error: {e}");
            ExitCode::FAILURE
        }
    }
}
