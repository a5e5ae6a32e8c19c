// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Threshold — photo to black/white binarization with brush overrides.
//
// Entry point. Initialises logging, parses the command line, and hands over
// to the headless editor driver.

mod cli;
mod coordinator;
mod data_dir;

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Threshold starting");

    cli::run(cli::CliArgs::parse()).await
}
