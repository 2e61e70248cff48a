// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Folio CLI
//!
//! Entry point for the `folio` binary. Initialises the logger, builds the
//! site and, with `--serve`, previews it.

use anyhow::Context;
use folio::cli;

/// Parses arguments, loads configuration and runs the build.
fn run() -> anyhow::Result<()> {
    let options = cli::Options::from_matches(&cli::build().get_matches());
    let config =
        cli::load_config().context("Failed to load configuration")?;
    cli::run(options, config).context("Failed to build or serve site")?;
    Ok(())
}

/// The main entry point for the Folio CLI.
fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
