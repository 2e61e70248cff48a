// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Command-line interface for Folio
//!
//! Folio takes two options: `--port <PORT>` (default 8000) and `--serve`.
//! A run always builds the site; with `--serve` it then serves the output
//! root and tries to open a browser.
//!
//! # Examples
//!
//! ```
//! use folio::cli;
//!
//! let options = cli::parse_from(["folio", "--serve", "--port", "8123"]).unwrap();
//!
//! assert!(options.serve);
//! assert_eq!(options.port, 8123);
//! ```

use crate::core::config::{Config, ConfigBuilder, CONFIG_FILE_NAME, ENV_PREFIX};
use crate::serve::serve;
use crate::{Folio, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::debug;
use std::ffi::OsString;

/// The current version of Folio, as defined in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default port for the preview server.
pub const DEFAULT_PORT: u16 = 8000;

/// Parsed invocation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Port for the preview server.
    pub port: u16,
    /// Whether to serve the output after a successful build.
    pub serve: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            serve: false,
        }
    }
}

impl Options {
    /// Extracts the options from parsed matches.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            port: matches
                .get_one::<u16>("port")
                .copied()
                .unwrap_or(DEFAULT_PORT),
            serve: matches.get_flag("serve"),
        }
    }
}

/// Builds and configures the Folio command-line interface.
pub fn build() -> Command {
    Command::new("folio")
        .about("Builds the portfolio site and optionally serves it locally.")
        .version(VERSION)
        .arg(
            Arg::new("port")
                .long("port")
                .help("Port for local server")
                .value_name("PORT")
                .value_parser(value_parser!(u16))
                .default_value("8000"),
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Start local server after building")
                .action(ArgAction::SetTrue),
        )
}

/// Parses options from an explicit argument list.
pub fn parse_from<I, T>(args: I) -> std::result::Result<Options, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    build()
        .try_get_matches_from(args)
        .map(|matches| Options::from_matches(&matches))
}

/// Loads configuration from `folio.toml` (if present) and `FOLIO_*` variables.
pub fn load_config() -> Result<Config> {
    ConfigBuilder::new()
        .with_file(CONFIG_FILE_NAME)
        .with_env_prefix(ENV_PREFIX)
        .build()
}

/// Builds the site, then serves it if requested.
///
/// Returns once the build finishes, or once the server is interrupted.
pub fn run(options: Options, config: Config) -> Result<()> {
    debug!("Running with {:?} and {:?}", options, config);

    let folio = Folio::from_config(config)?;
    _ = folio.build()?;

    if options.serve {
        let config = folio.config();
        serve(
            &config.output_dir,
            &config.host,
            options.port,
            config.open_browser,
        )?;
    }

    Ok(())
}
