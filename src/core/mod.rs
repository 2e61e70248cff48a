/// The `config` module provides configuration handling
pub mod config;

/// The `error` module provides error handling
pub mod error;
