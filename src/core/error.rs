// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for Folio
//!
//! This module defines the error type shared by every stage of the build
//! pipeline and the preview server. The `thiserror` crate is used to derive
//! `Display` and `Error` so that each variant carries its own message.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the Folio library.
///
/// This type alias simplifies function signatures by defining a result type that always uses `FolioError` as the error variant.
pub type Result<T> = std::result::Result<T, FolioError>;

/// The main error type for Folio, encompassing all potential error cases.
///
/// Build-phase errors (`TemplateNotFound`, `TemplateRenderError`, `IOError`,
/// `DuplicateOutput`) abort the build. `BindError` is raised by the preview
/// server when its port cannot be acquired.
#[derive(Error, Debug)]
pub enum FolioError {
    /// Error related to configuration loading or validation.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the file or directory that caused the error.
        path: Option<PathBuf>,
    },

    /// The requested template identifier is not registered with the renderer.
    #[error("Template not found: `{template}`.")]
    TemplateNotFound {
        /// The template identifier that failed to resolve.
        template: String,
    },

    /// A template failed to parse or to render against its context.
    ///
    /// Covers syntax errors and references to undefined variables.
    #[error("Template rendering error: {message} in template `{template}`.")]
    TemplateRenderError {
        /// Description of the template rendering error.
        message: String,
        /// The template identifier associated with the error.
        template: String,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error encountered while cleaning, copying or writing files.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Two build targets would write the same output file.
    #[error("Duplicate output path `{path:?}`: each page must be written by exactly one target.")]
    DuplicateOutput {
        /// The output path claimed more than once.
        path: PathBuf,
    },

    /// The preview server could not bind its listening socket.
    #[error("Failed to bind preview server on {address}: {source}")]
    BindError {
        /// The address the server attempted to bind.
        address: String,
        /// The underlying bind failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// General internal error.
    ///
    /// This variant represents miscellaneous errors that do not fall under
    /// any specific category.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for FolioError {
    /// Converts a standard IO error into a `FolioError::IOError` with an empty path.
    fn from(source: std::io::Error) -> Self {
        FolioError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl FolioError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the file or directory causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        FolioError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `TemplateNotFound` error for the given identifier.
    pub fn template_not_found<S: Into<String>>(template: S) -> Self {
        FolioError::TemplateNotFound {
            template: template.into(),
        }
    }

    /// Creates a `TemplateRenderError` with a message, template name, and optional source.
    ///
    /// # Parameters
    /// - `message`: A description of the template rendering error.
    /// - `template`: The template associated with the error.
    /// - `source`: An optional source error providing additional context.
    pub fn template_render_error<S: Into<String>>(
        message: S,
        template: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        FolioError::TemplateRenderError {
            message: message.into(),
            template,
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    ///
    /// # Parameters
    /// - `path`: The file path associated with the IO error.
    /// - `source`: The underlying IO error.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        FolioError::IOError { path, source }
    }

    /// Creates a general internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        FolioError::InternalError(message.into())
    }
}
