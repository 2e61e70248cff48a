// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Folio Library
//!
//! Folio renders a portfolio site from Handlebars templates and an in-code
//! content model. A build always starts from an empty output root, copies the
//! static assets, then writes one `index.html` per page. The result can be
//! previewed with the bundled static file server.
//!
//! ```rust,no_run
//! use folio::core::config::ConfigBuilder;
//! use folio::Folio;
//!
//! let config = ConfigBuilder::new().build().unwrap();
//! let report = Folio::from_config(config).unwrap().build().unwrap();
//! println!("wrote {} pages", report.pages.len());
//! ```

#![doc = include_str!("../README.md")]
#![crate_name = "folio"]
#![crate_type = "lib"]

use crate::content::site_context;
use crate::core::config::{validate_output_dir, Config};
use crate::generators::{build_page, build_targets, copy_assets, reset_output_dir};
use crate::template::HandlebarsRenderer;
use log::info;
use std::path::PathBuf;

pub use crate::core::error::{FolioError, Result};

/// Provides command-line interface utilities.
pub mod cli;

/// Provides the in-code content model.
pub mod content;

/// Module containing core utilities, such as configuration and error handling.
pub mod core;

/// Provides output generation utilities.
pub mod generators;

/// Provides the local preview server.
pub mod serve;

/// Provides template rendering utilities.
pub mod template;

/// Trait for template rendering implementations.
///
/// The build pipeline only needs to render a template by identifier and to
/// know whether an identifier exists.
pub trait TemplateRenderer: Send + Sync + std::fmt::Debug {
    /// Renders a template with the specified context.
    ///
    /// # Arguments
    /// * `template` - The template identifier.
    /// * `context` - The context data for rendering the template.
    ///
    /// # Returns
    /// * `Result<String>` - The rendered output. Fails with `TemplateNotFound`
    ///   for an unknown identifier and `TemplateRenderError` otherwise.
    fn render(
        &self,
        template: &str,
        context: &serde_json::Value,
    ) -> Result<String>;

    /// Returns `true` if `template` resolves to a registered template.
    fn has_template(&self, template: &str) -> bool;
}

/// Files produced by one build, relative to the output root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written, in build order.
    pub pages: Vec<PathBuf>,
    /// Asset files copied, relative to the assets output directory.
    pub assets: Vec<PathBuf>,
}

/// The build pipeline: clean, copy assets, render pages.
#[derive(Debug)]
pub struct Folio {
    config: Config,
    template_renderer: Box<dyn TemplateRenderer>,
}

impl Folio {
    /// Creates a new instance of `Folio`.
    pub fn new(
        config: Config,
        template_renderer: Box<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            config,
            template_renderer,
        }
    }

    /// Creates a pipeline that renders with templates from `config.template_dir`.
    pub fn from_config(config: Config) -> Result<Self> {
        let renderer = HandlebarsRenderer::new(&config.template_dir)?;
        Ok(Self::new(config, Box::new(renderer)))
    }

    /// The configuration this pipeline builds with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a full clean build.
    ///
    /// Fails with `ConfigError`, before anything is deleted, when the output
    /// root overlaps the template or assets directory. Any other error aborts
    /// the build and may leave the output root partially written; the next
    /// build starts from scratch again.
    pub fn build(&self) -> Result<BuildReport> {
        let output_dir = &self.config.output_dir;
        info!("Building site into {}", output_dir.display());
        validate_output_dir(&self.config)?;

        let site = site_context();
        let targets = build_targets(&site, self.template_renderer.as_ref())?;

        reset_output_dir(output_dir)?;
        let assets =
            copy_assets(&self.config.assets_dir, &self.config.assets_output_dir())?;

        let mut pages = Vec::with_capacity(targets.len());
        for target in &targets {
            build_page(
                self.template_renderer.as_ref(),
                &target.template,
                &output_dir.join(&target.output_path),
                &target.context,
            )?;
            info!("Built {}", target.output_path.display());
            pages.push(target.output_path.clone());
        }

        info!(
            "Built site -> {} ({} pages, {} assets)",
            output_dir.display(),
            pages.len(),
            assets.len()
        );
        Ok(BuildReport { pages, assets })
    }
}
