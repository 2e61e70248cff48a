// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Page Builder
//!
//! Derives the list of [`BuildTarget`]s from the content model and
//! materialises each one as an `index.html` under the output root.
//!
//! The home and work index pages are always built. Each entry of
//! `site.selected_work` whose URL is `/work/<slug>/` and for which a
//! `work/<slug>` template exists gets its own page; other entries are
//! reported as dead links.

use crate::content::{Site, WorkItem};
use crate::{FolioError, Result, TemplateRenderer};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Template identifier of the home page.
pub const HOME_TEMPLATE: &str = "index";
/// Template identifier of the work listing.
pub const WORK_TEMPLATE: &str = "work";
/// File name written for every page.
pub const INDEX_FILE: &str = "index.html";

/// Per-page metadata handed to templates as `page`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// Document title.
    pub title: String,
    /// Meta description, possibly empty.
    pub description: String,
}

impl Page {
    /// Creates a new `Page`.
    pub fn new<T: Into<String>, D: Into<String>>(title: T, description: D) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// One page to materialise: which template, where, and with what context.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildTarget {
    /// Template identifier.
    pub template: String,
    /// Output path relative to the output root.
    pub output_path: PathBuf,
    /// Render context (`site`, `page`, and page-specific extras).
    pub context: JsonValue,
}

impl BuildTarget {
    /// Creates a target whose context is `site` and `page`, plus `project` if given.
    pub fn new(
        template: &str,
        output_path: PathBuf,
        site: &Site,
        page: &Page,
        project: Option<&WorkItem>,
    ) -> Result<Self> {
        let checked = |value: serde_json::Result<JsonValue>| {
            value.map_err(|e| {
                FolioError::template_render_error(
                    format!("Failed to serialise page context: {}", e),
                    template.to_string(),
                    Some(Box::new(e)),
                )
            })
        };

        let mut context = Map::new();
        _ = context.insert("site".to_string(), checked(serde_json::to_value(site))?);
        _ = context.insert("page".to_string(), checked(serde_json::to_value(page))?);
        if let Some(project) = project {
            _ = context.insert(
                "project".to_string(),
                checked(serde_json::to_value(project))?,
            );
        }

        Ok(Self {
            template: template.to_string(),
            output_path,
            context: JsonValue::Object(context),
        })
    }
}

/// Output-relative path of the project page for `slug`.
pub fn project_output_path(slug: &str) -> PathBuf {
    Path::new("work").join(slug).join(INDEX_FILE)
}

/// Template identifier of the dedicated page for `slug`.
pub fn project_template(slug: &str) -> String {
    format!("{}/{}", WORK_TEMPLATE, slug)
}

/// Lists every page of the site, in build order.
///
/// Fails with `TemplateNotFound` if the home or work template is missing, and
/// with `DuplicateOutput` if two targets would write the same file.
pub fn build_targets(
    site: &Site,
    renderer: &dyn TemplateRenderer,
) -> Result<Vec<BuildTarget>> {
    for template in [HOME_TEMPLATE, WORK_TEMPLATE] {
        if !renderer.has_template(template) {
            return Err(FolioError::template_not_found(template));
        }
    }

    let mut targets = vec![
        BuildTarget::new(
            HOME_TEMPLATE,
            PathBuf::from(INDEX_FILE),
            site,
            &Page::new("Home", ""),
            None,
        )?,
        BuildTarget::new(
            WORK_TEMPLATE,
            Path::new("work").join(INDEX_FILE),
            site,
            &Page::new("Work", "Selected work"),
            None,
        )?,
    ];

    for item in &site.selected_work {
        let Some(slug) = item.slug() else {
            warn!("No project page for '{}': {} is outside /work/", item.title, item.url);
            continue;
        };
        let template = project_template(slug);
        if !renderer.has_template(&template) {
            warn!(
                "No project page for '{}': template '{}' not found, {} will be a dead link",
                item.title, template, item.url
            );
            continue;
        }
        let page = Page::new(item.title.as_str(), item.summary.as_str());
        targets.push(BuildTarget::new(
            &template,
            project_output_path(slug),
            site,
            &page,
            Some(item),
        )?);
    }

    let mut seen = HashSet::new();
    for target in &targets {
        if !seen.insert(target.output_path.as_path()) {
            return Err(FolioError::DuplicateOutput {
                path: target.output_path.clone(),
            });
        }
    }

    Ok(targets)
}

/// Renders `template_id` with `context` and writes the result to `output_path`.
///
/// Parent directories are created as needed and an existing file is
/// overwritten.
pub fn build_page(
    renderer: &dyn TemplateRenderer,
    template_id: &str,
    output_path: &Path,
    context: &JsonValue,
) -> Result<()> {
    let html = renderer.render(template_id, context)?;

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| FolioError::io_error(parent.to_path_buf(), e))?;
    }
    fs::write(output_path, html.as_bytes())
        .map_err(|e| FolioError::io_error(output_path.to_path_buf(), e))?;

    debug!("Wrote {} using template '{}'", output_path.display(), template_id);
    Ok(())
}
