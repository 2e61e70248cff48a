// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Template Rendering Module
//!
//! Handlebars-backed implementation of [`TemplateRenderer`].
//!
//! ## Features
//!
//! - Recursive discovery of `*.hbs` files under a template root
//! - Identifiers derived from relative paths (`work/crosby.hbs` → `work/crosby`)
//! - HTML escaping of every `{{expression}}`; `{{{raw}}}` opts out
//! - Strict mode, so a reference to an undefined variable is an error
//! - Custom helper registration

use crate::{FolioError, Result, TemplateRenderer};
use handlebars::{
    Context, Handlebars, Helper, Output, RenderContext, RenderError,
    RenderErrorReason,
};
use log::debug;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// File extension of template sources.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// Represents a custom template helper with helper name and execution.
pub trait TemplateHelper: Send + Sync {
    /// Executes the helper with the given parameters and context.
    fn execute(
        &self,
        params: &[JsonValue],
        context: &JsonValue,
    ) -> Result<JsonValue>;

    /// Returns the name of the helper for registration.
    fn name(&self) -> &str;
}

/// Renderer for Handlebars templates loaded from a template root.
#[derive(Clone)]
pub struct HandlebarsRenderer {
    engine: Arc<RwLock<Handlebars<'static>>>,
    template_dir: Option<PathBuf>,
}

impl std::fmt::Debug for HandlebarsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsRenderer")
            .field("template_dir", &self.template_dir)
            .field("templates", &self.template_names())
            .finish()
    }
}

impl HandlebarsRenderer {
    /// Creates a renderer and registers every template under `template_dir`.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let mut renderer = Self::empty();
        renderer.template_dir = Some(template_dir.to_path_buf());
        renderer.load_templates(template_dir)?;
        Ok(renderer)
    }

    /// Creates a renderer with no templates registered.
    pub fn empty() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::html_escape);

        let renderer = Self {
            engine: Arc::new(RwLock::new(handlebars)),
            template_dir: None,
        };
        renderer.with_helper(helpers::JoinHelper)
    }

    /// Registers a custom helper under its own name.
    pub fn with_helper<H>(self, helper: H) -> Self
    where
        H: TemplateHelper + 'static,
    {
        let name = helper.name().to_string();
        self.register_helper(&name, helper);
        self
    }

    /// Registers an in-memory template under `name`.
    pub fn with_template(self, name: &str, source: &str) -> Result<Self> {
        self.register_template(name, source)?;
        Ok(self)
    }

    /// Identifiers of all registered templates, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.engine.read().get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    fn register_template(&self, name: &str, source: &str) -> Result<()> {
        self.engine
            .write()
            .register_template_string(name, source)
            .map_err(|e| {
                FolioError::template_render_error(
                    format!("Failed to register template: {}", e),
                    name.to_string(),
                    Some(Box::new(e)),
                )
            })
    }

    /// Walks the template root and registers each `.hbs` file.
    fn load_templates(&self, template_dir: &Path) -> Result<()> {
        for entry in WalkDir::new(template_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| template_dir.to_path_buf());
                FolioError::io_error(path, e.into())
            })?;
            let path = entry.path();

            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str())
                    != Some(TEMPLATE_EXTENSION)
            {
                continue;
            }

            let name = template_name(template_dir, path).ok_or_else(|| {
                FolioError::template_render_error(
                    "Invalid template filename",
                    path.display().to_string(),
                    None,
                )
            })?;

            let source = std::fs::read_to_string(path)
                .map_err(|e| FolioError::io_error(path.to_path_buf(), e))?;

            self.register_template(&name, &source)?;
            debug!("Registered template '{}' from {}", name, path.display());
        }
        Ok(())
    }

    /// Registers a helper function with the Handlebars engine.
    fn register_helper<H>(&self, name: &str, helper: H)
    where
        H: TemplateHelper + 'static,
    {
        let helper_fn = move |h: &Helper,
                              _: &Handlebars,
                              ctx: &Context,
                              _: &mut RenderContext,
                              out: &mut dyn Output|
              -> std::result::Result<(), RenderError> {
            let params: Vec<JsonValue> =
                h.params().iter().map(|p| p.value().clone()).collect();

            let result =
                helper.execute(&params, ctx.data()).map_err(|e| {
                    RenderError::from(RenderErrorReason::Other(
                        e.to_string(),
                    ))
                })?;
            // Helper output bypasses the escape function.
            let text = match result {
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            out.write(&handlebars::html_escape(&text))?;
            Ok(())
        };

        self.engine
            .write()
            .register_helper(name, Box::new(helper_fn));
    }
}

/// Converts `<root>/work/crosby.hbs` into `work/crosby`.
fn template_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> =
        relative.components().map(|c| c.as_os_str().to_str()).collect();
    let parts = parts?;
    (!parts.is_empty()).then(|| parts.join("/"))
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(
        &self,
        template: &str,
        context: &JsonValue,
    ) -> Result<String> {
        if !self.has_template(template) {
            return Err(FolioError::template_not_found(template));
        }

        self.engine.read().render(template, context).map_err(|e| {
            FolioError::template_render_error(
                format!("Template rendering failed: {}", e),
                template.to_string(),
                Some(Box::new(e)),
            )
        })
    }

    fn has_template(&self, template: &str) -> bool {
        self.engine.read().has_template(template)
    }
}

/// Built-in helpers for template processing.
pub mod helpers {
    use super::*;

    /// Joins an array of strings: `{{join project.tags " · "}}`.
    ///
    /// The separator defaults to `", "`.
    #[derive(Debug, Clone, Copy)]
    pub struct JoinHelper;

    impl TemplateHelper for JoinHelper {
        fn execute(
            &self,
            params: &[JsonValue],
            _context: &JsonValue,
        ) -> Result<JsonValue> {
            let items = params
                .first()
                .and_then(JsonValue::as_array)
                .ok_or_else(|| {
                    FolioError::template_render_error(
                        "join helper requires an array parameter",
                        self.name().to_string(),
                        None,
                    )
                })?;
            let separator =
                params.get(1).and_then(JsonValue::as_str).unwrap_or(", ");
            let joined = items
                .iter()
                .map(|item| match item {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(separator);
            Ok(JsonValue::String(joined))
        }

        fn name(&self) -> &str {
            "join"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_escapes_html_in_context_strings() -> Result<()> {
        let renderer = HandlebarsRenderer::empty()
            .with_template("t", "<p>{{site.name}}</p>")?;
        let out =
            renderer.render("t", &json!({ "site": { "name": "<b>A & B</b>" } }))?;
        assert_eq!(out, "<p>&lt;b&gt;A &amp; B&lt;/b&gt;</p>");
        assert!(!out.contains("<b>"));
        Ok(())
    }

    #[test]
    fn test_triple_stash_is_raw() -> Result<()> {
        let renderer =
            HandlebarsRenderer::empty().with_template("t", "{{{html}}}")?;
        let out = renderer.render("t", &json!({ "html": "<em>x</em>" }))?;
        assert_eq!(out, "<em>x</em>");
        Ok(())
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let renderer = HandlebarsRenderer::empty();
        let err = renderer.render("nope", &json!({})).unwrap_err();
        assert!(matches!(err, FolioError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_undefined_variable_is_render_error() -> Result<()> {
        let renderer = HandlebarsRenderer::empty()
            .with_template("t", "{{page.missing}}")?;
        let err = renderer
            .render("t", &json!({ "page": { "title": "Home" } }))
            .unwrap_err();
        assert!(matches!(err, FolioError::TemplateRenderError { .. }));
        Ok(())
    }

    #[test]
    fn test_syntax_error_is_render_error() {
        let err = HandlebarsRenderer::empty()
            .with_template("t", "{{#if page}}unclosed")
            .unwrap_err();
        assert!(matches!(err, FolioError::TemplateRenderError { .. }));
    }

    #[test]
    fn test_join_helper_escapes_output() -> Result<()> {
        let renderer = HandlebarsRenderer::empty()
            .with_template("t", "{{join tags \" / \"}}|{{join tags}}")?;
        let out = renderer.render("t", &json!({ "tags": ["UX", "R&D"] }))?;
        assert_eq!(out, "UX / R&amp;D|UX, R&amp;D");
        Ok(())
    }

    #[test]
    fn test_loads_nested_templates_and_partials() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("work"))?;
        fs::write(root.join("_head.hbs"), "<title>{{page.title}}</title>")?;
        fs::write(root.join("index.hbs"), "{{> _head}}home")?;
        fs::write(root.join("work").join("crosby.hbs"), "crosby")?;
        fs::write(root.join("notes.txt"), "ignored")?;

        let renderer = HandlebarsRenderer::new(root)?;
        assert_eq!(
            renderer.template_names(),
            ["_head", "index", "work/crosby"]
        );
        assert!(renderer.has_template("work/crosby"));
        assert!(!renderer.has_template("notes"));

        let out = renderer
            .render("index", &json!({ "page": { "title": "Home" } }))?;
        assert_eq!(out, "<title>Home</title>home");
        Ok(())
    }

    #[test]
    fn test_template_name_uses_forward_slashes() {
        let root = Path::new("templates");
        let path = root.join("work").join("project-two.hbs");
        assert_eq!(
            template_name(root, &path).as_deref(),
            Some("work/project-two")
        );
    }
}
