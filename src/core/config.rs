// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Configuration Module
//!
//! Resolves where templates, assets and generated output live, and how the
//! preview server presents itself. Values are layered, lowest precedence
//! first: built-in defaults, an optional TOML file, `FOLIO_`-prefixed
//! environment variables, then programmatic overrides.
//!
//! ## Example
//!
//! ```rust,no_run
//! use folio::core::config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .with_file("folio.toml")
//!     .with_env_prefix("FOLIO_")
//!     .with_override("output_dir", "public")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.output_dir, std::path::PathBuf::from("public"));
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::{FolioError, Result};

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "folio.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FOLIO_";

/// Build and preview settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_template_dir")]
    /// Root directory that template identifiers resolve against.
    pub template_dir: PathBuf,

    #[serde(default = "default_assets_dir")]
    /// Static asset tree copied to `<output_dir>/assets`. Optional on disk.
    pub assets_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    /// Output root, wiped and regenerated on every build.
    pub output_dir: PathBuf,

    #[serde(default = "default_host")]
    /// Host name the preview server binds to.
    pub host: String,

    #[serde(default = "default_true")]
    /// Whether `--serve` also tries to open the default browser.
    pub open_browser: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_dir: default_template_dir(),
            assets_dir: default_assets_dir(),
            output_dir: default_output_dir(),
            host: default_host(),
            open_browser: true,
        }
    }
}

impl Config {
    /// Validates the configuration, ensuring the directories it names are usable.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }

    /// Destination of the copied asset tree inside the output root.
    pub fn assets_output_dir(&self) -> PathBuf {
        self.output_dir.join("assets")
    }
}

/// Builds a `Config` from defaults, an optional file, the environment and overrides.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_file: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: HashMap<String, String>,
}

impl ConfigBuilder {
    /// Initialises a new `ConfigBuilder` instance with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a TOML configuration file. A missing file is not an error.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a prefix for environment variables to override configuration values.
    ///
    /// `FOLIO_OUTPUT_DIR=public` sets `output_dir` when the prefix is `FOLIO_`.
    pub fn with_env_prefix<S: Into<String>>(
        mut self,
        prefix: S,
    ) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Adds a key-value pair to override configuration values.
    pub fn with_override<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        _ = self.overrides.insert(key.into(), value.into());
        self
    }

    /// Builds the final configuration by applying all layers, then validates it.
    pub fn build(self) -> Result<Config> {
        let mut config = match self.config_file {
            Some(path) if path.exists() => load_from_file(&path)?,
            _ => Config::default(),
        };

        if let Some(prefix) = self.env_prefix {
            apply_env_overrides(&mut config, &prefix)?;
        }

        for (key, value) in &self.overrides {
            apply_config_value(&mut config, key, value)?;
        }

        config.validate()?;
        Ok(config)
    }
}

// Internal helper functions

fn load_from_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        FolioError::config_error(
            format!("Failed to read config file: {}", e),
            Some(path.to_path_buf()),
        )
    })?;

    toml::from_str(&content).map_err(|e| {
        FolioError::config_error(
            format!("Failed to parse config file: {}", e),
            Some(path.to_path_buf()),
        )
    })
}

fn apply_env_overrides(config: &mut Config, prefix: &str) -> Result<()> {
    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let config_key =
                stripped.trim_start_matches('_').to_lowercase();
            // Unrelated variables sharing the prefix are ignored.
            if is_known_key(&config_key) {
                apply_config_value(config, &config_key, &value)?;
            }
        }
    }
    Ok(())
}

fn is_known_key(key: &str) -> bool {
    matches!(
        key,
        "template_dir" | "assets_dir" | "output_dir" | "host" | "open_browser"
    )
}

fn apply_config_value(
    config: &mut Config,
    key: &str,
    value: &str,
) -> Result<()> {
    match key {
        "template_dir" => config.template_dir = PathBuf::from(value),
        "assets_dir" => config.assets_dir = PathBuf::from(value),
        "output_dir" => config.output_dir = PathBuf::from(value),
        "host" => {
            if value.trim().is_empty() {
                return Err(FolioError::config_error(
                    "Host cannot be empty",
                    None,
                ));
            }
            config.host = value.trim().to_string();
        }
        "open_browser" => {
            config.open_browser = value.parse().map_err(|e| {
                FolioError::config_error(
                    format!("Invalid open_browser value '{}': {}", value, e),
                    None,
                )
            })?;
        }
        _ => {
            return Err(FolioError::config_error(
                format!("Unknown configuration key: {}", key),
                None,
            ));
        }
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    validate_path(&config.template_dir, "template", true)?;
    validate_path(&config.assets_dir, "assets", false)?;
    validate_path(&config.output_dir, "output", false)?;
    validate_output_dir(config)
}

/// Rejects an output root that overlaps the template or assets directory.
///
/// Paths are compared after resolution, so `.`, `..` and symlinked spellings
/// are caught. The output root is wiped on every build, so it must neither
/// contain nor sit inside a source directory.
pub fn validate_output_dir(config: &Config) -> Result<()> {
    let output = resolve_path(&config.output_dir)?;

    for (name, source) in
        [("template", &config.template_dir), ("assets", &config.assets_dir)]
    {
        let source = resolve_path(source)?;
        if output.starts_with(&source) || source.starts_with(&output) {
            return Err(FolioError::config_error(
                format!(
                    "Output directory {} overlaps the {} directory {}",
                    config.output_dir.display(),
                    name,
                    source.display()
                ),
                Some(config.output_dir.clone()),
            ));
        }
    }

    Ok(())
}

/// Absolute, symlink-free form of `path`, which need not exist.
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// appended lexically.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map_err(|e| FolioError::io_error(path.to_path_buf(), e))?
            .join(path)
    };

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    let mut resolved = loop {
        match fs::canonicalize(existing) {
            Ok(resolved) => break resolved,
            Err(_) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    tail.push(name.to_os_string());
                    existing = parent;
                }
                // `..` as the last component or a missing root.
                _ => {
                    tail.clear();
                    break lexical_normalize(&absolute);
                }
            },
        }
    };

    for name in tail.iter().rev() {
        resolved.push(name);
    }
    Ok(lexical_normalize(&resolved))
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                _ = normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn validate_path(path: &Path, name: &str, must_exist: bool) -> Result<()> {
    if must_exist && !path.exists() {
        return Err(FolioError::config_error(
            format!("{} directory does not exist: {}", name, path.display()),
            Some(path.to_path_buf()),
        ));
    }

    if path.exists() && !path.is_dir() {
        return Err(FolioError::config_error(
            format!("{} path is not a directory: {}", name, path.display()),
            Some(path.to_path_buf()),
        ));
    }

    Ok(())
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_host() -> String {
    "localhost".to_string()
}

/// Tests for the configuration module.
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn builder_in(dir: &TempDir) -> ConfigBuilder {
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        ConfigBuilder::new()
            .with_override("template_dir", templates.display().to_string())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.template_dir, PathBuf::from("templates"));
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.output_dir, PathBuf::from("dist"));
        assert_eq!(config.host, "localhost");
        assert!(config.open_browser);
        assert_eq!(config.assets_output_dir(), PathBuf::from("dist/assets"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, "output_dir = 'public'\nopen_browser = false")
            .unwrap();

        let config = load_from_file(&config_file).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert!(!config.open_browser);
        assert_eq!(config.template_dir, PathBuf::from("templates"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, "output_dir = ").unwrap();

        let err = load_from_file(&config_file).unwrap_err();
        assert!(matches!(err, FolioError::ConfigError { .. }));
    }

    #[test]
    fn test_unknown_file_key_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, "minify = true").unwrap();

        let err = load_from_file(&config_file).unwrap_err();
        assert!(matches!(err, FolioError::ConfigError { .. }));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = builder_in(&temp_dir)
            .with_file(temp_dir.path().join("absent.toml"))
            .build()
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_missing_template_dir_validation() {
        let config = Config {
            template_dir: PathBuf::from("missing_templates"),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_output_dir_must_differ_from_templates() {
        let temp_dir = TempDir::new().unwrap();
        let templates = temp_dir.path().join("templates");
        let result = builder_in(&temp_dir)
            .with_override("output_dir", templates.display().to_string())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_output_dir_containing_sources_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let site = temp_dir.path().join("site");
        fs::create_dir_all(site.join("templates")).unwrap();
        fs::create_dir_all(site.join("assets")).unwrap();
        let config = Config {
            template_dir: site.join("templates"),
            assets_dir: site.join("assets"),
            output_dir: site.clone(),
            ..Config::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, FolioError::ConfigError { .. }));

        let dotted = Config {
            output_dir: site.join("templates").join(".."),
            ..config.clone()
        };
        assert!(dotted.validate().is_err());

        let nested = Config {
            output_dir: site.join("assets").join("dist"),
            ..config.clone()
        };
        assert!(nested.validate().is_err());

        let sibling = Config {
            output_dir: site.join("dist"),
            ..config
        };
        assert!(sibling.validate().is_ok());
    }

    #[test]
    fn test_current_dir_as_output_is_rejected() {
        // Unit tests run from the package root, which holds `templates/`.
        let config = Config {
            output_dir: PathBuf::from("."),
            ..Config::default()
        };
        assert!(validate_output_dir(&config).is_err());

        let spelled = Config {
            output_dir: PathBuf::from("./templates"),
            ..Config::default()
        };
        assert!(validate_output_dir(&spelled).is_err());
    }

    #[test]
    fn test_resolve_path_of_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        let missing = temp_dir.path().join("a").join(".").join("b");
        assert_eq!(resolve_path(&missing).unwrap(), root.join("a").join("b"));
    }

    #[test]
    fn test_overrides_take_precedence_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_file, "output_dir = 'public'").unwrap();

        let config = builder_in(&temp_dir)
            .with_file(&config_file)
            .with_override("output_dir", "site")
            .build()
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("site"));
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("FOLIO_TEST_ENV_OUTPUT_DIR", "env_output");
        env::set_var("FOLIO_TEST_ENV_OPEN_BROWSER", "false");
        env::set_var("FOLIO_TEST_ENV_UNRELATED", "ignored");
        let mut config = Config::default();

        apply_env_overrides(&mut config, "FOLIO_TEST_ENV").unwrap();
        assert_eq!(config.output_dir, PathBuf::from("env_output"));
        assert!(!config.open_browser);
    }

    #[test]
    fn test_invalid_bool_override() {
        let mut config = Config::default();
        let result = apply_config_value(&mut config, "open_browser", "maybe");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_key_override() {
        let mut config = Config::default();
        assert!(apply_config_value(&mut config, "minify", "true").is_err());
    }
}
