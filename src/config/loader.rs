//! Configuration loading and discovery for `bundlec.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::BundlecConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILENAME: &str = "bundlec.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse bundlec.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Replace the source roots
    pub sources: Option<Vec<PathBuf>>,
    /// Replace the output directory
    pub output: Option<PathBuf>,
    /// Additional excluded namespaces (merged with the file's)
    pub exclude: Vec<String>,
    /// Additional extensions (merged with the file's)
    pub extensions: Vec<String>,
    /// Override strict mode
    pub strict: Option<bool>,
    /// Override serialize-on-failure
    pub serialize_on_failure: Option<bool>,
    /// Override parallel enumeration
    pub parallel: Option<bool>,
}

/// Find bundlec.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find bundlec.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// With an explicit path, loads that file. Otherwise uses [`find_config`];
/// if nothing is found, returns the default (empty) configuration.
///
/// Relative paths in the file are resolved against the file's directory.
pub fn load_config(path: Option<&Path>) -> Result<BundlecConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(BundlecConfig::default()),
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<BundlecConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: BundlecConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let Some(root) = path.parent() {
        config.compile.sources =
            config.compile.sources.iter().map(|s| resolve_path(root, s)).collect();
        config.compile.output = config.compile.output.as_deref().map(|o| resolve_path(root, o));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// Scalar values replace the file's; namespace and extension lists are unioned.
pub fn merge_cli_overrides(config: &mut BundlecConfig, overrides: &CliOverrides) {
    if let Some(ref sources) = overrides.sources {
        config.compile.sources = sources.clone();
    }

    if let Some(ref output) = overrides.output {
        config.compile.output = Some(output.clone());
    }

    for namespace in &overrides.exclude {
        if !config.compile.exclude.contains(namespace) {
            config.compile.exclude.push(namespace.clone());
        }
    }

    for extension in &overrides.extensions {
        if !config.compile.extensions.contains(extension) {
            config.compile.extensions.push(extension.clone());
        }
    }

    if let Some(strict) = overrides.strict {
        config.compile.strict = strict;
    }
    if let Some(serialize_on_failure) = overrides.serialize_on_failure {
        config.compile.serialize_on_failure = serialize_on_failure;
    }
    if let Some(parallel) = overrides.parallel {
        config.compile.parallel = parallel;
    }
}

/// Split a comma-separated list of source directories.
///
/// Entries are trimmed; empty entries are dropped.
pub fn parse_source_list(list: &str) -> Vec<PathBuf> {
    parse_name_list(list).into_iter().map(PathBuf::from).collect()
}

/// Split a comma-separated list of names, trimming and dropping empties.
pub fn parse_name_list(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

/// Resolve a path relative to a base directory.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
