//! Configuration schema types for `bundlec.toml`
//!
//! Defines the structure and validation rules for a compilation run's
//! configuration file. Unknown keys are ignored so a file shared with other
//! tooling still loads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::descriptor::SEPARATOR;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundlecConfig {
    /// What to compile
    #[serde(default)]
    pub compile: CompileConfig,
    /// How to write the registry
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[compile]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Source roots, in priority order
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Namespaces skipped during enumeration
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Publish the registry even when the build reported errors
    #[serde(default)]
    pub serialize_on_failure: bool,
    /// Treat unreadable sources as fatal
    #[serde(default)]
    pub strict: bool,
    /// Enumerate source roots in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Names of extensions to enable
    #[serde(default)]
    pub extensions: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            output: None,
            exclude: Vec::new(),
            serialize_on_failure: false,
            strict: false,
            parallel: default_parallel(),
            extensions: Vec::new(),
        }
    }
}

fn default_parallel() -> bool {
    true
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// File name of the serialized registry inside the output directory
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Pretty-print the JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { file_name: default_file_name(), pretty: default_pretty() }
    }
}

/// Default registry file name.
pub fn default_file_name() -> String {
    "registries.json".to_string()
}

fn default_pretty() -> bool {
    true
}

/// A single problem found while validating a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "compile.exclude")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bundlec.toml: '{}' {}", self.field, self.message)
    }
}

impl BundlecConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        for (i, source) in self.compile.sources.iter().enumerate() {
            if source.as_os_str().is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("compile.sources[{}]", i),
                    message: "must be a non-empty path".to_string(),
                });
            }
        }

        for namespace in &self.compile.exclude {
            if namespace.trim().is_empty() || namespace.contains(SEPARATOR) {
                errors.push(ConfigValidationError {
                    field: "compile.exclude".to_string(),
                    message: format!("'{}' is not a valid namespace", namespace),
                });
            }
        }

        let file_name = &self.output.file_name;
        if file_name.is_empty() || file_name.contains('/') || file_name.contains('\\') {
            errors.push(ConfigValidationError {
                field: "output.file_name".to_string(),
                message: "must be a plain file name".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: BundlecConfig = toml::from_str("").unwrap();

        assert!(config.compile.sources.is_empty());
        assert!(config.compile.output.is_none());
        assert!(config.compile.parallel);
        assert!(!config.compile.strict);
        assert_eq!(config.output.file_name, "registries.json");
        assert!(config.output.pretty);
        assert!(config.is_valid());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[compile]
sources = ["components", "modules"]
output = "build/registry"
exclude = ["test", "samples"]
serialize_on_failure = true
strict = true
parallel = false
extensions = ["modules"]

[output]
file_name = "components.json"
pretty = false
"#;
        let config: BundlecConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.compile.sources.len(), 2);
        assert_eq!(config.compile.output, Some(PathBuf::from("build/registry")));
        assert_eq!(config.compile.exclude, vec!["test", "samples"]);
        assert!(config.compile.serialize_on_failure);
        assert!(config.compile.strict);
        assert!(!config.compile.parallel);
        assert_eq!(config.compile.extensions, vec!["modules"]);
        assert_eq!(config.output.file_name, "components.json");
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_unknown_keys_tolerated() {
        let toml = r#"
[compile]
sources = ["src"]
host_bootstrap = ["com.example.Extra"]

[deploy]
target = "cdn"
"#;
        let config: BundlecConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.compile.sources, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_validation_bad_exclude() {
        let toml = r#"
[compile]
exclude = ["ok", "", "a:b"]
"#;
        let config: BundlecConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert_eq!(errors.iter().filter(|e| e.field == "compile.exclude").count(), 2);
    }

    #[test]
    fn test_validation_file_name() {
        let toml = r#"
[output]
file_name = "nested/registries.json"
"#;
        let config: BundlecConfig = toml::from_str(toml).unwrap();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "output.file_name"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "output.file_name".to_string(),
            message: "must be a plain file name".to_string(),
        };
        assert_eq!(err.to_string(), "bundlec.toml: 'output.file_name' must be a plain file name");
    }
}
