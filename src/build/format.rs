//! Serialized registry formats.
//!
//! A [`RegistryFormat`] turns a fully resolved [`Registry`] into bytes. The
//! default [`JsonFormat`] writes `registries.json`:
//!
//! ```json
//! {
//!   "version": 1,
//!   "namespaces": {
//!     "acme": {
//!       "default_theme": "markup://acme:acmeTheme",
//!       "artifacts": [
//!         {
//!           "descriptor": "css://acme:Card",
//!           "name": "acme:Card",
//!           "kind": "style",
//!           "source": "acme/Card/Card.css",
//!           "root": 0,
//!           "digest": "9f86d0...",
//!           "size": 42,
//!           "themes": ["markup://acme:Card", "markup://acme:acmeTheme"]
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Output holds no timestamps or absolute paths, so the same registry always
//! serializes to the same bytes.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

use crate::config::default_file_name;
use crate::descriptor::DefKind;
use crate::registry::{CompiledArtifact, Registry};

/// Current registry format version.
pub const FORMAT_VERSION: u32 = 1;

/// Error while writing a serialized registry.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A serialization format for compiled registries.
pub trait RegistryFormat: Send + Sync {
    /// Name of the file written inside the output directory.
    fn file_name(&self) -> &str;

    /// Write `registry` to `out`.
    fn write(&self, registry: &Registry, out: &mut dyn Write) -> Result<(), FormatError>;
}

#[derive(Serialize)]
struct RegistryDocument<'a> {
    version: u32,
    namespaces: BTreeMap<&'a str, NamespaceDocument<'a>>,
}

#[derive(Serialize)]
struct NamespaceDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    default_theme: Option<String>,
    artifacts: Vec<ArtifactDocument<'a>>,
}

#[derive(Serialize)]
struct ArtifactDocument<'a> {
    descriptor: String,
    name: String,
    kind: DefKind,
    source: &'a str,
    root: usize,
    digest: &'a str,
    size: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    themes: Vec<String>,
}

impl<'a> ArtifactDocument<'a> {
    fn from_artifact(artifact: &'a CompiledArtifact) -> Self {
        Self {
            descriptor: artifact.descriptor.qualified_name(),
            name: artifact.descriptor.descriptor_name(),
            kind: artifact.descriptor.kind(),
            source: &artifact.relative_path,
            root: artifact.root_index,
            digest: &artifact.digest,
            size: artifact.size,
            themes: artifact.themes.iter().map(|t| t.qualified_name()).collect(),
        }
    }
}

fn document(registry: &Registry) -> RegistryDocument<'_> {
    let namespaces = registry
        .namespaces()
        .into_iter()
        .map(|ns| {
            let doc = NamespaceDocument {
                default_theme: registry.default_theme_of(ns).map(|d| d.qualified_name()),
                artifacts: registry.in_namespace(ns).map(ArtifactDocument::from_artifact).collect(),
            };
            (ns, doc)
        })
        .collect();

    RegistryDocument { version: FORMAT_VERSION, namespaces }
}

/// JSON registry format.
#[derive(Debug, Clone)]
pub struct JsonFormat {
    file_name: String,
    pretty: bool,
}

impl JsonFormat {
    /// Pretty-printed JSON written to `registries.json`.
    pub fn new() -> Self {
        Self { file_name: default_file_name(), pretty: true }
    }

    /// Set the output file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Set whether to pretty-print.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Serialize `registry` into a string.
    pub fn render(&self, registry: &Registry) -> Result<String, FormatError> {
        let mut buffer = Vec::new();
        self.write(registry, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryFormat for JsonFormat {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn write(&self, registry: &Registry, out: &mut dyn Write) -> Result<(), FormatError> {
        let doc = document(registry);
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &doc)?;
        } else {
            serde_json::to_writer(&mut *out, &doc)?;
        }
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Descriptor;
    use std::path::PathBuf;

    fn artifact(ns: &str, name: &str, kind: DefKind, themes: Vec<Descriptor>) -> CompiledArtifact {
        let ext = match kind {
            DefKind::Style => "css",
            DefKind::Theme => "theme",
            _ => "cmp",
        };
        let relative_path = format!("{ns}/{name}/{name}.{ext}");
        CompiledArtifact {
            descriptor: Descriptor::new(ns, name, kind).unwrap(),
            source: PathBuf::from("/abs/root").join(&relative_path),
            relative_path,
            root_index: 0,
            digest: "00ff".to_string(),
            size: 3,
            themes,
        }
    }

    fn sample() -> Registry {
        let mut registry = Registry::new();
        let local = Descriptor::new("acme", "Card", DefKind::Theme).unwrap();
        registry.insert(artifact("acme", "Card", DefKind::Style, vec![local])).unwrap();
        registry.insert(artifact("acme", "Card", DefKind::Theme, vec![])).unwrap();
        registry.insert(artifact("acme", "acmeTheme", DefKind::Theme, vec![])).unwrap();
        registry.insert(artifact("beta", "Button", DefKind::Component, vec![])).unwrap();
        registry
    }

    #[test]
    fn test_json_layout() {
        let json = JsonFormat::new().render(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 1);
        let acme = &value["namespaces"]["acme"];
        assert_eq!(acme["default_theme"], "markup://acme:acmeTheme");
        assert_eq!(acme["artifacts"].as_array().unwrap().len(), 3);

        let style = &acme["artifacts"][0];
        assert_eq!(style["descriptor"], "css://acme:Card");
        assert_eq!(style["kind"], "style");
        assert_eq!(style["source"], "acme/Card/Card.css");
        assert_eq!(style["themes"][0], "markup://acme:Card");

        let beta = &value["namespaces"]["beta"];
        assert!(beta.get("default_theme").is_none());
    }

    #[test]
    fn test_json_has_no_absolute_paths() {
        let json = JsonFormat::new().render(&sample()).unwrap();
        assert!(!json.contains("/abs/root"));
    }

    #[test]
    fn test_json_is_deterministic() {
        let format = JsonFormat::new().with_pretty(false);
        let first = format.render(&sample()).unwrap();
        let second = format.render(&sample()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let json = JsonFormat::new().with_pretty(false).render(&Registry::new()).unwrap();
        assert_eq!(json, "{\"version\":1,\"namespaces\":{}}\n");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(JsonFormat::new().file_name(), "registries.json");
        assert_eq!(JsonFormat::new().with_file_name("out.json").file_name(), "out.json");
    }
}
