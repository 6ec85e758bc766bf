//! Registry assembly from discovered artifacts.
//!
//! The builder consumes an enumeration once. Every problem is accumulated
//! rather than returned early, so one pass reports all duplicates and all
//! unreadable files. The first artifact seen for a descriptor is kept.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{CompiledArtifact, Registry};
use crate::build::{CompileError, DiscoveredArtifact, Discovery};
use crate::descriptor::{DefKind, Descriptor};
use crate::themes::{local_theme_of, namespace_default_theme_of};

/// A derived reference whose target is not in the registry.
///
/// These are informational only; they never fail a build.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnresolvedReference {
    /// The artifact holding the reference
    pub from: Descriptor,
    /// The descriptor it points at
    pub target: Descriptor,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} references {}, which is not in the registry", self.from, self.target)
    }
}

/// Everything a build pass produced.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Registry holding every artifact that compiled (first wins on duplicates)
    pub registry: Registry,
    /// Errors accumulated during the pass, in discovery order
    pub errors: Vec<CompileError>,
    /// Theme references that did not resolve
    pub unresolved: Vec<UnresolvedReference>,
    /// Number of artifacts the enumeration yielded
    pub discovered: usize,
}

impl BuildOutcome {
    /// Whether any accumulated error fails the build.
    pub fn has_fatal_errors(&self, strict: bool) -> bool {
        self.errors.iter().any(|e| e.is_fatal(strict))
    }

    /// Number of duplicate-descriptor errors.
    pub fn duplicate_count(&self) -> usize {
        self.errors.iter().filter(|e| matches!(e, CompileError::DuplicateDescriptor { .. })).count()
    }
}

/// Accumulates discovered artifacts into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
    /// First source seen for each descriptor, readable or not
    claimed: BTreeMap<Descriptor, PathBuf>,
    errors: Vec<CompileError>,
    discovered: usize,
}

impl RegistryBuilder {
    /// Create a builder with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every item of an enumeration.
    pub fn extend<I: IntoIterator<Item = Discovery>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }

    /// Add one enumeration item; errors are recorded.
    pub fn add(&mut self, item: Discovery) {
        match item {
            Ok(artifact) => self.add_artifact(artifact),
            Err(e) => self.errors.push(e),
        }
    }

    /// Derive the descriptor for an artifact, check for a collision, and
    /// register it.
    pub fn add_artifact(&mut self, artifact: DiscoveredArtifact) {
        self.discovered += 1;

        let descriptor = match Descriptor::new(&artifact.namespace, &artifact.name, artifact.kind) {
            Ok(d) => d,
            Err(e) => {
                self.errors.push(CompileError::Descriptor { path: artifact.path, source: e });
                return;
            }
        };

        if let Some(first) = self.claimed.get(&descriptor) {
            self.errors.push(CompileError::DuplicateDescriptor {
                descriptor,
                first: first.clone(),
                second: artifact.path,
            });
            return;
        }
        self.claimed.insert(descriptor.clone(), artifact.path.clone());

        let (digest, size) = match digest_file(&artifact.path) {
            Ok(d) => d,
            Err(e) => {
                self.errors.push(CompileError::SourceAccess { path: artifact.path, source: e });
                return;
            }
        };

        let compiled = CompiledArtifact {
            descriptor,
            relative_path: artifact.relative_path(),
            source: artifact.path,
            root_index: artifact.root_index,
            digest,
            size,
            themes: Vec::new(),
        };
        if let Err(e) = self.registry.insert(compiled) {
            self.errors.push(e);
        }
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// The registry built so far.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Finish the pass: resolve style theme references and hand back the outcome.
    pub fn finish(mut self) -> BuildOutcome {
        let mut unresolved = Vec::new();

        let styles: Vec<Descriptor> =
            self.registry.descriptors().filter(|d| d.kind() == DefKind::Style).cloned().collect();

        for style in styles {
            let mut themes: Vec<Descriptor> = Vec::new();
            for derived in [local_theme_of(&style), namespace_default_theme_of(&style)] {
                match derived {
                    Ok(theme) if self.registry.contains(&theme) => {
                        if !themes.contains(&theme) {
                            themes.push(theme);
                        }
                    }
                    Ok(theme) => {
                        unresolved.push(UnresolvedReference { from: style.clone(), target: theme })
                    }
                    Err(e) => {
                        let path = self
                            .registry
                            .source_of(&style)
                            .map(Path::to_path_buf)
                            .unwrap_or_default();
                        self.errors.push(CompileError::Descriptor { path, source: e });
                    }
                }
            }
            self.registry.set_themes(&style, themes);
        }

        unresolved.sort();
        unresolved.dedup();

        BuildOutcome {
            registry: self.registry,
            errors: self.errors,
            unresolved,
            discovered: self.discovered,
        }
    }
}

/// Hash a file, returning the hex SHA-256 digest and its size.
fn digest_file(path: &Path) -> io::Result<(String, u64)> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok((format!("{:x}", digest), bytes.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_artifact(
        root: &Path,
        root_index: usize,
        namespace: &str,
        name: &str,
        kind: DefKind,
        ext: &str,
        content: &str,
    ) -> DiscoveredArtifact {
        let path = root.join(namespace).join(name).join(format!("{}.{}", name, ext));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(&path).unwrap().write_all(content.as_bytes()).unwrap();
        DiscoveredArtifact {
            root_index,
            root: root.to_path_buf(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind,
            path,
        }
    }

    #[test]
    fn test_builds_registry_with_digest() {
        let temp = TempDir::new().unwrap();
        let mut builder = RegistryBuilder::new();
        builder.add_artifact(create_artifact(
            temp.path(),
            0,
            "myns",
            "Card",
            DefKind::Style,
            "css",
            ".card {}",
        ));

        let outcome = builder.finish();
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.discovered, 1);

        let desc = Descriptor::parse("myns:Card", DefKind::Style).unwrap();
        let artifact = outcome.registry.get(&desc).unwrap();
        assert_eq!(artifact.relative_path, "myns/Card/Card.css");
        assert_eq!(artifact.size, 8);
        assert_eq!(artifact.digest.len(), 64);
    }

    #[test]
    fn test_duplicate_across_roots_reports_both_and_first_wins() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let first = create_artifact(a.path(), 0, "acme", "Widget", DefKind::Component, "cmp", "a");
        let second =
            create_artifact(b.path(), 1, "acme", "Widget", DefKind::Component, "cmp", "b");
        let (first_path, second_path) = (first.path.clone(), second.path.clone());

        let mut builder = RegistryBuilder::new();
        builder.extend(vec![Ok(first), Ok(second)]);
        let outcome = builder.finish();

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.duplicate_count(), 1);
        match &outcome.errors[0] {
            CompileError::DuplicateDescriptor { first, second, .. } => {
                assert_eq!(first, &first_path);
                assert_eq!(second, &second_path);
            }
            other => panic!("unexpected error: {}", other),
        }

        let desc = Descriptor::parse("acme:Widget", DefKind::Component).unwrap();
        assert_eq!(outcome.registry.get(&desc).unwrap().root_index, 0);
        assert!(outcome.has_fatal_errors(false));
    }

    #[test]
    fn test_reports_all_duplicates() {
        let roots: Vec<TempDir> = (0..3).map(|_| TempDir::new().unwrap()).collect();
        let mut builder = RegistryBuilder::new();
        for (i, root) in roots.iter().enumerate() {
            for name in ["A", "B"] {
                builder.add_artifact(create_artifact(
                    root.path(),
                    i,
                    "x",
                    name,
                    DefKind::Event,
                    "evt",
                    "",
                ));
            }
        }
        let outcome = builder.finish();
        assert_eq!(outcome.duplicate_count(), 4);
        assert_eq!(outcome.registry.len(), 2);
    }

    #[test]
    fn test_invalid_descriptor_is_recorded() {
        let temp = TempDir::new().unwrap();
        let mut artifact =
            create_artifact(temp.path(), 0, "acme", "Card", DefKind::Component, "cmp", "");
        artifact.name = "Ca:rd".to_string();

        let mut builder = RegistryBuilder::new();
        builder.add_artifact(artifact);
        let outcome = builder.finish();

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].category(), "invalid_descriptor_format");
        assert!(outcome.registry.is_empty());
    }

    #[test]
    fn test_unreadable_source_is_non_fatal() {
        let temp = TempDir::new().unwrap();
        let artifact =
            create_artifact(temp.path(), 0, "acme", "Gone", DefKind::Component, "cmp", "");
        fs::remove_file(&artifact.path).unwrap();

        let mut builder = RegistryBuilder::new();
        builder.add_artifact(artifact);
        let outcome = builder.finish();

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].category(), "source_access");
        assert!(!outcome.has_fatal_errors(false));
        assert!(outcome.has_fatal_errors(true));
    }

    #[test]
    fn test_unreadable_first_copy_still_claims_descriptor() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let first = create_artifact(a.path(), 0, "acme", "Widget", DefKind::Component, "cmp", "a");
        let second =
            create_artifact(b.path(), 1, "acme", "Widget", DefKind::Component, "cmp", "b");
        fs::remove_file(&first.path).unwrap();
        let (first_path, second_path) = (first.path.clone(), second.path.clone());

        let mut builder = RegistryBuilder::new();
        builder.extend(vec![Ok(first), Ok(second)]);
        let outcome = builder.finish();

        let categories: Vec<_> = outcome.errors.iter().map(|e| e.category()).collect();
        assert_eq!(categories, vec!["source_access", "duplicate_descriptor"]);
        match &outcome.errors[1] {
            CompileError::DuplicateDescriptor { first, second, .. } => {
                assert_eq!(first, &first_path);
                assert_eq!(second, &second_path);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(outcome.registry.is_empty());
        assert!(outcome.has_fatal_errors(false));
    }

    #[test]
    fn test_enumeration_errors_are_collected() {
        let mut builder = RegistryBuilder::new();
        builder.add(Err(CompileError::SourceAccess {
            path: PathBuf::from("/locked"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }));
        assert_eq!(builder.errors().len(), 1);
        assert_eq!(builder.finish().discovered, 0);
    }

    #[test]
    fn test_style_themes_resolved_when_present() {
        let temp = TempDir::new().unwrap();
        let mut builder = RegistryBuilder::new();
        let root = temp.path();
        builder.add_artifact(create_artifact(root, 0, "acme", "Card", DefKind::Style, "css", ""));
        builder.add_artifact(create_artifact(root, 0, "acme", "Card", DefKind::Theme, "theme", ""));
        builder.add_artifact(create_artifact(
            root,
            0,
            "acme",
            "acmeTheme",
            DefKind::Theme,
            "theme",
            "",
        ));

        let outcome = builder.finish();
        assert!(outcome.unresolved.is_empty());

        let style = Descriptor::parse("acme:Card", DefKind::Style).unwrap();
        let themes: Vec<_> =
            outcome.registry.get(&style).unwrap().themes.iter().map(|t| t.name()).collect();
        assert_eq!(themes, vec!["Card", "acmeTheme"]);
    }

    #[test]
    fn test_missing_themes_reported_not_required() {
        let temp = TempDir::new().unwrap();
        let mut builder = RegistryBuilder::new();
        builder.add_artifact(create_artifact(
            temp.path(),
            0,
            "myns",
            "Card",
            DefKind::Style,
            "css",
            "",
        ));

        let outcome = builder.finish();
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.registry.len(), 1);

        let targets: Vec<_> = outcome.unresolved.iter().map(|u| u.target.name()).collect();
        assert_eq!(targets, vec!["Card", "mynsTheme"]);
        assert!(outcome.unresolved[0].to_string().contains("not in the registry"));
    }

    #[test]
    fn test_default_theme_style_not_reported_twice() {
        let temp = TempDir::new().unwrap();
        let mut builder = RegistryBuilder::new();
        builder.add_artifact(create_artifact(
            temp.path(),
            0,
            "ui",
            "uiTheme",
            DefKind::Style,
            "css",
            "",
        ));

        let outcome = builder.finish();
        assert_eq!(outcome.unresolved.len(), 1);
    }
}
