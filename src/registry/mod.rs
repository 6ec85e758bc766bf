//! The compiled registry.
//!
//! This module provides:
//! - `Registry`, a descriptor-keyed, namespace-ordered map of compiled artifacts
//! - `CompiledArtifact`, the metadata recorded for one definition file
//! - `RegistryBuilder`, which turns an enumeration into a `Registry` while
//!   collecting duplicate and per-artifact errors
//!
//! Keys are unique: inserting a descriptor that is already present is an
//! error, never an overwrite.

mod builder;

pub use builder::{BuildOutcome, RegistryBuilder, UnresolvedReference};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::build::CompileError;
use crate::descriptor::Descriptor;
use crate::themes::namespace_default_theme_of;

/// Metadata recorded for one compiled definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    /// Identity of the definition
    pub descriptor: Descriptor,
    /// Full path of the source file
    pub source: PathBuf,
    /// Source path relative to its root, `/`-separated
    pub relative_path: String,
    /// Index of the source root in the run's root list
    pub root_index: usize,
    /// Hex SHA-256 of the file contents
    pub digest: String,
    /// File size in bytes
    pub size: u64,
    /// Theme descriptors this artifact resolved to (styles only)
    pub themes: Vec<Descriptor>,
}

/// Descriptor-keyed collection of compiled artifacts.
///
/// Iteration is ordered by namespace, then name, then kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<Descriptor, CompiledArtifact>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact under its descriptor.
    ///
    /// Fails with [`CompileError::DuplicateDescriptor`] if the descriptor is
    /// already present; the existing entry is kept.
    pub fn insert(&mut self, artifact: CompiledArtifact) -> Result<(), CompileError> {
        if let Some(existing) = self.entries.get(&artifact.descriptor) {
            return Err(CompileError::DuplicateDescriptor {
                descriptor: artifact.descriptor.clone(),
                first: existing.source.clone(),
                second: artifact.source,
            });
        }
        self.entries.insert(artifact.descriptor.clone(), artifact);
        Ok(())
    }

    /// Check if a descriptor is registered.
    pub fn contains(&self, descriptor: &Descriptor) -> bool {
        self.entries.contains_key(descriptor)
    }

    /// Get an artifact by descriptor.
    pub fn get(&self, descriptor: &Descriptor) -> Option<&CompiledArtifact> {
        self.entries.get(descriptor)
    }

    /// Source file of a registered descriptor.
    pub fn source_of(&self, descriptor: &Descriptor) -> Option<&Path> {
        self.entries.get(descriptor).map(|a| a.source.as_path())
    }

    pub(crate) fn set_themes(&mut self, descriptor: &Descriptor, themes: Vec<Descriptor>) {
        if let Some(artifact) = self.entries.get_mut(descriptor) {
            artifact.themes = themes;
        }
    }

    /// Number of registered artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all artifacts in descriptor order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledArtifact> {
        self.entries.values()
    }

    /// Iterate over all descriptors in order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.entries.keys()
    }

    /// Distinct namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self.entries.keys().map(|d| d.namespace()).collect();
        namespaces.dedup();
        namespaces
    }

    /// Artifacts of one namespace, in descriptor order.
    pub fn in_namespace<'a>(
        &'a self,
        namespace: &'a str,
    ) -> impl Iterator<Item = &'a CompiledArtifact> + 'a {
        self.entries.values().filter(move |a| a.descriptor.namespace() == namespace)
    }

    /// The registered default theme of a namespace, if there is one.
    pub fn default_theme_of(&self, namespace: &str) -> Option<&Descriptor> {
        let any = self.entries.keys().find(|d| d.namespace() == namespace)?;
        let theme = namespace_default_theme_of(any).ok()?;
        self.entries.get_key_value(&theme).map(|(key, _)| key)
    }
}
