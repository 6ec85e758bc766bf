//! Source artifact discovery.
//!
//! Walks source roots laid out as `<root>/<namespace>/<bundle>/<bundle>.<ext>`
//! and yields one [`DiscoveredArtifact`] per definition file whose extension
//! is in the [`KindTable`]. Roots are visited in the order given, which is the
//! tie-break when two roots define the same descriptor.

use glob::{glob, Pattern};
use rayon::prelude::*;
use std::collections::{BTreeSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use crate::build::{CompileError, KindTable};
use crate::descriptor::{DefKind, DescriptorError};

/// A definition file found under a source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredArtifact {
    /// Position of the root in the caller's list
    pub root_index: usize,
    /// The source root the file was found under
    pub root: PathBuf,
    /// Namespace directory name
    pub namespace: String,
    /// Bundle directory name
    pub name: String,
    /// Kind selected by the file extension
    pub kind: DefKind,
    /// Full path to the file
    pub path: PathBuf,
}

impl DiscoveredArtifact {
    /// Path of the file relative to its root, with `/` separators.
    ///
    /// Built from the layout parts, so it does not depend on how the root
    /// was spelled.
    pub fn relative_path(&self) -> String {
        let file_name = self.path.file_name().map(|f| f.to_string_lossy()).unwrap_or_default();
        format!("{}/{}/{}", self.namespace, self.name, file_name)
    }
}

/// One item of an enumeration: an artifact, or a per-path error.
pub type Discovery = Result<DiscoveredArtifact, CompileError>;

/// Check that every source root exists and can be listed.
///
/// This is the pre-flight step; any failure here is fatal for the run.
pub fn check_source_roots(roots: &[PathBuf]) -> Result<(), CompileError> {
    if roots.is_empty() {
        return Err(CompileError::NoSourceDirectories);
    }

    for root in roots {
        let invalid = |reason: String| CompileError::InvalidSourceDirectory {
            path: root.clone(),
            reason,
        };
        let metadata = fs::metadata(root).map_err(|e| invalid(e.to_string()))?;
        if !metadata.is_dir() {
            return Err(invalid("not a directory".to_string()));
        }
        fs::read_dir(root).map_err(|e| invalid(e.to_string()))?;
    }

    Ok(())
}

/// Dot-prefixed entries are never namespaces or bundles.
fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn child_pattern(dir: &Path, suffix: &str) -> String {
    format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), suffix)
}

/// Files of one namespace still being walked.
struct NamespaceFiles {
    root_index: usize,
    root: PathBuf,
    namespace: String,
    paths: glob::Paths,
}

/// Lazy, single-pass enumeration of artifacts across source roots.
pub struct SourceEnumerator {
    kinds: KindTable,
    excluded: BTreeSet<String>,
    roots: VecDeque<(usize, PathBuf)>,
    namespaces: VecDeque<(usize, PathBuf, String, PathBuf)>,
    files: Option<NamespaceFiles>,
    pending: VecDeque<CompileError>,
}

impl std::fmt::Debug for SourceEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEnumerator")
            .field("roots", &self.roots)
            .field("excluded", &self.excluded)
            .finish()
    }
}

impl SourceEnumerator {
    /// Enumerate `roots` in order, skipping namespaces in `excluded`.
    pub fn new(roots: &[PathBuf], excluded: &BTreeSet<String>, kinds: &KindTable) -> Self {
        Self {
            kinds: kinds.clone(),
            excluded: excluded.clone(),
            roots: roots.iter().cloned().enumerate().collect(),
            namespaces: VecDeque::new(),
            files: None,
            pending: VecDeque::new(),
        }
    }

    /// Enumerate a single root that sits at `root_index` in the caller's list.
    fn for_root(
        root_index: usize,
        root: &Path,
        excluded: &BTreeSet<String>,
        kinds: &KindTable,
    ) -> Self {
        let mut enumerator = Self::new(&[], excluded, kinds);
        enumerator.roots.push_back((root_index, root.to_path_buf()));
        enumerator
    }

    /// Queue the non-excluded namespace directories of a root.
    fn open_root(&mut self, root_index: usize, root: PathBuf) {
        let pattern = child_pattern(&root, "*");
        let entries = match glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                self.pending.push_back(CompileError::InvalidSourceDirectory {
                    path: root,
                    reason: e.to_string(),
                });
                return;
            }
        };

        for entry in entries {
            match entry {
                Ok(path) if path.is_dir() => {
                    let Some(namespace) = path.file_name().and_then(|n| n.to_str()) else {
                        continue;
                    };
                    if is_hidden(namespace) || self.excluded.contains(namespace) {
                        continue;
                    }
                    let namespace = namespace.to_string();
                    self.namespaces.push_back((root_index, root.clone(), namespace, path));
                }
                Ok(_) => {}
                Err(e) => self.pending.push_back(glob_error(e)),
            }
        }

        for path in non_utf8_dirs(&root) {
            self.pending.push_back(non_utf8(&path, "namespace"));
        }
    }

    /// Start walking the bundle files of one namespace.
    fn open_namespace(
        &mut self,
        root_index: usize,
        root: PathBuf,
        namespace: String,
        dir: PathBuf,
    ) {
        for path in non_utf8_dirs(&dir) {
            self.pending.push_back(non_utf8(&path, "bundle name"));
        }

        let pattern = child_pattern(&dir, "*/*");
        match glob(&pattern) {
            Ok(paths) => self.files = Some(NamespaceFiles { root_index, root, namespace, paths }),
            Err(e) => self.pending.push_back(CompileError::SourceAccess {
                path: dir,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()),
            }),
        }
    }

    /// Turn a bundle file into an artifact, if it is a definition file.
    ///
    /// Glob only yields UTF-8 names; the others are reported by
    /// [`non_utf8_dirs`] when their directory is opened.
    fn classify(&self, files: &NamespaceFiles, path: PathBuf) -> Option<DiscoveredArtifact> {
        let bundle = path.parent()?.file_name()?.to_str()?;
        let stem = path.file_stem()?.to_str()?;
        if stem != bundle || is_hidden(bundle) {
            return None;
        }
        let kind = self.kinds.kind_for(path.extension()?.to_str()?)?;

        Some(DiscoveredArtifact {
            root_index: files.root_index,
            root: files.root.clone(),
            namespace: files.namespace.clone(),
            name: bundle.to_string(),
            kind,
            path,
        })
    }
}

impl Iterator for SourceEnumerator {
    type Item = Discovery;

    fn next(&mut self) -> Option<Discovery> {
        loop {
            if let Some(err) = self.pending.pop_front() {
                return Some(Err(err));
            }

            if let Some(mut files) = self.files.take() {
                match files.paths.next() {
                    Some(Ok(path)) => {
                        let found = if path.is_dir() { None } else { self.classify(&files, path) };
                        self.files = Some(files);
                        if let Some(artifact) = found {
                            return Some(Ok(artifact));
                        }
                    }
                    Some(Err(e)) => {
                        self.files = Some(files);
                        return Some(Err(glob_error(e)));
                    }
                    None => {}
                }
                continue;
            }

            if let Some((root_index, root, namespace, dir)) = self.namespaces.pop_front() {
                self.open_namespace(root_index, root, namespace, dir);
                continue;
            }

            if let Some((root_index, root)) = self.roots.pop_front() {
                self.open_root(root_index, root);
                continue;
            }

            return None;
        }
    }
}

/// Enumerate each root on the rayon pool and concatenate in root order.
pub fn enumerate_parallel(
    roots: &[PathBuf],
    excluded: &BTreeSet<String>,
    kinds: &KindTable,
) -> Vec<Discovery> {
    let per_root: Vec<Vec<Discovery>> = roots
        .par_iter()
        .enumerate()
        .map(|(index, root)| SourceEnumerator::for_root(index, root, excluded, kinds).collect())
        .collect();

    per_root.into_iter().flatten().collect()
}

fn glob_error(err: glob::GlobError) -> CompileError {
    let path = err.path().to_path_buf();
    CompileError::SourceAccess { path, source: err.into() }
}

/// Subdirectories of `dir` that glob skips because their names are not UTF-8.
///
/// Listing failures are left to glob, which reports them per directory.
/// Glob's `require_literal_leading_dot` panics on such names, so hidden
/// entries go through [`is_hidden`] instead.
fn non_utf8_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.file_name().is_some_and(|n| n.to_str().is_none()) && path.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn non_utf8(path: &Path, part: &str) -> CompileError {
    CompileError::Descriptor {
        path: path.to_path_buf(),
        source: DescriptorError::InvalidDescriptorFormat {
            input: path.to_string_lossy().into_owned(),
            reason: format!("{} is not valid UTF-8", part),
        },
    }
}
