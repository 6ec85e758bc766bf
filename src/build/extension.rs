//! File-kind table and compiler extensions.
//!
//! The [`KindTable`] maps a definition file's extension to its [`DefKind`].
//! Extensions contribute extra entries; callers pick them by name from
//! [`builtin_extension`] or supply their own [`CompilerExtension`].

use std::collections::BTreeMap;
use std::fmt;

use crate::descriptor::DefKind;

/// Mapping from file extension (without the dot) to definition kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindTable {
    kinds: BTreeMap<String, DefKind>,
}

impl KindTable {
    /// Table with no entries.
    pub fn empty() -> Self {
        Self { kinds: BTreeMap::new() }
    }

    /// The base table: components, applications, events, interfaces, styles and themes.
    pub fn base() -> Self {
        let mut table = Self::empty();
        table.insert("cmp", DefKind::Component);
        table.insert("app", DefKind::Application);
        table.insert("evt", DefKind::Event);
        table.insert("intf", DefKind::Interface);
        table.insert("css", DefKind::Style);
        table.insert("theme", DefKind::Theme);
        table
    }

    /// Map `extension` to `kind`, replacing any previous mapping.
    pub fn insert(&mut self, extension: &str, kind: DefKind) {
        self.kinds.insert(extension.trim_start_matches('.').to_ascii_lowercase(), kind);
    }

    /// Look up the kind for a file extension.
    pub fn kind_for(&self, extension: &str) -> Option<DefKind> {
        self.kinds.get(&extension.to_ascii_lowercase()).copied()
    }

    /// Number of mapped extensions.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterate `(extension, kind)` pairs in extension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DefKind)> {
        self.kinds.iter().map(|(ext, kind)| (ext.as_str(), *kind))
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::base()
    }
}

/// A typed unit of extra compiler configuration.
pub trait CompilerExtension: Send + Sync {
    /// Name the extension is selected by.
    fn name(&self) -> &str;

    /// Add this extension's file kinds.
    fn contribute(&self, kinds: &mut KindTable);
}

impl fmt::Debug for dyn CompilerExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompilerExtension({})", self.name())
    }
}

/// Extension that maps a fixed list of file extensions.
#[derive(Debug, Clone)]
pub struct KindExtension {
    name: String,
    mappings: Vec<(String, DefKind)>,
}

impl KindExtension {
    /// Create an extension with no mappings.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), mappings: Vec::new() }
    }

    /// Add a file extension mapping.
    pub fn with_kind(mut self, extension: impl Into<String>, kind: DefKind) -> Self {
        self.mappings.push((extension.into(), kind));
        self
    }
}

impl CompilerExtension for KindExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn contribute(&self, kinds: &mut KindTable) {
        for (extension, kind) in &self.mappings {
            kinds.insert(extension, *kind);
        }
    }
}

/// Names accepted by [`builtin_extension`].
pub const BUILTIN_EXTENSIONS: [&str; 3] = ["libraries", "modules", "documentation"];

/// Look up a built-in extension by name.
pub fn builtin_extension(name: &str) -> Option<Box<dyn CompilerExtension>> {
    let extension = match name {
        "libraries" => KindExtension::new("libraries").with_kind("lib", DefKind::Library),
        "modules" => KindExtension::new("modules").with_kind("js", DefKind::Module),
        "documentation" => {
            KindExtension::new("documentation").with_kind("auradoc", DefKind::Documentation)
        }
        _ => return None,
    };
    Some(Box::new(extension))
}

/// Resolve extension names, returning the found extensions and the unknown names.
///
/// Duplicate names are resolved once.
pub fn resolve_extensions(names: &[String]) -> (Vec<Box<dyn CompilerExtension>>, Vec<String>) {
    let mut found: Vec<Box<dyn CompilerExtension>> = Vec::new();
    let mut unknown = Vec::new();

    for name in names {
        if found.iter().any(|e| e.name() == name) || unknown.contains(name) {
            continue;
        }
        match builtin_extension(name) {
            Some(extension) => found.push(extension),
            None => unknown.push(name.clone()),
        }
    }

    (found, unknown)
}

/// Build a kind table from the base table plus every extension's contribution.
pub fn kind_table_with(extensions: &[Box<dyn CompilerExtension>]) -> KindTable {
    let mut table = KindTable::base();
    for extension in extensions {
        extension.contribute(&mut table);
    }
    table
}
