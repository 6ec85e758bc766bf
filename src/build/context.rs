//! Compilation context: inputs and collaborators for one run.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::build::{
    kind_table_with, CompileLogger, CompilerExtension, JsonFormat, KindTable, NullLogger,
    RegistryFormat,
};
use crate::config::BundlecConfig;

/// Everything a [`RegistrySerializer`](crate::build::RegistrySerializer) needs.
///
/// Collaborators (logger, output format, extensions) are supplied here
/// explicitly; the driver never looks them up on its own.
pub struct CompileContext {
    /// Source roots, in priority order
    source_dirs: Vec<PathBuf>,
    /// Directory the registry file is published into
    output_dir: PathBuf,
    /// Namespaces never enumerated
    excluded: BTreeSet<String>,
    /// Whether unreadable sources fail the run
    strict: bool,
    /// Whether a failed build still publishes its registry
    serialize_on_failure: bool,
    /// Whether source roots are walked in parallel
    parallel: bool,
    logger: Arc<dyn CompileLogger>,
    format: Box<dyn RegistryFormat>,
    extensions: Vec<Box<dyn CompilerExtension>>,
    kinds: KindTable,
}

impl std::fmt::Debug for CompileContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileContext")
            .field("source_dirs", &self.source_dirs)
            .field("output_dir", &self.output_dir)
            .field("excluded", &self.excluded)
            .field("strict", &self.strict)
            .field("serialize_on_failure", &self.serialize_on_failure)
            .field("parallel", &self.parallel)
            .field("file_name", &self.format.file_name())
            .field("extensions", &self.extensions)
            .finish()
    }
}

impl CompileContext {
    /// Create a context with the default JSON format and a null logger.
    ///
    /// # Arguments
    /// - `source_dirs` - Source roots; earlier roots win duplicate conflicts
    /// - `output_dir` - Directory the registry is written into
    pub fn new(source_dirs: Vec<PathBuf>, output_dir: PathBuf) -> Self {
        Self {
            source_dirs,
            output_dir,
            excluded: BTreeSet::new(),
            strict: false,
            serialize_on_failure: false,
            parallel: true,
            logger: Arc::new(NullLogger::new()),
            format: Box::new(JsonFormat::new()),
            extensions: Vec::new(),
            kinds: KindTable::base(),
        }
    }

    /// Create a context from a loaded configuration.
    ///
    /// The output directory falls back to the current directory when the
    /// configuration does not name one.
    pub fn from_config(config: &BundlecConfig) -> Self {
        let output = config.compile.output.clone().unwrap_or_else(|| PathBuf::from("."));
        let format = JsonFormat::new()
            .with_file_name(config.output.file_name.clone())
            .with_pretty(config.output.pretty);

        Self::new(config.compile.sources.clone(), output)
            .with_excluded(config.compile.exclude.iter().cloned())
            .with_strict(config.compile.strict)
            .with_serialize_on_failure(config.compile.serialize_on_failure)
            .with_parallel(config.compile.parallel)
            .with_format(Box::new(format))
    }

    /// Add namespaces to skip.
    pub fn with_excluded<I, S>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(namespaces.into_iter().map(Into::into));
        self
    }

    /// Set strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set whether a failed build still publishes its registry.
    pub fn with_serialize_on_failure(mut self, serialize_on_failure: bool) -> Self {
        self.serialize_on_failure = serialize_on_failure;
        self
    }

    /// Set parallel enumeration.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the logger.
    pub fn with_logger(mut self, logger: Arc<dyn CompileLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: Box<dyn RegistryFormat>) -> Self {
        self.format = format;
        self
    }

    /// Enable extensions; their file kinds are added to the kind table.
    pub fn with_extensions(mut self, extensions: Vec<Box<dyn CompilerExtension>>) -> Self {
        self.extensions.extend(extensions);
        self.kinds = kind_table_with(&self.extensions);
        self
    }

    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Full path the registry is published at.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.format.file_name())
    }

    pub fn excluded(&self) -> &BTreeSet<String> {
        &self.excluded
    }

    /// Whether strict mode is enabled.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn serialize_on_failure(&self) -> bool {
        self.serialize_on_failure
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn logger(&self) -> &dyn CompileLogger {
        self.logger.as_ref()
    }

    pub fn format(&self) -> &dyn RegistryFormat {
        self.format.as_ref()
    }

    /// Names of the enabled extensions.
    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    /// Extension-to-kind table in effect for this run.
    pub fn kinds(&self) -> &KindTable {
        &self.kinds
    }
}
