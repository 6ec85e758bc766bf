//! Errors raised while compiling a registry.

use std::path::PathBuf;
use thiserror::Error;

use crate::build::FormatError;
use crate::descriptor::{Descriptor, DescriptorError};

/// An error from one stage of a compilation run.
///
/// Per-artifact errors are accumulated and reported together at the end of a
/// run; pre-flight and serialization errors end the run immediately.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// No source roots were configured
    #[error("No source directories were supplied")]
    NoSourceDirectories,
    /// A source root does not exist or cannot be listed
    #[error("Invalid source directory '{}': {reason}", path.display())]
    InvalidSourceDirectory { path: PathBuf, reason: String },
    /// The output directory cannot be created or written
    #[error("Output directory '{}' is not writable: {source}", path.display())]
    UnwritableOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A single source path could not be read
    #[error("Failed to read '{}': {source}", path.display())]
    SourceAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A descriptor could not be derived for an artifact
    #[error("Cannot derive descriptor for '{}': {source}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: DescriptorError,
    },
    /// Two artifacts resolve to the same descriptor
    #[error(
        "Duplicate descriptor {descriptor}: defined in both '{}' and '{}'",
        first.display(),
        second.display()
    )]
    DuplicateDescriptor { descriptor: Descriptor, first: PathBuf, second: PathBuf },
    /// Writing the registry failed
    #[error("Failed to serialize registry to '{}': {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

impl CompileError {
    /// Whether this error fails the build under the given strictness.
    ///
    /// Unreadable sources are only fatal in strict mode; everything else that
    /// reaches the accumulated error list always is.
    pub fn is_fatal(&self, strict: bool) -> bool {
        match self {
            CompileError::SourceAccess { .. } => strict,
            _ => true,
        }
    }

    /// Short machine-friendly name of the error category.
    pub fn category(&self) -> &'static str {
        match self {
            CompileError::NoSourceDirectories | CompileError::InvalidSourceDirectory { .. } => {
                "invalid_source_directory"
            }
            CompileError::UnwritableOutput { .. } => "unwritable_output",
            CompileError::SourceAccess { .. } => "source_access",
            CompileError::Descriptor { source, .. } => match source {
                DescriptorError::MalformedNamespace { .. } => "malformed_namespace",
                _ => "invalid_descriptor_format",
            },
            CompileError::DuplicateDescriptor { .. } => "duplicate_descriptor",
            CompileError::Serialization { .. } => "serialization",
        }
    }
}
