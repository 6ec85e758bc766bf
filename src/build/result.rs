//! Run outcome types.
//!
//! A run ends either in a [`CompileSummary`] or in a [`SerializerError`]
//! that carries every error accumulated along the way.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::build::CompileError;
use crate::registry::UnresolvedReference;

/// State of a compilation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Configured, not started
    Initialized,
    /// Walking source roots
    Enumerating,
    /// Assembling the registry
    Building,
    /// Writing the serialized registry
    Serializing,
    /// Registry published
    Succeeded,
    /// Run ended with an error
    Failed,
}

impl RunState {
    /// Whether the run has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Initialized => "initialized",
            RunState::Enumerating => "enumerating",
            RunState::Building => "building",
            RunState::Serializing => "serializing",
            RunState::Succeeded => "succeeded",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct CompileSummary {
    /// Where the registry was published
    pub output_path: PathBuf,
    /// Number of artifacts in the registry
    pub artifact_count: usize,
    /// Number of namespaces in the registry
    pub namespace_count: usize,
    /// Theme references that did not resolve
    pub unresolved: Vec<UnresolvedReference>,
    /// Errors that were reported but did not fail the run
    pub errors: Vec<CompileError>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl CompileSummary {
    /// Whether the run finished without any reported error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Structured failure of a run.
#[derive(Debug)]
pub struct SerializerError {
    message: String,
    cause: Option<Box<dyn Error + Send + Sync + 'static>>,
    state: RunState,
    errors: Vec<CompileError>,
    output_path: Option<PathBuf>,
}

impl SerializerError {
    /// Create an error raised while the run was in `state`.
    pub fn new(message: impl Into<String>, state: RunState) -> Self {
        Self { message: message.into(), cause: None, state, errors: Vec::new(), output_path: None }
    }

    /// Attach the underlying cause.
    pub fn with_cause(mut self, cause: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attach the accumulated errors.
    pub fn with_errors(mut self, errors: Vec<CompileError>) -> Self {
        self.errors = errors;
        self
    }

    /// Record that a registry was still published despite the failure.
    pub fn with_output_path(mut self, path: PathBuf) -> Self {
        self.output_path = Some(path);
        self
    }

    /// Human-readable summary of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Underlying cause, if any.
    pub fn cause(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn Error + 'static))
    }

    /// State the run was in when it failed.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Every error accumulated during the run.
    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Path of a registry published with `serialize_on_failure`.
    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }

    /// Number of duplicate-descriptor errors.
    pub fn duplicate_count(&self) -> usize {
        self.errors.iter().filter(|e| matches!(e, CompileError::DuplicateDescriptor { .. })).count()
    }
}

impl fmt::Display for SerializerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SerializerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause()
    }
}
