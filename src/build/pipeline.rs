//! Compilation run orchestration.
//!
//! [`RegistrySerializer`] drives one run through
//! `Initialized → Enumerating → Building → Serializing → Succeeded | Failed`.
//! The registry file is written to a temporary file in the output directory
//! and renamed over the target only once it is complete, so a failed run
//! never leaves a partial registry behind.

use std::error::Error;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;
use tempfile::NamedTempFile;

use crate::build::{
    check_source_roots, enumerate_parallel, CompileContext, CompileError, CompileSummary,
    FormatError, LogLevel, RunState, SerializerError, SourceEnumerator,
};
use crate::registry::{BuildOutcome, Registry, RegistryBuilder};

/// Driver for a single compilation run.
#[derive(Debug)]
pub struct RegistrySerializer {
    context: CompileContext,
    state: RunState,
}

impl RegistrySerializer {
    /// Create a driver in the `Initialized` state.
    pub fn new(context: CompileContext) -> Self {
        Self { context, state: RunState::Initialized }
    }

    /// Current state of the run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The context this run was created with.
    pub fn context(&self) -> &CompileContext {
        &self.context
    }

    /// Run to a terminal state.
    ///
    /// A driver runs once; calling this again returns an error without
    /// touching the output directory.
    pub fn execute(&mut self) -> Result<CompileSummary, SerializerError> {
        if self.state != RunState::Initialized {
            return Err(SerializerError::new(
                format!("Run already executed (state: {})", self.state),
                self.state,
            ));
        }

        let start = Instant::now();

        if let Err(e) = self.preflight() {
            let err = SerializerError::new("Pre-flight check failed", self.state).with_cause(e);
            return Err(self.fail(err));
        }

        self.transition(RunState::Enumerating);
        let builder = self.enumerate();

        self.transition(RunState::Building);
        let outcome = builder.finish();
        self.report(&outcome);

        if outcome.has_fatal_errors(self.context.is_strict()) {
            return Err(self.fail_build(outcome));
        }

        self.transition(RunState::Serializing);
        let BuildOutcome { registry, errors, unresolved, .. } = outcome;
        match self.publish(&registry) {
            Ok(output_path) => {
                self.context.logger().info(&format!(
                    "Wrote {} artifact(s) in {} namespace(s) to {}",
                    registry.len(),
                    registry.namespaces().len(),
                    output_path.display()
                ));
                self.transition(RunState::Succeeded);
                Ok(CompileSummary {
                    output_path,
                    artifact_count: registry.len(),
                    namespace_count: registry.namespaces().len(),
                    unresolved,
                    errors,
                    duration: start.elapsed(),
                })
            }
            Err(e) => {
                let err = SerializerError::new("Failed to publish registry", self.state)
                    .with_cause(e)
                    .with_errors(errors);
                Err(self.fail(err))
            }
        }
    }

    fn transition(&mut self, next: RunState) {
        self.context.logger().debug(&format!("Run state: {} -> {}", self.state, next));
        self.state = next;
    }

    fn fail(&mut self, err: SerializerError) -> SerializerError {
        self.transition(RunState::Failed);
        err
    }

    /// Validate source roots and make sure the output directory is writable.
    fn preflight(&self) -> Result<(), CompileError> {
        check_source_roots(self.context.source_dirs())?;

        let output_dir = self.context.output_dir();
        let unwritable = |source: std::io::Error| CompileError::UnwritableOutput {
            path: output_dir.to_path_buf(),
            source,
        };
        std::fs::create_dir_all(output_dir).map_err(unwritable)?;
        // Probe file is removed when dropped
        NamedTempFile::new_in(output_dir).map_err(unwritable)?;
        Ok(())
    }

    /// Walk every source root and feed the results to a builder.
    fn enumerate(&self) -> RegistryBuilder {
        let roots = self.context.source_dirs();
        let excluded = self.context.excluded();
        let kinds = self.context.kinds();

        let mut builder = RegistryBuilder::new();
        if self.context.is_parallel() && roots.len() > 1 {
            builder.extend(enumerate_parallel(roots, excluded, kinds));
        } else {
            builder.extend(SourceEnumerator::new(roots, excluded, kinds));
        }
        builder
    }

    /// Log counts, notes and every accumulated error.
    fn report(&self, outcome: &BuildOutcome) {
        let logger = self.context.logger();
        logger.info(&format!(
            "Discovered {} artifact(s) in {} source director{}",
            outcome.discovered,
            self.context.source_dirs().len(),
            if self.context.source_dirs().len() == 1 { "y" } else { "ies" }
        ));
        for note in &outcome.unresolved {
            logger.info(&format!("Note: {}", note));
        }
        for error in &outcome.errors {
            logger.log(LogLevel::Error, None, Some(error as &(dyn Error + 'static)));
        }
    }

    /// Fail a build with fatal errors, publishing anyway if asked to.
    fn fail_build(&mut self, outcome: BuildOutcome) -> SerializerError {
        let BuildOutcome { registry, mut errors, .. } = outcome;
        let fatal = errors.iter().filter(|e| e.is_fatal(self.context.is_strict())).count();
        let message = format!("Compilation failed with {} error(s)", fatal);

        if !self.context.serialize_on_failure() {
            let err = SerializerError::new(message, self.state).with_errors(errors);
            return self.fail(err);
        }

        self.transition(RunState::Serializing);
        let published = self.publish(&registry);
        let mut err = SerializerError::new(message, self.state);
        match published {
            Ok(path) => {
                self.context.logger().warning(&format!(
                    "Registry written to {} despite errors",
                    path.display()
                ));
                err = err.with_output_path(path);
            }
            Err(e) => {
                let cause: &(dyn Error + 'static) = &e;
                self.context.logger().log(LogLevel::Error, None, Some(cause));
                errors.push(e);
            }
        }
        self.fail(err.with_errors(errors))
    }

    /// Write the registry atomically and return the published path.
    fn publish(&self, registry: &Registry) -> Result<PathBuf, CompileError> {
        let path = self.context.output_path();
        let serialization =
            |source: FormatError| CompileError::Serialization { path: path.clone(), source };

        let mut temp = NamedTempFile::new_in(self.context.output_dir())
            .map_err(|e| serialization(e.into()))?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.context.format().write(registry, &mut writer).map_err(serialization)?;
        }
        temp.as_file().sync_all().map_err(|e| serialization(e.into()))?;
        temp.persist(&path).map_err(|e| serialization(e.error.into()))?;

        Ok(path)
    }
}
