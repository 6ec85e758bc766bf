//! Logging collaborator for compilation runs.
//!
//! The compiler never prints anything itself; it hands a severity, a message
//! and/or an underlying cause to a [`CompileLogger`]. How that is rendered is
//! up to the implementation.
//!
//! # Example
//!
//! ```
//! use bundlec::build::log::{CompileLogger, LogLevel, MemoryLogger};
//!
//! let logger = MemoryLogger::new();
//! logger.info("Discovered 12 artifacts");
//! logger.warning("Unknown extension 'foo'");
//! assert_eq!(logger.count(LogLevel::Warning), 1);
//! ```

use std::error::Error;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// Severity of a log record, most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    /// Upper-case label used as the line prefix.
    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trait for log sinks used by the compiler.
pub trait CompileLogger: Send + Sync {
    /// Record a message and/or a cause at the given severity.
    fn log(&self, level: LogLevel, message: Option<&str>, cause: Option<&(dyn Error + 'static)>);

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, Some(message), None);
    }

    fn error_with(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.log(LogLevel::Error, Some(message), Some(cause));
    }

    fn warning(&self, message: &str) {
        self.log(LogLevel::Warning, Some(message), None);
    }

    fn warning_with(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.log(LogLevel::Warning, Some(message), Some(cause));
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, Some(message), None);
    }

    fn info_with(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.log(LogLevel::Info, Some(message), Some(cause));
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, Some(message), None);
    }

    fn debug_with(&self, message: &str, cause: &(dyn Error + 'static)) {
        self.log(LogLevel::Debug, Some(message), Some(cause));
    }
}

/// A logger that discards everything.
#[derive(Debug, Default)]
pub struct NullLogger;

impl NullLogger {
    /// Create a new null logger.
    pub fn new() -> Self {
        Self
    }
}

impl CompileLogger for NullLogger {
    fn log(
        &self,
        _level: LogLevel,
        _message: Option<&str>,
        _cause: Option<&(dyn Error + 'static)>,
    ) {
    }
}

/// Console logger writing `LEVEL: message, cause` lines.
///
/// The cause's `source()` chain follows on indented `caused by:` lines.
/// Debug records are only written in verbose mode.
pub struct ConsoleLogger {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show debug records
    verbose: bool,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLogger")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ConsoleLogger {
    /// Create a console logger writing to stderr, colored when stderr is a terminal.
    pub fn new() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            verbose: false,
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console logger that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false, // Disable colors for custom output
            verbose: false,
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn paint(&self, level: LogLevel) -> String {
        if !self.use_colors {
            return level.label().to_string();
        }
        let code = match level {
            LogLevel::Error => "\x1b[31m",
            LogLevel::Warning => "\x1b[33m",
            LogLevel::Info => "\x1b[36m",
            LogLevel::Debug => "\x1b[2m",
        };
        format!("{}{}\x1b[0m", code, level.label())
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileLogger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: Option<&str>, cause: Option<&(dyn Error + 'static)>) {
        if level == LogLevel::Debug && !self.verbose {
            return;
        }

        let mut line = format!("{}: ", self.paint(level));
        line.push_str(&join_message(message, cause));

        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
            let mut next = cause.and_then(|c| c.source());
            while let Some(inner) = next {
                let _ = writeln!(output, "    caused by: {}", inner);
                next = inner.source();
            }
        }
    }
}

/// A single captured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: Option<String>,
    pub cause: Option<String>,
}

impl LogRecord {
    /// The message and cause joined the way the console renders them.
    pub fn text(&self) -> String {
        match (&self.message, &self.cause) {
            (Some(m), Some(c)) => format!("{}, {}", m, c),
            (Some(m), None) => m.clone(),
            (None, Some(c)) => c.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Logger that keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    /// Create an empty memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Texts of all records at `level`.
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records().into_iter().filter(|r| r.level == level).map(|r| r.text()).collect()
    }

    /// Number of records at `level`.
    pub fn count(&self, level: LogLevel) -> usize {
        self.records().iter().filter(|r| r.level == level).count()
    }
}

impl CompileLogger for MemoryLogger {
    fn log(&self, level: LogLevel, message: Option<&str>, cause: Option<&(dyn Error + 'static)>) {
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord {
                level,
                message: message.map(str::to_string),
                cause: cause.map(|c| c.to_string()),
            });
        }
    }
}

fn join_message(message: Option<&str>, cause: Option<&(dyn Error + 'static)>) -> String {
    match (message, cause) {
        (Some(m), Some(c)) => format!("{}, {}", m, c),
        (Some(m), None) => m.to_string(),
        (None, Some(c)) => c.to_string(),
        (None, None) => String::new(),
    }
}
