//! Board event logger
//!
//! Every flip, match, removal and rewrite on a board can be echoed to stdout
//! and/or captured in memory. The logger lives inside the board's locked
//! state, so entries are recorded in exactly the order the mutations happen.

use serde::{Deserialize, Serialize};

/// Verbosity level for board output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum VerbosityLevel {
    /// Silent - no output
    #[default]
    Silent = 0,
    /// Minimal - removals and rewrites only
    Minimal = 1,
    /// Normal - every flip and its outcome
    Normal = 2,
    /// Verbose - also waits, wake-ups and cleanups
    Verbose = 3,
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A captured log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g., "flip", "match", "transform")
    pub category: Option<String>,
}

/// Centralized board logger
#[derive(Debug, Clone, Default)]
pub struct BoardLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,
    log_buffer: Vec<LogEntry>,
}

impl BoardLogger {
    /// Create a silent logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logger with specified verbosity
    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        BoardLogger {
            verbosity,
            ..Self::default()
        }
    }

    /// Builder-style output mode
    pub fn output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Builder-style output format
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Capture to memory only (suppresses stdout)
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Captured entries, oldest first
    pub fn logs(&self) -> &[LogEntry] {
        &self.log_buffer
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.clear();
    }

    /// Would a message at `level` go anywhere?
    ///
    /// Callers use this to skip building messages nobody will read.
    #[inline]
    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level != VerbosityLevel::Silent && level <= self.verbosity
    }

    #[inline]
    pub fn minimal(&mut self, category: &str, message: &str) {
        self.log(VerbosityLevel::Minimal, category, message);
    }

    #[inline]
    pub fn normal(&mut self, category: &str, message: &str) {
        self.log(VerbosityLevel::Normal, category, message);
    }

    #[inline]
    pub fn verbose(&mut self, category: &str, message: &str) {
        self.log(VerbosityLevel::Verbose, category, message);
    }

    /// Log `message` at `level` under `category`
    pub fn log(&mut self, level: VerbosityLevel, category: &str, message: &str) {
        if !self.enabled(level) {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            category: Some(category.to_string()),
        };

        if matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both) {
            self.log_to_stdout(&entry);
        }
        if self.is_capturing() {
            self.log_buffer.push(entry);
        }
    }

    fn log_to_stdout(&self, entry: &LogEntry) {
        match self.output_format {
            OutputFormat::Text => {
                if entry.level == VerbosityLevel::Minimal {
                    println!("{}", entry.message);
                } else {
                    println!("  {}", entry.message);
                }
            }
            OutputFormat::Json => match serde_json::to_string(entry) {
                Ok(line) => println!("{line}"),
                Err(e) => eprintln!("failed to encode log entry: {e}"),
            },
        }
    }
}
