//! Structured error handling with context and recovery suggestions
//!
//! Errors carry:
//! - An error code for programmatic handling
//! - Optional context describing what was being attempted
//! - Optional recovery suggestion for the user
//! - A mapping to a process exit code

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // IO errors (2xxx)
    /// Unclassified I/O failure
    IoError = 2000,
    /// A file or directory does not exist
    FileNotFound = 2001,
    /// Access to a file was refused
    PermissionDenied = 2002,
    /// The build output is missing
    ArtifactNotFound = 2003,

    // Configuration errors (3xxx)
    /// Config file could not be read
    ConfigError = 3000,
    /// An explicitly named config file does not exist
    ConfigNotFound = 3001,
    /// Config file is not valid TOML for the schema
    ConfigParseError = 3002,
    /// A config value is out of range
    InvalidConfigValue = 3003,

    // Process errors (5xxx)
    /// A process could not be started
    ProcessError = 5000,
    /// The program is not installed or not on PATH
    CommandNotFound = 5001,
    /// The log stream ended and reconnecting was given up
    StreamClosed = 5002,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {}", ctx)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Process exit code this error should terminate with
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            ErrorCode::ConfigError
            | ErrorCode::ConfigNotFound
            | ErrorCode::ConfigParseError
            | ErrorCode::InvalidConfigValue => exit_codes::CONFIG_ERROR,
            _ => exit_codes::FAILURE,
        }
    }

    // Convenience constructors

    /// The APK expected at `path` does not exist
    pub fn artifact_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(ErrorCode::ArtifactNotFound, "APK not found. Did the build succeed?")
            .with_context(format!("Expected at {}", path.as_ref().display()))
    }

    /// Config file could not be read
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Explicit config path does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .llmserver.toml file or use --config to specify a path")
    }

    /// Generic process failure
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    /// `cmd` could not be found
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", cmd),
        )
        .with_suggestion(format!("Install {} and ensure it's in your PATH", cmd))
    }

    /// The log stream will not be reconnected
    pub fn stream_closed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StreamClosed, message)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Everything succeeded
    pub const SUCCESS: i32 = 0;
    /// Generic failure
    pub const FAILURE: i32 = 1;
    /// Configuration could not be loaded
    pub const CONFIG_ERROR: i32 = 3;
    /// Program missing, as reported by shells
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context describing what was being attempted
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
