//! Structured logging for the LLM Server Android development tools
//!
//! Diagnostics go to stderr through `tracing`, leaving stdout to the build
//! output and the colorized log stream.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(config.show_target)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number)
        .compact();

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit ANSI colors
    pub ansi: bool,
    /// Include the event target
    pub show_target: bool,
    /// Include the source file
    pub show_file: bool,
    /// Include the source line
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            ansi: true,
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Config for a `-v` count: 0 = warn, 1 = info, 2+ = debug with targets
    pub fn for_verbosity(verbose: u8) -> Self {
        let log_level = match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        Self {
            log_level: log_level.to_string(),
            show_target: verbose >= 2,
            ..Self::default()
        }
    }

    /// Disable ANSI colors in log output
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }
}
