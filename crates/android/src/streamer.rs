//! Resilient logcat viewer
//!
//! Streams colorized lines from a [`LogSource`] and reconnects whenever the
//! stream dies, waiting a fixed delay between attempts. Only an interrupt
//! ends the loop.

use crate::adb::Adb;
use crate::logcat::{prepare_line, AdbLogcat, LogLines, LogSource, Palette};
use llmserver_cli::output::{format_duration, Status};
use llmserver_core::config::ConfigSchema;
use llmserver_core::error::{Error, Result};
use llmserver_core::retry::RetryConfig;
use llmserver_core::shutdown::{Shutdown, POLL_INTERVAL};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters reported when streaming stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Number of times the source was (re)connected
    pub connections: u32,
    /// Lines written to the output
    pub lines: u64,
}

enum Pump {
    Interrupted,
    Ended(String),
}

/// Reconnecting logcat streamer
pub struct LogStreamer {
    palette: Palette,
    retry: RetryConfig,
    shutdown: Shutdown,
}

impl LogStreamer {
    /// Streamer with an explicit palette and reconnect policy
    pub fn new(palette: Palette, retry: RetryConfig, shutdown: Shutdown) -> Self {
        Self {
            palette,
            retry,
            shutdown,
        }
    }

    /// Streamer using the configured tags and reconnect policy
    pub fn from_config(schema: &ConfigSchema, color: bool, shutdown: Shutdown) -> Self {
        let delay = Duration::from_millis(schema.logcat.reconnect_delay_ms);
        let retry = match schema.logcat.max_reconnects {
            Some(reconnects) => RetryConfig::limited(reconnects.saturating_add(1), delay),
            None => RetryConfig::forever(delay),
        };
        Self::new(Palette::from_tags(&schema.logcat.tags, color), retry, shutdown)
    }

    /// The `adb logcat` source matching `schema`
    pub fn adb_source(schema: &ConfigSchema) -> AdbLogcat {
        AdbLogcat::new(Adb::new(&schema.tools).logcat(&schema.logcat.tags))
    }

    /// Stream until interrupted
    ///
    /// Source failures are retried according to the retry policy; only a
    /// failure to write to `out` or an exhausted bounded policy returns an
    /// error.
    pub fn run<S, W>(&self, source: &mut S, out: &mut W) -> Result<StreamSummary>
    where
        S: LogSource,
        W: Write,
    {
        let mut summary = StreamSummary::default();
        let mut failures = 0u32;

        loop {
            if self.shutdown.is_requested() {
                break;
            }

            Status::banner("Live Logcat (Ctrl+C to exit)");
            summary.connections += 1;

            let reason = match source.connect() {
                Ok(lines) => match self.pump(lines, out, &mut summary)? {
                    Pump::Interrupted => break,
                    Pump::Ended(reason) => match source.last_exit() {
                        Some(code) => format!("{} (exit code {})", reason, code),
                        None => reason,
                    },
                },
                Err(e) => e.message,
            };

            // Ctrl+C also ends adb, and its EOF can beat the handler thread
            if !self.shutdown.sleep(POLL_INTERVAL) {
                break;
            }

            failures += 1;
            if !self.retry.should_retry(failures) {
                return Err(Error::stream_closed(format!(
                    "Logcat gave up after {} attempts: {}",
                    failures, reason
                )));
            }

            let delay = self.retry.delay_for_attempt(failures);
            warn!(attempt = failures, reason = %reason, "Logcat stream lost");
            Status::warning(&format!("Logcat crashed: {}", reason));
            Status::info(&format!("Reconnecting in {}...", format_duration(delay)));

            if !self.shutdown.sleep(delay) {
                break;
            }
            info!(attempt = failures + 1, "Reconnecting logcat");
        }

        Status::info("Stopping logcat viewer.");
        debug!(connections = summary.connections, lines = summary.lines, "Logcat stopped");
        Ok(summary)
    }

    fn pump<W: Write>(
        &self,
        lines: LogLines,
        out: &mut W,
        summary: &mut StreamSummary,
    ) -> Result<Pump> {
        for line in lines {
            if self.shutdown.is_requested() {
                return Ok(Pump::Interrupted);
            }
            match line {
                Ok(raw) => {
                    if let Some(text) = prepare_line(&raw) {
                        writeln!(out, "{}", self.palette.colorize(text))?;
                        out.flush()?;
                        summary.lines += 1;
                    }
                }
                Err(e) => return Ok(Pump::Ended(format!("read error: {}", e))),
            }
        }

        if self.shutdown.is_requested() {
            Ok(Pump::Interrupted)
        } else {
            Ok(Pump::Ended("stream ended".to_string()))
        }
    }
}
