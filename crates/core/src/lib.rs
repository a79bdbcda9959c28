//! Core utilities for the LLM Server Android development tools
//!
//! This crate provides shared functionality used by the runner and the
//! log streamer:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Process execution**: Command descriptions and an executor seam
//! - **Configuration**: TOML-based configuration with defaults
//! - **Retry**: Fixed-delay retry policy
//! - **Shutdown**: Ctrl+C aware interrupt flag
//!
//! # Example
//!
//! ```rust,no_run
//! use llmserver_core::config::Config;
//! use llmserver_core::process::{CommandExecutor, CommandSpec, SystemExecutor};
//!
//! let config = Config::load(None).expect("config");
//! let spec = CommandSpec::new(&config.schema.tools.adb).arg("devices");
//! let code = SystemExecutor.execute(&spec).expect("adb");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod retry;
pub mod shutdown;

pub use error::{Error, ErrorCode, Result, ResultExt};
