//! CLI utilities for the LLM Server Android development tools
//!
//! Provides shared CLI functionality:
//! - Status messages and section banners
//! - Duration formatting

#![warn(missing_docs)]

pub mod output;
