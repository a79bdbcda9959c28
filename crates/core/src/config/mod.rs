//! Configuration loading and schema definitions
//!
//! TOML-backed settings shared by the runner and the log streamer.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
