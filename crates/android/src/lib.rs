//! Android tooling for the LLM Server app
//!
//! This crate provides:
//! - Gradle and adb command builders
//! - The build, install, launch, stream-logs pipeline
//! - Tag-based logcat colorization
//! - A logcat streamer that reconnects when the device drops

#![warn(missing_docs)]

pub mod adb;
pub mod gradle;
pub mod logcat;
pub mod pipeline;
pub mod streamer;
