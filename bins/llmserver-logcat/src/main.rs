//! LLM Server logcat viewer
//!
//! Follows `adb logcat` for the app's tags, colorizing each line by tag and
//! reconnecting whenever the stream drops. Ctrl+C exits cleanly.

use anyhow::Result;
use clap::Parser;
use llmserver_android::streamer::LogStreamer;
use llmserver_cli::output::{self, Status};
use llmserver_core::config::Config;
use llmserver_core::error::exit_codes;
use llmserver_core::shutdown::Shutdown;
use llmserver_telemetry::TelemetryConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llmserver-logcat")]
#[command(about = "Colorized, self-reconnecting logcat viewer for the LLM Server Android app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    output::set_color_enabled(!cli.no_color);

    let mut telemetry = TelemetryConfig::for_verbosity(cli.verbose);
    if cli.no_color {
        telemetry = telemetry.without_ansi();
    }
    llmserver_telemetry::init_with_config(telemetry)?;

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    };
    let schema = &config.schema;

    let shutdown = Shutdown::install()?;
    let streamer = LogStreamer::from_config(schema, !cli.no_color, shutdown);
    let mut source = LogStreamer::adb_source(schema);
    tracing::info!(command = %source.command(), "Starting logcat viewer");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let exit_code = match streamer.run(&mut source, &mut out) {
        Ok(_) => exit_codes::SUCCESS,
        Err(e) => {
            Status::error(&e.to_string());
            e.exit_code()
        }
    };

    drop(source);
    std::process::exit(exit_code);
}
