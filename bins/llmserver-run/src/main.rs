//! LLM Server runner
//!
//! Builds the debug APK, installs it, launches the app, and follows its logs.

use anyhow::Result;
use clap::Parser;
use llmserver_android::pipeline::Pipeline;
use llmserver_android::streamer::LogStreamer;
use llmserver_cli::output::{self, Status};
use llmserver_core::config::{Config, ConfigSchema};
use llmserver_core::error::exit_codes;
use llmserver_core::process::SystemExecutor;
use llmserver_core::shutdown::Shutdown;
use llmserver_telemetry::TelemetryConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llmserver-run")]
#[command(about = "Build, install, launch, and follow the LLM Server Android app")]
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

    let color = !cli.no_color;
    let pipeline = Pipeline::new(&config.schema);
    let report = pipeline.run(&mut SystemExecutor, || stream_logs(&config.schema, color));

    std::process::exit(report.exit_code());
}

fn stream_logs(schema: &ConfigSchema, color: bool) -> llmserver_core::Result<i32> {
    // Installed only now so Ctrl+C during the build still stops the runner
    let shutdown = Shutdown::install()?;
    let streamer = LogStreamer::from_config(schema, color, shutdown);
    let mut source = LogStreamer::adb_source(schema);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    streamer.run(&mut source, &mut out)?;

    Ok(exit_codes::SUCCESS)
}
