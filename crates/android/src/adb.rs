//! Android Debug Bridge commands
//!
//! Builds the adb invocations used to install, launch, and follow the app.

use llmserver_core::config::{AppConfig, TagStyle, ToolsConfig};
use llmserver_core::process::{command_exists, CommandSpec};
use std::path::Path;

/// adb invocation targeting an optional device serial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adb {
    program: String,
    serial: Option<String>,
}

impl Adb {
    /// Create an adb wrapper from tool configuration
    pub fn new(tools: &ToolsConfig) -> Self {
        Self {
            program: tools.adb.clone(),
            serial: tools.device_serial.clone(),
        }
    }

    /// The adb program name or path
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check if adb is available
    pub fn is_available(&self) -> bool {
        Path::new(&self.program).is_file() || command_exists(&self.program)
    }

    fn base(&self) -> CommandSpec {
        let spec = CommandSpec::new(&self.program);
        match &self.serial {
            Some(serial) => spec.args(["-s", serial.as_str()]),
            None => spec,
        }
    }

    /// `adb install -r <apk>`, replacing an existing install
    pub fn install(&self, apk_path: &Path) -> CommandSpec {
        self.base()
            .args(["install", "-r"])
            .arg(apk_path.to_string_lossy())
    }

    /// `adb shell monkey -p <package> -c <category> <events>`
    pub fn monkey_launch(&self, app: &AppConfig) -> CommandSpec {
        self.base()
            .args(["shell", "monkey", "-p"])
            .arg(&app.package)
            .arg("-c")
            .arg(&app.launch_category)
            .arg(app.monkey_events.to_string())
    }

    /// `adb logcat -s <tag> -s <tag> ...`
    pub fn logcat(&self, tags: &[TagStyle]) -> CommandSpec {
        self.base().arg("logcat").args(filter_args(tags))
    }
}

/// Logcat filter arguments, one `-s <tag>` pair per tag in order
pub fn filter_args(tags: &[TagStyle]) -> Vec<String> {
    tags.iter()
        .flat_map(|tag| ["-s".to_string(), tag.name.clone()])
        .collect()
}
