//! Configuration schema definitions
//!
//! Every section has defaults matching the LLM Server app, so an empty
//! (or absent) config file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    /// App identity and launch settings
    #[serde(default)]
    pub app: AppConfig,

    /// Gradle build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Log streaming settings
    #[serde(default)]
    pub logcat: LogcatConfig,
}

/// Application identity and launch parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Application package identifier
    #[serde(default = "default_package")]
    pub package: String,

    /// Main activity, shown as the launch target; monkey launches via category
    #[serde(default = "default_main_activity")]
    pub main_activity: String,

    /// Intent category used to launch the app
    #[serde(default = "default_launch_category")]
    pub launch_category: String,

    /// Number of monkey events to inject on launch
    #[serde(default = "default_monkey_events")]
    pub monkey_events: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            main_activity: default_main_activity(),
            launch_category: default_launch_category(),
            monkey_events: default_monkey_events(),
        }
    }
}

impl AppConfig {
    /// Component name of the main activity, e.g. `com.example.app/.Main`
    pub fn component(&self) -> String {
        format!("{}/{}", self.package, self.main_activity)
    }
}

fn default_package() -> String {
    "com.example.llmserverapp".to_string()
}

fn default_main_activity() -> String {
    ".SplashScreen".to_string()
}

fn default_launch_category() -> String {
    "android.intent.category.LAUNCHER".to_string()
}

fn default_monkey_events() -> u32 {
    1
}

/// Gradle build configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildConfig {
    /// Android project root
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Gradle task producing the APK
    #[serde(default = "default_gradle_task")]
    pub gradle_task: String,

    /// APK path, relative to the project root
    #[serde(default = "default_artifact")]
    pub artifact: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            gradle_task: default_gradle_task(),
            artifact: default_artifact(),
        }
    }
}

impl BuildConfig {
    /// Absolute-or-relative path of the APK as seen from the current directory
    pub fn artifact_path(&self) -> PathBuf {
        self.project_dir.join(&self.artifact)
    }
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_gradle_task() -> String {
    "assembleDebug".to_string()
}

fn default_artifact() -> PathBuf {
    PathBuf::from("app/build/outputs/apk/debug/app-debug.apk")
}

/// External tool locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    /// adb program, looked up on PATH unless it contains a separator
    #[serde(default = "default_adb")]
    pub adb: String,

    /// Gradle wrapper, resolved against the project dir unless absolute
    #[serde(default = "default_gradle")]
    pub gradle: String,

    /// Target device serial (`adb -s`)
    #[serde(default)]
    pub device_serial: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            adb: default_adb(),
            gradle: default_gradle(),
            device_serial: None,
        }
    }
}

fn default_adb() -> String {
    "adb".to_string()
}

fn default_gradle() -> String {
    if cfg!(windows) {
        "gradlew.bat".to_string()
    } else {
        "gradlew".to_string()
    }
}

/// Log streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogcatConfig {
    /// Delay before respawning a dead logcat process, in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Pause between app launch and log streaming, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Ordered tag filters; first match wins when colorizing
    #[serde(default = "default_tags")]
    pub tags: Vec<TagStyle>,

    /// Give up after this many reconnects; unset retries forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconnects: Option<u32>,
}

impl Default for LogcatConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: default_reconnect_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            tags: default_tags(),
            max_reconnects: None,
        }
    }
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_settle_delay_ms() -> u64 {
    1000
}

fn default_tags() -> Vec<TagStyle> {
    vec![
        TagStyle::new("LLMServer", TagColor::Green),
        TagStyle::new("JNI", TagColor::Cyan),
        TagStyle::new("Vulkan", TagColor::Magenta),
        TagStyle::new("DownloadFlow", TagColor::Blue),
        TagStyle::new("PythonServer", TagColor::Yellow),
        TagStyle::new("AndroidRuntime", TagColor::Red),
    ]
}

/// A log tag and its highlight color
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagStyle {
    /// Logcat tag, matched as a substring of each line
    pub name: String,
    /// Color applied to matching lines
    pub color: TagColor,
}

impl TagStyle {
    /// Create a tag style
    pub fn new(name: impl Into<String>, color: TagColor) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Highlight colors available for tags (bright ANSI foregrounds)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    /// Bright green
    Green,
    /// Bright cyan
    Cyan,
    /// Bright magenta
    Magenta,
    /// Bright blue
    Blue,
    /// Bright yellow
    Yellow,
    /// Bright red
    Red,
    /// Bright white
    White,
}

impl TagColor {
    /// Terminal escape sequence selecting this color
    pub fn ansi(self) -> &'static str {
        match self {
            TagColor::Green => "\x1b[92m",
            TagColor::Cyan => "\x1b[96m",
            TagColor::Magenta => "\x1b[95m",
            TagColor::Blue => "\x1b[94m",
            TagColor::Yellow => "\x1b[93m",
            TagColor::Red => "\x1b[91m",
            TagColor::White => "\x1b[97m",
        }
    }
}

/// Escape sequence resetting all attributes
pub const ANSI_RESET: &str = "\x1b[0m";
