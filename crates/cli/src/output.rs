//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::{OwoColorize, Stream};

/// Status message helpers
pub struct Status;

impl Status {
    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".if_supports_color(Stream::Stderr, |t| t.red()), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()), message);
    }

    /// Print a section banner, e.g. `=== Building APK ===`
    pub fn banner(title: &str) {
        println!();
        println!("{}", banner_text(title).if_supports_color(Stream::Stdout, |t| t.bold()));
    }

    /// Echo an external command before running it
    pub fn command(command_line: &str) {
        println!();
        println!("{} {}", ">>>".if_supports_color(Stream::Stdout, |t| t.dimmed()), command_line);
    }
}

/// Plain text of a section banner
pub fn banner_text(title: &str) -> String {
    format!("=== {} ===", title)
}

/// Enable or disable colored status output globally
///
/// When enabled, colors are still dropped if the stream is not a terminal.
pub fn set_color_enabled(enabled: bool) {
    if enabled {
        owo_colors::unset_override();
    } else {
        owo_colors::set_override(false);
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_banner_text() {
        assert_eq!(banner_text("Building APK"), "=== Building APK ===");
    }

    #[test]
    fn test_format_duration_ms() {
        let d = Duration::from_millis(500);
        assert_eq!(format_duration(d), "500ms");
    }

    #[test]
    fn test_format_duration_secs() {
        let d = Duration::from_secs_f32(5.5);
        assert_eq!(format_duration(d), "5.5s");
    }

    #[test]
    fn test_format_duration_mins() {
        let d = Duration::from_secs(125);
        assert_eq!(format_duration(d), "2m 5s");
    }
}
