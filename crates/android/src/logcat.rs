//! Logcat line handling
//!
//! Tag-based colorization and the line sources the streamer reads from.

use llmserver_core::config::{TagStyle, ANSI_RESET};
use llmserver_core::error::{Error, Result};
use llmserver_core::process::{exit_code_of, spawn_error, CommandSpec};
use std::borrow::Cow;
use std::io::{self, BufRead, BufReader};
use std::process::{Child, Stdio};

/// Ordered tag-to-escape table
#[derive(Debug, Clone)]
pub struct Palette {
    entries: Vec<(String, &'static str)>,
    enabled: bool,
}

impl Palette {
    /// Compile a palette; with `enabled == false` lines pass through untouched
    pub fn from_tags(tags: &[TagStyle], enabled: bool) -> Self {
        Self {
            entries: tags
                .iter()
                .map(|tag| (tag.name.clone(), tag.color.ansi()))
                .collect(),
            enabled,
        }
    }

    /// Wrap `line` in the color of its first matching tag
    pub fn colorize<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if !self.enabled {
            return Cow::Borrowed(line);
        }
        // First tag in list order wins, wherever it occurs in the line
        match self.entries.iter().find(|(name, _)| line.contains(name.as_str())) {
            Some((_, color)) => Cow::Owned(format!("{}{}{}", color, line, ANSI_RESET)),
            None => Cow::Borrowed(line),
        }
    }
}

/// Strip trailing whitespace; `None` for lines with nothing to show
pub fn prepare_line(raw: &str) -> Option<&str> {
    let line = raw.trim_end();
    if line.trim_start().is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Lines of a log stream, decoded as lossy UTF-8
pub struct LogLines {
    reader: Box<dyn BufRead + Send>,
    buf: Vec<u8>,
}

impl LogLines {
    /// Line iterator over `reader`
    pub fn new(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            buf: Vec::with_capacity(256),
        }
    }
}

impl Iterator for LogLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).into_owned())),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Something that can (re)open a log stream
pub trait LogSource {
    /// Start a fresh stream, replacing any previous one
    fn connect(&mut self) -> Result<LogLines>;

    /// Exit code of the most recent stream's process, if it has finished
    fn last_exit(&mut self) -> Option<i32> {
        None
    }
}

/// `adb logcat` subprocess source
///
/// Holds at most one child; it is killed and reaped before respawning and
/// on drop.
pub struct AdbLogcat {
    spec: CommandSpec,
    child: Option<Child>,
}

impl AdbLogcat {
    /// Source spawning `spec` on each connect
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec, child: None }
    }

    /// The command spawned on every connect
    pub fn command(&self) -> &CommandSpec {
        &self.spec
    }

    fn reap(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Ok(None) = child.try_wait() {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
    }
}

impl LogSource for AdbLogcat {
    fn connect(&mut self) -> Result<LogLines> {
        self.reap();

        tracing::debug!(command = %self.spec, "Spawning logcat");
        let mut child = self
            .spec
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(&self.spec.program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::process("logcat stdout was not captured"))?;
        self.child = Some(child);

        Ok(LogLines::new(BufReader::new(stdout)))
    }

    fn last_exit(&mut self) -> Option<i32> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => Some(exit_code_of(status)),
            _ => None,
        }
    }
}

impl Drop for AdbLogcat {
    fn drop(&mut self) {
        self.reap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmserver_core::config::{LogcatConfig, TagColor};
    use proptest::prelude::*;
    use std::io::Cursor;

    fn default_palette() -> Palette {
        Palette::from_tags(&LogcatConfig::default().tags, true)
    }

    #[test]
    fn test_colorize_matching_tag() {
        let palette = default_palette();
        let line = "01-01 12:00:00.000  123  456 I LLMServer: listening on 8080";
        assert_eq!(
            palette.colorize(line),
            format!("\x1b[92m{}\x1b[0m", line)
        );
    }

    #[test]
    fn test_colorize_first_tag_in_list_order_wins() {
        let palette = default_palette();
        // AndroidRuntime appears first in the text, JNI first in the list
        let line = "E AndroidRuntime: FATAL EXCEPTION in JNI bridge";
        assert_eq!(palette.colorize(line), format!("\x1b[96m{}\x1b[0m", line));
    }

    #[test]
    fn test_colorize_no_match_passthrough() {
        let palette = default_palette();
        let line = "I ActivityManager: Start proc";
        assert!(matches!(palette.colorize(line), Cow::Borrowed(l) if l == line));
    }

    #[test]
    fn test_colorize_disabled() {
        let palette = Palette::from_tags(&LogcatConfig::default().tags, false);
        let line = "I LLMServer: ready";
        assert_eq!(palette.colorize(line), line);
    }

    #[test]
    fn test_colorize_is_case_sensitive() {
        let palette = default_palette();
        assert_eq!(palette.colorize("llmserver lowercase"), "llmserver lowercase");
    }

    #[test]
    fn test_prepare_line() {
        assert_eq!(prepare_line("I JNI: ok\r\n"), Some("I JNI: ok"));
        assert_eq!(prepare_line("  indented  \n"), Some("  indented"));
        assert_eq!(prepare_line(""), None);
        assert_eq!(prepare_line("\n"), None);
        assert_eq!(prepare_line(" \t \r\n"), None);
    }

    #[test]
    fn test_log_lines_lossy_utf8() {
        let data: Vec<u8> = b"first\n\xff\xfe bad bytes\nlast".to_vec();
        let lines: Vec<String> = LogLines::new(Cursor::new(data))
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "first\n");
        assert!(lines[1].contains("bad bytes"));
        assert_eq!(lines[2], "last");
    }

    #[cfg(unix)]
    #[test]
    fn test_adb_logcat_respawns_with_same_command() {
        let spec =
            CommandSpec::new("sh").args(["-c", "echo \"I LLMServer: $0 $1\"", "logcat", "-s"]);
        let mut source = AdbLogcat::new(spec.clone());

        for _ in 0..2 {
            let lines: Vec<String> = source.connect().unwrap().map(|l| l.unwrap()).collect();
            assert_eq!(lines, vec!["I LLMServer: logcat -s\n".to_string()]);
        }
        assert_eq!(source.command(), &spec);
    }

    #[cfg(unix)]
    #[test]
    fn test_adb_logcat_reports_exit_code() {
        let spec = CommandSpec::new("sh").args(["-c", "echo line; exit 3"]);
        let mut source = AdbLogcat::new(spec);
        let lines: Vec<_> = source.connect().unwrap().collect();
        assert_eq!(lines.len(), 1);

        let mut code = None;
        for _ in 0..100 {
            code = source.last_exit();
            if code.is_some() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_adb_logcat_kills_previous_child() {
        let spec = CommandSpec::new("sh").args(["-c", "echo up; exec sleep 30"]);
        let mut source = AdbLogcat::new(spec);

        let mut first = source.connect().unwrap();
        assert_eq!(first.next().unwrap().unwrap(), "up\n");

        // Respawning must terminate the sleeping child, ending its stream
        let _second = source.connect().unwrap();
        assert!(first.next().is_none());
    }

    #[test]
    fn test_adb_logcat_missing_program() {
        let mut source = AdbLogcat::new(CommandSpec::new("nonexistent_adb_12345"));
        let err = source.connect().err().unwrap();
        assert_eq!(err.code, llmserver_core::ErrorCode::CommandNotFound);
    }

    #[test]
    fn test_palette_with_custom_tags() {
        let tags = [
            TagStyle::new("Net", TagColor::Blue),
            TagStyle::new("NetworkUtils", TagColor::Yellow),
        ];
        let palette = Palette::from_tags(&tags, true);
        // "Net" comes first in the list, so it wins over the longer tag
        let line = "D NetworkUtils: ip";
        assert_eq!(
            palette.colorize(line),
            format!("{}{}{}", TagColor::Blue.ansi(), line, ANSI_RESET)
        );
    }

    proptest! {
        #[test]
        fn prop_untagged_lines_unchanged(line in "[a-z0-9 :.]{0,80}") {
            // Tags all contain an uppercase letter, so lowercase input never matches
            let palette = default_palette();
            prop_assert_eq!(palette.colorize(&line), line.as_str());
        }

        #[test]
        fn prop_tagged_lines_wrapped(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
            let palette = default_palette();
            let line = format!("{}Vulkan{}", prefix, suffix);
            let colored = palette.colorize(&line);
            prop_assert!(colored.starts_with(TagColor::Magenta.ansi()));
            prop_assert!(colored.ends_with(ANSI_RESET));
            prop_assert_eq!(
                &colored[TagColor::Magenta.ansi().len()..colored.len() - ANSI_RESET.len()],
                line.as_str()
            );
        }
    }
}
