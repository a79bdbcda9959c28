//! Gradle build system integration
//!
//! Builds command descriptions for the Gradle wrapper.

use llmserver_core::config::{BuildConfig, ToolsConfig};
use llmserver_core::process::CommandSpec;
use std::path::{Path, PathBuf};

/// Resolve the Gradle wrapper against the project directory
///
/// Absolute wrappers are used as-is. Relative ones live in the project root
/// and are anchored to the current directory, since the child process runs
/// inside the project root.
pub fn wrapper_path(tools: &ToolsConfig, build: &BuildConfig) -> PathBuf {
    let wrapper = Path::new(&tools.gradle);
    if wrapper.is_absolute() {
        return wrapper.to_path_buf();
    }
    let project = build.project_dir.join(wrapper);
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(project),
        Err(_) => project,
    }
}

/// Command running a Gradle task in the project directory
pub fn task(tools: &ToolsConfig, build: &BuildConfig, task: &str) -> CommandSpec {
    CommandSpec::new(wrapper_path(tools, build).to_string_lossy())
        .arg(task)
        .current_dir(&build.project_dir)
}

/// Command building the configured APK (`assembleDebug` by default)
pub fn assemble(tools: &ToolsConfig, build: &BuildConfig) -> CommandSpec {
    task(tools, build, &build.gradle_task)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_resolved_in_project_dir() {
        let tools = ToolsConfig::default();
        let build = BuildConfig {
            project_dir: PathBuf::from("android"),
            ..BuildConfig::default()
        };
        let path = wrapper_path(&tools, &build);
        assert!(path.is_absolute());
        assert!(path.ends_with(Path::new("android").join(&tools.gradle)));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_wrapper_kept() {
        let tools = ToolsConfig {
            gradle: "/opt/gradle/bin/gradle".to_string(),
            ..ToolsConfig::default()
        };
        let path = wrapper_path(&tools, &BuildConfig::default());
        assert_eq!(path, PathBuf::from("/opt/gradle/bin/gradle"));
    }

    #[test]
    fn test_assemble_debug_command() {
        let build = BuildConfig::default();
        let spec = assemble(&ToolsConfig::default(), &build);
        assert_eq!(spec.args, vec!["assembleDebug"]);
        assert_eq!(spec.cwd, Some(PathBuf::from(".")));
    }
}
