//! Build, install, launch, then follow the logs
//!
//! Steps run strictly in order and the first failure aborts the rest. Its
//! exit code becomes the pipeline's exit code.

use crate::adb::Adb;
use crate::gradle;
use llmserver_cli::output::{format_duration, Status};
use llmserver_core::config::{AppConfig, BuildConfig, ConfigSchema, TagStyle, ToolsConfig};
use llmserver_core::error::{exit_codes, Error, Result};
use llmserver_core::process::{CommandExecutor, CommandSpec};
use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Assemble the debug APK with Gradle
    Build,
    /// `adb install -r` the APK
    Install,
    /// Start the app through monkey
    Launch,
    /// Follow the app's logcat output
    StreamLogs,
}

impl Step {
    /// All steps in execution order
    pub const ALL: [Step; 4] = [Step::Build, Step::Install, Step::Launch, Step::StreamLogs];

    /// Banner title shown when the step starts
    pub fn title(self) -> &'static str {
        match self {
            Step::Build => "Building APK",
            Step::Install => "Installing APK",
            Step::Launch => "Launching App with Monkey",
            Step::StreamLogs => "Streaming Logcat",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Build => "build",
            Step::Install => "install",
            Step::Launch => "launch",
            Step::StreamLogs => "stream-logs",
        };
        f.write_str(name)
    }
}

/// The step that stopped the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// Step that failed
    pub step: Step,
    /// Exit code the pipeline finishes with
    pub exit_code: i32,
    /// Set when the step failed before or instead of running its command
    pub error: Option<String>,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Steps that finished successfully, in order
    pub completed: Vec<Step>,
    /// The failure that stopped the run, if any
    pub failure: Option<StepFailure>,
}

impl PipelineReport {
    /// 0 on full success, otherwise the failing step's code
    pub fn exit_code(&self) -> i32 {
        self.failure
            .as_ref()
            .map_or(exit_codes::SUCCESS, |f| f.exit_code)
    }
}

/// Build-install-launch-stream runner
#[derive(Debug, Clone)]
pub struct Pipeline {
    app: AppConfig,
    build: BuildConfig,
    tools: ToolsConfig,
    tags: Vec<TagStyle>,
    adb: Adb,
    settle_delay: Duration,
}

impl Pipeline {
    /// Pipeline for the app and tools described by `schema`
    pub fn new(schema: &ConfigSchema) -> Self {
        Self {
            app: schema.app.clone(),
            build: schema.build.clone(),
            tools: schema.tools.clone(),
            tags: schema.logcat.tags.clone(),
            adb: Adb::new(&schema.tools),
            settle_delay: Duration::from_millis(schema.logcat.settle_delay_ms),
        }
    }

    /// Where the install step expects the APK
    pub fn artifact_path(&self) -> PathBuf {
        self.build.artifact_path()
    }

    /// External command behind `step`
    pub fn command_for(&self, step: Step) -> CommandSpec {
        match step {
            Step::Build => gradle::assemble(&self.tools, &self.build),
            Step::Install => self.adb.install(&self.artifact_path()),
            Step::Launch => self.adb.monkey_launch(&self.app),
            Step::StreamLogs => self.adb.logcat(&self.tags),
        }
    }

    /// Run every step, stopping at the first failure
    ///
    /// `stream` performs the final step and returns its exit code; it is
    /// only called when the first three steps succeed.
    pub fn run<E, F>(&self, executor: &mut E, stream: F) -> PipelineReport
    where
        E: CommandExecutor,
        F: FnOnce() -> Result<i32>,
    {
        if !self.adb.is_available() {
            warn!(adb = self.adb.program(), "adb not found on PATH");
        }

        let mut report = PipelineReport::default();
        let mut stream = Some(stream);

        for step in Step::ALL {
            Status::banner(step.title());
            let started = Instant::now();

            let outcome = match step {
                Step::StreamLogs => self.stream_logs(stream.take()),
                _ => self.run_command_step(step, executor),
            };

            match outcome {
                Ok(0) => {
                    let elapsed = format_duration(started.elapsed());
                    info!(step = %step, elapsed = %elapsed, "Step finished");
                    report.completed.push(step);
                }
                Ok(code) => {
                    Status::error(&format!("Command failed with exit code {}", code));
                    report.failure = Some(StepFailure {
                        step,
                        exit_code: code,
                        error: None,
                    });
                    break;
                }
                Err(e) => {
                    Status::error(&e.message);
                    if let Some(context) = &e.context {
                        Status::info(context);
                    }
                    if let Some(suggestion) = &e.suggestion {
                        Status::info(suggestion);
                    }
                    report.failure = Some(StepFailure {
                        step,
                        exit_code: e.exit_code(),
                        error: Some(e.to_string()),
                    });
                    break;
                }
            }
        }

        report
    }

    fn run_command_step<E: CommandExecutor>(&self, step: Step, executor: &mut E) -> Result<i32> {
        match step {
            Step::Install => {
                let apk = self.artifact_path();
                if !apk.exists() {
                    return Err(Error::artifact_not_found(&apk));
                }
            }
            Step::Launch => Status::info(&format!("Target: {}", self.app.component())),
            _ => {}
        }

        let spec = self.command_for(step);
        Status::command(&spec.to_string());
        executor.execute(&spec)
    }

    fn stream_logs<F>(&self, stream: Option<F>) -> Result<i32>
    where
        F: FnOnce() -> Result<i32>,
    {
        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        let names: Vec<&str> = self.tags.iter().map(|t| t.name.as_str()).collect();
        Status::command(&self.command_for(Step::StreamLogs).to_string());
        println!("Using filters: {}", names.join(", "));

        match stream {
            Some(stream) => stream(),
            None => Ok(exit_codes::SUCCESS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmserver_core::ErrorCode;
    use std::cell::Cell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Executor answering with scripted exit codes, recording every call
    struct ScriptedExecutor {
        codes: Vec<Result<i32>>,
        calls: Vec<CommandSpec>,
    }

    impl ScriptedExecutor {
        fn new(codes: Vec<Result<i32>>) -> Self {
            Self {
                codes,
                calls: Vec::new(),
            }
        }
    }

    impl CommandExecutor for ScriptedExecutor {
        fn execute(&mut self, spec: &CommandSpec) -> Result<i32> {
            self.calls.push(spec.clone());
            if self.codes.is_empty() {
                Ok(0)
            } else {
                self.codes.remove(0)
            }
        }
    }

    fn project(with_apk: bool) -> (TempDir, Pipeline) {
        let dir = tempfile::tempdir().unwrap();
        let mut schema = ConfigSchema::default();
        schema.build.project_dir = dir.path().to_path_buf();
        schema.logcat.settle_delay_ms = 0;
        if with_apk {
            let apk = schema.build.artifact_path();
            std::fs::create_dir_all(apk.parent().unwrap()).unwrap();
            std::fs::write(&apk, b"apk").unwrap();
        }
        (dir, Pipeline::new(&schema))
    }

    fn is_install(spec: &CommandSpec) -> bool {
        spec.args.iter().any(|a| a == "install")
    }

    #[test]
    fn test_full_success() {
        let (_dir, pipeline) = project(true);
        let mut exec = ScriptedExecutor::new(Vec::new());
        let streamed = Cell::new(false);

        let report = pipeline.run(&mut exec, || {
            streamed.set(true);
            Ok(0)
        });

        assert!(report.failure.is_none());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.completed, Step::ALL.to_vec());
        assert!(streamed.get());
        assert_eq!(exec.calls.len(), 3);
        assert_eq!(exec.calls[0].args, vec!["assembleDebug"]);
        assert!(is_install(&exec.calls[1]));
        assert!(exec.calls[2].args.contains(&"monkey".to_string()));
    }

    #[test]
    fn test_failure_at_each_step_stops_later_steps() {
        for (index, step) in Step::ALL.iter().enumerate() {
            let (_dir, pipeline) = project(true);
            let code = 10 + index as i32;
            let mut codes: Vec<Result<i32>> = (0..index.min(3)).map(|_| Ok(0)).collect();
            if index < 3 {
                codes.push(Ok(code));
            }
            let mut exec = ScriptedExecutor::new(codes);
            let streamed = Cell::new(false);

            let report = pipeline.run(&mut exec, || {
                streamed.set(true);
                Ok(code)
            });

            assert_eq!(report.exit_code(), code, "step {}", step);
            assert_eq!(report.failure.as_ref().unwrap().step, *step);
            assert_eq!(report.completed, Step::ALL[..index].to_vec());
            assert_eq!(exec.calls.len(), index.min(3) + usize::from(index < 3));
            assert_eq!(streamed.get(), index == 3);
        }
    }

    #[test]
    fn test_missing_artifact_skips_install_command() {
        let (_dir, pipeline) = project(false);
        let mut exec = ScriptedExecutor::new(Vec::new());
        let streamed = Cell::new(false);

        let report = pipeline.run(&mut exec, || {
            streamed.set(true);
            Ok(0)
        });

        assert_eq!(report.exit_code(), 1);
        let failure = report.failure.unwrap();
        assert_eq!(failure.step, Step::Install);
        let error = failure.error.unwrap();
        assert!(error.contains("APK not found. Did the build succeed?"));
        assert!(error.contains("app-debug.apk"));
        assert_eq!(exec.calls.len(), 1);
        assert!(!exec.calls.iter().any(is_install));
        assert!(!streamed.get());
    }

    #[test]
    fn test_spawn_error_maps_to_exit_code() {
        let (_dir, pipeline) = project(true);
        let mut exec = ScriptedExecutor::new(vec![Err(Error::command_not_found("gradlew"))]);

        let report = pipeline.run(&mut exec, || Ok(0));

        assert_eq!(report.exit_code(), 127);
        assert_eq!(report.failure.unwrap().step, Step::Build);
    }

    #[test]
    fn test_stream_error_is_reported() {
        let (_dir, pipeline) = project(true);
        let mut exec = ScriptedExecutor::new(Vec::new());

        let report = pipeline.run(&mut exec, || {
            Err(Error::new(ErrorCode::StreamClosed, "gave up"))
        });

        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.completed.len(), 3);
    }

    #[test]
    fn test_command_for_each_step() {
        let (dir, pipeline) = project(true);
        let build = pipeline.command_for(Step::Build);
        assert!(build.program.ends_with("gradlew") || build.program.ends_with("gradlew.bat"));
        assert_eq!(build.cwd.as_deref(), Some(dir.path()));

        let install = pipeline.command_for(Step::Install);
        assert_eq!(install.args[..2], ["install", "-r"]);
        assert!(Path::new(&install.args[2]).starts_with(dir.path()));

        let launch = pipeline.command_for(Step::Launch);
        assert_eq!(
            launch.args,
            vec![
                "shell",
                "monkey",
                "-p",
                "com.example.llmserverapp",
                "-c",
                "android.intent.category.LAUNCHER",
                "1"
            ]
        );

        let logs = pipeline.command_for(Step::StreamLogs);
        assert_eq!(logs.args[0], "logcat");
    }

    #[test]
    fn test_step_display() {
        assert_eq!(Step::StreamLogs.to_string(), "stream-logs");
        assert_eq!(Step::Launch.title(), "Launching App with Monkey");
    }
}
