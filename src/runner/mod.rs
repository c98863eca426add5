//! Subprocess execution: environment composition and live output streaming

pub mod environment;
pub mod process;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use environment::{build_environment, Environment, SimulatorEnvironment};
pub use process::{OutputSink, OutputStream, StdoutSink, SubprocessRunner};

/// Error types for launching subprocesses
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A command as an explicit program plus argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,

    /// Send the child's stdout to this file instead of the console
    pub stdout_file: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout_file: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_stdout_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_file = Some(path.into());
        self
    }

    /// Wrap the command so that a shell script is sourced before it runs.
    ///
    /// Arguments are passed positionally to `bash`, so nothing is interpolated
    /// into the script text.
    pub fn sourcing(self, script: &Path) -> Self {
        let mut args = vec![
            "-c".to_string(),
            r#". "$0"; exec "$@""#.to_string(),
            script.display().to_string(),
            self.program,
        ];
        args.extend(self.args);
        Self {
            program: "bash".to_string(),
            args,
            stdout_file: self.stdout_file,
        }
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        if let Some(path) = &self.stdout_file {
            write!(f, " > {}", path.display())?;
        }
        Ok(())
    }
}

/// Trait for running one command to completion - allows for mock runners
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `command` in `working_dir` with exactly `env`, returning its exit code
    async fn run(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
        env: &Environment,
    ) -> Result<i32, RunnerError>;
}
