//! Stage executor - turns a stage into a command and runs it

use crate::{
    core::{RunSettings, Stage, StageKind, StageName},
    runner::{CommandSpec, Environment, ProcessRunner, RunnerError},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Why a stage did not succeed
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} exited with return code {exit_code}")]
    ExecutionFailure { stage: StageName, exit_code: i32 },

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Failed to remove {path}: {source}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StageError {
    /// Exit code reported for this failure; 1 when no subprocess produced one
    pub fn exit_code(&self) -> i32 {
        match self {
            StageError::ExecutionFailure { exit_code, .. } => *exit_code,
            StageError::Runner(_) | StageError::Cleanup { .. } => 1,
        }
    }
}

/// Executes single stages
pub struct StageExecutor<R> {
    runner: R,

    /// Process environment captured at startup
    base_env: Environment,
}

impl<R: ProcessRunner> StageExecutor<R> {
    pub fn new(runner: R, base_env: Environment) -> Self {
        Self { runner, base_env }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// The command a stage runs, or `None` for stages handled in-process
    pub fn command_for(stage: &Stage, settings: &RunSettings) -> Option<CommandSpec> {
        let executable = settings.executable.display().to_string();

        let command = match &stage.kind {
            StageKind::Setup { command } => argv(command),
            StageKind::Build => argv(&settings.build_command),
            StageKind::Train(params) if params.is_incremental() => CommandSpec::new(executable)
                .arg("-train-increment")
                .arg(params.start_epoch.to_string())
                .arg(params.end_epoch.to_string())
                .arg(params.input_weights_file.clone().unwrap_or_default())
                .arg(params.output_weights_file.clone()),
            StageKind::Train(params) => CommandSpec::new(executable)
                .arg("-train")
                .arg(params.end_epoch.to_string())
                .arg(params.output_weights_file.clone()),
            StageKind::Test(params) => {
                let command = CommandSpec::new(executable)
                    .arg("-test")
                    .arg(params.weights_file.clone());
                match &params.log_file {
                    Some(log_file) => command.with_stdout_file(log_file),
                    None => command,
                }
            }
            StageKind::Cleanup => return None,
        };

        match &settings.setup_script {
            Some(script) if stage.name().needs_simulator() => Some(command.sourcing(script)),
            _ => Some(command),
        }
    }

    /// Environment for one invocation of a stage, derived fresh each time
    pub fn environment_for(&self, stage: StageName, settings: &RunSettings) -> Environment {
        if stage.needs_simulator() {
            settings.simulator.apply(&self.base_env)
        } else {
            self.base_env.clone()
        }
    }

    /// Execute a stage to completion
    pub async fn execute(&self, stage: &Stage, settings: &RunSettings) -> Result<(), StageError> {
        let name = stage.name();

        let Some(command) = Self::command_for(stage, settings) else {
            let removed = remove_artifacts(&settings.working_dir, &settings.cleanup_prefixes)?;
            info!("Removed {} simulator artifact(s)", removed.len());
            return Ok(());
        };

        let env = self.environment_for(name, settings);
        info!("{}: running `{}`", name, command);

        let exit_code = self.runner.run(&command, &settings.working_dir, &env).await?;
        debug!("{} finished with exit code {}", name, exit_code);

        if exit_code != 0 {
            return Err(StageError::ExecutionFailure {
                stage: name,
                exit_code,
            });
        }
        Ok(())
    }
}

fn argv(command: &[String]) -> CommandSpec {
    match command.split_first() {
        Some((program, args)) => CommandSpec::new(program.clone()).args(args.iter().cloned()),
        None => CommandSpec::new(String::new()),
    }
}

/// Delete files in `dir` whose names start with one of `prefixes`.
///
/// Finding nothing to delete is not an error. Returns the removed paths.
pub fn remove_artifacts(dir: &Path, prefixes: &[String]) -> Result<Vec<PathBuf>, StageError> {
    let cleanup_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| StageError::Cleanup { path, source }
    };

    let mut removed = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(cleanup_error(dir))? {
        let entry = entry.map_err(cleanup_error(dir))?;
        let path = entry.path();

        let is_dir = entry.file_type().map_err(cleanup_error(&path))?.is_dir();
        let name = entry.file_name();
        let matches = name
            .to_str()
            .is_some_and(|name| prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())));

        if matches && !is_dir {
            std::fs::remove_file(&path).map_err(cleanup_error(&path))?;
            debug!("Removed {}", path.display());
            removed.push(path);
        }
    }
    removed.sort();
    Ok(removed)
}
