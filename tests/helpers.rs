//! Test utility functions for simrun
#![allow(dead_code)]

use async_trait::async_trait;
use simrun::core::config::ExperimentConfig;
use simrun::core::{Pipeline, PipelineResult, StageName, StageStatus};
use simrun::execution::{ExecutionEngine, ExecutionEvent};
use simrun::runner::{CommandSpec, Environment, ProcessRunner, RunnerError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One call the mock runner received
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: CommandSpec,
    pub working_dir: PathBuf,
    pub env: Environment,
}

/// Mock runner that returns predefined exit codes
///
/// Exit codes are handed out in call order; once the queue is empty every
/// command succeeds.
#[derive(Clone, Default)]
pub struct MockRunner {
    exit_codes: Arc<Mutex<VecDeque<i32>>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl MockRunner {
    pub fn new(exit_codes: Vec<i32>) -> Self {
        Self {
            exit_codes: Arc::new(Mutex::new(exit_codes.into())),
            invocations: Arc::default(),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// First argument of each invocation, or the program when there is none
    pub fn flags(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .map(|i| i.command.args.first().cloned().unwrap_or_else(|| i.command.program.clone()))
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for MockRunner {
    async fn run(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
        env: &Environment,
    ) -> Result<i32, RunnerError> {
        self.invocations.lock().unwrap().push(Invocation {
            command: command.clone(),
            working_dir: working_dir.to_path_buf(),
            env: env.clone(),
        });
        Ok(self.exit_codes.lock().unwrap().pop_front().unwrap_or(0))
    }
}

/// Scratch directory laid out like an experiment checkout
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("simrun-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("programs/MLP2")).unwrap();
        std::fs::create_dir_all(root.join("config")).unwrap();
        Self { root }
    }

    pub fn program_dir(&self) -> PathBuf {
        self.root.join("programs/MLP2")
    }

    /// Experiment YAML rooted in this workspace with the given `stages:` body
    pub fn config_yaml(&self, stages: &str) -> String {
        format!(
            r#"
name: "scenario"
program_dir: "{root}/programs"
program: "MLP2"
executable: "mlp2_sim"
simulator:
  config_file: "{root}/config/gpgpusim.config"
precision:
  exponent_width: 8
  significand_width: 7
stages:
{stages}"#,
            root = self.root.display(),
            stages = stages
        )
    }

    pub fn pipeline(&self, stages: &str) -> Pipeline {
        ExperimentConfig::from_yaml(&self.config_yaml(stages))
            .expect("Should parse YAML")
            .to_pipeline()
            .expect("Should resolve pipeline")
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// All four standard stages with the given gates
pub fn standard_stages(build: bool, train: bool, test: bool, cleanup: bool) -> String {
    format!(
        r#"  BUILD:
    RUN: {build}
  TRAIN:
    RUN: {train}
    START_EPOCH: 1
    INPUT_WEIGHTS_FILE: ""
    END_EPOCH: 10000
    OUTPUT_WEIGHTS_FILE: "weights10000.txt"
  TEST:
    RUN: {test}
    WEIGHTS_FILE: "weights10000.txt"
    LOG_FILE: ""
  CLEANUP:
    RUN: {cleanup}
"#
    )
}

/// Base environment handed to the engine in tests
pub fn base_env() -> Environment {
    let mut env = Environment::new();
    env.insert("PATH".to_string(), "/usr/bin:/bin".to_string());
    env.insert("VF_SIGNIFICAND".to_string(), "53".to_string());
    env
}

/// Result of running a pipeline against a mock runner
pub struct PipelineTestResult {
    pub result: PipelineResult,
    pub runner: MockRunner,
    pub events: Vec<ExecutionEvent>,
}

impl PipelineTestResult {
    pub fn stages(&self) -> Vec<StageName> {
        self.result.outcomes.iter().map(|o| o.stage).collect()
    }

    pub fn status_of(&self, stage: StageName) -> Option<&StageStatus> {
        self.result
            .outcomes
            .iter()
            .find(|o| o.stage == stage)
            .map(|o| &o.status)
    }
}

/// Run a pipeline with a mock runner that returns predefined exit codes
pub async fn run_pipeline_with_mock(pipeline: &Pipeline, exit_codes: Vec<i32>) -> PipelineTestResult {
    let runner = MockRunner::new(exit_codes);
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut engine = ExecutionEngine::new(runner.clone(), base_env());
    let sink = events.clone();
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));

    let result = engine.execute(pipeline).await;
    let events = events.lock().unwrap().clone();

    PipelineTestResult {
        result,
        runner,
        events,
    }
}

/// Assert a stage ended with the given status
pub fn assert_stage_status(result: &PipelineTestResult, stage: StageName, expected: &StageStatus) {
    let status = result
        .status_of(stage)
        .unwrap_or_else(|| panic!("Stage {} has no outcome: {:?}", stage, result.stages()));
    assert_eq!(status, expected, "Stage {} status", stage);
}

/// Assert a stage failed with the given exit code
pub fn assert_stage_failed(result: &PipelineTestResult, stage: StageName, exit_code: i32) {
    match result.status_of(stage) {
        Some(StageStatus::Failed { exit_code: code, .. }) => {
            assert_eq!(*code, exit_code, "Stage {} exit code", stage)
        }
        other => panic!("Expected {} to fail, got {:?}", stage, other),
    }
}
