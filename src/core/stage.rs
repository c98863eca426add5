//! Stage domain model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a pipeline stage, in canonical execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StageName {
    Setup,
    Build,
    Train,
    Test,
    Cleanup,
}

impl StageName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Setup => "SETUP",
            StageName::Build => "BUILD",
            StageName::Train => "TRAIN",
            StageName::Test => "TEST",
            StageName::Cleanup => "CLEANUP",
        }
    }

    /// Whether the stage runs against the simulator and needs its environment
    pub fn needs_simulator(&self) -> bool {
        matches!(self, StageName::Setup | StageName::Train | StageName::Test)
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Training parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainParams {
    pub start_epoch: u32,
    pub end_epoch: u32,

    /// Weights to resume from; only used for incremental training
    pub input_weights_file: Option<String>,
    pub output_weights_file: String,
}

impl TrainParams {
    /// Training resumes from existing weights when it does not start at epoch 1
    pub fn is_incremental(&self) -> bool {
        self.start_epoch > 1
    }
}

/// Inference parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestParams {
    pub weights_file: String,

    /// Simulator stdout goes here instead of the console
    pub log_file: Option<String>,
}

/// What a stage does, with the parameters of that kind of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageKind {
    /// Arbitrary preparation command run with the simulator environment
    Setup { command: Vec<String> },
    Build,
    Train(TrainParams),
    Test(TestParams),
    Cleanup,
}

/// A single step in the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub kind: StageKind,
    pub enabled: bool,
}

impl Stage {
    pub fn new(kind: StageKind, enabled: bool) -> Self {
        Self { kind, enabled }
    }

    pub fn name(&self) -> StageName {
        match self.kind {
            StageKind::Setup { .. } => StageName::Setup,
            StageKind::Build => StageName::Build,
            StageKind::Train(_) => StageName::Train,
            StageKind::Test(_) => StageName::Test,
            StageKind::Cleanup => StageName::Cleanup,
        }
    }
}
