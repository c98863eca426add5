//! Execution state models

use crate::core::StageName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every enabled stage succeeded
    Completed,
    /// A stage failed and the rest were abandoned
    Failed,
}

/// Outcome of a single stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageStatus {
    Succeeded,
    Skipped,
    Failed { exit_code: i32, error: String },
}

/// Recorded result of one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: StageName,
    pub status: StageStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl StageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, StageStatus::Failed { .. })
    }
}

/// Ordered record of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution completed/failed
    pub completed_at: Option<DateTime<Utc>>,

    /// One entry per stage reached, in execution order
    pub outcomes: Vec<StageOutcome>,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            outcomes: Vec::new(),
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Append a stage outcome. A failed outcome ends the run.
    pub fn record(&mut self, outcome: StageOutcome) {
        if self.is_finished() {
            return;
        }
        let failed = outcome.is_failed();
        self.outcomes.push(outcome);
        if failed {
            self.status = ExecutionStatus::Failed;
            self.completed_at = Some(Utc::now());
        }
    }

    /// Mark pipeline as completed unless a stage already failed
    pub fn complete(&mut self) {
        if self.status == ExecutionStatus::Failed {
            return;
        }
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }

    /// The failing stage, if any
    pub fn failure(&self) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.is_failed())
    }

    /// Exit code of the first failing stage, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        match self.failure().map(|o| &o.status) {
            Some(StageStatus::Failed { exit_code, .. }) => *exit_code,
            _ => 0,
        }
    }

    /// Number of recorded stages whose status matches
    pub fn count(&self, status: fn(&StageStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| status(&o.status)).count()
    }
}

impl Default for PipelineResult {
    fn default() -> Self {
        Self::new()
    }
}
