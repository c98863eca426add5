//! Main execution engine - orchestrates the entire pipeline run

use crate::{
    core::{ExecutionStatus, Pipeline, PipelineResult, StageName, StageOutcome, StageStatus},
    execution::StageExecutor,
    runner::{Environment, ProcessRunner},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
    },
    StageStarted {
        stage: StageName,
    },
    StageSkipped {
        stage: StageName,
    },
    StageCompleted {
        stage: StageName,
    },
    StageFailed {
        stage: StageName,
        exit_code: i32,
        error: String,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Runs the stages of a pipeline in order, stopping at the first failure.
///
/// Failed stages are never retried.
pub struct ExecutionEngine<R> {
    executor: StageExecutor<R>,
    event_handlers: Vec<EventHandler>,
}

impl<R: ProcessRunner> ExecutionEngine<R> {
    /// Create an engine whose stages inherit `base_env`
    pub fn new(runner: R, base_env: Environment) -> Self {
        Self {
            executor: StageExecutor::new(runner, base_env),
            event_handlers: Vec::new(),
        }
    }

    pub fn runner(&self) -> &R {
        self.executor.runner()
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute the entire pipeline
    pub async fn execute(&self, pipeline: &Pipeline) -> PipelineResult {
        let mut result = PipelineResult::new();
        let execution_id = result.execution_id;

        info!("Starting pipeline execution: {} ({})", pipeline.name, execution_id);
        result.start();
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name: pipeline.name.clone(),
        });

        for stage in &pipeline.stages {
            let name = stage.name();
            let started_at = Utc::now();

            if !stage.enabled {
                info!("Skipping disabled stage {}", name);
                result.record(StageOutcome {
                    stage: name,
                    status: StageStatus::Skipped,
                    started_at,
                    finished_at: started_at,
                });
                self.emit_event(ExecutionEvent::StageSkipped { stage: name });
                continue;
            }

            self.emit_event(ExecutionEvent::StageStarted { stage: name });

            match self.executor.execute(stage, &pipeline.settings).await {
                Ok(()) => {
                    result.record(StageOutcome {
                        stage: name,
                        status: StageStatus::Succeeded,
                        started_at,
                        finished_at: Utc::now(),
                    });
                    self.emit_event(ExecutionEvent::StageCompleted { stage: name });
                }
                Err(e) => {
                    let exit_code = e.exit_code();
                    error!("Stage {} failed: {}", name, e);
                    result.record(StageOutcome {
                        stage: name,
                        status: StageStatus::Failed {
                            exit_code,
                            error: e.to_string(),
                        },
                        started_at,
                        finished_at: Utc::now(),
                    });
                    self.emit_event(ExecutionEvent::StageFailed {
                        stage: name,
                        exit_code,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        result.complete();
        info!(
            "Pipeline execution finished: {} - {:?}",
            pipeline.name, result.status
        );
        self.emit_event(ExecutionEvent::PipelineCompleted {
            execution_id,
            status: result.status,
        });

        result
    }
}
