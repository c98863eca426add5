//! Test: Failure Handling - the first non-zero exit ends the run

use crate::helpers::*;
use simrun::core::{ExecutionStatus, StageName, StageStatus};
use simrun::execution::ExecutionEvent;

#[tokio::test]
async fn test_build_failure_stops_everything() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(true, true, true, true));

    let result = run_pipeline_with_mock(&pipeline, vec![2]).await;

    assert_eq!(result.result.status, ExecutionStatus::Failed);
    assert_eq!(result.result.exit_code(), 2);
    assert_eq!(result.stages(), vec![StageName::Build]);
    assert_stage_failed(&result, StageName::Build, 2);
    assert_eq!(result.runner.invocations().len(), 1);
}

#[tokio::test]
async fn test_failure_at_stage_n_records_n_outcomes() {
    // stage order: BUILD, TRAIN, TEST, CLEANUP
    for failing in 1..=3usize {
        let workspace = Workspace::new();
        let pipeline = workspace.pipeline(&standard_stages(true, true, true, true));
        let mut exit_codes = vec![0; failing - 1];
        exit_codes.push(40 + failing as i32);

        let result = run_pipeline_with_mock(&pipeline, exit_codes).await;

        assert_eq!(result.result.outcomes.len(), failing);
        let last = result.result.outcomes.last().unwrap();
        assert!(last.is_failed(), "stage {} should have failed", failing);
        assert_eq!(result.result.exit_code(), 40 + failing as i32);
        assert_eq!(result.runner.invocations().len(), failing);
    }
}

#[tokio::test]
async fn test_skipped_stages_count_towards_position() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(false, true, true, true));

    let result = run_pipeline_with_mock(&pipeline, vec![9]).await;

    assert_eq!(result.stages(), vec![StageName::Build, StageName::Train]);
    assert_stage_status(&result, StageName::Build, &StageStatus::Skipped);
    assert_stage_failed(&result, StageName::Train, 9);
    assert!(result.status_of(StageName::Test).is_none());
}

#[tokio::test]
async fn test_failure_event_carries_exit_code() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(true, true, true, true));

    let result = run_pipeline_with_mock(&pipeline, vec![0, 0, 139]).await;

    assert!(result.events.iter().any(|e| matches!(
        e,
        ExecutionEvent::StageFailed {
            stage: StageName::Test,
            exit_code: 139,
            ..
        }
    )));
    assert!(!result
        .events
        .iter()
        .any(|e| matches!(e, ExecutionEvent::StageStarted { stage: StageName::Cleanup })));
    assert!(matches!(
        result.events.last(),
        Some(ExecutionEvent::PipelineCompleted {
            status: ExecutionStatus::Failed,
            ..
        })
    ));
}

#[tokio::test]
async fn test_cleanup_failure_reports_exit_code_one() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(false, false, false, true));
    std::fs::remove_dir_all(workspace.program_dir()).unwrap();

    let result = run_pipeline_with_mock(&pipeline, vec![]).await;

    assert_eq!(result.result.status, ExecutionStatus::Failed);
    assert_stage_failed(&result, StageName::Cleanup, 1);
}
