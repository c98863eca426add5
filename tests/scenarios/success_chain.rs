//! Test: Success Chain - every enabled stage runs in order

use crate::helpers::*;
use simrun::core::{ExecutionStatus, StageName, StageStatus};
use simrun::execution::ExecutionEvent;

#[tokio::test]
async fn test_all_stages_succeed() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(true, true, true, true));

    let result = run_pipeline_with_mock(&pipeline, vec![]).await;

    assert_eq!(result.result.status, ExecutionStatus::Completed);
    assert_eq!(result.result.exit_code(), 0);
    assert_eq!(
        result.stages(),
        vec![StageName::Build, StageName::Train, StageName::Test, StageName::Cleanup]
    );
    for stage in result.stages() {
        assert_stage_status(&result, stage, &StageStatus::Succeeded);
    }

    // cleanup runs in-process, the rest are subprocesses
    assert_eq!(result.runner.flags(), vec!["make", "-train", "-test"]);
}

#[tokio::test]
async fn test_commands_run_in_program_directory() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(true, true, true, false));

    let result = run_pipeline_with_mock(&pipeline, vec![]).await;

    for invocation in result.runner.invocations() {
        assert_eq!(invocation.working_dir, workspace.program_dir());
    }
}

#[tokio::test]
async fn test_simulator_environment_injected() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(true, true, true, false));

    let result = run_pipeline_with_mock(&pipeline, vec![]).await;
    let invocations = result.runner.invocations();

    // build sees the untouched base environment
    assert_eq!(invocations[0].env, base_env());

    let config_path = workspace.root.join("config/gpgpusim.config").display().to_string();
    for simulator_run in &invocations[1..] {
        let env = &simulator_run.env;
        assert_eq!(env["SIM_CONFIG_PATH"], config_path);
        assert_eq!(env["VF_SIGNIFICAND"], "8");
        assert_eq!(env["VF_EXPONENT_MIN"], "-132");
        assert_eq!(env["VF_EXPONENT_MAX"], "128");
        assert_eq!(env["PATH"], "/usr/bin:/bin");
    }
}

#[tokio::test]
async fn test_stage_events_reported() {
    let workspace = Workspace::new();
    let pipeline = workspace.pipeline(&standard_stages(true, false, true, false));

    let result = run_pipeline_with_mock(&pipeline, vec![]).await;
    let stage_events: Vec<_> = result
        .events
        .iter()
        .filter(|e| {
            !matches!(
                e,
                ExecutionEvent::PipelineStarted { .. } | ExecutionEvent::PipelineCompleted { .. }
            )
        })
        .cloned()
        .collect();

    assert_eq!(
        stage_events,
        vec![
            ExecutionEvent::StageStarted { stage: StageName::Build },
            ExecutionEvent::StageCompleted { stage: StageName::Build },
            ExecutionEvent::StageSkipped { stage: StageName::Train },
            ExecutionEvent::StageStarted { stage: StageName::Test },
            ExecutionEvent::StageCompleted { stage: StageName::Test },
            ExecutionEvent::StageSkipped { stage: StageName::Cleanup },
        ]
    );
    assert!(matches!(
        result.events.last(),
        Some(ExecutionEvent::PipelineCompleted {
            status: ExecutionStatus::Completed,
            ..
        })
    ));
}

#[tokio::test]
async fn test_cleanup_removes_simulator_artifacts() {
    let workspace = Workspace::new();
    let program_dir = workspace.program_dir();
    for name in ["_cuobjdump_list_ptx_3f2a", "_app_cuda_version_Xy12", "weights10000.txt"] {
        std::fs::write(program_dir.join(name), "x").unwrap();
    }
    let pipeline = workspace.pipeline(&standard_stages(false, false, false, true));

    let result = run_pipeline_with_mock(&pipeline, vec![]).await;

    assert_stage_status(&result, StageName::Cleanup, &StageStatus::Succeeded);
    assert!(!program_dir.join("_cuobjdump_list_ptx_3f2a").exists());
    assert!(!program_dir.join("_app_cuda_version_Xy12").exists());
    assert!(program_dir.join("weights10000.txt").exists());
}
