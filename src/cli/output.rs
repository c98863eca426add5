//! CLI output formatting

use crate::{
    comparator::Comparison,
    core::{ExecutionStatus, PipelineResult, StageName, StageStatus},
    execution::ExecutionEvent,
    precision::MpfrRange,
    runner::environment::{VF_EXPONENT_MAX, VF_EXPONENT_MIN, VF_SIGNIFICAND},
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");

/// `[STAGE] message` banner, in green so it stands out from child output
pub fn stage_banner(stage: StageName, message: &str) -> String {
    style(format!("[{}] {}", stage, message)).green().to_string()
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> Option<String> {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name,
        } => Some(format!(
            "{}Starting pipeline {} ({})",
            INFO,
            style(pipeline_name).bold(),
            style(&execution_id.to_string()[..8]).dim()
        )),
        ExecutionEvent::StageStarted { stage } => Some(stage_banner(*stage, "Starting...")),
        ExecutionEvent::StageSkipped { stage } => Some(stage_banner(*stage, "Skipped")),
        ExecutionEvent::StageCompleted { stage } => Some(stage_banner(*stage, "Completed!")),
        ExecutionEvent::StageFailed { exit_code, .. } => Some(
            style(format!("Error: return code {}", exit_code))
                .red()
                .to_string(),
        ),
        ExecutionEvent::PipelineCompleted { .. } => None,
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// One line per stage reached
pub fn format_result(result: &PipelineResult) -> String {
    let mut lines = Vec::with_capacity(result.outcomes.len());
    for outcome in &result.outcomes {
        let status = match &outcome.status {
            StageStatus::Succeeded => format!("{}{}", CHECK, style("succeeded").green()),
            StageStatus::Skipped => style("skipped").dim().to_string(),
            StageStatus::Failed { exit_code, .. } => {
                format!("{}{} (exit {})", CROSS, style("failed").red(), exit_code)
            }
        };
        let elapsed = outcome
            .finished_at
            .signed_duration_since(outcome.started_at)
            .to_std()
            .map(format_duration)
            .unwrap_or_default();
        lines.push(format!("  {:<8} {} {}", outcome.stage.as_str(), status, style(elapsed).dim()));
    }
    lines.join("\n")
}

/// Final status with per-status stage counts
pub fn format_summary(result: &PipelineResult) -> String {
    format!(
        "Status: {} ({} succeeded, {} skipped, {} failed)",
        format_status(result.status),
        result.count(|s| matches!(s, StageStatus::Succeeded)),
        result.count(|s| matches!(s, StageStatus::Skipped)),
        result.count(|s| matches!(s, StageStatus::Failed { .. })),
    )
}

/// Shell-style assignments for the simulator's precision variables
pub fn format_precision(range: &MpfrRange) -> String {
    format!(
        "{:<15} = {}\n{:<15} = {}\n{:<15} = {}",
        VF_SIGNIFICAND,
        range.significand,
        VF_EXPONENT_MIN,
        range.exponent_min,
        VF_EXPONENT_MAX,
        range.exponent_max
    )
}

pub fn format_comparison(comparison: &Comparison) -> String {
    format!(
        "{} deteriorations: {:?}\n{} improvements: {:?}",
        comparison.deterioration.len(),
        comparison.deterioration,
        comparison.improvement.len(),
        comparison.improvement
    )
}

pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
