//! simrun - staged simulator experiments with reduced-precision emulation

pub mod cli;
pub mod comparator;
pub mod core;
pub mod execution;
pub mod precision;
pub mod runner;

// Re-export commonly used types
pub use crate::comparator::{compare_files, compare_results, Comparison};
pub use crate::core::{ExecutionStatus, Pipeline, PipelineResult, Stage, StageKind, StageName, StageStatus};
pub use crate::execution::{ExecutionEngine, ExecutionEvent};
pub use crate::precision::{components, derive_mpfr_range, significand_length, MpfrRange, PrecisionError};
pub use crate::runner::{build_environment, CommandSpec, Environment, ProcessRunner, SubprocessRunner};
