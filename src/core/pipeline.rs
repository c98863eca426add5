//! Pipeline domain model

use crate::core::{Stage, StageName};
use crate::runner::SimulatorEnvironment;
use std::path::PathBuf;

/// Everything the stages need besides their own parameters.
///
/// Built once from the configuration; read-only while the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Directory every command runs in
    pub working_dir: PathBuf,

    /// Application binary driven by the simulator stages
    pub executable: PathBuf,

    /// Build invocation, program first
    pub build_command: Vec<String>,

    /// Variables handed to simulator runs
    pub simulator: SimulatorEnvironment,

    /// Script sourced before every simulator command
    pub setup_script: Option<PathBuf>,

    /// File name prefixes of simulator droppings removed by cleanup
    pub cleanup_prefixes: Vec<String>,
}

/// A pipeline definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    pub settings: RunSettings,

    /// Stages in execution order
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Create a pipeline, putting stages into canonical order
    pub fn new(name: String, settings: RunSettings, mut stages: Vec<Stage>) -> Self {
        stages.sort_by_key(|s| s.name());
        Self {
            name,
            settings,
            stages,
        }
    }

    /// Get a stage by name
    pub fn stage(&self, name: StageName) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name() == name)
    }

    pub fn enabled_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|s| s.enabled)
    }
}
