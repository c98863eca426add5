//! Experiment configuration from YAML

use crate::core::{Pipeline, RunSettings, Stage, StageKind, TestParams, TrainParams};
use crate::precision::{MpfrRange, PrecisionProfile};
use crate::runner::SimulatorEnvironment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Files the simulator leaves behind in the application directory
pub const DEFAULT_CLEANUP_PREFIXES: [&str; 2] = ["_cuobjdump_list_ptx_", "_app_cuda_version_"];

/// Error types for loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level experiment configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Experiment name
    pub name: String,

    /// Directory holding the applications
    pub program_dir: PathBuf,

    /// Application directory under `program_dir`; commands run here
    pub program: String,

    /// Application binary inside the program directory
    pub executable: String,

    /// Build invocation, program first
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    pub simulator: SimulatorConfig,

    pub precision: PrecisionConfig,

    #[serde(default = "default_cleanup_prefixes")]
    pub cleanup_prefixes: Vec<String>,

    pub stages: StagesConfig,
}

/// Simulator location and configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Simulator configuration file, exported as `SIM_CONFIG_PATH`
    pub config_file: PathBuf,

    /// Shell script sourced before each simulator run
    #[serde(default)]
    pub setup_script: Option<PathBuf>,
}

/// Precision of the emulated float type
///
/// Either the field widths of the target format, from which the MPFR
/// parameters are derived, or the MPFR parameters themselves. The two
/// shapes are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrecisionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent_width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significand_width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub significand: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent_min: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exponent_max: Option<i64>,
}

impl PrecisionConfig {
    /// Resolve to the values exported to the simulator
    pub fn mpfr_range(&self) -> Result<MpfrRange, ConfigError> {
        let invalid = |e: String| ConfigError::Invalid(format!("precision: {}", e));
        match (
            self.exponent_width,
            self.significand_width,
            self.significand,
            self.exponent_min,
            self.exponent_max,
        ) {
            (Some(exponent_width), Some(significand_width), None, None, None) => {
                PrecisionProfile::new(exponent_width, significand_width)
                    .map(|profile| profile.mpfr)
                    .map_err(|e| invalid(e.to_string()))
            }
            (None, None, Some(significand), Some(exponent_min), Some(exponent_max)) => {
                MpfrRange::explicit(significand, exponent_min, exponent_max).map_err(invalid)
            }
            _ => Err(invalid(
                "expected either exponent_width and significand_width, \
                 or significand, exponent_min and exponent_max"
                    .to_string(),
            )),
        }
    }
}

/// Per-stage configuration, keyed by stage name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagesConfig {
    #[serde(rename = "SETUP", default, skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupStageConfig>,

    #[serde(rename = "BUILD")]
    pub build: ToggleStageConfig,

    #[serde(rename = "TRAIN")]
    pub train: TrainStageConfig,

    #[serde(rename = "TEST")]
    pub test: TestStageConfig,

    #[serde(rename = "CLEANUP")]
    pub cleanup: ToggleStageConfig,
}

/// Stage with no parameters besides its gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct ToggleStageConfig {
    pub run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct SetupStageConfig {
    pub run: bool,
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct TrainStageConfig {
    pub run: bool,
    pub start_epoch: u32,
    pub end_epoch: u32,
    #[serde(default)]
    pub input_weights_file: String,
    pub output_weights_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", deny_unknown_fields)]
pub struct TestStageConfig {
    pub run: bool,
    pub weights_file: String,
    #[serde(default)]
    pub log_file: String,
}

fn default_build_command() -> Vec<String> {
    vec!["make".to_string()]
}

fn default_cleanup_prefixes() -> Vec<String> {
    DEFAULT_CLEANUP_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    Ok(cwd.join(path))
}

impl ExperimentConfig {
    /// Load experiment configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse experiment configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ExperimentConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Parameters of disabled stages only need to be present, not sensible.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.executable.trim().is_empty() {
            return invalid("executable must not be empty".to_string());
        }
        if self.program.trim().is_empty() {
            return invalid("program must not be empty".to_string());
        }
        if self.build_command.first().map_or(true, |p| p.trim().is_empty()) {
            return invalid("build_command must name a program".to_string());
        }
        if self.cleanup_prefixes.iter().any(|p| p.is_empty()) {
            return invalid("cleanup_prefixes must not contain an empty prefix".to_string());
        }

        self.precision.mpfr_range()?;

        if let Some(setup) = &self.stages.setup {
            if setup.run && setup.command.first().map_or(true, |p| p.trim().is_empty()) {
                return invalid("SETUP.COMMAND must name a program".to_string());
            }
        }

        let train = &self.stages.train;
        if train.run {
            if train.output_weights_file.trim().is_empty() {
                return invalid("TRAIN.OUTPUT_WEIGHTS_FILE must not be empty".to_string());
            }
            if train.start_epoch > 1 {
                if train.input_weights_file.trim().is_empty() {
                    return invalid(format!(
                        "TRAIN.INPUT_WEIGHTS_FILE is required when START_EPOCH is {}",
                        train.start_epoch
                    ));
                }
                if train.end_epoch < train.start_epoch {
                    return invalid(format!(
                        "TRAIN.END_EPOCH ({}) is before START_EPOCH ({})",
                        train.end_epoch, train.start_epoch
                    ));
                }
            }
        }

        let test = &self.stages.test;
        if test.run && test.weights_file.trim().is_empty() {
            return invalid("TEST.WEIGHTS_FILE must not be empty".to_string());
        }

        Ok(())
    }

    /// Directory the stages run in, as configured
    pub fn working_dir(&self) -> PathBuf {
        self.program_dir.join(&self.program)
    }

    /// Build the stage list in canonical order
    pub fn stages(&self) -> Vec<Stage> {
        let mut stages = Vec::with_capacity(5);

        if let Some(setup) = &self.stages.setup {
            stages.push(Stage::new(
                StageKind::Setup {
                    command: setup.command.clone(),
                },
                setup.run,
            ));
        }

        stages.push(Stage::new(StageKind::Build, self.stages.build.run));

        let train = &self.stages.train;
        stages.push(Stage::new(
            StageKind::Train(TrainParams {
                start_epoch: train.start_epoch,
                end_epoch: train.end_epoch,
                input_weights_file: non_empty(&train.input_weights_file),
                output_weights_file: train.output_weights_file.clone(),
            }),
            train.run,
        ));

        let test = &self.stages.test;
        stages.push(Stage::new(
            StageKind::Test(TestParams {
                weights_file: test.weights_file.clone(),
                log_file: non_empty(&test.log_file),
            }),
            test.run,
        ));

        stages.push(Stage::new(StageKind::Cleanup, self.stages.cleanup.run));

        stages
    }

    /// Convert config to a Pipeline domain model, resolving paths against
    /// the current directory
    pub fn to_pipeline(&self) -> Result<Pipeline, ConfigError> {
        let working_dir = absolute(&self.working_dir())?;
        let settings = RunSettings {
            executable: working_dir.join(&self.executable),
            working_dir,
            build_command: self.build_command.clone(),
            simulator: SimulatorEnvironment::new(
                absolute(&self.simulator.config_file)?,
                self.precision.mpfr_range()?,
            ),
            setup_script: self
                .simulator
                .setup_script
                .as_deref()
                .map(absolute)
                .transpose()?,
            cleanup_prefixes: self.cleanup_prefixes.clone(),
        };

        Ok(Pipeline::new(self.name.clone(), settings, self.stages()))
    }
}
