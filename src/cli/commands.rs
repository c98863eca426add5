//! CLI command definitions

use clap::Args;

/// Run the experiment pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to experiment YAML file
    #[arg(short, long)]
    pub file: String,

    /// Print the run record as JSON when done
    #[arg(long)]
    pub json: bool,
}

/// Validate an experiment configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to experiment YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Compute simulator precision parameters
#[derive(Debug, Args, Clone)]
pub struct PrecisionCommand {
    /// Exponent bits of the emulated format
    pub exponent_width: u32,

    /// Explicit significand bits of the emulated format
    pub significand_width: u32,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Compare two result files
#[derive(Debug, Args, Clone)]
pub struct CompareCommand {
    /// Results of the reference run
    pub baseline: String,

    /// Results of the run under test
    pub compared: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
