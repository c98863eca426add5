//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CompareCommand, PrecisionCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Staged simulator experiment runner
#[derive(Debug, Parser, Clone)]
#[command(name = "simrun")]
#[command(version)]
#[command(about = "Build, train and test applications on a reduced-precision simulator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the experiment pipeline
    Run(RunCommand),

    /// Validate an experiment configuration
    Validate(ValidateCommand),

    /// Compute simulator precision parameters for a float format
    Precision(PrecisionCommand),

    /// Compare the results of two inference runs
    Compare(CompareCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
