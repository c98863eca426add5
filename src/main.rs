use anyhow::{Context, Result};
use simrun::cli::commands::{CompareCommand, PrecisionCommand, RunCommand, ValidateCommand};
use simrun::cli::output::*;
use simrun::cli::{Cli, Command};
use simrun::comparator;
use simrun::core::config::ExperimentConfig;
use simrun::core::ExecutionStatus;
use simrun::execution::ExecutionEngine;
use simrun::precision::PrecisionProfile;
use simrun::runner::{environment, SubprocessRunner};
use std::path::Path;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout carries the simulator output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_config(cmd)?,
        Command::Precision(cmd) => show_precision(cmd)?,
        Command::Compare(cmd) => compare_runs(cmd)?,
    }

    Ok(())
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    // Configuration errors surface before any stage runs
    let config = ExperimentConfig::from_file(&cmd.file)
        .context("Failed to load experiment config")?;
    let pipeline = config.to_pipeline().context("Failed to resolve experiment config")?;

    println!(
        "{}Loaded experiment: {} ({} of {} stages enabled)",
        INFO,
        style(&pipeline.name).bold(),
        pipeline.enabled_stages().count(),
        pipeline.stages.len()
    );

    let mut engine = ExecutionEngine::new(SubprocessRunner::new(), environment::capture());
    engine.add_event_handler(|event| {
        if let Some(line) = format_execution_event(event) {
            println!("{}", line);
        }
    });

    let result = engine.execute(&pipeline).await;

    println!("\n{}", format_result(&result));
    println!("{}", format_summary(&result));
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if result.status == ExecutionStatus::Completed {
        return Ok(());
    }

    if let Some(failure) = result.failure() {
        error!("Stage {} failed", failure.stage);
    }
    std::process::exit(result.exit_code());
}

fn validate_config(cmd: &ValidateCommand) -> Result<()> {
    println!("{}Validating experiment...", INFO);

    let config = ExperimentConfig::from_file(&cmd.file).and_then(|config| {
        config.to_pipeline()?;
        Ok(config)
    });

    match config {
        Ok(config) => {
            println!("{}Experiment configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Working directory: {}", style(config.working_dir().display()).cyan());
            for stage in config.stages() {
                let gate = if stage.enabled {
                    style("run").green()
                } else {
                    style("skip").dim()
                };
                println!("  {:<8} {}", stage.name().as_str(), gate);
            }
            if let Ok(range) = config.precision.mpfr_range() {
                println!("{}", format_precision(&range));
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(())
        }
        Err(e) => {
            println!("{}Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}

fn show_precision(cmd: &PrecisionCommand) -> Result<()> {
    let profile = PrecisionProfile::new(cmd.exponent_width, cmd.significand_width)
        .context("Invalid float format")?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("{}", format_precision(&profile.mpfr));
    }
    Ok(())
}

fn compare_runs(cmd: &CompareCommand) -> Result<()> {
    let baseline = comparator::read_results(Path::new(&cmd.baseline))?;
    let compared = comparator::read_results(Path::new(&cmd.compared))?;

    if baseline.len() != compared.len() {
        warn!(
            "{} has {} lines but {} has {}; comparing the first {}",
            cmd.baseline,
            baseline.len(),
            cmd.compared,
            compared.len(),
            baseline.len().min(compared.len())
        );
        println!("{}Result files differ in length", WARN);
    }

    let comparison = comparator::compare_results(&baseline, &compared);
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        println!("{}", format_comparison(&comparison));
    }
    Ok(())
}
