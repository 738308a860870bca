//! This module implements the CLI interface for artifact-merge: command parsing,
//! argument exposure, and report output.
//!
//! All merge logic (classification, planning, copying) lives in the [`artifact-merge-core`] crate.
//! This module is strictly CLI glue over the stage [`crate::pipeline`].
//!
//! ## How To Use
//! - For command-line users: use the installed `artifact-merge` binary with `--help`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
//!
//! [`artifact-merge-core`]: ../../artifact-merge-core/

use crate::load_config::load_config;
use crate::pipeline::{Pipeline, PipelineContext, PipelineReport};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for artifact-merge: merge device-test artifacts into canonical files.
#[derive(Parser)]
#[clap(
    name = "artifact-merge",
    version,
    about = "Collect baseline profiles and benchmark data from device-test results into canonical files"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which files would be copied where, without touching the destination
    Plan {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Print the report as JSON
        #[clap(long)]
        json: bool,
    },
    /// Merge the device-test results into the destination directory
    Collect {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Print the report as JSON
        #[clap(long)]
        json: bool,
    },
}

/// CLI logic entrypoint for integration tests and main()
pub fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let (config_path, json, pipeline, command) = match cli.command {
        Commands::Plan { config, json } => (config, json, Pipeline::plan_only(), "plan"),
        Commands::Collect { config, json } => (config, json, Pipeline::collect(), "collect"),
    };

    let config = load_config(&config_path)?;
    tracing::info!(command, stages = ?pipeline.stage_names(), "Starting pipeline");

    let report = pipeline.run(PipelineContext::new(config))?;
    tracing::info!(command, stages = ?report.stages, "Pipeline complete");

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{out}");
    } else {
        print_summary(command, &report);
    }
    Ok(())
}

fn print_summary(command: &str, report: &PipelineReport) {
    println!(
        "{command}: {} candidate(s) from {}",
        report.candidates,
        report.results_dir.display()
    );
    if let Some(destination) = &report.destination {
        println!("destination: {}", destination.display());
    }
    if let Some(plan) = &report.plan {
        for entry in plan.entries() {
            println!(
                "  {} -> {}",
                entry.source.path.display(),
                entry.canonical_name
            );
        }
        println!("  ({} discarded)", plan.discarded().len());
    }
    if let Some(applied) = &report.applied {
        println!("wrote {} file(s)", applied.written.len());
    }
}
