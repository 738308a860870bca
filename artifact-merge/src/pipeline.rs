//! Stage pipeline: configure → scan-results → plan-merge → apply-plan.
//!
//! Each stage runs inside a tracing span named after it. The runner is fail-fast: the first
//! stage error stops the run and is returned with the stage name as context.
//!
//! # Extension Points
//! Add a stage by implementing [`Stage`] and inserting it into the list built by
//! [`Pipeline::collect`] or [`Pipeline::plan_only`].

use anyhow::{anyhow, Context, Result};
use artifact_merge_core::collector::{AppliedResult, ArtifactCollector, CollectOptions};
use artifact_merge_core::contract::CandidateSource;
use artifact_merge_core::destination::DestinationSelector;
use artifact_merge_core::naming::NamingRules;
use artifact_merge_core::plan::MergePlan;
use artifact_merge_core::scan::DirectoryScanner;
use artifact_merge_core::sink::FileSystemSink;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, info_span};

use crate::load_config::CollectConfig;

/// State threaded through the stages of one run.
#[derive(Debug)]
pub struct PipelineContext {
    pub config: CollectConfig,
    pub collector: Option<ArtifactCollector>,
    pub destination: Option<PathBuf>,
    pub candidates: Vec<PathBuf>,
    pub plan: Option<MergePlan>,
    pub applied: Option<AppliedResult>,
}

impl PipelineContext {
    pub fn new(config: CollectConfig) -> Self {
        Self {
            config,
            collector: None,
            destination: None,
            candidates: Vec::new(),
            plan: None,
            applied: None,
        }
    }

    fn collector(&self) -> Result<&ArtifactCollector> {
        self.collector
            .as_ref()
            .ok_or_else(|| anyhow!("collector not configured; the configure stage must run first"))
    }
}

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut PipelineContext) -> Result<()>;
}

/// Validates rules and selects the destination. Performs no file I/O.
pub struct Configure;

impl Stage for Configure {
    fn name(&self) -> &'static str {
        "configure"
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let config = &ctx.config;
        let selector = DestinationSelector::from_options(
            config.copy_to_library,
            config.target_project_path.as_deref(),
            &config.project_root,
            &config.module_dir,
        )?;
        let rules = match &config.rules {
            Some(rules) => NamingRules::new(rules.clone())?,
            None => NamingRules::profile_defaults(&config.namespace),
        };
        let options = CollectOptions {
            exclude_timestamped: config.exclude_timestamped,
            clear_destination_before_copy: config.clear_destination_before_copy,
        };
        info!(
            rules = rules.rules().len(),
            exclude_timestamped = options.exclude_timestamped,
            clear_destination_before_copy = options.clear_destination_before_copy,
            "Collector configured"
        );
        ctx.destination = Some(selector.resolve());
        ctx.collector = Some(ArtifactCollector::new(rules, options));
        Ok(())
    }
}

/// Lists the pulled results for the configured device.
pub struct ScanResults;

impl Stage for ScanResults {
    fn name(&self) -> &'static str {
        "scan-results"
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let scanner = DirectoryScanner::new(&ctx.config.results_dir);
        ctx.candidates = scanner.list_candidates()?;
        info!(
            device_name = %ctx.config.device_name,
            candidates = ctx.candidates.len(),
            "Results scanned"
        );
        Ok(())
    }
}

pub struct PlanMerge;

impl Stage for PlanMerge {
    fn name(&self) -> &'static str {
        "plan-merge"
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let plan = ctx.collector()?.plan(ctx.candidates.iter().cloned());
        ctx.plan = Some(plan);
        Ok(())
    }
}

/// Copies the planned files into the destination.
pub struct ApplyPlan;

impl Stage for ApplyPlan {
    fn name(&self) -> &'static str {
        "apply-plan"
    }

    fn run(&self, ctx: &mut PipelineContext) -> Result<()> {
        let collector = ctx.collector()?;
        let plan = ctx
            .plan
            .as_ref()
            .ok_or_else(|| anyhow!("no merge plan; the plan-merge stage must run first"))?;
        let destination = ctx
            .destination
            .as_ref()
            .ok_or_else(|| anyhow!("no destination; the configure stage must run first"))?;
        let applied = collector.apply(plan, destination, &FileSystemSink::new())?;
        ctx.applied = Some(applied);
        Ok(())
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<&'static str>,
    pub device_name: String,
    pub results_dir: PathBuf,
    pub destination: Option<PathBuf>,
    pub candidates: usize,
    pub plan: Option<MergePlan>,
    pub applied: Option<AppliedResult>,
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// Full run: configure, scan, plan, and copy.
    pub fn collect() -> Self {
        Self::new(vec![
            Box::new(Configure),
            Box::new(ScanResults),
            Box::new(PlanMerge),
            Box::new(ApplyPlan),
        ])
    }

    /// Dry run: stops after planning, the destination is never touched.
    pub fn plan_only() -> Self {
        Self::new(vec![
            Box::new(Configure),
            Box::new(ScanResults),
            Box::new(PlanMerge),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, mut ctx: PipelineContext) -> Result<PipelineReport> {
        let mut executed = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let span = info_span!("stage", name = stage.name());
            let _enter = span.enter();
            info!("Stage starting");
            if let Err(e) = stage.run(&mut ctx) {
                error!(error = %e, "Stage failed");
                return Err(e).with_context(|| format!("stage `{}` failed", stage.name()));
            }
            info!("Stage finished");
            executed.push(stage.name());
        }

        Ok(PipelineReport {
            stages: executed,
            device_name: ctx.config.device_name,
            results_dir: ctx.config.results_dir,
            destination: ctx.destination,
            candidates: ctx.candidates.len(),
            plan: ctx.plan,
            applied: ctx.applied,
        })
    }
}
