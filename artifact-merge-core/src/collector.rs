//! The artifact collector: classify, plan and copy in one synchronous pass.
//!
//! # Major Types
//! - [`ArtifactCollector`]: a rule set plus the two policy flags
//! - [`AppliedResult`]: what a plan application wrote
//! - [`CollectReport`]: plan and application outcome of a full run
//!
//! # Error Handling
//! Applying stops at the first failing entry. Entries before it stay written;
//! callers that need all-or-nothing semantics should apply into a scratch
//! directory and rename it into place.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, info_span};

use crate::contract::{ArtifactSink, CandidateSource, WrittenArtifact};
use crate::error::CollectError;
use crate::naming::NamingRules;
use crate::plan::{self, Discarded, MergePlan, PlanEntry, PlanOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectOptions {
    pub exclude_timestamped: bool,
    /// Remove everything in the destination before copying.
    pub clear_destination_before_copy: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            exclude_timestamped: true,
            clear_destination_before_copy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedResult {
    pub destination: PathBuf,
    pub written: Vec<WrittenArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectReport {
    pub candidates: usize,
    pub planned: Vec<PlanEntry>,
    pub discarded: Vec<Discarded>,
    pub applied: AppliedResult,
}

#[derive(Debug, Clone)]
pub struct ArtifactCollector {
    rules: NamingRules,
    options: CollectOptions,
}

impl ArtifactCollector {
    pub fn new(rules: NamingRules, options: CollectOptions) -> Self {
        Self { rules, options }
    }

    pub fn rules(&self) -> &NamingRules {
        &self.rules
    }

    pub fn options(&self) -> CollectOptions {
        self.options
    }

    pub fn plan<I, P>(&self, candidates: I) -> MergePlan
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        plan::plan(
            candidates,
            &self.rules,
            PlanOptions {
                exclude_timestamped: self.options.exclude_timestamped,
            },
        )
    }

    /// Writes every plan entry to `destination/<canonical name>`, in plan order.
    pub fn apply<S>(
        &self,
        plan: &MergePlan,
        destination: &Path,
        sink: &S,
    ) -> Result<AppliedResult, CollectError>
    where
        S: ArtifactSink + ?Sized,
    {
        let span = info_span!("apply", destination = %destination.display());
        let _enter = span.enter();

        if self.options.clear_destination_before_copy {
            if let Some(entry) = plan
                .entries()
                .iter()
                .find(|e| is_within(&e.source.path, destination))
            {
                error!(
                    source = %entry.source.path.display(),
                    "Source lies inside the destination that would be cleared"
                );
                return Err(CollectError::Configuration(format!(
                    "cannot clear {} before copying: source {} lies inside it",
                    destination.display(),
                    entry.source.path.display()
                )));
            }
        }

        sink.prepare(destination, self.options.clear_destination_before_copy)?;

        let mut written = Vec::with_capacity(plan.len());
        for entry in plan.entries() {
            let target = destination.join(&entry.canonical_name);
            match sink.write(&entry.source.path, &target, &entry.canonical_name) {
                Ok(w) => {
                    info!(
                        source = %entry.source.path.display(),
                        canonical_name = %entry.canonical_name,
                        bytes = w.bytes,
                        "Artifact written"
                    );
                    written.push(w);
                }
                Err(e) => {
                    error!(
                        error = %e,
                        source = %entry.source.path.display(),
                        applied = written.len(),
                        "Applying merge plan failed"
                    );
                    return Err(e);
                }
            }
        }

        info!(written = written.len(), "Merge plan applied");
        Ok(AppliedResult {
            destination: destination.to_path_buf(),
            written,
        })
    }

    /// Lists candidates from `source`, plans, and applies the plan into `destination`.
    pub fn collect<C, S>(
        &self,
        source: &C,
        destination: &Path,
        sink: &S,
    ) -> Result<CollectReport, CollectError>
    where
        C: CandidateSource + ?Sized,
        S: ArtifactSink + ?Sized,
    {
        let candidates = source.list_candidates()?;
        let count = candidates.len();
        let plan = self.plan(candidates);
        let applied = self.apply(&plan, destination, sink)?;
        Ok(CollectReport::new(count, plan, applied))
    }
}

/// True when `path` is `dir` or below it, lexically or after resolving symlinks.
fn is_within(path: &Path, dir: &Path) -> bool {
    if path.starts_with(dir) {
        return true;
    }
    match (path.canonicalize(), dir.canonicalize()) {
        (Ok(path), Ok(dir)) => path.starts_with(dir),
        _ => false,
    }
}

impl CollectReport {
    pub fn new(candidates: usize, plan: MergePlan, applied: AppliedResult) -> Self {
        Self {
            candidates,
            planned: plan.entries().to_vec(),
            discarded: plan.discarded().to_vec(),
            applied,
        }
    }
}
