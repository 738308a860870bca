//! Merge planning: classify candidates and decide which file lands under which canonical name.
//!
//! Planning is pure. It never touches the filesystem; see [`crate::collector`] for applying a plan.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::artifact::CandidateArtifact;
use crate::naming::NamingRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanOptions {
    /// Drop timestamp-suffixed candidates outright instead of classifying them.
    pub exclude_timestamped: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            exclude_timestamped: true,
        }
    }
}

/// One surviving candidate and the file name it is copied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub source: CandidateArtifact,
    pub canonical_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DiscardReason {
    Timestamped,
    NoMatchingRule,
    /// A later candidate mapped to the same canonical name.
    Superseded { by: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discarded {
    pub path: PathBuf,
    #[serde(flatten)]
    pub reason: DiscardReason,
}

/// Ordered copy plan. Canonical names are unique across entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergePlan {
    entries: Vec<PlanEntry>,
    discarded: Vec<Discarded>,
}

impl MergePlan {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn discarded(&self) -> &[Discarded] {
        &self.discarded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn canonical_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.canonical_name.as_str())
            .collect()
    }
}

/// Builds the merge plan for `candidates`, in their given order.
///
/// Callers must supply candidates in a deterministic order for the plan to be
/// reproducible: when several survivors share a canonical name, the last one wins.
pub fn plan<I, P>(candidates: I, rules: &NamingRules, options: PlanOptions) -> MergePlan
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut survivors: Vec<PlanEntry> = Vec::new();
    let mut discarded: Vec<Discarded> = Vec::new();

    for path in candidates {
        let mut candidate = CandidateArtifact::new(path);

        if options.exclude_timestamped && candidate.is_timestamped() {
            debug!(path = %candidate.path.display(), "Dropping timestamped candidate");
            discarded.push(Discarded {
                path: candidate.path,
                reason: DiscardReason::Timestamped,
            });
            continue;
        }

        let Some(rule) = rules.classify(&candidate.base_name) else {
            debug!(path = %candidate.path.display(), "No naming rule matched, ignoring");
            discarded.push(Discarded {
                path: candidate.path,
                reason: DiscardReason::NoMatchingRule,
            });
            continue;
        };

        candidate.kind = rule.kind.clone();
        survivors.push(PlanEntry {
            source: candidate,
            canonical_name: rule.canonical_name.clone(),
        });
    }

    let mut last_for_name: HashMap<&str, usize> = HashMap::new();
    for (idx, entry) in survivors.iter().enumerate() {
        last_for_name.insert(entry.canonical_name.as_str(), idx);
    }
    let winner_paths: HashMap<String, PathBuf> = last_for_name
        .iter()
        .map(|(name, &idx)| (name.to_string(), survivors[idx].source.path.clone()))
        .collect();
    let winners: HashSet<usize> = last_for_name.into_values().collect();

    let mut entries = Vec::with_capacity(winners.len());
    for (idx, entry) in survivors.into_iter().enumerate() {
        if winners.contains(&idx) {
            entries.push(entry);
        } else {
            let by = winner_paths[&entry.canonical_name].clone();
            debug!(
                path = %entry.source.path.display(),
                by = %by.display(),
                canonical_name = %entry.canonical_name,
                "Candidate superseded by a later one"
            );
            discarded.push(Discarded {
                path: entry.source.path,
                reason: DiscardReason::Superseded { by },
            });
        }
    }

    info!(
        entries = entries.len(),
        discarded = discarded.len(),
        "Merge plan built"
    );

    MergePlan { entries, discarded }
}
