#![doc = "artifact-merge-core: core logic library for artifact-merge."]

//! This crate contains the data model and pipeline for reducing the files pulled
//! from a remote device-test run to one canonical artifact set.
//!
//! # Usage
//! Build an [`collector::ArtifactCollector`] from a [`naming::NamingRules`] set, feed it the
//! candidate paths from a [`contract::CandidateSource`] and apply the resulting
//! [`plan::MergePlan`] through an [`contract::ArtifactSink`].

pub mod artifact;
pub mod collector;
pub mod contract;
pub mod destination;
pub mod error;
pub mod naming;
pub mod plan;
pub mod scan;
pub mod sink;

pub use collector::{AppliedResult, ArtifactCollector, CollectOptions, CollectReport};
pub use error::CollectError;
pub use naming::{MatchPattern, NamingRule, NamingRules};
pub use plan::{MergePlan, PlanOptions};
