//! Naming rules: map a candidate's base name to its kind and canonical file name.

use serde::Serialize;
use tracing::debug;

use crate::artifact::ArtifactKind;
use crate::error::CollectError;

/// How a rule's pattern is tested against a base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPattern {
    Substring(String),
    Suffix(String),
}

impl MatchPattern {
    pub fn matches(&self, base_name: &str) -> bool {
        match self {
            MatchPattern::Substring(p) => base_name.contains(p.as_str()),
            MatchPattern::Suffix(p) => base_name.ends_with(p.as_str()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            MatchPattern::Substring(p) | MatchPattern::Suffix(p) => p,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingRule {
    pub kind: ArtifactKind,
    pub match_pattern: MatchPattern,
    /// File name the merged output must have.
    pub canonical_name: String,
}

impl NamingRule {
    pub fn new(kind: ArtifactKind, match_pattern: MatchPattern, canonical_name: impl Into<String>) -> Self {
        Self {
            kind,
            match_pattern,
            canonical_name: canonical_name.into(),
        }
    }
}

/// An ordered, validated rule list. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingRules {
    rules: Vec<NamingRule>,
}

impl NamingRules {
    /// Validates `rules`. Patterns must be mutually exclusive: when one pattern's
    /// text contains another's, some name would match both and the set is rejected.
    pub fn new(rules: Vec<NamingRule>) -> Result<Self, CollectError> {
        if rules.is_empty() {
            return Err(CollectError::Configuration(
                "at least one naming rule is required".into(),
            ));
        }

        for (index, rule) in rules.iter().enumerate() {
            if rule.match_pattern.text().is_empty() {
                return Err(CollectError::InvalidRule {
                    index,
                    reason: "match pattern is empty".into(),
                });
            }
            if let Some(reason) = invalid_file_name(&rule.canonical_name) {
                return Err(CollectError::InvalidRule { index, reason });
            }
        }

        for (i, a) in rules.iter().enumerate() {
            for (j, b) in rules.iter().enumerate().skip(i + 1) {
                let (pa, pb) = (a.match_pattern.text(), b.match_pattern.text());
                if pa.contains(pb) || pb.contains(pa) {
                    return Err(CollectError::InvalidRule {
                        index: j,
                        reason: format!("pattern {pb:?} overlaps rule #{i} pattern {pa:?}"),
                    });
                }
            }
        }

        Ok(Self { rules })
    }

    /// Stock rules for profile and benchmark outputs.
    ///
    /// Benchmark data is namespaced so several modules can share one destination.
    pub fn profile_defaults(namespace: &str) -> Self {
        let benchmark_name = if namespace.is_empty() {
            "benchmarkData.json".to_string()
        } else {
            format!("{namespace}-benchmarkData.json")
        };
        Self {
            rules: vec![
                NamingRule::new(
                    ArtifactKind::BaselineProfile,
                    MatchPattern::Substring("baseline-prof".into()),
                    "baseline-prof.txt",
                ),
                NamingRule::new(
                    ArtifactKind::StartupProfile,
                    MatchPattern::Substring("startup-prof".into()),
                    "startup-prof.txt",
                ),
                NamingRule::new(
                    ArtifactKind::BenchmarkData,
                    MatchPattern::Substring("benchmarkData".into()),
                    benchmark_name,
                ),
            ],
        }
    }

    pub fn classify(&self, base_name: &str) -> Option<&NamingRule> {
        let found = self.rules.iter().find(|r| r.match_pattern.matches(base_name));
        debug!(
            base_name,
            kind = found.map(|r| r.kind.to_string()).as_deref().unwrap_or("none"),
            "Classified candidate"
        );
        found
    }

    pub fn rules(&self) -> &[NamingRule] {
        &self.rules
    }
}

fn invalid_file_name(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("canonical name is empty".into());
    }
    if name == "." || name == ".." {
        return Some(format!("canonical name {name:?} is not a file name"));
    }
    if name.contains('/') || name.contains('\\') {
        return Some(format!("canonical name {name:?} contains a path separator"));
    }
    None
}
