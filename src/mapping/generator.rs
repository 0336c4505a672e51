// candidate generation: strategy selection and dispatch
use std::fmt;

use thiserror::Error;

use crate::config::MatchConfig;
use crate::core::graph::StoreError;
use crate::core::repository::{RelationSink, ResourceRepository};
use crate::core::types::{Confidence, RelationId, ResourceId};
use crate::logging::Logger;
use crate::mapping::{directory, package, pattern, similarity};

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("the {strategy} strategy needs a seed relation")]
    MissingSeed { strategy: &'static str },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Which evidence produced a candidate, within its strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Sha1,
    Path,
    Name,
    Extension,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Sha1 => "sha1",
            MatchKind::Path => "path",
            MatchKind::Name => "name",
            MatchKind::Extension => "extension",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A proposed relation. Generators only propose; nothing is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub to_resource: ResourceId,
    pub from_resource: ResourceId,
    pub match_kind: MatchKind,
    pub confidence: Confidence,
}

impl Candidate {
    pub fn new(to_resource: ResourceId, from_resource: ResourceId, match_kind: MatchKind, confidence: Confidence) -> Self {
        Self {
            to_resource,
            from_resource,
            match_kind,
            confidence,
        }
    }
}

/// How to extend an existing relation to analogous resources.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Checksum equality, then directory-structure similarity.
    /// Falls back to the configured threshold when `threshold` is `None`.
    Similarity { threshold: Option<f64> },
    /// Siblings of the seed pair, by name then by extension.
    Directory,
    /// Resources sharing the seed's packages, by name.
    Package,
    /// Resources whose path matches a regex or glob, by name.
    Pattern { pattern: String },
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Similarity { .. } => "similarity",
            Strategy::Directory => "directory",
            Strategy::Package => "package",
            Strategy::Pattern { .. } => "pattern",
        }
    }

    pub fn needs_seed(&self) -> bool {
        !matches!(self, Strategy::Pattern { .. })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run one strategy outward from `seed` and return its candidates.
pub fn generate_candidates<P: ResourceRepository + RelationSink + ?Sized>(
    project: &P,
    seed: Option<RelationId>,
    strategy: &Strategy,
    config: &MatchConfig,
    logger: Logger<'_>,
) -> Result<Vec<Candidate>, PropagationError> {
    let seed = match seed {
        Some(id) => Some(project.relation(id)?.clone()),
        None => None,
    };

    let candidates = match (strategy, seed.as_ref()) {
        (Strategy::Pattern { pattern }, seed) => pattern::pattern_candidates(project, seed, pattern, logger)?,
        (_, None) => {
            return Err(PropagationError::MissingSeed {
                strategy: strategy.name(),
            });
        }
        (Strategy::Similarity { threshold }, Some(seed)) => {
            let threshold = threshold.unwrap_or(config.similarity_threshold);
            similarity::similarity_candidates(project, seed, threshold, logger)?
        }
        (Strategy::Directory, Some(seed)) => directory::directory_candidates(project, seed, logger)?,
        (Strategy::Package, Some(seed)) => package::package_candidates(project, seed, logger)?,
    };

    tracing::debug!(strategy = strategy.name(), count = candidates.len(), "generated candidates");
    Ok(candidates)
}
