use crate::config::MatchConfig;
use crate::core::graph::StoreError;
use crate::core::relation::{NewBatch, NewRelation, RelationExtra};
use crate::core::repository::{Project, RelationSink};
use crate::core::types::{BatchId, RelationId};
use crate::logging::Logger;
use crate::mapping::generator::{self, Candidate, PropagationError, Strategy};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationOutcome {
    /// Relations created by this run. Zero on a re-run is a normal outcome.
    pub count: usize,
    pub relations: Vec<RelationId>,
    pub batch: Option<BatchId>,
}

/// Write candidates as relations tagged `"{strategy}_{match_kind}"`.
///
/// When `actor` is known the run is recorded as a propagation batch whose
/// count is filled in at the end. Pairs already linked by any relation are
/// skipped. A failing candidate is logged and does not stop the others;
/// relations already written stay written.
pub fn build_relations<S: RelationSink + ?Sized>(
    sink: &mut S,
    candidates: &[Candidate],
    strategy: &str,
    seed: Option<RelationId>,
    actor: Option<&str>,
    logger: Logger<'_>,
) -> Result<PropagationOutcome, StoreError> {
    let batch = match actor {
        Some(actor) => Some(sink.create_batch(NewBatch {
            source_relation: seed,
            strategy: strategy.to_string(),
            created_by: Some(actor.to_string()),
        })?),
        None => None,
    };

    let mut outcome = PropagationOutcome {
        batch,
        ..PropagationOutcome::default()
    };

    for candidate in candidates {
        let (from, to) = (candidate.from_resource, candidate.to_resource);
        if sink.relation_exists(from, to) {
            tracing::debug!(strategy, from, to, "already related, skipping");
            continue;
        }

        let relation = NewRelation::new(from, to, format!("{strategy}_{}", candidate.match_kind)).with_extra(
            RelationExtra {
                confidence: Some(candidate.confidence),
                propagation_batch: batch,
                ..RelationExtra::default()
            },
        );

        match sink.create_relation(relation) {
            Ok(id) => {
                outcome.count += 1;
                outcome.relations.push(id);
            }
            Err(e) => {
                logger.warn(&format!("{strategy} propagation: cannot relate {from} -> {to}: {e}"));
            }
        }
    }

    if let Some(batch) = batch {
        sink.set_batch_relation_count(batch, outcome.count)?;
    }

    tracing::info!(strategy, created = outcome.count, skipped = candidates.len() - outcome.count, "propagation done");
    Ok(outcome)
}

/// Generate candidates with `strategy` from `seed` and write them.
pub fn propagate<P: Project + ?Sized>(
    project: &mut P,
    seed: Option<RelationId>,
    strategy: &Strategy,
    actor: Option<&str>,
    config: &MatchConfig,
    logger: Logger<'_>,
) -> Result<PropagationOutcome, PropagationError> {
    let candidates = generator::generate_candidates(project, seed, strategy, config, logger)?;
    let outcome = build_relations(project, &candidates, strategy.name(), seed, actor, logger)?;
    logger.log(&format!(
        "{} propagation created {} relation(s) from {} candidate(s)",
        strategy.name(),
        outcome.count,
        candidates.len()
    ));
    Ok(outcome)
}
