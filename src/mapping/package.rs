// package-scoped propagation
use crate::core::graph::StoreError;
use crate::core::relation::Relation;
use crate::core::repository::{ResourceQuery, ResourceRepository};
use crate::core::types::Confidence;
use crate::logging::Logger;
use crate::mapping::generator::{Candidate, MatchKind};

/// Pair unmapped "to" files from the seed's packages with "from" files of
/// the same name. A seed outside any package yields nothing.
pub fn package_candidates<R: ResourceRepository + ?Sized>(
    repo: &R,
    seed: &Relation,
    logger: Logger<'_>,
) -> Result<Vec<Candidate>, StoreError> {
    let seed_to = repo.resource(seed.to_resource)?;
    if seed_to.packages.is_empty() {
        logger.log(&format!(
            "Cannot propagate by package: {} is not part of any package",
            seed_to.path
        ));
        return Ok(Vec::new());
    }

    let members = ResourceQuery::to_files()
        .unmapped()
        .in_packages(seed_to.packages.iter().copied())
        .excluding([seed.to_resource]);

    let mut candidates = Vec::new();
    for to_id in repo.query_all(&members) {
        let name = repo.resource(to_id)?.name.clone();
        for from_id in repo.query_all(&ResourceQuery::from_files().named(name)) {
            candidates.push(Candidate::new(to_id, from_id, MatchKind::Path, Confidence::Medium));
        }
    }

    if candidates.is_empty() {
        logger.log(&format!("No package mappings for the packages of {}", seed_to.path));
    }
    Ok(candidates)
}
