// sibling propagation: files next to the seed pair, by name then extension
use crate::core::graph::StoreError;
use crate::core::relation::Relation;
use crate::core::repository::{ResourceQuery, ResourceRepository};
use crate::core::types::Confidence;
use crate::logging::Logger;
use crate::mapping::generator::{Candidate, MatchKind};

pub fn directory_candidates<R: ResourceRepository + ?Sized>(
    repo: &R,
    seed: &Relation,
    logger: Logger<'_>,
) -> Result<Vec<Candidate>, StoreError> {
    let seed_to = repo.resource(seed.to_resource)?;
    let seed_from = repo.resource(seed.from_resource)?;

    let from_siblings = repo
        .query_all(
            &ResourceQuery::from_files()
                .in_parent(seed_from.parent_path())
                .excluding([seed.from_resource]),
        )
        .into_iter()
        .map(|id| repo.resource(id))
        .collect::<Result<Vec<_>, _>>()?;

    let to_siblings = ResourceQuery::to_files()
        .unmapped()
        .in_parent(seed_to.parent_path())
        .excluding([seed.to_resource]);

    let mut candidates = Vec::new();
    for to_id in repo.query_all(&to_siblings) {
        let to = repo.resource(to_id)?;

        if let Some(from) = from_siblings.iter().find(|f| f.name == to.name) {
            candidates.push(Candidate::new(to_id, from.id, MatchKind::Name, Confidence::High));
            continue;
        }

        if to.extension.is_empty() {
            continue;
        }
        if let Some(from) = from_siblings.iter().find(|f| f.extension == to.extension) {
            candidates.push(Candidate::new(to_id, from.id, MatchKind::Extension, Confidence::Medium));
        }
    }

    if candidates.is_empty() {
        logger.log(&format!(
            "No directory mappings between {}/ and {}/",
            seed_to.parent_path(),
            seed_from.parent_path()
        ));
    }
    Ok(candidates)
}
