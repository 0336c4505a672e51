//! Checksum and directory-structure propagation.
//!
//! Two passes outward from a seed relation:
//! 1. any unmapped "to" file whose sha1 equals a "from" file's sha1 is paired
//!    with it at high confidence;
//! 2. an unmapped "to" file living in a directory structurally close to the
//!    seed's "to" directory is paired, at medium confidence, with a "from"
//!    file of the same name living in a directory structurally close to the
//!    seed's "from" directory.

use std::collections::HashSet;

use crate::core::graph::StoreError;
use crate::core::relation::Relation;
use crate::core::repository::{ResourceQuery, ResourceRepository};
use crate::core::types::Confidence;
use crate::logging::Logger;
use crate::mapping::generator::{Candidate, MatchKind};

/// Jaccard index of two segment sets. Two empty sets are identical.
pub fn jaccard(left: &HashSet<&str>, right: &HashSet<&str>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 1.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

pub fn similarity_candidates<R: ResourceRepository + ?Sized>(
    repo: &R,
    seed: &Relation,
    threshold: f64,
    logger: Logger<'_>,
) -> Result<Vec<Candidate>, StoreError> {
    let seed_to = repo.resource(seed.to_resource)?;
    let seed_from = repo.resource(seed.from_resource)?;

    let mut candidates = Vec::new();

    let with_checksum = ResourceQuery::to_files()
        .unmapped()
        .has_sha1()
        .excluding([seed.to_resource]);
    for to_id in repo.query_all(&with_checksum) {
        let Some(sha1) = repo.resource(to_id)?.sha1.clone() else {
            continue;
        };
        for from_id in repo.query_all(&ResourceQuery::from_files().sha1(sha1)) {
            candidates.push(Candidate::new(to_id, from_id, MatchKind::Sha1, Confidence::High));
        }
    }

    let seed_to_dirs: HashSet<&str> = seed_to.dir_segments().into_iter().collect();
    let seed_from_dirs: HashSet<&str> = seed_from.dir_segments().into_iter().collect();

    let unmapped = ResourceQuery::to_files().unmapped().excluding([seed.to_resource]);
    for to_id in repo.query_all(&unmapped) {
        let to = repo.resource(to_id)?;
        let to_dirs: HashSet<&str> = to.dir_segments().into_iter().collect();
        if jaccard(&to_dirs, &seed_to_dirs) <= threshold {
            continue;
        }

        let same_name = ResourceQuery::from_files().named(to.name.clone());
        for from_id in repo.query_all(&same_name) {
            let from = repo.resource(from_id)?;
            let from_dirs: HashSet<&str> = from.dir_segments().into_iter().collect();
            if jaccard(&from_dirs, &seed_from_dirs) > threshold {
                candidates.push(Candidate::new(to_id, from_id, MatchKind::Path, Confidence::Medium));
            }
        }
    }

    // first sighting of a pair wins
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert((c.to_resource, c.from_resource)));

    if candidates.is_empty() {
        logger.log(&format!("No similarity mappings from {} -> {}", seed_to.path, seed_from.path));
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::CodebaseGraph;
    use crate::core::relation::NewRelation;
    use crate::core::repository::RelationSink;
    use crate::core::resource::Resource;
    use crate::core::types::{ResourceId, Side};

    fn mk_seed(g: &mut CodebaseGraph, to: &str, from: &str) -> Relation {
        let t = g.add_resource(Resource::file(to, Side::To)).unwrap();
        let f = g.add_resource(Resource::file(from, Side::From)).unwrap();
        let id = g.create_relation(NewRelation::new(f, t, "path")).unwrap();
        g.relation(id).unwrap().clone()
    }

    fn add(g: &mut CodebaseGraph, path: &str, side: Side, sha1: Option<&str>) -> ResourceId {
        let mut r = Resource::file(path, side);
        if let Some(sha1) = sha1 {
            r = r.with_sha1(sha1);
        }
        g.add_resource(r).unwrap()
    }

    #[test]
    fn jaccard_edges() {
        let empty = HashSet::new();
        let ab: HashSet<&str> = ["a", "b"].into_iter().collect();
        let bc: HashSet<&str> = ["b", "c"].into_iter().collect();
        assert_eq!(jaccard(&empty, &empty), 1.0);
        assert_eq!(jaccard(&ab, &empty), 0.0);
        assert_eq!(jaccard(&ab, &ab), 1.0);
        assert!((jaccard(&ab, &bc) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn checksum_pairs_are_high_confidence_without_cross_pairing() {
        let mut g = CodebaseGraph::new();
        let seed = mk_seed(&mut g, "deploy/seed.bin", "src/seed.c");

        let to_a = add(&mut g, "deploy/lib/a.so", Side::To, Some("aaaa"));
        let to_b = add(&mut g, "opt/b.so", Side::To, Some("bbbb"));
        let from_a = add(&mut g, "build/a.so", Side::From, Some("aaaa"));
        let from_b = add(&mut g, "other/place/b.so", Side::From, Some("bbbb"));

        let found = similarity_candidates(&g, &seed, 0.8, Logger::silent()).unwrap();
        let high: Vec<_> = found.iter().filter(|c| c.confidence == Confidence::High).collect();

        assert_eq!(high.len(), 2);
        assert!(high.iter().any(|c| c.to_resource == to_a && c.from_resource == from_a));
        assert!(high.iter().any(|c| c.to_resource == to_b && c.from_resource == from_b));
        assert!(!found.iter().any(|c| c.to_resource == to_a && c.from_resource == from_b));
        assert!(!found.iter().any(|c| c.to_resource == to_b && c.from_resource == from_a));
    }

    #[test]
    fn path_heuristic_needs_similar_directories_on_both_sides() {
        let mut g = CodebaseGraph::new();
        let seed = mk_seed(&mut g, "web/static/js/app.js", "frontend/static/js/app.js");

        // same dir as seed on both sides
        let to_util = add(&mut g, "web/static/js/util.js", Side::To, None);
        let from_util = add(&mut g, "frontend/static/js/util.js", Side::From, None);
        // right name, but the from copy sits somewhere unrelated
        add(&mut g, "web/static/js/vendor.js", Side::To, None);
        add(&mut g, "node_modules/lib/vendor.js", Side::From, None);
        // unrelated to directory
        add(&mut g, "docs/util.js", Side::To, None);

        let found = similarity_candidates(&g, &seed, 0.8, Logger::silent()).unwrap();
        assert_eq!(found, vec![Candidate::new(to_util, from_util, MatchKind::Path, Confidence::Medium)]);
    }

    #[test]
    fn checksum_match_shadows_path_match_for_same_pair() {
        let mut g = CodebaseGraph::new();
        let seed = mk_seed(&mut g, "out/main.o", "src/main.c");
        let to = add(&mut g, "out/util.o", Side::To, Some("1234"));
        let from = add(&mut g, "src/util.o", Side::From, Some("1234"));

        let found = similarity_candidates(&g, &seed, 0.5, Logger::silent()).unwrap();
        assert_eq!(found, vec![Candidate::new(to, from, MatchKind::Sha1, Confidence::High)]);
    }

    #[test]
    fn mapped_resources_are_not_candidates() {
        let mut g = CodebaseGraph::new();
        let seed = mk_seed(&mut g, "out/main.o", "src/main.c");
        let to = add(&mut g, "out/util.o", Side::To, Some("1234"));
        let from = add(&mut g, "src/util.o", Side::From, Some("1234"));
        g.create_relation(NewRelation::new(from, to, "sha1")).unwrap();

        let lines = std::cell::RefCell::new(Vec::new());
        let sink = |m: &str| lines.borrow_mut().push(m.to_string());
        let found = similarity_candidates(&g, &seed, 0.8, Logger::new(&sink)).unwrap();

        assert!(found.is_empty());
        assert_eq!(lines.borrow().len(), 1);
    }
}
