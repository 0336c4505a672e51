// review flags for deployed files nothing could be traced to
use crate::config::MatchConfig;
use crate::core::graph::StoreError;
use crate::core::repository::{ResourceQuery, ResourceRepository};
use crate::core::types::status;
use crate::logging::Logger;

/// Mark every unmapped "to" file that has no status yet as `requires-review`,
/// leaving files under ignored directories alone. Returns how many were
/// flagged.
pub fn flag_unmapped_resources<R: ResourceRepository + ?Sized>(
    repo: &mut R,
    config: &MatchConfig,
    logger: Logger<'_>,
) -> Result<usize, StoreError> {
    let query = ResourceQuery::to_files().unmapped();
    let mut flagged = 0;

    let mut after = None;
    loop {
        let page = repo.query_page(&query, after, config.chunk_size);
        let Some(&last) = page.last() else {
            break;
        };
        after = Some(last);

        for id in page {
            let resource = repo.resource(id)?;
            if !resource.status.is_empty() || config.is_ignored_path(&resource.path) {
                continue;
            }

            let mut resource = resource.clone();
            resource.status = status::REQUIRES_REVIEW.to_string();
            repo.save_resource(&resource)?;
            tracing::debug!(path = %resource.path, "flagged for review");
            flagged += 1;
        }
    }

    if flagged > 0 {
        logger.log(&format!("{flagged} to/ resource(s) without a match flagged for review"));
    }
    Ok(flagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::CodebaseGraph;
    use crate::core::relation::NewRelation;
    use crate::core::repository::RelationSink;
    use crate::core::resource::Resource;
    use crate::core::types::{ResourceId, Side};

    fn status_of(g: &CodebaseGraph, id: ResourceId) -> String {
        g.resource(id).unwrap().status.clone()
    }

    #[test]
    fn only_unmapped_unclassified_files_are_flagged() {
        let mut g = CodebaseGraph::new();
        let lonely = g.add_resource(Resource::file("bin/tool", Side::To)).unwrap();
        let mapped = g.add_resource(Resource::file("bin/app", Side::To)).unwrap();
        let src = g.add_resource(Resource::file("src/app.c", Side::From)).unwrap();
        g.create_relation(NewRelation::new(src, mapped, "path")).unwrap();

        let mut classified = Resource::file("bin/legal.txt", Side::To);
        classified.status = "ignored-not-interesting".to_string();
        let classified = g.add_resource(classified).unwrap();

        let under_tests = g.add_resource(Resource::file("tests/fixture.bin", Side::To)).unwrap();
        g.add_resource(Resource::directory("bin", Side::To)).unwrap();
        let unrelated_from = g.add_resource(Resource::file("src/extra.c", Side::From)).unwrap();

        let count = flag_unmapped_resources(&mut g, &MatchConfig::default(), Logger::silent()).unwrap();

        assert_eq!(count, 1);
        assert_eq!(status_of(&g, lonely), status::REQUIRES_REVIEW);
        assert_eq!(status_of(&g, mapped), "");
        assert_eq!(status_of(&g, classified), "ignored-not-interesting");
        assert_eq!(status_of(&g, under_tests), "");
        assert_eq!(status_of(&g, unrelated_from), "");
    }

    #[test]
    fn pages_through_everything_and_is_idempotent() {
        let mut g = CodebaseGraph::new();
        let ids: Vec<ResourceId> = (0..7)
            .map(|i| g.add_resource(Resource::file(format!("lib/part{i}.o"), Side::To)).unwrap())
            .collect();
        let config = MatchConfig {
            chunk_size: 3,
            ..MatchConfig::default()
        };

        assert_eq!(flag_unmapped_resources(&mut g, &config, Logger::silent()).unwrap(), 7);
        for id in ids {
            assert_eq!(status_of(&g, id), status::REQUIRES_REVIEW);
        }
        assert_eq!(flag_unmapped_resources(&mut g, &config, Logger::silent()).unwrap(), 0);
    }
}
