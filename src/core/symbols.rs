use std::collections::BTreeMap;

use crate::config::MatchConfig;
use crate::core::classify::{self, MatchStats};
use crate::core::graph::StoreError;
use crate::core::relation::NewRelation;
use crate::core::repository::{Project, ResourceQuery};
use crate::core::types::{MapType, RelationId, ResourceId, status};
use crate::logging::{Logger, Progress};

/// Model name attached to review warnings raised by symbol matching.
pub const SYMBOLS_WARNING_MODEL: &str = "map_resources_with_symbols";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source resource carries no extracted symbols.
    NoSymbols,
}

/// Result of comparing one "from" candidate against a "to" resource.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolOutcome {
    Matched(MatchStats),
    NotMatched(MatchStats),
    Skipped(SkipReason),
}

impl SymbolOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, SymbolOutcome::Matched(_))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct SymbolMappingReport {
    /// Outcome per candidate, keyed by the candidate's path.
    pub outcomes: BTreeMap<String, SymbolOutcome>,
    /// Relations created by this call.
    pub relations: Vec<RelationId>,
    pub requires_review: bool,
}

/// Link one "to" resource to every candidate "from" resource whose symbols
/// were compiled into it.
///
/// Stats are written to each compared candidate whether it matched or not.
/// Matched candidates are related in one bulk write and marked
/// `mapped-by-symbol`. When a candidate outside the ignored directories fails
/// to match, the "to" resource is flagged `requires-review` and a warning
/// carrying the near-miss stats is recorded.
pub fn relate_by_symbols<P: Project + ?Sized>(
    project: &mut P,
    to_resource: ResourceId,
    from_resources: &[ResourceId],
    binary_symbols: &[String],
    map_type: MapType,
    config: &MatchConfig,
    logger: Logger<'_>,
) -> Result<SymbolMappingReport, StoreError> {
    let to_path = project.resource(to_resource)?.path.clone();

    let mut report = SymbolMappingReport::default();
    //identity (from_path, to_path, map_type) -> pending relation
    let mut pending: BTreeMap<(String, String, &'static str), NewRelation> = BTreeMap::new();
    let mut unmatched: BTreeMap<String, MatchStats> = BTreeMap::new();

    for &from_id in from_resources {
        let mut from = project.resource(from_id)?.clone();

        let Some(source_symbols) = from.extra_data.source_symbols.as_deref() else {
            tracing::debug!(from = %from.path, to = %to_path, "no source symbols, skipping");
            report.outcomes.insert(from.path, SymbolOutcome::Skipped(SkipReason::NoSymbols));
            continue;
        };

        let verdict = classify::classify(source_symbols, binary_symbols, map_type, config);
        tracing::debug!(
            from = %from.path,
            to = %to_path,
            %map_type,
            matched = verdict.is_matched,
            ratio = verdict.stats.common_symbols_ratio,
            unique_ratio = verdict.stats.common_symbols_unique_ratio,
            "compared symbols"
        );

        from.extra_data
            .symbols_match
            .insert(to_path.clone(), verdict.stats.clone());
        project.save_resource(&from)?;

        if verdict.is_matched {
            pending.insert(
                (from.path.clone(), to_path.clone(), map_type.as_str()),
                NewRelation::new(from_id, to_resource, map_type.as_str()),
            );
            report.outcomes.insert(from.path, SymbolOutcome::Matched(verdict.stats));
        } else {
            unmatched.insert(from.path.clone(), verdict.stats.clone());
            report.outcomes.insert(from.path, SymbolOutcome::NotMatched(verdict.stats));
        }
    }

    report.relations = project.bulk_create_relations(pending.into_values().collect())?;

    //only sources that really gained a symbol relation; pairs already
    //linked some other way were skipped by the bulk write
    let mut linked = Vec::with_capacity(report.relations.len());
    for &id in &report.relations {
        linked.push(project.relation(id)?.from_resource);
    }
    for from_id in linked {
        let mut from = project.resource(from_id)?.clone();
        from.status = status::MAPPED_BY_SYMBOL.to_string();
        project.save_resource(&from)?;
    }

    let needs_review = unmatched.keys().any(|path| !config.is_ignored_path(path));
    if needs_review {
        let mut to = project.resource(to_resource)?.clone();
        to.status = status::REQUIRES_REVIEW.to_string();
        project.save_resource(&to)?;

        let description = format!(
            "{} of {} {} candidates did not match {}",
            unmatched.len(),
            from_resources.len(),
            map_type,
            to_path
        );
        let unmatched_stats = match serde_json::to_value(&unmatched) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(to = %to_path, error = %e, "cannot serialize unmatched stats");
                serde_json::Value::Null
            }
        };
        let details = serde_json::json!({
            "to_resource": to_path,
            "map_type": map_type.as_str(),
            "unmatched": unmatched_stats,
        });
        project.add_warning(&description, SYMBOLS_WARNING_MODEL, details);
        logger.warn(&description);
        report.requires_review = true;
    }

    if report.relations.is_empty() {
        logger.log(&format!("No {map_type} mappings for {to_path}"));
    }

    Ok(report)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SymbolMappingSummary {
    /// "to" resources compared.
    pub processed: usize,
    pub relations_created: usize,
    pub flagged_for_review: usize,
}

/// Run symbol matching for every unmapped "to" file that carries binary
/// symbols, against the unmapped "from" files with source symbols and an
/// extension configured for `map_type`.
pub fn map_resources_by_symbols<P: Project + ?Sized>(
    project: &mut P,
    map_type: MapType,
    config: &MatchConfig,
    logger: Logger<'_>,
) -> Result<SymbolMappingSummary, StoreError> {
    let to_query = ResourceQuery::to_files().unmapped().has_binary_symbols();
    let from_query = ResourceQuery::from_files()
        .unmapped()
        .has_source_symbols()
        .extensions(config.source_extensions.for_map_type(map_type).iter().cloned());

    let from_resources = project.query_all(&from_query);
    let total = project.count(&to_query);
    let mut summary = SymbolMappingSummary::default();

    if from_resources.is_empty() || total == 0 {
        logger.log(&format!("No resources to map with {map_type}"));
        return Ok(summary);
    }

    logger.log(&format!(
        "Mapping {total} to/ resources using {map_type} against {} from/ resources",
        from_resources.len()
    ));
    let mut progress = Progress::new(logger, format!("Mapping {map_type}"), total);

    //keyset paging stays stable while processed resources become mapped
    let mut after = None;
    loop {
        let page = project.query_page(&to_query, after, config.chunk_size);
        let Some(&last) = page.last() else {
            break;
        };
        after = Some(last);

        for &to_id in &page {
            let binary_symbols = project.resource(to_id)?.extra_data.binary_symbols.clone().unwrap_or_default();
            if binary_symbols.is_empty() {
                tracing::debug!(to = to_id, "empty binary symbols, skipping");
                continue;
            }

            let report = relate_by_symbols(project, to_id, &from_resources, &binary_symbols, map_type, config, logger)?;
            summary.processed += 1;
            summary.relations_created += report.relations.len();
            if report.requires_review {
                summary.flagged_for_review += 1;
            }
        }
        progress.advance(page.len());
    }

    tracing::info!(
        %map_type,
        processed = summary.processed,
        created = summary.relations_created,
        flagged = summary.flagged_for_review,
        "symbol mapping done"
    );
    Ok(summary)
}
