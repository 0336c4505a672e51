//! Deploy-to-develop relation resolution.
//!
//! Links resources of a deployed/binary codebase ("to" side) back to the
//! source files they were produced from ("from" side) using checksum, path,
//! package, pattern and symbol heuristics.

pub mod config;
pub mod core;
pub mod logging;
pub mod mapping;

pub use crate::config::{ConfigError, MatchConfig, SymbolThreshold};
pub use crate::core::flagging::flag_unmapped_resources;
pub use crate::core::graph::{CodebaseGraph, ProjectWarning, StoreError};
pub use crate::core::propagate::{PropagationOutcome, build_relations, propagate};
pub use crate::core::relation::{NewRelation, PropagationBatch, Relation, RelationExtra};
pub use crate::core::repository::{Project, RelationSink, ResourceQuery, ResourceRepository, WarningSink};
pub use crate::core::resource::{Package, Resource, ResourceExtra};
pub use crate::core::symbols::{
    SkipReason, SymbolMappingReport, SymbolMappingSummary, SymbolOutcome, map_resources_by_symbols, relate_by_symbols,
};
pub use crate::core::types::{BatchId, Confidence, MapType, PackageId, RelationId, ResourceId, ResourceKind, Side};
pub use crate::logging::{Logger, Progress};
pub use crate::mapping::generator::{Candidate, MatchKind, PropagationError, Strategy, generate_candidates};
