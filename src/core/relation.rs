use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{BatchId, Confidence, RelationId, ResourceId};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationExtra {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,

    /// Batch that created this relation, when created by an attributed propagation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propagation_batch: Option<BatchId>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

/// A provenance link: `to_resource` was produced from `from_resource`.
///
/// Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    pub from_resource: ResourceId,
    pub to_resource: ResourceId,
    pub map_type: String,
    pub extra_data: RelationExtra,
}

/// A relation that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRelation {
    pub from_resource: ResourceId,
    pub to_resource: ResourceId,
    pub map_type: String,
    pub extra_data: RelationExtra,
}

impl NewRelation {
    pub fn new(from_resource: ResourceId, to_resource: ResourceId, map_type: impl Into<String>) -> Self {
        Self {
            from_resource,
            to_resource,
            map_type: map_type.into(),
            extra_data: RelationExtra::default(),
        }
    }

    pub fn with_extra(mut self, extra_data: RelationExtra) -> Self {
        self.extra_data = extra_data;
        self
    }
}

/// Audit record of one attributed propagation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationBatch {
    pub id: BatchId,
    pub source_relation: Option<RelationId>,
    pub strategy: String,
    pub relation_count: usize,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBatch {
    pub source_relation: Option<RelationId>,
    pub strategy: String,
    pub created_by: Option<String>,
}
