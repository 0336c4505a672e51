use std::collections::{BTreeMap, HashMap, HashSet};

use thiserror::Error;

use crate::core::relation::{PropagationBatch, Relation};
use crate::core::repository::{ResourceQuery, ResourceRepository, WarningSink};
use crate::core::resource::{Package, Resource};
use crate::core::types::{BatchId, PackageId, RelationId, ResourceId, Side};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("resource not found: {0}")]
    ResourceNotFound(ResourceId),

    #[error("relation not found: {0}")]
    RelationNotFound(RelationId),

    #[error("propagation batch not found: {0}")]
    BatchNotFound(BatchId),

    #[error("package not found: {0}")]
    PackageNotFound(PackageId),

    #[error("resource {resource} is on the {found} side, expected {expected}")]
    WrongSide {
        resource: ResourceId,
        expected: Side,
        found: Side,
    },

    #[error("duplicate {side} path: {path}")]
    DuplicatePath { side: Side, path: String },

    #[error("relation already exists between {from} and {to}")]
    RelationAlreadyExists { from: ResourceId, to: ResourceId },
}

/// Operator-visible warning recorded while matching.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectWarning {
    pub description: String,
    pub model_name: String,
    pub details: serde_json::Value,
}

/// In-memory project store: both codebases, their packages, and the
/// relations discovered between them.
#[derive(Debug, Default)]
pub struct CodebaseGraph {
    pub(crate) resources: BTreeMap<ResourceId, Resource>,
    pub(crate) paths: HashMap<(Side, String), ResourceId>,
    pub(crate) packages: BTreeMap<PackageId, Package>,

    pub(crate) relations: BTreeMap<RelationId, Relation>,
    //(from, to) pairs that already have a relation
    pub(crate) linked: HashSet<(ResourceId, ResourceId)>,
    //resource -> relations touching it, either side
    pub(crate) adjacency: HashMap<ResourceId, Vec<RelationId>>,

    pub(crate) batches: BTreeMap<BatchId, PropagationBatch>,
    pub(crate) warnings: Vec<ProjectWarning>,

    next_resource_id: ResourceId,
    next_package_id: PackageId,
    pub(crate) next_relation_id: RelationId,
    pub(crate) next_batch_id: BatchId,
}

impl CodebaseGraph {
    pub fn new() -> Self {
        Self {
            next_resource_id: 1,
            next_package_id: 1,
            next_relation_id: 1,
            next_batch_id: 1,
            ..Self::default()
        }
    }

    /// Insert a resource and return its id. Paths are unique per side.
    pub fn add_resource(&mut self, mut resource: Resource) -> Result<ResourceId, StoreError> {
        let key = (resource.side, resource.path.clone());
        if self.paths.contains_key(&key) {
            return Err(StoreError::DuplicatePath {
                side: resource.side,
                path: resource.path,
            });
        }

        let id = self.next_resource_id;
        self.next_resource_id += 1;
        resource.id = id;

        self.paths.insert(key, id);
        self.resources.insert(id, resource);
        Ok(id)
    }

    pub fn add_package(&mut self, purl: impl Into<String>) -> PackageId {
        let id = self.next_package_id;
        self.next_package_id += 1;
        self.packages.insert(id, Package { id, purl: purl.into() });
        id
    }

    pub fn assign_package(&mut self, resource: ResourceId, package: PackageId) -> Result<(), StoreError> {
        if !self.packages.contains_key(&package) {
            return Err(StoreError::PackageNotFound(package));
        }
        let r = self
            .resources
            .get_mut(&resource)
            .ok_or(StoreError::ResourceNotFound(resource))?;
        if !r.packages.contains(&package) {
            r.packages.push(package);
        }
        Ok(())
    }

    pub fn lookup(&self, side: Side, path: &str) -> Option<ResourceId> {
        self.paths.get(&(side, path.trim_matches('/').to_string())).copied()
    }

    pub fn resource_by_path(&self, side: Side, path: &str) -> Option<&Resource> {
        self.lookup(side, path).and_then(|id| self.resources.get(&id))
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> + '_ {
        self.resources.values()
    }

    pub fn warnings(&self) -> &[ProjectWarning] {
        &self.warnings
    }

    pub fn resource_len(&self) -> usize {
        self.resources.len()
    }
}

impl ResourceRepository for CodebaseGraph {
    fn resource(&self, id: ResourceId) -> Result<&Resource, StoreError> {
        self.resources.get(&id).ok_or(StoreError::ResourceNotFound(id))
    }

    fn query_page(&self, query: &ResourceQuery, after: Option<ResourceId>, limit: usize) -> Vec<ResourceId> {
        let start = after.map_or(0, |a| a.saturating_add(1));
        self.resources
            .range(start..)
            .filter(|(id, r)| query.matches(r, self.has_relations(**id)))
            .map(|(&id, _)| id)
            .take(limit)
            .collect()
    }

    fn has_relations(&self, id: ResourceId) -> bool {
        self.adjacency.get(&id).is_some_and(|rels| !rels.is_empty())
    }

    fn save_resource(&mut self, resource: &Resource) -> Result<(), StoreError> {
        let stored = self
            .resources
            .get_mut(&resource.id)
            .ok_or(StoreError::ResourceNotFound(resource.id))?;
        stored.status = resource.status.clone();
        stored.extra_data = resource.extra_data.clone();
        Ok(())
    }
}

impl WarningSink for CodebaseGraph {
    fn add_warning(&mut self, description: &str, model_name: &str, details: serde_json::Value) {
        self.warnings.push(ProjectWarning {
            description: description.to_string(),
            model_name: model_name.to_string(),
            details,
        });
    }
}
