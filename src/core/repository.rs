// narrow store interface the matching engine is written against
use regex::Regex;

use crate::core::graph::StoreError;
use crate::core::relation::{NewBatch, NewRelation, PropagationBatch, Relation};
use crate::core::resource::Resource;
use crate::core::types::{BatchId, PackageId, RelationId, ResourceId, Side};

/// Filter over the resources of one project.
///
/// Every set field narrows the selection; an empty query selects everything.
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    pub side: Option<Side>,
    /// Only resources that have no relation at all.
    pub unmapped: bool,
    pub files_only: bool,
    /// Exact parent directory path ("" is the root).
    pub parent: Option<String>,
    /// Member of at least one of these packages.
    pub packages: Option<Vec<PackageId>>,
    pub path_regex: Option<Regex>,
    pub path: Option<String>,
    pub name: Option<String>,
    /// Any of these extensions (with the leading dot).
    pub extensions: Vec<String>,
    pub sha1: Option<String>,
    pub with_sha1: bool,
    pub with_source_symbols: bool,
    pub with_binary_symbols: bool,
    pub exclude: Vec<ResourceId>,
}

impl ResourceQuery {
    pub fn side(side: Side) -> Self {
        Self {
            side: Some(side),
            ..Self::default()
        }
    }

    pub fn to_files() -> Self {
        Self::side(Side::To).files()
    }

    pub fn from_files() -> Self {
        Self::side(Side::From).files()
    }

    pub fn files(mut self) -> Self {
        self.files_only = true;
        self
    }

    pub fn unmapped(mut self) -> Self {
        self.unmapped = true;
        self
    }

    pub fn in_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn in_packages(mut self, packages: impl IntoIterator<Item = PackageId>) -> Self {
        self.packages = Some(packages.into_iter().collect());
        self
    }

    pub fn path_matching(mut self, regex: Regex) -> Self {
        self.path_regex = Some(regex);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn extensions<S: Into<String>>(mut self, extensions: impl IntoIterator<Item = S>) -> Self {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    pub fn has_sha1(mut self) -> Self {
        self.with_sha1 = true;
        self
    }

    pub fn has_source_symbols(mut self) -> Self {
        self.with_source_symbols = true;
        self
    }

    pub fn has_binary_symbols(mut self) -> Self {
        self.with_binary_symbols = true;
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = ResourceId>) -> Self {
        self.exclude.extend(ids);
        self
    }

    /// Evaluate the filter against one resource. `mapped` tells whether the
    /// resource currently has any relation.
    pub fn matches(&self, resource: &Resource, mapped: bool) -> bool {
        if self.side.is_some_and(|side| side != resource.side) {
            return false;
        }
        if self.unmapped && mapped {
            return false;
        }
        if self.files_only && !resource.is_file() {
            return false;
        }
        if self.exclude.contains(&resource.id) {
            return false;
        }
        if let Some(parent) = &self.parent {
            if resource.parent_path() != parent.trim_matches('/') {
                return false;
            }
        }
        if let Some(packages) = &self.packages {
            if !resource.packages.iter().any(|p| packages.contains(p)) {
                return false;
            }
        }
        if let Some(path) = &self.path {
            if &resource.path != path {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if &resource.name != name {
                return false;
            }
        }
        if !self.extensions.is_empty() && !self.extensions.iter().any(|e| *e == resource.extension) {
            return false;
        }
        if let Some(sha1) = &self.sha1 {
            if resource.sha1.as_ref() != Some(sha1) {
                return false;
            }
        }
        if self.with_sha1 && resource.sha1.as_deref().is_none_or(str::is_empty) {
            return false;
        }
        if self.with_source_symbols && resource.extra_data.source_symbols.is_none() {
            return false;
        }
        if self.with_binary_symbols && resource.extra_data.binary_symbols.is_none() {
            return false;
        }
        if let Some(regex) = &self.path_regex {
            if !regex.is_match(&resource.path) {
                return false;
            }
        }
        true
    }
}

/// Read/write access to the resources of one project.
pub trait ResourceRepository {
    fn resource(&self, id: ResourceId) -> Result<&Resource, StoreError>;

    /// Up to `limit` matching ids in ascending id order, strictly after `after`.
    ///
    /// Keyset pagination keeps iteration stable while callers create
    /// relations or update resources between pages.
    fn query_page(&self, query: &ResourceQuery, after: Option<ResourceId>, limit: usize) -> Vec<ResourceId>;

    fn has_relations(&self, id: ResourceId) -> bool;

    /// Persist the mutable parts of a resource (`status`, `extra_data`).
    fn save_resource(&mut self, resource: &Resource) -> Result<(), StoreError>;

    fn query_chunks<'a>(&'a self, query: &'a ResourceQuery, chunk_size: usize) -> ChunkedQuery<'a, Self> {
        ChunkedQuery {
            repository: self,
            query,
            chunk_size: chunk_size.max(1),
            after: None,
            done: false,
        }
    }

    fn query_all(&self, query: &ResourceQuery) -> Vec<ResourceId> {
        self.query_chunks(query, DEFAULT_CHUNK_SIZE).flatten().collect()
    }

    fn first(&self, query: &ResourceQuery) -> Option<ResourceId> {
        self.query_page(query, None, 1).into_iter().next()
    }

    fn count(&self, query: &ResourceQuery) -> usize {
        self.query_chunks(query, DEFAULT_CHUNK_SIZE).map(|chunk| chunk.len()).sum()
    }
}

pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Iterator over pages of matching resource ids.
pub struct ChunkedQuery<'a, R: ResourceRepository + ?Sized> {
    repository: &'a R,
    query: &'a ResourceQuery,
    chunk_size: usize,
    after: Option<ResourceId>,
    done: bool,
}

impl<R: ResourceRepository + ?Sized> Iterator for ChunkedQuery<'_, R> {
    type Item = Vec<ResourceId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = self.repository.query_page(self.query, self.after, self.chunk_size);
        if page.len() < self.chunk_size {
            self.done = true;
        }
        match page.last() {
            Some(&last) => {
                self.after = Some(last);
                Some(page)
            }
            None => None,
        }
    }
}

/// Destination of relations and propagation batches.
pub trait RelationSink {
    fn relation(&self, id: RelationId) -> Result<&Relation, StoreError>;

    /// Whether any relation links this pair, whatever its map type.
    fn relation_exists(&self, from: ResourceId, to: ResourceId) -> bool;

    fn create_relation(&mut self, relation: NewRelation) -> Result<RelationId, StoreError>;

    /// Create many relations at once, silently skipping pairs that are
    /// already linked (including duplicates inside `relations`).
    fn bulk_create_relations(&mut self, relations: Vec<NewRelation>) -> Result<Vec<RelationId>, StoreError> {
        let mut created = Vec::with_capacity(relations.len());
        for relation in relations {
            if self.relation_exists(relation.from_resource, relation.to_resource) {
                continue;
            }
            created.push(self.create_relation(relation)?);
        }
        Ok(created)
    }

    fn batch(&self, id: BatchId) -> Result<&PropagationBatch, StoreError>;

    fn create_batch(&mut self, batch: NewBatch) -> Result<BatchId, StoreError>;

    fn set_batch_relation_count(&mut self, id: BatchId, count: usize) -> Result<(), StoreError>;
}

/// Operator-visible warnings.
pub trait WarningSink {
    fn add_warning(&mut self, description: &str, model_name: &str, details: serde_json::Value);
}

/// Everything the matching engine needs from a project store.
pub trait Project: ResourceRepository + RelationSink + WarningSink {}

impl<T: ResourceRepository + RelationSink + WarningSink> Project for T {}
