// relation bookkeeping on the in-memory store
use crate::core::graph::{CodebaseGraph, StoreError};
use crate::core::relation::{NewBatch, NewRelation, PropagationBatch, Relation};
use crate::core::repository::RelationSink;
use crate::core::types::{BatchId, RelationId, ResourceId, Side};

impl CodebaseGraph {
    //relation invariants:
    //1. from_resource must exist and be on the From side.
    //2. to_resource must exist and be on the To side.
    //3. At most one relation per (from, to) pair, whatever the map type.
    //4. A resource may take part in any number of relations.

    fn expect_side(&self, resource: ResourceId, expected: Side) -> Result<(), StoreError> {
        let found = self
            .resources
            .get(&resource)
            .ok_or(StoreError::ResourceNotFound(resource))?
            .side;
        if found != expected {
            return Err(StoreError::WrongSide { resource, expected, found });
        }
        Ok(())
    }

    /// Relations touching `resource` on either side, in creation order.
    pub fn relations_of(&self, resource: ResourceId) -> Vec<&Relation> {
        self.adjacency
            .get(&resource)
            .map(|ids| ids.iter().filter_map(|id| self.relations.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn relation_between(&self, from: ResourceId, to: ResourceId) -> Option<&Relation> {
        self.relations_of(to)
            .into_iter()
            .find(|r| r.from_resource == from && r.to_resource == to)
    }

    pub fn relation_len(&self) -> usize {
        self.relations.len()
    }

    pub fn iter_relations(&self) -> impl Iterator<Item = &Relation> + '_ {
        self.relations.values()
    }

    pub fn batches(&self) -> impl Iterator<Item = &PropagationBatch> + '_ {
        self.batches.values()
    }

    /// Remove a relation; the only mutation relations ever see.
    pub fn remove_relation(&mut self, id: RelationId) -> Result<Relation, StoreError> {
        let relation = self.relations.remove(&id).ok_or(StoreError::RelationNotFound(id))?;
        self.linked.remove(&(relation.from_resource, relation.to_resource));
        for end in [relation.from_resource, relation.to_resource] {
            if let Some(ids) = self.adjacency.get_mut(&end) {
                ids.retain(|&x| x != id);
            }
        }
        Ok(relation)
    }
}

impl RelationSink for CodebaseGraph {
    fn relation(&self, id: RelationId) -> Result<&Relation, StoreError> {
        self.relations.get(&id).ok_or(StoreError::RelationNotFound(id))
    }

    fn relation_exists(&self, from: ResourceId, to: ResourceId) -> bool {
        self.linked.contains(&(from, to))
    }

    fn create_relation(&mut self, relation: NewRelation) -> Result<RelationId, StoreError> {
        let (from, to) = (relation.from_resource, relation.to_resource);
        self.expect_side(from, Side::From)?;
        self.expect_side(to, Side::To)?;

        if self.linked.contains(&(from, to)) {
            return Err(StoreError::RelationAlreadyExists { from, to });
        }

        let id = self.next_relation_id;
        self.next_relation_id += 1;

        self.relations.insert(
            id,
            Relation {
                id,
                from_resource: from,
                to_resource: to,
                map_type: relation.map_type,
                extra_data: relation.extra_data,
            },
        );
        self.linked.insert((from, to));
        self.adjacency.entry(from).or_default().push(id);
        self.adjacency.entry(to).or_default().push(id);
        Ok(id)
    }

    fn batch(&self, id: BatchId) -> Result<&PropagationBatch, StoreError> {
        self.batches.get(&id).ok_or(StoreError::BatchNotFound(id))
    }

    fn create_batch(&mut self, batch: NewBatch) -> Result<BatchId, StoreError> {
        if let Some(seed) = batch.source_relation {
            self.relation(seed)?;
        }

        let id = self.next_batch_id;
        self.next_batch_id += 1;
        self.batches.insert(
            id,
            PropagationBatch {
                id,
                source_relation: batch.source_relation,
                strategy: batch.strategy,
                relation_count: 0,
                created_by: batch.created_by,
            },
        );
        Ok(id)
    }

    fn set_batch_relation_count(&mut self, id: BatchId, count: usize) -> Result<(), StoreError> {
        let batch = self.batches.get_mut(&id).ok_or(StoreError::BatchNotFound(id))?;
        batch.relation_count = count;
        Ok(())
    }
}
