//! The indexed job queue.
//!
//! Two views over one record store:
//! - the *logical* order, a [`LinkedSequence`] that owns every record and
//!   gives FIFO semantics (`display`);
//! - the *array* order, a resizable vector of [`NodeId`] handles into that
//!   sequence (`list_jobs`). Enqueue keeps it sorted by job id; promote and
//!   reorder make it authoritative and rebuild the logical order from it.
//!
//! An id -> handle map backs duplicate detection and lookups.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::job::{JobField, JobRecord, SortKey};
use super::sequence::{LinkedSequence, NodeId};
use super::QueueError;
use crate::config::QueueConfig;

#[derive(Debug)]
pub struct IndexedJobQueue {
    sequence: LinkedSequence<JobRecord>,
    index: Vec<NodeId>,
    by_id: HashMap<i64, NodeId>,
    capacity: usize,
    initial_capacity: usize,
    min_capacity: usize,
}

/// Point-in-time copy of both views, for machine-readable output.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshot {
    pub count: usize,
    pub capacity: usize,
    pub logical: Vec<JobRecord>,
    pub array: Vec<JobRecord>,
}

impl Default for IndexedJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedJobQueue {
    pub fn new() -> Self {
        Self::with_config(&QueueConfig::default())
    }

    pub fn with_config(config: &QueueConfig) -> Self {
        Self::with_policy(config.initial_capacity, config.min_capacity)
    }

    fn with_policy(initial_capacity: usize, min_capacity: usize) -> Self {
        let min_capacity = min_capacity.max(1);
        let initial_capacity = initial_capacity.max(min_capacity);
        Self {
            sequence: LinkedSequence::new(),
            index: Vec::with_capacity(initial_capacity),
            by_id: HashMap::with_capacity(initial_capacity),
            capacity: initial_capacity,
            initial_capacity,
            min_capacity,
        }
    }

    pub fn count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Logical slot count of the index array.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: i64) -> Option<&JobRecord> {
        self.by_id.get(&id).and_then(|&node| self.sequence.get(node))
    }

    /// Append a job at the logical tail and slot it into id order in the
    /// array. The logical order is left untouched by the id sort.
    pub fn enqueue(&mut self, job: JobRecord) -> Result<&JobRecord, QueueError> {
        let id = job.id();
        if self.by_id.contains_key(&id) {
            debug!(id, "rejected duplicate job id");
            return Err(QueueError::DuplicateId { id });
        }

        if self.index.len() == self.capacity {
            self.resize(self.capacity * 2);
        }

        let node = self.sequence.push_back(job);
        self.by_id.insert(id, node);
        self.index.push(node);

        // Only the new entry can be out of place.
        let mut pos = self.index.len() - 1;
        while pos > 0 && self.id_at(pos) < self.id_at(pos - 1) {
            self.index.swap(pos, pos - 1);
            pos -= 1;
        }

        debug!(id, array_pos = pos, count = self.count(), "enqueued job");
        self.sequence.get(node).ok_or(QueueError::NotFound { id })
    }

    /// Remove and return the job at the logical front.
    pub fn dequeue(&mut self) -> Result<JobRecord, QueueError> {
        let (node, job) = self.sequence.pop_front().ok_or(QueueError::Empty)?;

        // The array is not in logical order, so find the entry by handle.
        if let Some(pos) = self.index.iter().position(|&h| h == node) {
            self.index.remove(pos);
        }
        self.by_id.remove(&job.id());

        let count = self.index.len();
        if count > 0 && count <= self.capacity / 2 {
            self.resize(self.capacity / 2);
        }

        debug!(id = job.id(), count, "dequeued job");
        Ok(job)
    }

    /// Overwrite all four mutable fields of job `id`.
    pub fn modify(
        &mut self,
        id: i64,
        priority: i64,
        job_type: i64,
        cpu_time_consumed: i64,
        memory_consumed: i64,
    ) -> Result<&JobRecord, QueueError> {
        let job = self.job_mut(id)?;
        job.update(priority, job_type, cpu_time_consumed, memory_consumed);
        Ok(&*job)
    }

    /// Set a single field of job `id`.
    pub fn change(
        &mut self,
        id: i64,
        field: JobField,
        value: i64,
    ) -> Result<&JobRecord, QueueError> {
        let job = self.job_mut(id)?;
        job.set(field, value);
        Ok(&*job)
    }

    /// Move job `id` up to `positions` slots towards the front of the array,
    /// stopping at index 0, then make the logical order match the array.
    pub fn promote(&mut self, id: i64, positions: usize) -> Result<&JobRecord, QueueError> {
        let node = self.node_of(id)?;
        let current = self
            .index
            .iter()
            .position(|&h| h == node)
            .ok_or(QueueError::NotFound { id })?;
        let target = current.saturating_sub(positions);

        self.index[target..=current].rotate_right(1);
        self.sequence.relink(&self.index);

        debug!(id, from = current, to = target, "promoted job");
        self.sequence.get(node).ok_or(QueueError::NotFound { id })
    }

    /// Move every record into a new queue ordered by `key`.
    ///
    /// With no key the current array order is kept. Both views of the new
    /// queue follow the computed order. `self` is left empty.
    pub fn reorder(&mut self, key: Option<SortKey>) -> IndexedJobQueue {
        if let Some(key) = key {
            let sequence = &self.sequence;
            self.index
                .sort_by_key(|&node| sequence.get(node).map(|job| job.sort_value(key)));
        }
        self.sequence.relink(&self.index);

        let mut reordered = Self::with_policy(self.initial_capacity, self.min_capacity);
        while let Some((_, job)) = self.sequence.pop_front() {
            reordered.install(job);
        }

        self.index.clear();
        self.by_id.clear();
        self.resize(self.min_capacity);

        debug!(?key, count = reordered.count(), "reordered queue");
        reordered
    }

    /// Records in array order.
    pub fn list_jobs(&self) -> impl Iterator<Item = &JobRecord> + '_ {
        self.index.iter().filter_map(|&node| self.sequence.get(node))
    }

    /// Records in logical order.
    pub fn display(&self) -> impl Iterator<Item = &JobRecord> + '_ {
        self.sequence.iter()
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            count: self.count(),
            capacity: self.capacity,
            logical: self.display().copied().collect(),
            array: self.list_jobs().copied().collect(),
        }
    }

    /// Append at the tail of both views without the duplicate check or the
    /// id sort.
    fn install(&mut self, job: JobRecord) {
        if self.index.len() == self.capacity {
            self.resize(self.capacity * 2);
        }
        let id = job.id();
        let node = self.sequence.push_back(job);
        self.by_id.insert(id, node);
        self.index.push(node);
    }

    fn resize(&mut self, target: usize) {
        let new_capacity = target.max(self.min_capacity).max(self.index.len());
        if new_capacity == self.capacity {
            return;
        }

        if new_capacity > self.capacity {
            self.index.reserve_exact(new_capacity - self.index.len());
        } else {
            self.index.shrink_to(new_capacity);
        }
        debug!(from = self.capacity, to = new_capacity, "resized job index");
        self.capacity = new_capacity;
    }

    fn node_of(&self, id: i64) -> Result<NodeId, QueueError> {
        self.by_id.get(&id).copied().ok_or(QueueError::NotFound { id })
    }

    fn job_mut(&mut self, id: i64) -> Result<&mut JobRecord, QueueError> {
        let node = self.node_of(id)?;
        self.sequence.get_mut(node).ok_or(QueueError::NotFound { id })
    }

    fn id_at(&self, pos: usize) -> Option<i64> {
        self.index
            .get(pos)
            .and_then(|&node| self.sequence.get(node))
            .map(JobRecord::id)
    }
}
