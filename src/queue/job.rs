//! Job records and the integer selectors used by `change` and `reorder`.

use std::fmt;

use serde::Serialize;

use super::QueueError;

/// One unit of CPU work. `id` is fixed at creation; the rest is mutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    id: i64,
    pub priority: i64,
    pub job_type: i64,
    pub cpu_time_consumed: i64,
    pub memory_consumed: i64,
}

impl JobRecord {
    pub fn new(
        id: i64,
        priority: i64,
        job_type: i64,
        cpu_time_consumed: i64,
        memory_consumed: i64,
    ) -> Self {
        Self {
            id,
            priority,
            job_type,
            cpu_time_consumed,
            memory_consumed,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Overwrite all four mutable fields.
    pub fn update(
        &mut self,
        priority: i64,
        job_type: i64,
        cpu_time_consumed: i64,
        memory_consumed: i64,
    ) {
        self.priority = priority;
        self.job_type = job_type;
        self.cpu_time_consumed = cpu_time_consumed;
        self.memory_consumed = memory_consumed;
    }

    pub fn set(&mut self, field: JobField, value: i64) {
        match field {
            JobField::Priority => self.priority = value,
            JobField::JobType => self.job_type = value,
            JobField::CpuTime => self.cpu_time_consumed = value,
            JobField::Memory => self.memory_consumed = value,
        }
    }

    pub fn sort_value(&self, key: SortKey) -> i64 {
        match key {
            SortKey::Id => self.id,
            SortKey::Priority => self.priority,
            SortKey::CpuTime => self.cpu_time_consumed,
        }
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job ID: {}, Priority: {}, Job Type: {}, CPU Time Consumed: {}, Memory Consumed: {}",
            self.id, self.priority, self.job_type, self.cpu_time_consumed, self.memory_consumed
        )
    }
}

/// Mutable field selector for `change` (1-based on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Priority = 1,
    JobType = 2,
    CpuTime = 3,
    Memory = 4,
}

impl JobField {
    pub fn from_index(index: i64) -> Result<Self, QueueError> {
        match index {
            1 => Ok(Self::Priority),
            2 => Ok(Self::JobType),
            3 => Ok(Self::CpuTime),
            4 => Ok(Self::Memory),
            _ => Err(QueueError::InvalidField { index }),
        }
    }
}

/// Attribute selector for `reorder`. Unknown selectors have no key and
/// leave the order as it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id = 1,
    Priority = 2,
    CpuTime = 3,
}

impl SortKey {
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(Self::Id),
            2 => Some(Self::Priority),
            3 => Some(Self::CpuTime),
            _ => None,
        }
    }
}
