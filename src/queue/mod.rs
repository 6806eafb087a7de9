//! Job queue core: a linked logical order plus an indexed array view.

pub mod indexed;
pub mod job;
pub mod sequence;

use thiserror::Error;

pub use self::indexed::{IndexedJobQueue, QueueSnapshot};
pub use self::job::{JobField, JobRecord, SortKey};
pub use self::sequence::{LinkedSequence, NodeId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Job ID {id} already exists!")]
    DuplicateId { id: i64 },

    #[error("queue is empty")]
    Empty,

    #[error("Job with ID {id} not found in the queue.")]
    NotFound { id: i64 },

    #[error("Invalid field_index!")]
    InvalidField { index: i64 },

    #[error("Invalid promotion distance {positions}!")]
    InvalidDistance { positions: i64 },
}
