//! Command scripts: parsing single-letter commands and driving a queue.

pub mod driver;
pub mod parser;

use thiserror::Error;

use crate::queue::JobRecord;

pub use self::driver::{Driver, Outcome, RunSummary};
pub use self::parser::{parse_script, Script};

/// One parsed command. Arguments are kept as read; range checks happen
/// when the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `A id priority job_type cpu_time memory`
    Enqueue(JobRecord),
    /// `R`
    Dequeue,
    /// `M id priority job_type cpu_time memory`
    Modify {
        id: i64,
        priority: i64,
        job_type: i64,
        cpu_time_consumed: i64,
        memory_consumed: i64,
    },
    /// `C id field_index value`
    Change { id: i64, field: i64, value: i64 },
    /// `P id positions`
    Promote { id: i64, positions: i64 },
    /// `O attribute_index`
    Reorder { attribute: i64 },
    /// `D`
    Display,
    /// `N`
    Count,
    /// `L`
    List,
    /// Any other code. Reported and skipped.
    Invalid(char),
}

impl Command {
    pub fn code(&self) -> char {
        match self {
            Self::Enqueue(_) => 'A',
            Self::Dequeue => 'R',
            Self::Modify { .. } => 'M',
            Self::Change { .. } => 'C',
            Self::Promote { .. } => 'P',
            Self::Reorder { .. } => 'O',
            Self::Display => 'D',
            Self::Count => 'N',
            Self::List => 'L',
            Self::Invalid(code) => *code,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("script is empty: expected a command count")]
    MissingCount,

    #[error("invalid command count {count} at byte {offset}")]
    BadCount { count: i64, offset: usize },

    #[error("expected an integer at byte {offset}, found {found:?}")]
    InvalidInteger { offset: usize, found: String },

    #[error("command '{code}' at byte {offset} is missing its {argument} argument")]
    MissingArgument {
        code: char,
        argument: &'static str,
        offset: usize,
    },
}
