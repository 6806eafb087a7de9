//! jobqueue -- command-driven CPU job queue.
//!
//! The core is [`queue::IndexedJobQueue`], which keeps a linked logical
//! order and an indexed array order over the same job records. The
//! [`command`] module parses single-letter command scripts and drives a
//! queue, writing an audit trail of every operation.

pub mod command;
pub mod config;
pub mod queue;

use std::io::Write;

use anyhow::{Context, Result};

use crate::command::{Driver, RunSummary};
use crate::config::QueueConfig;
use crate::queue::IndexedJobQueue;

/// Parse `input` as a command script and run it against a fresh queue,
/// writing the audit trail to `out`. Returns the run tally and the final
/// queue.
pub fn run_script<W: Write>(
    input: &str,
    config: &QueueConfig,
    out: W,
) -> Result<(RunSummary, IndexedJobQueue)> {
    let script = command::parse_script(input).context("failed to parse command script")?;
    let mut driver = Driver::new(IndexedJobQueue::with_config(config), out);
    let summary = driver.run(&script)?;
    let (queue, _) = driver.into_parts();
    Ok((summary, queue))
}
