//! Runs parsed commands against a queue and writes the audit trail.
//!
//! Every mutating command prints the record it acted on followed by the
//! whole queue in logical order. Queue failures are reported in the
//! trail and never stop the run.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use super::{Command, Script};
use crate::queue::{IndexedJobQueue, JobField, JobRecord, QueueError, SortKey};

/// What happened to a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Rejected(QueueError),
    /// Unknown command code.
    Skipped,
}

/// Tally of a script run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub executed: usize,
    pub rejected: usize,
    pub skipped: usize,
}

pub struct Driver<W: Write> {
    queue: IndexedJobQueue,
    out: W,
}

impl<W: Write> Driver<W> {
    pub fn new(queue: IndexedJobQueue, out: W) -> Self {
        Self { queue, out }
    }

    pub fn into_parts(self) -> (IndexedJobQueue, W) {
        (self.queue, self.out)
    }

    pub fn run(&mut self, script: &Script) -> Result<RunSummary> {
        info!(commands = script.commands.len(), "running job script");
        let mut summary = RunSummary::default();

        for command in &script.commands {
            match self.execute(command)? {
                Outcome::Applied => {}
                Outcome::Rejected(e) => {
                    debug!(code = %command.code(), error = %e, "command rejected");
                    summary.rejected += 1;
                }
                Outcome::Skipped => summary.skipped += 1,
            }
            summary.executed += 1;
        }

        self.out.flush()?;
        info!(
            executed = summary.executed,
            rejected = summary.rejected,
            skipped = summary.skipped,
            remaining = self.queue.count(),
            "job script finished"
        );
        Ok(summary)
    }

    /// Run one command. Only write failures are errors.
    pub fn execute(&mut self, command: &Command) -> Result<Outcome> {
        let outcome = match *command {
            Command::Enqueue(job) => self.enqueue(job)?,
            Command::Dequeue => self.dequeue()?,
            Command::Modify {
                id,
                priority,
                job_type,
                cpu_time_consumed,
                memory_consumed,
            } => self.modify(id, priority, job_type, cpu_time_consumed, memory_consumed)?,
            Command::Change { id, field, value } => self.change(id, field, value)?,
            Command::Promote { id, positions } => self.promote(id, positions)?,
            Command::Reorder { attribute } => self.reorder(attribute)?,
            Command::Display => {
                writeln!(self.out, "Displaying all jobs in the queue:")?;
                self.write_logical()?;
                Outcome::Applied
            }
            Command::Count => {
                writeln!(self.out, "Number of elements in the queue: {}", self.queue.count())?;
                Outcome::Applied
            }
            Command::List => {
                writeln!(self.out, "List of jobs sorted by job IDs:")?;
                for job in self.queue.list_jobs() {
                    writeln!(self.out, "{job}")?;
                }
                Outcome::Applied
            }
            Command::Invalid(code) => {
                debug!(%code, "unknown command code");
                writeln!(self.out, "Invalid command!")?;
                Outcome::Skipped
            }
        };
        Ok(outcome)
    }

    fn enqueue(&mut self, job: JobRecord) -> Result<Outcome> {
        match self.queue.enqueue(job) {
            Ok(job) => {
                let job = *job;
                writeln!(self.out, "Enqueued Job:")?;
                writeln!(self.out, "{job}")?;
                writeln!(self.out, "Jobs after enqueue:")?;
                self.write_logical()?;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Outcome::Rejected(e))
            }
        }
    }

    fn dequeue(&mut self) -> Result<Outcome> {
        match self.queue.dequeue() {
            Ok(job) => {
                writeln!(self.out, "Dequeued Job:")?;
                writeln!(self.out, "{job}")?;
                writeln!(self.out, "Jobs after dequeue:")?;
                self.write_logical()?;
                Ok(Outcome::Applied)
            }
            // Nothing to show for an empty queue.
            Err(e) => Ok(Outcome::Rejected(e)),
        }
    }

    fn modify(
        &mut self,
        id: i64,
        priority: i64,
        job_type: i64,
        cpu_time_consumed: i64,
        memory_consumed: i64,
    ) -> Result<Outcome> {
        let result = self
            .queue
            .modify(id, priority, job_type, cpu_time_consumed, memory_consumed)
            .copied();

        writeln!(self.out, "Modified Job ID {id}:")?;
        if let Ok(job) = &result {
            writeln!(self.out, "{job}")?;
        }
        writeln!(self.out, "Jobs after modification: ")?;
        self.write_logical()?;

        Ok(match result {
            Ok(_) => Outcome::Applied,
            Err(e) => Outcome::Rejected(e),
        })
    }

    fn change(&mut self, id: i64, field: i64, value: i64) -> Result<Outcome> {
        if self.queue.get(id).is_none() {
            let e = QueueError::NotFound { id };
            writeln!(self.out, "{e}")?;
            return Ok(Outcome::Rejected(e));
        }

        writeln!(self.out, "Changed Job ID {id} field {field} to {value}:")?;
        let changed = JobField::from_index(field)
            .and_then(|field| self.queue.change(id, field, value).copied());
        match changed {
            Ok(job) => {
                writeln!(self.out, "{job}")?;
                writeln!(self.out, "Jobs after changing field: ")?;
                self.write_logical()?;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Outcome::Rejected(e))
            }
        }
    }

    fn promote(&mut self, id: i64, positions: i64) -> Result<Outcome> {
        let promoted = usize::try_from(positions)
            .map_err(|_| QueueError::InvalidDistance { positions })
            .and_then(|distance| self.queue.promote(id, distance).copied());

        match promoted {
            Ok(job) => {
                writeln!(self.out, "Promoted Job ID {id} by {positions} Position(s):")?;
                writeln!(self.out, "{job}")?;
                writeln!(self.out, "Jobs after promotion:")?;
                self.write_logical()?;
                Ok(Outcome::Applied)
            }
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Outcome::Rejected(e))
            }
        }
    }

    fn reorder(&mut self, attribute: i64) -> Result<Outcome> {
        let key = SortKey::from_index(attribute);
        if key.is_none() {
            debug!(attribute, "unknown reorder attribute, keeping current order");
        }

        // The drained queue is dropped here.
        self.queue = self.queue.reorder(key);

        writeln!(self.out, "Reordered Queue by attribute {attribute}:")?;
        self.write_logical()?;
        Ok(Outcome::Applied)
    }

    fn write_logical(&mut self) -> Result<()> {
        for job in self.queue.display() {
            writeln!(self.out, "{job}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_script;

    fn run(input: &str) -> (String, RunSummary, IndexedJobQueue) {
        let script = parse_script(input).expect("parse");
        let mut driver = Driver::new(IndexedJobQueue::new(), Vec::new());
        let summary = driver.run(&script).expect("run");
        let (queue, out) = driver.into_parts();
        (String::from_utf8(out).expect("utf8"), summary, queue)
    }

    #[test]
    fn test_enqueue_trail() {
        let (out, summary, _) = run("2\nA 2 1 1 10 64\nA 1 5 2 20 128\n");
        assert_eq!(
            out,
            "Enqueued Job:\n\
             Job ID: 2, Priority: 1, Job Type: 1, CPU Time Consumed: 10, Memory Consumed: 64\n\
             Jobs after enqueue:\n\
             Job ID: 2, Priority: 1, Job Type: 1, CPU Time Consumed: 10, Memory Consumed: 64\n\
             Enqueued Job:\n\
             Job ID: 1, Priority: 5, Job Type: 2, CPU Time Consumed: 20, Memory Consumed: 128\n\
             Jobs after enqueue:\n\
             Job ID: 2, Priority: 1, Job Type: 1, CPU Time Consumed: 10, Memory Consumed: 64\n\
             Job ID: 1, Priority: 5, Job Type: 2, CPU Time Consumed: 20, Memory Consumed: 128\n"
        );
        assert_eq!(summary.executed, 2);
        assert_eq!(summary.rejected, 0);
    }

    #[test]
    fn test_duplicate_is_reported() {
        let (out, summary, queue) = run("2 A 1 1 1 1 1 A 1 2 2 2 2");
        assert!(out.ends_with("Job ID 1 already exists!\n"));
        assert_eq!(summary.rejected, 1);
        assert_eq!(queue.count(), 1);
    }

    #[test]
    fn test_dequeue_empty_prints_nothing() {
        let (out, summary, _) = run("1 R");
        assert!(out.is_empty());
        assert_eq!(summary.rejected, 1);
    }

    #[test]
    fn test_list_versus_display() {
        let (out, _, _) = run("4 A 9 1 1 1 1 A 4 1 1 1 1 D L");
        let lines: Vec<&str> = out.lines().collect();
        let display = lines
            .iter()
            .position(|l| *l == "Displaying all jobs in the queue:")
            .unwrap();
        let list = lines
            .iter()
            .position(|l| *l == "List of jobs sorted by job IDs:")
            .unwrap();
        assert!(lines[display + 1].starts_with("Job ID: 9,"));
        assert!(lines[display + 2].starts_with("Job ID: 4,"));
        assert!(lines[list + 1].starts_with("Job ID: 4,"));
        assert!(lines[list + 2].starts_with("Job ID: 9,"));
    }

    #[test]
    fn test_modify_missing_still_prints_queue() {
        let (out, summary, _) = run("2 A 1 1 1 1 1 M 7 2 2 2 2");
        assert!(out.contains(
            "Modified Job ID 7:\n\
             Jobs after modification: \n\
             Job ID: 1, Priority: 1, Job Type: 1, CPU Time Consumed: 1, Memory Consumed: 1\n"
        ));
        assert_eq!(summary.rejected, 1);
    }

    #[test]
    fn test_change_paths() {
        let (out, summary, queue) = run("4 A 1 1 1 1 1 C 1 3 50 C 1 9 0 C 2 1 1");
        assert!(out.contains(
            "Changed Job ID 1 field 3 to 50:\n\
             Job ID: 1, Priority: 1, Job Type: 1, CPU Time Consumed: 50, Memory Consumed: 1\n\
             Jobs after changing field: \n"
        ));
        assert!(out.contains("Changed Job ID 1 field 9 to 0:\nInvalid field_index!\n"));
        assert!(out.ends_with("Job with ID 2 not found in the queue.\n"));
        assert_eq!(summary.rejected, 2);
        assert_eq!(queue.get(1).map(|j| j.cpu_time_consumed), Some(50));
    }

    #[test]
    fn test_promote_paths() {
        let (out, summary, queue) = run("5 A 1 1 1 1 1 A 2 1 1 1 1 P 2 1 P 5 1 P 1 -1");
        assert!(out.contains("Promoted Job ID 2 by 1 Position(s):\n"));
        assert!(out.contains("Job with ID 5 not found in the queue.\n"));
        assert!(out.ends_with("Invalid promotion distance -1!\n"));
        assert_eq!(summary.rejected, 2);
        let ids: Vec<i64> = queue.display().map(JobRecord::id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_reorder_replaces_queue() {
        let (out, _, queue) = run("4 A 1 9 1 1 1 A 2 3 1 1 1 O 2 N");
        assert!(out.contains(
            "Reordered Queue by attribute 2:\n\
             Job ID: 2, Priority: 3, Job Type: 1, CPU Time Consumed: 1, Memory Consumed: 1\n\
             Job ID: 1, Priority: 9, Job Type: 1, CPU Time Consumed: 1, Memory Consumed: 1\n"
        ));
        assert!(out.ends_with("Number of elements in the queue: 2\n"));
        assert_eq!(queue.count(), 2);
    }

    #[test]
    fn test_invalid_command_continues() {
        let (out, summary, _) = run("3 Z N Q");
        assert_eq!(
            out,
            "Invalid command!\nNumber of elements in the queue: 0\nInvalid command!\n"
        );
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.executed, 3);
    }
}
