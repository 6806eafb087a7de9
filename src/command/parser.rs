//! Script parser.
//!
//! A script is a command count followed by that many commands. A command
//! is the next non-whitespace character; its integer arguments follow,
//! separated by whitespace. Integers are an optional sign and a run of
//! digits, so `A1 2 3 4 5` and `A 1 2 3 4 5` read the same.

use tracing::warn;

use super::{Command, ScriptError};
use crate::queue::JobRecord;

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// The count the script announced.
    pub declared: usize,
    pub commands: Vec<Command>,
}

impl Script {
    /// True when the input ended before `declared` commands were read.
    pub fn is_truncated(&self) -> bool {
        self.commands.len() < self.declared
    }
}

pub fn parse_script(input: &str) -> Result<Script, ScriptError> {
    let mut scanner = Scanner::new(input);

    scanner.skip_whitespace();
    if scanner.at_end() {
        return Err(ScriptError::MissingCount);
    }
    let count_offset = scanner.pos;
    let count = scanner.integer()?;
    let declared = usize::try_from(count).map_err(|_| ScriptError::BadCount {
        count,
        offset: count_offset,
    })?;

    let mut commands = Vec::with_capacity(declared.min(1024));
    while commands.len() < declared {
        let Some((offset, code)) = scanner.next_char() else {
            break;
        };
        commands.push(scanner.command(code, offset)?);
    }

    let script = Script { declared, commands };
    if script.is_truncated() {
        warn!(
            declared,
            found = script.commands.len(),
            "script ended before the announced command count"
        );
    }
    Ok(script)
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        self.skip_whitespace();
        let offset = self.pos;
        let c = self.rest().chars().next()?;
        self.pos += c.len_utf8();
        Some((offset, c))
    }

    fn integer(&mut self) -> Result<i64, ScriptError> {
        self.skip_whitespace();
        let start = self.pos;
        let rest = self.rest();

        let sign_len = usize::from(rest.starts_with(|c: char| c == '-' || c == '+'));
        let digits = rest[sign_len..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();

        let invalid = || {
            let found: String = rest.split_whitespace().next().unwrap_or_default().to_string();
            ScriptError::InvalidInteger {
                offset: start,
                found,
            }
        };
        if digits == 0 {
            return Err(invalid());
        }

        let token = &rest[..sign_len + digits];
        let value = token.parse::<i64>().map_err(|_| invalid())?;
        self.pos += token.len();
        Ok(value)
    }

    fn argument(&mut self, code: char, argument: &'static str) -> Result<i64, ScriptError> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(ScriptError::MissingArgument {
                code,
                argument,
                offset: self.pos,
            });
        }
        self.integer()
    }

    fn command(&mut self, code: char, offset: usize) -> Result<Command, ScriptError> {
        let command = match code {
            'A' => {
                let id = self.argument(code, "id")?;
                let priority = self.argument(code, "priority")?;
                let job_type = self.argument(code, "job type")?;
                let cpu = self.argument(code, "cpu time")?;
                let memory = self.argument(code, "memory")?;
                Command::Enqueue(JobRecord::new(id, priority, job_type, cpu, memory))
            }
            'R' => Command::Dequeue,
            'M' => Command::Modify {
                id: self.argument(code, "id")?,
                priority: self.argument(code, "priority")?,
                job_type: self.argument(code, "job type")?,
                cpu_time_consumed: self.argument(code, "cpu time")?,
                memory_consumed: self.argument(code, "memory")?,
            },
            'C' => Command::Change {
                id: self.argument(code, "id")?,
                field: self.argument(code, "field index")?,
                value: self.argument(code, "value")?,
            },
            'P' => Command::Promote {
                id: self.argument(code, "id")?,
                positions: self.argument(code, "positions")?,
            },
            'O' => Command::Reorder {
                attribute: self.argument(code, "attribute index")?,
            },
            'D' => Command::Display,
            'N' => Command::Count,
            'L' => Command::List,
            other => Command::Invalid(other),
        };
        tracing::trace!(code = %command.code(), offset, "parsed command");
        Ok(command)
    }
}
