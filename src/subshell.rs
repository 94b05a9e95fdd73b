//! Subshell Executor
//!
//! The collaborator that evaluates a command-substitution snippet and
//! returns its output lines. Executing shell source can re-enter the
//! expansion core, so implementations that share state use interior
//! mutability behind the `&self` receiver.

use std::cell::RefCell;
use std::collections::HashMap;

/// Exit status meaning the substitution produced more data than the shell
/// is willing to buffer.
pub const STATUS_READ_TOO_MUCH: i32 = 122;

pub trait SubshellExecutor {
    /// Run `source`, appending its output lines to `out_lines`. Returns the
    /// exit status, `-1` on failure to run at all, or
    /// `STATUS_READ_TOO_MUCH` when the output was discarded for size.
    fn exec_subshell(
        &self,
        source: &str,
        out_lines: &mut Vec<String>,
        apply_exit_status: bool,
        is_subcmd: bool,
    ) -> i32;
}

/// A table-driven executor: each known source maps to its output lines.
/// Unknown sources fail with `-1`. Calls are recorded for inspection.
#[derive(Debug, Default)]
pub struct ScriptedSubshell {
    outputs: HashMap<String, Vec<String>>,
    statuses: HashMap<String, i32>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedSubshell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, source: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.insert(
            source.to_string(),
            lines.into_iter().map(Into::into).collect(),
        );
    }

    /// Make a source return a specific status with no output.
    pub fn insert_status(&mut self, source: &str, status: i32) {
        self.statuses.insert(source.to_string(), status);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl SubshellExecutor for ScriptedSubshell {
    fn exec_subshell(
        &self,
        source: &str,
        out_lines: &mut Vec<String>,
        _apply_exit_status: bool,
        _is_subcmd: bool,
    ) -> i32 {
        self.calls.borrow_mut().push(source.to_string());
        if let Some(&status) = self.statuses.get(source) {
            return status;
        }
        match self.outputs.get(source) {
            Some(lines) => {
                out_lines.extend(lines.iter().cloned());
                0
            }
            None => -1,
        }
    }
}
