//! Variable Store
//!
//! The read-only interface the variable stage consults, plus a table-backed
//! implementation suitable for embedders, demos, and tests. Shell variables
//! are multi-valued; single-valued ones are lists of length one.

use indexmap::IndexMap;

use crate::path;

/// Names whose values are joined with a colon when spliced into a quoted
/// expansion.
const COLON_DELIMITED: &[&str] = &["PATH", "CDPATH", "MANPATH"];

/// A variable's values plus the delimiter used for quoted expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    values: Vec<String>,
    delimiter: char,
}

impl EnvVar {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            delimiter: ' ',
        }
    }

    pub fn with_delimiter(values: Vec<String>, delimiter: char) -> Self {
        Self { values, delimiter }
    }

    pub fn as_list(&self) -> &[String] {
        &self.values
    }

    /// The values joined with the variable's delimiter.
    pub fn as_string(&self) -> String {
        self.values.join(&self.delimiter.to_string())
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn missing_or_empty(&self) -> bool {
        self.as_string().is_empty()
    }
}

/// Read-only view of the variable environment.
pub trait VariableStore {
    fn get(&self, name: &str) -> Option<EnvVar>;

    /// The current working directory with a trailing slash.
    fn pwd_slash(&self) -> String {
        let pwd = self
            .get("PWD")
            .map(|v| v.as_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "/".to_string());
        path::pwd_slash(&pwd)
    }

    /// All defined names, in a stable order.
    fn names(&self) -> Vec<String>;
}

/// An insertion-ordered variable table.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    vars: IndexMap<String, EnvVar>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable from a list of values. Path-like names get a colon
    /// delimiter automatically.
    pub fn set<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let delimiter = if COLON_DELIMITED.contains(&name) { ':' } else { ' ' };
        let values = values.into_iter().map(Into::into).collect();
        self.vars
            .insert(name.to_string(), EnvVar::with_delimiter(values, delimiter));
    }

    /// Set a single-valued variable.
    pub fn set_one(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, [value.into()]);
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.shift_remove(name);
    }
}

impl VariableStore for VarTable {
    fn get(&self, name: &str) -> Option<EnvVar> {
        self.vars.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}
