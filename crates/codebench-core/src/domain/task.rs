//! Benchmark task definitions.

use serde::{Deserialize, Serialize};

/// A single benchmark problem with its verification oracle.
///
/// Immutable once loaded into a [`crate::registry::TaskRegistry`]; lives
/// for the whole evaluation run and is shared read-only across workers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    /// Problem identifier (e.g. "HumanEval/0").
    #[serde(alias = "task_id")]
    pub id: String,

    /// Problem specification handed to the generation pipeline
    /// (signature, docstring, examples).
    #[serde(alias = "prompt")]
    pub prompt_spec: String,

    /// Oracle source. Must declare a `check` routine taking the
    /// candidate's entry point callable as its single argument.
    #[serde(alias = "test")]
    pub oracle_code: String,

    /// Name of the function every candidate must define.
    pub entry_point: String,
}

impl Task {
    /// Create a new task.
    pub fn new(
        id: impl Into<String>,
        prompt_spec: impl Into<String>,
        oracle_code: impl Into<String>,
        entry_point: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt_spec: prompt_spec.into(),
            oracle_code: oracle_code.into(),
            entry_point: entry_point.into(),
        }
    }

    /// Check structural well-formedness. Returns the first violation.
    ///
    /// The oracle must textually declare `def check(`: the registry
    /// refuses tasks whose oracle exposes no check entry point, rather
    /// than letting every candidate fail at verification time.
    pub(crate) fn well_formed(&self) -> std::result::Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("task id is empty".to_string());
        }
        if self.prompt_spec.trim().is_empty() {
            return Err("prompt specification is empty".to_string());
        }
        if self.entry_point.trim().is_empty() {
            return Err("entry point name is empty".to_string());
        }
        if !is_identifier(&self.entry_point) {
            return Err(format!(
                "entry point {:?} is not a valid identifier",
                self.entry_point
            ));
        }
        if !self.oracle_code.contains("def check(") {
            return Err("oracle declares no `check` entry point".to_string());
        }
        Ok(())
    }
}

/// ASCII identifier check for entry-point names.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
