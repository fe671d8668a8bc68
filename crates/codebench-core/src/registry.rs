//! Task registry: validated, read-only task lookup.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::domain::{BenchError, Result, Task};

/// Validated mapping from task id to [`Task`].
///
/// Built once before a run and read-only afterwards; safe to share via
/// `Arc` across executor workers without locking.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Task>,
}

impl TaskRegistry {
    /// Build a registry from tasks, validating each one.
    ///
    /// Fails with [`BenchError::MalformedTask`] when a task is
    /// structurally incomplete or its oracle declares no `check` entry
    /// point, and with [`BenchError::DuplicateTask`] on id collisions.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for task in tasks {
            task.well_formed()
                .map_err(|reason| BenchError::MalformedTask {
                    task_id: task.id.clone(),
                    reason,
                })?;
            if map.insert(task.id.clone(), task.clone()).is_some() {
                return Err(BenchError::DuplicateTask(task.id));
            }
        }
        Ok(Self { tasks: map })
    }

    /// Load a registry from a JSONL file, one task object per line.
    ///
    /// Accepts both codebench field names and the benchmark's original
    /// `task_id`/`prompt`/`test` names. Blank lines are skipped.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);

        let mut tasks = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let task: Task = serde_json::from_str(&line)?;
            tasks.push(task);
        }

        let registry = Self::from_tasks(tasks)?;
        info!(path = %path.display(), tasks = registry.len(), "Loaded task registry");
        Ok(registry)
    }

    /// Look up a task by id.
    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// Iterate tasks in id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the registry holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
