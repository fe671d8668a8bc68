//! Domain models for codebench.
//!
//! Canonical definitions for the core entities:
//! - `Task`: a benchmark problem with its verification oracle
//! - `CandidateSolution`: one generated attempt at solving a task
//! - `ExecutionResult`: the classified outcome of a single execution

pub mod candidate;
pub mod error;
pub mod outcome;
pub mod task;

// Re-export main types and errors
pub use candidate::{CandidateKey, CandidateSolution};
pub use error::{BenchError, Result};
pub use outcome::{ExecutionOutcome, ExecutionResult};
pub use task::Task;
