//! Domain-level error taxonomy for codebench.

/// Codebench domain errors.
///
/// These are configuration and input faults detected before or around
/// execution. Candidate misbehavior is not an error; it is an
/// [`crate::domain::ExecutionOutcome`] recorded in a normal result.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("malformed task {task_id}: {reason}")]
    MalformedTask { task_id: String, reason: String },

    #[error("duplicate task id: {0}")]
    DuplicateTask(String),

    #[error("duplicate candidate: {0}")]
    DuplicateCandidate(String),

    #[error("candidate {candidate} references unknown task: {task_id}")]
    UnknownTask { task_id: String, candidate: String },

    #[error("invalid execution limits: {0}")]
    InvalidLimits(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for codebench domain operations.
pub type Result<T> = std::result::Result<T, BenchError>;
