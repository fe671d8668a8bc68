//! Candidate solutions and their identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Unique identity of one generated attempt:
/// `(task, model, strategy, sample index)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey {
    /// Task this candidate targets.
    pub task_id: String,

    /// Model that generated the source.
    pub model_id: String,

    /// Prompting strategy identifier (opaque to the engine).
    pub strategy: String,

    /// Sample index within the (task, model, strategy) batch.
    pub sample_index: u32,
}

impl std::fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}#{}",
            self.task_id, self.model_id, self.strategy, self.sample_index
        )
    }
}

/// One generated solution, produced by the external generation pipeline.
///
/// Consumed read-only by the executor; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateSolution {
    /// Task this candidate targets.
    pub task_id: String,

    /// Model that generated the source.
    pub model_id: String,

    /// Prompting strategy identifier.
    pub strategy: String,

    /// Sample index within the batch.
    pub sample_index: u32,

    /// The candidate source text: a self-contained unit defining the
    /// task's entry point, possibly with helper definitions.
    pub source_text: String,

    /// When the generation pipeline produced this candidate.
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl CandidateSolution {
    /// Create a new candidate stamped with the current time.
    pub fn new(
        task_id: impl Into<String>,
        model_id: impl Into<String>,
        strategy: impl Into<String>,
        sample_index: u32,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            model_id: model_id.into(),
            strategy: strategy.into(),
            sample_index,
            source_text: source_text.into(),
            generated_at: Utc::now(),
        }
    }

    /// Identity key for this candidate.
    pub fn key(&self) -> CandidateKey {
        CandidateKey {
            task_id: self.task_id.clone(),
            model_id: self.model_id.clone(),
            strategy: self.strategy.clone(),
            sample_index: self.sample_index,
        }
    }

    /// SHA-256 hex digest of the source text.
    ///
    /// Content identity for downstream artifacts: two candidates with the
    /// same digest ran the same code, whatever their keys say.
    pub fn source_digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source_text.as_bytes());
        hex::encode(hasher.finalize())
    }
}
