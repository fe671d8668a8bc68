//! Execution outcomes and results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::CandidateKey;

/// Classified outcome of executing one candidate against its oracle.
///
/// Candidate-caused outcomes only; infrastructure faults are a separate
/// error channel (`HarnessError` in the harness crate) and never appear
/// here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Every oracle assertion completed.
    Pass,

    /// The oracle rejected the candidate's behavior.
    AssertionFailure,

    /// Uncaught exception outside oracle assertions.
    RuntimeError,

    /// Candidate failed to parse, or its entry point is absent or not
    /// callable.
    LoadError,

    /// Wall-clock budget exceeded; the execution context was killed.
    Timeout,

    /// Memory (or analogous resource) ceiling exceeded.
    ResourceLimitExceeded,
}

impl ExecutionOutcome {
    /// Whether this outcome counts as correct for scoring.
    pub fn is_pass(&self) -> bool {
        matches!(self, ExecutionOutcome::Pass)
    }
}

impl std::fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionOutcome::Pass => "pass",
            ExecutionOutcome::AssertionFailure => "assertion_failure",
            ExecutionOutcome::RuntimeError => "runtime_error",
            ExecutionOutcome::LoadError => "load_error",
            ExecutionOutcome::Timeout => "timeout",
            ExecutionOutcome::ResourceLimitExceeded => "resource_limit_exceeded",
        };
        write!(f, "{}", s)
    }
}

/// Result of executing a single candidate. Created exactly once per
/// executed candidate; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResult {
    /// Run under which this execution happened. Independent re-runs of
    /// the same candidate carry distinct run ids and are never merged.
    pub run_id: Uuid,

    /// Identity of the executed candidate.
    pub candidate: CandidateKey,

    /// SHA-256 hex digest of the executed source text.
    pub source_digest: String,

    /// Classified outcome.
    pub outcome: ExecutionOutcome,

    /// Wall-clock duration in milliseconds, as observed by the watchdog.
    pub duration_ms: u64,

    /// Captured stdout (truncated at the configured cap).
    pub stdout: String,

    /// Captured stderr (truncated at the configured cap).
    pub stderr: String,

    /// Human-readable diagnostic for non-pass outcomes: failing oracle
    /// case, traceback excerpt, or kill reason.
    pub failure_detail: Option<String>,
}

impl ExecutionResult {
    /// Whether this execution solved the task.
    pub fn passed(&self) -> bool {
        self.outcome.is_pass()
    }
}
