//! Oracle verdict protocol and outcome classification.
//!
//! The driver script performs the in-sandbox verification: it resolves
//! the candidate's entry point by name, hands the callable to the
//! oracle's `check` routine, and writes one raw verdict before exiting.
//! This module owns the protocol vocabulary and turns a raw verdict (or
//! the absence of one) into either a candidate outcome or a harness
//! fault, the two channels the rest of the engine must keep apart.

use std::process::ExitStatus;

use codebench_core::ExecutionOutcome;
use serde::Deserialize;

/// Verdict record written by the driver inside the sandbox.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVerdict {
    /// Protocol outcome tag.
    pub outcome: String,

    /// Human-readable diagnostic (failing case, traceback excerpt).
    #[serde(default)]
    pub detail: String,
}

/// Classified verdict for one completed execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate produced a classifiable outcome.
    Outcome {
        outcome: ExecutionOutcome,
        detail: Option<String>,
    },

    /// The sandbox ran, but the verification machinery itself broke
    /// (bad oracle, protocol violation). Not a candidate fault.
    HarnessFault { reason: String },
}

impl Verdict {
    fn outcome(outcome: ExecutionOutcome, detail: String) -> Self {
        let detail = if detail.is_empty() {
            None
        } else {
            Some(detail)
        };
        Verdict::Outcome { outcome, detail }
    }
}

/// Interpret the verdict file contents and exit status of a finished
/// (non-timed-out) execution context.
///
/// Classification rules:
/// - A parseable verdict file decides the outcome; the oracle enumerated
///   its own cases and the driver reported the first failure.
/// - No verdict plus a signal death: the interpreter was killed mid-run
///   (hard crash in candidate code): `RuntimeError`.
/// - No verdict plus a nonzero exit: the interpreter aborted before the
///   driver could report: `RuntimeError`.
/// - No verdict plus a clean exit: the driver was bypassed, a protocol
///   fault charged to the harness, not the candidate.
pub fn interpret(verdict_file: Option<&str>, exit: &ExitStatus) -> Verdict {
    if let Some(raw) = verdict_file {
        return match serde_json::from_str::<RawVerdict>(raw) {
            Ok(verdict) => classify_raw(verdict),
            Err(err) => Verdict::HarnessFault {
                reason: format!("unparseable verdict file: {}", err),
            },
        };
    }

    if let Some(signal) = exit_signal(exit) {
        return Verdict::outcome(
            ExecutionOutcome::RuntimeError,
            format!("execution context terminated by signal {}", signal),
        );
    }

    match exit.code() {
        Some(0) => Verdict::HarnessFault {
            reason: "execution context exited cleanly without reporting a verdict".to_string(),
        },
        code => Verdict::outcome(
            ExecutionOutcome::RuntimeError,
            format!(
                "execution context exited with status {:?} before reporting a verdict",
                code
            ),
        ),
    }
}

/// Map a raw protocol verdict to the outcome taxonomy.
fn classify_raw(raw: RawVerdict) -> Verdict {
    let outcome = match raw.outcome.as_str() {
        "pass" => ExecutionOutcome::Pass,
        "assertion_failure" => ExecutionOutcome::AssertionFailure,
        "runtime_error" => ExecutionOutcome::RuntimeError,
        "load_error" => ExecutionOutcome::LoadError,
        "resource_limit_exceeded" => ExecutionOutcome::ResourceLimitExceeded,
        "harness_fault" => {
            return Verdict::HarnessFault {
                reason: if raw.detail.is_empty() {
                    "unspecified in-sandbox harness fault".to_string()
                } else {
                    raw.detail
                },
            }
        }
        other => {
            return Verdict::HarnessFault {
                reason: format!("unknown verdict outcome: {:?}", other),
            }
        }
    };
    Verdict::outcome(outcome, raw.detail)
}

#[cfg(unix)]
fn exit_signal(exit: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    exit.signal()
}

#[cfg(not(unix))]
fn exit_signal(_exit: &ExitStatus) -> Option<i32> {
    None
}
