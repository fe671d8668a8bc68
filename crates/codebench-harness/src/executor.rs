//! Sandboxed executor: one candidate, one disposable context, one result.

use std::time::Instant;

use async_trait::async_trait;
use codebench_core::{CandidateSolution, ExecutionOutcome, ExecutionResult, Task, METRICS};
use tokio::io::AsyncReadExt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{HarnessError, HarnessResult};
use crate::limits::ExecutionLimits;
use crate::sandbox::{render_driver, sandbox_command, DRIVER_FILE_NAME, VERDICT_FILE_NAME};
use crate::verifier::{self, Verdict};

/// Seam between the worker pool and the execution machinery.
///
/// The production implementation is [`SandboxExecutor`]; tests substitute
/// in-memory fakes to exercise pool and aggregation behavior without an
/// interpreter on PATH.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Execute one `(candidate, task)` pair to completion or bounded
    /// failure. Returns a classified result for candidate-caused
    /// outcomes; `Err` is reserved for infrastructure faults.
    async fn execute(
        &self,
        candidate: &CandidateSolution,
        task: &Task,
    ) -> HarnessResult<ExecutionResult>;
}

/// Executes candidates in isolated, resource-bounded subprocesses.
///
/// Guarantees per call:
/// - a crash or hang in candidate code never reaches the harness process;
/// - global state mutated by one candidate is invisible to the next
///   (fresh interpreter, fresh scratch directory);
/// - the call returns within `time_limit + teardown_grace`;
/// - candidate stdout/stderr are captured (capped), never forwarded.
#[derive(Debug, Clone)]
pub struct SandboxExecutor {
    interpreter: String,
    limits: ExecutionLimits,
}

impl SandboxExecutor {
    /// Create an executor using `python3` from PATH.
    pub fn new(limits: ExecutionLimits) -> Self {
        Self {
            interpreter: "python3".to_string(),
            limits,
        }
    }

    /// Use a specific interpreter binary.
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Configured limits.
    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Whether the configured interpreter can be invoked at all.
    pub fn interpreter_available(&self) -> bool {
        std::process::Command::new(&self.interpreter)
            .arg("--version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ExecutionBackend for SandboxExecutor {
    async fn execute(
        &self,
        candidate: &CandidateSolution,
        task: &Task,
    ) -> HarnessResult<ExecutionResult> {
        let started = Instant::now();

        // Fresh disposable context: scratch dir + staged driver script.
        let scratch = tempfile::tempdir().map_err(HarnessError::Scratch)?;
        let driver = render_driver(
            &candidate.source_text,
            &task.oracle_code,
            &task.entry_point,
            self.limits.memory_limit_bytes,
        );
        tokio::fs::write(scratch.path().join(DRIVER_FILE_NAME), driver)
            .await
            .map_err(HarnessError::Stage)?;

        let mut child = sandbox_command(&self.interpreter, scratch.path())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(HarnessError::StreamCapture)?;
        let stderr = child.stderr.take().ok_or(HarnessError::StreamCapture)?;
        let cap = self.limits.max_output_bytes;
        let stdout_task = tokio::spawn(read_capped(stdout, cap));
        let stderr_task = tokio::spawn(read_capped(stderr, cap));

        // Watchdog: the context, not the harness, absorbs the hang.
        let wait = tokio::time::timeout(self.limits.time_limit(), child.wait()).await;
        let (outcome, detail) = match wait {
            Ok(Ok(status)) => {
                let verdict_raw =
                    tokio::fs::read_to_string(scratch.path().join(VERDICT_FILE_NAME))
                        .await
                        .ok();
                match verifier::interpret(verdict_raw.as_deref(), &status) {
                    Verdict::Outcome { outcome, detail } => (outcome, detail),
                    Verdict::HarnessFault { reason } => {
                        return Err(HarnessError::Protocol(reason));
                    }
                }
            }
            Ok(Err(err)) => return Err(HarnessError::Wait(err)),
            Err(_elapsed) => {
                // Force-terminate, then wait out the bounded grace period
                // so the context is reclaimed, not abandoned.
                let _ = child.start_kill();
                let _ = tokio::time::timeout(self.limits.teardown_grace(), child.wait()).await;
                METRICS.inc_timeouts_enforced();
                (
                    ExecutionOutcome::Timeout,
                    Some(format!(
                        "killed after exceeding the {}ms wall-clock budget",
                        self.limits.time_limit_ms
                    )),
                )
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;

        // The pipes close when the context dies; bounding the drains
        // keeps a leaked descriptor from stalling the call past the
        // grace period.
        let grace = self.limits.teardown_grace();
        let stdout = match tokio::time::timeout(grace, stdout_task).await {
            Ok(Ok(bytes)) => bytes,
            _ => Vec::new(),
        };
        let stderr = match tokio::time::timeout(grace, stderr_task).await {
            Ok(Ok(bytes)) => bytes,
            _ => Vec::new(),
        };

        debug!(
            candidate = %candidate.key(),
            outcome = %outcome,
            duration_ms,
            "Sandboxed execution finished"
        );

        Ok(ExecutionResult {
            // Stamped with the actual run id by the pool collector.
            run_id: Uuid::nil(),
            candidate: candidate.key(),
            source_digest: candidate.source_digest(),
            outcome,
            duration_ms,
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            failure_detail: detail,
        })
    }
}

/// Drain a child stream to completion, keeping at most `cap` bytes.
///
/// Draining past the cap keeps the pipe from filling up and wedging the
/// child; kept output gets a truncation marker.
async fn read_capped<R>(mut reader: R, cap: usize) -> Vec<u8>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; 8 * 1024];
    let mut kept = Vec::new();
    let mut truncated = false;
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if kept.len() < cap {
                    let take = n.min(cap - kept.len());
                    kept.extend_from_slice(&chunk[..take]);
                    if take < n {
                        truncated = true;
                    }
                } else {
                    truncated = true;
                }
            }
        }
    }
    if truncated {
        kept.extend_from_slice(format!("\n... [output truncated at {} bytes]", cap).as_bytes());
    }
    kept
}
