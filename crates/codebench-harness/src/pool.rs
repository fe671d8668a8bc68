//! Bounded worker pool feeding a single result collector.
//!
//! Workers pull `(candidate, task)` jobs from a shared queue and run each
//! inside its own isolated context, the unit of both concurrency and
//! fault isolation. Results flow over an mpsc channel to one collector;
//! no two workers ever touch the same tally.

use std::sync::Arc;

use codebench_core::{CandidateKey, CandidateSolution, ExecutionResult, Task, METRICS};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::executor::ExecutionBackend;

/// One unit of work: a candidate paired with its task.
#[derive(Debug, Clone)]
pub struct ExecutionJob {
    /// Candidate to execute.
    pub candidate: CandidateSolution,

    /// Task supplying the oracle and entry-point name.
    pub task: Task,
}

/// Record of a job the harness could not run, after one retry.
///
/// Reported separately from execution results and never aggregated: the
/// final report must distinguish "candidate did not solve the task" from
/// "the harness failed to run the candidate".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarnessFailureRecord {
    /// Candidate the harness failed on.
    pub candidate: CandidateKey,

    /// Execution attempts made (always 2: initial + one retry).
    pub attempts: u32,

    /// Final infrastructure error.
    pub error: String,
}

/// Everything a pool run produced.
#[derive(Debug, Default)]
pub struct PoolOutput {
    /// One result per successfully executed candidate, arrival order.
    pub results: Vec<ExecutionResult>,

    /// Jobs the harness failed to run even after a retry.
    pub harness_failures: Vec<HarnessFailureRecord>,
}

enum JobMessage {
    Completed(ExecutionResult),
    Failed(HarnessFailureRecord),
}

/// Execute all jobs on a pool of `worker_count` workers.
///
/// Candidate-caused outcomes are never retried (single deterministic
/// attempt per job); infrastructure faults are retried exactly once,
/// then recorded. Result arrival order is unconstrained; aggregation
/// downstream is order-independent.
pub async fn execute_all(
    backend: Arc<dyn ExecutionBackend>,
    jobs: Vec<ExecutionJob>,
    worker_count: usize,
    run_id: Uuid,
) -> PoolOutput {
    let total = jobs.len();
    if total == 0 {
        return PoolOutput::default();
    }

    // Channel sized to the whole batch so seeding never blocks.
    let (job_tx, job_rx) = mpsc::channel(total);
    for job in jobs {
        // Receiver outlives this loop; a send can only fail if the
        // runtime is tearing down, in which case there is nothing to do.
        if job_tx.send(job).await.is_err() {
            break;
        }
    }
    drop(job_tx);
    let job_rx = Arc::new(Mutex::new(job_rx));

    let (result_tx, mut result_rx) = mpsc::channel(total);
    let workers = worker_count.clamp(1, total);

    let mut handles = Vec::with_capacity(workers);
    for worker_index in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let backend = Arc::clone(&backend);

        handles.push(tokio::spawn(async move {
            loop {
                let job = { job_rx.lock().await.recv().await };
                let Some(job) = job else { break };

                debug!(worker = worker_index, candidate = %job.candidate.key(), "Worker picked job");
                let message = run_job(backend.as_ref(), &job, run_id).await;
                if result_tx.send(message).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    // Single collector: the only writer of the shared tallies.
    let mut output = PoolOutput::default();
    while let Some(message) = result_rx.recv().await {
        match message {
            JobMessage::Completed(result) => {
                METRICS.inc_executions_completed();
                output.results.push(result);
            }
            JobMessage::Failed(record) => {
                warn!(
                    candidate = %record.candidate,
                    error = %record.error,
                    "Harness failed to run candidate"
                );
                output.harness_failures.push(record);
            }
        }
    }

    futures::future::join_all(handles).await;
    output
}

/// Run one job, retrying a harness fault exactly once.
async fn run_job(
    backend: &dyn ExecutionBackend,
    job: &ExecutionJob,
    run_id: Uuid,
) -> JobMessage {
    match backend.execute(&job.candidate, &job.task).await {
        Ok(mut result) => {
            result.run_id = run_id;
            JobMessage::Completed(result)
        }
        Err(first) => {
            warn!(
                candidate = %job.candidate.key(),
                error = %first,
                "Harness fault; retrying job once"
            );
            METRICS.inc_harness_retries();
            match backend.execute(&job.candidate, &job.task).await {
                Ok(mut result) => {
                    result.run_id = run_id;
                    JobMessage::Completed(result)
                }
                Err(second) => JobMessage::Failed(HarnessFailureRecord {
                    candidate: job.candidate.key(),
                    attempts: 2,
                    error: second.to_string(),
                }),
            }
        }
    }
}
