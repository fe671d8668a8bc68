//! Evaluation run orchestration: registry + candidates → report.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use codebench_core::{
    AggregateMetric, BenchError, CandidateSet, ExecutionResult, Result, ResultAggregator,
    TaskRegistry, METRICS,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::executor::{ExecutionBackend, SandboxExecutor};
use crate::limits::ExecutionLimits;
use crate::pool::{self, ExecutionJob, HarnessFailureRecord};

/// Configuration surface consumed by the engine (supplied by the CLI or
/// an embedding application).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvalConfig {
    /// Per-execution resource bounds.
    pub limits: ExecutionLimits,

    /// Worker pool size.
    pub worker_count: usize,

    /// k values for pass@k.
    pub k_values: Vec<u64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            limits: ExecutionLimits::default(),
            worker_count: 4,
            k_values: vec![1, 10, 100],
        }
    }
}

/// Result of a complete evaluation run: the artifact handed to the
/// external reporting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Identifier of this run. Re-runs of the same candidates carry
    /// distinct run ids and are never merged.
    pub run_id: Uuid,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// One execution result per successfully executed candidate.
    pub results: Vec<ExecutionResult>,

    /// Rollup metrics per scope, deterministic order.
    pub metrics: Vec<AggregateMetric>,

    /// Candidates the harness failed to run, after one retry each.
    pub harness_failures: Vec<HarnessFailureRecord>,
}

impl RunReport {
    /// Number of executions with outcome `Pass`.
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Number of executions with any non-pass outcome.
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed()).count()
    }
}

/// Evaluation run orchestrator.
///
/// Pairs every candidate with its task, fans the jobs out over the
/// worker pool, and reduces the results into a [`RunReport`].
pub struct BenchRunner {
    backend: Arc<dyn ExecutionBackend>,
    config: EvalConfig,
}

impl BenchRunner {
    /// Create a runner with the production sandbox backend.
    pub fn new(config: EvalConfig) -> Result<Self> {
        let backend = Arc::new(SandboxExecutor::new(config.limits.clone()));
        Self::with_backend(backend, config)
    }

    /// Create a runner with a custom execution backend.
    pub fn with_backend(backend: Arc<dyn ExecutionBackend>, config: EvalConfig) -> Result<Self> {
        config
            .limits
            .validate()
            .map_err(BenchError::InvalidLimits)?;
        if config.worker_count == 0 {
            return Err(BenchError::InvalidLimits(
                "worker count must be positive".to_string(),
            ));
        }
        Ok(Self { backend, config })
    }

    /// Execute every candidate in the set and aggregate the outcomes.
    ///
    /// Fails up front if a candidate references a task the registry does
    /// not hold. Individual execution failures, candidate-caused or
    /// harness-caused, never abort the run.
    pub async fn run(
        &self,
        registry: &TaskRegistry,
        candidates: &CandidateSet,
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        // Registry glue: resolve each candidate's task before spending
        // any sandbox time.
        let mut jobs = Vec::with_capacity(candidates.len());
        for candidate in candidates.iter() {
            let task = registry
                .get(&candidate.task_id)
                .ok_or_else(|| BenchError::UnknownTask {
                    task_id: candidate.task_id.clone(),
                    candidate: candidate.key().to_string(),
                })?;
            jobs.push(ExecutionJob {
                candidate: candidate.clone(),
                task: task.clone(),
            });
        }

        info!(
            event = "run.started",
            run_id = %run_id,
            jobs = jobs.len(),
            workers = self.config.worker_count,
            "Starting evaluation run"
        );

        let output = pool::execute_all(
            Arc::clone(&self.backend),
            jobs,
            self.config.worker_count,
            run_id,
        )
        .await;

        let aggregator = ResultAggregator::from_results(&output.results);
        let metrics = aggregator.metrics(&self.config.k_values);

        let duration_ms = start.elapsed().as_millis() as u64;
        METRICS.flush();
        info!(
            event = "run.finished",
            run_id = %run_id,
            duration_ms,
            executed = output.results.len(),
            harness_failures = output.harness_failures.len(),
            "Evaluation run finished"
        );

        Ok(RunReport {
            run_id,
            started_at,
            duration_ms,
            results: output.results,
            metrics,
            harness_failures: output.harness_failures,
        })
    }
}
