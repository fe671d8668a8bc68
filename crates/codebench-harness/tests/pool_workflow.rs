//! Worker pool and run orchestration exercised with in-memory fake
//! backends; no interpreter required.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codebench_core::{
    CandidateSet, CandidateSolution, ExecutionOutcome, ExecutionResult, MetricScope, Task,
    TaskRegistry,
};
use codebench_harness::{
    execute_all, BenchRunner, EvalConfig, ExecutionBackend, ExecutionJob, HarnessError,
    HarnessResult,
};
use uuid::Uuid;

/// Fake backend scripted through markers in the candidate source:
/// - `"fault-always"`: every attempt is a harness fault
/// - `"fault-once"`: first attempt faults, retry succeeds
/// - `"wrong"`: candidate outcome `AssertionFailure`
/// - anything else: `Pass`
#[derive(Default)]
struct ScriptedBackend {
    attempts: Mutex<HashMap<String, u32>>,
}

impl ScriptedBackend {
    fn attempts_for(&self, candidate: &CandidateSolution) -> u32 {
        let attempts = self.attempts.lock().unwrap();
        attempts
            .get(&candidate.key().to_string())
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ExecutionBackend for ScriptedBackend {
    async fn execute(
        &self,
        candidate: &CandidateSolution,
        _task: &Task,
    ) -> HarnessResult<ExecutionResult> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(candidate.key().to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if candidate.source_text.contains("fault-always")
            || (candidate.source_text.contains("fault-once") && attempt == 1)
        {
            return Err(HarnessError::Protocol("scripted fault".to_string()));
        }

        let outcome = if candidate.source_text.contains("wrong") {
            ExecutionOutcome::AssertionFailure
        } else {
            ExecutionOutcome::Pass
        };

        Ok(ExecutionResult {
            run_id: Uuid::nil(),
            candidate: candidate.key(),
            source_digest: candidate.source_digest(),
            outcome,
            duration_ms: 1,
            stdout: String::new(),
            stderr: String::new(),
            failure_detail: None,
        })
    }
}

fn task(id: &str) -> Task {
    Task::new(
        id,
        "def f(x):\n    \"\"\"Spec.\"\"\"\n",
        "def check(candidate):\n    assert candidate(1) == 1\n",
        "f",
    )
}

fn candidate(task_id: &str, index: u32, source: &str) -> CandidateSolution {
    CandidateSolution::new(task_id, "fake-model", "zero_shot", index, source)
}

fn config(workers: usize) -> EvalConfig {
    EvalConfig {
        worker_count: workers,
        k_values: vec![1, 2],
        ..Default::default()
    }
}

#[tokio::test]
async fn one_result_per_job_under_parallelism() {
    let backend = Arc::new(ScriptedBackend::default());
    let registry = TaskRegistry::from_tasks(vec![task("t/0"), task("t/1")]).unwrap();

    let mut batch = Vec::new();
    for index in 0..8 {
        batch.push(candidate("t/0", index, "ok"));
        batch.push(candidate("t/1", index, if index % 2 == 0 { "ok" } else { "wrong" }));
    }
    let candidates = CandidateSet::from_candidates(batch).unwrap();

    let runner = BenchRunner::with_backend(backend, config(6)).unwrap();
    let report = runner.run(&registry, &candidates).await.unwrap();

    assert_eq!(report.results.len(), 16);
    assert!(report.harness_failures.is_empty());
    assert_eq!(report.passed_count(), 12);
    assert_eq!(report.failed_count(), 4);

    // Every candidate key shows up exactly once.
    let mut keys: Vec<String> = report
        .results
        .iter()
        .map(|r| r.candidate.to_string())
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 16);
}

#[tokio::test]
async fn transient_harness_fault_is_retried_once_and_succeeds() {
    let backend = Arc::new(ScriptedBackend::default());
    let registry = TaskRegistry::from_tasks(vec![task("t/0")]).unwrap();
    let flaky = candidate("t/0", 0, "fault-once");
    let candidates = CandidateSet::from_candidates(vec![flaky.clone()]).unwrap();

    let runner = BenchRunner::with_backend(Arc::clone(&backend) as Arc<dyn ExecutionBackend>, config(2)).unwrap();
    let report = runner.run(&registry, &candidates).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.harness_failures.is_empty());
    assert_eq!(report.results[0].outcome, ExecutionOutcome::Pass);
    assert_eq!(backend.attempts_for(&flaky), 2);
}

#[tokio::test]
async fn persistent_harness_fault_is_recorded_and_run_completes() {
    let backend = Arc::new(ScriptedBackend::default());
    let registry = TaskRegistry::from_tasks(vec![task("t/0")]).unwrap();
    let broken = candidate("t/0", 0, "fault-always");
    let candidates = CandidateSet::from_candidates(vec![
        broken.clone(),
        candidate("t/0", 1, "ok"),
        candidate("t/0", 2, "wrong"),
    ])
    .unwrap();

    let runner = BenchRunner::with_backend(Arc::clone(&backend) as Arc<dyn ExecutionBackend>, config(2)).unwrap();
    let report = runner.run(&registry, &candidates).await.unwrap();

    // The run completed for the remaining jobs.
    assert_eq!(report.results.len(), 2);
    assert_eq!(report.harness_failures.len(), 1);
    assert_eq!(report.harness_failures[0].candidate, broken.key());
    assert_eq!(report.harness_failures[0].attempts, 2);
    assert_eq!(backend.attempts_for(&broken), 2);

    // Harness failures never reach the aggregates.
    let t0 = report
        .metrics
        .iter()
        .find(|m| {
            m.scope
                == MetricScope::Task {
                    task_id: "t/0".to_string(),
                }
        })
        .unwrap();
    assert_eq!(t0.n_samples, 2);
    assert_eq!(t0.n_correct, 1);
}

#[tokio::test]
async fn metrics_identical_for_any_worker_count() {
    let registry = TaskRegistry::from_tasks(vec![task("t/0")]).unwrap();
    let mut batch = Vec::new();
    for index in 0..10 {
        batch.push(candidate("t/0", index, if index < 3 { "ok" } else { "wrong" }));
    }
    let candidates = CandidateSet::from_candidates(batch).unwrap();

    let mut all_metrics = Vec::new();
    for workers in [1, 2, 8] {
        let backend = Arc::new(ScriptedBackend::default());
        let runner = BenchRunner::with_backend(backend, config(workers)).unwrap();
        let report = runner.run(&registry, &candidates).await.unwrap();
        all_metrics.push(report.metrics);
    }

    assert_eq!(all_metrics[0], all_metrics[1]);
    assert_eq!(all_metrics[0], all_metrics[2]);
}

#[tokio::test]
async fn results_are_stamped_with_the_run_id() {
    let backend = Arc::new(ScriptedBackend::default());
    let jobs = vec![
        ExecutionJob {
            candidate: candidate("t/0", 0, "ok"),
            task: task("t/0"),
        },
        ExecutionJob {
            candidate: candidate("t/0", 1, "ok"),
            task: task("t/0"),
        },
    ];
    let run_id = Uuid::new_v4();
    let output = execute_all(backend, jobs, 2, run_id).await;

    assert_eq!(output.results.len(), 2);
    assert!(output.results.iter().all(|r| r.run_id == run_id));
}

#[tokio::test]
async fn empty_job_list_is_a_noop() {
    let backend = Arc::new(ScriptedBackend::default());
    let output = execute_all(backend, Vec::new(), 4, Uuid::new_v4()).await;
    assert!(output.results.is_empty());
    assert!(output.harness_failures.is_empty());
}

#[tokio::test]
async fn unknown_task_fails_the_run_before_execution() {
    let backend = Arc::new(ScriptedBackend::default());
    let registry = TaskRegistry::from_tasks(vec![task("t/0")]).unwrap();
    let candidates =
        CandidateSet::from_candidates(vec![candidate("t/missing", 0, "ok")]).unwrap();

    let runner = BenchRunner::with_backend(Arc::clone(&backend) as Arc<dyn ExecutionBackend>, config(2)).unwrap();
    let err = runner.run(&registry, &candidates).await.unwrap_err();
    assert!(matches!(
        err,
        codebench_core::BenchError::UnknownTask { .. }
    ));
    // Nothing was executed.
    assert_eq!(backend.attempts_for(&candidate("t/missing", 0, "ok")), 0);
}
