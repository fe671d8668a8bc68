//! Order-independent aggregation of execution results.

use std::collections::BTreeMap;

use crate::domain::ExecutionResult;
use crate::metrics::{pass_at_k, AggregateMetric, MetricScope};

/// Per-scope tallies. Addition-only, so the fold over results is
/// commutative and associative, the hard invariant that makes metrics
/// identical for any arrival order from concurrent workers.
#[derive(Debug, Clone, Copy, Default)]
struct ScopeCounts {
    n_samples: u64,
    n_correct: u64,
}

/// Consumes execution results and computes per-scope rollups.
///
/// Fed by a single collector (results arrive over a channel from the
/// worker pool); workers never touch these counters directly. Harness
/// failures are a separate record stream and never reach the aggregator.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    counts: BTreeMap<MetricScope, ScopeCounts>,
    total_recorded: u64,
}

impl ResultAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an aggregator from an existing result set.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ExecutionResult>) -> Self {
        let mut aggregator = Self::new();
        for result in results {
            aggregator.record(result);
        }
        aggregator
    }

    /// Record one execution result into all three scopes.
    pub fn record(&mut self, result: &ExecutionResult) {
        let scopes = [
            MetricScope::Task {
                task_id: result.candidate.task_id.clone(),
            },
            MetricScope::Model {
                model_id: result.candidate.model_id.clone(),
            },
            MetricScope::TaskModel {
                task_id: result.candidate.task_id.clone(),
                model_id: result.candidate.model_id.clone(),
            },
        ];

        for scope in scopes {
            let counts = self.counts.entry(scope).or_default();
            counts.n_samples += 1;
            if result.passed() {
                counts.n_correct += 1;
            }
        }
        self.total_recorded += 1;
    }

    /// Number of results recorded so far.
    pub fn total_recorded(&self) -> u64 {
        self.total_recorded
    }

    /// Compute metrics for every scope, in deterministic scope order.
    ///
    /// Requested k values above a scope's sample count are omitted for
    /// that scope; k = 0 is ignored.
    pub fn metrics(&self, k_values: &[u64]) -> Vec<AggregateMetric> {
        self.counts
            .iter()
            .map(|(scope, counts)| {
                let mut pass = BTreeMap::new();
                for &k in k_values {
                    if k == 0 || k > counts.n_samples {
                        continue;
                    }
                    pass.insert(k, pass_at_k(counts.n_samples, counts.n_correct, k));
                }
                AggregateMetric {
                    scope: scope.clone(),
                    n_samples: counts.n_samples,
                    n_correct: counts.n_correct,
                    pass_at_k: pass,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CandidateKey, ExecutionOutcome};
    use uuid::Uuid;

    fn result(task: &str, model: &str, index: u32, outcome: ExecutionOutcome) -> ExecutionResult {
        ExecutionResult {
            run_id: Uuid::nil(),
            candidate: CandidateKey {
                task_id: task.to_string(),
                model_id: model.to_string(),
                strategy: "zero_shot".to_string(),
                sample_index: index,
            },
            source_digest: "0".repeat(64),
            outcome,
            duration_ms: 1,
            stdout: String::new(),
            stderr: String::new(),
            failure_detail: None,
        }
    }

    fn sample_results() -> Vec<ExecutionResult> {
        vec![
            result("t1", "m1", 0, ExecutionOutcome::Pass),
            result("t1", "m1", 1, ExecutionOutcome::AssertionFailure),
            result("t1", "m1", 2, ExecutionOutcome::Pass),
            result("t1", "m1", 3, ExecutionOutcome::Timeout),
            result("t1", "m1", 4, ExecutionOutcome::LoadError),
            result("t2", "m1", 0, ExecutionOutcome::Pass),
            result("t2", "m2", 0, ExecutionOutcome::RuntimeError),
        ]
    }

    #[test]
    fn test_scope_counts() {
        let aggregator = ResultAggregator::from_results(&sample_results());
        let metrics = aggregator.metrics(&[1]);

        let t1 = metrics
            .iter()
            .find(|m| {
                m.scope
                    == MetricScope::Task {
                        task_id: "t1".to_string(),
                    }
            })
            .expect("t1 scope");
        assert_eq!(t1.n_samples, 5);
        assert_eq!(t1.n_correct, 2);

        let m1 = metrics
            .iter()
            .find(|m| {
                m.scope
                    == MetricScope::Model {
                        model_id: "m1".to_string(),
                    }
            })
            .expect("m1 scope");
        assert_eq!(m1.n_samples, 6);
        assert_eq!(m1.n_correct, 3);
    }

    #[test]
    fn test_pass_at_1_for_task_scope() {
        let aggregator = ResultAggregator::from_results(&sample_results());
        let metrics = aggregator.metrics(&[1]);
        let t1 = metrics
            .iter()
            .find(|m| {
                m.scope
                    == MetricScope::Task {
                        task_id: "t1".to_string(),
                    }
            })
            .unwrap();
        // n=5, c=2, k=1 -> 0.4
        assert!((t1.pass_at_k[&1] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_order_independence() {
        let results = sample_results();
        let forward = ResultAggregator::from_results(&results).metrics(&[1, 2, 5]);

        let mut reversed: Vec<_> = results.clone();
        reversed.reverse();
        let backward = ResultAggregator::from_results(&reversed).metrics(&[1, 2, 5]);

        let mut rotated: Vec<_> = results;
        rotated.rotate_left(3);
        let middle = ResultAggregator::from_results(&rotated).metrics(&[1, 2, 5]);

        assert_eq!(forward, backward);
        assert_eq!(forward, middle);
    }

    #[test]
    fn test_k_above_sample_count_omitted() {
        let results = vec![
            result("t1", "m1", 0, ExecutionOutcome::Pass),
            result("t1", "m1", 1, ExecutionOutcome::Pass),
        ];
        let metrics = ResultAggregator::from_results(&results).metrics(&[1, 10]);
        let t1 = metrics
            .iter()
            .find(|m| {
                m.scope
                    == MetricScope::Task {
                        task_id: "t1".to_string(),
                    }
            })
            .unwrap();
        assert!(t1.pass_at_k.contains_key(&1));
        assert!(!t1.pass_at_k.contains_key(&10));
    }

    #[test]
    fn test_k_zero_ignored() {
        let results = vec![result("t1", "m1", 0, ExecutionOutcome::Pass)];
        let metrics = ResultAggregator::from_results(&results).metrics(&[0, 1]);
        assert!(metrics.iter().all(|m| !m.pass_at_k.contains_key(&0)));
    }

    #[test]
    fn test_metrics_order_deterministic() {
        let aggregator = ResultAggregator::from_results(&sample_results());
        let a = aggregator.metrics(&[1]);
        let b = aggregator.metrics(&[1]);
        assert_eq!(a, b);
        // Scopes come out sorted: variant order, then key order.
        let scopes: Vec<_> = a.iter().map(|m| m.scope.clone()).collect();
        let mut sorted = scopes.clone();
        sorted.sort();
        assert_eq!(scopes, sorted);
    }

    #[test]
    fn test_total_recorded() {
        let aggregator = ResultAggregator::from_results(&sample_results());
        assert_eq!(aggregator.total_recorded(), 7);
    }
}
