//! pass@k estimation and aggregate metric types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unbiased pass@k estimator: `1 - C(n - c, k) / C(n, k)`.
///
/// Computed in product form, `1 - prod_{i=n-c+1..=n} (1 - k/i)`, which
/// avoids factorial overflow for large n. Defined as 1.0 whenever
/// `n - c < k` (some correct sample is guaranteed in any draw of k).
///
/// Callers are expected to request `k <= n_samples`; the estimator is
/// meaningless beyond that and aggregation skips such k values.
pub fn pass_at_k(n_samples: u64, n_correct: u64, k: u64) -> f64 {
    if n_samples.saturating_sub(n_correct) < k {
        return 1.0;
    }
    let mut acc = 1.0f64;
    for i in (n_samples - n_correct + 1)..=n_samples {
        acc *= 1.0 - k as f64 / i as f64;
    }
    1.0 - acc
}

/// Scope over which results are rolled up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum MetricScope {
    /// All samples for one task, across models.
    Task { task_id: String },

    /// All samples from one model, across tasks.
    Model { model_id: String },

    /// Samples for one (task, model) pair.
    TaskModel { task_id: String, model_id: String },
}

impl std::fmt::Display for MetricScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricScope::Task { task_id } => write!(f, "task:{}", task_id),
            MetricScope::Model { model_id } => write!(f, "model:{}", model_id),
            MetricScope::TaskModel { task_id, model_id } => {
                write!(f, "task:{}/model:{}", task_id, model_id)
            }
        }
    }
}

/// Rollup statistics for one scope. A pure function of the result set:
/// recomputable at any time, independent of arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateMetric {
    /// Scope this metric describes.
    pub scope: MetricScope,

    /// Number of executions recorded for the scope.
    pub n_samples: u64,

    /// Number with outcome `Pass`.
    pub n_correct: u64,

    /// pass@k per requested k (k values above `n_samples` omitted).
    pub pass_at_k: BTreeMap<u64, f64>,
}

impl AggregateMetric {
    /// Fraction of samples that passed.
    pub fn pass_rate(&self) -> f64 {
        if self.n_samples == 0 {
            return 0.0;
        }
        self.n_correct as f64 / self.n_samples as f64
    }
}
