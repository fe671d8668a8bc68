//! Codebench Core Library
//!
//! Domain model and scoring logic for the codebench evaluation engine:
//! - Benchmark tasks and their verification oracles
//! - Candidate solutions produced by an external generation pipeline
//! - Execution results with a tagged outcome taxonomy
//! - Order-independent result aggregation and unbiased pass@k

pub mod aggregate;
pub mod candidates;
pub mod domain;
pub mod metrics;
pub mod obs;
pub mod registry;
pub mod telemetry;

pub use aggregate::ResultAggregator;
pub use candidates::CandidateSet;
pub use domain::{
    BenchError, CandidateKey, CandidateSolution, ExecutionOutcome, ExecutionResult, Result, Task,
};
pub use metrics::{pass_at_k, AggregateMetric, MetricScope};
pub use obs::{Metrics, METRICS};
pub use registry::TaskRegistry;
pub use telemetry::init_tracing;
