//! Codebench Harness - sandboxed execution engine
//!
//! Runs untrusted candidate solutions against their verification oracles
//! under strict isolation and resource bounds:
//! - One disposable subprocess per job (crash/hang/state containment)
//! - External watchdog enforcing the wall-clock budget
//! - Verdict protocol distinguishing candidate faults from harness faults
//! - Bounded worker pool feeding a single result collector

pub mod error;
pub mod executor;
pub mod limits;
pub mod pool;
pub mod runner;
pub mod sandbox;
pub mod verifier;

// Re-export key types
pub use error::{HarnessError, HarnessResult};
pub use executor::{ExecutionBackend, SandboxExecutor};
pub use limits::ExecutionLimits;
pub use pool::{execute_all, ExecutionJob, HarnessFailureRecord, PoolOutput};
pub use runner::{BenchRunner, EvalConfig, RunReport};
pub use verifier::{RawVerdict, Verdict};
