//! Resource limits for a single sandboxed execution.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-execution resource bounds enforced by the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Wall-clock budget for a single execution (milliseconds). Enforced
    /// from outside the execution context by the watchdog.
    pub time_limit_ms: u64,

    /// Address-space ceiling (bytes) installed inside the context via
    /// rlimits before any candidate code runs. 0 disables the ceiling.
    pub memory_limit_bytes: u64,

    /// Cap on captured stdout/stderr, each (bytes). Excess is discarded
    /// with a truncation marker.
    pub max_output_bytes: usize,

    /// Teardown grace period after a force-kill (milliseconds). Bounds
    /// the executor's total latency at `time_limit + grace`.
    pub teardown_grace_ms: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            time_limit_ms: 5_000,
            memory_limit_bytes: 256 * 1024 * 1024,
            max_output_bytes: 64 * 1024,
            teardown_grace_ms: 2_000,
        }
    }
}

impl ExecutionLimits {
    /// Validate the limit combination. Returns the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.time_limit_ms == 0 {
            return Err("time limit must be positive".to_string());
        }
        if self.max_output_bytes == 0 {
            return Err("output cap must be positive".to_string());
        }
        Ok(())
    }

    /// Wall-clock budget as a `Duration`.
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// Teardown grace as a `Duration`.
    pub fn teardown_grace(&self) -> Duration {
        Duration::from_millis(self.teardown_grace_ms)
    }
}
