//! Error types for the harness layer.

/// Infrastructure faults: the harness failed to run a candidate.
///
/// Distinct from candidate-caused outcomes, which are recorded as normal
/// [`codebench_core::ExecutionResult`]s. A `HarnessError` is retried at
/// most once per job; a second failure is reported separately and never
/// aggregated.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("failed to create sandbox scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("failed to stage driver script: {0}")]
    Stage(#[source] std::io::Error),

    #[error("failed to spawn execution context ({interpreter}): {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to capture sandbox output streams")]
    StreamCapture,

    #[error("failed waiting on execution context: {0}")]
    Wait(#[source] std::io::Error),

    #[error("sandbox protocol violation: {0}")]
    Protocol(String),
}

/// Result type for harness operations.
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarnessError::Spawn {
            interpreter: "python3".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("python3"));
        assert!(msg.contains("spawn"));

        let err = HarnessError::Protocol("exited without a verdict".to_string());
        assert!(err.to_string().contains("protocol"));
    }
}
