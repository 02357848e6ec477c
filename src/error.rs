use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

// Main analysis error type

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to load image: {0}")]
    LoadError(String),
    #[error("{operation} timed out after {budget_ms}ms")]
    Timeout { operation: String, budget_ms: u64 },
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),
    #[error("Insufficient samples: found {found}, need {required}")]
    InsufficientSamples { found: usize, required: usize },
    #[error("No face detected")]
    NoFaceDetected,
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),
}

impl AnalysisError {
    pub fn timeout(operation: impl Into<String>, budget: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            budget_ms: budget.as_millis() as u64,
        }
    }

    /// Only image acquisition failures reach the caller; everything else
    /// degrades to a weaker strategy.
    pub fn is_hard_failure(&self) -> bool {
        matches!(
            self,
            AnalysisError::LoadError(_) | AnalysisError::Timeout { .. }
        )
    }

    /// Maps the boxed error produced by a timeout-wrapped tower service back
    /// onto the taxonomy.
    pub fn from_boxed(
        error: tower::BoxError,
        operation: &str,
        budget: std::time::Duration,
    ) -> Self {
        if error.is::<tower::timeout::error::Elapsed>() {
            return Self::timeout(operation, budget);
        }
        match error.downcast::<AnalysisError>() {
            Ok(inner) => *inner,
            Err(other) => Self::CapabilityUnavailable(format!("{}: {}", operation, other)),
        }
    }
}
