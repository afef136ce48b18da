//! Error types and result aliases for the AlgoLens library.
//!
//! This module defines the core error type [`AlgoLensError`] and the [`Result`] type alias
//! used throughout the library. All public APIs that can fail return `Result<T>` for
//! consistent error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlgoLensError {
    /// Malformed or out-of-policy input. Raised before any step is emitted,
    /// so a failed validation never leaves a partial trace behind.
    #[error("Input validation failed: {0}")]
    Validation(String),

    /// The step-count ceiling was breached mid-execution. Fatal: the
    /// execution is aborted and no partial envelope is returned.
    #[error("Exceeded maximum of {max} steps")]
    ResourceExceeded { max: usize },

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlgoLensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = AlgoLensError::Validation("array must be sorted".to_string());
        assert_eq!(err.to_string(), "Input validation failed: array must be sorted");
    }

    #[test]
    fn test_resource_exceeded_display() {
        let err = AlgoLensError::ResourceExceeded { max: 10000 };
        assert_eq!(err.to_string(), "Exceeded maximum of 10000 steps");
    }

    #[test]
    fn test_unknown_algorithm_display() {
        let err = AlgoLensError::UnknownAlgorithm("quick-sort".to_string());
        assert_eq!(err.to_string(), "Unknown algorithm: quick-sort");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AlgoLensError = json_err.into();

        match err {
            AlgoLensError::Serialization(_) => {}
            _ => panic!("Expected Serialization"),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = AlgoLensError::Validation("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Validation"));
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(AlgoLensError::UnknownAlgorithm("test".to_string()));
        assert!(err_result.is_err());
    }
}
