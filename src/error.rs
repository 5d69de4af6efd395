//! Error types for segment analysis

use thiserror::Error;

/// Main error type for analysis operations.
///
/// Contract violations (querying erected intervals, unregistered load
/// categories, malformed POI lists) panic rather than returning an error;
/// only genuinely fallible operations appear here.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Load group '{0}' already exists")]
    DuplicateLoadGroup(String),

    #[error("Singular stiffness matrix - model may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("Model is unstable: {0}")]
    Unstable(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;
