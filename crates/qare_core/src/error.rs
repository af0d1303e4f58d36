//! Error types for QARE
//!
//! Gantree: L0_Foundation → Errors
//!
//! Three failure families: configuration (bad inputs, abort before any
//! allocation), dimension (qubit or table shape mismatch, abort before any
//! allocation) and numeric domain (recovered locally by clamping; only
//! non-finite values surface as errors).

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QARE
/// Gantree: QareError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QareError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration value
    /// Gantree: InvalidConfiguration(String) // 설정 오류
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// Probability table carries no mass
    /// Gantree: ZeroMassDistribution // 질량 0
    #[error("Configuration error: distribution has zero total mass")]
    ZeroMassDistribution,

    /// Probability value out of range [0, 1]
    #[error("Invalid probability {0}: must be in range [0, 1]")]
    InvalidProbability(f64),

    // ========================================================================
    // Dimension Errors
    // ========================================================================
    /// Qubit index out of range
    /// Gantree: QubitOutOfRange{{qubit,num_qubits}} // 큐비트 범위
    #[error("Dimension error: qubit {qubit} out of range for {num_qubits}-qubit register")]
    QubitOutOfRange { qubit: usize, num_qubits: usize },

    /// Same qubit addressed twice by one gate
    #[error("Dimension error: qubit {0} appears more than once in a gate")]
    DuplicateQubit(usize),

    /// Probability table length does not match the declared qubit count
    /// Gantree: TableLengthMismatch{{len,expected}} // 테이블 길이
    #[error("Dimension error: probability table has {len} entries, expected {expected}")]
    TableLengthMismatch { len: usize, expected: usize },

    /// Register exceeds what the simulator will allocate
    #[error("Dimension error: {num_qubits} qubits requested, simulator limit is {max}")]
    RegisterTooLarge { num_qubits: usize, max: usize },

    // ========================================================================
    // Numeric Errors
    // ========================================================================
    /// Non-finite value reached an arcsine/arctangent argument
    /// Gantree: NumericDomain{{value,context}} // 수치 영역
    #[error("Numeric domain error in {context}: {value} is not finite")]
    NumericDomain { value: f64, context: String },

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Measurement or reset used where a unitary is required
    #[error("Operation '{0}' is not unitary and cannot be inverted or controlled")]
    NonUnitary(String),

    /// Control qubit coincides with a target qubit
    #[error("Control qubit {0} is also a target of the controlled gate")]
    ControlOverlap(usize),

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Shot execution failed outside the circuit itself
    #[error("Execution error: {0}")]
    ExecutionFailed(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
}

/// Result type alias for QARE operations
/// Gantree: QareResult<T> // type alias
pub type QareResult<T> = Result<T, QareError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QareError {
    fn from(err: serde_json::Error) -> Self {
        QareError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QareError {
    fn from(err: std::io::Error) -> Self {
        QareError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QareError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        QareError::InvalidConfiguration(msg.into())
    }

    /// Check if error is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QareError::InvalidConfiguration(_)
                | QareError::ZeroMassDistribution
                | QareError::InvalidProbability(_)
        )
    }

    /// Check if error is a dimension error
    pub fn is_dimension_error(&self) -> bool {
        matches!(
            self,
            QareError::QubitOutOfRange { .. }
                | QareError::DuplicateQubit(_)
                | QareError::TableLengthMismatch { .. }
                | QareError::RegisterTooLarge { .. }
        )
    }

    /// Check if error is a numeric domain error
    pub fn is_numeric_error(&self) -> bool {
        matches!(self, QareError::NumericDomain { .. })
    }

    /// Check if error is a circuit construction error
    pub fn is_circuit_error(&self) -> bool {
        matches!(self, QareError::NonUnitary(_) | QareError::ControlOverlap(_))
    }
}

// ============================================================================
// Tests
// ============================================================================
