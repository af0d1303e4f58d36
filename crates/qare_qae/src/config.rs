//! Risk and estimation configuration
//!
//! Gantree: L3_QAE → QaeConfig
//!
//! `RiskParameters` describes the loss distribution and the tail of interest;
//! `QaeConfig` describes how the estimate is scheduled (phase register width,
//! shot count, seeding, worker threads, oracle construction).

use qare_core::constants::{qae, sim};
use qare_core::{QareError, QareResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Risk Parameters
// ============================================================================

/// Log-normal loss model and tail threshold
/// Gantree: RiskParameters // 위험 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Qubits in the loss (value) register; the table has 2^n bins
    /// Gantree: loss_qubits: usize // 손실 큐비트 (4)
    pub loss_qubits: usize,

    /// Loss threshold; the tail is `loss > threshold`
    /// Gantree: threshold: f64 // 임계값 (2.5)
    pub threshold: f64,

    /// Mean of the underlying normal (log space)
    pub mean: f64,

    /// Standard deviation of the underlying normal (log space)
    pub std_dev: f64,

    /// Support upper edge in standard deviations: exp(mean + k·std_dev)
    #[serde(default = "default_support_sigmas")]
    pub support_sigmas: f64,
}

fn default_support_sigmas() -> f64 {
    qae::DEFAULT_SUPPORT_SIGMAS
}

impl RiskParameters {
    /// Create risk parameters with the default support width
    /// Gantree: new(n, t, mu, sigma) -> Self // 생성자
    pub fn new(loss_qubits: usize, threshold: f64, mean: f64, std_dev: f64) -> Self {
        Self {
            loss_qubits,
            threshold,
            mean,
            std_dev,
            support_sigmas: qae::DEFAULT_SUPPORT_SIGMAS,
        }
    }

    /// Set loss register width
    pub fn with_loss_qubits(mut self, loss_qubits: usize) -> Self {
        self.loss_qubits = loss_qubits;
        self
    }

    /// Set threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set support width in standard deviations
    pub fn with_support_sigmas(mut self, sigmas: f64) -> Self {
        self.support_sigmas = sigmas;
        self
    }

    /// Upper edge of the discretized support
    pub fn support_upper(&self) -> f64 {
        (self.mean + self.support_sigmas * self.std_dev).exp()
    }

    /// Number of table entries (2^loss_qubits)
    pub fn table_len(&self) -> usize {
        1usize << self.loss_qubits
    }

    /// Validate parameters
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> QareResult<()> {
        if self.loss_qubits == 0 {
            return Err(QareError::config("loss_qubits must be >= 1"));
        }
        if self.loss_qubits > sim::MAX_QUBITS {
            return Err(QareError::RegisterTooLarge {
                num_qubits: self.loss_qubits,
                max: sim::MAX_QUBITS,
            });
        }
        if !self.threshold.is_finite() {
            return Err(QareError::config(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if !self.mean.is_finite() {
            return Err(QareError::config(format!(
                "mean must be finite, got {}",
                self.mean
            )));
        }
        if !(self.std_dev > 0.0 && self.std_dev.is_finite()) {
            return Err(QareError::config(format!(
                "std_dev must be > 0, got {}",
                self.std_dev
            )));
        }
        if !(self.support_sigmas > 0.0 && self.support_sigmas.is_finite()) {
            return Err(QareError::config(format!(
                "support_sigmas must be > 0, got {}",
                self.support_sigmas
            )));
        }
        if !self.support_upper().is_finite() {
            return Err(QareError::config("support upper edge overflows"));
        }
        Ok(())
    }
}

impl Default for RiskParameters {
    fn default() -> Self {
        Self::new(
            qae::DEFAULT_LOSS_QUBITS,
            qae::DEFAULT_THRESHOLD,
            qae::DEFAULT_MEAN,
            qae::DEFAULT_STD_DEV,
        )
    }
}

impl fmt::Display for RiskParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RiskParameters(n={}, threshold={}, mean={}, std={})",
            self.loss_qubits, self.threshold, self.mean, self.std_dev
        )
    }
}

// ============================================================================
// Oracle Strategy
// ============================================================================

/// How the tail oracle is compiled into gates
/// Gantree: OracleStrategy // 오라클 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OracleStrategy {
    /// One X-conjugated multi-controlled Z per marked index
    /// Gantree: Enumerate // 열거
    Enumerate,

    /// `index >= cutoff` comparator kicked back through the marker qubit
    /// Gantree: Comparator // 비교기
    #[default]
    Comparator,
}

impl fmt::Display for OracleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleStrategy::Enumerate => write!(f, "enumerate"),
            OracleStrategy::Comparator => write!(f, "comparator"),
        }
    }
}

// ============================================================================
// Estimation Schedule
// ============================================================================

/// Amplitude-estimation schedule
/// Gantree: QaeConfig // 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaeConfig {
    /// Phase register width m
    /// Gantree: precision_qubits: usize // 정밀도 큐비트 (6)
    pub precision_qubits: usize,

    /// Independent shots R
    /// Gantree: repetitions: usize // 반복 횟수 (120)
    pub repetitions: usize,

    /// Base seed; shot i draws from stream i of this seed
    /// Gantree: seed: Option<u64> // 시드
    pub seed: Option<u64>,

    /// Worker threads for shot execution
    pub workers: usize,

    /// Oracle construction
    pub oracle_strategy: OracleStrategy,
}

impl QaeConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a schedule with the given precision and shot count
    pub fn new(precision_qubits: usize, repetitions: usize) -> Self {
        Self {
            precision_qubits,
            repetitions,
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set phase register width
    /// Gantree: with_precision_qubits(self,m) -> Self // 정밀도 설정
    pub fn with_precision_qubits(mut self, m: usize) -> Self {
        self.precision_qubits = m;
        self
    }

    /// Set shot count
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set worker thread count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set oracle strategy
    pub fn with_oracle_strategy(mut self, strategy: OracleStrategy) -> Self {
        self.oracle_strategy = strategy;
        self
    }

    // ========================================================================
    // Derived Values
    // ========================================================================

    /// Register width for a given loss register
    pub fn logical_qubits(&self, loss_qubits: usize) -> usize {
        qae::logical_qubits(loss_qubits, self.precision_qubits)
    }

    /// Controlled-G applications per shot
    pub fn grover_applications(&self) -> usize {
        qae::grover_applications(self.precision_qubits)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate the schedule on its own
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> QareResult<()> {
        if self.precision_qubits == 0 {
            return Err(QareError::config("precision_qubits must be >= 1"));
        }
        if self.precision_qubits >= sim::MAX_QUBITS {
            return Err(QareError::RegisterTooLarge {
                num_qubits: self.precision_qubits,
                max: sim::MAX_QUBITS,
            });
        }
        if self.repetitions == 0 {
            return Err(QareError::config("repetitions must be >= 1"));
        }
        if self.workers == 0 {
            return Err(QareError::config("workers must be >= 1"));
        }
        Ok(())
    }

    /// Validate the schedule against a loss register and a width limit
    pub fn validate_for(&self, loss_qubits: usize, max_qubits: usize) -> QareResult<()> {
        self.validate()?;
        let total = self.logical_qubits(loss_qubits);
        if total > max_qubits {
            return Err(QareError::RegisterTooLarge {
                num_qubits: total,
                max: max_qubits,
            });
        }
        Ok(())
    }
}

impl Default for QaeConfig {
    fn default() -> Self {
        Self {
            precision_qubits: qae::DEFAULT_PRECISION_QUBITS,
            repetitions: qae::DEFAULT_REPETITIONS,
            seed: None,
            workers: 1,
            oracle_strategy: OracleStrategy::default(),
        }
    }
}

impl fmt::Display for QaeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QaeConfig(m={}, R={}, workers={}, oracle={})",
            self.precision_qubits, self.repetitions, self.workers, self.oracle_strategy
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
