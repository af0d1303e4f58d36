//! Integrated configuration for QARE
//!
//! Gantree: L4_Integration → QareConfig
//!
//! One flat, JSON-persistable record covering the loss model, the
//! estimation schedule and the classical comparison.

use qare_core::constants::{qae, sim, stats};
use qare_core::{QareError, QareResult};
use qare_qae::{OracleStrategy, QaeConfig, RiskParameters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Unified QARE configuration
/// Gantree: QareConfig // 통합 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QareConfig {
    // ========================================================================
    // Loss Model
    // ========================================================================
    /// Value register width n
    pub loss_qubits: usize,

    /// Loss threshold
    pub threshold: f64,

    /// Log-space mean
    pub mean: f64,

    /// Log-space standard deviation
    pub std_dev: f64,

    /// Discretized support width in standard deviations
    pub support_sigmas: f64,

    // ========================================================================
    // Estimation Schedule
    // ========================================================================
    /// Phase register width m
    pub precision_qubits: usize,

    /// Shots per estimate
    pub repetitions: usize,

    /// Shot worker threads
    pub workers: usize,

    /// Oracle construction
    pub oracle_strategy: OracleStrategy,

    /// Independent repeats of the quantum estimate
    pub ensemble_runs: usize,

    /// Also run the mark-everything sanity circuit
    pub run_sanity_check: bool,

    // ========================================================================
    // Classical Comparison
    // ========================================================================
    /// Monte-Carlo samples for the baseline
    pub monte_carlo_samples: usize,

    /// Target errors ε for the samples-versus-queries sweep
    pub precision_targets: Vec<f64>,

    /// Run Monte-Carlo at each sweep size
    pub sweep_monte_carlo: bool,

    // ========================================================================
    // Execution
    // ========================================================================
    /// Master seed
    pub seed: Option<u64>,
}

impl QareConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Defaults of the tail-risk study: n=4, t=2.5, μ=0, σ=1, m=6, R=120
    pub fn default_tail() -> Self {
        Self {
            loss_qubits: qae::DEFAULT_LOSS_QUBITS,
            threshold: qae::DEFAULT_THRESHOLD,
            mean: qae::DEFAULT_MEAN,
            std_dev: qae::DEFAULT_STD_DEV,
            support_sigmas: qae::DEFAULT_SUPPORT_SIGMAS,
            precision_qubits: qae::DEFAULT_PRECISION_QUBITS,
            repetitions: qae::DEFAULT_REPETITIONS,
            workers: 1,
            oracle_strategy: OracleStrategy::default(),
            ensemble_runs: 1,
            run_sanity_check: true,
            monte_carlo_samples: stats::DEFAULT_MC_SAMPLES,
            precision_targets: stats::DEFAULT_PRECISION_TARGETS.to_vec(),
            sweep_monte_carlo: false,
            seed: None,
        }
    }

    /// Small, fast configuration
    pub fn quick() -> Self {
        Self {
            loss_qubits: 3,
            precision_qubits: 4,
            repetitions: 30,
            monte_carlo_samples: 10_000,
            precision_targets: vec![0.1, 0.05, 0.01],
            ..Self::default_tail()
        }
    }

    /// Reproducible benchmark configuration
    pub fn benchmark() -> Self {
        Self {
            seed: Some(42),
            ensemble_runs: 8,
            sweep_monte_carlo: true,
            ..Self::default_tail()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set loss register width
    pub fn with_loss_qubits(mut self, n: usize) -> Self {
        self.loss_qubits = n;
        self
    }

    /// Set loss threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set log-normal parameters
    pub fn with_distribution(mut self, mean: f64, std_dev: f64) -> Self {
        self.mean = mean;
        self.std_dev = std_dev;
        self
    }

    /// Set phase register width
    pub fn with_precision_qubits(mut self, m: usize) -> Self {
        self.precision_qubits = m;
        self
    }

    /// Set shots
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set worker threads
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set oracle strategy
    pub fn with_oracle_strategy(mut self, strategy: OracleStrategy) -> Self {
        self.oracle_strategy = strategy;
        self
    }

    /// Set ensemble size
    pub fn with_ensemble_runs(mut self, runs: usize) -> Self {
        self.ensemble_runs = runs;
        self
    }

    /// Enable or disable the sanity circuit
    pub fn with_sanity_check(mut self, enabled: bool) -> Self {
        self.run_sanity_check = enabled;
        self
    }

    /// Set Monte-Carlo sample count
    pub fn with_monte_carlo_samples(mut self, samples: usize) -> Self {
        self.monte_carlo_samples = samples;
        self
    }

    /// Set sweep targets
    pub fn with_precision_targets(mut self, targets: Vec<f64>) -> Self {
        self.precision_targets = targets;
        self
    }

    /// Set seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    // ========================================================================
    // Conversions
    // ========================================================================

    /// Loss model
    pub fn to_risk_parameters(&self) -> RiskParameters {
        RiskParameters::new(self.loss_qubits, self.threshold, self.mean, self.std_dev)
            .with_support_sigmas(self.support_sigmas)
    }

    /// Estimation schedule
    pub fn to_qae_config(&self) -> QaeConfig {
        let config = QaeConfig::new(self.precision_qubits, self.repetitions)
            .with_workers(self.workers)
            .with_oracle_strategy(self.oracle_strategy);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    /// Gantree: validate(&self) -> Result // 검증
    pub fn validate(&self) -> QareResult<()> {
        self.to_risk_parameters().validate()?;
        self.to_qae_config()
            .validate_for(self.loss_qubits, sim::MAX_QUBITS)?;

        if self.monte_carlo_samples == 0 {
            return Err(QareError::config("monte_carlo_samples must be >= 1"));
        }
        if self.ensemble_runs == 0 {
            return Err(QareError::config("ensemble_runs must be >= 1"));
        }
        if let Some(&bad) = self
            .precision_targets
            .iter()
            .find(|&&t| !(t > 0.0 && t < 1.0))
        {
            return Err(QareError::InvalidProbability(bad));
        }
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> QareResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> QareResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a JSON file
    /// Gantree: from_json_file(path) -> Result<Self> // 파일 로드
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> QareResult<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            QareError::FileError(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let config = Self::from_json(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write to a JSON file
    /// Gantree: to_json_file(path) -> Result // 파일 저장
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> QareResult<()> {
        fs::write(path.as_ref(), self.to_json()?).map_err(|e| {
            QareError::FileError(format!("{}: {}", path.as_ref().display(), e))
        })
    }
}

impl Default for QareConfig {
    fn default() -> Self {
        Self::default_tail()
    }
}

impl fmt::Display for QareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QareConfig(n={}, t={}, μ={}, σ={}, m={}, R={}, oracle={})",
            self.loss_qubits,
            self.threshold,
            self.mean,
            self.std_dev,
            self.precision_qubits,
            self.repetitions,
            self.oracle_strategy
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
