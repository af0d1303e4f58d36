//! # QARE QAE
//!
//! Canonical quantum amplitude estimation of a tail-risk probability.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qare_qae // L3: Amplitude Estimation (완료)
//!     RiskParameters // 손실 분포 파라미터 (완료)
//!     QaeConfig // 정밀도/반복/시드 설정 (완료)
//!     ProbabilityTable // 로그정규 이산화 (완료)
//!     DistributionEncoder // 상태 준비 A (완료)
//!     TailOracle // 꼬리 오라클 (완료)
//!     GroverOperator // 그로버 연산자 G (완료)
//!     PhaseEstimator // 위상 추정 + 복호화 (완료)
//!     ShotAggregator // 샷 집계 (완료)
//!     ClassicalBaseline // 고전 기준선 (완료)
//!     QaeEngine // 엔진 (완료)
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! RiskParameters → ProbabilityTable → {DistributionEncoder, TailOracle}
//!     → GroverOperator → PhaseEstimator (R shots) → ShotAggregator
//!     → EstimationResult, next to ClassicalBaseline
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qare_qae::prelude::*;
//! use qare_sim::StateVectorSimulator;
//!
//! let risk = RiskParameters::new(3, 2.5, 0.0, 1.0);
//! let config = QaeConfig::new(4, 20).with_seed(42);
//! let engine = QaeEngine::new(config, StateVectorSimulator::new()).unwrap();
//!
//! let result = engine.estimate(&risk).unwrap();
//! let baseline = ClassicalBaseline::from_risk(&risk).unwrap();
//! println!(
//!     "qae {:.4} ± {:.4}, exact {:.4}",
//!     result.mean_amplitude_estimate,
//!     result.total_error,
//!     baseline.analytic_probability()
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Risk parameters and schedule (Gantree: L3_QAE → QaeConfig)
pub mod config;

/// Discretized loss distribution (Gantree: L3_QAE → ProbabilityTable)
pub mod distribution;

/// State preparation (Gantree: L3_QAE → DistributionEncoder)
pub mod encoder;

/// Tail oracle (Gantree: L3_QAE → TailOracle)
pub mod oracle;

/// Grover operator (Gantree: L3_QAE → GroverOperator)
pub mod grover;

/// Phase estimation (Gantree: L3_QAE → PhaseEstimator)
pub mod phase_estimation;

/// Shot aggregation (Gantree: L3_QAE → ShotAggregator)
pub mod aggregator;

/// Classical baseline (Gantree: L3_QAE → ClassicalBaseline)
pub mod classical;

/// Engine (Gantree: L3_QAE → QaeEngine)
pub mod engine;

// ============================================================================
// Re-exports
// ============================================================================

pub use aggregator::{EstimationResult, PhaseHistogram, ShotAggregator};
pub use classical::{
    classical_samples_for, continuous_monte_carlo, continuous_tail, ClassicalBaseline,
    MonteCarloEstimate, PrecisionPoint,
};
pub use config::{OracleStrategy, QaeConfig, RiskParameters};
pub use distribution::ProbabilityTable;
pub use encoder::DistributionEncoder;
pub use engine::QaeEngine;
pub use grover::GroverOperator;
pub use oracle::TailOracle;
pub use phase_estimation::{decode, folded_phase, inverse_qft, qft, PhaseEstimator};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qare_qae::prelude::*;
    //! ```

    pub use crate::aggregator::{EstimationResult, PhaseHistogram, ShotAggregator};
    pub use crate::classical::{continuous_tail, ClassicalBaseline, MonteCarloEstimate};
    pub use crate::config::{OracleStrategy, QaeConfig, RiskParameters};
    pub use crate::distribution::ProbabilityTable;
    pub use crate::encoder::DistributionEncoder;
    pub use crate::engine::QaeEngine;
    pub use crate::grover::GroverOperator;
    pub use crate::oracle::TailOracle;
    pub use crate::phase_estimation::PhaseEstimator;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
