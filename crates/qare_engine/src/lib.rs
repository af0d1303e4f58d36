//! # QARE Engine
//!
//! Tail-risk estimation pipeline: configuration, staged execution,
//! repeated estimates and reports.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qare_engine // L4: Integration (완료)
//!     QareConfig // 통합 설정 (완료)
//!         loss model, schedule, classical comparison, seed
//!         to_risk_parameters(), to_qae_config()
//!         from_json_file(), to_json_file()
//!     RiskPipeline // 단계별 실행 (완료)
//!         discretize() → build_circuit() → estimate() → compare()
//!         run() - 전체 실행 → RiskReport
//!     Ensemble // 반복 추정 (완료)
//!     Reporter // 결과 리포팅 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qare_engine::prelude::*;
//!
//! let config = QareConfig::quick().with_seed(42);
//! let report = RiskPipeline::new(config).run().unwrap();
//! println!("{}", Reporter::report(&report, ReportFormat::Text));
//! ```
//!
//! ## Using Stages
//!
//! ```rust
//! use qare_engine::prelude::*;
//!
//! let mut pipeline = RiskPipeline::new(QareConfig::quick().with_seed(7));
//!
//! pipeline.discretize().unwrap();
//! let qubits = pipeline.build_circuit().unwrap().logical_qubits;
//! assert_eq!(qubits, 8);
//! pipeline.estimate().unwrap();
//! pipeline.compare().unwrap();
//! ```
//!
//! ## Configuration Presets
//!
//! ```rust
//! use qare_engine::prelude::*;
//!
//! // n=4, t=2.5, m=6, R=120
//! let full = QareConfig::default_tail();
//!
//! // Smaller registers and fewer shots
//! let quick = QareConfig::quick();
//!
//! // Fixed seed with an ensemble of repeats
//! let bench = QareConfig::benchmark();
//! assert_eq!(bench.seed, Some(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Configuration (Gantree: L4_Integration → QareConfig)
pub mod config;

/// Repeated estimates (Gantree: L4_Integration → Ensemble)
pub mod ensemble;

/// Pipeline (Gantree: L4_Integration → RiskPipeline)
pub mod pipeline;

/// Reports (Gantree: L4_Integration → Reporter)
pub mod reporter;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::QareConfig;
pub use ensemble::{Ensemble, EnsembleSummary};
pub use pipeline::{
    BaselineComparison, CircuitMetrics, PipelineStage, PipelineState, RiskPipeline, RiskReport,
};
pub use reporter::{ReportFormat, Reporter};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qare_engine::prelude::*;
    //! ```

    pub use crate::config::QareConfig;
    pub use crate::ensemble::{Ensemble, EnsembleSummary};
    pub use crate::pipeline::{CircuitMetrics, PipelineStage, RiskPipeline, RiskReport};
    pub use crate::reporter::{ReportFormat, Reporter};
    pub use qare_qae::{EstimationResult, OracleStrategy};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
