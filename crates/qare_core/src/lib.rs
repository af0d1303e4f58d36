//! # QARE Core
//!
//! Core types, gates, and circuits for the Quantum Amplitude Risk Estimator.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qare_core // L0+L1: Foundation + Circuit (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // 핵심 타입 (완료)
//!         Constants // 시뮬레이터/QAE/통계 상수 (완료)
//!         Errors // 에러 타입 (완료)
//!         NumericGuards // 수치 영역 클램프 (완료)
//!     L1_Circuit // 회로 구조 (완료)
//!         Gate // 게이트 enum (완료)
//!         Circuit // 회로 구조체 + 역/제어/반복 (완료)
//!         CircuitBuilder // 빌더 패턴 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qare_core::prelude::*;
//!
//! let circuit = CircuitBuilder::new(3)
//!     .h(0)
//!     .cnot(0, 1)
//!     .mcz(&[0, 1], 2)
//!     .measure_all()
//!     .build();
//!
//! println!("{}", circuit);
//! println!("{}", circuit.to_qasm());
//! ```
//!
//! ## Circuit Algebra
//!
//! ```rust
//! use qare_core::prelude::*;
//!
//! let prep = CircuitBuilder::new(3).ry(1, 0.3).cnot(1, 2).build();
//! let undo = prep.inverse().unwrap();
//! let ctrl = prep.controlled(&[0]).unwrap();
//!
//! assert_eq!(undo.gates()[0], Gate::Cnot(1, 2));
//! assert_eq!(ctrl.count_controlled(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Numeric guards (Gantree: L0_Foundation → NumericGuards)
pub mod numeric;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{qae, sim, stats};
pub use error::{QareError, QareResult};
pub use gate::Gate;
pub use types::{Angle, Bitstring, Counts, Probability, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qare_core::prelude::*;
    //! ```

    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{qae, sim, stats};
    pub use crate::error::{QareError, QareResult};
    pub use crate::gate::Gate;
    pub use crate::numeric::{clamp_unit, clip_probability, safe_asin, safe_atan2};
    pub use crate::types::{Angle, Bitstring, Counts, Probability, QubitId};
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

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_controlled_inverse_commute() {
        // (c-U)† == c-(U†)
        let u = CircuitBuilder::new(3).ry(1, 0.7).r1(2, 0.2).cnot(1, 2).build();
        let a = u.controlled(&[0]).unwrap().inverse().unwrap();
        let b = u.inverse().unwrap().controlled(&[0]).unwrap();
        assert_eq!(a.gates(), b.gates());
    }

    #[test]
    fn test_qae_register_sizes() {
        assert_eq!(qae::logical_qubits(4, 6), 11);
        assert!(qae::logical_qubits(4, 6) <= sim::INTERACTIVE_QUBITS);
        assert_eq!(qae::grover_applications(6), 63);
    }

    #[test]
    fn test_qasm_controlled_rotation() {
        let circuit = CircuitBuilder::new(3)
            .controlled(&[0, 1], Gate::Ry(2, 0.5))
            .build();
        let qasm = circuit.to_qasm();
        assert!(qasm.contains("ctrl(2) @ ry(0.5) q[0],q[1],q[2];"));
    }

    #[test]
    fn test_probability_validation() {
        assert!(Probability::new(0.0).is_ok());
        assert!(Probability::new(1.0).is_ok());
        assert!(Probability::new(-0.1).is_err());

        let p = Probability::new(0.3).unwrap();
        assert!((p.complement() - 0.7).abs() < 1e-10);
    }
}
