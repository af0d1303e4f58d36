//! # QARE Simulation
//!
//! State-vector register, gate engine and backend abstraction for QARE.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qare_sim // L2: Simulation (완료)
//!     QuantumRegister // 상태 벡터 + 게이트 엔진 (완료)
//!     BackendTrait // 백엔드 인터페이스 (완료)
//!     StateVectorSimulator // 시뮬레이터 구현 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qare_sim::prelude::*;
//! use qare_core::CircuitBuilder;
//!
//! let backend = StateVectorSimulator::new().with_seed(42);
//!
//! let circuit = CircuitBuilder::new(3)
//!     .h(0)
//!     .cnot(0, 1)
//!     .cnot(1, 2)
//!     .measure_all()
//!     .build();
//!
//! let result = backend.execute(&circuit, 1000).unwrap();
//! println!("P(000): {:.4}", result.probability("000"));
//! ```
//!
//! ## Direct Register Access
//!
//! ```rust
//! use qare_sim::QuantumRegister;
//! use qare_core::Gate;
//!
//! let mut reg = QuantumRegister::allocate(2).unwrap();
//! reg.apply(&Gate::H(0)).unwrap();
//! reg.apply(&Gate::Cnot(0, 1)).unwrap();
//! assert!((reg.norm() - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// State vector and gate engine (Gantree: L2_Simulation → QuantumRegister)
pub mod register;

/// Execution types and backend trait (Gantree: L2_Simulation → BackendTrait)
pub mod execution;

/// Simulator backend (Gantree: L2_Simulation → StateVectorSimulator)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{Backend, ExecutionMetadata, ExecutionResult};
pub use register::QuantumRegister;
pub use simulator::StateVectorSimulator;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qare_sim::prelude::*;
    //! ```

    pub use crate::execution::{Backend, ExecutionMetadata, ExecutionResult};
    pub use crate::register::QuantumRegister;
    pub use crate::simulator::StateVectorSimulator;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qare_core::{CircuitBuilder, Gate};
    use std::f64::consts::PI;

    #[test]
    fn test_bell_state() {
        let backend = StateVectorSimulator::new().with_seed(42);
        let circuit = CircuitBuilder::new(2).h(0).cnot(0, 1).measure_all().build();

        let result = backend.execute(&circuit, 10000).unwrap();

        let p00 = result.probability("00");
        let p11 = result.probability("11");
        assert!((p00 - 0.5).abs() < 0.05);
        assert!((p11 - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_rotation_gates() {
        let backend = StateVectorSimulator::new().with_seed(42);

        // Ry(π) flips |0⟩ to |1⟩
        let circuit = CircuitBuilder::new(1).ry(0, PI).measure(&[0]).build();
        let result = backend.execute(&circuit, 1000).unwrap();
        assert!(result.probability("1") > 0.99);
    }

    #[test]
    fn test_batch_execution() {
        let backend = StateVectorSimulator::new().with_seed(42);

        let circuits: Vec<_> = (0..5)
            .map(|i| {
                CircuitBuilder::new(2)
                    .h(0)
                    .r1(0, i as f64 * 0.2)
                    .measure_all()
                    .build()
            })
            .collect();

        let results = backend.execute_batch(&circuits, 100).unwrap();
        assert_eq!(results.len(), 5);
        for result in &results {
            assert_eq!(result.shots, 100);
        }
    }

    #[test]
    fn test_controlled_circuit_matches_manual() {
        // c-(Ry · X) built with Circuit::controlled agrees with direct gates
        let body = CircuitBuilder::new(3).ry(1, 0.9).x(2).build();
        let mut prepared = CircuitBuilder::new(3).h(0).build();
        prepared.append(&body.controlled(&[0]).unwrap()).unwrap();

        let manual = CircuitBuilder::new(3)
            .h(0)
            .gate(Gate::Controlled(vec![0], Box::new(Gate::Ry(1, 0.9))))
            .mcx(&[0], 2)
            .build();

        let sim = StateVectorSimulator::new();
        let a = sim.statevector(&prepared).unwrap();
        let b = sim.statevector(&manual).unwrap();
        for (x, y) in a.amplitudes().iter().zip(b.amplitudes()) {
            assert!((x - y).norm() < 1e-12);
        }
    }
}
