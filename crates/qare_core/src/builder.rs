//! Circuit builder for QARE
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder for gate sequences. Invalid gates are dropped silently by
//! the chained methods; use [`Circuit::add_gate`] directly when the error
//! matters.

use crate::circuit::Circuit;
use crate::gate::Gate;
use crate::types::{Angle, QubitId};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Internal circuit being built
    /// Gantree: circuit: Circuit // 내부 회로
    circuit: Circuit,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
        }
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    /// Gantree: h(self, q) -> Self // H 추가
    pub fn h(mut self, qubit: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::H(qubit));
        self
    }

    /// Add Pauli-X gate
    /// Gantree: x(self, q) -> Self // X 추가
    pub fn x(mut self, qubit: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::X(qubit));
        self
    }

    /// Add Pauli-Z gate
    pub fn z(mut self, qubit: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::Z(qubit));
        self
    }

    /// Add Ry rotation
    /// Gantree: ry(self, q, a) -> Self // Ry 추가
    pub fn ry(mut self, qubit: QubitId, angle: Angle) -> Self {
        let _ = self.circuit.add_gate(Gate::Ry(qubit, angle));
        self
    }

    /// Add phase rotation
    pub fn r1(mut self, qubit: QubitId, angle: Angle) -> Self {
        let _ = self.circuit.add_gate(Gate::R1(qubit, angle));
        self
    }

    // ========================================================================
    // Multi-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    /// Gantree: cnot(self, c, t) -> Self // CNOT 추가
    pub fn cnot(mut self, control: QubitId, target: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::Cnot(control, target));
        self
    }

    /// Add CZ gate
    pub fn cz(mut self, control: QubitId, target: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::Cz(control, target));
        self
    }

    /// Add SWAP gate
    pub fn swap(mut self, a: QubitId, b: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::Swap(a, b));
        self
    }

    /// Add multi-controlled X
    /// Gantree: mcx(self, cs, t) -> Self // MCX 추가
    pub fn mcx(mut self, controls: &[QubitId], target: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::Mcx(controls.to_vec(), target));
        self
    }

    /// Add multi-controlled Z
    pub fn mcz(mut self, controls: &[QubitId], target: QubitId) -> Self {
        let _ = self.circuit.add_gate(Gate::Mcz(controls.to_vec(), target));
        self
    }

    /// Add an arbitrary gate conditioned on `controls`
    pub fn controlled(mut self, controls: &[QubitId], gate: Gate) -> Self {
        if let Ok(g) = gate.controlled_by(controls) {
            let _ = self.circuit.add_gate(g);
        }
        self
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Hadamard on each listed qubit
    /// Gantree: h_on(self, qs) -> Self // H 레이어
    pub fn h_on(mut self, qubits: &[QubitId]) -> Self {
        for &q in qubits {
            let _ = self.circuit.add_gate(Gate::H(q));
        }
        self
    }

    /// Pauli-X on each listed qubit
    pub fn x_on(mut self, qubits: &[QubitId]) -> Self {
        for &q in qubits {
            let _ = self.circuit.add_gate(Gate::X(q));
        }
        self
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    /// Jointly measure the listed qubits
    /// Gantree: measure(self, qs) -> Self // 측정
    pub fn measure(mut self, qubits: &[QubitId]) -> Self {
        let _ = self.circuit.add_gate(Gate::Measure(qubits.to_vec()));
        self
    }

    /// Measure every qubit
    pub fn measure_all(self) -> Self {
        let all: Vec<QubitId> = (0..self.circuit.num_qubits()).collect();
        self.measure(&all)
    }

    /// Reset the listed qubits to |0⟩
    pub fn reset(mut self, qubits: &[QubitId]) -> Self {
        let _ = self.circuit.add_gate(Gate::Reset(qubits.to_vec()));
        self
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Append a sub-circuit
    pub fn append(mut self, other: &Circuit) -> Self {
        let _ = self.circuit.append(other);
        self
    }

    /// Add a raw gate
    pub fn gate(mut self, gate: Gate) -> Self {
        let _ = self.circuit.add_gate(gate);
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build the final circuit
    /// Gantree: build(self) -> Circuit // 회로 생성
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Get current gate count
    pub fn gate_count(&self) -> usize {
        self.circuit.gate_count()
    }
}

// ============================================================================
// Tests
// ============================================================================
