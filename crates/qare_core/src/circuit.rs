//! Quantum circuit structure for QARE
//!
//! Gantree: L1_Circuit → Circuit
//!
//! A circuit is an ordered gate list over a fixed register width. Unitary
//! circuits can be inverted, conditioned on control qubits, and repeated,
//! which is all the algebra amplitude estimation needs.

use crate::error::{QareError, QareResult};
use crate::gate::Gate;
use crate::types::QubitId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Gate sequence
    /// Gantree: gates: Vec<Gate> // 게이트 목록
    gates: Vec<Gate>,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            name: Some(name.into()),
        }
    }

    /// Create from a vector of gates
    pub fn from_gates(num_qubits: usize, gates: Vec<Gate>) -> QareResult<Self> {
        let circuit = Self {
            num_qubits,
            gates,
            name: None,
        };
        circuit.validate_gates()?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> QareResult<()> {
        gate.validate(self.num_qubits)?;
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> QareResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Append every gate of another circuit (which must not be wider)
    /// Gantree: append(&mut, &Circuit) -> Result // 회로 연결
    pub fn append(&mut self, other: &Circuit) -> QareResult<()> {
        if other.num_qubits > self.num_qubits {
            return Err(QareError::QubitOutOfRange {
                qubit: other.num_qubits - 1,
                num_qubits: self.num_qubits,
            });
        }
        self.gates.extend_from_slice(&other.gates);
        Ok(())
    }

    /// Clear all gates
    pub fn clear(&mut self) {
        self.gates.clear();
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get gates
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Circuit Algebra
    // ========================================================================

    /// Adjoint circuit: reversed order, each gate inverted
    /// Gantree: inverse(&self) -> Result<Circuit> // 역회로
    pub fn inverse(&self) -> QareResult<Circuit> {
        let gates = self
            .gates
            .iter()
            .rev()
            .map(Gate::inverse)
            .collect::<QareResult<Vec<_>>>()?;
        Ok(Circuit {
            num_qubits: self.num_qubits,
            gates,
            name: self.name.as_ref().map(|n| format!("{}†", n)),
        })
    }

    /// Every gate conditioned on the given control qubits
    /// Gantree: controlled(&self, cs) -> Result<Circuit> // 제어 회로
    pub fn controlled(&self, controls: &[QubitId]) -> QareResult<Circuit> {
        for &c in controls {
            if c >= self.num_qubits {
                return Err(QareError::QubitOutOfRange {
                    qubit: c,
                    num_qubits: self.num_qubits,
                });
            }
        }
        let gates = self
            .gates
            .iter()
            .map(|g| g.controlled_by(controls))
            .collect::<QareResult<Vec<_>>>()?;
        Ok(Circuit {
            num_qubits: self.num_qubits,
            gates,
            name: self.name.as_ref().map(|n| format!("c-{}", n)),
        })
    }

    /// The circuit applied `times` times in sequence
    pub fn repeated(&self, times: usize) -> Circuit {
        let mut gates = Vec::with_capacity(self.gates.len() * times);
        for _ in 0..times {
            gates.extend_from_slice(&self.gates);
        }
        Circuit {
            num_qubits: self.num_qubits,
            gates,
            name: self.name.as_ref().map(|n| format!("{}^{}", n, times)),
        }
    }

    /// True when no gate is a measurement or reset
    pub fn is_unitary(&self) -> bool {
        self.gates.iter().all(Gate::is_unitary)
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path)
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for gate in &self.gates {
            let qubits = gate.qubits();
            let max_depth = qubits
                .iter()
                .filter_map(|&q| qubit_depths.get(q))
                .max()
                .copied()
                .unwrap_or(0);

            for &q in &qubits {
                if q < self.num_qubits {
                    qubit_depths[q] = max_depth + 1;
                }
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Get total gate count
    /// Gantree: gate_count(&self) -> usize // 게이트 수
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Count uncontrolled single-qubit gates
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Count gates carrying at least one control
    pub fn count_controlled(&self) -> usize {
        self.gates.iter().filter(|g| g.is_controlled()).count()
    }

    /// Count measurement operations
    pub fn count_measurements(&self) -> usize {
        self.gates.iter().filter(|g| g.is_measurement()).count()
    }

    /// Count parameterized gates
    pub fn count_parameterized(&self) -> usize {
        self.gates.iter().filter(|g| g.is_parameterized()).count()
    }

    /// Largest control set used by any gate
    pub fn max_controls(&self) -> usize {
        self.gates.iter().map(Gate::num_controls).max().unwrap_or(0)
    }

    /// Get qubits used in the circuit
    pub fn used_qubits(&self) -> HashSet<QubitId> {
        self.gates.iter().flat_map(|g| g.qubits()).collect()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn validate_gates(&self) -> QareResult<()> {
        for gate in &self.gates {
            gate.validate(self.num_qubits)?;
        }
        Ok(())
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 3 text
    /// Gantree: to_qasm(&self) -> String // QASM3 출력
    pub fn to_qasm(&self) -> String {
        let mut lines = vec![
            "OPENQASM 3.0;".to_string(),
            "include \"stdgates.inc\";".to_string(),
            String::new(),
            format!("qubit[{}] q;", self.num_qubits),
            format!("bit[{}] c;", self.num_qubits),
            String::new(),
        ];
        lines.extend(self.gates.iter().map(Gate::to_qasm));
        lines.join("\n")
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} gates)",
            self.num_qubits,
            self.gates.len()
        )?;
        writeln!(f, "  Depth: {}", self.depth())?;
        writeln!(f, "  1Q gates: {}", self.count_1q())?;
        writeln!(f, "  Controlled gates: {}", self.count_controlled())?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_new() {
        let circuit = Circuit::new(5);
        assert_eq!(circuit.num_qubits(), 5);
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_add_gate() {
        let mut circuit = Circuit::new(3);
        assert!(circuit.add_gate(Gate::H(0)).is_ok());
        assert!(circuit.add_gate(Gate::Cnot(0, 1)).is_ok());
        assert_eq!(circuit.gate_count(), 2);
    }

    #[test]
    fn test_add_gate_out_of_range() {
        let mut circuit = Circuit::new(3);
        let err = circuit.add_gate(Gate::H(5)).unwrap_err();
        assert!(err.is_dimension_error());
    }

    #[test]
    fn test_circuit_depth() {
        let mut circuit = Circuit::new(3);
        circuit.add_gate(Gate::H(0)).unwrap();
        circuit.add_gate(Gate::H(1)).unwrap();
        circuit.add_gate(Gate::Cnot(0, 1)).unwrap();
        circuit.add_gate(Gate::H(2)).unwrap();

        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_inverse_reverses_and_negates() {
        let circuit =
            Circuit::from_gates(2, vec![Gate::H(0), Gate::Ry(1, 0.4), Gate::R1(0, 0.2)]).unwrap();
        let inv = circuit.inverse().unwrap();
        assert_eq!(
            inv.gates(),
            &[Gate::R1(0, -0.2), Gate::Ry(1, -0.4), Gate::H(0)]
        );

        let mut measured = circuit.clone();
        measured.add_gate(Gate::Measure(vec![0])).unwrap();
        assert!(measured.inverse().is_err());
        assert!(!measured.is_unitary());
    }

    #[test]
    fn test_controlled_circuit() {
        let circuit = Circuit::from_gates(3, vec![Gate::X(1), Gate::Ry(2, 0.3)]).unwrap();
        let ctrl = circuit.controlled(&[0]).unwrap();
        assert_eq!(ctrl.gates()[0], Gate::Mcx(vec![0], 1));
        assert_eq!(ctrl.count_controlled(), 2);
        assert!(circuit.controlled(&[1]).is_err());
        assert!(circuit.controlled(&[7]).is_err());
    }

    #[test]
    fn test_repeated_and_append() {
        let circuit = Circuit::from_gates(2, vec![Gate::H(0), Gate::Cz(0, 1)]).unwrap();
        assert_eq!(circuit.repeated(3).gate_count(), 6);
        assert_eq!(circuit.repeated(0).gate_count(), 0);

        let mut wide = Circuit::new(3);
        wide.append(&circuit).unwrap();
        assert_eq!(wide.gate_count(), 2);
        assert!(circuit.clone().append(&wide).is_err());
    }

    #[test]
    fn test_to_qasm() {
        let mut circuit = Circuit::new(2);
        circuit.add_gate(Gate::H(0)).unwrap();
        circuit.add_gate(Gate::Cnot(0, 1)).unwrap();

        let qasm = circuit.to_qasm();
        assert!(qasm.contains("OPENQASM 3.0"));
        assert!(qasm.contains("qubit[2] q;"));
        assert!(qasm.contains("h q[0];"));
        assert!(qasm.contains("cx q[0],q[1];"));
    }
}
