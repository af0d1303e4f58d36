//! Quantum gate definitions for QARE
//!
//! Gantree: L1_Circuit → Gate
//!
//! The gate set is exactly what amplitude estimation needs: Hadamard,
//! Pauli X/Z, real Ry rotation, phase rotation R1, SWAP, (multi-)controlled
//! X and Z, an arbitrary control wrapper, plus joint measurement and reset.

use crate::error::{QareError, QareResult};
use crate::types::{Angle, QubitId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================
    /// Hadamard gate
    /// Gantree: H(QubitId) // 하다마드
    H(QubitId),

    /// Pauli-X gate (NOT)
    /// Gantree: X(QubitId) // 파울리 X
    X(QubitId),

    /// Pauli-Z gate
    /// Gantree: Z(QubitId) // 파울리 Z
    Z(QubitId),

    /// Rotation around Y-axis; keeps real amplitudes real
    /// Gantree: Ry(QubitId, Angle) // Y 회전
    Ry(QubitId, Angle),

    /// Phase rotation diag(1, e^{iθ})
    /// Gantree: R1(QubitId, Angle) // 위상 회전
    R1(QubitId, Angle),

    // ========================================================================
    // Multi-Qubit Gates
    // ========================================================================
    /// SWAP gate
    /// Gantree: Swap(QubitId, QubitId) // 스왑
    Swap(QubitId, QubitId),

    /// Controlled-NOT (control, target)
    /// Gantree: Cnot(QubitId, QubitId) // ctrl, tgt
    Cnot(QubitId, QubitId),

    /// Controlled-Z (control, target)
    Cz(QubitId, QubitId),

    /// Multi-controlled X (controls, target)
    /// Gantree: Mcx(Vec<QubitId>, QubitId) // 다중 제어 X
    Mcx(Vec<QubitId>, QubitId),

    /// Multi-controlled Z (controls, target)
    /// Gantree: Mcz(Vec<QubitId>, QubitId) // 다중 제어 Z
    Mcz(Vec<QubitId>, QubitId),

    /// Any unitary gate conditioned on all controls being |1⟩
    /// Gantree: Controlled(Vec<QubitId>, Box<Gate>) // 제어 래퍼
    Controlled(Vec<QubitId>, Box<Gate>),

    // ========================================================================
    // Non-Unitary Operations
    // ========================================================================
    /// Joint measurement of the listed qubits (bits recorded in list order)
    /// Gantree: Measure(Vec<QubitId>) // 측정
    Measure(Vec<QubitId>),

    /// Force the listed qubits to |0⟩ (measure, then X where the bit was 1)
    Reset(Vec<QubitId>),
}

impl Gate {
    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Control qubits of this gate (empty for uncontrolled gates)
    pub fn controls(&self) -> Vec<QubitId> {
        match self {
            Gate::Cnot(c, _) | Gate::Cz(c, _) => vec![*c],
            Gate::Mcx(cs, _) | Gate::Mcz(cs, _) => cs.clone(),
            Gate::Controlled(cs, inner) => {
                let mut all = cs.clone();
                all.extend(inner.controls());
                all
            }
            _ => vec![],
        }
    }

    /// Target qubits of this gate
    pub fn targets(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q) | Gate::X(q) | Gate::Z(q) | Gate::Ry(q, _) | Gate::R1(q, _) => vec![*q],
            Gate::Swap(a, b) => vec![*a, *b],
            Gate::Cnot(_, t) | Gate::Cz(_, t) | Gate::Mcx(_, t) | Gate::Mcz(_, t) => vec![*t],
            Gate::Controlled(_, inner) => inner.targets(),
            Gate::Measure(qs) | Gate::Reset(qs) => qs.clone(),
        }
    }

    /// Get all qubits involved in this gate (controls first)
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut qs = self.controls();
        qs.extend(self.targets());
        qs
    }

    /// Number of control qubits
    pub fn num_controls(&self) -> usize {
        self.controls().len()
    }

    /// Check if gate acts on a single qubit without controls
    pub fn is_single_qubit(&self) -> bool {
        matches!(
            self,
            Gate::H(_) | Gate::X(_) | Gate::Z(_) | Gate::Ry(_, _) | Gate::R1(_, _)
        )
    }

    /// Check if gate carries at least one control
    pub fn is_controlled(&self) -> bool {
        self.num_controls() > 0
    }

    /// Check if gate is parameterized
    pub fn is_parameterized(&self) -> bool {
        match self {
            Gate::Ry(_, _) | Gate::R1(_, _) => true,
            Gate::Controlled(_, inner) => inner.is_parameterized(),
            _ => false,
        }
    }

    /// Check if gate is measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(_))
    }

    /// Check if gate is a unitary (everything except measure/reset)
    pub fn is_unitary(&self) -> bool {
        !matches!(self, Gate::Measure(_) | Gate::Reset(_))
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Z(_) => "z",
            Gate::Ry(_, _) => "ry",
            Gate::R1(_, _) => "p",
            Gate::Swap(_, _) => "swap",
            Gate::Cnot(_, _) => "cx",
            Gate::Cz(_, _) => "cz",
            Gate::Mcx(_, _) => "mcx",
            Gate::Mcz(_, _) => "mcz",
            Gate::Controlled(_, _) => "ctrl",
            Gate::Measure(_) => "measure",
            Gate::Reset(_) => "reset",
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check qubit range and distinctness against a register width
    /// Gantree: validate(&self, n) -> Result // 범위 검증
    pub fn validate(&self, num_qubits: usize) -> QareResult<()> {
        let mut seen = HashSet::new();
        for qubit in self.qubits() {
            if qubit >= num_qubits {
                return Err(QareError::QubitOutOfRange { qubit, num_qubits });
            }
            if !seen.insert(qubit) {
                return Err(QareError::DuplicateQubit(qubit));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Algebra
    // ========================================================================

    /// Adjoint of this gate
    /// Gantree: inverse(&self) -> Result<Gate> // 역연산
    pub fn inverse(&self) -> QareResult<Gate> {
        match self {
            Gate::Ry(q, theta) => Ok(Gate::Ry(*q, -theta)),
            Gate::R1(q, theta) => Ok(Gate::R1(*q, -theta)),
            Gate::Controlled(cs, inner) => Ok(Gate::Controlled(cs.clone(), Box::new(inner.inverse()?))),
            Gate::Measure(_) | Gate::Reset(_) => Err(QareError::NonUnitary(self.name().into())),
            // H, X, Z, SWAP and the controlled Paulis are self-inverse
            other => Ok(other.clone()),
        }
    }

    /// Condition this gate on additional control qubits
    /// Gantree: controlled_by(&self, cs) -> Result<Gate> // 제어 추가
    pub fn controlled_by(&self, controls: &[QubitId]) -> QareResult<Gate> {
        if controls.is_empty() {
            return Ok(self.clone());
        }
        let own = self.qubits();
        let mut seen = HashSet::new();
        for &c in controls {
            if own.contains(&c) {
                return Err(QareError::ControlOverlap(c));
            }
            if !seen.insert(c) {
                return Err(QareError::DuplicateQubit(c));
            }
        }

        let merged = |existing: &[QubitId]| -> Vec<QubitId> {
            let mut all = controls.to_vec();
            all.extend_from_slice(existing);
            all
        };

        match self {
            Gate::X(t) => Ok(Gate::Mcx(controls.to_vec(), *t)),
            Gate::Z(t) => Ok(Gate::Mcz(controls.to_vec(), *t)),
            Gate::Cnot(c, t) => Ok(Gate::Mcx(merged(&[*c]), *t)),
            Gate::Cz(c, t) => Ok(Gate::Mcz(merged(&[*c]), *t)),
            Gate::Mcx(cs, t) => Ok(Gate::Mcx(merged(cs), *t)),
            Gate::Mcz(cs, t) => Ok(Gate::Mcz(merged(cs), *t)),
            Gate::Controlled(cs, inner) => Ok(Gate::Controlled(merged(cs), inner.clone())),
            Gate::Measure(_) | Gate::Reset(_) => Err(QareError::NonUnitary(self.name().into())),
            other => Ok(Gate::Controlled(controls.to_vec(), Box::new(other.clone()))),
        }
    }

    // ========================================================================
    // QASM
    // ========================================================================

    /// Convert to an OpenQASM 3 statement
    /// Gantree: to_qasm(&self) -> String // QASM 변환
    pub fn to_qasm(&self) -> String {
        match self {
            Gate::Measure(qs) => qs
                .iter()
                .map(|q| format!("c[{}] = measure q[{}];", q, q))
                .collect::<Vec<_>>()
                .join(" "),
            Gate::Reset(qs) => qs
                .iter()
                .map(|q| format!("reset q[{}];", q))
                .collect::<Vec<_>>()
                .join(" "),
            Gate::Cnot(c, t) => format!("cx q[{}],q[{}];", c, t),
            Gate::Cz(c, t) => format!("cz q[{}],q[{}];", c, t),
            _ => {
                let controls = self.controls();
                let base = self.base_head();
                let operands = self
                    .qubits()
                    .iter()
                    .map(|q| format!("q[{}]", q))
                    .collect::<Vec<_>>()
                    .join(",");
                match controls.len() {
                    0 => format!("{} {};", base, operands),
                    k => format!("ctrl({}) @ {} {};", k, base, operands),
                }
            }
        }
    }

    /// Uncontrolled gate head with parameters ("ry(0.5)", "x", ...)
    fn base_head(&self) -> String {
        match self {
            Gate::H(_) => "h".into(),
            Gate::X(_) | Gate::Cnot(_, _) | Gate::Mcx(_, _) => "x".into(),
            Gate::Z(_) | Gate::Cz(_, _) | Gate::Mcz(_, _) => "z".into(),
            Gate::Ry(_, theta) => format!("ry({})", theta),
            Gate::R1(_, theta) => format!("p({})", theta),
            Gate::Swap(_, _) => "swap".into(),
            Gate::Controlled(_, inner) => inner.base_head(),
            Gate::Measure(_) | Gate::Reset(_) => self.name().into(),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_qubits() {
        assert_eq!(Gate::H(0).qubits(), vec![0]);
        assert_eq!(Gate::Cnot(0, 1).qubits(), vec![0, 1]);
        assert_eq!(Gate::Mcz(vec![0, 1], 2).qubits(), vec![0, 1, 2]);
        let nested = Gate::Controlled(vec![4], Box::new(Gate::Controlled(vec![3], Box::new(Gate::Ry(0, 0.1)))));
        assert_eq!(nested.controls(), vec![4, 3]);
        assert_eq!(nested.targets(), vec![0]);
    }

    #[test]
    fn test_gate_classification() {
        assert!(Gate::H(0).is_single_qubit());
        assert!(!Gate::Cnot(0, 1).is_single_qubit());
        assert!(Gate::Cnot(0, 1).is_controlled());
        assert!(Gate::Ry(0, 1.0).is_parameterized());
        assert!(!Gate::H(0).is_parameterized());
        assert!(Gate::Measure(vec![0]).is_measurement());
        assert!(!Gate::Reset(vec![0]).is_unitary());
    }

    #[test]
    fn test_validate() {
        assert!(Gate::H(2).validate(3).is_ok());
        assert_eq!(
            Gate::H(3).validate(3),
            Err(QareError::QubitOutOfRange {
                qubit: 3,
                num_qubits: 3
            })
        );
        assert_eq!(Gate::Mcx(vec![1, 1], 0).validate(3), Err(QareError::DuplicateQubit(1)));
    }

    #[test]
    fn test_inverse() {
        assert_eq!(Gate::Ry(1, 0.3).inverse().unwrap(), Gate::Ry(1, -0.3));
        assert_eq!(Gate::R1(0, 0.7).inverse().unwrap(), Gate::R1(0, -0.7));
        assert_eq!(Gate::H(0).inverse().unwrap(), Gate::H(0));
        assert!(Gate::Measure(vec![0]).inverse().is_err());
    }

    #[test]
    fn test_controlled_by() {
        assert_eq!(Gate::X(2).controlled_by(&[0]).unwrap(), Gate::Mcx(vec![0], 2));
        assert_eq!(Gate::Cnot(1, 2).controlled_by(&[0]).unwrap(), Gate::Mcx(vec![0, 1], 2));
        assert_eq!(
            Gate::Ry(2, 0.5).controlled_by(&[0, 1]).unwrap(),
            Gate::Controlled(vec![0, 1], Box::new(Gate::Ry(2, 0.5)))
        );
        assert_eq!(Gate::H(0).controlled_by(&[0]), Err(QareError::ControlOverlap(0)));
        assert!(Gate::Reset(vec![1]).controlled_by(&[0]).is_err());
    }

    #[test]
    fn test_gate_to_qasm() {
        assert_eq!(Gate::H(0).to_qasm(), "h q[0];");
        assert_eq!(Gate::Cnot(0, 1).to_qasm(), "cx q[0],q[1];");
        assert_eq!(Gate::Mcz(vec![0, 1], 2).to_qasm(), "ctrl(2) @ z q[0],q[1],q[2];");
        assert_eq!(
            Gate::Controlled(vec![3], Box::new(Gate::Ry(0, 0.5))).to_qasm(),
            "ctrl(1) @ ry(0.5) q[3],q[0];"
        );
        assert_eq!(Gate::Measure(vec![0, 1]).to_qasm(), "c[0] = measure q[0]; c[1] = measure q[1];");
    }
}
