//! Generalized Grover operator
//!
//! Gantree: L3_QAE → GroverOperator
//!
//! G = A · S₀ · A† · O, written in circuit order as oracle, A†, S₀, A.
//! S₀ reflects about |0…0⟩ of the value register and carries the global −1
//! as Z·X·Z·X on the first value qubit, so the sign survives once G is
//! controlled. On A|0⟩ the operator rotates by 2θ with sin²θ = a.

use crate::encoder::DistributionEncoder;
use crate::oracle::phase_flip_all;
use qare_core::{Circuit, Gate, QareError, QareResult, QubitId};

/// Grover iterate over a prepared distribution and tail oracle
/// Gantree: GroverOperator // 그로버 연산자
#[derive(Debug, Clone)]
pub struct GroverOperator {
    /// One application of G
    circuit: Circuit,
}

impl GroverOperator {
    /// Assemble G from the encoder and the oracle circuit
    /// Gantree: new(encoder, oracle) -> Result<Self> // 생성자
    pub fn new(encoder: &DistributionEncoder, oracle: &Circuit) -> QareResult<Self> {
        let prepare = encoder.circuit()?;
        let unprepare = prepare.inverse()?;
        let value = encoder.value_qubits();

        let mut circuit = Circuit::with_name(prepare.num_qubits(), "G");
        circuit.append(oracle)?;
        circuit.append(&unprepare)?;
        circuit.append(&zero_reflection(value, prepare.num_qubits())?)?;
        circuit.append(&prepare)?;
        Ok(Self { circuit })
    }

    /// One application of G
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// G^k
    /// Gantree: power(k) -> Circuit // 거듭제곱
    pub fn power(&self, k: usize) -> Circuit {
        self.circuit.repeated(k)
    }

    /// Controlled-G on `control`
    /// Gantree: controlled(c) -> Result<Circuit> // 제어 G
    pub fn controlled(&self, control: QubitId) -> QareResult<Circuit> {
        self.circuit.controlled(&[control])
    }

    /// Controlled-G^k on `control`
    pub fn controlled_power(&self, control: QubitId, k: usize) -> QareResult<Circuit> {
        Ok(self.controlled(control)?.repeated(k))
    }

    /// Gates in one application
    pub fn gate_count(&self) -> usize {
        self.circuit.gate_count()
    }
}

/// −(I − 2|0⟩⟨0|) on the value register, i.e. 2|0⟩⟨0| − I
fn zero_reflection(value: &[QubitId], num_qubits: usize) -> QareResult<Circuit> {
    let first = *value
        .first()
        .ok_or_else(|| QareError::config("value register is empty"))?;
    let mut circuit = Circuit::with_name(num_qubits, "S0");
    circuit.add_gates(value.iter().map(|&q| Gate::X(q)))?;
    circuit.add_gate(phase_flip_all(value)?)?;
    circuit.add_gates(value.iter().map(|&q| Gate::X(q)))?;
    // (ZX)² = −I
    circuit.add_gates([Gate::Z(first), Gate::X(first), Gate::Z(first), Gate::X(first)])?;
    Ok(circuit)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OracleStrategy;
    use crate::distribution::ProbabilityTable;
    use crate::oracle::TailOracle;
    use approx::assert_abs_diff_eq;
    use qare_sim::QuantumRegister;

    /// value register 0..n, marker n in |−⟩, A applied
    fn prepared(encoder: &DistributionEncoder, n: usize) -> QuantumRegister {
        let mut reg = QuantumRegister::allocate(n + 1).unwrap();
        for g in encoder.circuit().unwrap().gates() {
            reg.apply(g).unwrap();
        }
        reg.apply(&Gate::X(n)).unwrap();
        reg.apply(&Gate::H(n)).unwrap();
        reg
    }

    fn marked_mass(reg: &QuantumRegister, oracle: &TailOracle) -> f64 {
        reg.probabilities()
            .iter()
            .enumerate()
            .filter(|(i, _)| oracle.is_marked(i >> 1))
            .map(|(_, p)| p)
            .sum()
    }

    #[test]
    fn test_amplification_follows_rotation() {
        let table = ProbabilityTable::from_probabilities(vec![0.4, 0.3, 0.2, 0.1]).unwrap();
        let oracle = TailOracle::from_cutoff(2, 3).unwrap();
        let a = oracle.analytic_probability(&table);
        let theta = a.sqrt().asin();

        for strategy in [OracleStrategy::Enumerate, OracleStrategy::Comparator] {
            let encoder = DistributionEncoder::new(&table, vec![0, 1], 3).unwrap();
            let oracle_circuit = oracle.circuit(strategy, &[0, 1], 2, 3).unwrap();
            let grover = GroverOperator::new(&encoder, &oracle_circuit).unwrap();

            let mut reg = prepared(&encoder, 2);
            assert_abs_diff_eq!(marked_mass(&reg, &oracle), a, epsilon = 1e-9);
            for k in 1..=4 {
                for g in grover.circuit().gates() {
                    reg.apply(g).unwrap();
                }
                let expected = ((2 * k + 1) as f64 * theta).sin().powi(2);
                assert_abs_diff_eq!(marked_mass(&reg, &oracle), expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_eigenphase_under_control() {
        // control in |1⟩: controlled-G acts like G, including the global sign;
        // the good/bad 2D subspace carries eigenvalues e^{±2iθ}, so
        // ⟨ψ|G|ψ⟩ = cos 2θ for ψ = A|0⟩|−⟩
        let table = ProbabilityTable::from_probabilities(vec![0.5, 0.25, 0.125, 0.125]).unwrap();
        let oracle = TailOracle::from_cutoff(2, 2).unwrap();
        let a = oracle.analytic_probability(&table);
        let theta = a.sqrt().asin();

        let encoder = DistributionEncoder::new(&table, vec![1, 2], 4).unwrap();
        let oracle_circuit = oracle
            .circuit(OracleStrategy::Comparator, &[1, 2], 3, 4)
            .unwrap();
        let grover = GroverOperator::new(&encoder, &oracle_circuit).unwrap();

        let mut reg = QuantumRegister::allocate(4).unwrap();
        reg.apply(&Gate::X(0)).unwrap();
        for g in encoder.circuit().unwrap().gates() {
            reg.apply(g).unwrap();
        }
        reg.apply(&Gate::X(3)).unwrap();
        reg.apply(&Gate::H(3)).unwrap();
        let before = reg.amplitudes().to_vec();

        for g in grover.controlled(0).unwrap().gates() {
            reg.apply(g).unwrap();
        }
        let overlap: num_complex::Complex64 = before
            .iter()
            .zip(reg.amplitudes())
            .map(|(x, y)| x.conj() * y)
            .sum();
        assert_abs_diff_eq!(overlap.re, (2.0 * theta).cos(), epsilon = 1e-9);
        assert_abs_diff_eq!(overlap.im, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_control_off_is_identity() {
        let table = ProbabilityTable::from_probabilities(vec![0.7, 0.3]).unwrap();
        let oracle = TailOracle::all(1).unwrap();
        let encoder = DistributionEncoder::new(&table, vec![1], 3).unwrap();
        let oracle_circuit = oracle
            .circuit(OracleStrategy::Comparator, &[1], 2, 3)
            .unwrap();
        let grover = GroverOperator::new(&encoder, &oracle_circuit).unwrap();

        let mut reg = QuantumRegister::allocate(3).unwrap();
        reg.apply(&Gate::Ry(1, 0.8)).unwrap();
        let before = reg.clone();
        for g in grover.controlled_power(0, 3).unwrap().gates() {
            reg.apply(g).unwrap();
        }
        for (x, y) in before.amplitudes().iter().zip(reg.amplitudes()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn test_power_and_counts() {
        let table = ProbabilityTable::uniform(2).unwrap();
        let oracle = TailOracle::from_cutoff(2, 1).unwrap();
        let encoder = DistributionEncoder::new(&table, vec![0, 1], 3).unwrap();
        let oracle_circuit = oracle.circuit(OracleStrategy::Enumerate, &[0, 1], 2, 3).unwrap();
        let grover = GroverOperator::new(&encoder, &oracle_circuit).unwrap();

        assert_eq!(grover.power(3).gate_count(), 3 * grover.gate_count());
        // the enumerate oracle leaves the marker free to act as a control
        assert!(grover.controlled(2).is_ok());
        assert!(grover.controlled(0).unwrap_err().is_circuit_error());
    }
}
