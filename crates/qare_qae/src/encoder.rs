//! Distribution encoder (state preparation A)
//!
//! Gantree: L3_QAE → DistributionEncoder
//!
//! Loads √p into the value register by recursive binary splitting. At depth
//! L the current block is halved; qubit L is rotated by
//! Ry(2·atan2(‖right‖, ‖left‖)) under the controls accumulated from its
//! ancestors, and the halves are prepared under qubit L = 0 (X-conjugated
//! control) and qubit L = 1 respectively. Blocks with zero norm emit nothing.

use crate::distribution::ProbabilityTable;
use qare_core::numeric::safe_atan2;
use qare_core::{Circuit, Gate, QareError, QareResult, QubitId};

/// State-preparation circuit generator
/// Gantree: DistributionEncoder // 상태 준비
#[derive(Debug, Clone)]
pub struct DistributionEncoder {
    /// Target amplitudes √p, indexed MSB-first over `value_qubits`
    amplitudes: Vec<f64>,

    /// Value register, most significant qubit first
    value_qubits: Vec<QubitId>,

    /// Width of the enclosing register
    num_qubits: usize,
}

impl DistributionEncoder {
    /// Encoder for `table` acting on `value_qubits` of a `num_qubits` register
    /// Gantree: new(table, qs, n) -> Result<Self> // 생성자
    pub fn new(
        table: &ProbabilityTable,
        value_qubits: Vec<QubitId>,
        num_qubits: usize,
    ) -> QareResult<Self> {
        if value_qubits.len() != table.num_qubits() {
            return Err(QareError::TableLengthMismatch {
                len: table.len(),
                expected: 1usize << value_qubits.len(),
            });
        }
        if let Some(&q) = value_qubits.iter().find(|&&q| q >= num_qubits) {
            return Err(QareError::QubitOutOfRange {
                qubit: q,
                num_qubits,
            });
        }
        Ok(Self {
            amplitudes: table.amplitudes(),
            value_qubits,
            num_qubits,
        })
    }

    /// Encoder on a bare register of exactly the table's width
    pub fn standalone(table: &ProbabilityTable) -> QareResult<Self> {
        let n = table.num_qubits();
        Self::new(table, (0..n).collect(), n)
    }

    /// Value register
    pub fn value_qubits(&self) -> &[QubitId] {
        &self.value_qubits
    }

    /// The preparation circuit A
    /// Gantree: circuit(&self) -> Result<Circuit> // A 회로
    pub fn circuit(&self) -> QareResult<Circuit> {
        let mut circuit = Circuit::with_name(self.num_qubits, "A");
        let mut controls = Vec::with_capacity(self.value_qubits.len());
        self.split(&mut circuit, &self.amplitudes, 0, &mut controls)?;
        Ok(circuit)
    }

    /// The adjoint A†
    pub fn inverse(&self) -> QareResult<Circuit> {
        self.circuit()?.inverse()
    }

    fn split(
        &self,
        circuit: &mut Circuit,
        block: &[f64],
        level: usize,
        controls: &mut Vec<QubitId>,
    ) -> QareResult<()> {
        let half = block.len() / 2;
        let (left, right) = block.split_at(half);
        let left_norm = norm(left);
        let right_norm = norm(right);
        if left_norm == 0.0 && right_norm == 0.0 {
            return Ok(());
        }

        let qubit = self.value_qubits[level];
        let angle = 2.0 * safe_atan2(right_norm, left_norm, "encoder split")?;
        if angle != 0.0 {
            circuit.add_gate(Gate::Ry(qubit, angle).controlled_by(controls)?)?;
        }

        if half > 1 {
            if left_norm > 0.0 {
                circuit.add_gate(Gate::X(qubit))?;
                controls.push(qubit);
                self.split(circuit, left, level + 1, controls)?;
                controls.pop();
                circuit.add_gate(Gate::X(qubit))?;
            }
            if right_norm > 0.0 {
                controls.push(qubit);
                self.split(circuit, right, level + 1, controls)?;
                controls.pop();
            }
        }
        Ok(())
    }
}

fn norm(block: &[f64]) -> f64 {
    block.iter().map(|a| a * a).sum::<f64>().sqrt()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskParameters;
    use approx::assert_abs_diff_eq;
    use qare_sim::StateVectorSimulator;

    fn prepared_probabilities(encoder: &DistributionEncoder) -> Vec<f64> {
        let circuit = encoder.circuit().unwrap();
        StateVectorSimulator::new()
            .statevector(&circuit)
            .unwrap()
            .probabilities()
    }

    #[test]
    fn test_encodes_lognormal_table() {
        let table = ProbabilityTable::from_risk(&RiskParameters::default()).unwrap();
        let encoder = DistributionEncoder::standalone(&table).unwrap();
        let probs = prepared_probabilities(&encoder);
        for (p, q) in probs.iter().zip(table.probabilities()) {
            assert_abs_diff_eq!(p, q, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_encodes_sparse_table() {
        let table =
            ProbabilityTable::from_probabilities(vec![0.0, 0.1, 0.0, 0.0, 0.4, 0.0, 0.3, 0.2])
                .unwrap();
        let encoder = DistributionEncoder::standalone(&table).unwrap();
        let probs = prepared_probabilities(&encoder);
        for (p, q) in probs.iter().zip(table.probabilities()) {
            assert_abs_diff_eq!(p, q, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_amplitudes_are_real_nonnegative() {
        let table = ProbabilityTable::from_probabilities(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let encoder = DistributionEncoder::standalone(&table).unwrap();
        let state = StateVectorSimulator::new()
            .statevector(&encoder.circuit().unwrap())
            .unwrap();
        for (a, target) in state.amplitudes().iter().zip(table.amplitudes()) {
            assert_abs_diff_eq!(a.re, target, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_single_qubit_base_case() {
        let table = ProbabilityTable::from_probabilities(vec![0.75, 0.25]).unwrap();
        let encoder = DistributionEncoder::standalone(&table).unwrap();
        let circuit = encoder.circuit().unwrap();
        assert_eq!(circuit.gate_count(), 1);
        assert!(matches!(circuit.gates()[0], Gate::Ry(0, _)));

        let point_mass = ProbabilityTable::from_probabilities(vec![1.0, 0.0]).unwrap();
        let circuit = DistributionEncoder::standalone(&point_mass)
            .unwrap()
            .circuit()
            .unwrap();
        assert!(circuit.is_empty());
    }

    #[test]
    fn test_embedded_register_and_inverse() {
        let table = ProbabilityTable::from_probabilities(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let encoder = DistributionEncoder::new(&table, vec![2, 3], 5).unwrap();

        let mut round_trip = encoder.circuit().unwrap();
        round_trip.append(&encoder.inverse().unwrap()).unwrap();
        let state = StateVectorSimulator::new().statevector(&round_trip).unwrap();
        assert_abs_diff_eq!(state.probabilities()[0], 1.0, epsilon = 1e-12);

        // only the value register is touched
        let used = encoder.circuit().unwrap().used_qubits();
        assert!(used.iter().all(|q| *q == 2 || *q == 3));
    }

    #[test]
    fn test_register_mismatch() {
        let table = ProbabilityTable::uniform(2).unwrap();
        assert!(DistributionEncoder::new(&table, vec![0, 1, 2], 3)
            .unwrap_err()
            .is_dimension_error());
        assert!(DistributionEncoder::new(&table, vec![0, 4], 3)
            .unwrap_err()
            .is_dimension_error());
    }
}
