//! Phase estimation scheduler
//!
//! Gantree: L3_QAE → PhaseEstimator
//!
//! Register layout: precision qubits `0..m`, value qubits `m..m+n`, marker
//! `m+n`. Precision qubit j drives controlled-G^(2^(m-1-j)); the inverse QFT
//! then leaves the eigenphase of G, as a fraction of a turn, in the precision
//! register. G has eigenphases ±2θ, so the two outcomes j and 2^m − j carry
//! the same amplitude and decoding folds them together.

use crate::encoder::DistributionEncoder;
use crate::grover::GroverOperator;
use log::debug;
use qare_core::constants::qae;
use qare_core::{Circuit, Gate, QareError, QareResult, QubitId};
use std::f64::consts::PI;

/// Builds and decodes the amplitude-estimation circuit
/// Gantree: PhaseEstimator // 위상 추정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseEstimator {
    /// Phase register width m
    precision_qubits: usize,

    /// Value register width n
    loss_qubits: usize,
}

impl PhaseEstimator {
    /// Layout for m precision and n value qubits
    pub fn new(precision_qubits: usize, loss_qubits: usize) -> QareResult<Self> {
        if precision_qubits == 0 || loss_qubits == 0 {
            return Err(QareError::config(
                "phase estimation needs at least one precision and one value qubit",
            ));
        }
        Ok(Self {
            precision_qubits,
            loss_qubits,
        })
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Phase register width m
    pub fn precision_qubits(&self) -> usize {
        self.precision_qubits
    }

    /// Precision qubits 0..m
    pub fn precision_register(&self) -> Vec<QubitId> {
        (0..self.precision_qubits).collect()
    }

    /// Value qubits m..m+n
    pub fn value_register(&self) -> Vec<QubitId> {
        (self.precision_qubits..self.precision_qubits + self.loss_qubits).collect()
    }

    /// Phase-kickback marker qubit
    pub fn marker(&self) -> QubitId {
        self.precision_qubits + self.loss_qubits
    }

    /// Total register width m + n + 1
    /// Gantree: logical_qubits() -> usize // 논리 큐비트
    pub fn logical_qubits(&self) -> usize {
        qae::logical_qubits(self.loss_qubits, self.precision_qubits)
    }

    /// Controlled-G applications per shot (2^m − 1)
    pub fn grover_applications(&self) -> usize {
        qae::grover_applications(self.precision_qubits)
    }

    // ========================================================================
    // Circuit
    // ========================================================================

    /// Full estimation circuit ending in a joint measurement of the precision
    /// register
    /// Gantree: build(encoder, oracle) -> Result<Circuit> // QPE 회로
    pub fn build(&self, encoder: &DistributionEncoder, oracle: &Circuit) -> QareResult<Circuit> {
        let n = self.logical_qubits();
        if encoder.value_qubits() != self.value_register().as_slice() {
            return Err(QareError::config("encoder is not laid out on the value register"));
        }
        let precision = self.precision_register();
        let marker = self.marker();
        let grover = GroverOperator::new(encoder, oracle)?;

        let mut circuit = Circuit::with_name(n, "qae");
        circuit.add_gates(precision.iter().map(|&q| Gate::H(q)))?;
        circuit.append(&encoder.circuit()?)?;
        circuit.add_gates([Gate::X(marker), Gate::H(marker)])?;

        for (j, &control) in precision.iter().enumerate() {
            let power = 1usize << (self.precision_qubits - 1 - j);
            circuit.append(&grover.controlled_power(control, power)?)?;
        }

        circuit.append(&inverse_qft(&precision, n)?)?;
        circuit.add_gate(Gate::Measure(precision))?;

        debug!(
            "qae circuit: {} qubits, {} gates, {} controlled, G has {} gates",
            n,
            circuit.gate_count(),
            circuit.count_controlled(),
            grover.gate_count()
        );
        Ok(circuit)
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Folded phase min(φ, 1 − φ) of outcome j, in [0, 1/2]
    pub fn folded_phase(&self, outcome: usize) -> f64 {
        folded_phase(outcome, self.precision_qubits)
    }

    /// Amplitude estimate sin²(π·φ) of outcome j
    /// Gantree: decode(j) -> f64 // 복호화
    pub fn decode(&self, outcome: usize) -> f64 {
        decode(outcome, self.precision_qubits)
    }
}

/// Folded phase of outcome `j` on an m-qubit register
pub fn folded_phase(outcome: usize, precision_qubits: usize) -> f64 {
    let size = (1u64 << precision_qubits) as f64;
    let phi = (outcome as f64 / size).rem_euclid(1.0);
    phi.min(1.0 - phi)
}

/// sin²(π·φ) with φ the folded phase of `j`
pub fn decode(outcome: usize, precision_qubits: usize) -> f64 {
    let theta = folded_phase(outcome, precision_qubits) * PI;
    theta.sin().powi(2).clamp(0.0, 1.0)
}

/// Quantum Fourier transform on `qubits` (first qubit most significant)
/// Gantree: qft(qs, n) -> Result<Circuit> // QFT
pub fn qft(qubits: &[QubitId], num_qubits: usize) -> QareResult<Circuit> {
    let k = qubits.len();
    let mut circuit = Circuit::with_name(num_qubits, "qft");
    for i in 0..k {
        circuit.add_gate(Gate::H(qubits[i]))?;
        for j in 1..k - i {
            let angle = 2.0 * PI / (1u64 << (j + 1)) as f64;
            circuit.add_gate(Gate::R1(qubits[i], angle).controlled_by(&[qubits[i + j]])?)?;
        }
    }
    for i in 0..k / 2 {
        circuit.add_gate(Gate::Swap(qubits[i], qubits[k - 1 - i]))?;
    }
    Ok(circuit)
}

/// Inverse QFT on `qubits`
pub fn inverse_qft(qubits: &[QubitId], num_qubits: usize) -> QareResult<Circuit> {
    qft(qubits, num_qubits)?.inverse()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qare_sim::QuantumRegister;

    #[test]
    fn test_layout() {
        let pe = PhaseEstimator::new(5, 4).unwrap();
        assert_eq!(pe.precision_register(), vec![0, 1, 2, 3, 4]);
        assert_eq!(pe.value_register(), vec![5, 6, 7, 8]);
        assert_eq!(pe.marker(), 9);
        assert_eq!(pe.logical_qubits(), 10);
        assert_eq!(pe.grover_applications(), 31);
        assert!(PhaseEstimator::new(0, 4).is_err());
    }

    #[test]
    fn test_decode_symmetry() {
        for m in 1..=8 {
            let size = 1usize << m;
            for j in 0..size {
                let mirrored = (size - j) % size;
                assert_abs_diff_eq!(decode(j, m), decode(mirrored, m), epsilon = 1e-12);
                assert!((0.0..=0.5).contains(&folded_phase(j, m)));
            }
        }
    }

    #[test]
    fn test_decode_values() {
        assert_eq!(decode(0, 3), 0.0);
        assert_abs_diff_eq!(decode(4, 3), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(decode(2, 3), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(decode(6, 3), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_qft_of_basis_state() {
        // QFT|x⟩ has uniform magnitudes and phases e^{2πi·x·k/2^n}
        let n = 3;
        let x = 5usize;
        let mut reg = QuantumRegister::allocate(n).unwrap();
        for q in 0..n {
            if (x >> (n - 1 - q)) & 1 == 1 {
                reg.apply(&Gate::X(q)).unwrap();
            }
        }
        for g in qft(&[0, 1, 2], n).unwrap().gates() {
            reg.apply(g).unwrap();
        }
        let size = 1usize << n;
        let scale = 1.0 / (size as f64).sqrt();
        for (k, amp) in reg.amplitudes().iter().enumerate() {
            let angle = 2.0 * PI * (x * k) as f64 / size as f64;
            assert_abs_diff_eq!(amp.re, scale * angle.cos(), epsilon = 1e-12);
            assert_abs_diff_eq!(amp.im, scale * angle.sin(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_inverse_qft_recovers_phase() {
        // prepare Σ_k e^{2πi·φ·k}|k⟩ with φ = 3/8 and read it back
        let n = 3;
        let mut reg = QuantumRegister::allocate(n).unwrap();
        for q in 0..n {
            reg.apply(&Gate::H(q)).unwrap();
            // qubit q has weight 2^(n-1-q)
            let weight = (1usize << (n - 1 - q)) as f64;
            reg.apply(&Gate::R1(q, 2.0 * PI * 3.0 / 8.0 * weight)).unwrap();
        }
        for g in inverse_qft(&[0, 1, 2], n).unwrap().gates() {
            reg.apply(g).unwrap();
        }
        assert_abs_diff_eq!(reg.probabilities()[3], 1.0, epsilon = 1e-12);
    }
}
