//! State vector and gate engine
//!
//! Gantree: L2_Simulation → QuantumRegister
//!
//! A register of N qubits is a dense array of 2^N complex amplitudes. Qubit 0
//! is the most significant bit of the basis index, so qubit `q` owns bit
//! `N - 1 - q`.
//!
//! # Cost
//!
//! Every gate application sweeps the whole array: O(2^N) time, with a
//! per-index mask test for controlled gates. Memory is 16 · 2^N bytes.

use num_complex::Complex64;
use qare_core::constants::sim;
use qare_core::{Gate, QareError, QareResult, QubitId};
use rand::Rng;
use std::collections::HashSet;
use std::f64::consts::FRAC_1_SQRT_2;

/// Dense state vector over N qubits
/// Gantree: QuantumRegister // 상태 벡터
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumRegister {
    /// Number of qubits
    num_qubits: usize,

    /// Amplitudes indexed by basis state
    amplitudes: Vec<Complex64>,
}

impl QuantumRegister {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Allocate N qubits in |0…0⟩
    /// Gantree: allocate(n) -> Result<Self> // 할당
    pub fn allocate(num_qubits: usize) -> QareResult<Self> {
        if num_qubits == 0 {
            return Err(QareError::config("register needs at least one qubit"));
        }
        if num_qubits > sim::MAX_QUBITS {
            return Err(QareError::RegisterTooLarge {
                num_qubits,
                max: sim::MAX_QUBITS,
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); sim::dimension(num_qubits)];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Build from explicit amplitudes (normalized on the way in)
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> QareResult<Self> {
        let len = amplitudes.len();
        if len < 2 || !len.is_power_of_two() {
            return Err(QareError::TableLengthMismatch {
                len,
                expected: len.next_power_of_two().max(2),
            });
        }
        let num_qubits = len.trailing_zeros() as usize;
        if num_qubits > sim::MAX_QUBITS {
            return Err(QareError::RegisterTooLarge {
                num_qubits,
                max: sim::MAX_QUBITS,
            });
        }
        let norm = amplitudes.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(QareError::ZeroMassDistribution);
        }
        Ok(Self {
            num_qubits,
            amplitudes: amplitudes.into_iter().map(|a| a / norm).collect(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of amplitudes (2^N)
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Borrow the amplitudes
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// L2 norm of the state
    /// Gantree: norm(&self) -> f64 // 노름
    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(|a| a.norm_sqr())
            .sum::<f64>()
            .sqrt()
    }

    /// Squared magnitude of every basis state
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Probability that `qubit` reads 1
    pub fn probability_of_ones(&self, qubit: QubitId) -> QareResult<f64> {
        self.check_qubits(&[qubit])?;
        let mask = self.mask(qubit);
        Ok(self
            .amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum())
    }

    #[inline]
    fn mask(&self, qubit: QubitId) -> usize {
        1usize << (self.num_qubits - 1 - qubit)
    }

    fn check_qubits(&self, qubits: &[QubitId]) -> QareResult<()> {
        let mut seen = HashSet::new();
        for &qubit in qubits {
            if qubit >= self.num_qubits {
                return Err(QareError::QubitOutOfRange {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
            if !seen.insert(qubit) {
                return Err(QareError::DuplicateQubit(qubit));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Unitary Application
    // ========================================================================

    /// Apply a unitary gate
    /// Gantree: apply(&mut, &Gate) -> Result // 게이트 적용
    pub fn apply(&mut self, gate: &Gate) -> QareResult<()> {
        gate.validate(self.num_qubits)?;
        self.apply_masked(gate, 0)
    }

    /// Apply `gate` on the subspace where every bit of `ctrl` is set
    fn apply_masked(&mut self, gate: &Gate, ctrl: usize) -> QareResult<()> {
        match gate {
            Gate::H(q) => self.apply_single_qubit_gate(*q, ctrl, |a, b| {
                ((a + b) * FRAC_1_SQRT_2, (a - b) * FRAC_1_SQRT_2)
            }),
            Gate::X(q) => self.apply_single_qubit_gate(*q, ctrl, |a, b| (b, a)),
            Gate::Z(q) => self.apply_single_qubit_gate(*q, ctrl, |a, b| (a, -b)),
            Gate::Ry(q, angle) => {
                let c = (angle / 2.0).cos();
                let s = (angle / 2.0).sin();
                self.apply_single_qubit_gate(*q, ctrl, |a, b| (a * c - b * s, a * s + b * c))
            }
            Gate::R1(q, angle) => {
                let phase = Complex64::from_polar(1.0, *angle);
                self.apply_single_qubit_gate(*q, ctrl, |a, b| (a, b * phase))
            }
            Gate::Swap(q1, q2) => self.apply_swap(*q1, *q2, ctrl),
            Gate::Cnot(c, t) => {
                let mask = ctrl | self.mask(*c);
                return self.apply_masked(&Gate::X(*t), mask);
            }
            Gate::Cz(c, t) => {
                let mask = ctrl | self.mask(*c);
                return self.apply_masked(&Gate::Z(*t), mask);
            }
            Gate::Mcx(cs, t) => {
                let mask = ctrl | self.control_mask(cs);
                return self.apply_masked(&Gate::X(*t), mask);
            }
            Gate::Mcz(cs, t) => {
                let mask = ctrl | self.control_mask(cs);
                return self.apply_masked(&Gate::Z(*t), mask);
            }
            Gate::Controlled(cs, inner) => {
                let mask = ctrl | self.control_mask(cs);
                return self.apply_masked(inner, mask);
            }
            Gate::Measure(_) | Gate::Reset(_) => {
                return Err(QareError::NonUnitary(gate.name().into()))
            }
        }
        Ok(())
    }

    fn control_mask(&self, controls: &[QubitId]) -> usize {
        controls.iter().fold(0, |acc, &c| acc | self.mask(c))
    }

    fn apply_single_qubit_gate<F>(&mut self, q: QubitId, ctrl: usize, f: F)
    where
        F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
    {
        let mask = self.mask(q);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 && i & ctrl == ctrl {
                let j = i | mask;
                let (new_i, new_j) = f(self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = new_i;
                self.amplitudes[j] = new_j;
            }
        }
    }

    fn apply_swap(&mut self, q1: QubitId, q2: QubitId, ctrl: usize) {
        let mask1 = self.mask(q1);
        let mask2 = self.mask(q2);
        for i in 0..self.amplitudes.len() {
            // visit each (10, 01) pair once, from the side where q1 is set
            if i & ctrl == ctrl && i & mask1 != 0 && i & mask2 == 0 {
                self.amplitudes.swap(i, i ^ mask1 ^ mask2);
            }
        }
    }

    // ========================================================================
    // Measurement
    // ========================================================================

    /// Jointly measure `qubits`, collapse and renormalize
    ///
    /// Returns one bit per listed qubit, in list order.
    /// Gantree: measure(&mut, qs, rng) -> Result<Vec<bool>> // 측정+붕괴
    pub fn measure<R: Rng + ?Sized>(
        &mut self,
        qubits: &[QubitId],
        rng: &mut R,
    ) -> QareResult<Vec<bool>> {
        self.check_qubits(qubits)?;
        if qubits.is_empty() {
            return Ok(Vec::new());
        }
        let masks: Vec<usize> = qubits.iter().map(|&q| self.mask(q)).collect();
        let outcome_of = |i: usize| -> usize {
            masks
                .iter()
                .fold(0usize, |acc, &m| (acc << 1) | usize::from(i & m != 0))
        };

        let mut weights = vec![0.0f64; 1usize << qubits.len()];
        for (i, a) in self.amplitudes.iter().enumerate() {
            weights[outcome_of(i)] += a.norm_sqr();
        }

        let total: f64 = weights.iter().sum();
        let r = rng.gen::<f64>() * total;
        let mut cumsum = 0.0;
        let mut outcome = None;
        for (k, &w) in weights.iter().enumerate() {
            if w <= 0.0 {
                continue;
            }
            cumsum += w;
            outcome = Some(k);
            if r < cumsum {
                break;
            }
        }
        let outcome = outcome.ok_or(QareError::ZeroMassDistribution)?;

        let scale = 1.0 / weights[outcome].sqrt();
        for (i, a) in self.amplitudes.iter_mut().enumerate() {
            if outcome_of(i) == outcome {
                *a *= scale;
            } else {
                *a = Complex64::new(0.0, 0.0);
            }
        }

        let width = qubits.len();
        Ok((0..width)
            .map(|k| (outcome >> (width - 1 - k)) & 1 == 1)
            .collect())
    }

    /// Measure `qubits` and flip every one that read 1, leaving them in |0⟩
    /// Gantree: reset(&mut, qs, rng) -> Result // 초기화
    pub fn reset<R: Rng + ?Sized>(&mut self, qubits: &[QubitId], rng: &mut R) -> QareResult<()> {
        let bits = self.measure(qubits, rng)?;
        for (&q, bit) in qubits.iter().zip(bits) {
            if bit {
                self.apply_masked(&Gate::X(q), 0)?;
            }
        }
        Ok(())
    }

    /// Run a gate as part of a circuit; measurements return their bits
    pub fn execute<R: Rng + ?Sized>(
        &mut self,
        gate: &Gate,
        rng: &mut R,
    ) -> QareResult<Option<Vec<bool>>> {
        match gate {
            Gate::Measure(qs) => self.measure(qs, rng).map(Some),
            Gate::Reset(qs) => self.reset(qs, rng).map(|_| None),
            unitary => self.apply(unitary).map(|_| None),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
