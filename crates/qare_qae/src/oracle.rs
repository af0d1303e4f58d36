//! Tail oracle
//!
//! Gantree: L3_QAE → TailOracle
//!
//! Marks every value-register basis state whose decoded loss exceeds the
//! threshold. The predicate is a plain bit mask over indices; the gate form
//! depends on the chosen [`OracleStrategy`].
//!
//! The comparator form needs the marked set to be a suffix `index >= cutoff`
//! and relies on the marker qubit sitting in |−⟩ so that an X on the marker
//! becomes a −1 phase on the marked states.

use crate::config::OracleStrategy;
use crate::distribution::ProbabilityTable;
use qare_core::{Circuit, Gate, QareError, QareResult, QubitId};
use serde::{Deserialize, Serialize};

/// Marked-index predicate over a 2^n value register
/// Gantree: TailOracle // 꼬리 오라클
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TailOracle {
    /// Value-register width n
    num_value_qubits: usize,

    /// marked[i] ⇔ index i is in the tail
    marked: Vec<bool>,
}

impl TailOracle {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Mark entries of `table` whose value exceeds `threshold`
    /// Gantree: from_table(table, t) -> Self // 테이블 기반
    pub fn from_table(table: &ProbabilityTable, threshold: f64) -> Self {
        Self {
            num_value_qubits: table.num_qubits(),
            marked: table.values().iter().map(|&v| v > threshold).collect(),
        }
    }

    /// Mark `index >= cutoff` (cutoff may equal 2^n for an empty tail)
    pub fn from_cutoff(num_value_qubits: usize, cutoff: usize) -> QareResult<Self> {
        let len = Self::check_width(num_value_qubits)?;
        if cutoff > len {
            return Err(QareError::config(format!(
                "cutoff {} exceeds table length {}",
                cutoff, len
            )));
        }
        Ok(Self {
            num_value_qubits,
            marked: (0..len).map(|i| i >= cutoff).collect(),
        })
    }

    /// Mark indices satisfying an arbitrary predicate
    pub fn from_predicate<F>(num_value_qubits: usize, predicate: F) -> QareResult<Self>
    where
        F: Fn(usize) -> bool,
    {
        let len = Self::check_width(num_value_qubits)?;
        Ok(Self {
            num_value_qubits,
            marked: (0..len).map(predicate).collect(),
        })
    }

    /// Mark exactly one index
    /// Gantree: single(n, i) -> Result<Self> // 단일 패턴
    pub fn single(num_value_qubits: usize, index: usize) -> QareResult<Self> {
        let len = Self::check_width(num_value_qubits)?;
        if index >= len {
            return Err(QareError::config(format!(
                "index {} outside {}-entry table",
                index, len
            )));
        }
        Self::from_predicate(num_value_qubits, |i| i == index)
    }

    /// Mark every index
    pub fn all(num_value_qubits: usize) -> QareResult<Self> {
        Self::from_cutoff(num_value_qubits, 0)
    }

    fn check_width(num_value_qubits: usize) -> QareResult<usize> {
        if num_value_qubits == 0 || num_value_qubits >= usize::BITS as usize {
            return Err(QareError::config(format!(
                "oracle width {} out of range",
                num_value_qubits
            )));
        }
        Ok(1usize << num_value_qubits)
    }

    // ========================================================================
    // Predicate Queries
    // ========================================================================

    /// Value-register width
    pub fn num_value_qubits(&self) -> usize {
        self.num_value_qubits
    }

    /// Whether `index` is marked
    pub fn is_marked(&self, index: usize) -> bool {
        self.marked.get(index).copied().unwrap_or(false)
    }

    /// Marked indices in ascending order
    pub fn marked_indices(&self) -> Vec<usize> {
        self.marked
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of marked indices
    pub fn marked_count(&self) -> usize {
        self.marked.iter().filter(|&&m| m).count()
    }

    /// Cutoff c with marked ⇔ index >= c, if the marked set is a suffix
    /// Gantree: cutoff(&self) -> Option<usize> // 컷오프
    pub fn cutoff(&self) -> Option<usize> {
        let cutoff = self.marked.iter().position(|&m| m).unwrap_or(self.marked.len());
        if self.marked[cutoff..].iter().all(|&m| m) {
            Some(cutoff)
        } else {
            None
        }
    }

    /// Exact mass of the marked entries
    /// Gantree: analytic_probability(table) -> f64 // 해석적 확률
    pub fn analytic_probability(&self, table: &ProbabilityTable) -> f64 {
        let p: f64 = table
            .probabilities()
            .iter()
            .zip(&self.marked)
            .filter(|(_, &m)| m)
            .map(|(p, _)| p)
            .sum();
        p.min(1.0)
    }

    /// Exactly 0 or 1 when the marked or the unmarked set carries no mass
    ///
    /// Decided on the masses, not on their rounded sum.
    /// Gantree: degenerate_value(table) -> Option<f64> // 퇴화 판정
    pub fn degenerate_value(&self, table: &ProbabilityTable) -> Option<f64> {
        let (mut marked, mut unmarked) = (0.0, 0.0);
        for (p, &m) in table.probabilities().iter().zip(&self.marked) {
            if m {
                marked += p;
            } else {
                unmarked += p;
            }
        }
        if marked == 0.0 {
            Some(0.0)
        } else if unmarked == 0.0 {
            Some(1.0)
        } else {
            None
        }
    }

    // ========================================================================
    // Circuit Construction
    // ========================================================================

    /// Gate form of the oracle
    ///
    /// `value_qubits` are most significant first; `marker` must be prepared
    /// in |−⟩ for the comparator form.
    /// Gantree: circuit(strategy, qs, marker, n) -> Result<Circuit> // 오라클 회로
    pub fn circuit(
        &self,
        strategy: OracleStrategy,
        value_qubits: &[QubitId],
        marker: QubitId,
        num_qubits: usize,
    ) -> QareResult<Circuit> {
        if value_qubits.len() != self.num_value_qubits {
            return Err(QareError::TableLengthMismatch {
                len: self.marked.len(),
                expected: 1usize << value_qubits.len(),
            });
        }
        let mut circuit = Circuit::with_name(num_qubits, "O");
        match strategy {
            OracleStrategy::Enumerate => self.enumerate(&mut circuit, value_qubits)?,
            OracleStrategy::Comparator => {
                let cutoff = self.cutoff().ok_or_else(|| {
                    QareError::config("comparator oracle needs a contiguous tail")
                })?;
                self.comparator(&mut circuit, value_qubits, marker, cutoff)?
            }
        }
        Ok(circuit)
    }

    /// Phase flip per marked index: X-conjugate the zero bits, then MCZ
    fn enumerate(&self, circuit: &mut Circuit, value_qubits: &[QubitId]) -> QareResult<()> {
        let n = value_qubits.len();
        for index in self.marked_indices() {
            let zeros: Vec<QubitId> = (0..n)
                .filter(|&k| (index >> (n - 1 - k)) & 1 == 0)
                .map(|k| value_qubits[k])
                .collect();
            circuit.add_gates(zeros.iter().map(|&q| Gate::X(q)))?;
            circuit.add_gate(phase_flip_all(value_qubits)?)?;
            circuit.add_gates(zeros.iter().map(|&q| Gate::X(q)))?;
        }
        Ok(())
    }

    /// `index > cutoff - 1` as at most n disjoint prefix patterns
    ///
    /// With t = cutoff - 1, index > t exactly when for some bit k we have
    /// t_k = 0, index_k = 1 and index agrees with t above k.
    fn comparator(
        &self,
        circuit: &mut Circuit,
        value_qubits: &[QubitId],
        marker: QubitId,
        cutoff: usize,
    ) -> QareResult<()> {
        let n = value_qubits.len();
        if cutoff == 0 {
            return circuit.add_gate(Gate::X(marker));
        }
        if cutoff == 1usize << n {
            return Ok(());
        }

        let t = cutoff - 1;
        let bit = |k: usize| (t >> (n - 1 - k)) & 1 == 1;
        for k in (0..n).filter(|&k| !bit(k)) {
            let flips: Vec<QubitId> = (0..k).filter(|&j| !bit(j)).map(|j| value_qubits[j]).collect();
            circuit.add_gates(flips.iter().map(|&q| Gate::X(q)))?;
            circuit.add_gate(Gate::Mcx(value_qubits[..=k].to_vec(), marker))?;
            circuit.add_gates(flips.iter().map(|&q| Gate::X(q)))?;
        }
        Ok(())
    }
}

/// −1 on |1…1⟩ of `qubits` (plain Z for a single qubit)
pub(crate) fn phase_flip_all(qubits: &[QubitId]) -> QareResult<Gate> {
    match qubits.split_last() {
        Some((&target, [])) => Ok(Gate::Z(target)),
        Some((&target, controls)) => Ok(Gate::Mcz(controls.to_vec(), target)),
        None => Err(QareError::config("phase flip over an empty register")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use num_complex::Complex64;
    use qare_sim::QuantumRegister;

    /// Uniform superposition on the value register, marker in |−⟩, oracle,
    /// then the sign of every value basis state.
    fn sign_pattern(oracle: &TailOracle, strategy: OracleStrategy) -> Vec<f64> {
        let n = oracle.num_value_qubits();
        let value: Vec<QubitId> = (0..n).collect();
        let marker = n;
        let mut reg = QuantumRegister::allocate(n + 1).unwrap();
        for &q in &value {
            reg.apply(&Gate::H(q)).unwrap();
        }
        reg.apply(&Gate::X(marker)).unwrap();
        reg.apply(&Gate::H(marker)).unwrap();
        for gate in oracle.circuit(strategy, &value, marker, n + 1).unwrap().gates() {
            reg.apply(gate).unwrap();
        }
        // amplitude on (index, marker = 0) carries the sign
        (0..1usize << n)
            .map(|i| reg.amplitudes()[i << 1].re.signum())
            .collect()
    }

    #[test]
    fn test_strategies_agree_up_to_8_qubits() {
        for n in 1..=8usize {
            let len = 1usize << n;
            let cutoffs = [0, 1, len / 3, len / 2, len - 1, len];
            for &cutoff in &cutoffs {
                let oracle = TailOracle::from_cutoff(n, cutoff).unwrap();
                let enumerate = sign_pattern(&oracle, OracleStrategy::Enumerate);
                let comparator = sign_pattern(&oracle, OracleStrategy::Comparator);
                assert_eq!(enumerate, comparator, "n={} cutoff={}", n, cutoff);
                for (i, s) in enumerate.iter().enumerate() {
                    let expected = if i >= cutoff { -1.0 } else { 1.0 };
                    assert_eq!(*s, expected, "n={} cutoff={} index={}", n, cutoff, i);
                }
            }
        }
    }

    #[test]
    fn test_strategies_identical_states() {
        // full amplitude comparison on a non-uniform value state
        let n = 3;
        let oracle = TailOracle::from_cutoff(n, 5).unwrap();
        let prepare = |reg: &mut QuantumRegister| {
            reg.apply(&Gate::Ry(0, 0.7)).unwrap();
            reg.apply(&Gate::Ry(1, 1.9)).unwrap();
            reg.apply(&Gate::Ry(2, 2.3)).unwrap();
            reg.apply(&Gate::X(3)).unwrap();
            reg.apply(&Gate::H(3)).unwrap();
        };
        let mut states = Vec::new();
        for strategy in [OracleStrategy::Enumerate, OracleStrategy::Comparator] {
            let mut reg = QuantumRegister::allocate(4).unwrap();
            prepare(&mut reg);
            for gate in oracle.circuit(strategy, &[0, 1, 2], 3, 4).unwrap().gates() {
                reg.apply(gate).unwrap();
            }
            states.push(reg.amplitudes().to_vec());
        }
        for (a, b) in states[0].iter().zip(&states[1]) {
            assert!((a - b).norm() < 1e-12, "{} vs {}", a, b);
        }
        assert!(states[0].iter().any(|a| *a != Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_comparator_gate_count_linear() {
        let oracle = TailOracle::from_cutoff(8, 77).unwrap();
        let circuit = oracle
            .circuit(OracleStrategy::Comparator, &(0..8).collect::<Vec<_>>(), 8, 9)
            .unwrap();
        // at most n MCX plus their X conjugations
        let mcx = circuit.gates().iter().filter(|g| matches!(g, Gate::Mcx(_, _))).count();
        assert!(mcx <= 8);
        assert!(circuit.gate_count() <= 8 + 2 * 8 * 8);
    }

    #[test]
    fn test_from_table_matches_threshold() {
        let table = ProbabilityTable::from_probabilities(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let oracle = TailOracle::from_table(&table, 1.5);
        assert_eq!(oracle.marked_indices(), vec![2, 3]);
        assert_eq!(oracle.cutoff(), Some(2));
        assert_abs_diff_eq!(oracle.analytic_probability(&table), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_cutoff_extremes() {
        assert_eq!(TailOracle::all(3).unwrap().cutoff(), Some(0));
        assert_eq!(TailOracle::from_cutoff(3, 8).unwrap().cutoff(), Some(8));
        assert_eq!(TailOracle::from_cutoff(3, 8).unwrap().marked_count(), 0);
        assert!(TailOracle::from_cutoff(3, 9).is_err());

        let all = TailOracle::all(2).unwrap();
        let circuit = all.circuit(OracleStrategy::Comparator, &[0, 1], 2, 3).unwrap();
        assert_eq!(circuit.gates(), &[Gate::X(2)]);
        let none = TailOracle::from_cutoff(2, 4).unwrap();
        assert!(none
            .circuit(OracleStrategy::Comparator, &[0, 1], 2, 3)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_single_and_non_contiguous() {
        let single = TailOracle::single(3, 5).unwrap();
        assert_eq!(single.marked_indices(), vec![5]);
        assert_eq!(single.cutoff(), None);
        assert!(TailOracle::single(3, 8).is_err());
        assert!(single
            .circuit(OracleStrategy::Comparator, &[0, 1, 2], 3, 4)
            .unwrap_err()
            .is_configuration_error());

        let circuit = single
            .circuit(OracleStrategy::Enumerate, &[0, 1, 2], 3, 4)
            .unwrap();
        // index 5 = 101: one X pair around the middle qubit
        assert_eq!(
            circuit.gates(),
            &[Gate::X(1), Gate::Mcz(vec![0, 1], 2), Gate::X(1)]
        );
    }

    #[test]
    fn test_width_mismatch() {
        let oracle = TailOracle::all(2).unwrap();
        assert!(oracle
            .circuit(OracleStrategy::Enumerate, &[0, 1, 2], 3, 4)
            .unwrap_err()
            .is_dimension_error());
    }

    #[test]
    fn test_degenerate_value() {
        let table = ProbabilityTable::from_probabilities(vec![0.3, 0.7, 0.0, 0.0]).unwrap();
        assert_eq!(TailOracle::from_cutoff(2, 2).unwrap().degenerate_value(&table), Some(0.0));
        assert_eq!(TailOracle::from_cutoff(2, 0).unwrap().degenerate_value(&table), Some(1.0));
        assert_eq!(TailOracle::from_cutoff(2, 1).unwrap().degenerate_value(&table), None);

        let point = ProbabilityTable::from_probabilities(vec![0.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(TailOracle::from_cutoff(2, 2).unwrap().degenerate_value(&point), Some(1.0));
    }
}
