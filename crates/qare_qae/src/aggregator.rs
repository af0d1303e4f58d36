//! Shot aggregation
//!
//! Gantree: L3_QAE → ShotAggregator
//!
//! Workers hand back one phase integer per shot; the aggregator folds them
//! into a histogram and, once every shot is in, turns the histogram into an
//! [`EstimationResult`].

use crate::phase_estimation::{decode, folded_phase};
use qare_core::constants::qae;
use qare_core::numeric::clip_probability;
use qare_core::{QareError, QareResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Resultant length below which the circular mean is undefined
const CIRCULAR_EPSILON: f64 = 1e-12;

// ============================================================================
// Phase Histogram
// ============================================================================

/// Measured phase integer → count, over the full 2^m grid
/// Gantree: PhaseHistogram // 위상 히스토그램
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseHistogram {
    /// Phase register width m
    precision_qubits: usize,

    /// Count per outcome, indexed by j
    counts: Vec<u64>,
}

impl PhaseHistogram {
    /// Empty histogram over 2^m outcomes
    pub fn new(precision_qubits: usize) -> QareResult<Self> {
        if precision_qubits == 0 {
            return Err(QareError::config("precision_qubits must be >= 1"));
        }
        Ok(Self {
            precision_qubits,
            counts: vec![0; 1usize << precision_qubits],
        })
    }

    /// Count one outcome
    /// Gantree: record(j) -> Result // 기록
    pub fn record(&mut self, outcome: usize) -> QareResult<()> {
        let slot = self
            .counts
            .get_mut(outcome)
            .ok_or_else(|| QareError::config(format!("phase outcome {} off the grid", outcome)))?;
        *slot += 1;
        Ok(())
    }

    /// Add another histogram over the same grid
    /// Gantree: merge(&other) -> Result // 병합
    pub fn merge(&mut self, other: &PhaseHistogram) -> QareResult<()> {
        if other.precision_qubits != self.precision_qubits {
            return Err(QareError::TableLengthMismatch {
                len: other.counts.len(),
                expected: self.counts.len(),
            });
        }
        for (mine, theirs) in self.counts.iter_mut().zip(&other.counts) {
            *mine += theirs;
        }
        Ok(())
    }

    /// Phase register width
    pub fn precision_qubits(&self) -> usize {
        self.precision_qubits
    }

    /// Count of outcome j (0 off the grid)
    pub fn count(&self, outcome: usize) -> u64 {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    /// Raw counts, indexed by j
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of recorded shots
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Outcomes seen at least once, with their counts
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(j, &c)| (j, c))
    }

    /// Counts with j and 2^m − j merged onto the folded index min(j, 2^m − j)
    /// Gantree: folded_counts() -> Vec<u64> // 접힌 카운트
    pub fn folded_counts(&self) -> Vec<u64> {
        let size = self.counts.len();
        let mut folded = vec![0; size / 2 + 1];
        for (j, &c) in self.counts.iter().enumerate() {
            folded[j.min(size - j)] += c;
        }
        folded
    }

    /// Most frequent folded outcome; ties go to the smaller phase
    /// Gantree: mode() -> Option<usize> // 최빈값
    pub fn mode(&self) -> Option<usize> {
        if self.total() == 0 {
            return None;
        }
        self.folded_counts()
            .iter()
            .enumerate()
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
            .map(|(j, _)| j)
    }
}

// ============================================================================
// Estimation Result
// ============================================================================

/// Final amplitude estimate with its error budget
/// Gantree: EstimationResult // 추정 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    /// Mean of the per-shot sin²(πφ)
    pub mean_amplitude_estimate: f64,

    /// Sample standard error of that mean
    pub standard_error: f64,

    /// Folded phase of the histogram mode, in [0, 1/2]
    pub mode_phase: f64,

    /// sin²(π·mode_phase)
    pub mode_amplitude_estimate: f64,

    /// |d sin²θ/dθ| at the mean folded θ times the grid spacing π/2^m
    pub discretization_error: f64,

    /// Sampling and discretization error in quadrature
    pub total_error: f64,

    /// Circular mean of the folded phases
    pub circular_phase: f64,

    /// sin²(π·circular_phase)
    pub circular_amplitude: f64,

    /// Shots aggregated
    pub repetitions: usize,

    /// Phase register width
    pub precision_qubits: usize,

    /// Raw outcome histogram (absent when no circuit ran)
    pub histogram: Option<PhaseHistogram>,

    /// True when the tail was exactly 0 or 1 and no circuit ran
    pub short_circuited: bool,
}

impl EstimationResult {
    /// Exact result for a tail of probability 0 or 1
    /// Gantree: degenerate(p, m) -> Self // 퇴화 결과
    pub fn degenerate(probability: f64, precision_qubits: usize) -> Self {
        let value = clip_probability(probability);
        let phase = if value >= 0.5 { 0.5 } else { 0.0 };
        Self {
            mean_amplitude_estimate: value,
            standard_error: 0.0,
            mode_phase: phase,
            mode_amplitude_estimate: value,
            discretization_error: 0.0,
            total_error: 0.0,
            circular_phase: phase,
            circular_amplitude: value,
            repetitions: 0,
            precision_qubits,
            histogram: None,
            short_circuited: true,
        }
    }

    /// (estimate, standard error) pair
    pub fn estimate(&self) -> (f64, f64) {
        (self.mean_amplitude_estimate, self.standard_error)
    }

    /// Interval of `z` total errors around the mean, clipped to [0, 1]
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        let half = z * self.total_error;
        (
            clip_probability(self.mean_amplitude_estimate - half),
            clip_probability(self.mean_amplitude_estimate + half),
        )
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QareResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for EstimationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EstimationResult(mean={:.6} ± {:.6}, mode={:.6}, total_error={:.6}, R={}, m={})",
            self.mean_amplitude_estimate,
            self.standard_error,
            self.mode_amplitude_estimate,
            self.total_error,
            self.repetitions,
            self.precision_qubits
        )
    }
}

// ============================================================================
// Shot Aggregator
// ============================================================================

/// Single-writer reduction of per-shot phase outcomes
/// Gantree: ShotAggregator // 샷 집계기
#[derive(Debug, Clone)]
pub struct ShotAggregator {
    histogram: PhaseHistogram,
}

impl ShotAggregator {
    /// Aggregator for an m-qubit phase register
    pub fn new(precision_qubits: usize) -> QareResult<Self> {
        Ok(Self {
            histogram: PhaseHistogram::new(precision_qubits)?,
        })
    }

    /// Fold one shot's outcome in
    pub fn record(&mut self, outcome: usize) -> QareResult<()> {
        self.histogram.record(outcome)
    }

    /// Fold a batch of outcomes in
    pub fn extend<I: IntoIterator<Item = usize>>(&mut self, outcomes: I) -> QareResult<()> {
        for outcome in outcomes {
            self.record(outcome)?;
        }
        Ok(())
    }

    /// Shots recorded so far
    pub fn shots(&self) -> u64 {
        self.histogram.total()
    }

    /// Current histogram
    pub fn histogram(&self) -> &PhaseHistogram {
        &self.histogram
    }

    /// Consume the histogram into the final estimate
    /// Gantree: finalize(self) -> Result<EstimationResult> // 최종 집계
    pub fn finalize(self) -> QareResult<EstimationResult> {
        let histogram = self.histogram;
        let m = histogram.precision_qubits();
        let total = histogram.total();
        if total == 0 {
            return Err(QareError::config("repetitions must be >= 1"));
        }
        let n = total as f64;

        // mean and sample standard deviation of the per-shot estimates
        let mut sum = 0.0;
        let mut sum_theta = 0.0;
        for (j, c) in histogram.nonzero() {
            sum += c as f64 * decode(j, m);
            sum_theta += c as f64 * folded_phase(j, m) * PI;
        }
        let mean = sum / n;
        let mean_theta = sum_theta / n;

        let standard_error = if total > 1 {
            let ss: f64 = histogram
                .nonzero()
                .map(|(j, c)| c as f64 * (decode(j, m) - mean).powi(2))
                .sum();
            (ss / (n - 1.0)).sqrt() / n.sqrt()
        } else {
            0.0
        };

        let mode = histogram.mode().unwrap_or(0);
        let mode_phase = folded_phase(mode, m);
        let mode_amplitude = decode(mode, m);

        let discretization_error = (2.0 * mean_theta).sin().abs() * qae::phase_grid_spacing(m);
        let total_error = standard_error.hypot(discretization_error);

        let (circular_phase, circular_amplitude) = circular_mean(&histogram, mean_theta / PI);

        Ok(EstimationResult {
            mean_amplitude_estimate: clip_probability(mean),
            standard_error: clip_probability(standard_error),
            mode_phase,
            mode_amplitude_estimate: clip_probability(mode_amplitude),
            discretization_error: clip_probability(discretization_error),
            total_error: clip_probability(total_error),
            circular_phase,
            circular_amplitude: clip_probability(circular_amplitude),
            repetitions: total as usize,
            precision_qubits: m,
            histogram: Some(histogram),
            short_circuited: false,
        })
    }
}

/// Circular mean of the folded phases; the linear mean stands in when the
/// resultant vanishes
fn circular_mean(histogram: &PhaseHistogram, linear_phase: f64) -> (f64, f64) {
    let m = histogram.precision_qubits();
    let (mut s, mut c) = (0.0, 0.0);
    for (j, count) in histogram.nonzero() {
        let alpha = 2.0 * PI * folded_phase(j, m);
        s += count as f64 * alpha.sin();
        c += count as f64 * alpha.cos();
    }

    let phase = if s.hypot(c) < CIRCULAR_EPSILON * histogram.total() as f64 {
        linear_phase
    } else {
        let phi = (s.atan2(c) / (2.0 * PI)).rem_euclid(1.0);
        phi.min(1.0 - phi)
    };
    (phase, (PI * phase).sin().powi(2))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_histogram_record_and_fold() {
        let mut h = PhaseHistogram::new(3).unwrap();
        for j in [1, 7, 7, 3, 5, 4] {
            h.record(j).unwrap();
        }
        assert_eq!(h.total(), 6);
        assert_eq!(h.count(7), 2);
        assert_eq!(h.folded_counts(), vec![0, 3, 0, 2, 1]);
        assert_eq!(h.mode(), Some(1));
        assert!(h.record(8).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_mode_ties_take_smaller_phase() {
        let mut h = PhaseHistogram::new(3).unwrap();
        h.record(3).unwrap();
        h.record(2).unwrap();
        assert_eq!(h.mode(), Some(2));
        assert_eq!(PhaseHistogram::new(2).unwrap().mode(), None);
    }

    #[test]
    fn test_merge() {
        let mut a = PhaseHistogram::new(2).unwrap();
        let mut b = PhaseHistogram::new(2).unwrap();
        a.record(1).unwrap();
        b.record(1).unwrap();
        b.record(2).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.counts(), &[0, 2, 1, 0]);
        assert!(a.merge(&PhaseHistogram::new(3).unwrap()).is_err());
    }

    #[test]
    fn test_single_outcome_has_no_sampling_error() {
        let mut agg = ShotAggregator::new(4).unwrap();
        agg.extend(std::iter::repeat(4).take(10)).unwrap();
        let result = agg.finalize().unwrap();

        // φ = 1/4 → sin²(π/4) = 1/2
        assert_abs_diff_eq!(result.mean_amplitude_estimate, 0.5, epsilon = 1e-12);
        assert_eq!(result.standard_error, 0.0);
        assert_abs_diff_eq!(result.mode_phase, 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(result.circular_phase, 0.25, epsilon = 1e-12);
        // |sin(π/2)|·π/16
        assert_abs_diff_eq!(result.discretization_error, PI / 16.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.total_error, PI / 16.0, epsilon = 1e-12);
        assert_eq!(result.repetitions, 10);
        assert!(!result.short_circuited);
    }

    #[test]
    fn test_sample_standard_error() {
        let mut agg = ShotAggregator::new(2).unwrap();
        // decode: j=0 → 0, j=2 → 1
        agg.extend([0, 2, 0, 2]).unwrap();
        let result = agg.finalize().unwrap();
        assert_abs_diff_eq!(result.mean_amplitude_estimate, 0.5, epsilon = 1e-12);
        // s = √(4·0.25/3), SE = s/2
        let s = (1.0f64 / 3.0).sqrt();
        assert_abs_diff_eq!(result.standard_error, s / 2.0, epsilon = 1e-12);
        // tie between folded 0 and 2 goes to 0
        assert_eq!(result.mode_phase, 0.0);
    }

    #[test]
    fn test_single_shot() {
        let mut agg = ShotAggregator::new(3).unwrap();
        agg.record(4).unwrap();
        let result = agg.finalize().unwrap();
        assert_eq!(result.standard_error, 0.0);
        assert_abs_diff_eq!(result.mean_amplitude_estimate, 1.0, epsilon = 1e-12);
        // sin(2·π/2) = 0
        assert!(result.discretization_error < 1e-12);
    }

    #[test]
    fn test_empty_aggregator_is_rejected() {
        let agg = ShotAggregator::new(3).unwrap();
        assert!(agg.finalize().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_degenerate_and_interval() {
        let zero = EstimationResult::degenerate(0.0, 5);
        assert_eq!(zero.estimate(), (0.0, 0.0));
        assert!(zero.short_circuited);
        assert!(zero.histogram.is_none());

        let one = EstimationResult::degenerate(1.0, 5);
        assert_eq!(one.mode_phase, 0.5);
        assert_eq!(one.confidence_interval(1.96), (1.0, 1.0));

        let mut agg = ShotAggregator::new(2).unwrap();
        agg.extend([1, 1, 3]).unwrap();
        let result = agg.finalize().unwrap();
        let (lo, hi) = result.confidence_interval(1.0);
        assert!(lo <= result.mean_amplitude_estimate && result.mean_amplitude_estimate <= hi);
        assert!((0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi));
    }

    #[test]
    fn test_result_serializes() {
        let mut agg = ShotAggregator::new(2).unwrap();
        agg.extend([1, 2]).unwrap();
        let result = agg.finalize().unwrap();
        let json = result.to_json().unwrap();
        let back: EstimationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.repetitions, 2);
        assert_eq!(back.histogram, result.histogram);
    }
}
