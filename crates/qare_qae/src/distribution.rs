//! Discretized loss distribution
//!
//! Gantree: L3_QAE → ProbabilityTable
//!
//! The continuous log-normal loss is cut into 2^n equal-width bins over
//! `[0, exp(mean + k·σ)]`. Each bin carries its CDF mass and is represented
//! by its midpoint; the last bin also absorbs everything above the support.

use crate::config::RiskParameters;
use log::debug;
use qare_core::constants::stats;
use qare_core::{QareError, QareResult};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, LogNormal};

/// Probability mass per basis index plus the loss each index decodes to
/// Gantree: ProbabilityTable // 확률 테이블
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityTable {
    /// Mass per index, sums to 1
    probabilities: Vec<f64>,

    /// Decoded loss per index
    values: Vec<f64>,
}

impl ProbabilityTable {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Discretize the log-normal described by `risk`
    /// Gantree: from_risk(&RiskParameters) -> Result<Self> // 이산화
    pub fn from_risk(risk: &RiskParameters) -> QareResult<Self> {
        risk.validate()?;
        let dist = log_normal(risk)?;

        let bins = risk.table_len();
        let upper = risk.support_upper();
        let width = upper / bins as f64;

        let mut probabilities = Vec::with_capacity(bins);
        let mut values = Vec::with_capacity(bins);
        for i in 0..bins {
            let lo = i as f64 * width;
            let hi = lo + width;
            let mass = if i + 1 == bins {
                1.0 - dist.cdf(lo)
            } else {
                dist.cdf(hi) - dist.cdf(lo)
            };
            probabilities.push(mass.max(0.0));
            values.push(lo + width / 2.0);
        }

        let table = Self::normalized(probabilities, values)?;
        debug!(
            "discretized {} into {} bins over [0, {:.4}]",
            risk,
            bins,
            upper
        );
        Ok(table)
    }

    /// Build from raw masses; values default to the index itself
    /// Gantree: from_probabilities(Vec<f64>) -> Result<Self> // 직접 입력
    pub fn from_probabilities(probabilities: Vec<f64>) -> QareResult<Self> {
        let values = (0..probabilities.len()).map(|i| i as f64).collect();
        Self::with_values(probabilities, values)
    }

    /// Build from raw masses and explicit decoded values
    pub fn with_values(probabilities: Vec<f64>, values: Vec<f64>) -> QareResult<Self> {
        let len = probabilities.len();
        if len < 2 || !len.is_power_of_two() {
            return Err(QareError::TableLengthMismatch {
                len,
                expected: len.next_power_of_two().max(2),
            });
        }
        if values.len() != len {
            return Err(QareError::TableLengthMismatch {
                len: values.len(),
                expected: len,
            });
        }
        if let Some(&bad) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(QareError::InvalidProbability(bad));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(QareError::config("table values must be finite"));
        }
        Self::normalized(probabilities, values)
    }

    /// Uniform table over 2^n entries
    pub fn uniform(num_qubits: usize) -> QareResult<Self> {
        if num_qubits == 0 {
            return Err(QareError::config("table needs at least one qubit"));
        }
        let len = 1usize << num_qubits;
        Self::from_probabilities(vec![1.0 / len as f64; len])
    }

    fn normalized(mut probabilities: Vec<f64>, values: Vec<f64>) -> QareResult<Self> {
        let total: f64 = probabilities.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Err(QareError::ZeroMassDistribution);
        }
        if (total - 1.0).abs() > stats::TABLE_SUM_TOLERANCE {
            debug!("renormalizing table with total mass {}", total);
        }
        for p in &mut probabilities {
            *p /= total;
        }
        Ok(Self {
            probabilities,
            values,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of entries (2^n)
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Value-register width n
    pub fn num_qubits(&self) -> usize {
        self.probabilities.len().trailing_zeros() as usize
    }

    /// Mass per index
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Decoded loss per index
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Target amplitudes √p
    pub fn amplitudes(&self) -> Vec<f64> {
        self.probabilities.iter().map(|p| p.sqrt()).collect()
    }

    /// Running sums of the masses (last entry is 1)
    pub fn cumulative(&self) -> Vec<f64> {
        self.probabilities
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect()
    }

    /// True when decoded values never decrease with index
    pub fn is_monotone(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }

    /// Expected loss of the discretized distribution
    pub fn mean(&self) -> f64 {
        self.probabilities
            .iter()
            .zip(&self.values)
            .map(|(p, v)| p * v)
            .sum()
    }

    /// Exact mass of entries whose value exceeds `threshold`
    /// Gantree: tail_probability(t) -> f64 // 꼬리 확률
    pub fn tail_probability(&self, threshold: f64) -> f64 {
        let tail: f64 = self
            .probabilities
            .iter()
            .zip(&self.values)
            .filter(|(_, &v)| v > threshold)
            .map(|(p, _)| p)
            .sum();
        tail.min(1.0)
    }
}

/// statrs log-normal for the risk model
pub(crate) fn log_normal(risk: &RiskParameters) -> QareResult<LogNormal> {
    LogNormal::new(risk.mean, risk.std_dev)
        .map_err(|e| QareError::config(format!("log-normal parameters rejected: {}", e)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_risk_shape() {
        let table = ProbabilityTable::from_risk(&RiskParameters::default()).unwrap();
        assert_eq!(table.len(), 16);
        assert_eq!(table.num_qubits(), 4);
        assert_abs_diff_eq!(table.probabilities().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(table.probabilities().iter().all(|&p| p >= 0.0));
        assert!(table.is_monotone());
        assert!(table.values().windows(2).all(|w| w[0] < w[1]));
        assert_abs_diff_eq!(*table.cumulative().last().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bin_midpoints() {
        let table = ProbabilityTable::from_risk(&RiskParameters::default()).unwrap();
        let width = 3.0f64.exp() / 16.0;
        assert_abs_diff_eq!(table.values()[0], width / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(table.values()[15], 15.5 * width, epsilon = 1e-12);
    }

    #[test]
    fn test_default_tail() {
        // bins 2.. lie above 2.5, so the tail is 1 - CDF(2·width)
        let table = ProbabilityTable::from_risk(&RiskParameters::default()).unwrap();
        assert_abs_diff_eq!(table.tail_probability(2.5), 0.17864, epsilon = 5e-4);

        let width = 3.0f64.exp() / 16.0;
        let dist = log_normal(&RiskParameters::default()).unwrap();
        assert_abs_diff_eq!(
            table.tail_probability(2.5),
            1.0 - dist.cdf(2.0 * width),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_tail_beyond_support_is_zero() {
        let table = ProbabilityTable::from_risk(&RiskParameters::default()).unwrap();
        assert_eq!(table.tail_probability(1000.0), 0.0);
        assert_abs_diff_eq!(table.tail_probability(-1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_probabilities_validation() {
        assert!(matches!(
            ProbabilityTable::from_probabilities(vec![0.5, 0.3, 0.2]),
            Err(QareError::TableLengthMismatch { len: 3, expected: 4 })
        ));
        assert_eq!(
            ProbabilityTable::from_probabilities(vec![0.0; 4]),
            Err(QareError::ZeroMassDistribution)
        );
        assert_eq!(
            ProbabilityTable::from_probabilities(vec![0.5, -0.1]),
            Err(QareError::InvalidProbability(-0.1))
        );
        assert!(ProbabilityTable::with_values(vec![0.5, 0.5], vec![1.0]).is_err());
    }

    #[test]
    fn test_renormalizes() {
        let table = ProbabilityTable::from_probabilities(vec![2.0, 2.0, 4.0, 0.0]).unwrap();
        assert_eq!(table.probabilities(), &[0.25, 0.25, 0.5, 0.0]);
        assert_eq!(table.values(), &[0.0, 1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(table.mean(), 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(table.tail_probability(1.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform() {
        let table = ProbabilityTable::uniform(1).unwrap();
        assert_eq!(table.probabilities(), &[0.5, 0.5]);
        assert!(ProbabilityTable::uniform(0).is_err());
    }
}
