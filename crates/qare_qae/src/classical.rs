//! Classical baseline
//!
//! Gantree: L3_QAE → ClassicalBaseline
//!
//! Exact and sampled tail probabilities on the same discretized table the
//! circuit loads, plus the undiscretized log-normal tail and the
//! samples-versus-queries sweep.

use crate::config::RiskParameters;
use crate::distribution::{log_normal, ProbabilityTable};
use log::debug;
use qare_core::constants::stats;
use qare_core::numeric::clip_probability;
use qare_core::{QareError, QareResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use std::time::Instant;

/// Monte-Carlo tail estimate
/// Gantree: MonteCarloEstimate // 몬테카를로 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloEstimate {
    /// Fraction of samples in the tail
    pub estimate: f64,

    /// √(p(1−p)/N)
    pub std_error: f64,

    /// N
    pub samples: usize,

    /// Wall time in milliseconds
    pub runtime_ms: u64,
}

impl fmt::Display for MonteCarloEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} ± {:.6} (N={})",
            self.estimate, self.std_error, self.samples
        )
    }
}

/// One row of the precision sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrecisionPoint {
    /// Target additive error ε
    pub target: f64,

    /// Classical samples for ε: max(⌈p(1−p)/ε²⌉, floor)
    pub classical_samples: usize,

    /// Amplitude-estimation oracle queries for ε: ⌈1/ε⌉
    pub quantum_queries: usize,

    /// Monte-Carlo run at `classical_samples`, if requested
    pub monte_carlo: Option<MonteCarloEstimate>,
}

impl PrecisionPoint {
    /// classical_samples / quantum_queries
    pub fn advantage_ratio(&self) -> f64 {
        self.classical_samples as f64 / self.quantum_queries.max(1) as f64
    }
}

/// Exact and sampled tail probability over a probability table
/// Gantree: ClassicalBaseline // 고전 기준선
#[derive(Debug, Clone)]
pub struct ClassicalBaseline {
    table: ProbabilityTable,
    threshold: f64,
    cumulative: Vec<f64>,
}

impl ClassicalBaseline {
    /// Baseline over `table` for losses above `threshold`
    pub fn new(table: ProbabilityTable, threshold: f64) -> Self {
        let cumulative = table.cumulative();
        Self {
            table,
            threshold,
            cumulative,
        }
    }

    /// Discretize `risk` and build the baseline
    /// Gantree: from_risk(&RiskParameters) -> Result<Self> // 생성자
    pub fn from_risk(risk: &RiskParameters) -> QareResult<Self> {
        Ok(Self::new(ProbabilityTable::from_risk(risk)?, risk.threshold))
    }

    /// The table sampled from
    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }

    /// Loss threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Exact sum of masses whose value exceeds the threshold
    /// Gantree: analytic_probability() -> f64 // 해석적 확률
    pub fn analytic_probability(&self) -> f64 {
        self.table.tail_probability(self.threshold)
    }

    /// Draw one table index by inverse CDF
    fn sample_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let u: f64 = rng.gen();
        let idx = self.cumulative.partition_point(|&c| c <= u);
        idx.min(self.cumulative.len() - 1)
    }

    /// Monte-Carlo tail estimate from `samples` table draws
    /// Gantree: monte_carlo(N, rng) -> Result<MonteCarloEstimate> // 몬테카를로
    pub fn monte_carlo<R: Rng + ?Sized>(
        &self,
        samples: usize,
        rng: &mut R,
    ) -> QareResult<MonteCarloEstimate> {
        if samples == 0 {
            return Err(QareError::config("monte carlo needs at least one sample"));
        }
        let start = Instant::now();
        let values = self.table.values();
        let hits = (0..samples)
            .filter(|_| values[self.sample_index(rng)] > self.threshold)
            .count();
        let estimate = finish(hits, samples, start);
        debug!("monte carlo: {}", estimate);
        Ok(estimate)
    }

    /// Monte-Carlo estimate with a fixed seed
    pub fn monte_carlo_seeded(&self, samples: usize, seed: u64) -> QareResult<MonteCarloEstimate> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.monte_carlo(samples, &mut rng)
    }

    /// Samples-versus-queries sweep over `targets`, optionally running
    /// Monte-Carlo at each sample size
    /// Gantree: precision_sweep(targets, seed) -> Result<Vec<PrecisionPoint>> // 정밀도 분석
    pub fn precision_sweep(
        &self,
        targets: &[f64],
        seed: Option<u64>,
    ) -> QareResult<Vec<PrecisionPoint>> {
        let p = self.analytic_probability();
        let mut rng = seed.map(ChaCha8Rng::seed_from_u64);

        targets
            .iter()
            .map(|&target| {
                if !(target > 0.0 && target < 1.0) {
                    return Err(QareError::InvalidProbability(target));
                }
                let classical_samples = classical_samples_for(p, target);
                let monte_carlo = match rng.as_mut() {
                    Some(rng) => Some(self.monte_carlo(classical_samples, rng)?),
                    None => None,
                };
                Ok(PrecisionPoint {
                    target,
                    classical_samples,
                    quantum_queries: (1.0 / target).ceil() as usize,
                    monte_carlo,
                })
            })
            .collect()
    }
}

/// Samples needed for additive error ε at tail probability p, floored
pub fn classical_samples_for(probability: f64, target: f64) -> usize {
    let needed = (probability * (1.0 - probability) / (target * target)).ceil() as usize;
    needed.max(stats::MIN_MC_SAMPLES)
}

/// 1 − CDF(threshold) of the undiscretized log-normal
/// Gantree: continuous_tail(&RiskParameters) -> Result<f64> // 연속 꼬리
pub fn continuous_tail(risk: &RiskParameters) -> QareResult<f64> {
    risk.validate()?;
    let dist = log_normal(risk)?;
    Ok(clip_probability(1.0 - dist.cdf(risk.threshold)))
}

/// Monte-Carlo tail of the undiscretized log-normal, exp(μ + σ·z) per draw
pub fn continuous_monte_carlo<R: Rng + ?Sized>(
    risk: &RiskParameters,
    samples: usize,
    rng: &mut R,
) -> QareResult<MonteCarloEstimate> {
    risk.validate()?;
    if samples == 0 {
        return Err(QareError::config("monte carlo needs at least one sample"));
    }
    let normal = Normal::new(risk.mean, risk.std_dev)
        .map_err(|e| QareError::config(format!("normal parameters rejected: {}", e)))?;

    let start = Instant::now();
    let hits = (0..samples)
        .filter(|_| {
            let u: f64 = rng.gen();
            normal.inverse_cdf(u).exp() > risk.threshold
        })
        .count();
    Ok(finish(hits, samples, start))
}

fn finish(hits: usize, samples: usize, start: Instant) -> MonteCarloEstimate {
    let n = samples as f64;
    let p = hits as f64 / n;
    MonteCarloEstimate {
        estimate: p,
        std_error: (p * (1.0 - p) / n).sqrt(),
        samples,
        runtime_ms: start.elapsed().as_millis() as u64,
    }
}

// ============================================================================
// Tests
// ============================================================================
