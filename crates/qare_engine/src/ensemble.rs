//! Repeated quantum estimates
//!
//! Gantree: L4_Integration → Ensemble
//!
//! Runs the full estimate several times with seeds drawn from the master
//! seed and summarizes the spread between runs.

use crate::config::QareConfig;
use log::info;
use qare_core::{QareError, QareResult};
use qare_qae::{EstimationResult, PhaseHistogram, ProbabilityTable, QaeEngine};
use qare_sim::StateVectorSimulator;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spread of the quantum estimate across independent runs
/// Gantree: EnsembleSummary // 앙상블 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSummary {
    /// Number of runs
    pub runs: usize,

    /// Per-run mean amplitude estimates
    pub estimates: Vec<f64>,

    /// Mean of the estimates
    pub mean_estimate: f64,

    /// Population standard deviation of the estimates
    pub std_deviation: f64,

    /// std_deviation / √runs
    pub std_error: f64,

    /// Mean of the per-run total errors
    pub mean_reported_error: f64,

    /// Mean of estimate − analytic
    pub mean_difference: f64,

    /// Mean circular amplitude
    pub mean_circular_amplitude: f64,

    /// Mean circular phase
    pub mean_circular_phase: f64,

    /// All runs' outcomes on one grid (absent when no circuit ran)
    pub merged_histogram: Option<PhaseHistogram>,
}

impl EnsembleSummary {
    /// Summarize finished runs against the analytic tail
    /// Gantree: from_results(results, analytic) -> Result<Self> // 요약
    pub fn from_results(results: &[EstimationResult], analytic: f64) -> QareResult<Self> {
        if results.is_empty() {
            return Err(QareError::config("ensemble needs at least one run"));
        }
        let runs = results.len();
        let n = runs as f64;
        let estimates: Vec<f64> = results.iter().map(|r| r.mean_amplitude_estimate).collect();
        let mean_estimate = estimates.iter().sum::<f64>() / n;
        let variance = estimates
            .iter()
            .map(|e| (e - mean_estimate).powi(2))
            .sum::<f64>()
            / n;
        let std_deviation = variance.sqrt();

        let mut merged_histogram: Option<PhaseHistogram> = None;
        for histogram in results.iter().filter_map(|r| r.histogram.as_ref()) {
            match merged_histogram.as_mut() {
                Some(merged) => merged.merge(histogram)?,
                None => merged_histogram = Some(histogram.clone()),
            }
        }

        let mean_of = |f: fn(&EstimationResult) -> f64| results.iter().map(f).sum::<f64>() / n;

        Ok(Self {
            runs,
            mean_estimate,
            std_deviation,
            std_error: std_deviation / n.sqrt(),
            mean_reported_error: mean_of(|r| r.total_error),
            mean_difference: mean_estimate - analytic,
            mean_circular_amplitude: mean_of(|r| r.circular_amplitude),
            mean_circular_phase: mean_of(|r| r.circular_phase),
            merged_histogram,
            estimates,
        })
    }

    /// Ratio of the observed spread to the mean reported error
    pub fn calibration_ratio(&self) -> f64 {
        if self.mean_reported_error > 0.0 {
            self.std_deviation / self.mean_reported_error
        } else {
            0.0
        }
    }
}

impl fmt::Display for EnsembleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ensemble({} runs: {:.6} ± {:.6}, sd={:.6}, reported={:.6})",
            self.runs, self.mean_estimate, self.std_error, self.std_deviation, self.mean_reported_error
        )
    }
}

/// Repeats the quantum estimate with derived seeds
/// Gantree: Ensemble // 앙상블
pub struct Ensemble {
    config: QareConfig,
}

impl Ensemble {
    /// Ensemble for a validated configuration
    pub fn new(config: QareConfig) -> QareResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration
    pub fn config(&self) -> &QareConfig {
        &self.config
    }

    /// One seed per run, drawn from the master seed
    pub fn run_seeds(&self) -> Vec<u64> {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        (0..self.config.ensemble_runs).map(|_| rng.next_u64()).collect()
    }

    /// Run every member and summarize
    /// Gantree: run() -> Result<EnsembleSummary> // 실행
    pub fn run(&self) -> QareResult<EnsembleSummary> {
        let risk = self.config.to_risk_parameters();
        let analytic = ProbabilityTable::from_risk(&risk)?.tail_probability(risk.threshold);

        let results = self
            .run_seeds()
            .into_iter()
            .map(|seed| {
                let qae = self.config.to_qae_config().with_seed(seed);
                QaeEngine::new(qae, StateVectorSimulator::new())?.estimate(&risk)
            })
            .collect::<QareResult<Vec<_>>>()?;

        let summary = EnsembleSummary::from_results(&results, analytic)?;
        info!("{}", summary);
        Ok(summary)
    }
}

// ============================================================================
// Tests
// ============================================================================
