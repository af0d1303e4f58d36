//! Amplitude-estimation engine
//!
//! Gantree: L3_QAE → QaeEngine
//!
//! Validates, discretizes, builds the phase-estimation circuit once, then runs
//! it shot by shot on a backend. Every shot starts from a fresh register and
//! draws from its own ChaCha stream of the base seed, so the histogram does
//! not depend on how shots are spread over workers.

use crate::aggregator::{EstimationResult, ShotAggregator};
use crate::config::{OracleStrategy, QaeConfig, RiskParameters};
use crate::distribution::ProbabilityTable;
use crate::encoder::DistributionEncoder;
use crate::oracle::TailOracle;
use crate::phase_estimation::PhaseEstimator;
use log::{debug, info, warn};
use qare_core::constants::sim;
use qare_core::{Bitstring, Circuit, QareError, QareResult};
use qare_sim::Backend;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::thread;
use std::time::Instant;

/// Runs amplitude estimation on a backend
/// Gantree: QaeEngine<B> // QAE 엔진
pub struct QaeEngine<B: Backend> {
    /// Schedule
    config: QaeConfig,

    /// Shot executor
    backend: B,
}

impl<B: Backend> QaeEngine<B> {
    /// Engine with a validated schedule
    /// Gantree: new(config, backend) -> Result<Self> // 생성자
    pub fn new(config: QaeConfig, backend: B) -> QareResult<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// Schedule
    pub fn config(&self) -> &QaeConfig {
        &self.config
    }

    /// Backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ========================================================================
    // Estimation
    // ========================================================================

    /// Tail probability of the log-normal loss above `risk.threshold`
    ///
    /// An analytic tail of exactly 0 or 1 comes back as a degenerate result
    /// without touching the backend.
    /// Gantree: estimate(&RiskParameters) -> Result<EstimationResult> // 추정
    pub fn estimate(&self, risk: &RiskParameters) -> QareResult<EstimationResult> {
        risk.validate()?;
        self.config
            .validate_for(risk.loss_qubits, self.backend.max_qubits())?;

        let table = ProbabilityTable::from_risk(risk)?;
        let oracle = TailOracle::from_table(&table, risk.threshold);

        if let Some(exact) = oracle.degenerate_value(&table) {
            info!(
                "tail probability is exactly {}; skipping circuit execution",
                exact
            );
            return Ok(EstimationResult::degenerate(
                exact,
                self.config.precision_qubits,
            ));
        }

        self.estimate_table(&table, &oracle)
    }

    /// Run the circuit for an explicit table and oracle, extremes included
    /// Gantree: estimate_table(table, oracle) -> Result<EstimationResult> // 테이블 추정
    pub fn estimate_table(
        &self,
        table: &ProbabilityTable,
        oracle: &TailOracle,
    ) -> QareResult<EstimationResult> {
        self.config
            .validate_for(table.num_qubits(), self.backend.max_qubits())?;

        let start = Instant::now();
        let (estimator, circuit) = self.build_circuit(table, oracle)?;
        let result = self
            .run_shots(&circuit, estimator.precision_qubits())?
            .finalize()?;

        info!(
            "qae: estimate {:.6} ± {:.6} (mode {:.6}) from {} shots in {} ms",
            result.mean_amplitude_estimate,
            result.total_error,
            result.mode_amplitude_estimate,
            result.repetitions,
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    /// 1-qubit uniform prior with every outcome marked; should decode to 1
    /// Gantree: sanity_check() -> Result<EstimationResult> // 검증 회로
    pub fn sanity_check(&self) -> QareResult<EstimationResult> {
        let table = ProbabilityTable::uniform(1)?;
        let oracle = TailOracle::all(1)?;
        let result = self.estimate_table(&table, &oracle)?;
        if result.mean_amplitude_estimate < 0.99 {
            warn!(
                "sanity circuit decoded to {:.6} instead of 1",
                result.mean_amplitude_estimate
            );
        }
        Ok(result)
    }

    // ========================================================================
    // Circuit & Shots
    // ========================================================================

    /// Phase-estimation circuit for `table` and `oracle`
    /// Gantree: build_circuit(table, oracle) -> Result<(PhaseEstimator, Circuit)>
    pub fn build_circuit(
        &self,
        table: &ProbabilityTable,
        oracle: &TailOracle,
    ) -> QareResult<(PhaseEstimator, Circuit)> {
        let estimator = PhaseEstimator::new(self.config.precision_qubits, table.num_qubits())?;
        let n = estimator.logical_qubits();
        let value = estimator.value_register();

        let strategy = match (self.config.oracle_strategy, oracle.cutoff()) {
            (OracleStrategy::Comparator, None) => {
                debug!("marked set is not a contiguous tail; enumerating it instead");
                OracleStrategy::Enumerate
            }
            (strategy, _) => strategy,
        };

        let encoder = DistributionEncoder::new(table, value.clone(), n)?;
        let oracle_circuit = oracle.circuit(strategy, &value, estimator.marker(), n)?;
        let circuit = estimator.build(&encoder, &oracle_circuit)?;

        if n > sim::INTERACTIVE_QUBITS {
            warn!(
                "{} logical qubits: every gate touches {} amplitudes",
                n,
                sim::dimension(n)
            );
        }
        debug!(
            "built {} oracle, {} logical qubits, {} Grover applications per shot",
            strategy,
            n,
            estimator.grover_applications()
        );
        Ok((estimator, circuit))
    }

    /// Run `repetitions` shots across the worker threads and fold the
    /// measured phase integers into an aggregator
    /// Gantree: run_shots(circuit, m) -> Result<ShotAggregator> // 샷 실행
    pub fn run_shots(&self, circuit: &Circuit, precision_qubits: usize) -> QareResult<ShotAggregator> {
        let shots = self.config.repetitions;
        if shots == 0 {
            return Err(QareError::config("repetitions must be >= 1"));
        }
        let base_seed = self.config.seed.unwrap_or_else(rand::random);
        let workers = self.config.workers.clamp(1, shots);
        debug!(
            "running {} shots on {} with {} worker(s), base seed {}",
            shots,
            self.backend.name(),
            workers,
            base_seed
        );

        let per_worker: Vec<QareResult<Vec<usize>>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    scope.spawn(move || {
                        (w..shots)
                            .step_by(workers)
                            .map(|shot| self.run_one(circuit, base_seed, shot, precision_qubits))
                            .collect::<QareResult<Vec<usize>>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(QareError::ExecutionFailed("shot worker panicked".to_string()))
                    })
                })
                .collect()
        });

        let mut aggregator = ShotAggregator::new(precision_qubits)?;
        for outcomes in per_worker {
            aggregator.extend(outcomes?)?;
        }
        Ok(aggregator)
    }

    fn run_one(
        &self,
        circuit: &Circuit,
        base_seed: u64,
        shot: usize,
        precision_qubits: usize,
    ) -> QareResult<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
        rng.set_stream(shot as u64);
        let bits = self.backend.run_shot(circuit, &mut rng)?;
        if bits.len() != precision_qubits {
            return Err(QareError::ExecutionFailed(format!(
                "shot {} returned {} bits, expected {}",
                shot,
                bits.len(),
                precision_qubits
            )));
        }
        Ok(Bitstring::new(bits).to_usize())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use qare_sim::{ExecutionResult, StateVectorSimulator};
    use rand::RngCore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Simulator wrapper that counts shots
    struct CountingBackend {
        inner: StateVectorSimulator,
        shots: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                inner: StateVectorSimulator::new(),
                shots: AtomicUsize::new(0),
            }
        }

        fn shots(&self) -> usize {
            self.shots.load(Ordering::SeqCst)
        }
    }

    impl Backend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn max_qubits(&self) -> usize {
            self.inner.max_qubits()
        }

        fn run_shot(&self, circuit: &Circuit, rng: &mut dyn RngCore) -> QareResult<Vec<bool>> {
            self.shots.fetch_add(1, Ordering::SeqCst);
            self.inner.run_shot(circuit, rng)
        }

        fn execute(&self, circuit: &Circuit, shots: u64) -> QareResult<ExecutionResult> {
            self.inner.execute(circuit, shots)
        }
    }

    fn engine(m: usize, reps: usize, seed: u64) -> QaeEngine<StateVectorSimulator> {
        let config = QaeConfig::new(m, reps).with_seed(seed);
        QaeEngine::new(config, StateVectorSimulator::new()).unwrap()
    }

    #[test]
    fn test_default_risk_estimate() {
        let risk = RiskParameters::new(4, 2.5, 0.0, 1.0);
        let analytic = ProbabilityTable::from_risk(&risk)
            .unwrap()
            .tail_probability(2.5);

        let result = engine(5, 20, 2024).estimate(&risk).unwrap();
        assert!(
            (result.mean_amplitude_estimate - analytic).abs() < 0.15,
            "estimate {} vs analytic {}",
            result.mean_amplitude_estimate,
            analytic
        );
        assert_eq!(result.repetitions, 20);
        assert_eq!(result.histogram.as_ref().unwrap().total(), 20);
        assert!(!result.short_circuited);
        assert!(result.total_error >= result.standard_error);
    }

    #[test]
    fn test_empty_tail_skips_circuit() {
        let risk = RiskParameters::new(4, 1000.0, 0.0, 1.0);
        let config = QaeConfig::new(5, 20).with_seed(1);
        let engine = QaeEngine::new(config, CountingBackend::new()).unwrap();

        let result = engine.estimate(&risk).unwrap();
        assert_eq!(result.estimate(), (0.0, 0.0));
        assert!(result.short_circuited);
        assert_eq!(engine.backend().shots(), 0);

        let full = engine.estimate(&risk.with_threshold(-1.0)).unwrap();
        assert_eq!(full.estimate(), (1.0, 0.0));
        assert_eq!(engine.backend().shots(), 0);
    }

    #[test]
    fn test_mark_everything_decodes_to_one() {
        for strategy in [OracleStrategy::Comparator, OracleStrategy::Enumerate] {
            let config = QaeConfig::new(4, 10)
                .with_seed(3)
                .with_oracle_strategy(strategy);
            let engine = QaeEngine::new(config, StateVectorSimulator::new()).unwrap();
            let result = engine.sanity_check().unwrap();
            assert_abs_diff_eq!(result.mean_amplitude_estimate, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(result.mode_phase, 0.5, epsilon = 1e-12);
            assert_eq!(result.histogram.as_ref().unwrap().count(8), 10);
        }
    }

    #[test]
    fn test_exact_phase_is_recovered() {
        // a = 1/2 gives θ = π/4, φ = 1/4: outcomes 2^(m-2) and 3·2^(m-2) only
        let table = ProbabilityTable::from_probabilities(vec![0.25, 0.25, 0.25, 0.25]).unwrap();
        let oracle = TailOracle::from_cutoff(2, 2).unwrap();
        let result = engine(3, 30, 9).estimate_table(&table, &oracle).unwrap();
        let histogram = result.histogram.as_ref().unwrap();
        assert_eq!(histogram.count(2) + histogram.count(6), 30);
        assert_abs_diff_eq!(result.mean_amplitude_estimate, 0.5, epsilon = 1e-9);
        assert!(result.standard_error < 1e-12);
    }

    #[test]
    fn test_standard_error_halves_with_four_times_the_shots() {
        // a = 1/4 is off the m = 3 grid, so outcomes spread
        let table = ProbabilityTable::uniform(2).unwrap();
        let oracle = TailOracle::from_cutoff(2, 3).unwrap();
        let mean_se = |reps: usize| -> f64 {
            (0..16u64)
                .map(|seed| {
                    engine(3, reps, 100 + seed)
                        .estimate_table(&table, &oracle)
                        .unwrap()
                        .standard_error
                })
                .sum::<f64>()
                / 16.0
        };
        let ratio = mean_se(100) / mean_se(25);
        assert!((0.35..=0.7).contains(&ratio), "ratio {}", ratio);
    }

    #[test]
    fn test_worker_count_does_not_change_outcomes() {
        let risk = RiskParameters::new(3, 2.5, 0.0, 1.0);
        let run = |workers: usize| {
            let config = QaeConfig::new(4, 24).with_seed(77).with_workers(workers);
            QaeEngine::new(config, StateVectorSimulator::new())
                .unwrap()
                .estimate(&risk)
                .unwrap()
        };
        let single = run(1);
        for workers in [2, 3, 8, 64] {
            let parallel = run(workers);
            assert_eq!(single.histogram, parallel.histogram);
            assert_eq!(single.mean_amplitude_estimate, parallel.mean_amplitude_estimate);
        }
    }

    #[test]
    fn test_strategies_agree_under_fixed_seed() {
        let risk = RiskParameters::new(3, 2.5, 0.0, 1.0);
        let run = |strategy| {
            let config = QaeConfig::new(4, 16)
                .with_seed(5)
                .with_oracle_strategy(strategy);
            QaeEngine::new(config, StateVectorSimulator::new())
                .unwrap()
                .estimate(&risk)
                .unwrap()
        };
        let a = run(OracleStrategy::Comparator);
        let b = run(OracleStrategy::Enumerate);
        assert_eq!(a.histogram, b.histogram);
    }

    #[test]
    fn test_invalid_inputs_fail_before_any_shot() {
        let engine = QaeEngine::new(QaeConfig::new(5, 10), CountingBackend::new()).unwrap();

        let err = engine.estimate(&RiskParameters::new(0, 2.5, 0.0, 1.0)).unwrap_err();
        assert!(err.is_configuration_error());

        let err = engine.estimate(&RiskParameters::new(4, 2.5, 0.0, -1.0)).unwrap_err();
        assert!(err.is_configuration_error());

        // 5 + 20 + 1 qubits exceeds the simulator ceiling
        let err = engine.estimate(&RiskParameters::new(20, 2.5, 0.0, 1.0)).unwrap_err();
        assert!(err.is_dimension_error());

        assert_eq!(engine.backend().shots(), 0);
        assert!(QaeEngine::new(QaeConfig::new(5, 0), StateVectorSimulator::new()).is_err());
        assert!(QaeEngine::new(QaeConfig::new(0, 10), StateVectorSimulator::new()).is_err());
    }

    #[test]
    fn test_single_index_oracle_falls_back_to_enumeration() {
        let table = ProbabilityTable::uniform(2).unwrap();
        let oracle = TailOracle::single(2, 1).unwrap();
        let result = engine(4, 12, 8).estimate_table(&table, &oracle).unwrap();
        assert_eq!(result.repetitions, 12);
        assert!((0.0..=1.0).contains(&result.mean_amplitude_estimate));
    }
}
