//! Pipeline for staged tail-risk estimation
//!
//! Gantree: L4_Integration → RiskPipeline
//!
//! discretize → build_circuit → estimate → compare, each stage keeping its
//! output so callers can stop, inspect and resume.

use crate::config::QareConfig;
use crate::ensemble::{Ensemble, EnsembleSummary};
use log::info;
use qare_core::constants::sim;
use qare_core::QareResult;
use qare_qae::{
    continuous_tail, ClassicalBaseline, EstimationResult, MonteCarloEstimate, OracleStrategy,
    PrecisionPoint, ProbabilityTable, QaeConfig, QaeEngine, RiskParameters, TailOracle,
};
use qare_sim::StateVectorSimulator;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Nothing run yet
    Initial,
    /// Probability table built
    Discretized,
    /// Estimation circuit built
    CircuitBuilt,
    /// Quantum estimate available
    Estimated,
    /// Classical comparison available
    Compared,
}

/// Size of the estimation circuit
/// Gantree: CircuitMetrics // 자원 지표
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitMetrics {
    /// m + n + 1
    pub logical_qubits: usize,

    /// Phase register width m
    pub precision_qubits: usize,

    /// Value register width n
    pub loss_qubits: usize,

    /// 2^(m+n+1) amplitudes per shot
    pub state_vector_len: usize,

    /// Controlled-G applications per shot (2^m − 1)
    pub grover_applications: usize,

    /// Gates in the full circuit
    pub gate_count: usize,

    /// Circuit depth
    pub depth: usize,

    /// Gates carrying at least one control
    pub controlled_gates: usize,

    /// Largest control set on one gate
    pub max_controls: usize,

    /// Requested oracle construction
    pub oracle_strategy: OracleStrategy,
}

/// Exact, continuous and sampled classical tail probabilities
/// Gantree: BaselineComparison // 고전 비교
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineComparison {
    /// Exact tail of the discretized table
    pub analytic_probability: f64,

    /// 1 − CDF(threshold) of the log-normal itself
    pub continuous_probability: f64,

    /// Monte-Carlo draw from the table
    pub monte_carlo: MonteCarloEstimate,

    /// Samples-versus-queries sweep
    pub precision_sweep: Vec<PrecisionPoint>,
}

/// Everything one pipeline run produces
/// Gantree: RiskReport // 리포트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Loss model
    pub parameters: RiskParameters,

    /// Estimation schedule
    pub schedule: QaeConfig,

    /// Quantum estimate
    pub quantum: EstimationResult,

    /// Exact tail of the discretized table
    pub analytic_probability: f64,

    /// Undiscretized log-normal tail
    pub continuous_probability: f64,

    /// Monte-Carlo baseline
    pub monte_carlo: MonteCarloEstimate,

    /// quantum mean − analytic
    pub difference: f64,

    /// Circuit size
    pub resources: CircuitMetrics,

    /// Samples-versus-queries sweep
    pub precision_sweep: Vec<PrecisionPoint>,

    /// Mark-everything circuit result
    pub sanity: Option<EstimationResult>,

    /// Repeated-estimate summary when more than one run was requested
    pub ensemble: Option<EnsembleSummary>,

    /// Wall time of the whole run
    pub total_time_ms: u64,
}

impl RiskReport {
    /// Whether the analytic tail lies within `z` total errors of the estimate
    pub fn within_error(&self, z: f64) -> bool {
        self.difference.abs() <= z * self.quantum.total_error
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> QareResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Intermediate results
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Current stage
    pub stage: PipelineStage,

    /// Configuration
    pub config: QareConfig,

    /// Discretized loss distribution
    pub table: Option<ProbabilityTable>,

    /// Circuit size
    pub circuit: Option<CircuitMetrics>,

    /// Quantum estimate
    pub estimate: Option<EstimationResult>,

    /// Classical comparison
    pub baseline: Option<BaselineComparison>,
}

impl PipelineState {
    /// Fresh state
    pub fn new(config: QareConfig) -> Self {
        Self {
            stage: PipelineStage::Initial,
            config,
            table: None,
            circuit: None,
            estimate: None,
            baseline: None,
        }
    }

    /// Check if discretized
    pub fn is_discretized(&self) -> bool {
        self.table.is_some()
    }

    /// Check if the circuit was built
    pub fn has_circuit(&self) -> bool {
        self.circuit.is_some()
    }

    /// Check if estimated
    pub fn is_estimated(&self) -> bool {
        self.estimate.is_some()
    }
}

/// Staged tail-risk pipeline on the state-vector simulator
/// Gantree: RiskPipeline // 단계별 실행
pub struct RiskPipeline {
    state: PipelineState,
}

impl RiskPipeline {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Pipeline for a configuration
    pub fn new(config: QareConfig) -> Self {
        Self {
            state: PipelineState::new(config),
        }
    }

    /// Pipeline with the default tail-risk configuration
    pub fn default_tail() -> Self {
        Self::new(QareConfig::default_tail())
    }

    // ========================================================================
    // Stage Accessors
    // ========================================================================

    /// Current stage
    pub fn stage(&self) -> PipelineStage {
        self.state.stage
    }

    /// Current state
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Configuration
    pub fn config(&self) -> &QareConfig {
        &self.state.config
    }

    fn engine(&self) -> QareResult<QaeEngine<StateVectorSimulator>> {
        QaeEngine::new(self.state.config.to_qae_config(), StateVectorSimulator::new())
    }

    // ========================================================================
    // Pipeline Stages
    // ========================================================================

    /// Stage 1: validate and discretize
    pub fn discretize(&mut self) -> QareResult<&ProbabilityTable> {
        self.state.config.validate()?;
        let table = ProbabilityTable::from_risk(&self.state.config.to_risk_parameters())?;
        info!("pipeline: discretized into {} bins", table.len());
        self.state.stage = PipelineStage::Discretized;
        Ok(self.state.table.insert(table))
    }

    /// Stage 2: build the estimation circuit and record its size
    pub fn build_circuit(&mut self) -> QareResult<&CircuitMetrics> {
        let table = match self.state.table.take() {
            Some(table) => table,
            None => self.discretize()?.clone(),
        };
        let oracle = TailOracle::from_table(&table, self.state.config.threshold);
        let built = self
            .engine()
            .and_then(|engine| engine.build_circuit(&table, &oracle));
        self.state.table = Some(table);
        let (estimator, circuit) = built?;

        let n = estimator.logical_qubits();
        let metrics = CircuitMetrics {
            logical_qubits: n,
            precision_qubits: estimator.precision_qubits(),
            loss_qubits: self.state.config.loss_qubits,
            state_vector_len: sim::dimension(n),
            grover_applications: estimator.grover_applications(),
            gate_count: circuit.gate_count(),
            depth: circuit.depth(),
            controlled_gates: circuit.count_controlled(),
            max_controls: circuit.max_controls(),
            oracle_strategy: self.state.config.oracle_strategy,
        };
        info!(
            "pipeline: circuit with {} qubits, {} gates, depth {}",
            metrics.logical_qubits, metrics.gate_count, metrics.depth
        );
        self.state.stage = PipelineStage::CircuitBuilt;
        Ok(self.state.circuit.insert(metrics))
    }

    /// Stage 3: quantum estimate
    pub fn estimate(&mut self) -> QareResult<&EstimationResult> {
        self.state.config.validate()?;
        let result = self
            .engine()?
            .estimate(&self.state.config.to_risk_parameters())?;
        info!("pipeline: {}", result);
        self.state.stage = PipelineStage::Estimated;
        Ok(self.state.estimate.insert(result))
    }

    /// Stage 4: classical comparison
    pub fn compare(&mut self) -> QareResult<&BaselineComparison> {
        let config = &self.state.config;
        config.validate()?;
        let risk = config.to_risk_parameters();
        let baseline = ClassicalBaseline::from_risk(&risk)?;

        let monte_carlo = match config.seed {
            Some(seed) => baseline.monte_carlo_seeded(config.monte_carlo_samples, seed)?,
            None => baseline.monte_carlo(config.monte_carlo_samples, &mut rand::thread_rng())?,
        };
        let sweep_seed = if config.sweep_monte_carlo {
            Some(config.seed.unwrap_or_else(rand::random))
        } else {
            None
        };

        let comparison = BaselineComparison {
            analytic_probability: baseline.analytic_probability(),
            continuous_probability: continuous_tail(&risk)?,
            monte_carlo,
            precision_sweep: baseline.precision_sweep(&config.precision_targets, sweep_seed)?,
        };
        info!(
            "pipeline: analytic {:.6}, monte carlo {}",
            comparison.analytic_probability, comparison.monte_carlo
        );
        self.state.stage = PipelineStage::Compared;
        Ok(self.state.baseline.insert(comparison))
    }

    /// Run every stage and assemble the report
    /// Gantree: run() -> Result<RiskReport> // 전체 실행
    pub fn run(&mut self) -> QareResult<RiskReport> {
        let start = Instant::now();

        self.discretize()?;
        let resources = self.build_circuit()?.clone();
        let quantum = self.estimate()?.clone();
        let baseline = self.compare()?.clone();

        let config = &self.state.config;
        let sanity = if config.run_sanity_check {
            Some(self.engine()?.sanity_check()?)
        } else {
            None
        };
        let ensemble = if config.ensemble_runs > 1 {
            Some(Ensemble::new(config.clone())?.run()?)
        } else {
            None
        };

        Ok(RiskReport {
            parameters: config.to_risk_parameters(),
            schedule: config.to_qae_config(),
            difference: quantum.mean_amplitude_estimate - baseline.analytic_probability,
            quantum,
            analytic_probability: baseline.analytic_probability,
            continuous_probability: baseline.continuous_probability,
            monte_carlo: baseline.monte_carlo,
            resources,
            precision_sweep: baseline.precision_sweep,
            sanity,
            ensemble,
            total_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Reset to the initial stage
    pub fn reset(&mut self) {
        let config = self.state.config.clone();
        self.state = PipelineState::new(config);
    }

    /// Reset with a new configuration
    pub fn reconfigure(&mut self, config: QareConfig) {
        self.state = PipelineState::new(config);
    }
}

// ============================================================================
// Tests
// ============================================================================
