//! Backend execution types and traits
//!
//! Gantree: L2_Simulation → BackendTrait
//!
//! Defines the interface the amplitude-estimation engine runs circuits
//! through, and the counts container returned by batched execution.

use qare_core::{Bitstring, Circuit, Counts, QareResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Result of circuit execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts (bitstring -> count)
    pub counts: Counts,

    /// Number of shots executed
    pub shots: u64,

    /// Execution metadata
    pub metadata: ExecutionMetadata,
}

/// Execution metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    /// Backend name
    pub backend: String,

    /// Execution time in milliseconds
    pub execution_time_ms: Option<u64>,

    /// Whether simulation was used
    pub simulated: bool,

    /// Seed used (if any)
    pub seed: Option<u64>,

    /// Additional info
    pub extra: HashMap<String, String>,
}

impl ExecutionResult {
    /// Create new execution result
    pub fn new(counts: Counts, shots: u64, backend: &str) -> Self {
        Self {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: backend.to_string(),
                simulated: true,
                ..Default::default()
            },
        }
    }

    /// Get total count (should equal shots)
    pub fn total_counts(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Get probability of a specific bitstring
    pub fn probability(&self, bitstring: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        let count = self.counts.get(bitstring).copied().unwrap_or(0);
        count as f64 / self.shots as f64
    }

    /// Get most frequent bitstring (ties broken by smallest bitstring)
    pub fn most_frequent(&self) -> Option<(&String, u64)> {
        self.counts
            .iter()
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
            .map(|(bs, &count)| (bs, count))
    }

    /// Counts keyed by integer outcome (first bit most significant)
    /// Gantree: outcome_counts() -> BTreeMap<usize,u64> // 정수 키 카운트
    pub fn outcome_counts(&self) -> BTreeMap<usize, u64> {
        let mut out = BTreeMap::new();
        for (bitstring, &count) in &self.counts {
            if let Ok(bits) = Bitstring::parse(bitstring) {
                *out.entry(bits.to_usize()).or_insert(0) += count;
            }
        }
        out
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QareResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ExecutionResult(shots={}, unique={}, backend={})",
            self.shots,
            self.counts.len(),
            self.metadata.backend
        )
    }
}

/// Quantum backend trait
/// Gantree: BackendTrait // 백엔드 인터페이스
pub trait Backend: Send + Sync {
    /// Get backend name
    fn name(&self) -> &str;

    /// Largest register the backend accepts
    fn max_qubits(&self) -> usize;

    /// Run one shot of `circuit` from |0…0⟩ with the caller's randomness
    ///
    /// Returns the bits of every measurement in circuit order.
    /// Gantree: run_shot(circuit, rng) -> Result<Vec<bool>>
    fn run_shot(&self, circuit: &Circuit, rng: &mut dyn RngCore) -> QareResult<Vec<bool>>;

    /// Execute a circuit `shots` times and histogram the measured bitstrings
    /// Gantree: execute(circuit, shots) -> Result<ExecutionResult>
    fn execute(&self, circuit: &Circuit, shots: u64) -> QareResult<ExecutionResult>;

    /// Execute multiple circuits (batch)
    fn execute_batch(&self, circuits: &[Circuit], shots: u64) -> QareResult<Vec<ExecutionResult>> {
        circuits.iter().map(|c| self.execute(c, shots)).collect()
    }

    /// Check if backend is simulator
    fn is_simulator(&self) -> bool {
        true
    }
}

// ============================================================================
// Tests
// ============================================================================
