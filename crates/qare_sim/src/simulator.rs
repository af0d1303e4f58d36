//! State-vector simulator backend
//!
//! Gantree: L2_Simulation → StateVectorSimulator
//!
//! Noiseless full-amplitude simulation. Each shot allocates a fresh register,
//! applies the circuit gate by gate and returns the measured bits.

use crate::execution::{Backend, ExecutionMetadata, ExecutionResult};
use crate::register::QuantumRegister;
use log::{debug, warn};
use qare_core::constants::sim;
use qare_core::{Bitstring, Circuit, Counts, QareError, QareResult};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::time::Instant;

/// Ideal state-vector simulator
/// Gantree: StateVectorSimulator // 시뮬레이터 구현
#[derive(Debug, Clone)]
pub struct StateVectorSimulator {
    /// Backend name
    name: String,

    /// Register width limit
    max_qubits: usize,

    /// Random seed for batched execution
    seed: Option<u64>,
}

impl Default for StateVectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StateVectorSimulator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simulator with the default register limit
    pub fn new() -> Self {
        Self {
            name: "qare_statevector".to_string(),
            max_qubits: sim::MAX_QUBITS,
            seed: None,
        }
    }

    /// Lower the register limit (cannot exceed the hard ceiling)
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits.min(sim::MAX_QUBITS);
        self
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    fn check_limit(&self, circuit: &Circuit) -> QareResult<()> {
        if circuit.num_qubits() > self.max_qubits {
            return Err(QareError::RegisterTooLarge {
                num_qubits: circuit.num_qubits(),
                max: self.max_qubits,
            });
        }
        Ok(())
    }

    fn check_width(&self, circuit: &Circuit) -> QareResult<()> {
        self.check_limit(circuit)?;
        if circuit.num_qubits() > sim::INTERACTIVE_QUBITS {
            warn!(
                "{}-qubit register holds {} amplitudes; expect slow shots",
                circuit.num_qubits(),
                sim::dimension(circuit.num_qubits())
            );
        }
        Ok(())
    }

    /// Run one shot on an explicit register
    fn simulate_single_shot(
        &self,
        circuit: &Circuit,
        rng: &mut dyn RngCore,
    ) -> QareResult<Vec<bool>> {
        let mut register = QuantumRegister::allocate(circuit.num_qubits())?;
        let mut bits = Vec::new();
        for gate in circuit.gates() {
            if let Some(measured) = register.execute(gate, rng)? {
                bits.extend(measured);
            }
        }
        Ok(bits)
    }

    /// Final state of a measurement-free circuit
    /// Gantree: statevector(circuit) -> Result<QuantumRegister> // 상태 벡터
    pub fn statevector(&self, circuit: &Circuit) -> QareResult<QuantumRegister> {
        self.check_width(circuit)?;
        let mut register = QuantumRegister::allocate(circuit.num_qubits())?;
        for gate in circuit.gates() {
            register.apply(gate)?;
        }
        Ok(register)
    }
}

impl Backend for StateVectorSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    fn run_shot(&self, circuit: &Circuit, rng: &mut dyn RngCore) -> QareResult<Vec<bool>> {
        // callers running many shots warn about width once themselves
        self.check_limit(circuit)?;
        self.simulate_single_shot(circuit, rng)
    }

    fn execute(&self, circuit: &Circuit, shots: u64) -> QareResult<ExecutionResult> {
        self.check_width(circuit)?;

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let start = Instant::now();
        let mut counts: Counts = HashMap::new();
        for _ in 0..shots {
            let bits = self.simulate_single_shot(circuit, &mut rng)?;
            *counts.entry(Bitstring::new(bits).to_string()).or_insert(0) += 1;
        }
        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            "{}: {} shots of {} gates in {} ms",
            self.name,
            shots,
            circuit.gate_count(),
            elapsed
        );

        Ok(ExecutionResult {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: self.name.clone(),
                execution_time_ms: Some(elapsed),
                simulated: true,
                seed: self.seed,
                ..Default::default()
            },
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
