//! Constants for QARE
//!
//! Gantree: L0_Foundation → Constants
//!
//! Simulator limits, amplitude-estimation defaults, and classical
//! baseline parameters.

// ============================================================================
// Simulator Constants
// Gantree: sim // 시뮬레이터 상수
// ============================================================================

pub mod sim {
    //! State-vector simulator limits
    //!
    //! Every gate touches all 2^N amplitudes, so memory and time both grow
    //! exponentially in the qubit count.

    /// Hard ceiling on register width (2^24 amplitudes = 256 MiB of Complex64)
    /// Gantree: MAX_QUBITS: usize = 24
    pub const MAX_QUBITS: usize = 24;

    /// Register width above which runs stop being interactive
    /// Gantree: INTERACTIVE_QUBITS: usize = 20
    pub const INTERACTIVE_QUBITS: usize = 20;

    /// Allowed drift of the L2 norm away from 1
    pub const NORM_TOLERANCE: f64 = 1e-9;

    /// Number of amplitudes in an N-qubit register
    #[inline]
    pub const fn dimension(num_qubits: usize) -> usize {
        1usize << num_qubits
    }
}

// ============================================================================
// Amplitude Estimation Constants
// Gantree: qae // QAE 상수
// ============================================================================

pub mod qae {
    //! Amplitude-estimation defaults (tail-risk instance)

    /// Default loss register width
    /// Gantree: DEFAULT_LOSS_QUBITS: usize = 4
    pub const DEFAULT_LOSS_QUBITS: usize = 4;

    /// Default loss threshold
    pub const DEFAULT_THRESHOLD: f64 = 2.5;

    /// Default log-space mean
    pub const DEFAULT_MEAN: f64 = 0.0;

    /// Default log-space standard deviation
    pub const DEFAULT_STD_DEV: f64 = 1.0;

    /// Default discretized support width in standard deviations
    pub const DEFAULT_SUPPORT_SIGMAS: f64 = 3.0;

    /// Default phase register width
    /// Gantree: DEFAULT_PRECISION_QUBITS: usize = 6
    pub const DEFAULT_PRECISION_QUBITS: usize = 6;

    /// Default shot count
    /// Gantree: DEFAULT_REPETITIONS: usize = 120
    pub const DEFAULT_REPETITIONS: usize = 120;

    /// Marker (phase-kickback) qubits
    pub const MARKER_QUBITS: usize = 1;

    /// Total register width: value + precision + marker
    #[inline]
    pub const fn logical_qubits(loss_qubits: usize, precision_qubits: usize) -> usize {
        loss_qubits + precision_qubits + MARKER_QUBITS
    }

    /// Controlled Grover applications per shot: 2^m - 1
    #[inline]
    pub const fn grover_applications(precision_qubits: usize) -> usize {
        (1usize << precision_qubits) - 1
    }

    /// Phase grid spacing in θ: π / 2^m
    #[inline]
    pub fn phase_grid_spacing(precision_qubits: usize) -> f64 {
        std::f64::consts::PI / (1u64 << precision_qubits) as f64
    }
}

// ============================================================================
// Statistics Constants
// Gantree: stats // 통계 상수
// ============================================================================

pub mod stats {
    //! Classical baseline and tolerance constants

    /// Default Monte-Carlo sample count
    /// Gantree: DEFAULT_MC_SAMPLES: usize = 100_000
    pub const DEFAULT_MC_SAMPLES: usize = 100_000;

    /// Floor on Monte-Carlo samples in a precision sweep
    pub const MIN_MC_SAMPLES: usize = 1_000;

    /// Default precision targets (ε) for the query-complexity sweep
    pub const DEFAULT_PRECISION_TARGETS: [f64; 5] = [0.1, 0.05, 0.01, 0.005, 0.001];

    /// Tolerance for a probability table summing to one
    pub const TABLE_SUM_TOLERANCE: f64 = 1e-9;
}
