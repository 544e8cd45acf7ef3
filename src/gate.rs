use ndarray::Array2;
use num_complex::Complex64;

/// Symbolic gate descriptor handed to the state collaborator.
///
/// The engine never evaluates a gate; it only decides where and when each
/// one is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    X,
    Y,
    Z,
    H,
    S,
    T,
    SWAP,
    CNOT,
    CZ,
    Rx(f64),
    Ry(f64),
    Rz(f64),
    /// Haar-random unitary on the whole site group. The collaborator samples
    /// it from the unitary-sampling stream.
    Haar,
    /// Born-rule measurement in the computational basis. The outcome comes
    /// from the measurement-outcome stream.
    Measure,
    /// Post-selected projection onto `|level⟩`.
    Project(usize),
    /// Measure and rotate back to `|0⟩` on every site of the group.
    Reset,
    Custom {
        matrix: Array2<Complex64>,
        label: String,
    },
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gate::X => write!(f, "X"),
            Gate::Y => write!(f, "Y"),
            Gate::Z => write!(f, "Z"),
            Gate::H => write!(f, "H"),
            Gate::S => write!(f, "S"),
            Gate::T => write!(f, "T"),
            Gate::SWAP => write!(f, "SWAP"),
            Gate::CNOT => write!(f, "CNOT"),
            Gate::CZ => write!(f, "CZ"),
            Gate::Rx(theta) => write!(f, "Rx({:.4})", theta),
            Gate::Ry(theta) => write!(f, "Ry({:.4})", theta),
            Gate::Rz(theta) => write!(f, "Rz({:.4})", theta),
            Gate::Haar => write!(f, "Haar"),
            Gate::Measure => write!(f, "Measure"),
            Gate::Project(level) => write!(f, "P{}", level),
            Gate::Reset => write!(f, "Reset"),
            Gate::Custom { label, .. } => write!(f, "{}", label),
        }
    }
}

impl Gate {
    /// Number of sites the gate acts on, or `None` when any group size is
    /// accepted.
    ///
    /// Custom gates are assumed to act on qubits, so a `2^k x 2^k` matrix
    /// spans `k` sites. Matrices whose size is not a power of two report
    /// `None` and are left to the collaborator to reject.
    pub fn num_sites(&self) -> Option<usize> {
        match self {
            Gate::SWAP | Gate::CNOT | Gate::CZ => Some(2),
            Gate::Haar | Gate::Reset => None,
            Gate::Custom { matrix, .. } => {
                let dim = matrix.nrows();
                if dim != matrix.ncols() || dim < 2 || !dim.is_power_of_two() {
                    return None;
                }
                Some(dim.trailing_zeros() as usize)
            }
            _ => Some(1),
        }
    }

    /// Whether the gate is non-unitary (measurement, projection or reset).
    pub fn is_monitoring(&self) -> bool {
        matches!(self, Gate::Measure | Gate::Project(_) | Gate::Reset)
    }
}
