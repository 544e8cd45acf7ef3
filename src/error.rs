//! Error types for circuit construction and execution.

use thiserror::Error;

use crate::rng::StreamName;

/// Errors raised by a state collaborator while applying a gate or capturing
/// observations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// The resolved site group does not fit the gate.
    #[error("gate '{gate}' acts on {expected} sites, but a group of {actual} was resolved")]
    UnsupportedSiteShape {
        gate: String,
        expected: usize,
        actual: usize,
    },

    /// Any other collaborator failure.
    #[error("state backend failed: {0}")]
    Failed(String),
}

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while building a circuit.
    Construction,
    /// Raised by `execute` before any state mutation.
    Invocation,
    /// Raised while mapping a geometry to sites.
    Resolution,
    /// Raised by the RNG stream registry.
    Stream,
    /// Propagated from the state collaborator.
    Backend,
    /// Malformed serialized circuit description or configuration.
    Description,
}

/// Errors that can occur while building or executing a circuit.
#[derive(Debug, Error)]
pub enum Error {
    /// Outcome probabilities of a stochastic operation sum to more than one.
    #[error("operation {op}: outcome probabilities sum to {total}, which exceeds 1")]
    ProbabilityOverflow { op: usize, total: f64 },

    /// An outcome probability lies outside (0, 1].
    #[error("operation {op}: outcome {outcome} has probability {probability}, expected a value in (0, 1]")]
    InvalidProbability {
        op: usize,
        outcome: usize,
        probability: f64,
    },

    /// A stochastic operation declares no outcomes.
    #[error("operation {op}: stochastic operation declares no outcomes")]
    EmptyOutcomes { op: usize },

    /// Structural problem with the circuit (size, step count).
    #[error("invalid circuit: {0}")]
    InvalidCircuit(String),

    #[error("trial count must be at least 1, got {0}")]
    InvalidTrialCount(usize),

    #[error("unknown recording policy preset '{0}'")]
    UnknownPolicy(String),

    /// Interval of a predicate factory is zero.
    #[error("recording interval must be at least 1")]
    ZeroInterval,

    #[error("unknown RNG stream '{0}'")]
    UnknownStream(String),

    /// The stream is recognized but the registry was created without a seed for it.
    #[error("RNG stream '{0}' was not seeded")]
    UnseededStream(StreamName),

    #[error("site {site} is out of range (num_sites = {num_sites})")]
    SiteOutOfRange { site: usize, num_sites: usize },

    #[error("geometry needs at least {required} sites, got {num_sites}")]
    TooFewSites { required: usize, num_sites: usize },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("malformed description: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProbabilityOverflow { .. }
            | Error::InvalidProbability { .. }
            | Error::EmptyOutcomes { .. }
            | Error::InvalidCircuit(_) => ErrorKind::Construction,
            Error::InvalidTrialCount(_) | Error::UnknownPolicy(_) | Error::ZeroInterval => {
                ErrorKind::Invocation
            }
            Error::SiteOutOfRange { .. } | Error::TooFewSites { .. } => ErrorKind::Resolution,
            Error::UnknownStream(_) | Error::UnseededStream(_) => ErrorKind::Stream,
            Error::Backend(_) => ErrorKind::Backend,
            Error::Json(_) => ErrorKind::Description,
        }
    }

    /// True for construction and invocation errors.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Construction | ErrorKind::Invocation)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
