use std::fmt;

use crate::branch::PROBABILITY_TOLERANCE;
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::geometry::{Geometry, Topology};
use crate::rng::StreamName;

/// A gate bound to the geometry it is applied on.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub gate: Gate,
    pub geometry: Geometry,
}

impl Placement {
    pub fn new(gate: Gate, geometry: Geometry) -> Self {
        Placement { gate, geometry }
    }
}

/// One weighted branch of a stochastic operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub probability: f64,
    pub placement: Placement,
}

/// Build an [`Outcome`].
///
/// # Example
/// ```
/// use qtraj::circuit::outcome;
/// use qtraj::gate::Gate;
/// use qtraj::geometry::Geometry;
///
/// let o = outcome(0.25, Gate::Measure, Geometry::site(0));
/// assert_eq!(o.probability, 0.25);
/// ```
pub fn outcome(probability: f64, gate: Gate, geometry: Geometry) -> Outcome {
    Outcome {
        probability,
        placement: Placement::new(gate, geometry),
    }
}

/// One declared unit of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Deterministic(Placement),
    /// At most one outcome is applied per invocation, chosen by one draw from
    /// `stream`. Residual probability mass is a no-op.
    Stochastic {
        outcomes: Vec<Outcome>,
        stream: StreamName,
    },
}

impl Operation {
    /// Every placement the operation may apply, in declaration order.
    pub fn placements(&self) -> Vec<&Placement> {
        match self {
            Operation::Deterministic(p) => vec![p],
            Operation::Stochastic { outcomes, .. } => {
                outcomes.iter().map(|o| &o.placement).collect()
            }
        }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self, Operation::Stochastic { .. })
    }
}

/// An immutable circuit: operations replayed `steps` times per trial on a
/// chain of `num_sites` sites.
///
/// Staircase geometries keep their declared start position here; every run
/// works on its own copy, so a circuit can be executed any number of times.
#[derive(Debug, Clone)]
pub struct Circuit {
    num_sites: usize,
    steps: usize,
    topology: Topology,
    operations: Vec<Operation>,
}

impl Circuit {
    /// Start building a circuit on `num_sites` sites.
    pub fn builder(num_sites: usize, topology: Topology) -> CircuitBuilder {
        CircuitBuilder::new(num_sites, topology)
    }

    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    /// Steps per trial.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Operations executed per trial when no branch is a no-op.
    pub fn operations_per_trial(&self) -> usize {
        self.steps * self.operations.len()
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "nsites: {}, steps: {}, topology: {:?}",
            self.num_sites, self.steps, self.topology
        )?;
        for op in &self.operations {
            match op {
                Operation::Deterministic(p) => {
                    writeln!(f, "  {} @ {}", p.gate, format_geometry(&p.geometry))?;
                }
                Operation::Stochastic { outcomes, stream } => {
                    let branches = outcomes
                        .iter()
                        .map(|o| {
                            format!(
                                "{:.4}: {} @ {}",
                                o.probability,
                                o.placement.gate,
                                format_geometry(&o.placement.geometry)
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(" | ");
                    writeln!(f, "  [{}] {}", stream, branches)?;
                }
            }
        }
        Ok(())
    }
}

fn format_geometry(geometry: &Geometry) -> String {
    match geometry {
        Geometry::Site { site } => format!("q[{}]", site),
        Geometry::Pair { first } => format!("q[{}, +1]", first),
        Geometry::Pattern(pattern) => format!("{:?}", pattern),
        Geometry::Staircase(s) => format!("Staircase({:?}, {})", s.direction(), s.position()),
    }
}

/// Collects operations in declaration order; validation happens in
/// [`CircuitBuilder::build`].
///
/// # Example
/// ```
/// use qtraj::circuit::{outcome, Circuit};
/// use qtraj::gate::Gate;
/// use qtraj::geometry::{Geometry, Topology};
/// use qtraj::rng::StreamName;
///
/// let circuit = Circuit::builder(4, Topology::Periodic)
///     .steps(8)
///     .deterministic(Gate::Haar, Geometry::staircase_right(0))
///     .stochastic(StreamName::Projection, vec![outcome(0.1, Gate::Measure, Geometry::site(0))])
///     .build()
///     .unwrap();
/// assert_eq!(circuit.operations_per_trial(), 16);
/// ```
#[derive(Debug, Clone)]
pub struct CircuitBuilder {
    num_sites: usize,
    steps: usize,
    topology: Topology,
    operations: Vec<Operation>,
}

impl CircuitBuilder {
    pub fn new(num_sites: usize, topology: Topology) -> Self {
        CircuitBuilder {
            num_sites,
            steps: 1,
            topology,
            operations: Vec::new(),
        }
    }

    /// Steps per trial (default 1).
    pub fn steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Append an operation.
    pub fn push(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Append a gate that is applied on every invocation.
    pub fn deterministic(self, gate: Gate, geometry: Geometry) -> Self {
        self.push(Operation::Deterministic(Placement::new(gate, geometry)))
    }

    /// Append a stochastic operation drawing from `stream`.
    pub fn stochastic(self, stream: StreamName, outcomes: Vec<Outcome>) -> Self {
        self.push(Operation::Stochastic { outcomes, stream })
    }

    /// Validate and freeze the circuit.
    ///
    /// # Errors
    /// - [`Error::InvalidCircuit`] for zero sites or zero steps
    /// - [`Error::EmptyOutcomes`], [`Error::InvalidProbability`] or
    ///   [`Error::ProbabilityOverflow`] for malformed stochastic operations
    /// - [`Error::SiteOutOfRange`] / [`Error::TooFewSites`] for geometries
    ///   that cannot be placed on the chain
    pub fn build(self) -> Result<Circuit> {
        if self.num_sites == 0 {
            return Err(Error::InvalidCircuit("circuit must have at least one site".into()));
        }
        if self.steps == 0 {
            return Err(Error::InvalidCircuit("step count must be at least 1".into()));
        }

        for (op_index, op) in self.operations.iter().enumerate() {
            if let Operation::Stochastic { outcomes, .. } = op {
                validate_outcomes(op_index, outcomes)?;
            }
            for placement in op.placements() {
                placement.geometry.validate(self.num_sites, self.topology)?;
            }
        }

        Ok(Circuit {
            num_sites: self.num_sites,
            steps: self.steps,
            topology: self.topology,
            operations: self.operations,
        })
    }
}

fn validate_outcomes(op: usize, outcomes: &[Outcome]) -> Result<()> {
    if outcomes.is_empty() {
        return Err(Error::EmptyOutcomes { op });
    }
    for (i, o) in outcomes.iter().enumerate() {
        // NaN fails both comparisons
        if !(o.probability > 0.0 && o.probability <= 1.0) {
            return Err(Error::InvalidProbability {
                op,
                outcome: i,
                probability: o.probability,
            });
        }
    }
    let total: f64 = outcomes.iter().map(|o| o.probability).sum();
    if total > 1.0 + PROBABILITY_TOLERANCE {
        return Err(Error::ProbabilityOverflow { op, total });
    }
    Ok(())
}
