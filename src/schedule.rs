//! Replay order of a circuit.
//!
//! [`Scheduler`] is the only place that walks trials, steps and operations,
//! draws branch decisions and moves staircase pointers. Both [`crate::execute`]
//! and [`expand`] are driven by it, so a preview consumes exactly the same
//! draws as a real run.

use tracing::trace;

use crate::branch::select_branch;
use crate::circuit::{Circuit, Operation};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::geometry::Geometry;
use crate::policy::{ExecutionContext, RecordingPolicy};
use crate::rng::RngRegistry;

/// An operation that is about to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledOp<'c> {
    /// 1-based trial index.
    pub trial: usize,
    /// 1-based step index within the trial.
    pub step: usize,
    /// Position of the operation in the circuit.
    pub op_index: usize,
    /// Selected outcome for stochastic operations.
    pub branch: Option<usize>,
    pub gate: &'c Gate,
    /// Site groups, to be applied in order.
    pub groups: Vec<Vec<usize>>,
    /// Applied operations so far, including this one.
    pub cumulative: u64,
    pub trial_boundary: bool,
    /// False for the trial-end marker emitted when a trial closes on a
    /// no-op branch. Such a marker has no groups and repeats the most
    /// recently applied gate and count.
    pub applied: bool,
}

impl<'c> ScheduledOp<'c> {
    pub fn context(&self) -> ExecutionContext<'c> {
        ExecutionContext {
            trial_index: self.trial,
            cumulative_count: self.cumulative,
            gate: self.gate,
            boundary_flag: self.trial_boundary,
        }
    }

    /// Ask `policy` whether to capture after this entry.
    pub fn should_record(&self, policy: &RecordingPolicy, trial_count: usize) -> bool {
        let context = self.context();
        if self.applied {
            policy.should_record(&context, trial_count)
        } else {
            policy.should_record_trial_end(&context, trial_count)
        }
    }
}

/// Walks a circuit for a fixed number of trials.
///
/// Geometries are copied from the circuit when the scheduler is created, so
/// staircase pointers start from their declared positions on every run and
/// keep moving across trials within it. Each copy belongs to exactly one
/// outcome of one operation.
#[derive(Debug)]
pub struct Scheduler<'c> {
    circuit: &'c Circuit,
    trial_count: usize,
    geometries: Vec<Vec<Geometry>>,
    trial: usize,
    step: usize,
    op_index: usize,
    cumulative: u64,
    noops: u64,
    last_gate: Option<&'c Gate>,
}

impl<'c> Scheduler<'c> {
    /// # Errors
    /// [`Error::InvalidTrialCount`] if `trial_count` is zero.
    pub fn new(circuit: &'c Circuit, trial_count: usize) -> Result<Self> {
        if trial_count < 1 {
            return Err(Error::InvalidTrialCount(trial_count));
        }
        let geometries = circuit
            .operations()
            .iter()
            .map(|op| {
                op.placements()
                    .into_iter()
                    .map(|p| p.geometry.clone())
                    .collect()
            })
            .collect();
        Ok(Scheduler {
            circuit,
            trial_count,
            geometries,
            trial: 1,
            step: 1,
            op_index: 0,
            cumulative: 0,
            noops: 0,
            last_gate: None,
        })
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    /// Applied operations so far.
    pub fn cumulative(&self) -> u64 {
        self.cumulative
    }

    /// Stochastic invocations that took the no-op branch so far.
    pub fn noops(&self) -> u64 {
        self.noops
    }

    /// Gate reported by a trial-end marker: the last applied gate, or the
    /// first outcome of the closing operation when nothing was applied yet.
    fn closing_gate(&self) -> &'c Gate {
        let circuit = self.circuit;
        match self.last_gate {
            Some(gate) => gate,
            None => match &circuit.operations()[circuit.operations().len() - 1] {
                Operation::Deterministic(p) => &p.gate,
                Operation::Stochastic { outcomes, .. } => &outcomes[0].placement.gate,
            },
        }
    }

    fn is_finished(&self) -> bool {
        self.trial > self.trial_count || self.circuit.operations().is_empty()
    }

    /// Move the cursor past the current operation, returning the position it
    /// pointed at.
    fn bump(&mut self) -> (usize, usize, usize) {
        let here = (self.trial, self.step, self.op_index);
        self.op_index += 1;
        if self.op_index == self.circuit.operations().len() {
            self.op_index = 0;
            self.step += 1;
            if self.step > self.circuit.steps() {
                self.step = 1;
                self.trial += 1;
            }
        }
        here
    }

    /// Advance to the next applied operation.
    ///
    /// Each stochastic operation passed on the way consumes exactly one draw
    /// from its stream, whether or not it takes the no-op branch. Geometries
    /// are resolved only for outcomes that are applied.
    ///
    /// When the closing operation of a trial takes the no-op branch, a
    /// trial-end marker (`applied == false`) is returned instead, so every
    /// trial reports exactly one boundary.
    pub fn next_op(&mut self, rngs: &mut RngRegistry) -> Result<Option<ScheduledOp<'c>>> {
        let circuit = self.circuit;
        let ops = circuit.operations();
        while !self.is_finished() {
            let (trial, step, op_index) = self.bump();
            let trial_boundary = step == circuit.steps() && op_index + 1 == ops.len();

            let (branch, gate) = match &ops[op_index] {
                Operation::Deterministic(p) => (None, &p.gate),
                Operation::Stochastic { outcomes, stream } => {
                    let r = rngs.draw_uniform(*stream)?;
                    match select_branch(outcomes.iter().map(|o| o.probability), r) {
                        Some(i) => (Some(i), &outcomes[i].placement.gate),
                        None => {
                            self.noops += 1;
                            trace!(trial, step, op_index, r, "no-op branch");
                            if trial_boundary {
                                return Ok(Some(ScheduledOp {
                                    trial,
                                    step,
                                    op_index,
                                    branch: None,
                                    gate: self.closing_gate(),
                                    groups: Vec::new(),
                                    cumulative: self.cumulative,
                                    trial_boundary,
                                    applied: false,
                                }));
                            }
                            continue;
                        }
                    }
                }
            };

            let geometry = &mut self.geometries[op_index][branch.unwrap_or(0)];
            let groups = geometry.resolve(step, circuit.num_sites(), circuit.topology())?;
            self.cumulative += 1;
            self.last_gate = Some(gate);
            trace!(trial, step, op_index, ?branch, gate = %gate, ?groups, "scheduled");

            return Ok(Some(ScheduledOp {
                trial,
                step,
                op_index,
                branch,
                gate,
                groups,
                cumulative: self.cumulative,
                trial_boundary,
                applied: true,
            }));
        }
        Ok(None)
    }
}

/// Full enumeration of a run, produced without a state handle.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan<'c> {
    /// Applied operations plus trial-end markers, in replay order.
    pub ops: Vec<ScheduledOp<'c>>,
    /// Indices into `ops` after which a capture fires.
    pub captures: Vec<usize>,
    /// Stochastic invocations that took the no-op branch.
    pub noops: u64,
}

/// Preview a run: enumerate every applied operation and capture decision.
///
/// With a registry seeded like the one later passed to
/// [`crate::execute::execute`], the plan lists the same gates, site groups
/// and captures in the same order. This holds as long as the state
/// collaborator does not draw from the streams used for branch decisions,
/// which the legacy seed layout does not guarantee.
///
/// # Example
/// ```
/// use qtraj::circuit::Circuit;
/// use qtraj::gate::Gate;
/// use qtraj::geometry::{Geometry, Topology};
/// use qtraj::policy::RecordingPolicy;
/// use qtraj::rng::{RngRegistry, StreamName};
/// use qtraj::schedule::expand;
///
/// let circuit = Circuit::builder(3, Topology::Open)
///     .steps(2)
///     .deterministic(Gate::H, Geometry::site(0))
///     .build()
///     .unwrap();
/// let mut rngs = RngRegistry::new([(StreamName::Control, 1)]);
/// let plan = expand(&circuit, &mut rngs, 2, &RecordingPolicy::EveryTrial).unwrap();
/// assert_eq!(plan.ops.len(), 4);
/// assert_eq!(plan.captures, vec![1, 3]);
/// ```
pub fn expand<'c>(
    circuit: &'c Circuit,
    rngs: &mut RngRegistry,
    trial_count: usize,
    policy: &RecordingPolicy,
) -> Result<Plan<'c>> {
    let mut scheduler = Scheduler::new(circuit, trial_count)?;
    let mut ops = Vec::new();
    let mut captures = Vec::new();
    while let Some(op) = scheduler.next_op(rngs)? {
        if op.should_record(policy, trial_count) {
            captures.push(ops.len());
        }
        ops.push(op);
    }
    Ok(Plan {
        ops,
        captures,
        noops: scheduler.noops(),
    })
}
