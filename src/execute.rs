//! Running a circuit against a state collaborator.

use tracing::{debug, info};

use crate::circuit::Circuit;
use crate::error::{BackendError, Result};
use crate::gate::Gate;
use crate::policy::RecordingPolicy;
use crate::rng::RngRegistry;
use crate::schedule::Scheduler;

/// The state a circuit acts on.
///
/// Implementations own the tensor-network (or any other) representation and
/// all numerics; the engine only tells them what to apply and when to
/// record.
pub trait StateHandle {
    /// Apply `gate` on one site group.
    ///
    /// `rngs` gives access to the unitary-sampling and measurement-outcome
    /// streams for gates such as [`Gate::Haar`] and [`Gate::Measure`].
    fn apply_gate(
        &mut self,
        gate: &Gate,
        sites: &[usize],
        rngs: &mut RngRegistry,
    ) -> std::result::Result<(), BackendError>;

    /// Record every quantity the collaborator currently tracks.
    fn capture_observation(&mut self) -> std::result::Result<(), BackendError>;
}

/// Counters of one call to [`execute`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub trials: usize,
    /// Applied operations (one per operation, however many groups it spans).
    pub operations: u64,
    /// Stochastic invocations that took the no-op branch.
    pub noops: u64,
    /// `apply_gate` calls, one per site group.
    pub gate_applications: u64,
    /// `capture_observation` calls.
    pub captures: u64,
}

/// Replay `circuit` for `trial_count` trials on `state`.
///
/// For each trial, each step and each operation in declaration order:
/// deterministic operations are applied on every resolved site group;
/// stochastic operations draw once from their stream and apply the selected
/// outcome, if any. After every applied operation `policy` decides whether
/// `state` captures an observation. A trial whose closing operation takes
/// the no-op branch still reaches its boundary, so boundary-driven policies
/// capture once per trial.
///
/// # Errors
/// - [`crate::Error::InvalidTrialCount`] before anything is applied
/// - stream and resolution errors from the registry and geometries
/// - [`crate::Error::Backend`] from the collaborator, unchanged
///
/// Nothing is retried: a second draw would desynchronize the stream.
pub fn execute<S: StateHandle + ?Sized>(
    circuit: &Circuit,
    state: &mut S,
    rngs: &mut RngRegistry,
    trial_count: usize,
    policy: &RecordingPolicy,
) -> Result<ExecutionReport> {
    let mut scheduler = Scheduler::new(circuit, trial_count)?;
    info!(
        num_sites = circuit.num_sites(),
        steps = circuit.steps(),
        operations = circuit.operations().len(),
        trial_count,
        ?policy,
        "executing circuit"
    );

    let mut report = ExecutionReport {
        trials: trial_count,
        ..Default::default()
    };
    while let Some(op) = scheduler.next_op(rngs)? {
        for group in &op.groups {
            state.apply_gate(op.gate, group, rngs)?;
            report.gate_applications += 1;
        }

        if op.should_record(policy, trial_count) {
            state.capture_observation()?;
            report.captures += 1;
            debug!(trial = op.trial, cumulative = op.cumulative, "captured observation");
        }
        if op.trial_boundary {
            debug!(trial = op.trial, cumulative = op.cumulative, "trial finished");
        }
    }
    report.operations = scheduler.cumulative();
    report.noops = scheduler.noops();

    info!(
        operations = report.operations,
        noops = report.noops,
        captures = report.captures,
        "execution finished"
    );
    Ok(report)
}
