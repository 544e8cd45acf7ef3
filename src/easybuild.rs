use crate::circuit::{outcome, Circuit};
use crate::error::Result;
use crate::gate::Gate;
use crate::geometry::{Geometry, Topology};
use crate::rng::StreamName;

// =============================================================================
// Unitary Circuits
// =============================================================================

/// Random brickwork circuit: one step is an even layer followed by an odd
/// layer of Haar-random two-site gates.
pub fn brickwork_circuit(n: usize, steps: usize, topology: Topology) -> Result<Circuit> {
    Circuit::builder(n, topology)
        .steps(steps)
        .deterministic(Gate::Haar, Geometry::brickwork(0))
        .deterministic(Gate::Haar, Geometry::brickwork(1))
        .build()
}

// =============================================================================
// Monitored Circuits
// =============================================================================

/// Brickwork circuit where, after each brick layer, every site is measured
/// independently with probability `p_meas`.
///
/// Measurement decisions draw from the projection stream, one draw per site
/// per layer.
pub fn monitored_brickwork(
    n: usize,
    steps: usize,
    p_meas: f64,
    topology: Topology,
) -> Result<Circuit> {
    let mut builder = Circuit::builder(n, topology).steps(steps);
    for parity in 0..2 {
        builder = builder.deterministic(Gate::Haar, Geometry::brickwork(parity));
        for site in 0..n {
            builder = builder.stochastic(
                StreamName::Projection,
                vec![outcome(p_meas, Gate::Measure, Geometry::site(site))],
            );
        }
    }
    builder.build()
}

/// Control staircase on a ring.
///
/// Each step draws once from the control stream: with probability `p_ctrl`
/// a reset runs on a left-moving staircase, otherwise a Haar gate runs on a
/// right-moving one. Then every site is measured with probability `p_proj`,
/// decided on the projection stream.
///
/// Both staircases move only when their branch is taken.
pub fn control_staircase(n: usize, steps: usize, p_ctrl: f64, p_proj: f64) -> Result<Circuit> {
    let start = n.saturating_sub(1);
    // zero-weight branches are dropped; outcome probabilities must be positive
    let branches = vec![
        outcome(p_ctrl, Gate::Reset, Geometry::staircase_left(start)),
        outcome(1.0 - p_ctrl, Gate::Haar, Geometry::staircase_right(start)),
    ]
    .into_iter()
    .filter(|o| o.probability != 0.0)
    .collect();
    let mut builder = Circuit::builder(n, Topology::Periodic)
        .steps(steps)
        .stochastic(StreamName::Control, branches);
    for site in 0..n {
        builder = builder.stochastic(
            StreamName::Projection,
            vec![outcome(p_proj, Gate::Measure, Geometry::site(site))],
        );
    }
    builder.build()
}
