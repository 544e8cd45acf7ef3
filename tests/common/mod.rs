//! Shared test utilities for qtraj integration tests.

use qtraj::rng::{RngRegistry, StreamName};
use qtraj::schedule::Plan;
use qtraj::trace::TraceEvent;

/// Registry with every stream seeded from `seed`.
#[allow(dead_code)]
pub fn seeded(seed: u64) -> RngRegistry {
    RngRegistry::new(
        StreamName::ALL
            .iter()
            .enumerate()
            .map(|(i, &name)| (name, seed.wrapping_mul(31).wrapping_add(i as u64))),
    )
}

/// The calls a collaborator should receive for `plan`.
#[allow(dead_code)]
pub fn plan_events(plan: &Plan<'_>) -> Vec<TraceEvent> {
    let mut events = Vec::new();
    for (i, op) in plan.ops.iter().enumerate() {
        for group in &op.groups {
            events.push(TraceEvent::Apply {
                gate: op.gate.clone(),
                sites: group.clone(),
            });
        }
        if plan.captures.contains(&i) {
            events.push(TraceEvent::Capture);
        }
    }
    events
}
