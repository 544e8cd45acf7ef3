//! A [`StateHandle`] that only records what it is asked to do.
//!
//! Useful for dry runs and for comparing two runs call by call.

use crate::error::BackendError;
use crate::execute::StateHandle;
use crate::gate::Gate;
use crate::rng::RngRegistry;

/// One call received by a [`TraceState`].
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Apply { gate: Gate, sites: Vec<usize> },
    Capture,
}

/// Records every call in order.
///
/// Site groups whose size differs from [`Gate::num_sites`] are rejected with
/// [`BackendError::UnsupportedSiteShape`], as a real collaborator would.
///
/// # Example
/// ```
/// use qtraj::execute::StateHandle;
/// use qtraj::gate::Gate;
/// use qtraj::rng::{RngRegistry, StreamName};
/// use qtraj::trace::TraceState;
///
/// let mut rngs = RngRegistry::new([(StreamName::Control, 0)]);
/// let mut state = TraceState::new();
/// assert!(state.apply_gate(&Gate::CNOT, &[0], &mut rngs).is_err());
/// state.apply_gate(&Gate::CNOT, &[0, 1], &mut rngs).unwrap();
/// assert_eq!(state.applied().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceState {
    events: Vec<TraceEvent>,
}

impl TraceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Applied `(gate, sites)` pairs in order.
    pub fn applied(&self) -> impl Iterator<Item = (&Gate, &[usize])> + '_ {
        self.events.iter().filter_map(|e| match e {
            TraceEvent::Apply { gate, sites } => Some((gate, sites.as_slice())),
            TraceEvent::Capture => None,
        })
    }

    pub fn capture_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TraceEvent::Capture))
            .count()
    }
}

impl StateHandle for TraceState {
    fn apply_gate(
        &mut self,
        gate: &Gate,
        sites: &[usize],
        _rngs: &mut RngRegistry,
    ) -> Result<(), BackendError> {
        if let Some(expected) = gate.num_sites() {
            if expected != sites.len() {
                return Err(BackendError::UnsupportedSiteShape {
                    gate: gate.to_string(),
                    expected,
                    actual: sites.len(),
                });
            }
        }
        self.events.push(TraceEvent::Apply {
            gate: gate.clone(),
            sites: sites.to_vec(),
        });
        Ok(())
    }

    fn capture_observation(&mut self) -> Result<(), BackendError> {
        self.events.push(TraceEvent::Capture);
        Ok(())
    }
}
