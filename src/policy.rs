//! When to capture observations.
//!
//! The engine builds an [`ExecutionContext`] after every applied operation
//! and asks the [`RecordingPolicy`] whether the collaborator should capture
//! its tracked quantities right now.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::gate::Gate;

/// Snapshot handed to recording decisions after an operation was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionContext<'a> {
    /// 1-based trial index.
    pub trial_index: usize,
    /// Applied operations so far across all trials, including this one.
    /// No-op branches are not counted.
    pub cumulative_count: u64,
    /// The gate that was just applied.
    pub gate: &'a Gate,
    /// True exactly when this was the last operation of the last step of the
    /// trial. This marks the end of a trial, not of a step.
    pub boundary_flag: bool,
}

pub type RecordingContext<'a> = ExecutionContext<'a>;

/// User predicate deciding whether to capture.
pub type RecordPredicate = Box<dyn Fn(&ExecutionContext<'_>) -> bool>;

/// Rule governing when observations are captured.
#[derive(Default)]
pub enum RecordingPolicy {
    /// Once at the end of every trial (`"every-trial"`).
    #[default]
    EveryTrial,
    /// After every applied operation (`"every-operation"`).
    EveryOperation,
    /// Once at the end of the last trial (`"final-trial-only"`).
    FinalTrialOnly,
    /// After every `n`-th applied operation. See [`every_n_operations`].
    EveryNOperations(u64),
    /// At the end of every `n`-th trial. See [`every_n_trials`].
    EveryNTrials(usize),
    Custom(RecordPredicate),
}

impl RecordingPolicy {
    /// Wrap an arbitrary predicate.
    pub fn custom(predicate: impl Fn(&ExecutionContext<'_>) -> bool + 'static) -> Self {
        RecordingPolicy::Custom(Box::new(predicate))
    }

    /// Decide whether to capture after the operation described by `context`,
    /// in a run of `trial_count` trials.
    pub fn should_record(&self, context: &ExecutionContext<'_>, trial_count: usize) -> bool {
        match self {
            RecordingPolicy::EveryTrial => context.boundary_flag,
            RecordingPolicy::EveryOperation => true,
            RecordingPolicy::FinalTrialOnly => {
                context.boundary_flag && context.trial_index == trial_count
            }
            RecordingPolicy::EveryNOperations(n) => context.cumulative_count % n == 0,
            RecordingPolicy::EveryNTrials(n) => {
                context.boundary_flag && context.trial_index % n == 0
            }
            RecordingPolicy::Custom(predicate) => predicate(context),
        }
    }

    /// Decide whether to capture when a trial ends on a no-op branch.
    ///
    /// `context` repeats the count and gate of the last applied operation,
    /// so operation-driven presets do not fire again. Custom predicates are
    /// consulted with the same context.
    pub fn should_record_trial_end(&self, context: &ExecutionContext<'_>, trial_count: usize) -> bool {
        match self {
            RecordingPolicy::EveryOperation | RecordingPolicy::EveryNOperations(_) => false,
            _ => self.should_record(context, trial_count),
        }
    }

    /// Preset name, or `None` for custom predicates.
    pub fn preset_name(&self) -> Option<&'static str> {
        match self {
            RecordingPolicy::EveryTrial => Some("every-trial"),
            RecordingPolicy::EveryOperation => Some("every-operation"),
            RecordingPolicy::FinalTrialOnly => Some("final-trial-only"),
            RecordingPolicy::EveryNOperations(_)
            | RecordingPolicy::EveryNTrials(_)
            | RecordingPolicy::Custom(_) => None,
        }
    }
}

impl fmt::Debug for RecordingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingPolicy::EveryNOperations(n) => write!(f, "RecordingPolicy(every-{}-operations)", n),
            RecordingPolicy::EveryNTrials(n) => write!(f, "RecordingPolicy(every-{}-trials)", n),
            _ => match self.preset_name() {
                Some(name) => write!(f, "RecordingPolicy({})", name),
                None => write!(f, "RecordingPolicy(custom)"),
            },
        }
    }
}

impl FromStr for RecordingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "every-trial" => Ok(RecordingPolicy::EveryTrial),
            "every-operation" => Ok(RecordingPolicy::EveryOperation),
            "final-trial-only" => Ok(RecordingPolicy::FinalTrialOnly),
            other => Err(Error::UnknownPolicy(other.to_string())),
        }
    }
}

/// Capture after every `n`-th applied operation (`cumulative_count mod n == 0`).
///
/// # Example
/// ```
/// use qtraj::gate::Gate;
/// use qtraj::policy::{every_n_operations, ExecutionContext};
///
/// let policy = every_n_operations(3).unwrap();
/// let ctx = ExecutionContext { trial_index: 1, cumulative_count: 6, gate: &Gate::X, boundary_flag: false };
/// assert!(policy.should_record(&ctx, 1));
/// ```
pub fn every_n_operations(n: u64) -> Result<RecordingPolicy> {
    if n == 0 {
        return Err(Error::ZeroInterval);
    }
    Ok(RecordingPolicy::EveryNOperations(n))
}

/// Capture at the end of every `n`-th trial.
pub fn every_n_trials(n: usize) -> Result<RecordingPolicy> {
    if n == 0 {
        return Err(Error::ZeroInterval);
    }
    Ok(RecordingPolicy::EveryNTrials(n))
}
