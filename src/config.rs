//! Run configuration.
//!
//! ```json
//! {
//!   "trials": 100,
//!   "policy": "every-trial",
//!   "seeds": { "mode": "independent", "streams": { "control": 1, "projection": 2 } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::execute::{execute, ExecutionReport, StateHandle};
use crate::policy::RecordingPolicy;
use crate::rng::RngRegistry;

/// Seed layout. The mode is always explicit; legacy aliasing is never
/// inferred from the number of seeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SeedConfig {
    /// One generator per named stream.
    Independent { streams: BTreeMap<String, u64> },
    /// See [`RngRegistry::legacy`].
    Legacy {
        shared: u64,
        measurement_outcome: u64,
        state_init: u64,
    },
}

impl SeedConfig {
    /// Build a fresh registry.
    pub fn registry(&self) -> Result<RngRegistry> {
        match self {
            SeedConfig::Independent { streams } => {
                RngRegistry::from_named(streams.iter().map(|(k, v)| (k, *v)))
            }
            SeedConfig::Legacy {
                shared,
                measurement_outcome,
                state_init,
            } => Ok(RngRegistry::legacy(*shared, *measurement_outcome, *state_init)),
        }
    }
}

fn default_trials() -> usize {
    1
}

fn default_policy() -> String {
    "every-trial".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Preset name: `every-trial`, `every-operation` or `final-trial-only`.
    #[serde(default = "default_policy")]
    pub policy: String,
    pub seeds: SeedConfig,
}

impl RunConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn policy(&self) -> Result<RecordingPolicy> {
        self.policy.parse()
    }

    /// Check the trial count, policy name and seeds.
    pub fn validate(&self) -> Result<()> {
        if self.trials < 1 {
            return Err(Error::InvalidTrialCount(self.trials));
        }
        self.policy()?;
        self.seeds.registry()?;
        Ok(())
    }
}

/// Execute `circuit` as configured, with a freshly seeded registry.
///
/// Every configuration error is raised before `state` is touched.
pub fn run<S: StateHandle + ?Sized>(
    circuit: &Circuit,
    state: &mut S,
    config: &RunConfig,
) -> Result<ExecutionReport> {
    if config.trials < 1 {
        return Err(Error::InvalidTrialCount(config.trials));
    }
    let policy = config.policy()?;
    let mut rngs = config.seeds.registry()?;
    info!(mode = ?rngs.mode(), policy = %config.policy, "run configured");
    execute(circuit, state, &mut rngs, config.trials, &policy)
}
