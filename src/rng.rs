//! Named random streams.
//!
//! Every category of randomness draws from its own stream so that, for
//! example, the number of Born-rule samples taken by a state collaborator
//! never shifts the sequence used for branch decisions.
//!
//! # Overview
//!
//! - [`StreamName`] - the finite set of recognized streams
//! - [`RngRegistry::new`] - one independent generator per seeded stream
//! - [`RngRegistry::legacy`] - compatibility layout where control,
//!   projection and unitary sampling share one generator

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Category of randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamName {
    /// Branch decisions of control operations.
    Control,
    /// Branch decisions of projective-measurement operations.
    Projection,
    /// Random unitaries drawn by the state collaborator.
    UnitarySampling,
    /// Born-rule outcomes drawn by the state collaborator.
    MeasurementOutcome,
    /// Random initial states.
    StateInit,
}

impl StreamName {
    pub const ALL: [StreamName; 5] = [
        StreamName::Control,
        StreamName::Projection,
        StreamName::UnitarySampling,
        StreamName::MeasurementOutcome,
        StreamName::StateInit,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamName::Control => "control",
            StreamName::Projection => "projection",
            StreamName::UnitarySampling => "unitary-sampling",
            StreamName::MeasurementOutcome => "measurement-outcome",
            StreamName::StateInit => "state-init",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamName {
    type Err = Error;

    /// Parses the canonical names plus the short forms `ctrl`, `proj`,
    /// `haar`, `born` and `init`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "control" | "ctrl" => Ok(StreamName::Control),
            "projection" | "proj" => Ok(StreamName::Projection),
            "unitary-sampling" | "haar" => Ok(StreamName::UnitarySampling),
            "measurement-outcome" | "born" => Ok(StreamName::MeasurementOutcome),
            "state-init" | "init" => Ok(StreamName::StateInit),
            other => Err(Error::UnknownStream(other.to_string())),
        }
    }
}

/// How streams map onto generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    /// One generator per seeded stream.
    Independent,
    /// Control, projection and unitary sampling share a generator.
    Legacy,
}

/// Registry of independently seeded random streams.
///
/// # Example
/// ```
/// use qtraj::rng::{RngRegistry, StreamName};
///
/// let mut a = RngRegistry::new([(StreamName::Control, 7)]);
/// let mut b = RngRegistry::new([(StreamName::Control, 7)]);
/// let r = a.draw_uniform(StreamName::Control).unwrap();
/// assert!((0.0..1.0).contains(&r));
/// assert_eq!(r, b.draw_uniform(StreamName::Control).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct RngRegistry {
    sources: Vec<ChaCha8Rng>,
    route: [Option<usize>; 5],
    draws: [u64; 5],
    mode: SeedMode,
}

impl RngRegistry {
    /// Create a registry with one generator per given stream.
    ///
    /// Streams without a seed stay unseeded; drawing from them fails with
    /// [`Error::UnseededStream`].
    pub fn new(seeds: impl IntoIterator<Item = (StreamName, u64)>) -> Self {
        let mut sources = Vec::new();
        let mut route = [None; 5];
        for (name, seed) in seeds {
            let source = ChaCha8Rng::seed_from_u64(seed);
            match route[name.slot()] {
                Some(i) => sources[i] = source,
                None => {
                    route[name.slot()] = Some(sources.len());
                    sources.push(source);
                }
            }
        }
        RngRegistry {
            sources,
            route,
            draws: [0; 5],
            mode: SeedMode::Independent,
        }
    }

    /// Create a registry from string-keyed seeds, rejecting unknown names.
    pub fn from_named<K: AsRef<str>>(seeds: impl IntoIterator<Item = (K, u64)>) -> Result<Self> {
        let parsed = seeds
            .into_iter()
            .map(|(name, seed)| -> Result<(StreamName, u64)> {
                Ok((name.as_ref().parse()?, seed))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        Ok(Self::new(parsed))
    }

    /// Compatibility layout reproducing an ordering where one generator
    /// serves control, projection and unitary sampling.
    ///
    /// Never selected implicitly; a caller must ask for it.
    pub fn legacy(shared: u64, measurement_outcome: u64, state_init: u64) -> Self {
        let sources = vec![
            ChaCha8Rng::seed_from_u64(shared),
            ChaCha8Rng::seed_from_u64(measurement_outcome),
            ChaCha8Rng::seed_from_u64(state_init),
        ];
        let mut route = [None; 5];
        route[StreamName::Control.slot()] = Some(0);
        route[StreamName::Projection.slot()] = Some(0);
        route[StreamName::UnitarySampling.slot()] = Some(0);
        route[StreamName::MeasurementOutcome.slot()] = Some(1);
        route[StreamName::StateInit.slot()] = Some(2);
        RngRegistry {
            sources,
            route,
            draws: [0; 5],
            mode: SeedMode::Legacy,
        }
    }

    pub fn mode(&self) -> SeedMode {
        self.mode
    }

    /// Whether the stream has a generator.
    pub fn is_seeded(&self, name: StreamName) -> bool {
        self.route[name.slot()].is_some()
    }

    /// Draw one uniform value in [0, 1) from a stream.
    pub fn draw_uniform(&mut self, name: StreamName) -> Result<f64> {
        let index = self.route[name.slot()].ok_or(Error::UnseededStream(name))?;
        self.draws[name.slot()] += 1;
        Ok(self.sources[index].r#gen::<f64>())
    }

    /// Draw by stream name, failing with [`Error::UnknownStream`] for names
    /// outside the recognized set.
    pub fn draw_named(&mut self, name: &str) -> Result<f64> {
        let stream = name.parse::<StreamName>()?;
        self.draw_uniform(stream)
    }

    /// Mutable access to the generator behind a stream, for collaborators
    /// that need more than uniform floats. Does not count as a draw.
    pub fn source(&mut self, name: StreamName) -> Result<&mut ChaCha8Rng> {
        let index = self.route[name.slot()].ok_or(Error::UnseededStream(name))?;
        Ok(&mut self.sources[index])
    }

    /// Number of uniform draws taken through `name` so far.
    pub fn draw_count(&self, name: StreamName) -> u64 {
        self.draws[name.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for name in StreamName::ALL {
            assert_eq!(name.as_str().parse::<StreamName>().unwrap(), name);
        }
        assert_eq!("born".parse::<StreamName>().unwrap(), StreamName::MeasurementOutcome);
        assert!(matches!(
            "ctl".parse::<StreamName>(),
            Err(Error::UnknownStream(ref s)) if s == "ctl"
        ));
    }

    #[test]
    fn test_route_slots_distinct() {
        let slots: Vec<usize> = StreamName::ALL.iter().map(|s| s.slot()).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
    }
}
