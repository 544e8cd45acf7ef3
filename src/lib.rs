pub mod branch;
pub mod circuit;
pub mod config;
pub mod easybuild;
pub mod error;
pub mod execute;
pub mod gate;
pub mod geometry;
pub mod json;
pub mod policy;
pub mod rng;
pub mod schedule;
pub mod trace;

pub use circuit::{outcome, Circuit, CircuitBuilder, Operation, Outcome, Placement};
pub use config::{run, RunConfig, SeedConfig};
pub use error::{BackendError, Error, ErrorKind, Result};
pub use execute::{execute, ExecutionReport, StateHandle};
pub use gate::Gate;
pub use geometry::{Direction, Geometry, Pattern, Staircase, Topology};
pub use json::{circuit_from_json, circuit_to_json};
pub use policy::{every_n_operations, every_n_trials, ExecutionContext, RecordingContext, RecordingPolicy};
pub use rng::{RngRegistry, SeedMode, StreamName};
pub use schedule::{expand, Plan, ScheduledOp, Scheduler};
pub use trace::{TraceEvent, TraceState};
