use qtraj::circuit::Circuit;
use qtraj::config::{run, RunConfig, SeedConfig};
use qtraj::easybuild::control_staircase;
use qtraj::error::{Error, ErrorKind};
use qtraj::gate::Gate;
use qtraj::geometry::{Geometry, Topology};
use qtraj::rng::SeedMode;
use qtraj::trace::TraceState;

fn simple_circuit() -> Circuit {
    Circuit::builder(2, Topology::Open)
        .steps(2)
        .deterministic(Gate::H, Geometry::site(0))
        .build()
        .unwrap()
}

#[test]
fn test_parse_independent() {
    let config = RunConfig::from_json(
        r#"{"trials": 4, "policy": "every-operation",
            "seeds": {"mode": "independent", "streams": {"control": 1, "projection": 2}}}"#,
    )
    .unwrap();
    assert_eq!(config.trials, 4);
    assert!(config.validate().is_ok());
    assert_eq!(config.seeds.registry().unwrap().mode(), SeedMode::Independent);
}

#[test]
fn test_defaults() {
    let config = RunConfig::from_json(r#"{"seeds": {"mode": "legacy", "shared": 1, "measurement_outcome": 2, "state_init": 3}}"#)
        .unwrap();
    assert_eq!(config.trials, 1);
    assert_eq!(config.policy, "every-trial");
    assert_eq!(config.seeds.registry().unwrap().mode(), SeedMode::Legacy);
}

#[test]
fn test_mode_is_required() {
    let err = RunConfig::from_json(r#"{"seeds": {"streams": {"control": 1}}}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Description);
}

#[test]
fn test_run_counts() {
    let config = RunConfig {
        trials: 3,
        policy: "every-operation".to_string(),
        seeds: SeedConfig::Independent {
            streams: [("control".to_string(), 5)].into_iter().collect(),
        },
    };
    let mut state = TraceState::new();
    let report = run(&simple_circuit(), &mut state, &config).unwrap();
    assert_eq!(report.captures, 6);
    assert_eq!(state.applied().count(), 6);
}

#[test]
fn test_run_rejects_bad_policy_before_mutation() {
    let config = RunConfig {
        trials: 3,
        policy: "sometimes".to_string(),
        seeds: SeedConfig::Independent {
            streams: [("control".to_string(), 5)].into_iter().collect(),
        },
    };
    let mut state = TraceState::new();
    let err = run(&simple_circuit(), &mut state, &config).unwrap_err();
    assert!(matches!(err, Error::UnknownPolicy(_)));
    assert!(err.is_validation());
    assert!(state.events().is_empty());
}

#[test]
fn test_run_rejects_zero_trials() {
    let config = RunConfig {
        trials: 0,
        policy: "every-trial".to_string(),
        seeds: SeedConfig::Legacy { shared: 1, measurement_outcome: 2, state_init: 3 },
    };
    assert!(matches!(config.validate(), Err(Error::InvalidTrialCount(0))));
    let mut state = TraceState::new();
    assert!(run(&simple_circuit(), &mut state, &config).is_err());
    assert!(state.events().is_empty());
}

#[test]
fn test_run_rejects_unknown_stream_seed() {
    let config = RunConfig {
        trials: 1,
        policy: "every-trial".to_string(),
        seeds: SeedConfig::Independent {
            streams: [("clock".to_string(), 5)].into_iter().collect(),
        },
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(err, Error::UnknownStream(ref s) if s == "clock"));
}

#[test]
fn test_legacy_run_is_reproducible() {
    let circuit = control_staircase(5, 6, 0.4, 0.3).unwrap();
    let config = RunConfig {
        trials: 4,
        policy: "final-trial-only".to_string(),
        seeds: SeedConfig::Legacy { shared: 10, measurement_outcome: 11, state_init: 12 },
    };
    let mut a = TraceState::new();
    let mut b = TraceState::new();
    run(&circuit, &mut a, &config).unwrap();
    run(&circuit, &mut b, &config).unwrap();
    assert_eq!(a, b);
}
