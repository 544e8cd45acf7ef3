use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::circuit::{Circuit, Operation, Outcome, Placement};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::geometry::{Geometry, Topology};
use crate::rng::StreamName;

#[derive(Serialize, Deserialize)]
struct CircuitJson {
    num_sites: usize,
    steps: usize,
    #[serde(default)]
    topology: Topology,
    operations: Vec<OperationJson>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum OperationJson {
    #[serde(rename = "deterministic")]
    Deterministic {
        gate: GateJson,
        geometry: Geometry,
    },
    #[serde(rename = "stochastic")]
    Stochastic {
        stream: String,
        outcomes: Vec<OutcomeJson>,
    },
}

#[derive(Serialize, Deserialize)]
struct OutcomeJson {
    probability: f64,
    gate: GateJson,
    geometry: Geometry,
}

#[derive(Serialize, Deserialize)]
struct GateJson {
    gate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matrix: Option<Vec<Vec<[f64; 2]>>>,
}

fn named(name: &str) -> GateJson {
    GateJson {
        gate: name.to_string(),
        params: None,
        label: None,
        matrix: None,
    }
}

fn with_params(name: &str, params: Vec<f64>) -> GateJson {
    GateJson {
        params: Some(params),
        ..named(name)
    }
}

fn gate_to_json(gate: &Gate) -> GateJson {
    match gate {
        Gate::X => named("X"),
        Gate::Y => named("Y"),
        Gate::Z => named("Z"),
        Gate::H => named("H"),
        Gate::S => named("S"),
        Gate::T => named("T"),
        Gate::SWAP => named("SWAP"),
        Gate::CNOT => named("CNOT"),
        Gate::CZ => named("CZ"),
        Gate::Rx(theta) => with_params("Rx", vec![*theta]),
        Gate::Ry(theta) => with_params("Ry", vec![*theta]),
        Gate::Rz(theta) => with_params("Rz", vec![*theta]),
        Gate::Haar => named("Haar"),
        Gate::Measure => named("Measure"),
        Gate::Project(level) => with_params("Project", vec![*level as f64]),
        Gate::Reset => named("Reset"),
        Gate::Custom { matrix, label } => {
            let mat: Vec<Vec<[f64; 2]>> = matrix
                .rows()
                .into_iter()
                .map(|row| row.iter().map(|c| [c.re, c.im]).collect())
                .collect();
            GateJson {
                label: Some(label.clone()),
                matrix: Some(mat),
                ..named("Custom")
            }
        }
    }
}

fn first_param(gj: &GateJson) -> Result<f64> {
    gj.params
        .as_ref()
        .and_then(|p| p.first().copied())
        .ok_or_else(|| Error::InvalidCircuit(format!("{} gate requires 1 parameter", gj.gate)))
}

fn json_to_gate(gj: GateJson) -> Result<Gate> {
    let gate = match gj.gate.as_str() {
        "X" => Gate::X,
        "Y" => Gate::Y,
        "Z" => Gate::Z,
        "H" => Gate::H,
        "S" => Gate::S,
        "T" => Gate::T,
        "SWAP" => Gate::SWAP,
        "CNOT" => Gate::CNOT,
        "CZ" => Gate::CZ,
        "Rx" => Gate::Rx(first_param(&gj)?),
        "Ry" => Gate::Ry(first_param(&gj)?),
        "Rz" => Gate::Rz(first_param(&gj)?),
        "Haar" => Gate::Haar,
        "Measure" => Gate::Measure,
        "Project" => {
            let level = first_param(&gj)?;
            if level < 0.0 || level.fract() != 0.0 {
                return Err(Error::InvalidCircuit(format!(
                    "Project level must be a non-negative integer, got {}",
                    level
                )));
            }
            Gate::Project(level as usize)
        }
        "Reset" => Gate::Reset,
        "Custom" => {
            let mat_data = gj
                .matrix
                .ok_or_else(|| Error::InvalidCircuit("Custom gate requires matrix".into()))?;
            let nrows = mat_data.len();
            if nrows == 0 {
                return Err(Error::InvalidCircuit("Custom gate matrix cannot be empty".into()));
            }
            let ncols = mat_data[0].len();
            let mut elements = Vec::with_capacity(nrows * ncols);
            for row in &mat_data {
                if row.len() != ncols {
                    return Err(Error::InvalidCircuit(
                        "Custom gate matrix rows must have equal length".into(),
                    ));
                }
                elements.extend(row.iter().map(|&[re, im]| Complex64::new(re, im)));
            }
            let matrix = Array2::from_shape_vec((nrows, ncols), elements)
                .map_err(|e| Error::InvalidCircuit(format!("failed to construct matrix: {}", e)))?;
            Gate::Custom {
                matrix,
                label: gj.label.unwrap_or_default(),
            }
        }
        other => return Err(Error::InvalidCircuit(format!("unknown gate type: {}", other))),
    };
    Ok(gate)
}

/// Serialize a circuit description to a pretty-printed JSON string.
///
/// Staircase geometries are written with their declared start position.
pub fn circuit_to_json(circuit: &Circuit) -> Result<String> {
    let operations = circuit
        .operations()
        .iter()
        .map(|op| match op {
            Operation::Deterministic(p) => OperationJson::Deterministic {
                gate: gate_to_json(&p.gate),
                geometry: p.geometry.clone(),
            },
            Operation::Stochastic { outcomes, stream } => OperationJson::Stochastic {
                stream: stream.as_str().to_string(),
                outcomes: outcomes
                    .iter()
                    .map(|o| OutcomeJson {
                        probability: o.probability,
                        gate: gate_to_json(&o.placement.gate),
                        geometry: o.placement.geometry.clone(),
                    })
                    .collect(),
            },
        })
        .collect();

    let circuit_json = CircuitJson {
        num_sites: circuit.num_sites(),
        steps: circuit.steps(),
        topology: circuit.topology(),
        operations,
    };
    Ok(serde_json::to_string_pretty(&circuit_json)?)
}

/// Deserialize and validate a circuit description.
///
/// # Errors
/// [`Error::Json`] for malformed JSON, [`Error::UnknownStream`] for stream
/// names outside the recognized set, and every error
/// [`crate::circuit::CircuitBuilder::build`] raises.
pub fn circuit_from_json(json: &str) -> Result<Circuit> {
    let circuit_json: CircuitJson = serde_json::from_str(json)?;

    let mut builder = Circuit::builder(circuit_json.num_sites, circuit_json.topology)
        .steps(circuit_json.steps);
    for oj in circuit_json.operations {
        let op = match oj {
            OperationJson::Deterministic { gate, geometry } => {
                Operation::Deterministic(Placement::new(json_to_gate(gate)?, geometry))
            }
            OperationJson::Stochastic { stream, outcomes } => Operation::Stochastic {
                stream: stream.parse::<StreamName>()?,
                outcomes: outcomes
                    .into_iter()
                    .map(|o| -> Result<Outcome> {
                        Ok(Outcome {
                            probability: o.probability,
                            placement: Placement::new(json_to_gate(o.gate)?, o.geometry),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            },
        };
        builder = builder.push(op);
    }
    builder.build()
}
