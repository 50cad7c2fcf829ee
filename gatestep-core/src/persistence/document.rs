//! The module document: `{ "running": bool, "gates": [0|1; 16], "gateMode": int }`.
//!
//! Every key is optional on load. A missing or wrong-typed key leaves the
//! corresponding field as it was, so older and newer documents both load.

use serde_json::{json, Map, Value};

use gatestep_types::{GateMode, SequencerState, MAX_STEPS};

const KEY_RUNNING: &str = "running";
const KEY_GATES: &str = "gates";
const KEY_GATE_MODE: &str = "gateMode";

pub fn to_document(state: &SequencerState) -> Value {
    let gates: Vec<i64> = state.gates.iter().map(|&g| i64::from(g)).collect();
    json!({
        "running": state.running,
        "gates": gates,
        "gateMode": state.gate_mode.code(),
    })
}

/// Overlay `doc` onto `state`. Anything that is not an object is ignored.
pub fn apply_document(doc: &Value, state: &mut SequencerState) {
    let Some(obj) = doc.as_object() else {
        log::warn!(target: "persistence", "module document is not an object, ignoring");
        return;
    };

    apply_running(obj, state);
    apply_gates(obj, state);
    apply_gate_mode(obj, state);
}

fn apply_running(obj: &Map<String, Value>, state: &mut SequencerState) {
    match obj.get(KEY_RUNNING) {
        None => {}
        Some(Value::Bool(running)) => state.running = *running,
        Some(other) => {
            log::warn!(target: "persistence", "'{}' is not a boolean: {}", KEY_RUNNING, other)
        }
    }
}

fn apply_gates(obj: &Map<String, Value>, state: &mut SequencerState) {
    let gates = match obj.get(KEY_GATES) {
        None => return,
        Some(Value::Array(gates)) => gates,
        Some(other) => {
            log::warn!(target: "persistence", "'{}' is not an array: {}", KEY_GATES, other);
            return;
        }
    };

    if gates.len() > MAX_STEPS {
        log::warn!(
            target: "persistence",
            "'{}' has {} entries, ignoring all past {}",
            KEY_GATES,
            gates.len(),
            MAX_STEPS
        );
    }

    for (step, entry) in gates.iter().take(MAX_STEPS).enumerate() {
        match gate_value(entry) {
            Some(on) => state.gates[step] = on,
            None => {
                log::warn!(target: "persistence", "gate {} has unusable value {}, keeping {}", step, entry, state.gates[step])
            }
        }
    }
}

/// Integers are on when nonzero. Booleans are taken as they are.
fn gate_value(entry: &Value) -> Option<bool> {
    match entry {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i != 0)
            } else {
                n.as_u64().map(|u| u != 0)
            }
        }
        _ => None,
    }
}

fn apply_gate_mode(obj: &Map<String, Value>, state: &mut SequencerState) {
    match obj.get(KEY_GATE_MODE) {
        None => {}
        Some(value) => match value.as_i64() {
            Some(code) => state.gate_mode = GateMode::from_code(code),
            None => {
                log::warn!(target: "persistence", "'{}' is not an integer: {}", KEY_GATE_MODE, value)
            }
        },
    }
}
