use crate::error::{CoreError, CoreResult};
use crate::evidence::model::EvaluationResponse;
use serde_json::Value;
use std::collections::BTreeMap;

use super::record_id::sha256_hex;

/// SHA-256 over the canonical JSON of `response` with record ids replaced by
/// positional placeholders. Two runs over the same inputs with the same clock
/// produce the same fingerprint.
pub fn response_fingerprint(response: &EvaluationResponse) -> CoreResult<String> {
    let bytes = canonical_bytes(&Value::from(stable_view(response)?))?;
    Ok(sha256_hex(&bytes))
}

fn stable_view(response: &EvaluationResponse) -> CoreResult<serde_json::Map<String, Value>> {
    let mut r = response.clone();
    let mut renamed: BTreeMap<String, String> = BTreeMap::new();
    for (i, o) in r.observations.iter_mut().enumerate() {
        let placeholder = format!("o_{:04}", i + 1);
        renamed.insert(std::mem::replace(&mut o.id, placeholder.clone()), placeholder);
    }
    for (i, f) in r.findings.iter_mut().enumerate() {
        f.id = format!("f_{:04}", i + 1);
        for related in f.related_observations.iter_mut() {
            if let Some(p) = renamed.get(related) {
                *related = p.clone();
            }
        }
    }
    match serde_json::to_value(&r)? {
        Value::Object(m) => Ok(m),
        _ => Err(CoreError::DeterminismViolation(
            "response did not serialize to an object".to_string(),
        )),
    }
}

fn canonical_bytes(v: &Value) -> CoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(&sorted(v)?)?)
}

// Rebuilds objects with keys inserted in sorted order so the output does not
// depend on serde_json's map backing.
fn sorted(v: &Value) -> CoreResult<Value> {
    match v {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => Err(CoreError::DeterminismViolation(
            "canonical JSON forbids non-integer numbers".to_string(),
        )),
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(sorted).collect::<CoreResult<Vec<_>>>()?,
        )),
        Value::Object(map) => {
            let keys: BTreeMap<&String, &Value> = map.iter().collect();
            let mut out = serde_json::Map::new();
            for (k, vv) in keys {
                out.insert(k.clone(), sorted(vv)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}
