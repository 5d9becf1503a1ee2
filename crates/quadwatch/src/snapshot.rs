//! Shape-only helpers for an external snapshot collaborator (§6 of the
//! design docs): the core defines the persisted JSON layout but never
//! touches a filesystem itself. An external collaborator that wants to
//! write these values to disk (or a JSON-Lines log) owns that I/O.

use qw_model::{QuadRef, Value};
use serde_json::{json, Value as Json};

/// Renders a [`Value`] as the bare JSON scalar the snapshot shape
/// contract promises (`"alice"`, not `{"Symbol":"alice"}`): `Value`'s own
/// `serde` impl is externally tagged so that it round-trips through every
/// variant (`Quad`'s serialization depends on that), which is the wrong
/// shape for this collaborator-facing contract, so this renders scalars
/// directly instead of going through that impl.
fn value_scalar(value: &Value) -> Json {
    match value {
        Value::Symbol(s) | Value::String(s) => json!(s.as_ref()),
        Value::Number(n) => json!(n),
        Value::Bool(b) => json!(b),
        Value::Null => Json::Null,
        Value::External(_) => json!(format!("{value:?}")),
    }
}

/// One quad rendered as the snapshot collaborator's edge shape:
/// `{source, attr, target, context}`.
fn edge_json(quad: &QuadRef) -> Json {
    json!({
        "source": value_scalar(quad.entity()),
        "attr": value_scalar(quad.attribute()),
        "target": value_scalar(quad.value()),
        "context": value_scalar(quad.context()),
    })
}

/// Builds the full-snapshot JSON object `{ "edges": [...] }`, preserving
/// the order of `edges` (callers typically pass [`crate::Store::edges`],
/// which is already insertion-ordered).
pub fn to_snapshot_json(edges: &[QuadRef]) -> Json {
    json!({ "edges": edges.iter().map(edge_json).collect::<Vec<_>>() })
}

/// Renders `edges` as the JSON values an incremental JSON-Lines log
/// would serialize one-per-line; this function only builds the values,
/// it does not write them anywhere.
pub fn to_log_lines(edges: &[QuadRef]) -> Vec<Json> {
    edges.iter().map(edge_json).collect()
}
