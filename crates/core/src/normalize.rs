//! Payload shape normalization.
//!
//! Each function here turns one payload shape into the plain mapping placed
//! under the envelope's `data` key. Merge collisions are logged, never fatal.

use serde_json::{Map, Value};

use crate::config::FormatConfig;
use crate::merge::merge_all;
use crate::pagination::{extract_meta, DATA_KEY};

/// Paginator descriptor: `{collection_field: items}` plus the meta block.
pub fn paginated(mut descriptor: Map<String, Value>, format: &FormatConfig) -> Map<String, Value> {
    let meta = extract_meta(&descriptor, &format.pagination);
    let items = match descriptor.remove(DATA_KEY) {
        Some(items) => items,
        None => {
            tracing::warn!("Paginator descriptor has no `data` key, rendering an empty list");
            Value::Array(Vec::new())
        }
    };

    merged("paginated", [single(&format.collection_field, items), meta])
}

/// Single resource: resolved form, then `with`, then `additional`.
pub fn resource(
    resolved: Map<String, Value>,
    with: Map<String, Value>,
    additional: Map<String, Value>,
) -> Map<String, Value> {
    merged("resource", [resolved, with, additional])
}

/// Resource collection: `{collection_field: items}`, `with`, `additional`,
/// and the meta block when the collection came from a paginator.
pub fn collection(
    items: Vec<Value>,
    with: Map<String, Value>,
    additional: Map<String, Value>,
    pagination: Option<&Map<String, Value>>,
    format: &FormatConfig,
) -> Map<String, Value> {
    let mut parts = vec![
        single(&format.collection_field, Value::Array(items)),
        with,
        additional,
    ];
    if let Some(descriptor) = pagination {
        parts.push(extract_meta(descriptor, &format.pagination));
    }

    merged("collection", parts)
}

/// Wrap a raw value into a mapping-shaped value: `null` becomes an empty
/// list, other scalars a one-element list, lists and objects pass through.
pub fn wrap(value: Value) -> Value {
    match value {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(_) | Value::Object(_) => value,
        scalar => Value::Array(vec![scalar]),
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

fn merged<I>(shape: &'static str, parts: I) -> Map<String, Value>
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let (map, collisions) = merge_all(parts);
    if !collisions.is_empty() {
        tracing::warn!(shape, ?collisions, "Payload keys collided while merging, later values kept");
    }
    map
}
