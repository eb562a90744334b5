//! Recursive mapping merge used when combining resource output, `with` /
//! `additional` mappings and pagination metadata.
//!
//! Policy:
//!
//! - object + object: merged key by key, recursively;
//! - list + list: concatenated, left items first;
//! - anything else: the right-hand value replaces the left-hand one and the
//!   key path is reported as a collision.

use serde_json::{Map, Value};

/// Merge `source` into `target`, returning the dotted paths of every
/// collision where a value was replaced rather than merged.
pub fn merge_recursive(target: &mut Map<String, Value>, source: Map<String, Value>) -> Vec<String> {
    let mut collisions = Vec::new();
    merge_into(target, source, "", &mut collisions);
    collisions
}

/// Merge a sequence of mappings left to right into a fresh mapping.
pub fn merge_all<I>(maps: I) -> (Map<String, Value>, Vec<String>)
where
    I: IntoIterator<Item = Map<String, Value>>,
{
    let mut merged = Map::new();
    let mut collisions = Vec::new();
    for map in maps {
        collisions.extend(merge_recursive(&mut merged, map));
    }
    (merged, collisions)
}

fn merge_into(
    target: &mut Map<String, Value>,
    source: Map<String, Value>,
    prefix: &str,
    collisions: &mut Vec<String>,
) {
    for (key, incoming) in source {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        let Some(existing) = target.get_mut(&key) else {
            target.insert(key, incoming);
            continue;
        };

        match (existing, incoming) {
            (Value::Object(existing), Value::Object(incoming)) => {
                merge_into(existing, incoming, &path, collisions);
            }
            (Value::Array(existing), Value::Array(incoming)) => {
                existing.extend(incoming);
            }
            (existing, incoming) => {
                *existing = incoming;
                collisions.push(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn disjoint_keys_are_combined_in_order() {
        let (merged, collisions) = merge_all([obj(json!({"a": 1})), obj(json!({"b": 2}))]);
        assert_eq!(Value::Object(merged).to_string(), r#"{"a":1,"b":2}"#);
        assert!(collisions.is_empty());
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut target = obj(json!({"meta": {"total": 3}}));
        let collisions = merge_recursive(&mut target, obj(json!({"meta": {"per_page": 10}})));
        assert_eq!(Value::Object(target), json!({"meta": {"total": 3, "per_page": 10}}));
        assert!(collisions.is_empty());
    }

    #[test]
    fn lists_are_concatenated() {
        let mut target = obj(json!({"tags": ["a"]}));
        merge_recursive(&mut target, obj(json!({"tags": ["b", "c"]})));
        assert_eq!(target["tags"], json!(["a", "b", "c"]));
    }

    #[test]
    fn scalar_collision_takes_right_value_and_is_reported() {
        let mut target = obj(json!({"meta": {"version": 1}, "name": "left"}));
        let collisions = merge_recursive(
            &mut target,
            obj(json!({"meta": {"version": 2}, "name": "right"})),
        );
        assert_eq!(target["meta"]["version"], 2);
        assert_eq!(target["name"], "right");
        assert_eq!(collisions, vec!["meta.version", "name"]);
    }

    #[test]
    fn shape_mismatch_is_a_collision() {
        let mut target = obj(json!({"list": [1, 2]}));
        let collisions = merge_recursive(&mut target, obj(json!({"list": {"x": 1}})));
        assert_eq!(target["list"], json!({"x": 1}));
        assert_eq!(collisions, vec!["list"]);
    }
}
