//! Restricted JSONPath evaluation over `serde_json` trees.
//!
//! The dialect understood here is deliberately small: the root reference `$`,
//! dotted descent (`$.order.items`), and numeric indices into arrays
//! (`$.items.0`). A bare path with no `$` prefix is equivalent to the same
//! path anchored at the root.
//!
//! Reads are total: a missing key, an out-of-range index, or descent through
//! a non-container all yield `Value::Null`. The evaluator makes no
//! distinction between a key that is absent and a key that is explicitly
//! null; `get_at` returns `Value::Null` for both, and every caller in this
//! crate relies on that single rule.
//!
//! Writes are copy-on-write: [`set_at`] returns a new tree, creating
//! intermediate objects as needed. When the written value and the existing
//! value at the target are both objects they are merged recursively; any
//! other combination is replaced by the new subtree.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use stateweave::paths::{get_at, set_at};
//!
//! let data = json!({"order": {"items": [{"sku": "a-1"}]}});
//! assert_eq!(get_at(&data, "$.order.items.0.sku"), json!("a-1"));
//! assert_eq!(get_at(&data, "$.order.missing"), json!(null));
//!
//! let updated = set_at(&data, "$.order.total", json!(250));
//! assert_eq!(get_at(&updated, "$.order.total"), json!(250));
//! // the original tree is untouched
//! assert_eq!(get_at(&data, "$.order.total"), json!(null));
//! ```

use serde_json::{Map, Value};

/// Split a path into its descent segments.
///
/// The leading `$` (when present) is stripped; empty segments are ignored so
/// `$`, `$.`, and `""` all address the root.
fn segments(path: &str) -> Vec<&str> {
    let trimmed = path.trim();
    let rest = trimmed.strip_prefix('$').unwrap_or(trimmed);
    rest.split('.').filter(|s| !s.is_empty()).collect()
}

/// Resolve `path` against `root`, yielding the addressed value.
///
/// Total over all inputs: anything unresolvable is `Value::Null`.
#[must_use]
pub fn get_at(root: &Value, path: &str) -> Value {
    let mut current = root;
    for segment in segments(path) {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => return Value::Null,
            },
            Value::Array(items) => {
                match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                    Some(value) => value,
                    None => return Value::Null,
                }
            }
            _ => return Value::Null,
        };
    }
    current.clone()
}

/// Return a new tree in which `path` resolves to `value`.
///
/// `set_at(root, "$", value)` is `value` itself. For deeper paths the
/// original tree is cloned, intermediate objects are created along the way,
/// and the final position is merged: object-into-object recursively, every
/// other combination replaced by the incoming subtree. Numeric segments
/// descend into existing array elements in place; a numeric segment that does
/// not address an existing element creates an object keyed by the literal
/// segment, like any other key.
#[must_use]
pub fn set_at(root: &Value, path: &str, value: Value) -> Value {
    let segs = segments(path);
    if segs.is_empty() {
        return value;
    }
    let mut out = root.clone();
    set_segments(&mut out, &segs, value);
    out
}

fn set_segments(current: &mut Value, segs: &[&str], value: Value) {
    let Some((head, rest)) = segs.split_first() else {
        let existing = std::mem::replace(current, Value::Null);
        *current = merged(existing, value);
        return;
    };

    if let Value::Array(items) = current {
        if let Some(slot) = head.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            set_segments(slot, rest, value);
            return;
        }
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        let slot = map.entry(head.to_string()).or_insert(Value::Null);
        set_segments(slot, rest, value);
    }
}

/// Merge `incoming` over `existing`: objects merge key-by-key recursively,
/// everything else is won by `incoming`.
fn merged(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, value) in right {
                match left.remove(&key) {
                    Some(previous) => {
                        left.insert(key, merged(previous, value));
                    }
                    None => {
                        left.insert(key, value);
                    }
                }
            }
            Value::Object(left)
        }
        (_, incoming) => incoming,
    }
}
