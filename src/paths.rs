//! Path enumeration over nested configuration
//!
//! Produces every dot-delimited address into a mapping: intermediate nodes
//! and leaves, pre-order, in key declaration order.
//!
//! A key that is empty or contains `.` has no dot path. It is skipped along
//! with its subtree, and a warning is logged.

use serde_json::Value;

/// Nesting depth past which enumeration stops descending.
pub const MAX_PATH_DEPTH: usize = 128;

/// Enumerate every addressable path in `value`.
///
/// Only non-empty mappings are descended into; arrays, scalars and empty
/// mappings are leaves. A non-mapping root has no paths.
pub fn enumerate_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    walk(value, &mut String::new(), 0, &mut paths);
    paths
}

fn walk(value: &Value, prefix: &mut String, depth: usize, out: &mut Vec<String>) {
    let Value::Object(map) = value else {
        return;
    };

    if depth >= MAX_PATH_DEPTH {
        tracing::warn!(path = %prefix, depth, "path enumeration depth limit reached");
        return;
    }

    for (key, child) in map {
        if !is_addressable(key) {
            tracing::warn!(parent = %prefix, key = %key, "skipping key without a dot path");
            continue;
        }

        let mark = prefix.len();
        if !prefix.is_empty() {
            prefix.push('.');
        }
        prefix.push_str(key);

        out.push(prefix.clone());
        if matches!(child, Value::Object(m) if !m.is_empty()) {
            walk(child, prefix, depth + 1, out);
        }

        prefix.truncate(mark);
    }
}

fn is_addressable(key: &str) -> bool {
    !key.is_empty() && !key.contains('.')
}

/// Resolve a dot path by step-wise mapping lookup.
///
/// Segments follow the same rule as enumeration, so an empty segment never
/// resolves.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| {
        if key.is_empty() {
            return None;
        }
        current.as_object()?.get(key)
    })
}
