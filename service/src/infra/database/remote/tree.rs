//! JSON [`Tree`] mirroring a subscribed path.

use std::mem;

use serde_json::{Map, Value};

/// JSON tree of a subscribed path, updated by `put` and `patch` events.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tree(Value);

impl Tree {
    /// Returns the root [`Value`] of this [`Tree`].
    pub(crate) fn root(&self) -> &Value {
        &self.0
    }

    /// Replaces the node at the provided relative `path`.
    ///
    /// A `null` data removes the node, along with any parents left empty.
    pub(crate) fn put(&mut self, path: &str, data: Value) {
        let segments = segments(path);
        self.0 = put(mem::take(&mut self.0), &segments, data);
    }

    /// Replaces every child of the node at the provided relative `path`
    /// listed in the provided `data` object.
    pub(crate) fn patch(&mut self, path: &str, data: Value) {
        let Value::Object(children) = data else {
            self.put(path, data);
            return;
        };
        let base = segments(path);
        for (key, child) in children {
            let mut path = base.clone();
            path.extend(segments(&key));
            self.0 = put(mem::take(&mut self.0), &path, child);
        }
    }
}

/// Splits the provided `path` into its non-empty segments.
fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Puts the `data` at the `path` inside the provided `node`, returning the
/// updated `node`.
fn put(node: Value, path: &[String], data: Value) -> Value {
    let Some((head, rest)) = path.split_first() else {
        return data;
    };

    let mut map = match node {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Map::new()
        }
    };
    let child = map.remove(head).unwrap_or(Value::Null);
    let child = put(child, rest, data);
    if !child.is_null() {
        _ = map.insert(head.clone(), child);
    }

    if map.is_empty() {
        Value::Null
    } else {
        Value::Object(map)
    }
}
