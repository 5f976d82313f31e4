//! Structural summaries of JSON payloads used in mismatch diagnostics.

// self
use crate::_prelude::*;

/// Collects every dotted key path in `value`.
///
/// List elements contribute their keys under the list's own path, without indices, so a list of
/// homogeneous objects yields each field path once.
pub fn key_paths(value: &Value) -> BTreeSet<String> {
	let mut paths = BTreeSet::new();

	collect_paths(value, "", &mut paths);

	paths
}

fn collect_paths(value: &Value, parent: &str, paths: &mut BTreeSet<String>) {
	match value {
		Value::Object(map) =>
			for (key, child) in map {
				let path = if parent.is_empty() { key.clone() } else { format!("{parent}.{key}") };

				collect_paths(child, &path, paths);
				paths.insert(path);
			},
		Value::Array(items) =>
			for item in items {
				collect_paths(item, parent, paths);
			},
		_ => {},
	}
}

/// Replaces every scalar in `value` with its type name; lists shrink to their first element.
pub fn skeleton(value: &Value) -> Value {
	match value {
		Value::Object(map) =>
			Value::Object(map.iter().map(|(key, child)| (key.clone(), skeleton(child))).collect()),
		Value::Array(items) => Value::Array(items.first().map(skeleton).into_iter().collect()),
		Value::String(_) => Value::from("string"),
		Value::Number(number) if number.is_f64() => Value::from("float"),
		Value::Number(_) => Value::from("integer"),
		Value::Bool(_) => Value::from("bool"),
		Value::Null => Value::from("null"),
	}
}
