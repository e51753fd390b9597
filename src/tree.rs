//! The format-neutral configuration tree and the bridges into it.
//!
//! Every converter normalizes through [`ConfigTree`], which is a
//! `serde_json::Value` built with `preserve_order`: mapping iteration follows
//! insertion order, so formats that honor ordering (JSON, YAML, TOML) keep the
//! source layout unless sorting is requested.
use std::borrow::Cow;

use serde_json::{Map, Number, Value};

use crate::options::ConversionOptions;

/// Universal in-memory representation exchanged by all converters.
pub type ConfigTree = Value;

/// Mapping node of a [`ConfigTree`].
pub type ConfigMap = Map<String, Value>;

/// Recursively re-orders mapping keys lexicographically.
///
/// Sequence order is kept; mappings nested inside sequences are sorted too.
///
/// # Example
/// ```
/// use serde_json::json;
/// use config_converter::tree::sort_keys;
/// let sorted = sort_keys(json!({"z": 1, "a": {"y": 2, "b": 3}}));
/// let keys: Vec<_> = sorted.as_object().unwrap().keys().cloned().collect();
/// assert_eq!(keys, ["a", "z"]);
/// ```
pub fn sort_keys(tree: ConfigTree) -> ConfigTree {
    match tree {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let sorted: Map<String, Value> = entries
                .into_iter()
                .map(|(k, v)| (k, sort_keys(v)))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

/// Applies the shared pre-serialization options; borrows when nothing changes.
pub fn prepare<'a>(tree: &'a ConfigTree, options: &ConversionOptions) -> Cow<'a, ConfigTree> {
    if options.sort {
        Cow::Owned(sort_keys(tree.clone()))
    } else {
        Cow::Borrowed(tree)
    }
}

/// Returns the mapping stored under `key`, creating it or replacing a non-mapping value.
pub fn child_map<'a>(map: &'a mut ConfigMap, key: &str) -> &'a mut ConfigMap {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(child) => child,
        _ => unreachable!("non-mapping slot was just replaced"),
    }
}

/// Wraps a float as a number node; NaN and infinities become null.
pub fn float_node(f: f64) -> ConfigTree {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Renders a scalar the way flat formats (ENV, INI, XML text) write it.
pub fn scalar_text(value: &ConfigTree) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Converts a `serde_yaml::Value` into a tree, normalizing tagged values too.
pub fn yaml_to_tree(value: serde_yaml::Value) -> ConfigTree {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(num) => {
            if let Some(i) = num.as_i64() {
                Value::Number(Number::from(i))
            } else if let Some(u) = num.as_u64() {
                Value::Number(Number::from(u))
            } else if let Some(f) = num.as_f64() {
                float_node(f)
            } else {
                Value::Null
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_tree).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = Map::new();
            for (k, v) in map {
                obj.insert(yaml_key(k), yaml_to_tree(v));
            }
            Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tagged_value = *tagged;
            yaml_to_tree(tagged_value.value)
        }
    }
}

// Non-string YAML keys (`1: x`, `true: y`) become their YAML text.
fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .unwrap_or_default()
            .trim()
            .to_string(),
    }
}

/// Converts a TOML value into a tree. Datetimes become their RFC 3339 text.
pub fn toml_to_tree(value: toml::Value) -> ConfigTree {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(Number::from(i)),
        toml::Value::Float(f) => float_node(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_tree).collect()),
        toml::Value::Table(table) => {
            let mut obj = Map::new();
            for (k, v) in table {
                obj.insert(k, toml_to_tree(v));
            }
            Value::Object(obj)
        }
    }
}

/// Converts a tree node into TOML.
///
/// Returns `Ok(None)` for null, which TOML cannot express; tables skip such
/// entries while arrays reject them.
pub fn tree_to_toml(value: &ConfigTree) -> Result<Option<toml::Value>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(toml::Value::Boolean(*b))),
        Value::Number(num) => {
            if let Some(i) = num.as_i64() {
                Ok(Some(toml::Value::Integer(i)))
            } else if num.is_u64() {
                Err(format!("integer {num} out of TOML range"))
            } else if let Some(f) = num.as_f64() {
                Ok(Some(toml::Value::Float(f)))
            } else {
                Err(format!("unsupported number {num}"))
            }
        }
        Value::String(s) => Ok(Some(toml::Value::String(s.clone()))),
        Value::Array(arr) => {
            let mut out = Vec::with_capacity(arr.len());
            for (idx, item) in arr.iter().enumerate() {
                match tree_to_toml(item)? {
                    Some(v) => out.push(v),
                    None => return Err(format!("null array element at index {idx}")),
                }
            }
            Ok(Some(toml::Value::Array(out)))
        }
        Value::Object(map) => {
            let mut table = toml::value::Table::new();
            for (k, v) in map {
                if let Some(converted) = tree_to_toml(v)? {
                    table.insert(k.clone(), converted);
                }
            }
            Ok(Some(toml::Value::Table(table)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(tree: &ConfigTree) -> Vec<String> {
        tree.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn sort_keys_reaches_into_sequences() {
        let sorted = sort_keys(json!({"list": [{"b": 1, "a": 2}], "c": null}));
        assert_eq!(keys(&sorted), ["c", "list"]);
        assert_eq!(keys(&sorted["list"][0]), ["a", "b"]);
    }

    #[test]
    fn sort_keys_is_idempotent() {
        let once = sort_keys(json!({"m": {"z": 1, "a": 2}, "b": 3}));
        let twice = sort_keys(once.clone());
        assert_eq!(serde_json::to_string(&once).unwrap(), serde_json::to_string(&twice).unwrap());
    }

    #[test]
    fn insertion_order_is_preserved_without_sort() {
        let tree = json!({"z": 1, "a": 2});
        let prepared = prepare(&tree, &ConversionOptions::default());
        assert!(matches!(prepared, Cow::Borrowed(_)));
        assert_eq!(keys(&prepared), ["z", "a"]);
    }

    #[test]
    fn yaml_non_string_keys_are_stringified() {
        let yaml: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let tree = yaml_to_tree(yaml);
        assert_eq!(tree, json!({"1": "one", "true": "yes"}));
    }

    #[test]
    fn toml_datetime_becomes_string() {
        let table: toml::Table = toml::from_str("at = 1979-05-27T07:32:00Z").unwrap();
        let tree = toml_to_tree(toml::Value::Table(table));
        assert_eq!(tree, json!({"at": "1979-05-27T07:32:00Z"}));
    }

    #[test]
    fn tree_to_toml_skips_null_entries_and_rejects_null_items() {
        let converted = tree_to_toml(&json!({"a": null, "b": 1})).unwrap().unwrap();
        assert_eq!(converted.as_table().unwrap().len(), 1);
        let err = tree_to_toml(&json!({"a": [1, null]})).unwrap_err();
        assert!(err.contains("index 1"), "msg: {err}");
    }

    #[test]
    fn tree_to_toml_rejects_integers_beyond_i64() {
        let err = tree_to_toml(&json!({"id": u64::MAX})).unwrap_err();
        assert_eq!(err, "integer 18446744073709551615 out of TOML range");
        let max = tree_to_toml(&json!({"id": i64::MAX})).unwrap().unwrap();
        assert_eq!(max["id"].as_integer(), Some(i64::MAX));
    }

    #[test]
    fn child_map_replaces_scalars() {
        let mut map = ConfigMap::new();
        map.insert("a".into(), json!(1));
        child_map(&mut map, "a").insert("b".into(), json!(2));
        child_map(&mut map, "c");
        assert_eq!(Value::Object(map), json!({"a": {"b": 2}, "c": {}}));
    }

    #[test]
    fn scalar_text_uses_literal_forms() {
        assert_eq!(scalar_text(&json!(null)), "null");
        assert_eq!(scalar_text(&json!(2.5)), "2.5");
        assert_eq!(scalar_text(&json!("plain")), "plain");
        assert_eq!(scalar_text(&json!([1, 2])), "[1,2]");
    }
}
