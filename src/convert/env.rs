//! ENV (`KEY=value`) converter and its key-nesting transform.
//!
//! Encoding flattens nested mappings into `SCREAMING_SNAKE_CASE` keys joined
//! with `_`. Decoding reverses that by splitting every key on `_`, so
//! `DATABASE_HOST` always becomes `database.host`: a flat key containing an
//! underscore cannot be told apart from a nested one.
//!
//! Values carry no type on the wire. Decoding sniffs each value as a JSON
//! literal (`5432`, `true`, `null`, `[1,2]`) and keeps the raw string when
//! that fails.
//!
//! Values holding whitespace, `#`, quotes or line breaks are wrapped in double
//! quotes. Inside them `\\`, `\"`, `\n` and `\r` are escaped so every entry
//! stays on one line; decoding reverses those escapes for double-quoted values.
//! Keys that would not read back as a single `KEY=` entry (empty, or holding
//! `=` or a line break) are rejected when encoding.
//!
//! When a path runs into an existing value the last write wins: a scalar
//! sitting where a mapping is needed is replaced by a fresh mapping, and a
//! leaf assignment overwrites whatever was stored under that key.
use serde_json::Value;
use tracing::trace;

use super::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::{child_map, prepare, scalar_text, ConfigMap, ConfigTree};

/// Key used when the whole tree is a single scalar or sequence.
const ROOT_KEY: &str = "VALUE";

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvConverter;

impl Converter for EnvConverter {
    fn format(&self) -> Format {
        Format::Env
    }

    fn extensions(&self) -> &[&str] {
        &[".env"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        Ok(ConfigTree::Object(decode_env(input)))
    }

    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String> {
        let tree = prepare(tree, options);
        encode_env(&tree).map_err(|message| ConvertError::serialize(Format::Env, message))
    }
}

/// Flattens a tree into `KEY=value` lines joined by `\n`.
pub fn encode_env(tree: &ConfigTree) -> std::result::Result<String, String> {
    let mut lines = Vec::new();
    match tree {
        Value::Object(map) => flatten_into(map, "", &mut lines)?,
        other => lines.push(format!("{ROOT_KEY}={}", format_value(other))),
    }
    Ok(lines.join("\n"))
}

fn flatten_into(
    map: &ConfigMap,
    prefix: &str,
    lines: &mut Vec<String>,
) -> std::result::Result<(), String> {
    for (key, value) in map {
        let env_key = if prefix.is_empty() {
            key.to_uppercase()
        } else {
            format!("{prefix}_{}", key.to_uppercase())
        };
        match value {
            Value::Object(child) => flatten_into(child, &env_key, lines)?,
            leaf => {
                check_key(&env_key)?;
                lines.push(format!("{env_key}={}", format_value(leaf)));
            }
        }
    }
    Ok(())
}

fn check_key(key: &str) -> std::result::Result<(), String> {
    if key.trim().is_empty() {
        return Err("empty key cannot be written as an ENV entry".to_string());
    }
    if key.starts_with('#') || key.contains(['=', '\n', '\r']) {
        return Err(format!("key {key:?} cannot be written as an ENV entry"));
    }
    Ok(())
}

fn format_value(value: &ConfigTree) -> String {
    match value {
        Value::String(s) if needs_quotes(s) => format!("\"{}\"", escape(s)),
        Value::String(s) => s.clone(),
        other => scalar_text(other),
    }
}

fn needs_quotes(s: &str) -> bool {
    s.chars().any(|ch| ch.is_whitespace() || ch == '#' || ch == '"')
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

// Unknown escapes are kept verbatim, backslash included.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Rebuilds a nested mapping from ENV text. Malformed lines are skipped.
pub fn decode_env(input: &str) -> ConfigMap {
    let mut root = ConfigMap::new();
    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            trace!(line = idx + 1, "skipping ENV line without '='");
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            trace!(line = idx + 1, "skipping ENV line with empty key");
            continue;
        }
        let path: Vec<String> = key.to_lowercase().split('_').map(str::to_string).collect();
        set_nested(&mut root, &path, sniff_value(unquote(value.trim())));
    }
    root
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 {
        if value.starts_with('"') && value.ends_with('"') {
            return unescape(&value[1..value.len() - 1]);
        }
        if value.starts_with('\'') && value.ends_with('\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

fn sniff_value(value: String) -> ConfigTree {
    match serde_json::from_str::<Value>(&value) {
        Ok(parsed) => parsed,
        Err(_) => Value::String(value),
    }
}

fn set_nested(map: &mut ConfigMap, path: &[String], value: ConfigTree) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };
    let parent = parents
        .iter()
        .fold(map, |current, segment| child_map(current, segment));
    parent.insert(leaf.clone(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn flattens_nested_keys_in_upper_case() {
        let env = encode_env(&json!({"a": 1, "b": {"c": true}})).unwrap();
        assert_eq!(env, "A=1\nB_C=true");
    }

    #[test]
    fn quotes_strings_with_spaces_hashes_and_quotes() {
        let env = encode_env(&json!({
            "msg": "Hello World",
            "tag": "a#b",
            "said": "say \"hi\"",
            "plain": "value"
        }))
        .unwrap();
        assert_eq!(
            env,
            "MSG=\"Hello World\"\nTAG=\"a#b\"\nSAID=\"say \\\"hi\\\"\"\nPLAIN=value"
        );
    }

    #[test]
    fn sequences_and_nulls_use_json_literals() {
        let env = encode_env(&json!({"items": [1, "two"], "none": null})).unwrap();
        assert_eq!(env, "ITEMS=[1,\"two\"]\nNONE=null");
    }

    #[test]
    fn empty_mappings_emit_nothing() {
        assert_eq!(encode_env(&json!({"empty": {}})).unwrap(), "");
        assert_eq!(encode_env(&json!({})).unwrap(), "");
    }

    #[test]
    fn scalar_root_uses_value_key() {
        assert_eq!(encode_env(&json!(7)).unwrap(), "VALUE=7");
    }

    #[test]
    fn decodes_nested_paths_and_sniffs_numbers() {
        let tree = decode_env("DATABASE_HOST=localhost\nDATABASE_PORT=5432");
        assert_eq!(
            Value::Object(tree),
            json!({"database": {"host": "localhost", "port": 5432}})
        );
    }

    #[test]
    fn strips_one_layer_of_quotes() {
        let tree = decode_env("MESSAGE=\"Hello World\"\nPATH='/usr/local/bin'\nNESTED=\"'x'\"\n");
        assert_eq!(tree["message"], json!("Hello World"));
        assert_eq!(tree["path"], json!("/usr/local/bin"));
        assert_eq!(tree["nested"], json!("'x'"));
    }

    #[test]
    fn unescapes_embedded_double_quotes() {
        let tree = decode_env("SAID=\"say \\\"hi\\\"\"");
        assert_eq!(tree["said"], json!("say \"hi\""));
    }

    #[test]
    fn skips_comments_blank_and_malformed_lines() {
        let tree = decode_env("# comment\n\nNOEQUALS\n=orphan\n  KEY = spaced  \r\n");
        assert_eq!(Value::Object(tree), json!({"key": "spaced"}));
    }

    #[test]
    fn splits_on_first_equals_only() {
        let tree = decode_env("URL=postgres://u:p@h/db?a=b");
        assert_eq!(tree["url"], json!("postgres://u:p@h/db?a=b"));
    }

    #[test]
    fn sniffs_json_arrays_and_objects() {
        let tree = decode_env("LIST=[1,2]\nOBJ={\"k\":false}\nEMPTY=");
        assert_eq!(tree["list"], json!([1, 2]));
        assert_eq!(tree["obj"], json!({"k": false}));
        assert_eq!(tree["empty"], json!(""));
    }

    #[test]
    fn scalar_in_the_way_is_replaced_by_mapping() {
        let tree = decode_env("APP=1\nAPP_NAME=demo");
        assert_eq!(Value::Object(tree), json!({"app": {"name": "demo"}}));
    }

    #[test]
    fn later_leaf_overwrites_earlier_mapping() {
        let tree = decode_env("APP_NAME=demo\nAPP=1");
        assert_eq!(Value::Object(tree), json!({"app": 1}));
    }

    #[test]
    fn underscore_keys_always_nest() {
        let tree = decode_env("MAX_RETRIES=3");
        assert_eq!(Value::Object(tree), json!({"max": {"retries": 3}}));
    }

    #[test]
    fn round_trips_simple_identifiers() {
        let original = json!({
            "server": {"host": "0.0.0.0", "port": 3000},
            "debug": true,
            "greeting": "hello world",
            "nothing": null
        });
        let back = decode_env(&encode_env(&original).unwrap());
        assert_eq!(Value::Object(back), original);
    }

    #[test]
    fn sorted_stringify_orders_lines() {
        let out = EnvConverter
            .stringify(&json!({"b": 1, "a": {"z": 2, "c": 3}}), &ConversionOptions::default().sorted())
            .unwrap();
        assert_eq!(out, "A_C=3\nA_Z=2\nB=1");
    }

    #[test]
    fn line_breaks_stay_inside_one_quoted_entry() {
        let original = json!({"msg": "line1\nline2", "crlf": "a\r\nb", "next": 1});
        let env = encode_env(&original).unwrap();
        assert_eq!(env, "MSG=\"line1\\nline2\"\nCRLF=\"a\\r\\nb\"\nNEXT=1");
        assert_eq!(Value::Object(decode_env(&env)), original);
    }

    #[test]
    fn backslashes_survive_quoting() {
        let original = json!({"path": "C:\\Program Files\\new"});
        let env = encode_env(&original).unwrap();
        assert_eq!(env, "PATH=\"C:\\\\Program Files\\\\new\"");
        assert_eq!(Value::Object(decode_env(&env)), original);
    }

    #[test]
    fn unknown_escapes_are_kept_verbatim() {
        let tree = decode_env("RE=\"a\\d b\"");
        assert_eq!(tree["re"], json!("a\\d b"));
    }

    #[test]
    fn keys_that_cannot_be_read_back_are_rejected() {
        for bad in [json!({"": 1}), json!({"a=b": 1}), json!({"x": {"line\nbreak": 1}}), json!({"#c": 1})] {
            assert!(encode_env(&bad).is_err(), "{bad}");
        }
        let err = EnvConverter
            .stringify(&json!({"": 1}), &ConversionOptions::default())
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to stringify ENV"), "{err}");
    }
}
