use ::ini::{Ini, ParseOption};
use serde_json::{Map, Value};

use super::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::{child_map, prepare, scalar_text, ConfigTree};

const ARRAY_SUFFIX: &str = "[]";

/// INI through `rust-ini` for reading; sections are written directly.
///
/// Dotted section names (`[server.tls]`) nest. Values stay strings except
/// `true`, `false` and `null`. Sequences use repeated `key[]` entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct IniConverter;

impl Converter for IniConverter {
    fn format(&self) -> Format {
        Format::Ini
    }

    fn extensions(&self) -> &[&str] {
        &[".ini"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        let opt = ParseOption {
            enabled_quote: true,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let doc = Ini::load_from_str_opt(input, opt)
            .map_err(|err| ConvertError::parse(Format::Ini, err))?;
        let mut root = Map::new();
        for (section, props) in doc.iter() {
            let target = match section {
                None => &mut root,
                Some(name) => section_map(&mut root, name),
            };
            for (key, value) in props.iter() {
                insert_property(target, key, value);
            }
        }
        Ok(Value::Object(root))
    }

    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String> {
        let tree = prepare(tree, options);
        let mut sections = Vec::new();
        match &*tree {
            Value::Object(map) => collect_section(None, map, &mut sections),
            other => {
                let mut root = Map::new();
                root.insert("value".to_string(), other.clone());
                collect_section(None, &root, &mut sections);
            }
        }
        let separator = if options.pretty_or(true) { " = " } else { "=" };
        Ok(render(&sections, separator))
    }
}

// Walks (and creates) the mapping for a dotted section name.
fn section_map<'a>(root: &'a mut Map<String, Value>, name: &str) -> &'a mut Map<String, Value> {
    name.split('.')
        .fold(root, |current, segment| child_map(current, segment))
}

fn insert_property(target: &mut Map<String, Value>, key: &str, raw: &str) {
    let value = typed_value(raw);
    match key.strip_suffix(ARRAY_SUFFIX) {
        Some(name) => match target.get_mut(name) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                target.insert(name.to_string(), Value::Array(vec![value]));
            }
        },
        None => {
            target.insert(key.to_string(), value);
        }
    }
}

fn typed_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        other => Value::String(other.to_string()),
    }
}

struct Section {
    name: Option<String>,
    entries: Vec<(String, String)>,
}

fn collect_section(name: Option<String>, map: &Map<String, Value>, out: &mut Vec<Section>) {
    let mut entries = Vec::new();
    let mut children = Vec::new();
    for (key, value) in map {
        match value {
            Value::Object(child) => children.push((key, child)),
            Value::Array(items) => {
                for item in items {
                    entries.push((format!("{key}{ARRAY_SUFFIX}"), scalar_text(item)));
                }
            }
            scalar => entries.push((key.clone(), scalar_text(scalar))),
        }
    }
    if !entries.is_empty() || name.is_none() {
        out.push(Section {
            name: name.clone(),
            entries,
        });
    }
    for (key, child) in children {
        let child_name = match &name {
            Some(parent) => format!("{parent}.{key}"),
            None => key.clone(),
        };
        collect_section(Some(child_name), child, out);
    }
}

fn render(sections: &[Section], separator: &str) -> String {
    let mut out = String::new();
    for section in sections {
        if let Some(name) = &section.name {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{name}]\n"));
        }
        for (key, value) in &section.entries {
            out.push_str(&format!("{key}{separator}{}\n", quote(value)));
        }
    }
    out
}

fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.trim() != value
        || value.contains(';')
        || value.contains('#');
    if needs_quotes && !value.contains('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn writes_sections_with_top_level_scalars_first() {
        let out = IniConverter
            .stringify(
                &json!({"database": {"host": "localhost", "port": 5432}, "debug": true}),
                &ConversionOptions::default(),
            )
            .unwrap();
        assert_eq!(out, "debug = true\n\n[database]\nhost = localhost\nport = 5432\n");
    }

    #[test]
    fn nested_mappings_use_dotted_sections() {
        let out = IniConverter
            .stringify(
                &json!({"section": {"subsection": {"key": "value"}}}),
                &ConversionOptions::default().with_pretty(false),
            )
            .unwrap();
        assert_eq!(out, "[section.subsection]\nkey=value\n");
    }

    #[test]
    fn parse_keeps_strings_and_nests_dotted_sections() {
        let tree = IniConverter
            .parse("name = app\n[database]\nhost = localhost\nport = 5432\n[server.tls]\nenabled = true\n")
            .unwrap();
        assert_eq!(
            tree,
            json!({
                "name": "app",
                "database": {"host": "localhost", "port": "5432"},
                "server": {"tls": {"enabled": true}}
            })
        );
    }

    #[test]
    fn sequences_round_trip_through_array_keys() {
        let tree = json!({"hosts": {"list": ["a", "b"]}});
        let text = IniConverter.stringify(&tree, &ConversionOptions::default()).unwrap();
        assert!(text.contains("list[] = a\nlist[] = b"), "{text}");
        assert_eq!(IniConverter.parse(&text).unwrap(), tree);
    }

    #[test]
    fn sorted_sections() {
        let out = IniConverter
            .stringify(
                &json!({"z": {"key": "val"}, "a": {"key": "val"}}),
                &ConversionOptions::default().sorted(),
            )
            .unwrap();
        assert!(out.find("[a]").unwrap() < out.find("[z]").unwrap());
    }
}
