use std::sync::Arc;

use config_converter::convert::{JsonConverter, YamlConverter};
use config_converter::{
    ConfigConverter, ConfigTree, ConversionOptions, Converter, ConverterRegistry, Format, Result,
};
use serde_json::json;

/// Reads `key: value` lines and writes them back; stands in for a third-party format.
struct ColonConverter;

impl Converter for ColonConverter {
    fn format(&self) -> Format {
        Format::Ini
    }

    fn extensions(&self) -> &[&str] {
        &[".ini", ".cfg", ".json"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        let mut map = serde_json::Map::new();
        for line in input.lines() {
            if let Some((k, v)) = line.split_once(':') {
                map.insert(k.trim().to_string(), json!(v.trim()));
            }
        }
        Ok(ConfigTree::Object(map))
    }

    fn stringify(&self, tree: &ConfigTree, _options: &ConversionOptions) -> Result<String> {
        let mut out = String::new();
        if let Some(map) = tree.as_object() {
            for (k, v) in map {
                out.push_str(&format!("{k}: {}\n", v.as_str().unwrap_or_default()));
            }
        }
        Ok(out)
    }

    fn description(&self) -> &str {
        "Colon-separated pairs"
    }
}

#[test]
fn plugin_replaces_builtin_and_steals_extensions() {
    let mut converter = ConfigConverter::new();
    converter.register_converter(Arc::new(ColonConverter));

    let registry = converter.registry();
    assert_eq!(registry.get_by_extension(".cfg").unwrap().format(), Format::Ini);
    assert_eq!(registry.get_by_extension(".JSON").unwrap().format(), Format::Ini);
    assert!(registry.extensions_for(Format::Json).is_empty());

    let out = converter
        .convert(r#"{"name":"demo"}"#, Format::Json, Format::Ini, &ConversionOptions::default())
        .unwrap();
    assert_eq!(out, "name: demo\n");

    let overview = converter.formats_overview();
    let ini = overview.iter().find(|info| info.format == Format::Ini).unwrap();
    assert_eq!(ini.description, "Colon-separated pairs");
    assert_eq!(ini.extensions, [".ini", ".cfg", ".json"]);
}

#[test]
fn unregistered_format_is_reported_with_remaining_list() {
    let mut registry = ConverterRegistry::new();
    registry.register(Arc::new(JsonConverter));
    registry.register(Arc::new(YamlConverter));
    let converter = ConfigConverter::with_registry(registry);

    let err = converter
        .convert("{}", Format::Json, Format::Toml, &ConversionOptions::default())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unsupported target format: toml. Supported formats: json, yaml"
    );
}

#[test]
fn registries_are_independent_instances() {
    let mut first = ConfigConverter::new();
    let second = ConfigConverter::new();
    first.registry_mut().unregister(Format::Env);
    assert!(!first.registry().is_supported(Format::Env));
    assert!(second.registry().is_supported(Format::Env));
    assert!(first.parse("A=1", Format::Env).is_err());
    assert_eq!(second.parse("A=1", Format::Env).unwrap(), json!({"a": 1}));
}
