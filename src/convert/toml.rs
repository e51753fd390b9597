use super::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::{prepare, toml_to_tree, tree_to_toml, ConfigTree};

/// TOML through the `toml` crate.
///
/// TOML has no null, so null values inside tables are left out and null
/// array items are rejected. The document root must be a mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlConverter;

impl Converter for TomlConverter {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn extensions(&self) -> &[&str] {
        &[".toml"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        let table: ::toml::Table =
            ::toml::from_str(input).map_err(|err| ConvertError::parse(Format::Toml, err))?;
        Ok(toml_to_tree(::toml::Value::Table(table)))
    }

    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String> {
        let tree = prepare(tree, options);
        if !tree.is_object() {
            return Err(ConvertError::serialize(
                Format::Toml,
                "top-level value must be a table",
            ));
        }
        let table = match tree_to_toml(&tree).map_err(|err| ConvertError::serialize(Format::Toml, err))? {
            Some(::toml::Value::Table(table)) => table,
            _ => ::toml::Table::new(),
        };
        let rendered = if options.pretty_or(false) {
            ::toml::to_string_pretty(&table)
        } else {
            ::toml::to_string(&table)
        };
        rendered.map_err(|err| ConvertError::serialize(Format::Toml, err))
    }
}
