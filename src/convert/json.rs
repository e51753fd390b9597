use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::{prepare, ConfigTree};

/// JSON through `serde_json`.
///
/// Output is compact unless `pretty` or an explicit `indent` asks for
/// whitespace; `pretty` alone means two spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl Converter for JsonConverter {
    fn format(&self) -> Format {
        Format::Json
    }

    fn extensions(&self) -> &[&str] {
        &[".json"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        serde_json::from_str(input).map_err(|err| ConvertError::parse(Format::Json, err))
    }

    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String> {
        let tree = prepare(tree, options);
        let width = options
            .indent
            .unwrap_or(if options.pretty_or(false) { 2 } else { 0 });
        encode_json(&tree, width).map_err(|err| ConvertError::serialize(Format::Json, err))
    }
}

/// Encodes a tree with `width` spaces per level; zero means minified.
pub fn encode_json(value: &ConfigTree, width: usize) -> std::result::Result<String, String> {
    if width == 0 {
        return serde_json::to_string(value).map_err(|err| err.to_string());
    }
    let indent = " ".repeat(width);
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut ser).map_err(|err| err.to_string())?;
    String::from_utf8(out).map_err(|err| err.to_string())
}
