//! Per-format converters.
//!
//! Each format implements [`Converter`]: a parse/stringify pair plus the
//! format tag and the file extensions it claims. Only the ENV converter
//! carries its own algorithm; the others adapt a third-party parser to the
//! shared [`ConfigTree`](crate::tree::ConfigTree).

use std::sync::Arc;

use crate::error::Result;
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::ConfigTree;

pub mod env;
pub mod ini;
pub mod json;
pub mod toml;
pub mod xml;
pub mod yaml;

pub use self::env::EnvConverter;
pub use self::ini::IniConverter;
pub use self::json::JsonConverter;
pub use self::toml::TomlConverter;
pub use self::xml::XmlConverter;
pub use self::yaml::YamlConverter;

/// Parse/stringify capability for one format.
///
/// Implementations are immutable once constructed and shared through the
/// registry as `Arc<dyn Converter>`.
pub trait Converter: Send + Sync {
    /// Format tag this converter implements.
    fn format(&self) -> Format;

    /// File suffixes claimed for auto-detection, including the leading dot.
    fn extensions(&self) -> &[&str];

    /// Parses source text into a tree.
    fn parse(&self, input: &str) -> Result<ConfigTree>;

    /// Renders a tree, applying `sort` first and whitespace hints where the format has them.
    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String>;

    /// Description shown in format listings.
    fn description(&self) -> &str {
        self.format().description()
    }
}

/// The converters registered by default, one per format.
pub fn builtin_converters() -> Vec<Arc<dyn Converter>> {
    vec![
        Arc::new(JsonConverter),
        Arc::new(YamlConverter),
        Arc::new(TomlConverter),
        Arc::new(EnvConverter),
        Arc::new(XmlConverter),
        Arc::new(IniConverter),
    ]
}
