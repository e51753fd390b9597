use super::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::tree::{prepare, yaml_to_tree, ConfigMap, ConfigTree};

/// YAML through `serde_yaml`. The emitter always uses two-space block style.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlConverter;

impl Converter for YamlConverter {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn extensions(&self) -> &[&str] {
        &[".yaml", ".yml"]
    }

    fn parse(&self, input: &str) -> Result<ConfigTree> {
        if input.trim().is_empty() {
            return Ok(ConfigTree::Object(ConfigMap::new()));
        }
        let value: serde_yaml::Value =
            serde_yaml::from_str(input).map_err(|err| ConvertError::parse(Format::Yaml, err))?;
        Ok(yaml_to_tree(value))
    }

    fn stringify(&self, tree: &ConfigTree, options: &ConversionOptions) -> Result<String> {
        let tree = prepare(tree, options);
        serde_yaml::to_string(&*tree).map_err(|err| ConvertError::serialize(Format::Yaml, err))
    }
}
