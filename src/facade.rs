//! Conversion entry points: text, files and batches.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, warn};

use crate::convert::Converter;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::options::ConversionOptions;
use crate::registry::{normalize_extension, ConverterRegistry};
use crate::tree::ConfigTree;

/// Owns a [`ConverterRegistry`] and runs `parse → stringify` through it.
///
/// # Example
/// ```
/// use config_converter::{ConfigConverter, ConversionOptions, Format};
///
/// let converter = ConfigConverter::new();
/// let env = converter.convert(
///     r#"{"a":1,"b":{"c":true}}"#,
///     Format::Json,
///     Format::Env,
///     &ConversionOptions::default(),
/// )?;
/// assert_eq!(env, "A=1\nB_C=true");
/// # Ok::<(), config_converter::ConvertError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigConverter {
    registry: ConverterRegistry,
}

impl Default for ConfigConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigConverter {
    /// A converter backed by the built-in formats.
    pub fn new() -> Self {
        Self::with_registry(ConverterRegistry::with_builtins())
    }

    pub fn with_registry(registry: ConverterRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.registry
    }

    /// Adds or replaces a converter (plugin hook).
    pub fn register_converter(&mut self, converter: Arc<dyn Converter>) {
        self.registry.register(converter);
    }

    /// Converts `content` from one format to another.
    ///
    /// Both converters are resolved before any parsing, so an unknown target
    /// fails without touching the input.
    pub fn convert(
        &self,
        content: &str,
        from: Format,
        to: Format,
        options: &ConversionOptions,
    ) -> Result<String> {
        let source = self.lookup(from, "source format")?;
        let target = self.lookup(to, "target format")?;
        debug!(%from, %to, bytes = content.len(), "converting");
        let tree = source.parse(content)?;
        target.stringify(&tree, options)
    }

    /// Like [`convert`](Self::convert) but takes raw identifiers, rejecting
    /// anything outside the closed format set before a registry lookup.
    pub fn convert_str(
        &self,
        content: &str,
        from: &str,
        to: &str,
        options: &ConversionOptions,
    ) -> Result<String> {
        let from = parse_identifier(from, "source format")?;
        let to = parse_identifier(to, "target format")?;
        self.convert(content, from, to, options)
    }

    pub fn parse(&self, content: &str, format: Format) -> Result<ConfigTree> {
        self.lookup(format, "format")?.parse(content)
    }

    pub fn stringify(
        &self,
        tree: &ConfigTree,
        format: Format,
        options: &ConversionOptions,
    ) -> Result<String> {
        self.lookup(format, "format")?.stringify(tree, options)
    }

    /// Converts a file, picking both formats from the path extensions.
    ///
    /// Read and write failures surface as [`ConvertError::Io`]; nothing is
    /// written when the conversion itself fails.
    pub fn convert_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        options: &ConversionOptions,
    ) -> Result<()> {
        let input = input.as_ref();
        let output = output.as_ref();
        let from = self.detect_format(input)?;
        let to = self.detect_format(output)?;
        let content = fs::read_to_string(input).map_err(|err| ConvertError::io(input, err))?;
        let converted = self.convert(&content, from, to, options)?;
        fs::write(output, converted).map_err(|err| ConvertError::io(output, err))?;
        debug!(input = %input.display(), output = %output.display(), "file converted");
        Ok(())
    }

    /// Resolves a path's format from its extension (case-insensitive).
    pub fn detect_format(&self, path: impl AsRef<Path>) -> Result<Format> {
        let path = path.as_ref();
        let ext = extension_of(path);
        self.registry
            .get_by_extension(&ext)
            .map(|converter| converter.format())
            .ok_or_else(|| {
                let shown = if ext.is_empty() { "(none)".to_string() } else { ext.clone() };
                ConvertError::unsupported_extension(shown, self.registry.supported_extensions())
            })
    }

    /// Converts every input independently into `to`.
    ///
    /// Results keep the input order; a failing file is reported in its own
    /// slot and never stops the others.
    pub fn convert_batch(
        &self,
        inputs: &[BatchInput],
        to: Format,
        options: &ConversionOptions,
    ) -> Vec<BatchResult> {
        inputs
            .par_iter()
            .map(|input| {
                let result = self.convert_one(input, to, options);
                if let BatchResult::Failure { original_name, error } = &result {
                    warn!(file = %original_name, %error, "batch item failed");
                }
                result
            })
            .collect()
    }

    fn convert_one(&self, input: &BatchInput, to: Format, options: &ConversionOptions) -> BatchResult {
        let outcome = self
            .detect_format(&input.original_name)
            .and_then(|from| self.convert(&input.content, from, to, options));
        match outcome {
            Ok(content) => BatchResult::Success {
                original_name: input.original_name.clone(),
                new_name: renamed(&input.original_name, to),
                content,
            },
            Err(err) => BatchResult::Failure {
                original_name: input.original_name.clone(),
                error: err.to_string(),
            },
        }
    }

    pub fn supported_formats(&self) -> Vec<Format> {
        self.registry.supported_formats()
    }

    pub fn supported_extensions(&self) -> Vec<String> {
        self.registry.supported_extensions()
    }

    /// One entry per registered format, for human-facing listings.
    pub fn formats_overview(&self) -> Vec<FormatInfo> {
        self.registry
            .supported_formats()
            .into_iter()
            .filter_map(|format| {
                let converter = self.registry.get(format)?;
                Some(FormatInfo {
                    format,
                    description: converter.description().to_string(),
                    extensions: self.registry.extensions_for(format),
                })
            })
            .collect()
    }

    fn lookup(&self, format: Format, subject: &'static str) -> Result<Arc<dyn Converter>> {
        self.registry.get(format).ok_or_else(|| {
            ConvertError::unsupported_format(subject, format.as_str(), self.registry.supported_formats())
        })
    }
}

fn parse_identifier(name: &str, subject: &'static str) -> Result<Format> {
    name.parse::<Format>().map_err(|_| {
        ConvertError::unsupported_format(subject, name, Format::ALL)
    })
}

// `.env` style dotfiles have no extension in `Path` terms; their whole name is the suffix.
fn extension_of(path: &Path) -> String {
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        return normalize_extension(ext);
    }
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| name.starts_with('.'))
        .map(normalize_extension)
        .unwrap_or_default()
}

/// Replaces the extension of `name` with the canonical one for `to`.
pub fn renamed(name: &str, to: Format) -> String {
    let path = Path::new(name);
    let stem = match path.extension() {
        Some(_) => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
        None => path
            .file_name()
            .map(|file| file.to_string_lossy().trim_start_matches('.').to_string())
            .unwrap_or_default(),
    };
    format!("{stem}{}", to.canonical_extension())
}

/// One file handed to [`ConfigConverter::convert_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    pub original_name: String,
    pub content: String,
}

impl BatchInput {
    pub fn new(original_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            original_name: original_name.into(),
            content: content.into(),
        }
    }
}

/// Outcome of one batch item.
///
/// Serializes as `{originalName, newName, content, success: true}` or
/// `{originalName, error, success: false}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    Success {
        original_name: String,
        new_name: String,
        content: String,
    },
    Failure {
        original_name: String,
        error: String,
    },
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            BatchResult::Success {
                original_name,
                new_name,
                content,
            } => {
                let mut state = serializer.serialize_struct("BatchResult", 4)?;
                state.serialize_field("originalName", original_name)?;
                state.serialize_field("newName", new_name)?;
                state.serialize_field("content", content)?;
                state.serialize_field("success", &true)?;
                state.end()
            }
            BatchResult::Failure {
                original_name,
                error,
            } => {
                let mut state = serializer.serialize_struct("BatchResult", 3)?;
                state.serialize_field("originalName", original_name)?;
                state.serialize_field("error", error)?;
                state.serialize_field("success", &false)?;
                state.end()
            }
        }
    }
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchResult::Success { .. })
    }

    pub fn original_name(&self) -> &str {
        match self {
            BatchResult::Success { original_name, .. } | BatchResult::Failure { original_name, .. } => {
                original_name
            }
        }
    }
}

/// Format listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub format: Format,
    pub description: String,
    pub extensions: Vec<String>,
}
