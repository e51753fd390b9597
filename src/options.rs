//! Per-call conversion options.

use serde::Deserialize;

/// Whitespace and ordering hints shared by every converter.
///
/// Unset fields fall back to the target format's own default, so JSON stays
/// compact unless asked otherwise while XML and INI default to pretty output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Emit human-formatted output where the format supports it.
    pub pretty: Option<bool>,
    /// Spaces per nesting level.
    pub indent: Option<usize>,
    /// Recursively sort mapping keys before serialization.
    pub sort: bool,
}

impl ConversionOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: Some(true),
            ..Self::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = Some(pretty);
        self
    }

    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }

    pub fn pretty_or(&self, default: bool) -> bool {
        self.pretty.unwrap_or(default)
    }

    pub fn indent_or(&self, default: usize) -> usize {
        self.indent.unwrap_or(default)
    }
}
