//! The closed set of format identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Serialization formats understood by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Env,
    Xml,
    Ini,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Json,
        Format::Yaml,
        Format::Toml,
        Format::Env,
        Format::Xml,
        Format::Ini,
    ];

    /// Lower-case identifier used on the wire and in CLI flags.
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Env => "env",
            Format::Xml => "xml",
            Format::Ini => "ini",
        }
    }

    /// Upper-case label used in error messages ("JSON", "TOML", ...).
    pub fn label(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Env => "ENV",
            Format::Xml => "XML",
            Format::Ini => "INI",
        }
    }

    /// Human-facing description for format listings.
    pub fn description(self) -> &'static str {
        match self {
            Format::Json => "JavaScript Object Notation",
            Format::Yaml => "YAML Ain't Markup Language",
            Format::Toml => "Tom's Obvious, Minimal Language",
            Format::Env => "Environment Variables",
            Format::Xml => "eXtensible Markup Language",
            Format::Ini => "INI Configuration Format",
        }
    }

    /// Extension used when naming converted output. YAML prefers `.yaml` over `.yml`.
    pub fn canonical_extension(self) -> &'static str {
        match self {
            Format::Json => ".json",
            Format::Yaml => ".yaml",
            Format::Toml => ".toml",
            Format::Env => ".env",
            Format::Xml => ".xml",
            Format::Ini => ".ini",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "env" => Ok(Format::Env),
            "xml" => Ok(Format::Xml),
            "ini" => Ok(Format::Ini),
            _ => Err(ConvertError::unsupported_format("format", s, Format::ALL)),
        }
    }
}
