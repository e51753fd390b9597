//! Error types for conversion operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::Format;

/// Errors surfaced by converters, the registry lookups and the file helpers.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source text is not valid for its declared format.
    #[error("Failed to parse {}: {message}", .format.label())]
    Parse { format: Format, message: String },

    /// The tree cannot be rendered in the target format.
    #[error("Failed to stringify {}: {message}", .format.label())]
    Serialize { format: Format, message: String },

    /// Format or extension not known to the registry.
    #[error("Unsupported {subject}: {name}. Supported {listing}: {}", .supported.join(", "))]
    UnsupportedFormat {
        subject: &'static str,
        name: String,
        listing: &'static str,
        supported: Vec<String>,
    },

    /// Read or write failure on a file-based operation.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn parse(format: Format, message: impl ToString) -> Self {
        Self::Parse {
            format,
            message: message.to_string(),
        }
    }

    pub fn serialize(format: Format, message: impl ToString) -> Self {
        Self::Serialize {
            format,
            message: message.to_string(),
        }
    }

    /// Unknown format name; `subject` reads like "source format".
    pub fn unsupported_format(
        subject: &'static str,
        name: impl Into<String>,
        supported: impl IntoIterator<Item = Format>,
    ) -> Self {
        Self::UnsupportedFormat {
            subject,
            name: name.into(),
            listing: "formats",
            supported: supported.into_iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn unsupported_extension(
        extension: impl Into<String>,
        supported: impl IntoIterator<Item = String>,
    ) -> Self {
        Self::UnsupportedFormat {
            subject: "file extension",
            name: extension.into(),
            listing: "extensions",
            supported: supported.into_iter().collect(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the content rather than by lookups or I/O.
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Serialize { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
