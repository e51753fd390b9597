//! Convert configuration files between JSON, YAML, TOML, ENV, XML and INI.
//!
//! Every format is parsed into a shared [`ConfigTree`] and rendered back out
//! by the target format's [`Converter`]. Converters live in a
//! [`ConverterRegistry`] keyed by [`Format`] and by file extension, and the
//! [`ConfigConverter`] facade drives text, file and batch conversions.
//!
//! ```text
//!  text ──parse──▶ ConfigTree ──sort?──▶ ConfigTree ──stringify──▶ text
//!          ▲                                              ▲
//!          └──────── ConverterRegistry (format / ext) ───┘
//! ```
//!
//! # Examples
//!
//! ```rust
//! use config_converter::{ConfigConverter, ConversionOptions, Format};
//!
//! let converter = ConfigConverter::new();
//! let tree = converter.parse("DATABASE_HOST=localhost\nDATABASE_PORT=5432", Format::Env)?;
//! assert_eq!(tree["database"]["port"], 5432);
//!
//! let json = converter.stringify(&tree, Format::Json, &ConversionOptions::default())?;
//! assert_eq!(json, r#"{"database":{"host":"localhost","port":5432}}"#);
//! # Ok::<(), config_converter::ConvertError>(())
//! ```

pub mod convert;
pub mod error;
pub mod facade;
pub mod format;
pub mod options;
pub mod registry;
pub mod tree;

pub use convert::Converter;
pub use error::{ConvertError, Result};
pub use facade::{BatchInput, BatchResult, ConfigConverter, FormatInfo};
pub use format::Format;
pub use options::ConversionOptions;
pub use registry::ConverterRegistry;
pub use tree::ConfigTree;
