//! Lookup table from format tags and file extensions to converters.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::convert::{builtin_converters, Converter};
use crate::format::Format;

/// Maps formats to converters and lower-cased extensions to formats.
///
/// Registries are plain values: build one with [`ConverterRegistry::with_builtins`]
/// (or empty with [`ConverterRegistry::new`]) and hand it to the facade.
/// Mutation needs `&mut self`, so registrations cannot race with lookups.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: Vec<(Format, Arc<dyn Converter>)>,
    extensions: HashMap<String, Format>,
    extension_order: Vec<String>,
}

impl ConverterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the JSON, YAML, TOML, ENV, XML and INI converters.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for converter in builtin_converters() {
            registry.register(converter);
        }
        registry
    }

    /// Registers `converter`, replacing any converter for the same format
    /// together with its extension claims. Extensions already claimed by
    /// another format move to this one.
    pub fn register(&mut self, converter: Arc<dyn Converter>) {
        let format = converter.format();
        if self.unregister(format).is_some() {
            debug!(%format, "replacing registered converter");
        }
        for ext in converter.extensions() {
            let ext = normalize_extension(ext);
            if ext.is_empty() {
                debug!(%format, "ignoring empty extension claim");
                continue;
            }
            if let Some(previous) = self.extensions.insert(ext.clone(), format) {
                debug!(extension = %ext, from = %previous, to = %format, "extension reassigned");
                self.extension_order.retain(|claimed| *claimed != ext);
            }
            self.extension_order.push(ext);
        }
        self.converters.push((format, converter));
    }

    pub fn get(&self, format: Format) -> Option<Arc<dyn Converter>> {
        self.converters
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, c)| Arc::clone(c))
    }

    /// Case-insensitive lookup; the leading dot is optional.
    pub fn get_by_extension(&self, extension: &str) -> Option<Arc<dyn Converter>> {
        let format = self.extensions.get(&normalize_extension(extension))?;
        self.get(*format)
    }

    /// Removes `format` and every extension still pointing at it.
    pub fn unregister(&mut self, format: Format) -> Option<Arc<dyn Converter>> {
        let idx = self.converters.iter().position(|(f, _)| *f == format)?;
        let (_, removed) = self.converters.remove(idx);
        self.extensions.retain(|_, f| *f != format);
        let extensions = &self.extensions;
        self.extension_order.retain(|ext| extensions.contains_key(ext));
        Some(removed)
    }

    pub fn is_supported(&self, format: Format) -> bool {
        self.converters.iter().any(|(f, _)| *f == format)
    }

    /// Registered formats in registration order.
    pub fn supported_formats(&self) -> Vec<Format> {
        self.converters.iter().map(|(f, _)| *f).collect()
    }

    /// Claimed extensions (lower-case, with leading dot) in claim order.
    pub fn supported_extensions(&self) -> Vec<String> {
        self.extension_order.clone()
    }

    /// Extensions currently resolving to `format`.
    pub fn extensions_for(&self, format: Format) -> Vec<String> {
        self.extension_order
            .iter()
            .filter(|ext| self.extensions.get(*ext) == Some(&format))
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.converters.clear();
        self.extensions.clear();
        self.extension_order.clear();
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("formats", &self.supported_formats())
            .field("extensions", &self.extension_order)
            .finish()
    }
}

/// Lower-cases an extension and makes sure it starts with a dot.
///
/// A missing extension (`""` or a bare `.`) normalizes to `""`.
pub fn normalize_extension(extension: &str) -> String {
    let lower = extension.trim().to_lowercase();
    if lower.is_empty() || lower == "." {
        String::new()
    } else if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}
