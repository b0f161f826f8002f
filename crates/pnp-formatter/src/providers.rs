//! Lookup table for extensibility provider handlers.
//!
//! Wire documents name a handler as `"<type>, <assembly>[, ...]"`. On read the
//! name is resolved against the handlers registered by the host; entries that
//! do not resolve are dropped by the reader.

use std::collections::HashMap;

/// A registered handler type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub type_name: String,
    pub assembly: String,
}

/// Handler type names known to the host, each mapped to its descriptor.
///
/// The registry only answers whether a wire handler resolves and to which
/// descriptor. It holds no constructors; instantiating and running a handler
/// for a resolved `Provider` is left to the host.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    handlers: HashMap<String, ProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A later registration of the same type replaces the
    /// earlier one.
    pub fn register(&mut self, type_name: impl Into<String>, assembly: impl Into<String>) {
        let type_name = type_name.into();
        let descriptor = ProviderDescriptor {
            type_name: type_name.clone(),
            assembly: assembly.into(),
        };
        self.handlers.insert(type_name, descriptor);
    }

    pub fn with(mut self, type_name: impl Into<String>, assembly: impl Into<String>) -> Self {
        self.register(type_name, assembly);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Resolve a wire handler type.
    ///
    /// When the name carries an assembly part, its simple name must match the
    /// registered assembly (case-insensitively) unless the handler was
    /// registered without one.
    pub fn resolve(&self, handler_type: &str) -> Option<&ProviderDescriptor> {
        let (type_name, assembly) = split_handler_type(handler_type);
        let descriptor = self.handlers.get(type_name)?;
        match assembly {
            Some(requested) if !descriptor.assembly.is_empty() => {
                simple_name(requested)
                    .eq_ignore_ascii_case(simple_name(&descriptor.assembly))
                    .then_some(descriptor)
            }
            _ => Some(descriptor),
        }
    }
}

/// Split `"<type>, <assembly>"` at the first comma.
pub fn split_handler_type(handler_type: &str) -> (&str, Option<&str>) {
    match handler_type.split_once(',') {
        Some((type_name, assembly)) => {
            let assembly = assembly.trim();
            (type_name.trim(), (!assembly.is_empty()).then_some(assembly))
        }
        None => (handler_type.trim(), None),
    }
}

/// Compose the wire handler type for a model provider.
pub fn handler_type(type_name: &str, assembly: &str) -> String {
    if assembly.is_empty() {
        type_name.to_string()
    } else {
        format!("{type_name}, {assembly}")
    }
}

fn simple_name(assembly: &str) -> &str {
    assembly.split(',').next().unwrap_or_default().trim()
}
