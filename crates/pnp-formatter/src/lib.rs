//! Formatter between the provisioning template model and the 2015-05 wire
//! format.
//!
//! [`writer::write`] always produces the `Provisioning` wrapper with a single
//! container. [`reader::Reader`] accepts either the wrapper or a bare
//! `SharePointProvisioningTemplate`, validates it and resolves the requested
//! template before projecting it back into the model.

pub mod providers;
pub mod reader;
pub mod store;
pub mod taxonomy;
pub mod wire;
pub mod writer;

#[cfg(test)]
mod fixtures;

use pnp_model::StringMap;
use pnp_schema::SchemaError;
use pnp_xml::XmlError;
use thiserror::Error;
use uuid::Uuid;

pub use providers::{ProviderDescriptor, ProviderRegistry};
pub use reader::Reader;
pub use store::{DocumentStore, FileSystemStore, MemoryStore};
pub use writer::{to_wire, write};

/// Identity written into `Preferences/@Generator`.
pub const GENERATOR: &str = concat!("pnp-formatter ", env!("CARGO_PKG_VERSION"));

/// Errors raised while reading or writing provisioning documents.
#[derive(Debug, Error)]
pub enum FormatterError {
    /// The caller passed an unusable argument (for example an empty buffer).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The document failed schema validation.
    #[error("the provided template is not valid: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
    /// The document root, or the root of a referenced file, has the wrong shape.
    #[error("format violation: {0}")]
    FormatViolation(String),
    /// A bare template carries a different id than the one requested.
    #[error("template identifier mismatch: expected '{expected}', found '{found}'")]
    IdentifierMismatch { expected: String, found: String },
    /// No container yielded a template with the requested id.
    #[error("template not found: {0}")]
    TemplateNotFound(String),
    /// The document store could not produce a referenced file.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
    /// A value inside the document could not be converted.
    #[error("malformed value: {0}")]
    Malformed(String),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl FormatterError {
    pub(crate) fn malformed<S: Into<String>>(msg: S) -> Self {
        FormatterError::Malformed(msg.into())
    }

    pub(crate) fn format<S: Into<String>>(msg: S) -> Self {
        FormatterError::FormatViolation(msg.into())
    }
}

/// Parse a wire GUID. Empty strings stand for the nil GUID.
pub(crate) fn parse_guid(value: &str) -> Result<Uuid, FormatterError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Uuid::nil());
    }
    Uuid::parse_str(value)
        .map_err(|err| FormatterError::malformed(format!("invalid GUID '{value}': {err}")))
}

/// Empty collections are written as absent elements.
pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Collect key/value pairs, rejecting repeated keys.
pub(crate) fn unique_map<I>(pairs: I, what: &str) -> Result<StringMap, FormatterError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut map = StringMap::new();
    for (key, value) in pairs {
        if map.contains_key(&key) {
            return Err(FormatterError::malformed(format!("duplicate {what} key '{key}'")));
        }
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_parsing() {
        assert_eq!(parse_guid("").expect("empty"), Uuid::nil());
        let id = parse_guid("{23203E97-3BFE-40CB-AFB4-07AA2B86BF45}").expect("braced");
        assert_eq!(id.to_string(), "23203e97-3bfe-40cb-afb4-07aa2b86bf45");
        assert!(matches!(
            parse_guid("23203E97"),
            Err(FormatterError::Malformed(_))
        ));
    }

    #[test]
    fn errors_render_context() {
        let err = FormatterError::SchemaViolation(vec!["/a: one".into(), "/b: two".into()]);
        assert_eq!(
            err.to_string(),
            "the provided template is not valid: /a: one; /b: two"
        );
        let err = FormatterError::IdentifierMismatch {
            expected: "A".into(),
            found: "B".into(),
        };
        assert!(err.to_string().contains("expected 'A', found 'B'"));
    }
}
