//! Structural validation of 2015-05 provisioning documents against an
//! embedded schema set.

mod schema;
mod validate;

pub use schema::{schema, AttributeDecl, ComplexType, Content, Particle, RootDecl, SchemaSet};
pub use validate::{Diagnostic, ValidationReport};

use pnp_xml::XmlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    /// The input is not well-formed XML.
    #[error(transparent)]
    Malformed(#[from] XmlError),
    /// The embedded schema resource could not be loaded.
    #[error("schema resource: {0}")]
    Resource(String),
}

/// Validate a document against the embedded 2015-05 schema.
///
/// A document that is not well-formed is an error, not an invalid report.
pub fn validate(document: &[u8]) -> Result<ValidationReport, SchemaError> {
    let schema = schema()?;
    let document = pnp_xml::parse(document)?;
    Ok(schema.validate_document(&document))
}

pub fn is_valid(document: &[u8]) -> Result<bool, SchemaError> {
    validate(document).map(|report| report.is_valid())
}

/// Validation seam used by the formatter.
pub trait SchemaValidator {
    /// Validate `document` against the schema registered for `namespace`.
    fn validate(&self, document: &[u8], namespace: &str) -> Result<ValidationReport, SchemaError>;
}

/// Validator backed by the embedded schema resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSchemaValidator;

impl SchemaValidator for EmbeddedSchemaValidator {
    fn validate(&self, document: &[u8], namespace: &str) -> Result<ValidationReport, SchemaError> {
        let schema = schema()?;
        let mut report = validate(document)?;
        if namespace != schema.namespace {
            report.push(
                "/",
                format!("no schema registered for namespace '{namespace}'"),
            );
        }
        Ok(report)
    }
}
