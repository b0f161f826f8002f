#![cfg_attr(docsrs, feature(doc_cfg))]
//! Provisioning template formatter for the 2015-05 schema.
//!
//! This crate re-exports the workspace crates and offers [`XmlFormatter`], a
//! small facade that bundles a [`DocumentStore`], a [`SchemaValidator`] and a
//! [`ProviderRegistry`].
//!
//! ```rust,no_run
//! use pnp::{MemoryStore, ProviderRegistry, Template, XmlFormatter};
//!
//! # fn run() -> Result<(), pnp::FormatterError> {
//! let formatter = XmlFormatter::new(MemoryStore::new())
//!     .with_providers(ProviderRegistry::new().with("Contoso.BrandingHandler", "Contoso"));
//!
//! let bytes = formatter.to_formatted_template(&Template::new("TEAM-SITE"))?;
//! assert!(formatter.is_valid(&bytes));
//! let template = formatter.to_provisioning_template(&bytes, Some("TEAM-SITE"))?;
//! println!("read template {} v{}", template.id, template.version);
//! # Ok(())
//! # }
//! ```

pub use pnp_formatter as formatter;
pub use pnp_model as model;
pub use pnp_schema as schema;
pub use pnp_xml as xml;

use pnp_formatter::reader::{Reader, TemplateEntry};
use pnp_schema::{EmbeddedSchemaValidator, SchemaValidator, ValidationReport};
use pnp_xml::PROVISIONING_NAMESPACE;
use tracing::{debug, warn};

pub use pnp_formatter::{
    DocumentStore, FileSystemStore, FormatterError, MemoryStore, ProviderDescriptor,
    ProviderRegistry,
};
pub use pnp_model::Template;

/// Formatter for the 2015-05 provisioning schema bound to a document store.
#[derive(Debug)]
pub struct XmlFormatter<S: DocumentStore, V: SchemaValidator = EmbeddedSchemaValidator> {
    store: S,
    validator: V,
    providers: ProviderRegistry,
}

impl<S: DocumentStore> XmlFormatter<S> {
    /// Create a formatter using the embedded schema and an empty provider
    /// registry.
    pub fn new(store: S) -> Self {
        Self {
            store,
            validator: EmbeddedSchemaValidator,
            providers: ProviderRegistry::new(),
        }
    }
}

impl<S: DocumentStore, V: SchemaValidator> XmlFormatter<S, V> {
    /// Replace the provider registry used to resolve handler types on read.
    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Swap the schema validator.
    pub fn with_validator<W: SchemaValidator>(self, validator: W) -> XmlFormatter<S, W> {
        XmlFormatter {
            store: self.store,
            validator,
            providers: self.providers,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Validate `document` and return the full report.
    pub fn validate(&self, document: &[u8]) -> Result<ValidationReport, FormatterError> {
        Ok(self.validator.validate(document, PROVISIONING_NAMESPACE)?)
    }

    /// `true` when `document` is well formed and passes schema validation.
    pub fn is_valid(&self, document: &[u8]) -> bool {
        match self.validate(document) {
            Ok(report) => report.is_valid(),
            Err(err) => {
                warn!(error = %err, "document could not be validated");
                false
            }
        }
    }

    /// Serialize `template` into a `Provisioning` wrapper document.
    pub fn to_formatted_template(&self, template: &Template) -> Result<Vec<u8>, FormatterError> {
        let bytes = pnp_formatter::write(template)?;
        debug!(template = %template.id, bytes = bytes.len(), "formatted template");
        Ok(bytes)
    }

    /// Read a template from `document`. `identifier` selects a template
    /// inside a wrapper; `None` takes the first available one.
    pub fn to_provisioning_template(
        &self,
        document: &[u8],
        identifier: Option<&str>,
    ) -> Result<Template, FormatterError> {
        self.reader().read(document, identifier)
    }

    /// Templates offered by `document`, including unresolved file references.
    pub fn list_templates(&self, document: &[u8]) -> Result<Vec<TemplateEntry>, FormatterError> {
        self.reader().list_templates(document)
    }

    fn reader(&self) -> Reader<'_> {
        Reader::new(&self.store, &self.validator, &self.providers)
    }
}
