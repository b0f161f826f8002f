//! Declarative schema set loaded from the embedded JSON resource.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::SchemaError;

const RESOURCE: &str = include_str!("resources/provisioning-2015-05.json");

static SCHEMA: OnceLock<Result<SchemaSet, String>> = OnceLock::new();

/// Return the embedded 2015-05 schema, loading it on first use.
///
/// Loading happens at most once per process; later calls (from any thread)
/// observe the cached outcome, including a cached load failure.
pub fn schema() -> Result<&'static SchemaSet, SchemaError> {
    SCHEMA
        .get_or_init(|| SchemaSet::from_json(RESOURCE))
        .as_ref()
        .map_err(|msg| SchemaError::Resource(msg.clone()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaSet {
    pub namespace: String,
    pub version: String,
    pub roots: Vec<RootDecl>,
    #[serde(default)]
    pub simple_types: HashMap<String, Vec<String>>,
    pub types: HashMap<String, ComplexType>,
}

/// Element allowed as document root.
#[derive(Debug, Clone, Deserialize)]
pub struct RootDecl {
    pub element: String,
    #[serde(rename = "type")]
    type_name: Option<String>,
}

impl RootDecl {
    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or(&self.element)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComplexType {
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
    #[serde(default)]
    pub content: Content,
}

impl ComplexType {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|decl| decl.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDecl {
    pub name: String,
    #[serde(rename = "type", default = "string_type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
}

fn string_type() -> String {
    "string".to_string()
}

/// Content model of a complex type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Content {
    /// No children and no character data.
    #[default]
    Empty,
    /// Character data only.
    Text,
    /// Wildcard: anything goes, children are not inspected.
    Any,
    /// Ordered child elements.
    Sequence(Vec<Particle>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Particle {
    pub element: String,
    #[serde(rename = "type")]
    type_name: Option<String>,
    #[serde(default = "one")]
    pub min: u32,
    #[serde(default = "one")]
    pub max: u32,
    #[serde(default)]
    pub unbounded: bool,
}

fn one() -> u32 {
    1
}

impl Particle {
    /// Complex type of the element; defaults to the element name.
    pub fn type_name(&self) -> &str {
        self.type_name.as_deref().unwrap_or(&self.element)
    }

    pub fn accepts_more(&self, seen: u32) -> bool {
        self.unbounded || seen < self.max
    }
}

const BUILTIN_TYPES: &[&str] = &["string", "boolean", "int", "unsignedLong", "decimal", "guid"];

impl SchemaSet {
    /// Parse a schema set and check that every type reference resolves.
    pub fn from_json(text: &str) -> Result<SchemaSet, String> {
        let schema: SchemaSet =
            serde_json::from_str(text).map_err(|err| format!("invalid schema json: {err}"))?;
        schema.check_references()?;
        debug!(
            namespace = %schema.namespace,
            version = %schema.version,
            types = schema.types.len(),
            "loaded provisioning schema"
        );
        Ok(schema)
    }

    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.types.get(name)
    }

    fn check_references(&self) -> Result<(), String> {
        if self.roots.is_empty() {
            return Err("schema declares no root elements".into());
        }
        for root in &self.roots {
            if !self.types.contains_key(root.type_name()) {
                return Err(format!(
                    "root <{}> refers to unknown type '{}'",
                    root.element,
                    root.type_name()
                ));
            }
        }
        for (name, ty) in &self.types {
            for attr in &ty.attributes {
                if !BUILTIN_TYPES.contains(&attr.type_name.as_str())
                    && !self.simple_types.contains_key(&attr.type_name)
                {
                    return Err(format!(
                        "attribute {name}/@{} has unknown type '{}'",
                        attr.name, attr.type_name
                    ));
                }
            }
            if let Content::Sequence(particles) = &ty.content {
                for particle in particles {
                    if !self.types.contains_key(particle.type_name()) {
                        return Err(format!(
                            "element {name}/{} refers to unknown type '{}'",
                            particle.element,
                            particle.type_name()
                        ));
                    }
                    if !particle.unbounded && particle.max < particle.min {
                        return Err(format!(
                            "element {name}/{} has max < min",
                            particle.element
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Check an attribute value against a simple type. Whitespace around
    /// non-string values is collapsed first.
    pub fn check_value(&self, type_name: &str, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        match type_name {
            "string" => Ok(()),
            "boolean" => match trimmed {
                "true" | "false" | "1" | "0" => Ok(()),
                _ => Err(format!("'{value}' is not a valid boolean")),
            },
            "int" => trimmed
                .parse::<i32>()
                .map(|_| ())
                .map_err(|_| format!("'{value}' is not a valid int")),
            "unsignedLong" => trimmed
                .parse::<u64>()
                .map(|_| ())
                .map_err(|_| format!("'{value}' is not a valid unsignedLong")),
            "decimal" => {
                if is_decimal(trimmed) {
                    Ok(())
                } else {
                    Err(format!("'{value}' is not a valid decimal"))
                }
            }
            "guid" => Uuid::parse_str(trimmed)
                .map(|_| ())
                .map_err(|_| format!("'{value}' is not a valid GUID")),
            other => match self.simple_types.get(other) {
                Some(allowed) if allowed.iter().any(|v| v == trimmed) => Ok(()),
                Some(_) => Err(format!("'{value}' is not a valid {other}")),
                None => Err(format!("unknown simple type '{other}'")),
            },
        }
    }
}

fn is_decimal(value: &str) -> bool {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, frac),
        None => (digits, ""),
    };
    !(int.is_empty() && frac.is_empty())
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_schema_loads_once() {
        let first = schema().expect("embedded schema");
        let second = schema().expect("embedded schema");
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.namespace, pnp_xml::PROVISIONING_NAMESPACE);
        assert!(first.complex_type("SharePointProvisioningTemplate").is_some());
    }

    #[test]
    fn dangling_type_reference_is_rejected() {
        let json = r#"{
            "namespace": "urn:x",
            "version": "1",
            "roots": [{ "element": "A" }],
            "types": { "A": { "content": { "sequence": [{ "element": "B" }] } } }
        }"#;
        let err = SchemaSet::from_json(json).unwrap_err();
        assert!(err.contains("unknown type 'B'"), "{err}");
    }

    #[test]
    fn simple_type_checks() {
        let schema = schema().expect("embedded schema");
        assert!(schema.check_value("boolean", "true").is_ok());
        assert!(schema.check_value("boolean", "yes").is_err());
        assert!(schema.check_value("int", " 42 ").is_ok());
        assert!(schema.check_value("int", "4.2").is_err());
        assert!(schema.check_value("unsignedLong", "-1").is_err());
        assert!(schema.check_value("decimal", "1.5").is_ok());
        assert!(schema.check_value("decimal", ".").is_err());
        assert!(schema
            .check_value("guid", "{23203E97-3BFE-40CB-AFB4-07AA2B86BF45}")
            .is_ok());
        assert!(schema.check_value("guid", "not-a-guid").is_err());
        assert!(schema.check_value("WikiPageLayout", "TwoColumns").is_ok());
        assert!(schema.check_value("WikiPageLayout", "FourColumns").is_err());
    }
}
