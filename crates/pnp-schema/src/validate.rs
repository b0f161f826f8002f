use std::collections::HashMap;
use std::fmt;

use pnp_xml::{Document, Element};
use tracing::trace;

use crate::schema::{ComplexType, Content, SchemaSet};

/// One schema violation, located by an element path such as
/// `/Provisioning/Templates[1]/SharePointProvisioningTemplate[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of a validation run. Any diagnostic makes the document invalid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            path: path.into(),
            message: message.into(),
        });
    }
}

impl SchemaSet {
    /// Validate a parsed document against this schema set.
    pub fn validate_document(&self, document: &Document) -> ValidationReport {
        let mut report = ValidationReport::default();
        let root = document.root();
        let path = format!("/{}", root.name);
        match self
            .roots
            .iter()
            .find(|decl| root.is(&self.namespace, &decl.element))
        {
            Some(decl) => self.check_element(root, decl.type_name(), &path, &mut report),
            None => report.push(
                path,
                format!(
                    "root element {} is not declared by the schema",
                    qualified(root)
                ),
            ),
        }
        trace!(
            root = %root.name,
            diagnostics = report.diagnostics.len(),
            "validated document"
        );
        report
    }

    fn check_element(
        &self,
        element: &Element,
        type_name: &str,
        path: &str,
        report: &mut ValidationReport,
    ) {
        let Some(ty) = self.complex_type(type_name) else {
            report.push(path, format!("no declaration for type '{type_name}'"));
            return;
        };
        self.check_attributes(element, ty, path, report);

        match &ty.content {
            Content::Any => {}
            Content::Empty => {
                if element.elements().next().is_some() || element.has_significant_text() {
                    report.push(path, "element must be empty");
                }
            }
            Content::Text => {
                if let Some(child) = element.elements().next() {
                    report.push(
                        path,
                        format!("unexpected child element {} in text content", qualified(child)),
                    );
                }
            }
            Content::Sequence(particles) => {
                if element.has_significant_text() {
                    report.push(path, "character data is not allowed in element-only content");
                }
                let children: Vec<&Element> = element.elements().collect();
                let mut pos = 0;
                let mut indices: HashMap<&str, usize> = HashMap::new();
                for particle in particles {
                    let mut seen = 0u32;
                    while pos < children.len()
                        && particle.accepts_more(seen)
                        && children[pos].is(&self.namespace, &particle.element)
                    {
                        let child = children[pos];
                        let index = indices.entry(child.name.as_str()).or_insert(0);
                        *index += 1;
                        let child_path = format!("{path}/{}[{}]", child.name, index);
                        self.check_element(child, particle.type_name(), &child_path, report);
                        seen += 1;
                        pos += 1;
                    }
                    if seen < particle.min {
                        report.push(
                            path,
                            format!(
                                "expected at least {} <{}> element(s), found {seen}",
                                particle.min, particle.element
                            ),
                        );
                    }
                }
                for child in &children[pos..] {
                    report.push(
                        path,
                        format!("unexpected element {}", qualified(child)),
                    );
                }
            }
        }
    }

    fn check_attributes(
        &self,
        element: &Element,
        ty: &ComplexType,
        path: &str,
        report: &mut ValidationReport,
    ) {
        for decl in &ty.attributes {
            match element.attr(&decl.name) {
                Some(value) => {
                    if let Err(msg) = self.check_value(&decl.type_name, value) {
                        report.push(path, format!("attribute '{}': {msg}", decl.name));
                    }
                }
                None if decl.required => {
                    report.push(path, format!("missing required attribute '{}'", decl.name));
                }
                None => {}
            }
        }
        for (key, _) in &element.attributes {
            // Qualified attributes (xsi:*, xml:*) belong to other vocabularies.
            if key.contains(':') {
                continue;
            }
            if ty.attribute(key).is_none() {
                report.push(path, format!("attribute '{key}' is not declared"));
            }
        }
    }
}

fn qualified(element: &Element) -> String {
    match &element.namespace {
        Some(ns) => format!("{{{ns}}}{}", element.name),
        None => element.name.clone(),
    }
}
