//! Parse provisioning XML into a namespace-resolved element tree and write
//! trees back out using quick-xml.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::ops::Range;

use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use thiserror::Error;
use tracing::trace;

/// Namespace of the 2015-05 provisioning schema.
pub const PROVISIONING_NAMESPACE: &str =
    "http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema";
/// Prefix bound to [`PROVISIONING_NAMESPACE`] in written documents.
pub const PROVISIONING_PREFIX: &str = "pnp";

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("xml: {0}")]
    Xml(String),
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// Node stored below an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data (text or CDATA).
    Text(String),
    /// Pre-serialized markup emitted verbatim by the writer.
    Raw(String),
}

/// Element with its local name, resolved namespace, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub namespace: Option<String>,
    /// Attributes keyed by local name. Prefixed attributes (for example
    /// `xsi:schemaLocation`) keep their qualified name.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    span: Range<usize>,
    inner: Range<usize>,
    /// Source offset just past the qualified name in the start tag.
    name_end: usize,
    /// Declarations inherited from ancestors that the subtree relies on,
    /// rendered as ` xmlns:p="..."`.
    inherited: String,
}

impl Element {
    /// Create an element without namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    /// Create an element in the provisioning namespace.
    pub fn provisioning(name: impl Into<String>) -> Self {
        Element {
            namespace: Some(PROVISIONING_NAMESPACE.to_string()),
            ..Element::new(name)
        }
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn push_raw(&mut self, markup: impl Into<String>) {
        self.children.push(Node::Raw(markup.into()));
    }

    /// Iterate over child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|element| element.name == name)
    }

    /// All child elements with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |element| element.name == name)
    }

    /// Concatenated character data of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(text) = node {
                out.push_str(text);
            }
        }
        out
    }

    /// Whether any direct text child carries something other than whitespace.
    pub fn has_significant_text(&self) -> bool {
        self.children.iter().any(|node| match node {
            Node::Text(text) => !text.trim().is_empty(),
            _ => false,
        })
    }
}

/// Parsed document. Keeps the source text so opaque fragments can be handed
/// out exactly as they were written.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    root: Element,
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// Markup of `element`, including its own tags.
    ///
    /// The slice is taken verbatim from the source. Namespace declarations
    /// made on ancestors and used inside the element are added to its start
    /// tag, so the fragment stands on its own. Elements that were not produced
    /// by [`parse`] for this document yield an empty string.
    pub fn outer_xml(&self, element: &Element) -> Cow<'_, str> {
        let Some(markup) = self.source.get(element.span.clone()) else {
            return Cow::Borrowed("");
        };
        if element.inherited.is_empty() {
            return Cow::Borrowed(markup);
        }
        let at = element.name_end - element.span.start;
        Cow::Owned(format!("{}{}{}", &markup[..at], element.inherited, &markup[at..]))
    }

    /// Markup between the start and end tags of `element`. Child elements
    /// get their inherited namespace declarations as in [`Document::outer_xml`].
    pub fn inner_xml(&self, element: &Element) -> Cow<'_, str> {
        let Some(markup) = self.source.get(element.inner.clone()) else {
            return Cow::Borrowed("");
        };
        let base = element.inner.start;
        let mut out = String::new();
        let mut copied = 0;
        for child in element.elements().filter(|child| !child.inherited.is_empty()) {
            let at = child.name_end - base;
            out.push_str(&markup[copied..at]);
            out.push_str(&child.inherited);
            copied = at;
        }
        if copied == 0 {
            return Cow::Borrowed(markup);
        }
        out.push_str(&markup[copied..]);
        Cow::Owned(out)
    }
}

/// Parse a UTF-8 document into an element tree with resolved namespaces.
pub fn parse(document: &[u8]) -> Result<Document, XmlError> {
    let text = std::str::from_utf8(document)
        .map_err(|err| XmlError::Xml(format!("invalid UTF-8: {err}")))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let root = parse_tree(text)?;
    Ok(Document {
        source: text.to_string(),
        root,
    })
}

/// Element being parsed, with the namespace bookkeeping needed to make
/// fragments self-contained.
struct Open {
    element: Element,
    /// Prefixes declared on this element; `""` is the default namespace.
    declared: Vec<(String, String)>,
    /// Prefixes used in the subtree and not declared inside it.
    free: BTreeSet<String>,
}

fn parse_tree(text: &str) -> Result<Element, XmlError> {
    let mut reader = NsReader::from_str(text);
    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let start = reader.buffer_position();
        let (namespace, event) = match reader.read_resolved_event() {
            Ok((resolved, event)) => (resolve_namespace(resolved)?, event),
            Err(err) => return Err(XmlError::Xml(err.to_string())),
        };
        let end = reader.buffer_position();
        match event {
            Event::Start(e) => {
                let mut open = open_element(&e, namespace)?;
                open.element.span = start..start;
                open.element.inner = end..end;
                open.element.name_end = start + 1 + e.name().as_ref().len();
                stack.push(open);
            }
            Event::Empty(e) => {
                let mut open = open_element(&e, namespace)?;
                open.element.span = start..end;
                open.element.inner = end..end;
                open.element.name_end = start + 1 + e.name().as_ref().len();
                close(&mut stack, &mut root, open)?;
            }
            Event::End(_) => {
                let mut open = stack
                    .pop()
                    .ok_or_else(|| XmlError::Xml("unbalanced end tag".into()))?;
                open.element.span.end = end;
                open.element.inner.end = start;
                close(&mut stack, &mut root, open)?;
            }
            Event::Text(t) => {
                let value = t.unescape().map_err(|err| XmlError::Xml(err.to_string()))?;
                push_text(&mut stack, &value)?;
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let value = std::str::from_utf8(&raw)
                    .map_err(|err| XmlError::Xml(format!("invalid UTF-8 in CDATA: {err}")))?;
                push_text(&mut stack, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::Xml(format!("unclosed element <{}>", open.element.name)));
    }
    let root = root.ok_or_else(|| XmlError::Invalid("document has no root element".into()))?;
    trace!(root = %root.name, "parsed xml tree");
    Ok(root)
}

fn resolve_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, XmlError> {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => Ok(Some(String::from_utf8_lossy(ns).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(XmlError::Xml(format!(
            "unknown namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn prefix_of(qname: &[u8]) -> Option<&[u8]> {
    qname
        .iter()
        .position(|&b| b == b':')
        .map(|colon| &qname[..colon])
}

fn open_element(event: &BytesStart<'_>, namespace: Option<String>) -> Result<Open, XmlError> {
    let name = String::from_utf8_lossy(event.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    let mut declared = Vec::new();
    let mut used = BTreeSet::new();
    let element_qname = event.name();
    let element_prefix = prefix_of(element_qname.as_ref()).unwrap_or_default();
    used.insert(String::from_utf8_lossy(element_prefix).into_owned());

    for attr in event.attributes() {
        let attr = attr.map_err(|err| XmlError::Xml(err.to_string()))?;
        let key = attr.key.as_ref();
        let value = attr
            .unescape_value()
            .map_err(|err| XmlError::Xml(err.to_string()))?;
        if key == b"xmlns" {
            declared.push((String::new(), value.into_owned()));
            continue;
        }
        if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            declared.push((String::from_utf8_lossy(prefix).into_owned(), value.into_owned()));
            continue;
        }
        if let Some(prefix) = prefix_of(key) {
            used.insert(String::from_utf8_lossy(prefix).into_owned());
        }
        attributes.push((String::from_utf8_lossy(key).into_owned(), value.into_owned()));
    }

    used.remove("xml");
    let free = used
        .into_iter()
        .filter(|prefix| !declared.iter().any(|(p, _)| p == prefix))
        .collect();
    Ok(Open {
        element: Element {
            name,
            namespace,
            attributes,
            ..Element::default()
        },
        declared,
        free,
    })
}

/// Binding of `prefix` in the scope formed by `stack`.
fn lookup<'a>(stack: &'a [Open], prefix: &str) -> Option<&'a str> {
    stack.iter().rev().find_map(|open| {
        open.declared
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    })
}

fn close(stack: &mut [Open], root: &mut Option<Element>, open: Open) -> Result<(), XmlError> {
    let Open {
        mut element, free, ..
    } = open;
    for prefix in &free {
        match (prefix.as_str(), lookup(stack, prefix)) {
            ("", Some(uri)) if !uri.is_empty() => {
                element.inherited.push_str(&format!(" xmlns=\"{}\"", escape(uri)));
            }
            ("", _) | (_, None) => {}
            (prefix, Some(uri)) => {
                element
                    .inherited
                    .push_str(&format!(" xmlns:{prefix}=\"{}\"", escape(uri)));
            }
        }
    }

    match stack.last_mut() {
        Some(parent) => {
            for prefix in free {
                if !parent.declared.iter().any(|(p, _)| *p == prefix) {
                    parent.free.insert(prefix);
                }
            }
            parent.element.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlError::Xml(format!(
            "second root element <{}>",
            element.name
        ))),
    }
}

fn push_text(stack: &mut [Open], value: &str) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.element.children.push(Node::Text(value.to_string()));
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(XmlError::Xml("text outside of the root element".into())),
    }
}

/// Serialize `root` as a UTF-8 document with two-space indentation.
///
/// Elements whose namespace equals `namespace` are written with `prefix`, and
/// the binding is declared on the root element.
pub fn write_document(root: &Element, prefix: &str, namespace: &str) -> Result<Vec<u8>, XmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|err| XmlError::Xml(err.to_string()))?;
    let binding = Binding { prefix, namespace };
    write_element(&mut writer, root, &binding, true)?;
    Ok(writer.into_inner())
}

struct Binding<'a> {
    prefix: &'a str,
    namespace: &'a str,
}

impl Binding<'_> {
    fn qualify(&self, element: &Element) -> String {
        match element.namespace.as_deref() {
            Some(ns) if ns == self.namespace && !self.prefix.is_empty() => {
                format!("{}:{}", self.prefix, element.name)
            }
            _ => element.name.clone(),
        }
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    binding: &Binding<'_>,
    is_root: bool,
) -> Result<(), XmlError> {
    let qname = binding.qualify(element);
    let mut start = BytesStart::new(qname.as_str());
    let xmlns = format!("xmlns:{}", binding.prefix);
    if is_root && !binding.prefix.is_empty() {
        start.push_attribute((xmlns.as_str(), binding.namespace));
    }
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(|err| XmlError::Xml(err.to_string()));
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|err| XmlError::Xml(err.to_string()))?;
    for node in &element.children {
        match node {
            Node::Element(child) => write_element(writer, child, binding, false)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(|err| XmlError::Xml(err.to_string()))?,
            Node::Raw(markup) => writer
                .write_event(Event::Text(BytesText::from_escaped(markup.as_str())))
                .map_err(|err| XmlError::Xml(err.to_string()))?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(qname.as_str())))
        .map_err(|err| XmlError::Xml(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="SPECIALTEAM" Version="1">
  <pnp:SiteFields>
    <Field ID="{23203E97-3BFE-40CB-AFB4-07AA2B86BF45}" Type="Text" Name="ProjectID" />
  </pnp:SiteFields>
  <pnp:Preferences><pnp:Parameter Key="A">x &amp; y</pnp:Parameter></pnp:Preferences>
</pnp:SharePointProvisioningTemplate>"#;

    #[test]
    fn parse_resolves_namespaces_and_attributes() {
        let doc = parse(SAMPLE.as_bytes()).expect("parse sample");
        let root = doc.root();
        assert!(root.is(PROVISIONING_NAMESPACE, "SharePointProvisioningTemplate"));
        assert_eq!(root.attr("ID"), Some("SPECIALTEAM"));
        assert_eq!(root.attr("Version"), Some("1"));
        assert!(root.attr("xmlns:pnp").is_none());

        let fields = root.child("SiteFields").expect("site fields");
        let field = fields.child("Field").expect("field");
        assert_eq!(field.namespace, None);
        assert_eq!(
            doc.outer_xml(field),
            r#"<Field ID="{23203E97-3BFE-40CB-AFB4-07AA2B86BF45}" Type="Text" Name="ProjectID" />"#
        );

        let parameter = root
            .child("Preferences")
            .and_then(|prefs| prefs.child("Parameter"))
            .expect("parameter");
        assert_eq!(parameter.text(), "x & y");
        assert_eq!(doc.inner_xml(parameter), "x &amp; y");
    }

    #[test]
    fn malformed_input_is_an_error() {
        let err = parse(b"<a><b></a>").unwrap_err();
        assert!(matches!(err, XmlError::Xml(_)));
        let err = parse(b"   ").unwrap_err();
        assert!(matches!(err, XmlError::Invalid(_)));
        let err = parse(b"<x:a/>").unwrap_err();
        assert!(matches!(err, XmlError::Xml(_)));
    }

    #[test]
    fn write_binds_prefix_and_keeps_raw_markup() {
        let mut root = Element::provisioning("Provisioning").with_attr("ID", "a<b");
        let mut fields = Element::provisioning("SiteFields");
        fields.push_raw(r#"<Field Name="X"/>"#);
        root.push(fields);
        let mut param = Element::provisioning("Parameter");
        param.push_text("1 < 2");
        root.push(param);
        root.push(Element::provisioning("Empty"));

        let bytes =
            write_document(&root, PROVISIONING_PREFIX, PROVISIONING_NAMESPACE).expect("write");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(text.contains(
            r#"<pnp:Provisioning xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="a&lt;b">"#
        ));
        assert!(text.contains(r#"<pnp:SiteFields><Field Name="X"/></pnp:SiteFields>"#));
        assert!(text.contains("<pnp:Parameter>1 &lt; 2</pnp:Parameter>"));
        assert!(text.contains("<pnp:Empty/>"));

        let doc = parse(text.as_bytes()).expect("reparse");
        let field = doc
            .root()
            .child("SiteFields")
            .and_then(|f| f.child("Field"))
            .expect("field");
        assert_eq!(doc.outer_xml(field), r#"<Field Name="X"/>"#);
        assert_eq!(doc.root().attr("ID"), Some("a<b"));
    }

    const PREFIXED: &str = r#"<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" xmlns:x="urn:x" xmlns:y="urn:y&amp;z" ID="T">
  <pnp:SiteFields>
    <x:Field ID="1" y:Hidden="true"><x:Choice>A</x:Choice></x:Field>
    <Field xmlns:x="urn:local" x:Name="local" />
  </pnp:SiteFields>
  <pnp:Configuration>
    <x:Settings />
    <Plain />
  </pnp:Configuration>
</pnp:SharePointProvisioningTemplate>"#;

    #[test]
    fn fragments_carry_inherited_declarations() {
        let doc = parse(PREFIXED.as_bytes()).expect("parse");
        let fields: Vec<_> = doc
            .root()
            .child("SiteFields")
            .expect("site fields")
            .elements()
            .map(|field| doc.outer_xml(field).into_owned())
            .collect();
        assert_eq!(
            fields[0],
            r#"<x:Field xmlns:x="urn:x" xmlns:y="urn:y&amp;z" ID="1" y:Hidden="true"><x:Choice>A</x:Choice></x:Field>"#
        );
        assert_eq!(fields[1], r#"<Field xmlns:x="urn:local" x:Name="local" />"#);

        let config = doc.root().child("Configuration").expect("configuration");
        assert_eq!(
            doc.inner_xml(config),
            "\n    <x:Settings xmlns:x=\"urn:x\" />\n    <Plain />\n  "
        );

        let field = parse(fields[0].as_bytes()).expect("fragment stands alone");
        assert_eq!(field.root().namespace.as_deref(), Some("urn:x"));
        assert_eq!(field.root().attr("y:Hidden"), Some("true"));
    }

    #[test]
    fn default_namespace_is_inherited() {
        let text = r#"<Root xmlns="urn:default"><Inner><Leaf A="1" /></Inner><Other xmlns="" /></Root>"#;
        let doc = parse(text.as_bytes()).expect("parse");
        let inner = doc.root().child("Inner").expect("inner");
        assert_eq!(
            doc.outer_xml(inner),
            r#"<Inner xmlns="urn:default"><Leaf A="1" /></Inner>"#
        );
        let other = doc.root().child("Other").expect("other");
        assert_eq!(other.namespace, None);
        assert_eq!(doc.outer_xml(other), r#"<Other xmlns="" />"#);
        assert_eq!(doc.outer_xml(doc.root()), text);
    }
}
