//! Typed binding of the 2015-05 wire schema.
//!
//! Structs mirror the schema one to one. Optional collections are `Option<Vec>`
//! so that an absent element and an element with no entries stay distinct,
//! and optional numeric attributes carry an explicit `*_specified` companion.
//! Decoding assumes a schema-valid tree but still reports unconvertible values
//! as [`FormatterError::Malformed`].

mod sections;
mod terms;

use std::str::FromStr;

use pnp_xml::{Document, Element, PROVISIONING_NAMESPACE};

use crate::FormatterError;

pub use sections::*;
pub use terms::{Label, Term, TermGroup, TermSet};

pub const PROVISIONING: &str = "Provisioning";
pub const TEMPLATE: &str = "SharePointProvisioningTemplate";
pub const TEMPLATE_FILE: &str = "SharePointProvisioningTemplateFile";

/// Wrapper document: preferences plus one or more template containers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Provisioning {
    pub preferences: Preferences,
    pub templates: Vec<Templates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preferences {
    pub version: Option<String>,
    pub author: Option<String>,
    pub generator: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parameter {
    pub key: String,
    pub required: bool,
    /// Character content; `None` when the element is empty.
    pub text: Option<String>,
}

/// One `Templates` container.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Templates {
    pub id: String,
    pub template_files: Vec<TemplateFile>,
    pub templates: Vec<ProvisioningTemplate>,
}

/// Reference to a template stored in a separate document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateFile {
    pub file: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProvisioningTemplate {
    pub id: String,
    pub version: f64,
    pub version_specified: bool,
    pub site_policy: Option<String>,
    pub property_bag_entries: Option<Vec<StringDictionaryItem>>,
    pub security: Option<Security>,
    pub site_fields: Option<AnyContent>,
    pub content_types: Option<Vec<ContentType>>,
    pub lists: Option<Vec<ListInstance>>,
    pub features: Option<Features>,
    pub custom_actions: Option<CustomActions>,
    pub files: Option<Vec<File>>,
    pub pages: Option<Vec<Page>>,
    pub term_groups: Option<Vec<TermGroup>>,
    pub composed_look: Option<ComposedLook>,
    pub providers: Option<Vec<Provider>>,
}

impl Provisioning {
    pub fn decode(doc: &Document, el: &Element) -> Result<Self, FormatterError> {
        let preferences = match child(el, "Preferences") {
            Some(prefs) => Preferences::decode(prefs)?,
            None => Preferences::default(),
        };
        let templates = children(el, "Templates")
            .map(|container| Templates::decode(doc, container))
            .collect::<Result<_, _>>()?;
        Ok(Provisioning {
            preferences,
            templates,
        })
    }

    pub fn encode(&self) -> Element {
        let mut el = pnp(PROVISIONING);
        el.push(self.preferences.encode());
        for container in &self.templates {
            el.push(container.encode());
        }
        el
    }
}

impl Preferences {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(Preferences {
            version: optional(el, "Version"),
            author: optional(el, "Author"),
            generator: optional(el, "Generator"),
            parameters: list(el, "Parameters", "Parameter", Parameter::decode)?,
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Preferences");
        set_optional(&mut el, "Version", &self.version);
        set_optional(&mut el, "Author", &self.author);
        set_optional(&mut el, "Generator", &self.generator);
        push_list(&mut el, "Parameters", &self.parameters, Parameter::encode);
        el
    }
}

impl Parameter {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        let text = el.text();
        Ok(Parameter {
            key: required(el, "Key")?,
            required: flag(el, "Required")?,
            text: (!el.children.is_empty()).then_some(text),
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Parameter").with_attr("Key", self.key.as_str());
        set_flag(&mut el, "Required", self.required);
        if let Some(text) = &self.text {
            el.push_text(text.as_str());
        }
        el
    }
}

impl Templates {
    fn decode(doc: &Document, el: &Element) -> Result<Self, FormatterError> {
        let template_files = children(el, TEMPLATE_FILE)
            .map(|file| {
                Ok(TemplateFile {
                    file: required(file, "File")?,
                    id: required(file, "ID")?,
                })
            })
            .collect::<Result<_, FormatterError>>()?;
        let templates = children(el, TEMPLATE)
            .map(|template| ProvisioningTemplate::decode(doc, template))
            .collect::<Result<_, _>>()?;
        Ok(Templates {
            id: required(el, "ID")?,
            template_files,
            templates,
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Templates").with_attr("ID", self.id.as_str());
        for file in &self.template_files {
            el.push(
                pnp(TEMPLATE_FILE)
                    .with_attr("File", file.file.as_str())
                    .with_attr("ID", file.id.as_str()),
            );
        }
        for template in &self.templates {
            el.push(template.encode());
        }
        el
    }
}

impl ProvisioningTemplate {
    pub fn decode(doc: &Document, el: &Element) -> Result<Self, FormatterError> {
        let version: Option<f64> = number(el, "Version")?;
        Ok(ProvisioningTemplate {
            id: required(el, "ID")?,
            version: version.unwrap_or_default(),
            version_specified: version.is_some(),
            site_policy: optional(el, "SitePolicy"),
            property_bag_entries: list(
                el,
                "PropertyBagEntries",
                "PropertyBagEntry",
                StringDictionaryItem::decode,
            )?,
            security: child(el, "Security").map(Security::decode).transpose()?,
            site_fields: child(el, "SiteFields").map(|f| AnyContent::decode(doc, f)),
            content_types: list(el, "ContentTypes", "ContentType", ContentType::decode)?,
            lists: list(el, "Lists", "ListInstance", |l| ListInstance::decode(doc, l))?,
            features: child(el, "Features").map(Features::decode).transpose()?,
            custom_actions: child(el, "CustomActions")
                .map(CustomActions::decode)
                .transpose()?,
            files: list(el, "Files", "File", File::decode)?,
            pages: list(el, "Pages", "Page", Page::decode)?,
            term_groups: list(el, "TermGroups", "TermGroup", TermGroup::decode)?,
            composed_look: child(el, "ComposedLook")
                .map(ComposedLook::decode)
                .transpose()?,
            providers: list(el, "Providers", "Provider", |p| Provider::decode(doc, p))?,
        })
    }

    pub fn encode(&self) -> Element {
        let mut el = pnp(TEMPLATE).with_attr("ID", self.id.as_str());
        if self.version_specified {
            el.set_attr("Version", self.version.to_string());
        }
        set_optional(&mut el, "SitePolicy", &self.site_policy);
        push_list(
            &mut el,
            "PropertyBagEntries",
            &self.property_bag_entries,
            |entry| entry.encode("PropertyBagEntry"),
        );
        if let Some(security) = &self.security {
            el.push(security.encode());
        }
        if let Some(fields) = &self.site_fields {
            el.push(fields.encode("SiteFields"));
        }
        push_list(&mut el, "ContentTypes", &self.content_types, ContentType::encode);
        push_list(&mut el, "Lists", &self.lists, ListInstance::encode);
        if let Some(features) = &self.features {
            el.push(features.encode());
        }
        if let Some(actions) = &self.custom_actions {
            el.push(actions.encode());
        }
        push_list(&mut el, "Files", &self.files, File::encode);
        push_list(&mut el, "Pages", &self.pages, Page::encode);
        push_list(&mut el, "TermGroups", &self.term_groups, TermGroup::encode);
        if let Some(look) = &self.composed_look {
            el.push(look.encode());
        }
        push_list(&mut el, "Providers", &self.providers, Provider::encode);
        el
    }
}

pub(crate) fn pnp(name: &str) -> Element {
    Element::provisioning(name)
}

/// First child element in the provisioning namespace with the given name.
pub(crate) fn child<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
    el.elements()
        .find(|child| child.is(PROVISIONING_NAMESPACE, name))
}

pub(crate) fn children<'a>(el: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> {
    el.elements()
        .filter(move |child| child.is(PROVISIONING_NAMESPACE, name))
}

/// Decode `<container><item/>...</container>`; `None` when the container is
/// absent.
pub(crate) fn list<T, F>(
    el: &Element,
    container: &str,
    item: &str,
    mut decode: F,
) -> Result<Option<Vec<T>>, FormatterError>
where
    F: FnMut(&Element) -> Result<T, FormatterError>,
{
    child(el, container)
        .map(|c| children(c, item).map(&mut decode).collect())
        .transpose()
}

/// Encode `items` inside `container`. Nothing is written for `None`.
pub(crate) fn push_list<T, F>(el: &mut Element, container: &str, items: &Option<Vec<T>>, encode: F)
where
    F: Fn(&T) -> Element,
{
    if let Some(items) = items {
        let mut wrapper = pnp(container);
        for item in items {
            wrapper.push(encode(item));
        }
        el.push(wrapper);
    }
}

pub(crate) fn required(el: &Element, name: &str) -> Result<String, FormatterError> {
    el.attr(name).map(str::to_string).ok_or_else(|| {
        FormatterError::malformed(format!("<{}> is missing attribute '{name}'", el.name))
    })
}

pub(crate) fn optional(el: &Element, name: &str) -> Option<String> {
    el.attr(name).map(str::to_string)
}

/// Boolean attribute; absent reads as `false`.
pub(crate) fn flag(el: &Element, name: &str) -> Result<bool, FormatterError> {
    match el.attr(name).map(str::trim) {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(other) => Err(FormatterError::malformed(format!(
            "<{}>/@{name}: '{other}' is not a boolean",
            el.name
        ))),
    }
}

pub(crate) fn number<T: FromStr>(el: &Element, name: &str) -> Result<Option<T>, FormatterError> {
    el.attr(name)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                FormatterError::malformed(format!(
                    "<{}>/@{name}: '{raw}' is not a number",
                    el.name
                ))
            })
        })
        .transpose()
}

pub(crate) fn required_number<T: FromStr>(el: &Element, name: &str) -> Result<T, FormatterError> {
    number(el, name)?.ok_or_else(|| {
        FormatterError::malformed(format!("<{}> is missing attribute '{name}'", el.name))
    })
}

pub(crate) fn set_optional(el: &mut Element, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        el.set_attr(name, value.as_str());
    }
}

/// Booleans are only written when set.
pub(crate) fn set_flag(el: &mut Element, name: &str, value: bool) {
    if value {
        el.set_attr(name, "true");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WRAPPER: &str = r#"<?xml version="1.0"?>
<pnp:Provisioning xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema">
  <pnp:Preferences Author="ops" Generator="hand">
    <pnp:Parameters>
      <pnp:Parameter Key="Empty" />
      <pnp:Parameter Key="Owner" Required="true">team@contoso.com</pnp:Parameter>
    </pnp:Parameters>
  </pnp:Preferences>
  <pnp:Templates ID="CONTAINER-1">
    <pnp:SharePointProvisioningTemplateFile File="ext.xml" ID="EXT" />
    <pnp:SharePointProvisioningTemplate ID="A" Version="2.5" SitePolicy="Keep">
      <pnp:PropertyBagEntries>
        <pnp:PropertyBagEntry Key="k" Value="v" />
      </pnp:PropertyBagEntries>
    </pnp:SharePointProvisioningTemplate>
    <pnp:SharePointProvisioningTemplate ID="B" />
  </pnp:Templates>
</pnp:Provisioning>"#;

    #[test]
    fn decode_wrapper() {
        let doc = pnp_xml::parse(WRAPPER.as_bytes()).expect("parse");
        let wire = Provisioning::decode(&doc, doc.root()).expect("decode");

        assert_eq!(wire.preferences.author.as_deref(), Some("ops"));
        let params = wire.preferences.parameters.as_ref().expect("parameters");
        assert_eq!(params[0].text, None);
        assert_eq!(params[1].text.as_deref(), Some("team@contoso.com"));
        assert!(params[1].required);

        let container = &wire.templates[0];
        assert_eq!(container.id, "CONTAINER-1");
        assert_eq!(
            container.template_files,
            vec![TemplateFile {
                file: "ext.xml".into(),
                id: "EXT".into()
            }]
        );
        let a = &container.templates[0];
        assert_eq!(a.version, 2.5);
        assert!(a.version_specified);
        assert_eq!(a.site_policy.as_deref(), Some("Keep"));
        assert_eq!(a.property_bag_entries.as_ref().map(Vec::len), Some(1));
        let b = &container.templates[1];
        assert!(!b.version_specified);
        assert!(b.property_bag_entries.is_none());
    }

    #[test]
    fn encode_decode_keeps_structure() {
        let doc = pnp_xml::parse(WRAPPER.as_bytes()).expect("parse");
        let wire = Provisioning::decode(&doc, doc.root()).expect("decode");
        let bytes = pnp_xml::write_document(
            &wire.encode(),
            pnp_xml::PROVISIONING_PREFIX,
            PROVISIONING_NAMESPACE,
        )
        .expect("write");
        assert!(pnp_schema::is_valid(&bytes).expect("validate"));
        let doc = pnp_xml::parse(&bytes).expect("reparse");
        let again = Provisioning::decode(&doc, doc.root()).expect("decode again");
        assert_eq!(again, wire);
    }

    #[test]
    fn bad_values_are_malformed() {
        let el = pnp("ListInstance")
            .with_attr("Hidden", "maybe")
            .with_attr("TemplateType", "x");
        assert!(matches!(flag(&el, "Hidden"), Err(FormatterError::Malformed(_))));
        assert!(matches!(
            number::<i32>(&el, "TemplateType"),
            Err(FormatterError::Malformed(_))
        ));
        assert_eq!(number::<i32>(&el, "Missing").expect("absent"), None);
    }
}
