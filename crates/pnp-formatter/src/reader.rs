//! Wire to model projection.
//!
//! Reading is single pass: validate, classify the root, resolve the requested
//! template (in place, or through a file reference and the document store),
//! then project it onto the model applying defaults for unspecified values.

use bytes::Bytes;
use pnp_model as model;
use pnp_model::{StringMap, Template, WebPartPosition};
use pnp_schema::SchemaValidator;
use pnp_xml::{Document, Element, PROVISIONING_NAMESPACE};
use tracing::debug;

use crate::providers::ProviderRegistry;
use crate::store::DocumentStore;
use crate::taxonomy::groups_from_wire;
use crate::wire::{self, PROVISIONING, TEMPLATE};
use crate::{parse_guid, unique_map, FormatterError};

/// `Sequence` of a custom action whose wire value is unspecified.
pub const DEFAULT_CUSTOM_ACTION_SEQUENCE: i32 = 100;

/// Accepted document roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    /// `Provisioning`: preferences plus template containers.
    Wrapper,
    /// A lone `SharePointProvisioningTemplate`.
    Bare,
}

impl RootShape {
    pub fn classify(root: &Element) -> Result<Self, FormatterError> {
        if root.is(PROVISIONING_NAMESPACE, PROVISIONING) {
            Ok(RootShape::Wrapper)
        } else if root.is(PROVISIONING_NAMESPACE, TEMPLATE) {
            Ok(RootShape::Bare)
        } else {
            Err(FormatterError::format(format!(
                "unexpected root element <{}>; expected {PROVISIONING} or {TEMPLATE}",
                root.name
            )))
        }
    }
}

/// A template reachable from a document, as listed by [`Reader::list_templates`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateEntry {
    /// Id of the enclosing `Templates` container; `None` for a bare template.
    pub container: Option<String>,
    pub id: String,
    /// File name for templates held by reference.
    pub file: Option<String>,
}

/// Reads provisioning documents using the given collaborators.
pub struct Reader<'a> {
    store: &'a dyn DocumentStore,
    validator: &'a dyn SchemaValidator,
    providers: &'a ProviderRegistry,
}

impl<'a> Reader<'a> {
    pub fn new(
        store: &'a dyn DocumentStore,
        validator: &'a dyn SchemaValidator,
        providers: &'a ProviderRegistry,
    ) -> Self {
        Reader {
            store,
            validator,
            providers,
        }
    }

    /// Read the template identified by `identifier` from `document`.
    ///
    /// Without an identifier (or with an empty one) the first available
    /// template is returned.
    pub fn read(&self, document: &[u8], identifier: Option<&str>) -> Result<Template, FormatterError> {
        if document.is_empty() {
            return Err(FormatterError::InvalidArgument("document is empty".into()));
        }
        let identifier = identifier.filter(|id| !id.is_empty());
        let buffer = Bytes::copy_from_slice(document);
        let doc = self.load(&buffer)?;
        let root = doc.root();

        let (source, parameters) = match RootShape::classify(root)? {
            RootShape::Wrapper => {
                let wrapper = wire::Provisioning::decode(&doc, root)?;
                let parameters = import_parameters(&wrapper.preferences)?;
                (self.resolve(wrapper, identifier)?, parameters)
            }
            RootShape::Bare => {
                let found = root.attr("ID").unwrap_or_default();
                if let Some(expected) = identifier {
                    if expected != found {
                        return Err(FormatterError::IdentifierMismatch {
                            expected: expected.to_string(),
                            found: found.to_string(),
                        });
                    }
                }
                (wire::ProvisioningTemplate::decode(&doc, root)?, StringMap::new())
            }
        };

        let mut template = self.project(&source)?;
        template.parameters = parameters;
        debug!(
            template = %template.id,
            lists = template.lists.len(),
            providers = template.providers.len(),
            "read provisioning template"
        );
        Ok(template)
    }

    /// List the templates a document offers, in document order. File
    /// references are reported but not fetched.
    pub fn list_templates(&self, document: &[u8]) -> Result<Vec<TemplateEntry>, FormatterError> {
        if document.is_empty() {
            return Err(FormatterError::InvalidArgument("document is empty".into()));
        }
        let doc = self.load(document)?;
        let root = doc.root();
        match RootShape::classify(root)? {
            RootShape::Bare => Ok(vec![TemplateEntry {
                container: None,
                id: root.attr("ID").unwrap_or_default().to_string(),
                file: None,
            }]),
            RootShape::Wrapper => {
                let wrapper = wire::Provisioning::decode(&doc, root)?;
                let mut entries = Vec::new();
                for container in wrapper.templates {
                    for reference in container.template_files {
                        entries.push(TemplateEntry {
                            container: Some(container.id.clone()),
                            id: reference.id,
                            file: Some(reference.file),
                        });
                    }
                    for template in &container.templates {
                        entries.push(TemplateEntry {
                            container: Some(container.id.clone()),
                            id: template.id.clone(),
                            file: None,
                        });
                    }
                }
                Ok(entries)
            }
        }
    }

    fn load(&self, bytes: &[u8]) -> Result<Document, FormatterError> {
        let report = self.validator.validate(bytes, PROVISIONING_NAMESPACE)?;
        if !report.is_valid() {
            debug!(
                diagnostics = report.diagnostics.len(),
                "document rejected by schema validation"
            );
            return Err(FormatterError::SchemaViolation(report.messages()));
        }
        Ok(pnp_xml::parse(bytes)?)
    }

    /// First match wins: containers are scanned in order, in-place templates
    /// before file references.
    fn resolve(
        &self,
        wrapper: wire::Provisioning,
        identifier: Option<&str>,
    ) -> Result<wire::ProvisioningTemplate, FormatterError> {
        let matches = |id: &str| identifier.map_or(true, |wanted| wanted == id);
        for mut container in wrapper.templates {
            if let Some(pos) = container.templates.iter().position(|t| matches(&t.id)) {
                let template = container.templates.swap_remove(pos);
                debug!(container = %container.id, template = %template.id, "resolved in-place template");
                return Ok(template);
            }
            if let Some(reference) = container.template_files.iter().find(|f| matches(&f.id)) {
                debug!(
                    container = %container.id,
                    template = %reference.id,
                    file = %reference.file,
                    "resolving template reference"
                );
                return self.fetch(reference);
            }
        }
        Err(FormatterError::TemplateNotFound(
            identifier.unwrap_or("(first available)").to_string(),
        ))
    }

    fn fetch(&self, reference: &wire::TemplateFile) -> Result<wire::ProvisioningTemplate, FormatterError> {
        let bytes = self.store.get_file_stream(&reference.file)?;
        let doc = self.load(&bytes)?;
        let root = doc.root();
        if RootShape::classify(root)? != RootShape::Bare {
            return Err(FormatterError::format(format!(
                "referenced file '{}' must contain a bare {TEMPLATE}, found <{}>",
                reference.file, root.name
            )));
        }
        wire::ProvisioningTemplate::decode(&doc, root)
    }

    fn project(&self, source: &wire::ProvisioningTemplate) -> Result<Template, FormatterError> {
        Ok(Template {
            id: source.id.clone(),
            version: if source.version_specified { source.version } else { 0.0 },
            site_policy: source.site_policy.clone(),
            parameters: StringMap::new(),
            property_bag_entries: source
                .property_bag_entries
                .iter()
                .flatten()
                .map(|entry| model::PropertyBagEntry {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                })
                .collect(),
            security: source
                .security
                .as_ref()
                .map(security_from_wire)
                .unwrap_or_default(),
            site_fields: fragments(source.site_fields.as_ref(), model::Field::new),
            content_types: source
                .content_types
                .iter()
                .flatten()
                .map(content_type)
                .collect::<Result<_, _>>()?,
            lists: source
                .lists
                .iter()
                .flatten()
                .map(list_instance)
                .collect::<Result<_, _>>()?,
            features: source
                .features
                .as_ref()
                .map(features_from_wire)
                .transpose()?
                .unwrap_or_default(),
            custom_actions: source
                .custom_actions
                .as_ref()
                .map(custom_actions_from_wire)
                .unwrap_or_default(),
            files: source
                .files
                .iter()
                .flatten()
                .map(file)
                .collect::<Result<_, _>>()?,
            pages: source
                .pages
                .iter()
                .flatten()
                .map(page)
                .collect::<Result<_, _>>()?,
            term_groups: groups_from_wire(source.term_groups.as_deref().unwrap_or_default())?,
            composed_look: source.composed_look.as_ref().map(composed_look),
            providers: self.providers_from_wire(source.providers.as_deref().unwrap_or_default()),
        })
    }

    /// Providers whose handler type does not resolve are dropped.
    fn providers_from_wire(&self, providers: &[wire::Provider]) -> Vec<model::Provider> {
        providers
            .iter()
            .filter(|provider| !provider.handler_type.trim().is_empty())
            .filter_map(|provider| match self.providers.resolve(&provider.handler_type) {
                Some(descriptor) => Some(model::Provider {
                    type_name: descriptor.type_name.clone(),
                    assembly: descriptor.assembly.clone(),
                    configuration: provider.configuration.clone(),
                    enabled: provider.enabled,
                }),
                None => {
                    debug!(handler = %provider.handler_type, "dropping provider with unresolved handler type");
                    None
                }
            })
            .collect()
    }
}

fn import_parameters(preferences: &wire::Preferences) -> Result<StringMap, FormatterError> {
    unique_map(
        preferences.parameters.iter().flatten().map(|parameter| {
            (
                parameter.key.clone(),
                parameter.text.clone().unwrap_or_default(),
            )
        }),
        "parameter",
    )
}

fn users(users: &Option<Vec<String>>) -> Vec<model::User> {
    users.iter().flatten().map(model::User::new).collect()
}

fn security_from_wire(security: &wire::Security) -> model::Security {
    model::Security {
        additional_administrators: users(&security.additional_administrators),
        additional_owners: users(&security.additional_owners),
        additional_members: users(&security.additional_members),
        additional_visitors: users(&security.additional_visitors),
    }
}

fn fragments<T>(content: Option<&wire::AnyContent>, make: impl Fn(String) -> T) -> Vec<T> {
    content
        .map(|content| content.fragments.iter().cloned().map(make).collect())
        .unwrap_or_default()
}

fn field_ref(field_ref: &wire::FieldRef) -> Result<model::FieldRef, FormatterError> {
    Ok(model::FieldRef {
        id: parse_guid(&field_ref.id)?,
        hidden: field_ref.hidden,
        required: field_ref.required,
    })
}

fn content_type(ct: &wire::ContentType) -> Result<model::ContentType, FormatterError> {
    use model::ContentTypeFlags as F;
    let mut flags = F::empty();
    flags.set(F::SEALED, ct.sealed);
    flags.set(F::HIDDEN, ct.hidden);
    flags.set(F::READ_ONLY, ct.read_only);
    flags.set(F::OVERWRITE, ct.overwrite);
    Ok(model::ContentType {
        id: ct.id.clone(),
        name: ct.name.clone(),
        description: ct.description.clone().unwrap_or_default(),
        group: ct.group.clone().unwrap_or_default(),
        flags,
        document_template: ct.document_template.clone(),
        field_refs: ct
            .field_refs
            .iter()
            .flatten()
            .map(field_ref)
            .collect::<Result<_, _>>()?,
    })
}

fn list_instance(list: &wire::ListInstance) -> Result<model::ListInstance, FormatterError> {
    let data_rows = list
        .data_rows
        .iter()
        .flatten()
        .map(|row| {
            let values = row
                .values
                .iter()
                .map(|value| (value.field_name.clone(), value.value.clone()));
            Ok(model::DataRow {
                values: unique_map(values, "data row field")?,
            })
        })
        .collect::<Result<_, FormatterError>>()?;

    Ok(model::ListInstance {
        title: list.title.clone(),
        description: list.description.clone().unwrap_or_default(),
        document_template: list.document_template.clone().unwrap_or_default(),
        on_quick_launch: list.on_quick_launch,
        template_type: list.template_type,
        url: list.url.clone(),
        enable_versioning: list.enable_versioning,
        minor_version_limit: if list.minor_version_limit_specified {
            list.minor_version_limit
        } else {
            0
        },
        max_version_limit: if list.max_version_limit_specified {
            list.max_version_limit
        } else {
            0
        },
        remove_existing_content_types: list.remove_existing_content_types,
        template_feature_id: parse_guid(list.template_feature_id.as_deref().unwrap_or_default())?,
        content_types_enabled: list.content_types_enabled,
        hidden: list.hidden,
        remove_existing_views: list
            .views
            .as_ref()
            .is_some_and(|views| views.remove_existing_views),
        content_type_bindings: list
            .content_type_bindings
            .iter()
            .flatten()
            .map(|binding| model::ContentTypeBinding {
                content_type_id: binding.content_type_id.clone(),
                default: binding.default,
            })
            .collect(),
        views: fragments(list.views.as_ref().map(|v| &v.content), model::View::new),
        fields: fragments(list.fields.as_ref(), model::Field::new),
        field_refs: list
            .field_refs
            .iter()
            .flatten()
            .map(field_ref)
            .collect::<Result<_, _>>()?,
        data_rows,
    })
}

fn features(features: &Option<Vec<wire::Feature>>) -> Result<Vec<model::Feature>, FormatterError> {
    features
        .iter()
        .flatten()
        .map(|feature| {
            Ok(model::Feature {
                id: parse_guid(&feature.id)?,
                deactivate: feature.deactivate,
            })
        })
        .collect()
}

fn features_from_wire(wire: &wire::Features) -> Result<model::Features, FormatterError> {
    Ok(model::Features {
        site_features: features(&wire.site_features)?,
        web_features: features(&wire.web_features)?,
    })
}

fn custom_action(action: &wire::CustomAction) -> model::CustomAction {
    model::CustomAction {
        name: action.name.clone(),
        description: action.description.clone().unwrap_or_default(),
        group: action.group.clone().unwrap_or_default(),
        location: action.location.clone(),
        title: action.title.clone(),
        sequence: if action.sequence_specified {
            action.sequence
        } else {
            DEFAULT_CUSTOM_ACTION_SEQUENCE
        },
        rights: if action.rights_specified { action.rights } else { 0 },
        url: action.url.clone().unwrap_or_default(),
        enabled: action.enabled,
        script_block: action.script_block.clone().unwrap_or_default(),
        image_url: action.image_url.clone().unwrap_or_default(),
        script_src: action.script_src.clone().unwrap_or_default(),
    }
}

fn custom_actions_from_wire(wire: &wire::CustomActions) -> model::CustomActions {
    model::CustomActions {
        site_custom_actions: wire
            .site_custom_actions
            .iter()
            .flatten()
            .map(custom_action)
            .collect(),
        web_custom_actions: wire
            .web_custom_actions
            .iter()
            .flatten()
            .map(custom_action)
            .collect(),
    }
}

fn unsigned(value: i32, what: &str) -> Result<u32, FormatterError> {
    u32::try_from(value)
        .map_err(|_| FormatterError::malformed(format!("{what} must not be negative, got {value}")))
}

fn file(file: &wire::File) -> Result<model::File, FormatterError> {
    Ok(model::File {
        src: file.src.clone(),
        folder: file.folder.clone(),
        overwrite: file.overwrite,
        web_parts: file
            .web_parts
            .iter()
            .flatten()
            .map(|wp| {
                Ok(model::WebPart {
                    title: wp.title.clone(),
                    position: WebPartPosition::Zone {
                        zone: wp.zone.clone(),
                        order: unsigned(wp.order, "web part order")?,
                    },
                    contents: wp.contents.clone(),
                })
            })
            .collect::<Result<_, FormatterError>>()?,
    })
}

fn page(page: &wire::Page) -> Result<model::Page, FormatterError> {
    Ok(model::Page {
        url: page.url.clone(),
        overwrite: page.overwrite,
        layout: layout(page.layout),
        web_parts: page
            .web_parts
            .iter()
            .flatten()
            .map(|wp| {
                Ok(model::WebPart {
                    title: wp.title.clone(),
                    position: WebPartPosition::Cell {
                        row: unsigned(wp.row, "web part row")?,
                        column: unsigned(wp.column, "web part column")?,
                    },
                    contents: wp.contents.clone(),
                })
            })
            .collect::<Result<_, FormatterError>>()?,
    })
}

fn layout(layout: wire::WikiPageLayout) -> model::WikiPageLayout {
    use model::WikiPageLayout as M;
    use wire::WikiPageLayout as W;
    match layout {
        W::OneColumn => M::OneColumn,
        W::OneColumnSidebar => M::OneColumnSidebar,
        W::TwoColumns => M::TwoColumns,
        W::TwoColumnsHeader => M::TwoColumnsHeader,
        W::TwoColumnsHeaderFooter => M::TwoColumnsHeaderFooter,
        W::ThreeColumns => M::ThreeColumns,
        W::ThreeColumnsHeader => M::ThreeColumnsHeader,
        W::ThreeColumnsHeaderFooter => M::ThreeColumnsHeaderFooter,
    }
}

fn composed_look(look: &wire::ComposedLook) -> model::ComposedLook {
    model::ComposedLook {
        name: look.name.clone(),
        color_file: look.color_file.clone().unwrap_or_default(),
        font_file: look.font_file.clone().unwrap_or_default(),
        background_file: look.background_file.clone().unwrap_or_default(),
        master_page: look.master_page.clone().unwrap_or_default(),
        site_logo: look.site_logo.clone().unwrap_or_default(),
        alternate_css: look.alternate_css.clone().unwrap_or_default(),
        version: if look.version_specified { look.version } else { 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{full_template, BRANDING_ASSEMBLY, BRANDING_HANDLER};
    use crate::store::MemoryStore;
    use crate::writer::write;
    use pnp_schema::EmbeddedSchemaValidator;

    const THREE_TEMPLATES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<pnp:Provisioning xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema">
  <pnp:Preferences>
    <pnp:Parameters>
      <pnp:Parameter Key="Region">EU</pnp:Parameter>
      <pnp:Parameter Key="Empty" />
    </pnp:Parameters>
  </pnp:Preferences>
  <pnp:Templates ID="CONTAINER-1">
    <pnp:SharePointProvisioningTemplate ID="A" Version="1" />
    <pnp:SharePointProvisioningTemplate ID="B" Version="2" />
  </pnp:Templates>
  <pnp:Templates ID="CONTAINER-2">
    <pnp:SharePointProvisioningTemplateFile File="templates/ext.xml" ID="EXT" />
    <pnp:SharePointProvisioningTemplate ID="C" Version="3" />
  </pnp:Templates>
</pnp:Provisioning>"#;

    const EXTERNAL: &str = r#"<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="EXT" Version="7">
  <pnp:PropertyBagEntries>
    <pnp:PropertyBagEntry Key="Source" Value="external" />
  </pnp:PropertyBagEntries>
</pnp:SharePointProvisioningTemplate>"#;

    struct Fixture {
        store: MemoryStore,
        providers: ProviderRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                store: MemoryStore::new().with_file("templates/ext.xml", EXTERNAL.as_bytes().to_vec()),
                providers: ProviderRegistry::new().with(BRANDING_HANDLER, BRANDING_ASSEMBLY),
            }
        }

        fn reader(&self) -> Reader<'_> {
            Reader::new(&self.store, &EmbeddedSchemaValidator, &self.providers)
        }
    }

    #[test]
    fn round_trip_full_template() {
        let fixture = Fixture::new();
        let template = full_template();
        let bytes = write(&template).expect("write");
        let back = fixture.reader().read(&bytes, None).expect("read");
        assert_eq!(back, template);
    }

    #[test]
    fn rewriting_is_idempotent() {
        let fixture = Fixture::new();
        let first = write(&full_template()).expect("write");
        let back = fixture
            .reader()
            .read(&first, Some("CONTOSO-TEAM"))
            .expect("read");
        let second = write(&back).expect("write again");
        assert_eq!(first, second);
    }

    #[test]
    fn identifier_resolution() {
        let fixture = Fixture::new();
        let reader = fixture.reader();
        let doc = THREE_TEMPLATES.as_bytes();

        let b = reader.read(doc, Some("B")).expect("read B");
        assert_eq!(b.id, "B");
        assert_eq!(b.version, 2.0);
        assert_eq!(b.parameters.get("Region").map(String::as_str), Some("EU"));
        assert_eq!(b.parameters.get("Empty").map(String::as_str), Some(""));

        assert_eq!(reader.read(doc, None).expect("first").id, "A");
        assert_eq!(reader.read(doc, Some("")).expect("empty id").id, "A");
        assert_eq!(reader.read(doc, Some("C")).expect("second container").id, "C");

        let err = reader.read(doc, Some("Z")).unwrap_err();
        assert!(matches!(err, FormatterError::TemplateNotFound(id) if id == "Z"));
    }

    #[test]
    fn external_reference_is_fetched() {
        let fixture = Fixture::new();
        let template = fixture
            .reader()
            .read(THREE_TEMPLATES.as_bytes(), Some("EXT"))
            .expect("read EXT");
        assert_eq!(template.id, "EXT");
        assert_eq!(template.version, 7.0);
        assert_eq!(template.property_bag_entries[0].value, "external");
        assert_eq!(template.parameters.len(), 2);
    }

    #[test]
    fn external_reference_failures() {
        let providers = ProviderRegistry::new();

        let store = MemoryStore::new();
        let reader = Reader::new(&store, &EmbeddedSchemaValidator, &providers);
        let err = reader.read(THREE_TEMPLATES.as_bytes(), Some("EXT")).unwrap_err();
        assert!(matches!(err, FormatterError::UnresolvedReference(_)));

        let store = MemoryStore::new().with_file("templates/ext.xml", THREE_TEMPLATES.as_bytes().to_vec());
        let reader = Reader::new(&store, &EmbeddedSchemaValidator, &providers);
        let err = reader.read(THREE_TEMPLATES.as_bytes(), Some("EXT")).unwrap_err();
        assert!(matches!(err, FormatterError::FormatViolation(_)));

        let store = MemoryStore::new().with_file("templates/ext.xml", &b"<Other />"[..]);
        let reader = Reader::new(&store, &EmbeddedSchemaValidator, &providers);
        let err = reader.read(THREE_TEMPLATES.as_bytes(), Some("EXT")).unwrap_err();
        assert!(matches!(err, FormatterError::SchemaViolation(_)));
    }

    #[test]
    fn bare_template_identifier() {
        let fixture = Fixture::new();
        let reader = fixture.reader();
        let doc = EXTERNAL.as_bytes();
        assert_eq!(reader.read(doc, None).expect("no id").id, "EXT");
        assert_eq!(reader.read(doc, Some("EXT")).expect("same id").id, "EXT");
        let err = reader.read(doc, Some("OTHER")).unwrap_err();
        assert!(matches!(
            err,
            FormatterError::IdentifierMismatch { expected, found } if expected == "OTHER" && found == "EXT"
        ));
    }

    #[test]
    fn invalid_input_is_rejected() {
        let fixture = Fixture::new();
        let reader = fixture.reader();
        assert!(matches!(
            reader.read(b"", None),
            Err(FormatterError::InvalidArgument(_))
        ));
        let err = reader
            .read(br#"<pnp:Provisioning xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" />"#, None)
            .unwrap_err();
        assert!(matches!(err, FormatterError::SchemaViolation(ref msgs) if !msgs.is_empty()));
        assert!(matches!(
            reader.read(b"<unclosed", None),
            Err(FormatterError::Schema(pnp_schema::SchemaError::Malformed(_)))
        ));
    }

    #[test]
    fn unspecified_numbers_take_defaults() {
        let doc = r#"<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="D">
  <pnp:Lists>
    <pnp:ListInstance Title="L" TemplateType="100" Url="Lists/L" MaxVersionLimit="5" />
  </pnp:Lists>
  <pnp:CustomActions>
    <pnp:WebCustomActions>
      <pnp:CustomAction Name="N" Location="L" Title="T" />
    </pnp:WebCustomActions>
  </pnp:CustomActions>
  <pnp:ComposedLook Name="Look" />
</pnp:SharePointProvisioningTemplate>"#;
        let fixture = Fixture::new();
        let template = fixture.reader().read(doc.as_bytes(), None).expect("read");
        assert_eq!(template.version, 0.0);
        let list = &template.lists[0];
        assert_eq!(list.minor_version_limit, 0);
        assert_eq!(list.max_version_limit, 5);
        assert!(list.template_feature_id.is_nil());
        assert!(!list.remove_existing_views);
        let action = &template.custom_actions.web_custom_actions[0];
        assert_eq!(action.sequence, DEFAULT_CUSTOM_ACTION_SEQUENCE);
        assert_eq!(action.rights, 0);
        assert_eq!(template.composed_look.as_ref().map(|l| l.version), Some(0));
    }

    #[test]
    fn unspecified_minor_version_limit_ignores_stray_value() {
        let wire = wire::ListInstance {
            title: "L".into(),
            url: "Lists/L".into(),
            template_type: 100,
            minor_version_limit: 42,
            minor_version_limit_specified: false,
            ..wire::ListInstance::default()
        };
        let list = list_instance(&wire).expect("project");
        assert_eq!(list.minor_version_limit, 0);
    }

    #[test]
    fn unresolved_provider_is_dropped() {
        let doc = r#"<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="P">
  <pnp:Providers>
    <pnp:Provider Enabled="true" HandlerType="Missing.Handler, Missing" />
    <pnp:Provider HandlerType="Contoso.Provisioning.BrandingHandler, Contoso.Provisioning">
      <pnp:Configuration><Color>Red</Color></pnp:Configuration>
    </pnp:Provider>
  </pnp:Providers>
</pnp:SharePointProvisioningTemplate>"#;
        let fixture = Fixture::new();
        let template = fixture.reader().read(doc.as_bytes(), None).expect("read");
        assert_eq!(template.providers.len(), 1);
        let provider = &template.providers[0];
        assert_eq!(provider.type_name, BRANDING_HANDLER);
        assert_eq!(provider.assembly, BRANDING_ASSEMBLY);
        assert!(!provider.enabled);
        assert_eq!(provider.configuration.as_deref(), Some("<Color>Red</Color>"));
    }

    #[test]
    fn malformed_guid_fails_the_read() {
        let doc = r#"<pnp:SharePointProvisioningTemplate xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="G">
  <pnp:Lists>
    <pnp:ListInstance Title="L" TemplateType="100" Url="Lists/L" TemplateFeatureID="not-a-guid" />
  </pnp:Lists>
</pnp:SharePointProvisioningTemplate>"#;
        let fixture = Fixture::new();
        let err = fixture.reader().read(doc.as_bytes(), None).unwrap_err();
        assert!(matches!(err, FormatterError::Malformed(_)));
    }

    #[test]
    fn list_templates_reports_references() {
        let fixture = Fixture::new();
        let entries = fixture
            .reader()
            .list_templates(THREE_TEMPLATES.as_bytes())
            .expect("list");
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "EXT", "C"]);
        assert_eq!(entries[2].file.as_deref(), Some("templates/ext.xml"));
        assert_eq!(entries[3].container.as_deref(), Some("CONTAINER-2"));
        assert_eq!(entries[3].file, None);
    }

    const PREFIXED_FRAGMENTS: &str = r#"<pnp:Provisioning xmlns:pnp="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" xmlns:sp="urn:contoso:fields" xmlns:cfg="urn:contoso:branding">
  <pnp:Preferences />
  <pnp:Templates ID="CONTAINER-NS">
    <pnp:SharePointProvisioningTemplate ID="NS" Version="1">
      <pnp:SiteFields>
        <sp:Field ID="{B01B3DBC-4630-4ED1-B5BA-321BC7841E3D}" sp:Name="Code" />
      </pnp:SiteFields>
      <pnp:ContentTypes>
        <pnp:ContentType ID="0x0100A33D9AD9805788419BDAAC2CCB37509F" Name="Coded">
          <pnp:FieldRefs>
            <pnp:FieldRef ID="b01b3dbc-4630-4ed1-b5ba-321bc7841e3d" Required="true" />
          </pnp:FieldRefs>
        </pnp:ContentType>
      </pnp:ContentTypes>
      <pnp:Lists>
        <pnp:ListInstance Title="Codes" TemplateType="100" Url="Lists/Codes">
          <pnp:Views RemoveExistingViews="true">
            <sp:View DisplayName="All"><sp:RowLimit>30</sp:RowLimit></sp:View>
          </pnp:Views>
          <pnp:Fields>
            <sp:Field Name="Extra" />
          </pnp:Fields>
        </pnp:ListInstance>
      </pnp:Lists>
      <pnp:Files>
        <pnp:File Src="Pages/Codes.aspx" Folder="SitePages">
          <pnp:WebParts>
            <pnp:WebPart Title="Codes" Zone="Main" Order="1">
              <pnp:Contents>&lt;wp:webPart xmlns:wp="urn:wp" /&gt;</pnp:Contents>
            </pnp:WebPart>
          </pnp:WebParts>
        </pnp:File>
      </pnp:Files>
      <pnp:Providers>
        <pnp:Provider Enabled="true" HandlerType="Contoso.Provisioning.BrandingHandler, Contoso.Provisioning">
          <pnp:Configuration><cfg:Branding><cfg:Color>Blue</cfg:Color></cfg:Branding></pnp:Configuration>
        </pnp:Provider>
      </pnp:Providers>
    </pnp:SharePointProvisioningTemplate>
  </pnp:Templates>
</pnp:Provisioning>"#;

    const DEFAULT_NAMESPACE: &str = r#"<SharePointProvisioningTemplate xmlns="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" ID="DEFAULT">
  <SiteFields>
    <Field Name="Code" />
  </SiteFields>
  <Lists>
    <ListInstance Title="Codes" TemplateType="100" Url="Lists/Codes">
      <Views><View DisplayName="All" /></Views>
    </ListInstance>
  </Lists>
  <Providers>
    <Provider HandlerType="Contoso.Provisioning.BrandingHandler, Contoso.Provisioning">
      <Configuration><Branding Color="Blue" /></Configuration>
    </Provider>
  </Providers>
</SharePointProvisioningTemplate>"#;

    /// Read, write and read again; the second read must match the first and
    /// writing twice must give the same bytes.
    fn reread(fixture: &Fixture, document: &str) -> Template {
        let reader = fixture.reader();
        let first = reader.read(document.as_bytes(), None).expect("first read");
        let written = write(&first).expect("write");
        let second = reader.read(&written, None).expect("second read");
        assert_eq!(second, first);
        assert_eq!(write(&second).expect("write again"), written);
        first
    }

    #[test]
    fn prefixed_fragments_survive_rewrite() {
        let fixture = Fixture::new();
        let template = reread(&fixture, PREFIXED_FRAGMENTS);

        assert_eq!(
            template.site_fields[0].schema_xml,
            r#"<sp:Field xmlns:sp="urn:contoso:fields" ID="{B01B3DBC-4630-4ED1-B5BA-321BC7841E3D}" sp:Name="Code" />"#
        );
        assert!(template.content_types[0].field_refs[0].required);
        let list = &template.lists[0];
        assert!(list.remove_existing_views);
        assert_eq!(
            list.views[0].schema_xml,
            r#"<sp:View xmlns:sp="urn:contoso:fields" DisplayName="All"><sp:RowLimit>30</sp:RowLimit></sp:View>"#
        );
        assert_eq!(
            list.fields[0].schema_xml,
            r#"<sp:Field xmlns:sp="urn:contoso:fields" Name="Extra" />"#
        );
        assert_eq!(
            template.files[0].web_parts[0].contents,
            r#"<wp:webPart xmlns:wp="urn:wp" />"#
        );
        assert_eq!(
            template.providers[0].configuration.as_deref(),
            Some(r#"<cfg:Branding xmlns:cfg="urn:contoso:branding"><cfg:Color>Blue</cfg:Color></cfg:Branding>"#)
        );
    }

    #[test]
    fn default_namespace_document_survives_rewrite() {
        let fixture = Fixture::new();
        let template = reread(&fixture, DEFAULT_NAMESPACE);

        assert_eq!(template.id, "DEFAULT");
        assert_eq!(
            template.site_fields[0].schema_xml,
            r#"<Field xmlns="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" Name="Code" />"#
        );
        assert_eq!(
            template.lists[0].views[0].schema_xml,
            r#"<View xmlns="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" DisplayName="All" />"#
        );
        assert_eq!(
            template.providers[0].configuration.as_deref(),
            Some(r#"<Branding xmlns="http://schemas.dev.office.com/PnP/2015/05/ProvisioningSchema" Color="Blue" />"#)
        );
    }
}
