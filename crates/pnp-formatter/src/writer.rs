//! Model to wire projection.
//!
//! The output is always the `Provisioning` wrapper holding one container
//! (`CONTAINER-<id>`) with the template in place. Empty collections are left
//! out, and every numeric attribute that has a "specified" companion is
//! written.

use pnp_model as model;
use pnp_model::{Template, WebPartPosition};
use pnp_xml::{PROVISIONING_NAMESPACE, PROVISIONING_PREFIX};
use tracing::debug;

use crate::providers::handler_type;
use crate::taxonomy::groups_to_wire;
use crate::wire::{self, AnyContent, StringDictionaryItem};
use crate::{non_blank, non_empty, FormatterError, GENERATOR};

/// Serialize `template` into a 2015-05 wrapper document.
///
/// A version that is NaN or infinite has no `xs:double` form the reader
/// accepts back, so it is rejected with `InvalidArgument`.
pub fn write(template: &Template) -> Result<Vec<u8>, FormatterError> {
    if !template.version.is_finite() {
        return Err(FormatterError::InvalidArgument(format!(
            "template '{}' has a non-finite version ({})",
            template.id, template.version
        )));
    }
    let wire = to_wire(template);
    let bytes = pnp_xml::write_document(&wire.encode(), PROVISIONING_PREFIX, PROVISIONING_NAMESPACE)?;
    debug!(template = %template.id, bytes = bytes.len(), "wrote provisioning document");
    Ok(bytes)
}

/// Project `template` onto the wire binding without serializing it.
pub fn to_wire(template: &Template) -> wire::Provisioning {
    let parameters = template
        .parameters
        .iter()
        .map(|(key, value)| wire::Parameter {
            key: key.clone(),
            required: false,
            text: Some(value.clone()),
        })
        .collect();

    wire::Provisioning {
        preferences: wire::Preferences {
            version: None,
            author: None,
            generator: Some(GENERATOR.to_string()),
            parameters: non_empty(parameters),
        },
        templates: vec![wire::Templates {
            id: format!("CONTAINER-{}", template.id),
            template_files: Vec::new(),
            templates: vec![template_to_wire(template)],
        }],
    }
}

fn template_to_wire(template: &Template) -> wire::ProvisioningTemplate {
    wire::ProvisioningTemplate {
        id: template.id.clone(),
        version: template.version,
        version_specified: true,
        site_policy: template.site_policy.clone(),
        property_bag_entries: non_empty(
            template
                .property_bag_entries
                .iter()
                .map(|entry| StringDictionaryItem {
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                })
                .collect(),
        ),
        security: security_to_wire(&template.security),
        site_fields: fragments(template.site_fields.iter().map(|f| &f.schema_xml)),
        content_types: non_empty(template.content_types.iter().map(content_type).collect()),
        lists: non_empty(template.lists.iter().map(list_instance).collect()),
        features: features_to_wire(&template.features),
        custom_actions: custom_actions_to_wire(&template.custom_actions),
        files: non_empty(template.files.iter().map(file).collect()),
        pages: non_empty(template.pages.iter().map(page).collect()),
        term_groups: non_empty(groups_to_wire(&template.term_groups)),
        composed_look: template.composed_look.as_ref().map(composed_look),
        providers: non_empty(template.providers.iter().map(provider).collect()),
    }
}

fn users(users: &[model::User]) -> Option<Vec<String>> {
    non_empty(users.iter().map(|user| user.name.clone()).collect())
}

fn security_to_wire(security: &model::Security) -> Option<wire::Security> {
    if security.is_empty() {
        return None;
    }
    Some(wire::Security {
        additional_administrators: users(&security.additional_administrators),
        additional_owners: users(&security.additional_owners),
        additional_members: users(&security.additional_members),
        additional_visitors: users(&security.additional_visitors),
    })
}

fn fragments<'a>(schema_xml: impl Iterator<Item = &'a String>) -> Option<AnyContent> {
    non_empty(schema_xml.cloned().collect()).map(|fragments| AnyContent { fragments })
}

fn field_ref(field_ref: &model::FieldRef) -> wire::FieldRef {
    wire::FieldRef {
        id: field_ref.id.to_string(),
        name: None,
        required: field_ref.required,
        hidden: field_ref.hidden,
    }
}

fn content_type(ct: &model::ContentType) -> wire::ContentType {
    use model::ContentTypeFlags as F;
    wire::ContentType {
        id: ct.id.clone(),
        name: ct.name.clone(),
        description: non_blank(&ct.description),
        group: non_blank(&ct.group),
        hidden: ct.flags.contains(F::HIDDEN),
        sealed: ct.flags.contains(F::SEALED),
        read_only: ct.flags.contains(F::READ_ONLY),
        overwrite: ct.flags.contains(F::OVERWRITE),
        field_refs: non_empty(ct.field_refs.iter().map(field_ref).collect()),
        document_template: ct.document_template.clone(),
    }
}

fn list_instance(list: &model::ListInstance) -> wire::ListInstance {
    let views = (!list.views.is_empty() || list.remove_existing_views).then(|| wire::Views {
        remove_existing_views: list.remove_existing_views,
        content: AnyContent {
            fragments: list.views.iter().map(|v| v.schema_xml.clone()).collect(),
        },
    });
    wire::ListInstance {
        title: list.title.clone(),
        description: non_blank(&list.description),
        document_template: non_blank(&list.document_template),
        on_quick_launch: list.on_quick_launch,
        template_type: list.template_type,
        url: list.url.clone(),
        enable_versioning: list.enable_versioning,
        minor_version_limit: list.minor_version_limit,
        minor_version_limit_specified: true,
        max_version_limit: list.max_version_limit,
        max_version_limit_specified: true,
        remove_existing_content_types: list.remove_existing_content_types,
        template_feature_id: (!list.template_feature_id.is_nil())
            .then(|| list.template_feature_id.to_string()),
        content_types_enabled: list.content_types_enabled,
        hidden: list.hidden,
        content_type_bindings: non_empty(
            list.content_type_bindings
                .iter()
                .map(|binding| wire::ContentTypeBinding {
                    content_type_id: binding.content_type_id.clone(),
                    default: binding.default,
                })
                .collect(),
        ),
        views,
        fields: fragments(list.fields.iter().map(|f| &f.schema_xml)),
        field_refs: non_empty(list.field_refs.iter().map(field_ref).collect()),
        data_rows: non_empty(
            list.data_rows
                .iter()
                .map(|row| wire::DataRow {
                    values: row
                        .values
                        .iter()
                        .map(|(field, value)| wire::DataValue {
                            field_name: field.clone(),
                            value: value.clone(),
                        })
                        .collect(),
                })
                .collect(),
        ),
    }
}

fn features(features: &[model::Feature]) -> Option<Vec<wire::Feature>> {
    non_empty(
        features
            .iter()
            .map(|feature| wire::Feature {
                id: feature.id.to_string(),
                deactivate: feature.deactivate,
            })
            .collect(),
    )
}

fn features_to_wire(model: &model::Features) -> Option<wire::Features> {
    (!model.is_empty()).then(|| wire::Features {
        site_features: features(&model.site_features),
        web_features: features(&model.web_features),
    })
}

fn custom_action(action: &model::CustomAction) -> wire::CustomAction {
    wire::CustomAction {
        name: action.name.clone(),
        description: non_blank(&action.description),
        group: non_blank(&action.group),
        location: action.location.clone(),
        title: action.title.clone(),
        sequence: action.sequence,
        sequence_specified: true,
        rights: action.rights,
        rights_specified: true,
        url: non_blank(&action.url),
        enabled: action.enabled,
        script_block: non_blank(&action.script_block),
        image_url: non_blank(&action.image_url),
        script_src: non_blank(&action.script_src),
    }
}

fn custom_actions_to_wire(model: &model::CustomActions) -> Option<wire::CustomActions> {
    (!model.is_empty()).then(|| wire::CustomActions {
        site_custom_actions: non_empty(model.site_custom_actions.iter().map(custom_action).collect()),
        web_custom_actions: non_empty(model.web_custom_actions.iter().map(custom_action).collect()),
    })
}

fn file(file: &model::File) -> wire::File {
    wire::File {
        src: file.src.clone(),
        folder: file.folder.clone(),
        overwrite: file.overwrite,
        web_parts: non_empty(
            file.web_parts
                .iter()
                .map(|wp| {
                    let (zone, order) = match &wp.position {
                        WebPartPosition::Zone { zone, order } => (zone.clone(), *order),
                        WebPartPosition::Cell { .. } => {
                            debug!(web_part = %wp.title, "cell position on a web part page; writing empty zone");
                            (String::new(), 0)
                        }
                    };
                    wire::WebPartPageWebPart {
                        title: wp.title.clone(),
                        zone,
                        order: saturating_i32(order),
                        contents: wp.contents.clone(),
                    }
                })
                .collect(),
        ),
    }
}

fn page(page: &model::Page) -> wire::Page {
    wire::Page {
        url: page.url.clone(),
        overwrite: page.overwrite,
        layout: layout(page.layout),
        web_parts: non_empty(
            page.web_parts
                .iter()
                .map(|wp| {
                    let (row, column) = match &wp.position {
                        WebPartPosition::Cell { row, column } => (*row, *column),
                        WebPartPosition::Zone { .. } => {
                            debug!(web_part = %wp.title, "zone position on a wiki page; writing first cell");
                            (1, 1)
                        }
                    };
                    wire::WikiPageWebPart {
                        title: wp.title.clone(),
                        row: saturating_i32(row),
                        column: saturating_i32(column),
                        contents: wp.contents.clone(),
                    }
                })
                .collect(),
        ),
    }
}

fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub(crate) fn layout(layout: model::WikiPageLayout) -> wire::WikiPageLayout {
    use model::WikiPageLayout as M;
    use wire::WikiPageLayout as W;
    match layout {
        M::OneColumn => W::OneColumn,
        M::OneColumnSidebar => W::OneColumnSidebar,
        M::TwoColumns => W::TwoColumns,
        M::TwoColumnsHeader => W::TwoColumnsHeader,
        M::TwoColumnsHeaderFooter => W::TwoColumnsHeaderFooter,
        M::ThreeColumns => W::ThreeColumns,
        M::ThreeColumnsHeader => W::ThreeColumnsHeader,
        M::ThreeColumnsHeaderFooter => W::ThreeColumnsHeaderFooter,
    }
}

fn composed_look(look: &model::ComposedLook) -> wire::ComposedLook {
    wire::ComposedLook {
        name: look.name.clone(),
        color_file: non_blank(&look.color_file),
        font_file: non_blank(&look.font_file),
        background_file: non_blank(&look.background_file),
        master_page: non_blank(&look.master_page),
        site_logo: non_blank(&look.site_logo),
        alternate_css: non_blank(&look.alternate_css),
        version: look.version,
        version_specified: true,
    }
}

fn provider(provider: &model::Provider) -> wire::Provider {
    wire::Provider {
        enabled: provider.enabled,
        handler_type: handler_type(&provider.type_name, &provider.assembly),
        configuration: provider.configuration.clone(),
    }
}
