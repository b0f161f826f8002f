use std::fmt;
use std::str::FromStr;

use pnp_xml::{Document, Element};

use super::{
    child, children, flag, list, number, optional, pnp, push_list, required, required_number,
    set_flag, set_optional,
};
use crate::FormatterError;

/// Key/value pair used by property bags and term properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringDictionaryItem {
    pub key: String,
    pub value: String,
}

impl StringDictionaryItem {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(StringDictionaryItem {
            key: required(el, "Key")?,
            value: required(el, "Value")?,
        })
    }

    pub(crate) fn encode(&self, name: &str) -> Element {
        pnp(name)
            .with_attr("Key", self.key.as_str())
            .with_attr("Value", self.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Security {
    pub additional_administrators: Option<Vec<String>>,
    pub additional_owners: Option<Vec<String>>,
    pub additional_members: Option<Vec<String>>,
    pub additional_visitors: Option<Vec<String>>,
}

const USER_LISTS: [&str; 4] = [
    "AdditionalAdministrators",
    "AdditionalOwners",
    "AdditionalMembers",
    "AdditionalVisitors",
];

impl Security {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        let users = |name: &str| list(el, name, "User", |user| required(user, "Name"));
        Ok(Security {
            additional_administrators: users(USER_LISTS[0])?,
            additional_owners: users(USER_LISTS[1])?,
            additional_members: users(USER_LISTS[2])?,
            additional_visitors: users(USER_LISTS[3])?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("Security");
        let lists = [
            &self.additional_administrators,
            &self.additional_owners,
            &self.additional_members,
            &self.additional_visitors,
        ];
        for (name, users) in USER_LISTS.iter().zip(lists) {
            push_list(&mut el, name, users, |user| {
                pnp("User").with_attr("Name", user.as_str())
            });
        }
        el
    }
}

/// Wildcard content: each child element kept as its serialized markup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnyContent {
    pub fragments: Vec<String>,
}

impl AnyContent {
    pub(crate) fn decode(doc: &Document, el: &Element) -> Self {
        AnyContent {
            fragments: el
                .elements()
                .map(|fragment| doc.outer_xml(fragment).into_owned())
                .collect(),
        }
    }

    pub(crate) fn encode(&self, name: &str) -> Element {
        let mut el = pnp(name);
        self.push_into(&mut el);
        el
    }

    fn push_into(&self, el: &mut Element) {
        for fragment in &self.fragments {
            el.push_raw(fragment.as_str());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentType {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub hidden: bool,
    pub sealed: bool,
    pub read_only: bool,
    pub overwrite: bool,
    pub field_refs: Option<Vec<FieldRef>>,
    /// `DocumentTemplate/@TargetName`.
    pub document_template: Option<String>,
}

impl ContentType {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(ContentType {
            id: required(el, "ID")?,
            name: required(el, "Name")?,
            description: optional(el, "Description"),
            group: optional(el, "Group"),
            hidden: flag(el, "Hidden")?,
            sealed: flag(el, "Sealed")?,
            read_only: flag(el, "ReadOnly")?,
            overwrite: flag(el, "Overwrite")?,
            field_refs: list(el, "FieldRefs", "FieldRef", FieldRef::decode)?,
            document_template: child(el, "DocumentTemplate")
                .map(|template| required(template, "TargetName"))
                .transpose()?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("ContentType")
            .with_attr("ID", self.id.as_str())
            .with_attr("Name", self.name.as_str());
        set_optional(&mut el, "Description", &self.description);
        set_optional(&mut el, "Group", &self.group);
        set_flag(&mut el, "Hidden", self.hidden);
        set_flag(&mut el, "Sealed", self.sealed);
        set_flag(&mut el, "ReadOnly", self.read_only);
        set_flag(&mut el, "Overwrite", self.overwrite);
        push_list(&mut el, "FieldRefs", &self.field_refs, FieldRef::encode);
        if let Some(target) = &self.document_template {
            el.push(pnp("DocumentTemplate").with_attr("TargetName", target.as_str()));
        }
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldRef {
    pub id: String,
    pub name: Option<String>,
    pub required: bool,
    pub hidden: bool,
}

impl FieldRef {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(FieldRef {
            id: required(el, "ID")?,
            name: optional(el, "Name"),
            required: flag(el, "Required")?,
            hidden: flag(el, "Hidden")?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("FieldRef").with_attr("ID", self.id.as_str());
        set_optional(&mut el, "Name", &self.name);
        set_flag(&mut el, "Required", self.required);
        set_flag(&mut el, "Hidden", self.hidden);
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListInstance {
    pub title: String,
    pub description: Option<String>,
    pub document_template: Option<String>,
    pub on_quick_launch: bool,
    pub template_type: i32,
    pub url: String,
    pub enable_versioning: bool,
    pub minor_version_limit: i32,
    pub minor_version_limit_specified: bool,
    pub max_version_limit: i32,
    pub max_version_limit_specified: bool,
    pub remove_existing_content_types: bool,
    pub template_feature_id: Option<String>,
    pub content_types_enabled: bool,
    pub hidden: bool,
    pub content_type_bindings: Option<Vec<ContentTypeBinding>>,
    pub views: Option<Views>,
    pub fields: Option<AnyContent>,
    pub field_refs: Option<Vec<FieldRef>>,
    pub data_rows: Option<Vec<DataRow>>,
}

impl ListInstance {
    pub(crate) fn decode(doc: &Document, el: &Element) -> Result<Self, FormatterError> {
        let minor: Option<i32> = number(el, "MinorVersionLimit")?;
        let max: Option<i32> = number(el, "MaxVersionLimit")?;
        Ok(ListInstance {
            title: required(el, "Title")?,
            description: optional(el, "Description"),
            document_template: optional(el, "DocumentTemplate"),
            on_quick_launch: flag(el, "OnQuickLaunch")?,
            template_type: required_number(el, "TemplateType")?,
            url: required(el, "Url")?,
            enable_versioning: flag(el, "EnableVersioning")?,
            minor_version_limit: minor.unwrap_or_default(),
            minor_version_limit_specified: minor.is_some(),
            max_version_limit: max.unwrap_or_default(),
            max_version_limit_specified: max.is_some(),
            remove_existing_content_types: flag(el, "RemoveExistingContentTypes")?,
            template_feature_id: optional(el, "TemplateFeatureID"),
            content_types_enabled: flag(el, "ContentTypesEnabled")?,
            hidden: flag(el, "Hidden")?,
            content_type_bindings: list(
                el,
                "ContentTypeBindings",
                "ContentTypeBinding",
                ContentTypeBinding::decode,
            )?,
            views: child(el, "Views")
                .map(|views| Views::decode(doc, views))
                .transpose()?,
            fields: child(el, "Fields").map(|fields| AnyContent::decode(doc, fields)),
            field_refs: list(el, "FieldRefs", "FieldRef", FieldRef::decode)?,
            data_rows: list(el, "DataRows", "DataRow", DataRow::decode)?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("ListInstance").with_attr("Title", self.title.as_str());
        set_optional(&mut el, "Description", &self.description);
        set_optional(&mut el, "DocumentTemplate", &self.document_template);
        set_flag(&mut el, "OnQuickLaunch", self.on_quick_launch);
        el.set_attr("TemplateType", self.template_type.to_string());
        el.set_attr("Url", self.url.as_str());
        set_flag(&mut el, "EnableVersioning", self.enable_versioning);
        if self.minor_version_limit_specified {
            el.set_attr("MinorVersionLimit", self.minor_version_limit.to_string());
        }
        if self.max_version_limit_specified {
            el.set_attr("MaxVersionLimit", self.max_version_limit.to_string());
        }
        set_flag(
            &mut el,
            "RemoveExistingContentTypes",
            self.remove_existing_content_types,
        );
        set_optional(&mut el, "TemplateFeatureID", &self.template_feature_id);
        set_flag(&mut el, "ContentTypesEnabled", self.content_types_enabled);
        set_flag(&mut el, "Hidden", self.hidden);
        push_list(
            &mut el,
            "ContentTypeBindings",
            &self.content_type_bindings,
            ContentTypeBinding::encode,
        );
        if let Some(views) = &self.views {
            el.push(views.encode());
        }
        if let Some(fields) = &self.fields {
            el.push(fields.encode("Fields"));
        }
        push_list(&mut el, "FieldRefs", &self.field_refs, FieldRef::encode);
        push_list(&mut el, "DataRows", &self.data_rows, DataRow::encode);
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentTypeBinding {
    pub content_type_id: String,
    pub default: bool,
}

impl ContentTypeBinding {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(ContentTypeBinding {
            content_type_id: required(el, "ContentTypeID")?,
            default: flag(el, "Default")?,
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("ContentTypeBinding")
            .with_attr("ContentTypeID", self.content_type_id.as_str());
        set_flag(&mut el, "Default", self.default);
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Views {
    pub remove_existing_views: bool,
    pub content: AnyContent,
}

impl Views {
    fn decode(doc: &Document, el: &Element) -> Result<Self, FormatterError> {
        Ok(Views {
            remove_existing_views: flag(el, "RemoveExistingViews")?,
            content: AnyContent::decode(doc, el),
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Views");
        set_flag(&mut el, "RemoveExistingViews", self.remove_existing_views);
        self.content.push_into(&mut el);
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataRow {
    pub values: Vec<DataValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataValue {
    pub field_name: String,
    pub value: String,
}

impl DataRow {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        let values = children(el, "DataValue")
            .map(|value| {
                Ok(DataValue {
                    field_name: required(value, "FieldName")?,
                    value: value.text(),
                })
            })
            .collect::<Result<_, FormatterError>>()?;
        Ok(DataRow { values })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("DataRow");
        for value in &self.values {
            let mut data = pnp("DataValue").with_attr("FieldName", value.field_name.as_str());
            if !value.value.is_empty() {
                data.push_text(value.value.as_str());
            }
            el.push(data);
        }
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Features {
    pub site_features: Option<Vec<Feature>>,
    pub web_features: Option<Vec<Feature>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Feature {
    pub id: String,
    pub deactivate: bool,
}

impl Features {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(Features {
            site_features: list(el, "SiteFeatures", "Feature", Feature::decode)?,
            web_features: list(el, "WebFeatures", "Feature", Feature::decode)?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("Features");
        push_list(&mut el, "SiteFeatures", &self.site_features, Feature::encode);
        push_list(&mut el, "WebFeatures", &self.web_features, Feature::encode);
        el
    }
}

impl Feature {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(Feature {
            id: required(el, "ID")?,
            deactivate: flag(el, "Deactivate")?,
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Feature").with_attr("ID", self.id.as_str());
        set_flag(&mut el, "Deactivate", self.deactivate);
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomActions {
    pub site_custom_actions: Option<Vec<CustomAction>>,
    pub web_custom_actions: Option<Vec<CustomAction>>,
}

impl CustomActions {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(CustomActions {
            site_custom_actions: list(el, "SiteCustomActions", "CustomAction", CustomAction::decode)?,
            web_custom_actions: list(el, "WebCustomActions", "CustomAction", CustomAction::decode)?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("CustomActions");
        push_list(
            &mut el,
            "SiteCustomActions",
            &self.site_custom_actions,
            CustomAction::encode,
        );
        push_list(
            &mut el,
            "WebCustomActions",
            &self.web_custom_actions,
            CustomAction::encode,
        );
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomAction {
    pub name: String,
    pub description: Option<String>,
    pub group: Option<String>,
    pub location: String,
    pub title: String,
    pub sequence: i32,
    pub sequence_specified: bool,
    pub rights: u64,
    pub rights_specified: bool,
    pub url: Option<String>,
    pub enabled: bool,
    pub script_block: Option<String>,
    pub image_url: Option<String>,
    pub script_src: Option<String>,
}

impl CustomAction {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        let sequence: Option<i32> = number(el, "Sequence")?;
        let rights: Option<u64> = number(el, "Rights")?;
        Ok(CustomAction {
            name: required(el, "Name")?,
            description: optional(el, "Description"),
            group: optional(el, "Group"),
            location: required(el, "Location")?,
            title: required(el, "Title")?,
            sequence: sequence.unwrap_or_default(),
            sequence_specified: sequence.is_some(),
            rights: rights.unwrap_or_default(),
            rights_specified: rights.is_some(),
            url: optional(el, "Url"),
            enabled: flag(el, "Enabled")?,
            script_block: optional(el, "ScriptBlock"),
            image_url: optional(el, "ImageUrl"),
            script_src: optional(el, "ScriptSrc"),
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("CustomAction").with_attr("Name", self.name.as_str());
        set_optional(&mut el, "Description", &self.description);
        set_optional(&mut el, "Group", &self.group);
        el.set_attr("Location", self.location.as_str());
        el.set_attr("Title", self.title.as_str());
        if self.sequence_specified {
            el.set_attr("Sequence", self.sequence.to_string());
        }
        if self.rights_specified {
            el.set_attr("Rights", self.rights.to_string());
        }
        set_optional(&mut el, "Url", &self.url);
        set_flag(&mut el, "Enabled", self.enabled);
        set_optional(&mut el, "ScriptBlock", &self.script_block);
        set_optional(&mut el, "ImageUrl", &self.image_url);
        set_optional(&mut el, "ScriptSrc", &self.script_src);
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct File {
    pub src: String,
    pub folder: String,
    pub overwrite: bool,
    pub web_parts: Option<Vec<WebPartPageWebPart>>,
}

/// Web part on a classic web part page, placed by zone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WebPartPageWebPart {
    pub title: String,
    pub zone: String,
    pub order: i32,
    pub contents: String,
}

impl File {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(File {
            src: required(el, "Src")?,
            folder: required(el, "Folder")?,
            overwrite: flag(el, "Overwrite")?,
            web_parts: list(el, "WebParts", "WebPart", |wp| {
                Ok(WebPartPageWebPart {
                    title: required(wp, "Title")?,
                    zone: required(wp, "Zone")?,
                    order: required_number(wp, "Order")?,
                    contents: contents(wp),
                })
            })?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("File")
            .with_attr("Src", self.src.as_str())
            .with_attr("Folder", self.folder.as_str());
        set_flag(&mut el, "Overwrite", self.overwrite);
        push_list(&mut el, "WebParts", &self.web_parts, |wp| {
            let mut part = pnp("WebPart")
                .with_attr("Title", wp.title.as_str())
                .with_attr("Zone", wp.zone.as_str())
                .with_attr("Order", wp.order.to_string());
            part.push(encode_contents(&wp.contents));
            part
        });
        el
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WikiPageLayout {
    #[default]
    OneColumn,
    OneColumnSidebar,
    TwoColumns,
    TwoColumnsHeader,
    TwoColumnsHeaderFooter,
    ThreeColumns,
    ThreeColumnsHeader,
    ThreeColumnsHeaderFooter,
}

impl WikiPageLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            WikiPageLayout::OneColumn => "OneColumn",
            WikiPageLayout::OneColumnSidebar => "OneColumnSidebar",
            WikiPageLayout::TwoColumns => "TwoColumns",
            WikiPageLayout::TwoColumnsHeader => "TwoColumnsHeader",
            WikiPageLayout::TwoColumnsHeaderFooter => "TwoColumnsHeaderFooter",
            WikiPageLayout::ThreeColumns => "ThreeColumns",
            WikiPageLayout::ThreeColumnsHeader => "ThreeColumnsHeader",
            WikiPageLayout::ThreeColumnsHeaderFooter => "ThreeColumnsHeaderFooter",
        }
    }
}

impl fmt::Display for WikiPageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WikiPageLayout {
    type Err = FormatterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "OneColumn" => WikiPageLayout::OneColumn,
            "OneColumnSidebar" => WikiPageLayout::OneColumnSidebar,
            "TwoColumns" => WikiPageLayout::TwoColumns,
            "TwoColumnsHeader" => WikiPageLayout::TwoColumnsHeader,
            "TwoColumnsHeaderFooter" => WikiPageLayout::TwoColumnsHeaderFooter,
            "ThreeColumns" => WikiPageLayout::ThreeColumns,
            "ThreeColumnsHeader" => WikiPageLayout::ThreeColumnsHeader,
            "ThreeColumnsHeaderFooter" => WikiPageLayout::ThreeColumnsHeaderFooter,
            other => {
                return Err(FormatterError::malformed(format!(
                    "unknown wiki page layout '{other}'"
                )))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub url: String,
    pub overwrite: bool,
    pub layout: WikiPageLayout,
    pub web_parts: Option<Vec<WikiPageWebPart>>,
}

/// Web part on a wiki page, placed by row and column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WikiPageWebPart {
    pub title: String,
    pub row: i32,
    pub column: i32,
    pub contents: String,
}

impl Page {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(Page {
            url: required(el, "Url")?,
            overwrite: flag(el, "Overwrite")?,
            layout: required(el, "Layout")?.parse()?,
            web_parts: list(el, "WebParts", "WebPart", |wp| {
                Ok(WikiPageWebPart {
                    title: required(wp, "Title")?,
                    row: required_number(wp, "Row")?,
                    column: required_number(wp, "Column")?,
                    contents: contents(wp),
                })
            })?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("Page").with_attr("Url", self.url.as_str());
        set_flag(&mut el, "Overwrite", self.overwrite);
        el.set_attr("Layout", self.layout.as_str());
        push_list(&mut el, "WebParts", &self.web_parts, |wp| {
            let mut part = pnp("WebPart")
                .with_attr("Title", wp.title.as_str())
                .with_attr("Row", wp.row.to_string())
                .with_attr("Column", wp.column.to_string());
            part.push(encode_contents(&wp.contents));
            part
        });
        el
    }
}

fn contents(web_part: &Element) -> String {
    child(web_part, "Contents")
        .map(Element::text)
        .unwrap_or_default()
}

fn encode_contents(contents: &str) -> Element {
    let mut el = pnp("Contents");
    if !contents.is_empty() {
        el.push_text(contents);
    }
    el
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposedLook {
    pub name: String,
    pub color_file: Option<String>,
    pub font_file: Option<String>,
    pub background_file: Option<String>,
    pub master_page: Option<String>,
    pub site_logo: Option<String>,
    pub alternate_css: Option<String>,
    pub version: i32,
    pub version_specified: bool,
}

impl ComposedLook {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        let version: Option<i32> = number(el, "Version")?;
        Ok(ComposedLook {
            name: required(el, "Name")?,
            color_file: optional(el, "ColorFile"),
            font_file: optional(el, "FontFile"),
            background_file: optional(el, "BackgroundFile"),
            master_page: optional(el, "MasterPage"),
            site_logo: optional(el, "SiteLogo"),
            alternate_css: optional(el, "AlternateCSS"),
            version: version.unwrap_or_default(),
            version_specified: version.is_some(),
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("ComposedLook").with_attr("Name", self.name.as_str());
        set_optional(&mut el, "ColorFile", &self.color_file);
        set_optional(&mut el, "FontFile", &self.font_file);
        set_optional(&mut el, "BackgroundFile", &self.background_file);
        set_optional(&mut el, "MasterPage", &self.master_page);
        set_optional(&mut el, "SiteLogo", &self.site_logo);
        set_optional(&mut el, "AlternateCSS", &self.alternate_css);
        if self.version_specified {
            el.set_attr("Version", self.version.to_string());
        }
        el
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Provider {
    pub enabled: bool,
    pub handler_type: String,
    /// Inner markup of `Configuration`, verbatim.
    pub configuration: Option<String>,
}

impl Provider {
    pub(crate) fn decode(doc: &Document, el: &Element) -> Result<Self, FormatterError> {
        Ok(Provider {
            enabled: flag(el, "Enabled")?,
            handler_type: required(el, "HandlerType")?,
            configuration: child(el, "Configuration")
                .map(|config| doc.inner_xml(config).into_owned()),
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("Provider");
        set_flag(&mut el, "Enabled", self.enabled);
        el.set_attr("HandlerType", self.handler_type.as_str());
        if let Some(config) = &self.configuration {
            let mut wrapper = pnp("Configuration");
            if !config.is_empty() {
                wrapper.push_raw(config.as_str());
            }
            el.push(wrapper);
        }
        el
    }
}
