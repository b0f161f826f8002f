#![cfg_attr(docsrs, feature(doc_cfg))]
//! Version-independent provisioning template model.
//!
//! The types here carry no knowledge of any wire format. Formatters project
//! them to and from a concrete schema version.

pub mod taxonomy;

use bitflags::bitflags;
use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use taxonomy::{Term, TermGroup, TermLabel, TermSet};

/// Ordered string map used for parameters, data rows and term properties.
pub type StringMap = IndexMap<String, String>;

/// Root of the model: one provisioning template.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Template {
    pub id: String,
    pub version: f64,
    pub site_policy: Option<String>,
    /// Named parameters declared by the enclosing document.
    pub parameters: StringMap,
    pub property_bag_entries: Vec<PropertyBagEntry>,
    pub security: Security,
    pub site_fields: Vec<Field>,
    pub content_types: Vec<ContentType>,
    pub lists: Vec<ListInstance>,
    pub features: Features,
    pub custom_actions: CustomActions,
    pub files: Vec<File>,
    pub pages: Vec<Page>,
    pub term_groups: Vec<TermGroup>,
    pub composed_look: Option<ComposedLook>,
    pub providers: Vec<Provider>,
}

impl Template {
    pub fn new(id: impl Into<String>) -> Self {
        Template {
            id: id.into(),
            version: 1.0,
            ..Template::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PropertyBagEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    pub name: String,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        User { name: name.into() }
    }
}

/// Additional principals added to the default site groups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Security {
    pub additional_administrators: Vec<User>,
    pub additional_owners: Vec<User>,
    pub additional_members: Vec<User>,
    pub additional_visitors: Vec<User>,
}

impl Security {
    pub fn is_empty(&self) -> bool {
        self.additional_administrators.is_empty()
            && self.additional_owners.is_empty()
            && self.additional_members.is_empty()
            && self.additional_visitors.is_empty()
    }
}

/// Field definition kept as its serialized schema fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    pub schema_xml: String,
}

impl Field {
    pub fn new(schema_xml: impl Into<String>) -> Self {
        Field {
            schema_xml: schema_xml.into(),
        }
    }
}

/// List view definition kept as its serialized schema fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct View {
    pub schema_xml: String,
}

impl View {
    pub fn new(schema_xml: impl Into<String>) -> Self {
        View {
            schema_xml: schema_xml.into(),
        }
    }
}

bitflags! {
    /// Behaviour flags of a content type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct ContentTypeFlags: u8 {
        const SEALED = 0x01;
        const HIDDEN = 0x02;
        const READ_ONLY = 0x04;
        /// Replace an existing content type with the same id.
        const OVERWRITE = 0x08;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentType {
    /// Hexadecimal content type id; each level appends to its parent's id.
    pub id: String,
    pub name: String,
    pub description: String,
    pub group: String,
    pub flags: ContentTypeFlags,
    /// Target of the document template, if any.
    pub document_template: Option<String>,
    pub field_refs: Vec<FieldRef>,
}

impl ContentType {
    /// Whether `self` derives from `parent` according to the id hierarchy.
    pub fn inherits_from(&self, parent: &str) -> bool {
        self.id.len() > parent.len()
            && self
                .id
                .get(..parent.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(parent))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldRef {
    pub id: Uuid,
    pub hidden: bool,
    pub required: bool,
}

impl FieldRef {
    pub fn new(id: Uuid) -> Self {
        FieldRef {
            id,
            ..FieldRef::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContentTypeBinding {
    pub content_type_id: String,
    pub default: bool,
}

/// One list item: field internal name to literal value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataRow {
    pub values: StringMap,
}

impl DataRow {
    pub fn new<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        DataRow {
            values: values
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ListInstance {
    pub title: String,
    pub description: String,
    pub document_template: String,
    pub on_quick_launch: bool,
    /// Base list template (for example 100 for a generic list).
    pub template_type: i32,
    pub url: String,
    pub enable_versioning: bool,
    pub minor_version_limit: i32,
    pub max_version_limit: i32,
    pub remove_existing_content_types: bool,
    /// Feature that provides the list template; nil when not set.
    pub template_feature_id: Uuid,
    pub content_types_enabled: bool,
    pub hidden: bool,
    pub remove_existing_views: bool,
    pub content_type_bindings: Vec<ContentTypeBinding>,
    pub views: Vec<View>,
    pub fields: Vec<Field>,
    pub field_refs: Vec<FieldRef>,
    pub data_rows: Vec<DataRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    pub id: Uuid,
    pub deactivate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Features {
    pub site_features: Vec<Feature>,
    pub web_features: Vec<Feature>,
}

impl Features {
    pub fn is_empty(&self) -> bool {
        self.site_features.is_empty() && self.web_features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CustomAction {
    pub name: String,
    pub description: String,
    pub group: String,
    pub location: String,
    pub title: String,
    pub sequence: i32,
    /// Base permission mask required to see the action.
    pub rights: u64,
    pub url: String,
    pub enabled: bool,
    pub script_block: String,
    pub image_url: String,
    pub script_src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CustomActions {
    pub site_custom_actions: Vec<CustomAction>,
    pub web_custom_actions: Vec<CustomAction>,
}

impl CustomActions {
    pub fn is_empty(&self) -> bool {
        self.site_custom_actions.is_empty() && self.web_custom_actions.is_empty()
    }
}

/// Where a web part sits on its page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WebPartPosition {
    /// Web part page: named zone plus order inside the zone.
    Zone { zone: String, order: u32 },
    /// Wiki page: row and column of the layout grid.
    Cell { row: u32, column: u32 },
}

impl Default for WebPartPosition {
    fn default() -> Self {
        WebPartPosition::Cell { row: 1, column: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WebPart {
    pub title: String,
    pub position: WebPartPosition,
    /// Serialized web part definition.
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct File {
    pub src: String,
    pub folder: String,
    pub overwrite: bool,
    pub web_parts: Vec<WebPart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
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

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page {
    pub url: String,
    pub overwrite: bool,
    pub layout: WikiPageLayout,
    pub web_parts: Vec<WebPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ComposedLook {
    pub name: String,
    pub color_file: String,
    pub font_file: String,
    pub background_file: String,
    pub master_page: String,
    pub site_logo: String,
    pub alternate_css: String,
    pub version: i32,
}

/// Extensibility provider invoked while a template is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Provider {
    /// Fully qualified handler type name.
    pub type_name: String,
    pub assembly: String,
    /// Serialized handler configuration, passed through untouched.
    pub configuration: Option<String>,
    pub enabled: bool,
}
