use pnp_xml::Element;

use super::{
    flag, list, number, optional, pnp, push_list, required, required_number, set_optional,
    StringDictionaryItem,
};
use crate::FormatterError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermGroup {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub term_sets: Option<Vec<TermSet>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermSet {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub language: i32,
    pub language_specified: bool,
    pub terms: Option<Vec<Term>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Term {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub is_available_for_tagging: bool,
    pub is_available_for_tagging_specified: bool,
    pub custom_sort_order: i32,
    pub child_terms: Option<Vec<Term>>,
    pub labels: Option<Vec<Label>>,
    pub custom_properties: Option<Vec<StringDictionaryItem>>,
    pub local_custom_properties: Option<Vec<StringDictionaryItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Label {
    pub language: i32,
    pub value: String,
    pub is_default_for_language: bool,
    pub is_default_for_language_specified: bool,
}

impl TermGroup {
    pub(crate) fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(TermGroup {
            id: required(el, "ID")?,
            name: required(el, "Name")?,
            description: optional(el, "Description"),
            term_sets: list(el, "TermSets", "TermSet", TermSet::decode)?,
        })
    }

    pub(crate) fn encode(&self) -> Element {
        let mut el = pnp("TermGroup")
            .with_attr("ID", self.id.as_str())
            .with_attr("Name", self.name.as_str());
        set_optional(&mut el, "Description", &self.description);
        push_list(&mut el, "TermSets", &self.term_sets, TermSet::encode);
        el
    }
}

impl TermSet {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        let language: Option<i32> = number(el, "Language")?;
        Ok(TermSet {
            id: required(el, "ID")?,
            name: required(el, "Name")?,
            description: optional(el, "Description"),
            language: language.unwrap_or_default(),
            language_specified: language.is_some(),
            terms: list(el, "Terms", "Term", Term::decode)?,
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("TermSet")
            .with_attr("ID", self.id.as_str())
            .with_attr("Name", self.name.as_str());
        set_optional(&mut el, "Description", &self.description);
        if self.language_specified {
            el.set_attr("Language", self.language.to_string());
        }
        push_list(&mut el, "Terms", &self.terms, Term::encode);
        el
    }
}

impl Term {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        let tagging = el.attr("IsAvailableForTagging").is_some();
        Ok(Term {
            id: required(el, "ID")?,
            name: required(el, "Name")?,
            description: optional(el, "Description"),
            owner: optional(el, "Owner"),
            is_available_for_tagging: flag(el, "IsAvailableForTagging")?,
            is_available_for_tagging_specified: tagging,
            custom_sort_order: number(el, "CustomSortOrder")?.unwrap_or_default(),
            child_terms: list(el, "Terms", "Term", Term::decode)?,
            labels: list(el, "Labels", "Label", Label::decode)?,
            custom_properties: list(
                el,
                "CustomProperties",
                "Property",
                StringDictionaryItem::decode,
            )?,
            local_custom_properties: list(
                el,
                "LocalCustomProperties",
                "Property",
                StringDictionaryItem::decode,
            )?,
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Term")
            .with_attr("ID", self.id.as_str())
            .with_attr("Name", self.name.as_str());
        set_optional(&mut el, "Description", &self.description);
        set_optional(&mut el, "Owner", &self.owner);
        if self.is_available_for_tagging_specified {
            el.set_attr(
                "IsAvailableForTagging",
                self.is_available_for_tagging.to_string(),
            );
        }
        el.set_attr("CustomSortOrder", self.custom_sort_order.to_string());
        push_list(&mut el, "Terms", &self.child_terms, Term::encode);
        push_list(&mut el, "Labels", &self.labels, Label::encode);
        push_list(&mut el, "CustomProperties", &self.custom_properties, |p| {
            p.encode("Property")
        });
        push_list(
            &mut el,
            "LocalCustomProperties",
            &self.local_custom_properties,
            |p| p.encode("Property"),
        );
        el
    }
}

impl Label {
    fn decode(el: &Element) -> Result<Self, FormatterError> {
        Ok(Label {
            language: required_number(el, "Language")?,
            value: required(el, "Value")?,
            is_default_for_language: flag(el, "IsDefaultForLanguage")?,
            is_default_for_language_specified: el.attr("IsDefaultForLanguage").is_some(),
        })
    }

    fn encode(&self) -> Element {
        let mut el = pnp("Label")
            .with_attr("Language", self.language.to_string())
            .with_attr("Value", self.value.as_str());
        if self.is_default_for_language_specified {
            el.set_attr(
                "IsDefaultForLanguage",
                self.is_default_for_language.to_string(),
            );
        }
        el
    }
}
