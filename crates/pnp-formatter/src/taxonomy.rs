//! Recursive conversion of term trees between the model and the wire binding.
//!
//! Each term owns its children, so both directions are a plain depth-first
//! walk that keeps sibling order. Tri-state flags (`IsAvailableForTagging`,
//! `IsDefaultForLanguage`) lose their "unset" state on the way back in: an
//! unspecified wire flag reads as `Some(false)`. This is a limitation of the
//! 2015-05 binding.

use pnp_model::{StringMap, Term, TermGroup, TermLabel, TermSet};

use crate::wire::{self, StringDictionaryItem};
use crate::{non_blank, non_empty, parse_guid, unique_map, FormatterError};

/// Convert model terms to wire terms, preserving order at every depth.
pub fn to_wire(terms: &[Term]) -> Vec<wire::Term> {
    terms.iter().map(term_to_wire).collect()
}

/// Convert wire terms back into the model.
pub fn from_wire(terms: &[wire::Term]) -> Result<Vec<Term>, FormatterError> {
    terms.iter().map(term_from_wire).collect()
}

fn term_to_wire(term: &Term) -> wire::Term {
    wire::Term {
        id: term.id.to_string(),
        name: term.name.clone(),
        description: non_blank(&term.description),
        owner: term.owner.clone(),
        is_available_for_tagging: term.is_available_for_tagging.unwrap_or(false),
        is_available_for_tagging_specified: term.is_available_for_tagging.is_some(),
        custom_sort_order: term.custom_sort_order,
        child_terms: non_empty(to_wire(&term.terms)),
        labels: non_empty(term.labels.iter().map(label_to_wire).collect()),
        custom_properties: properties_to_wire(&term.properties),
        local_custom_properties: properties_to_wire(&term.local_properties),
    }
}

fn term_from_wire(term: &wire::Term) -> Result<Term, FormatterError> {
    let children = match &term.child_terms {
        Some(children) => from_wire(children)?,
        None => Vec::new(),
    };
    Ok(Term {
        id: parse_guid(&term.id)?,
        name: term.name.clone(),
        description: term.description.clone().unwrap_or_default(),
        owner: term.owner.clone(),
        is_available_for_tagging: Some(
            term.is_available_for_tagging_specified && term.is_available_for_tagging,
        ),
        custom_sort_order: term.custom_sort_order,
        terms: children,
        labels: term
            .labels
            .iter()
            .flatten()
            .map(label_from_wire)
            .collect(),
        properties: properties_from_wire(term.custom_properties.as_deref())?,
        local_properties: properties_from_wire(term.local_custom_properties.as_deref())?,
    })
}

fn label_to_wire(label: &TermLabel) -> wire::Label {
    wire::Label {
        language: label.language,
        value: label.value.clone(),
        is_default_for_language: label.is_default_for_language.unwrap_or(false),
        is_default_for_language_specified: label.is_default_for_language.is_some(),
    }
}

fn label_from_wire(label: &wire::Label) -> TermLabel {
    TermLabel {
        language: label.language,
        value: label.value.clone(),
        is_default_for_language: Some(
            label.is_default_for_language_specified && label.is_default_for_language,
        ),
    }
}

fn properties_to_wire(properties: &StringMap) -> Option<Vec<StringDictionaryItem>> {
    non_empty(
        properties
            .iter()
            .map(|(key, value)| StringDictionaryItem {
                key: key.clone(),
                value: value.clone(),
            })
            .collect(),
    )
}

fn properties_from_wire(
    items: Option<&[StringDictionaryItem]>,
) -> Result<StringMap, FormatterError> {
    unique_map(
        items
            .unwrap_or_default()
            .iter()
            .map(|item| (item.key.clone(), item.value.clone())),
        "term property",
    )
}

pub(crate) fn groups_to_wire(groups: &[TermGroup]) -> Vec<wire::TermGroup> {
    groups
        .iter()
        .map(|group| wire::TermGroup {
            id: group.id.to_string(),
            name: group.name.clone(),
            description: non_blank(&group.description),
            term_sets: non_empty(group.term_sets.iter().map(set_to_wire).collect()),
        })
        .collect()
}

fn set_to_wire(set: &TermSet) -> wire::TermSet {
    wire::TermSet {
        id: set.id.to_string(),
        name: set.name.clone(),
        description: non_blank(&set.description),
        language: set.language.unwrap_or_default(),
        language_specified: set.language.is_some(),
        terms: non_empty(to_wire(&set.terms)),
    }
}

pub(crate) fn groups_from_wire(groups: &[wire::TermGroup]) -> Result<Vec<TermGroup>, FormatterError> {
    groups
        .iter()
        .map(|group| {
            Ok(TermGroup {
                id: parse_guid(&group.id)?,
                name: group.name.clone(),
                description: group.description.clone().unwrap_or_default(),
                term_sets: group
                    .term_sets
                    .iter()
                    .flatten()
                    .map(set_from_wire)
                    .collect::<Result<_, _>>()?,
            })
        })
        .collect()
}

fn set_from_wire(set: &wire::TermSet) -> Result<TermSet, FormatterError> {
    Ok(TermSet {
        id: parse_guid(&set.id)?,
        name: set.name.clone(),
        description: set.description.clone().unwrap_or_default(),
        language: set.language_specified.then_some(set.language),
        terms: from_wire(set.terms.as_deref().unwrap_or_default())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn term(id: u128, name: &str, children: Vec<Term>) -> Term {
        let mut term = Term::new(Uuid::from_u128(id), name);
        term.is_available_for_tagging = Some(id % 2 == 0);
        term.custom_sort_order = id as i32;
        term.labels = vec![
            TermLabel {
                language: 1033,
                value: format!("{name} (en)"),
                is_default_for_language: Some(true),
            },
            TermLabel {
                language: 1031,
                value: format!("{name} (de)"),
                is_default_for_language: Some(false),
            },
        ];
        term.properties.insert("Code".into(), format!("C{id}"));
        term.terms = children;
        term
    }

    #[test]
    fn three_level_tree_survives() {
        let grandchild = term(3, "Grandchild", Vec::new());
        let child = term(2, "Child", vec![grandchild]);
        let sibling = term(4, "Sibling", Vec::new());
        let roots = vec![term(1, "Root", vec![child, sibling]), term(5, "Other", Vec::new())];

        let wire = to_wire(&roots);
        assert_eq!(wire.len(), 2);
        let wire_child = &wire[0].child_terms.as_ref().expect("children")[0];
        assert_eq!(wire_child.name, "Child");
        assert!(wire_child.child_terms.as_ref().expect("grandchildren")[0]
            .child_terms
            .is_none());
        assert!(wire[0].local_custom_properties.is_none());

        let back = from_wire(&wire).expect("from wire");
        assert_eq!(back, roots);
        assert_eq!(back[0].subtree_len(), 4);
        assert_eq!(back[0].terms[1].name, "Sibling");
    }

    #[test]
    fn unset_tri_states_read_back_as_false() {
        let mut term = Term::new(Uuid::from_u128(7), "Loose");
        term.labels.push(TermLabel {
            language: 1033,
            value: "Loose".into(),
            is_default_for_language: None,
        });

        let wire = to_wire(std::slice::from_ref(&term));
        assert!(!wire[0].is_available_for_tagging_specified);
        let label = &wire[0].labels.as_ref().expect("labels")[0];
        assert!(!label.is_default_for_language_specified);

        let back = from_wire(&wire).expect("from wire");
        assert_eq!(back[0].is_available_for_tagging, Some(false));
        assert_eq!(back[0].labels[0].is_default_for_language, Some(false));
    }

    #[test]
    fn duplicate_property_keys_are_malformed() {
        let item = StringDictionaryItem {
            key: "Code".into(),
            value: "1".into(),
        };
        let wire = vec![wire::Term {
            id: Uuid::from_u128(1).to_string(),
            name: "Dup".into(),
            custom_properties: Some(vec![item.clone(), item]),
            ..wire::Term::default()
        }];
        assert!(matches!(from_wire(&wire), Err(FormatterError::Malformed(_))));
    }

    #[test]
    fn invalid_term_id_is_malformed() {
        let wire = vec![wire::Term {
            id: "not-a-guid".into(),
            name: "Broken".into(),
            ..wire::Term::default()
        }];
        assert!(matches!(from_wire(&wire), Err(FormatterError::Malformed(_))));
    }

    #[test]
    fn term_set_language_keeps_absence() {
        let group = TermGroup {
            id: Uuid::from_u128(10),
            name: "Group".into(),
            description: String::new(),
            term_sets: vec![
                TermSet {
                    id: Uuid::from_u128(11),
                    name: "With".into(),
                    language: Some(1033),
                    ..TermSet::default()
                },
                TermSet {
                    id: Uuid::from_u128(12),
                    name: "Without".into(),
                    ..TermSet::default()
                },
            ],
        };
        let wire = groups_to_wire(std::slice::from_ref(&group));
        assert!(wire[0].description.is_none());
        let back = groups_from_wire(&wire).expect("groups");
        assert_eq!(back, vec![group]);
    }
}
