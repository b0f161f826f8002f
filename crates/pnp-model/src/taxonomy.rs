//! Managed metadata: term groups own term sets, term sets own root terms and
//! every term owns its children.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StringMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TermGroup {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub term_sets: Vec<TermSet>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TermSet {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// LCID of the term set's default language.
    pub language: Option<i32>,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Term {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: Option<String>,
    pub is_available_for_tagging: Option<bool>,
    pub custom_sort_order: i32,
    pub terms: Vec<Term>,
    pub labels: Vec<TermLabel>,
    /// Shared custom properties.
    pub properties: StringMap,
    /// Properties local to this term set.
    pub local_properties: StringMap,
}

impl Term {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Term {
            id,
            name: name.into(),
            ..Term::default()
        }
    }

    /// Number of terms in this subtree, `self` included.
    pub fn subtree_len(&self) -> usize {
        1 + self.terms.iter().map(Term::subtree_len).sum::<usize>()
    }

    /// Depth-first search for a term by id in this subtree.
    pub fn find(&self, id: Uuid) -> Option<&Term> {
        if self.id == id {
            return Some(self);
        }
        self.terms.iter().find_map(|child| child.find(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TermLabel {
    /// LCID of the label language.
    pub language: i32,
    pub value: String,
    pub is_default_for_language: Option<bool>,
}
