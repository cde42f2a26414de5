//! Search and filter pipeline.
//!
//! Composes the visibility predicate, a case-insensitive free-text search and
//! structured facet filters into one order-preserving derivation.

mod pagination;

pub use pagination::*;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::visibility::{self, Viewer, Visible};

/// Facet value meaning "no constraint".
pub const ALL: &str = "all";

/// Fields an entity exposes to search and faceting.
pub trait Searchable {
    /// Facet names accepted as structured filters.
    const FACETS: &'static [&'static str];

    /// Field values matched against the free-text search term.
    fn search_fields(&self) -> Vec<&str>;

    /// Value of the named facet, `None` for unknown facets or empty values.
    fn facet(&self, name: &str) -> Option<&str>;
}

/// Search term plus structured filters for one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub search_term: String,
    pub facets: BTreeMap<String, String>,
}

impl FilterState {
    pub fn new(search_term: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            facets: BTreeMap::new(),
        }
    }

    pub fn with_facet(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.facets.insert(name.into(), value.into());
        self
    }

    /// Facets that actually constrain the result.
    pub fn active_facets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.facets
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .filter(|(_, v)| !v.is_empty() && !v.eq_ignore_ascii_case(ALL))
    }

    /// Logical OR across the entity's search fields. A blank term matches everything.
    pub fn matches_search<E: Searchable>(&self, record: &E) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Logical AND across every active facet.
    pub fn matches_facets<E: Searchable>(&self, record: &E) -> bool {
        self.active_facets().all(|(name, wanted)| {
            record
                .facet(name)
                .map(|actual| actual.eq_ignore_ascii_case(wanted))
                .unwrap_or(false)
        })
    }

    pub fn matches<E: Searchable>(&self, record: &E) -> bool {
        self.matches_search(record) && self.matches_facets(record)
    }

    /// Facet names not understood by `E`.
    pub fn unknown_facets<E: Searchable>(&self) -> Vec<String> {
        self.facets
            .keys()
            .filter(|k| !E::FACETS.contains(&k.as_str()))
            .cloned()
            .collect()
    }
}

/// Visible records matching `filter`, in their original order.
pub fn apply<'a, E>(records: &'a [E], viewer: &Viewer, filter: &FilterState) -> Vec<&'a E>
where
    E: Searchable + Visible,
{
    records
        .iter()
        .filter(|r| visibility::is_visible(*r, viewer) && filter.matches(*r))
        .collect()
}
