//! Browse state: the current filter criteria and sort key.
//!
//! State is a plain value. Every change goes through a method here and
//! the visible list is recomputed in full by [`BrowseState::view`].

use serde::{Deserialize, Serialize};

use crate::filter::filter;
use crate::models::{Category, ClassifiedRecord, FilterCriteria, SortKey};
use crate::rank::rank;
use crate::rules::RuleSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowseState {
    pub criteria: FilterCriteria,
    pub sort: SortKey,
}

impl BrowseState {
    pub fn for_category(category: Category) -> Self {
        Self {
            criteria: FilterCriteria::for_category(category),
            sort: SortKey::Default,
        }
    }

    /// Filtered and ranked view of `records`.
    pub fn view<'a>(&self, records: &'a [ClassifiedRecord], rules: &RuleSet) -> Vec<&'a ClassifiedRecord> {
        rank(filter(records, &self.criteria, rules), self.sort, rules)
    }

    /// Change the brand. The series depends on the brand and is reset.
    pub fn set_brand(&mut self, brand: Option<String>) {
        self.criteria.brand = brand;
        self.criteria.series = None;
    }

    /// Drop every predicate except the category; keep the sort key.
    ///
    /// Applied when the bundled snapshot replaces the remote catalog.
    pub fn reset_for_fallback(&mut self) {
        self.criteria = FilterCriteria {
            category: self.criteria.category,
            ..Default::default()
        };
    }

    /// Drop every predicate except the category and restore the default sort.
    pub fn clear(&mut self) {
        self.reset_for_fallback();
        self.sort = SortKey::Default;
    }
}
