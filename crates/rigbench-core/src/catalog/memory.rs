//! In-memory [`CatalogSource`] backed by a fixed record list.
//!
//! Used for the bundled snapshot and in tests. Queries are answered with
//! the filter engine, so a static catalog narrows results the same way
//! the directory service does.

use anyhow::Result;
use async_trait::async_trait;

use crate::classify::classify_all;
use crate::filter::filter;
use crate::models::{FilterCriteria, HardwareRecord};
use crate::rules::RuleSet;

use super::{CatalogQuery, CatalogSource};

pub struct StaticCatalog {
    name: String,
    records: Vec<HardwareRecord>,
    rules: RuleSet,
}

impl StaticCatalog {
    pub fn new(name: impl Into<String>, records: Vec<HardwareRecord>) -> Self {
        Self::with_rules(name, records, RuleSet::default())
    }

    pub fn with_rules(name: impl Into<String>, records: Vec<HardwareRecord>, rules: RuleSet) -> Self {
        Self {
            name: name.into(),
            records,
            rules,
        }
    }

    pub fn records(&self) -> &[HardwareRecord] {
        &self.records
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<HardwareRecord>> {
        let criteria = FilterCriteria {
            category: query.category,
            brand: query.brand.clone(),
            series: query.series.clone(),
            free_text: query.search_text.clone(),
            capacity_bucket: None,
        };
        if criteria.is_empty() {
            return Ok(self.records.clone());
        }
        let classified = classify_all(&self.records, &self.rules);
        Ok(filter(&classified, &criteria, &self.rules)
            .into_iter()
            .map(|r| r.record.clone())
            .collect())
    }
}
