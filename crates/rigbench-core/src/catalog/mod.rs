//! Catalog sources and the snapshot they produce.
//!
//! The [`CatalogSource`] trait is the seam between the pure pipeline and
//! whatever serves hardware records: the remote directory service over
//! HTTP, or the bundled static snapshot ([`memory::StaticCatalog`]).
//!
//! [`load_with_fallback`] walks the chain remote → bundled → empty. Each
//! step is attempted exactly once. The result is a [`CatalogSnapshot`]:
//! an immutable, de-duplicated record list tagged with where it came from
//! and the last error seen, if any. A refresh replaces the snapshot
//! wholesale.

pub mod memory;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::{classify_all, normalize_model};
use crate::models::{Category, ClassifiedRecord, FilterCriteria, HardwareRecord};
use crate::rules::RuleSet;

/// Parameters understood by the hardware directory service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(rename = "search", skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
}

impl CatalogQuery {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            category: criteria.category,
            brand: criteria.brand.clone(),
            series: criteria.series.clone(),
            search_text: criteria.free_text.clone(),
        }
    }

    /// The same query with everything but the category dropped.
    pub fn category_only(&self) -> Self {
        Self {
            category: self.category,
            ..Default::default()
        }
    }
}

/// A provider of hardware records.
///
/// Implementations must be `Send + Sync` so a source can be shared with
/// async tasks.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short label for diagnostics.
    fn name(&self) -> &str;

    /// Fetch the records matching `query`, in the source's order.
    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<HardwareRecord>>;
}

/// Where a snapshot's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrigin {
    Remote,
    Bundled,
    Empty,
}

impl CatalogOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogOrigin::Remote => "remote",
            CatalogOrigin::Bundled => "bundled",
            CatalogOrigin::Empty => "empty",
        }
    }
}

/// Immutable record set for one session view.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub records: Vec<HardwareRecord>,
    pub origin: CatalogOrigin,
    /// Diagnostic context of the last failed step, if any.
    pub last_error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Identity key used for de-duplication: category plus the lowercased,
/// whitespace-normalised model.
pub fn model_key(record: &HardwareRecord) -> (Category, String) {
    (record.category, normalize_model(&record.model).to_lowercase())
}

impl CatalogSnapshot {
    /// Build a snapshot, merging records that share a [`model_key`].
    ///
    /// The first occurrence wins; later duplicates only fill fields the
    /// first one lacks. Records with a blank model are dropped.
    pub fn from_records(records: Vec<HardwareRecord>, origin: CatalogOrigin) -> Self {
        let mut merged: Vec<HardwareRecord> = Vec::with_capacity(records.len());
        let mut index: HashMap<(Category, String), usize> = HashMap::new();

        for record in records {
            if record.model.trim().is_empty() {
                continue;
            }
            let key = model_key(&record);
            match index.get(&key) {
                Some(&i) => fill_missing(&mut merged[i], record),
                None => {
                    index.insert(key, merged.len());
                    merged.push(record);
                }
            }
        }

        Self {
            records: merged,
            origin,
            last_error: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn empty(last_error: Option<String>) -> Self {
        Self {
            records: Vec::new(),
            origin: CatalogOrigin::Empty,
            last_error,
            fetched_at: Utc::now(),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.last_error = Some(error.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classify every record. Recomputed on each call.
    pub fn classified(&self, rules: &RuleSet) -> Vec<ClassifiedRecord> {
        classify_all(&self.records, rules)
    }

    /// Distinct non-empty brands, sorted case-insensitively.
    ///
    /// Records without an explicit brand contribute their inferred one.
    pub fn brand_options(&self, category: Option<Category>, rules: &RuleSet) -> Vec<String> {
        let mut brands: Vec<String> = Vec::new();
        for record in self.classified(rules) {
            if category.is_some_and(|c| c != record.record.category) {
                continue;
            }
            let brand = record.effective_brand();
            if brand.is_empty() || brands.iter().any(|b| b.eq_ignore_ascii_case(brand)) {
                continue;
            }
            brands.push(brand.to_string());
        }
        brands.sort_by_key(|b| b.to_lowercase());
        brands
    }
}

fn fill_missing(target: &mut HardwareRecord, other: HardwareRecord) {
    if target.brand.trim().is_empty() {
        target.brand = other.brand;
    }
    if target.generation.is_none() {
        target.generation = other.generation;
    }
    if target.release_year.is_none() {
        target.release_year = other.release_year;
    }
    if target.capacity_gb.is_none() {
        target.capacity_gb = other.capacity_gb;
    }
    if target.vram_gb.is_none() {
        target.vram_gb = other.vram_gb;
    }
    if target.vram_options.is_none() {
        target.vram_options = other.vram_options;
    }
}

/// Load a snapshot through the fallback chain.
///
/// 1. `primary` with the full query.
/// 2. On error, `fallback` with the category only.
/// 3. On error again, an empty snapshot.
///
/// Errors never propagate; the failure context is kept in
/// [`CatalogSnapshot::last_error`].
pub async fn load_with_fallback(
    primary: &dyn CatalogSource,
    fallback: &dyn CatalogSource,
    query: &CatalogQuery,
) -> CatalogSnapshot {
    let primary_err = match primary.fetch(query).await {
        Ok(records) => return CatalogSnapshot::from_records(records, CatalogOrigin::Remote),
        Err(e) => format!("{}: {:#}", primary.name(), e),
    };

    match fallback.fetch(&query.category_only()).await {
        Ok(records) => CatalogSnapshot::from_records(records, CatalogOrigin::Bundled)
            .with_error(primary_err),
        Err(e) => CatalogSnapshot::empty(Some(format!(
            "{} | {}: {:#}",
            primary_err,
            fallback.name(),
            e
        ))),
    }
}
