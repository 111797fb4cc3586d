//! Bundled static catalog snapshot.
//!
//! The snapshot is compiled into the binary from `data/hardware_seed.json`
//! and used when the directory service is unreachable. A seed file on
//! disk (`catalog.seed_path`) replaces it. Both `{"items": [...]}` and a
//! bare array are accepted.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rigbench_core::catalog::memory::StaticCatalog;
use rigbench_core::catalog::{CatalogQuery, CatalogSource};
use rigbench_core::models::HardwareRecord;
use rigbench_core::rules::RuleSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const BUNDLED_SEED: &str = include_str!("../data/hardware_seed.json");

#[derive(Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Wrapped { items: Vec<HardwareRecord> },
    Bare(Vec<HardwareRecord>),
}

pub fn parse_seed(json: &str) -> Result<Vec<HardwareRecord>> {
    let file: SeedFile = serde_json::from_str(json).context("Invalid seed JSON")?;
    Ok(match file {
        SeedFile::Wrapped { items } => items,
        SeedFile::Bare(items) => items,
    })
}

pub fn bundled_records() -> Result<Vec<HardwareRecord>> {
    parse_seed(BUNDLED_SEED).context("Bundled seed is invalid")
}

pub fn load_seed_file(path: &Path) -> Result<Vec<HardwareRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    parse_seed(&content).with_context(|| format!("Failed to parse seed file: {}", path.display()))
}

/// [`CatalogSource`] over the bundled snapshot or a seed file.
///
/// The file is read on each fetch, so an edited seed is picked up by the
/// next refresh.
pub struct SeedCatalog {
    path: Option<PathBuf>,
    rules: RuleSet,
}

impl SeedCatalog {
    pub fn new(path: Option<PathBuf>, rules: RuleSet) -> Self {
        Self { path, rules }
    }

    fn records(&self) -> Result<Vec<HardwareRecord>> {
        match &self.path {
            Some(path) => load_seed_file(path),
            None => bundled_records(),
        }
    }
}

#[async_trait]
impl CatalogSource for SeedCatalog {
    fn name(&self) -> &str {
        "bundled snapshot"
    }

    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<HardwareRecord>> {
        let catalog = StaticCatalog::with_rules(self.name(), self.records()?, self.rules.clone());
        catalog.fetch(query).await
    }
}
