//! Hardware catalog: HTTP directory client, refresh, and CLI listing.
//!
//! [`HttpCatalog`] queries `GET {base_url}/api/hardware` with the optional
//! `category`, `brand`, `series` and `search` parameters and expects
//! `{"items": [HardwareRecord, ...]}` back. [`refresh_catalog`] runs the
//! fallback chain remote → bundled snapshot → empty and logs each step.
//!
//! # CLI
//!
//! ```bash
//! rig catalog --category storage --series nvme --capacity 1025-2048
//! rig catalog --category gpu --sort vram-desc --offline
//! rig brands --category cpu
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use rigbench_core::browse::BrowseState;
use rigbench_core::catalog::{load_with_fallback, CatalogOrigin, CatalogQuery, CatalogSnapshot, CatalogSource};
use rigbench_core::classify::{display_model, format_capacity, storage_type_label};
use rigbench_core::models::{Category, ClassifiedRecord, FilterCriteria, HardwareRecord, SortKey};
use rigbench_core::rules::RuleSet;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::seed::SeedCatalog;

#[derive(Debug, Deserialize)]
struct HardwareListResponse {
    #[serde(default)]
    items: Vec<HardwareRecord>,
}

/// Client for the hardware directory service.
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.catalog.base_url, config.catalog.timeout_secs)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    fn name(&self) -> &str {
        "hardware directory"
    }

    async fn fetch(&self, query: &CatalogQuery) -> Result<Vec<HardwareRecord>> {
        let url = format!("{}/api/hardware", self.base_url);
        debug!(%url, ?query, "fetching hardware list");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            anyhow::bail!("hardware list error {}: {}", status, body_text);
        }

        let body: HardwareListResponse = response
            .json()
            .await
            .context("Malformed hardware list response")?;
        Ok(body.items)
    }
}

/// Source that always fails; stands in for the remote catalog in
/// offline mode so the fallback chain stays the same.
struct Offline;

#[async_trait]
impl CatalogSource for Offline {
    fn name(&self) -> &str {
        "hardware directory"
    }

    async fn fetch(&self, _query: &CatalogQuery) -> Result<Vec<HardwareRecord>> {
        anyhow::bail!("offline mode")
    }
}

/// Load a fresh snapshot for `state.criteria`.
///
/// When the directory service fails and the bundled snapshot is used
/// instead, `state` is reset to its category so stale remote-side filters
/// do not hide the fallback records. In offline mode the filters are kept
/// and apply to the snapshot locally.
pub async fn refresh_catalog(config: &Config, state: &mut BrowseState, offline: bool) -> Result<CatalogSnapshot> {
    let query = CatalogQuery::from_criteria(&state.criteria);
    let fallback = SeedCatalog::new(config.catalog.seed_path.clone(), config.rules.clone());

    let snapshot = if offline {
        load_with_fallback(&Offline, &fallback, &query).await
    } else {
        let remote = HttpCatalog::from_config(config)?;
        load_with_fallback(&remote, &fallback, &query).await
    };

    match snapshot.origin {
        CatalogOrigin::Remote => {
            info!(count = snapshot.len(), "loaded catalog from hardware directory");
        }
        CatalogOrigin::Bundled => {
            info!(count = snapshot.len(), "loaded bundled snapshot");
            if !offline {
                warn!(
                    error = snapshot.last_error.as_deref().unwrap_or(""),
                    "hardware directory unavailable, using bundled snapshot"
                );
                state.reset_for_fallback();
            }
        }
        CatalogOrigin::Empty => {
            warn!(
                error = snapshot.last_error.as_deref().unwrap_or(""),
                "no catalog available"
            );
        }
    }

    Ok(snapshot)
}

/// Arguments of `rig catalog`.
#[derive(Debug, Clone, Default)]
pub struct CatalogArgs {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub series: Option<String>,
    pub search: Option<String>,
    pub capacity: Option<String>,
    pub sort: Option<String>,
    pub offline: bool,
}

pub fn browse_state(args: &CatalogArgs) -> Result<BrowseState> {
    let sort = match args.sort.as_deref() {
        Some(s) => s.parse::<SortKey>()?,
        None => SortKey::Default,
    };
    Ok(BrowseState {
        criteria: FilterCriteria::from_raw(
            args.category.as_deref(),
            args.brand.as_deref(),
            args.series.as_deref(),
            args.search.as_deref(),
            args.capacity.as_deref(),
        ),
        sort,
    })
}

/// One display line for a classified record.
pub fn format_line(record: &ClassifiedRecord, rules: &RuleSet) -> String {
    let r = &record.record;
    let detail = match r.category {
        Category::Storage => {
            let capacity = format_capacity(record.capacity_gb_resolved, rules);
            let label = storage_type_label(record);
            if capacity.is_empty() {
                label
            } else {
                format!("{} {}", label, capacity)
            }
        }
        Category::Gpu => match (&r.vram_options, r.vram_gb) {
            (Some(options), _) if !options.is_empty() => {
                let opts: Vec<String> = options.iter().map(|v| format!("{}", v)).collect();
                format!("{}GB", opts.join("/"))
            }
            (_, Some(vram)) => format!("{}GB", vram),
            _ => String::new(),
        },
        _ => r.generation_str().to_string(),
    };
    let year = r.release_year.map(|y| y.to_string()).unwrap_or_default();

    format!(
        "{:<8} {:<16} {:<32} {:<18} {}",
        r.category.as_str(),
        record.effective_brand(),
        display_model(r),
        detail,
        year
    )
    .trim_end()
    .to_string()
}

fn print_origin(snapshot: &CatalogSnapshot) {
    println!(
        "source: {} ({} records, fetched {})",
        snapshot.origin.as_str(),
        snapshot.len(),
        snapshot
            .fetched_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
}

pub async fn run_catalog(config: &Config, args: &CatalogArgs) -> Result<()> {
    let mut state = browse_state(args)?;
    let snapshot = refresh_catalog(config, &mut state, args.offline).await?;

    let classified = snapshot.classified(&config.rules);
    let view = state.view(&classified, &config.rules);

    print_origin(&snapshot);
    if view.is_empty() {
        println!("No hardware found.");
        return Ok(());
    }
    for record in view {
        println!("{}", format_line(record, &config.rules));
    }
    Ok(())
}

pub async fn run_brands(config: &Config, category: Option<String>, offline: bool) -> Result<()> {
    let args = CatalogArgs {
        category,
        offline,
        ..Default::default()
    };
    let mut state = browse_state(&args)?;
    let snapshot = refresh_catalog(config, &mut state, offline).await?;

    let brands = snapshot.brand_options(state.criteria.category, &config.rules);
    if brands.is_empty() {
        println!("No brands.");
    }
    for brand in brands {
        println!("{}", brand);
    }
    Ok(())
}
