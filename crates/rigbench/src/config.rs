//! TOML configuration for the `rig` binary.
//!
//! ```toml
//! [catalog]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 15
//! seed_path = "data/hardware_seed.json"   # optional
//!
//! [benchmark]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 60
//!
//! [rules]   # optional, replaces individual heuristic tables
//! ```
//!
//! See `config/rig.example.toml` for a full example.

use anyhow::{Context, Result};
use rigbench_core::rules::RuleSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub rules: RuleSet,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    #[serde(default = "default_catalog_timeout")]
    pub timeout_secs: u64,
    /// Replaces the bundled snapshot when set.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

fn default_catalog_timeout() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct BenchmarkConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_benchmark_timeout")]
    pub timeout_secs: u64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_benchmark_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
fn default_benchmark_timeout() -> u64 {
    60
}

impl Config {
    /// Configuration used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            catalog: CatalogConfig {
                base_url: default_base_url(),
                timeout_secs: default_catalog_timeout(),
                seed_path: None,
            },
            benchmark: BenchmarkConfig::default(),
            rules: RuleSet::default(),
        }
    }
}

fn validate_base_url(field: &str, url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        anyhow::bail!("{} must not be empty", field);
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("{} must start with http:// or https:// (got '{}')", field, url);
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate_base_url("catalog.base_url", &config.catalog.base_url)?;
    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs must be > 0");
    }
    if let Some(seed) = &config.catalog.seed_path {
        if !seed.exists() {
            anyhow::bail!("catalog.seed_path does not exist: {}", seed.display());
        }
    }

    validate_base_url("benchmark.base_url", &config.benchmark.base_url)?;
    if config.benchmark.timeout_secs == 0 {
        anyhow::bail!("benchmark.timeout_secs must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigbench_core::models::Category;
    use rigbench_core::rules::DEFAULT_UNRANKED;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("rig.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[catalog]\nbase_url = \"http://localhost:8000\"\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.catalog.timeout_secs, 15);
        assert_eq!(cfg.benchmark.timeout_secs, 60);
        assert_eq!(cfg.rules, RuleSet::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[catalog]\nbase_url = \"localhost:8000\"\n");
        let err = load_config(&path).unwrap_err().to_string();
        assert!(err.contains("catalog.base_url"));

        let path = write(
            &dir,
            "[catalog]\nbase_url = \"http://a\"\n\n[benchmark]\ntimeout_secs = 0\n",
        );
        let err = load_config(&path).unwrap_err().to_string();
        assert!(err.contains("benchmark.timeout_secs"));

        let path = write(
            &dir,
            "[catalog]\nbase_url = \"http://a\"\nseed_path = \"/nonexistent/seed.json\"\n",
        );
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_rules_override_single_table() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"[catalog]
base_url = "http://a"

[rules]
premium_tokens = ["ultra", "extreme"]

[[rules.capacity_bands]]
label_tb = 1
min_gb = 950
max_gb = 1100
"#,
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.rules.premium_tokens, vec!["ultra", "extreme"]);
        assert_eq!(cfg.rules.capacity_bands.len(), 1);
        assert_eq!(cfg.rules.brand_rules, RuleSet::default().brand_rules);
    }

    #[test]
    fn test_rules_partial_tables_keep_builtins() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"[catalog]
base_url = "http://a"

[rules.brand_order]
cpu = ["amd", "intel"]

[rules.cpu_tiers]
entries = [{ token = "i9", rank = 0 }, { token = "ryzen 9", rank = 0 }]
"#,
        );
        let cfg = load_config(&path).unwrap();
        let defaults = RuleSet::default();
        assert_eq!(cfg.rules.brand_order.cpu, vec!["amd", "intel"]);
        assert_eq!(cfg.rules.brand_order.gpu, defaults.brand_order.gpu);
        assert_eq!(cfg.rules.brand_order.storage, defaults.brand_order.storage);
        assert_eq!(cfg.rules.brand_position("NVIDIA", Category::Gpu), 0);
        assert_eq!(cfg.rules.cpu_tiers.entries.len(), 2);
        assert_eq!(cfg.rules.cpu_tiers.unranked, DEFAULT_UNRANKED);
    }
}
