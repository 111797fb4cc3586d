//! Data-driven heuristic tables.
//!
//! Every keyword list used by classification, filtering and ranking lives
//! in a [`RuleSet`]. The built-in defaults cover the mainstream consumer
//! catalog; deployments may replace any table through the `[rules]`
//! section of the application config. All tokens are matched
//! case-insensitively.
//!
//! | Table | Used by | Match |
//! |-------|---------|-------|
//! | `brand_rules` | brand inference | substring of the model, first rule wins |
//! | `brand_synonyms` | brand priority | substring of the brand |
//! | `brand_order` | default ranking | canonical brand position per category |
//! | `storage_type_rules` | storage classification | substring of model or generation |
//! | `premium_tokens` | CPU ranking | substring of model or generation |
//! | `cpu_tiers` | CPU ranking | substring of the model |
//! | `cpu_suffixes`, `gpu_suffixes` | ranking | exact suffix token |
//! | `gpu_families` | GPU ranking | whole word, per brand |
//! | `series_rules` | series filter | include/exclude substrings |
//! | `composite_brands` | brand filter | brand equality + substring |
//! | `capacity_bands` | capacity display | inclusive GB range |

use serde::{Deserialize, Serialize};

use crate::models::{Category, StorageType};

/// Position assigned to brands missing from the priority list.
pub const UNLISTED_BRAND: usize = 99;

/// Keyword → brand mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRule {
    pub brand: String,
    pub tokens: Vec<String>,
}

/// Brand spellings that collapse onto one canonical brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSynonym {
    pub canonical: String,
    pub tokens: Vec<String>,
}

/// Canonical brand priority per category.
///
/// A config table that sets only some categories keeps the built-in
/// order for the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandOrder {
    pub cpu: Vec<String>,
    pub gpu: Vec<String>,
    pub storage: Vec<String>,
    pub ram: Vec<String>,
}

impl Default for BrandOrder {
    fn default() -> Self {
        Self {
            cpu: strings(&["intel", "amd"]),
            gpu: strings(&["nvidia", "amd", "intel"]),
            storage: strings(&[
                "samsung",
                "western digital",
                "crucial",
                "seagate",
                "kingston",
                "corsair",
                "sandisk",
                "toshiba",
                "solidigm",
            ]),
            ram: Vec::new(),
        }
    }
}

impl BrandOrder {
    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Cpu => &self.cpu,
            Category::Gpu => &self.gpu,
            Category::Storage => &self.storage,
            Category::Ram => &self.ram,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageTypeRule {
    pub kind: StorageType,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankToken {
    pub token: String,
    pub rank: u32,
}

/// Rank given to unmatched text when a config table omits `unranked`.
pub const DEFAULT_UNRANKED: u32 = 9;

fn default_unranked() -> u32 {
    DEFAULT_UNRANKED
}

/// Ordered token table; lower rank sorts first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    pub entries: Vec<RankToken>,
    /// Rank for text that matches no entry.
    #[serde(default = "default_unranked")]
    pub unranked: u32,
}

impl RankTable {
    fn from_pairs(pairs: &[(&str, u32)], unranked: u32) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(token, rank)| RankToken {
                    token: token.to_string(),
                    rank: *rank,
                })
                .collect(),
            unranked,
        }
    }

    /// First entry whose token is a substring of `text`.
    pub fn rank_substring(&self, text: &str) -> u32 {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|e| text.contains(&e.token.to_lowercase()))
            .map(|e| e.rank)
            .unwrap_or(self.unranked)
    }

    /// First entry whose token equals one of `tokens` (case-insensitive).
    pub fn rank_tokens(&self, tokens: &[String]) -> u32 {
        self.entries
            .iter()
            .find(|e| tokens.iter().any(|t| t.eq_ignore_ascii_case(&e.token)))
            .map(|e| e.rank)
            .unwrap_or(self.unranked)
    }
}

/// Product-family table scoped to one canonical brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyTable {
    pub brand: String,
    #[serde(flatten)]
    pub table: RankTable,
}

/// Series filter value with brand-scoped inclusion/exclusion tokens.
///
/// For records of `brand` (or any brand when unset) the series matches when
/// the model or generation contains one of `include` (or `include` is
/// empty) and none of `exclude`. Records of other brands fall back to a
/// plain substring test of the series value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRule {
    pub series: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Brand filter value for a vendor's sub-brand, e.g. `intel-ultra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBrand {
    pub key: String,
    pub brand: String,
    pub tokens: Vec<String>,
}

/// GB-equivalent range displayed as a round TB label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityBand {
    pub label_tb: u32,
    pub min_gb: u64,
    pub max_gb: u64,
}

/// All heuristic tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub brand_rules: Vec<BrandRule>,
    pub brand_synonyms: Vec<BrandSynonym>,
    pub brand_order: BrandOrder,
    pub storage_type_rules: Vec<StorageTypeRule>,
    pub premium_tokens: Vec<String>,
    pub cpu_tiers: RankTable,
    pub cpu_suffixes: RankTable,
    pub gpu_families: Vec<FamilyTable>,
    pub gpu_suffixes: RankTable,
    pub series_rules: Vec<SeriesRule>,
    pub composite_brands: Vec<CompositeBrand>,
    pub capacity_bands: Vec<CapacityBand>,
}

fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| t.to_string()).collect()
}

fn brand_rule(brand: &str, tokens: &[&str]) -> BrandRule {
    BrandRule {
        brand: brand.to_string(),
        tokens: strings(tokens),
    }
}

fn synonym(canonical: &str, tokens: &[&str]) -> BrandSynonym {
    BrandSynonym {
        canonical: canonical.to_string(),
        tokens: strings(tokens),
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            brand_rules: vec![
                brand_rule(
                    "Intel",
                    &["intel", "core i", "core ultra", "i3-", "i5-", "i7-", "i9-", "xeon"],
                ),
                brand_rule("AMD", &["ryzen", "threadripper", "epyc", "amd"]),
                brand_rule("NVIDIA", &["rtx", "gtx", "geforce", "nvidia", "quadro"]),
                brand_rule("AMD", &["radeon", " rx ", "rx-"]),
                brand_rule("Intel", &["arc a", "arc b"]),
                brand_rule("Samsung", &["samsung"]),
                brand_rule("Western Digital", &["western digital", " wd ", "wd_black", "wd-"]),
                brand_rule("Crucial", &["crucial"]),
                brand_rule("Seagate", &["seagate"]),
                brand_rule("Kingston", &["kingston"]),
                brand_rule("Toshiba", &["toshiba"]),
                brand_rule("SanDisk", &["sandisk"]),
                brand_rule("Corsair", &["corsair"]),
                brand_rule("Solidigm", &["solidigm"]),
            ],
            brand_synonyms: vec![
                synonym("intel", &["intel", "core", "ultra", "xeon"]),
                synonym("amd", &["amd", "ryzen", "radeon", "threadripper"]),
                synonym("nvidia", &["nvidia", "geforce", "gtx", "rtx", "quadro"]),
                synonym("western digital", &["western digital", "wd", "western"]),
            ],
            brand_order: BrandOrder::default(),
            storage_type_rules: vec![
                StorageTypeRule {
                    kind: StorageType::Nvme,
                    tokens: strings(&["nvme", "m.2", "m2", "pcie"]),
                },
                StorageTypeRule {
                    kind: StorageType::Sata,
                    tokens: strings(&["sata", "ssd"]),
                },
                StorageTypeRule {
                    kind: StorageType::Hdd,
                    tokens: strings(&["hdd", "hard drive"]),
                },
            ],
            premium_tokens: strings(&["ultra"]),
            cpu_tiers: RankTable::from_pairs(
                &[
                    ("i9", 0),
                    ("ultra 9", 0),
                    ("ryzen 9", 0),
                    ("i7", 1),
                    ("ultra 7", 1),
                    ("ryzen 7", 1),
                    ("i5", 2),
                    ("ultra 5", 2),
                    ("ryzen 5", 2),
                    ("i3", 3),
                    ("ryzen 3", 3),
                ],
                9,
            ),
            cpu_suffixes: RankTable::from_pairs(
                &[
                    ("KS", 0),
                    ("X3D", 0),
                    ("K", 1),
                    ("X", 1),
                    ("KF", 2),
                    ("XT", 2),
                    ("F", 3),
                    ("G", 3),
                ],
                5,
            ),
            gpu_families: vec![
                FamilyTable {
                    brand: "nvidia".to_string(),
                    table: RankTable::from_pairs(&[("RTX", 0), ("GTX", 1)], 9),
                },
                FamilyTable {
                    brand: "amd".to_string(),
                    table: RankTable::from_pairs(&[("RX", 0), ("RADEON", 1)], 9),
                },
                FamilyTable {
                    brand: "intel".to_string(),
                    table: RankTable::from_pairs(&[("ARC", 0)], 9),
                },
            ],
            gpu_suffixes: RankTable::from_pairs(
                &[("TI", 0), ("XTX", 0), ("SUPER", 1), ("XT", 1)],
                9,
            ),
            series_rules: vec![
                SeriesRule {
                    series: "core".to_string(),
                    brand: Some("intel".to_string()),
                    include: Vec::new(),
                    exclude: strings(&["ultra"]),
                },
                SeriesRule {
                    series: "ultra".to_string(),
                    brand: None,
                    include: strings(&["ultra"]),
                    exclude: Vec::new(),
                },
                SeriesRule {
                    series: "rtx".to_string(),
                    brand: Some("nvidia".to_string()),
                    include: strings(&["rtx"]),
                    exclude: strings(&["gtx"]),
                },
                SeriesRule {
                    series: "gtx".to_string(),
                    brand: None,
                    include: strings(&["gtx"]),
                    exclude: Vec::new(),
                },
            ],
            composite_brands: vec![CompositeBrand {
                key: "intel-ultra".to_string(),
                brand: "intel".to_string(),
                tokens: strings(&["ultra"]),
            }],
            capacity_bands: vec![
                CapacityBand { label_tb: 16, min_gb: 14000, max_gb: 18000 },
                CapacityBand { label_tb: 8, min_gb: 7000, max_gb: 9200 },
                CapacityBand { label_tb: 4, min_gb: 3600, max_gb: 4600 },
                CapacityBand { label_tb: 2, min_gb: 1800, max_gb: 2300 },
                CapacityBand { label_tb: 1, min_gb: 900, max_gb: 1150 },
            ],
        }
    }
}

impl RuleSet {
    /// Collapse a brand string onto its canonical lowercase form.
    pub fn canonical_brand(&self, brand: &str) -> String {
        let b = brand.trim().to_lowercase();
        self.brand_synonyms
            .iter()
            .find(|s| s.tokens.iter().any(|t| b.contains(&t.to_lowercase())))
            .map(|s| s.canonical.to_lowercase())
            .unwrap_or(b)
    }

    /// Position of `brand` in the category's priority list, or
    /// [`UNLISTED_BRAND`].
    pub fn brand_position(&self, brand: &str, category: Category) -> usize {
        let canonical = self.canonical_brand(brand);
        if canonical.is_empty() {
            return UNLISTED_BRAND;
        }
        self.brand_order
            .for_category(category)
            .iter()
            .position(|entry| {
                let entry = entry.to_lowercase();
                canonical == entry || canonical.contains(&entry)
            })
            .unwrap_or(UNLISTED_BRAND)
    }

    pub fn family_table(&self, brand: &str) -> Option<&RankTable> {
        let canonical = self.canonical_brand(brand);
        self.gpu_families
            .iter()
            .find(|f| f.brand.eq_ignore_ascii_case(&canonical))
            .map(|f| &f.table)
    }

    pub fn series_rule(&self, series: &str) -> Option<&SeriesRule> {
        self.series_rules
            .iter()
            .find(|r| r.series.eq_ignore_ascii_case(series.trim()))
    }

    pub fn composite_brand(&self, key: &str) -> Option<&CompositeBrand> {
        self.composite_brands
            .iter()
            .find(|c| c.key.eq_ignore_ascii_case(key.trim()))
    }

    /// True when model or generation carries a premium sub-brand token.
    pub fn is_premium(&self, model: &str, generation: &str) -> bool {
        let model = model.to_lowercase();
        let generation = generation.to_lowercase();
        self.premium_tokens.iter().any(|t| {
            let t = t.to_lowercase();
            model.contains(&t) || generation.contains(&t)
        })
    }
}
