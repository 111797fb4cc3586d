//! Core data models used throughout RigBench.
//!
//! These types represent the catalog records, their derived classification,
//! the user's filter/sort choices, and the benchmark results that flow
//! through the selection and search pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hardware category of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cpu,
    Gpu,
    Storage,
    Ram,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Cpu, Category::Gpu, Category::Storage, Category::Ram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Gpu => "gpu",
            Category::Storage => "storage",
            Category::Ram => "ram",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpu" => Ok(Category::Cpu),
            "gpu" => Ok(Category::Gpu),
            "storage" => Ok(Category::Storage),
            "ram" | "memory" => Ok(Category::Ram),
            other => anyhow::bail!("Unknown hardware category: '{}'", other),
        }
    }
}

/// A raw catalog record as returned by the hardware directory service
/// or the bundled snapshot.
///
/// Identity is the `(category, model)` pair. Records are never patched
/// in place; a refresh replaces the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRecord {
    pub category: Category,
    pub model: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_options: Option<Vec<f64>>,
}

impl HardwareRecord {
    pub fn new(category: Category, model: impl Into<String>, brand: impl Into<String>) -> Self {
        Self {
            category,
            model: model.into(),
            brand: brand.into(),
            generation: None,
            release_year: None,
            capacity_gb: None,
            vram_gb: None,
            vram_options: None,
        }
    }

    pub fn with_generation(mut self, generation: impl Into<String>) -> Self {
        self.generation = Some(generation.into());
        self
    }

    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    pub fn with_capacity_gb(mut self, capacity_gb: f64) -> Self {
        self.capacity_gb = Some(capacity_gb);
        self
    }

    pub fn with_vram_gb(mut self, vram_gb: f64) -> Self {
        self.vram_gb = Some(vram_gb);
        self
    }

    pub fn with_vram_options(mut self, options: Vec<f64>) -> Self {
        self.vram_options = Some(options);
        self
    }

    /// True when `other` has the same `(category, model)` identity.
    pub fn same_identity(&self, other: &HardwareRecord) -> bool {
        self.category == other.category && self.model == other.model
    }

    /// Generation text, or `""` when absent.
    pub fn generation_str(&self) -> &str {
        self.generation.as_deref().unwrap_or("")
    }
}

/// Storage interface class derived from model/generation text.
///
/// Variant order is the default ranking priority (NVMe first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Nvme,
    Sata,
    Hdd,
    Other,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Nvme => "nvme",
            StorageType::Sata => "sata",
            StorageType::Hdd => "hdd",
            StorageType::Other => "other",
        }
    }

    /// Lenient parse used by the series filter; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<StorageType> {
        match s.trim().to_lowercase().as_str() {
            "nvme" => Some(StorageType::Nvme),
            "sata" => Some(StorageType::Sata),
            "hdd" => Some(StorageType::Hdd),
            _ => None,
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`HardwareRecord`] annotated with derived, non-persisted fields.
///
/// Produced by [`classify`](crate::classify::classify). Never cached across
/// catalog refreshes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: HardwareRecord,
    /// Brand inferred from the model text (`""` when nothing matched).
    pub inferred_brand: String,
    /// Interface class; only present for storage records.
    pub storage_type: Option<StorageType>,
    /// Explicit capacity if present, else parsed from the model text.
    /// Only resolved for storage records.
    pub capacity_gb_resolved: Option<u64>,
}

impl ClassifiedRecord {
    /// Explicit brand when non-empty, otherwise the inferred one.
    pub fn effective_brand(&self) -> &str {
        if self.record.brand.trim().is_empty() {
            &self.inferred_brand
        } else {
            self.record.brand.trim()
        }
    }
}

/// Fixed inclusive capacity ranges used to filter storage records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityBucket {
    #[serde(rename = "0-512")]
    UpTo512,
    #[serde(rename = "513-1024")]
    UpTo1024,
    #[serde(rename = "1025-2048")]
    UpTo2048,
    #[serde(rename = "2049-4096")]
    UpTo4096,
    #[serde(rename = "4097+")]
    Above4096,
}

impl CapacityBucket {
    pub const ALL: [CapacityBucket; 5] = [
        CapacityBucket::UpTo512,
        CapacityBucket::UpTo1024,
        CapacityBucket::UpTo2048,
        CapacityBucket::UpTo4096,
        CapacityBucket::Above4096,
    ];

    /// Inclusive `(min, max)` bounds in GB-equivalent.
    pub fn bounds(&self) -> (u64, u64) {
        match self {
            CapacityBucket::UpTo512 => (0, 512),
            CapacityBucket::UpTo1024 => (513, 1024),
            CapacityBucket::UpTo2048 => (1025, 2048),
            CapacityBucket::UpTo4096 => (2049, 4096),
            CapacityBucket::Above4096 => (4097, u64::MAX),
        }
    }

    pub fn contains(&self, capacity_gb: u64) -> bool {
        let (min, max) = self.bounds();
        capacity_gb >= min && capacity_gb <= max
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityBucket::UpTo512 => "0-512",
            CapacityBucket::UpTo1024 => "513-1024",
            CapacityBucket::UpTo2048 => "1025-2048",
            CapacityBucket::UpTo4096 => "2049-4096",
            CapacityBucket::Above4096 => "4097+",
        }
    }

    pub fn parse(s: &str) -> Option<CapacityBucket> {
        let s = s.trim();
        CapacityBucket::ALL.into_iter().find(|b| b.as_str() == s)
    }
}

/// Conjunction of optional predicates. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub series: Option<String>,
    pub free_text: Option<String>,
    pub capacity_bucket: Option<CapacityBucket>,
}

impl FilterCriteria {
    /// Build criteria from raw user-facing strings.
    ///
    /// Empty values, `"all"`, and unrecognised category/bucket values are
    /// all treated as "no filter".
    pub fn from_raw(
        category: Option<&str>,
        brand: Option<&str>,
        series: Option<&str>,
        free_text: Option<&str>,
        capacity_bucket: Option<&str>,
    ) -> Self {
        Self {
            category: category
                .and_then(normalize_filter_value)
                .and_then(|c| c.parse().ok()),
            brand: brand.and_then(normalize_filter_value),
            series: series.and_then(normalize_filter_value),
            free_text: free_text.and_then(normalize_filter_value),
            capacity_bucket: capacity_bucket
                .and_then(normalize_filter_value)
                .and_then(|b| CapacityBucket::parse(&b)),
        }
    }

    pub fn for_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Default::default()
        }
    }

    /// True when every predicate is "all".
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.brand.is_none()
            && self.series.is_none()
            && self.free_text.is_none()
            && self.capacity_bucket.is_none()
    }
}

/// Map `""` / `"all"` to `None`, otherwise return the trimmed value.
pub fn normalize_filter_value(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(v.to_string())
    }
}

/// Explicit user-chosen ordering. [`SortKey::Default`] selects the
/// category-specific heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Default,
    ModelAsc,
    ModelDesc,
    BrandAsc,
    BrandDesc,
    YearDesc,
    YearAsc,
    VramDesc,
    VramAsc,
    CapacityDesc,
    CapacityAsc,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Default => "default",
            SortKey::ModelAsc => "model-asc",
            SortKey::ModelDesc => "model-desc",
            SortKey::BrandAsc => "brand-asc",
            SortKey::BrandDesc => "brand-desc",
            SortKey::YearDesc => "year-desc",
            SortKey::YearAsc => "year-asc",
            SortKey::VramDesc => "vram-desc",
            SortKey::VramAsc => "vram-asc",
            SortKey::CapacityDesc => "capacity-desc",
            SortKey::CapacityAsc => "capacity-asc",
        }
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_lowercase().as_str() {
            "" | "default" => SortKey::Default,
            "model-asc" => SortKey::ModelAsc,
            "model-desc" => SortKey::ModelDesc,
            "brand-asc" => SortKey::BrandAsc,
            "brand-desc" => SortKey::BrandDesc,
            "year-desc" => SortKey::YearDesc,
            "year-asc" => SortKey::YearAsc,
            "vram-desc" => SortKey::VramDesc,
            "vram-asc" => SortKey::VramAsc,
            "capacity-desc" => SortKey::CapacityDesc,
            "capacity-asc" => SortKey::CapacityAsc,
            other => anyhow::bail!("Unknown sort key: '{}'", other),
        };
        Ok(key)
    }
}

/// Which subsystem most limits measured performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BottleneckType {
    GpuBound,
    CpuBound,
    MemoryBound,
    IoBound,
    Balanced,
    Unknown,
}

impl BottleneckType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BottleneckType::GpuBound => "gpu-bound",
            BottleneckType::CpuBound => "cpu-bound",
            BottleneckType::MemoryBound => "memory-bound",
            BottleneckType::IoBound => "io-bound",
            BottleneckType::Balanced => "balanced",
            BottleneckType::Unknown => "unknown",
        }
    }
}

impl From<String> for BottleneckType {
    fn from(s: String) -> Self {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match key.as_str() {
            "gpu-bound" | "gpu" => BottleneckType::GpuBound,
            "cpu-bound" | "cpu" => BottleneckType::CpuBound,
            "memory-bound" | "ram-bound" | "memory" => BottleneckType::MemoryBound,
            "io-bound" | "storage-bound" | "io" => BottleneckType::IoBound,
            "balanced" => BottleneckType::Balanced,
            _ => BottleneckType::Unknown,
        }
    }
}

impl From<BottleneckType> for String {
    fn from(t: BottleneckType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for BottleneckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bottleneck analysis attached to a benchmark result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckAnalysis {
    pub bottleneck_type: BottleneckType,
    /// Confidence in `[0.0, 1.0]`.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// A single benchmark result returned by the benchmark service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub settings: String,
    #[serde(default)]
    pub gpu: String,
    #[serde(default)]
    pub cpu: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_fps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p0_1_low: Option<f64>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Confidence in `[0.0, 1.0]`.
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub is_incomplete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottleneck_analysis: Option<BottleneckAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_required_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_selected_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_is_enough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vram_margin_gb: Option<f64>,
}

/// Response body of the benchmark search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<BenchmarkResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!("GPU".parse::<Category>().unwrap(), Category::Gpu);
        assert_eq!(" storage ".parse::<Category>().unwrap(), Category::Storage);
        assert!("laptop".parse::<Category>().is_err());
    }

    #[test]
    fn test_filter_from_raw_treats_all_and_unknown_as_none() {
        let c = FilterCriteria::from_raw(Some("all"), Some(""), Some("ALL"), None, Some("9000+"));
        assert!(c.is_empty());

        let c = FilterCriteria::from_raw(Some("cpu"), Some("Intel"), None, Some(" 13900 "), None);
        assert_eq!(c.category, Some(Category::Cpu));
        assert_eq!(c.brand.as_deref(), Some("Intel"));
        assert_eq!(c.free_text.as_deref(), Some("13900"));
    }

    #[test]
    fn test_capacity_bucket_bounds_are_inclusive() {
        assert!(CapacityBucket::UpTo512.contains(512));
        assert!(!CapacityBucket::UpTo512.contains(513));
        assert!(CapacityBucket::UpTo1024.contains(513));
        assert!(CapacityBucket::UpTo1024.contains(1024));
        assert!(CapacityBucket::Above4096.contains(16000));
        assert_eq!(CapacityBucket::parse("2049-4096"), Some(CapacityBucket::UpTo4096));
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("vram-desc".parse::<SortKey>().unwrap(), SortKey::VramDesc);
        assert_eq!(" Default ".parse::<SortKey>().unwrap(), SortKey::Default);
        assert!("price-asc".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_bottleneck_type_lenient_parse() {
        let a: BottleneckAnalysis = serde_json::from_str(
            r#"{"bottleneck_type":"GPU-bound","confidence":0.8,"reasoning":"r","recommendations":["x"]}"#,
        )
        .unwrap();
        assert_eq!(a.bottleneck_type, BottleneckType::GpuBound);
        assert_eq!(BottleneckType::from("io_bound".to_string()), BottleneckType::IoBound);
        assert_eq!(BottleneckType::from("mystery".to_string()), BottleneckType::Unknown);
    }

    #[test]
    fn test_record_deserializes_with_missing_optionals() {
        let r: HardwareRecord =
            serde_json::from_str(r#"{"category":"gpu","model":"RTX 4070"}"#).unwrap();
        assert_eq!(r.brand, "");
        assert!(r.vram_options.is_none());
        assert_eq!(r.generation_str(), "");
    }
}
