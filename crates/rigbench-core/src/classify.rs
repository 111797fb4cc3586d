//! Brand, storage-interface and capacity inference from free text.
//!
//! Classification is pure and never fails: anything that cannot be
//! recognised degrades to a defined fallback (empty brand,
//! [`StorageType::Other`], unresolved capacity).
//!
//! # Capacity
//!
//! The numeric capacity used for filtering and sorting is the explicit
//! `capacity_gb` field when present, otherwise the first `<n>TB` (× 1000)
//! or `<n>GB` token of the model text, rounded to whole GB. Display goes
//! through [`format_capacity`], which snaps values into the marketing
//! bands of the [`RuleSet`] so 1000- and 1024-based sources read the same.
//!
//! # Example
//!
//! ```rust
//! use rigbench_core::classify::parse_capacity_gb;
//!
//! assert_eq!(parse_capacity_gb("Samsung 990 PRO 1TB"), Some(1000));
//! assert_eq!(parse_capacity_gb("Crucial P3 500GB"), Some(500));
//! assert_eq!(parse_capacity_gb("Ryzen 7 7800X3D"), None);
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Category, ClassifiedRecord, HardwareRecord, StorageType};
use crate::rules::RuleSet;

static TB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*TB").expect("valid TB pattern"));
static GB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*GB").expect("valid GB pattern"));
static CAPACITY_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\b\d+(?:\.\d+)?\s*(?:TB|GB)\b").expect("valid capacity token pattern")
});

/// Label used when a manual entry has neither a brand nor an inferable one.
pub const UNKNOWN_BRAND: &str = "Unknown";

/// Infer a canonical brand from model text.
///
/// Scans the brand rules in order; the first rule with a token contained
/// in the (lowercased, space-padded) model wins. Returns `""` when no rule
/// matches.
pub fn infer_brand(model: &str, rules: &RuleSet) -> String {
    let haystack = format!(" {} ", normalize_model(model).to_lowercase());
    rules
        .brand_rules
        .iter()
        .find(|rule| {
            rule.tokens
                .iter()
                .any(|t| haystack.contains(&t.to_lowercase()))
        })
        .map(|rule| rule.brand.clone())
        .unwrap_or_default()
}

/// Classify the storage interface from model and generation text.
///
/// Rules are evaluated in priority order (NVMe, SATA, HDD); the first
/// match wins and anything else is [`StorageType::Other`].
pub fn storage_type(model: &str, generation: Option<&str>, rules: &RuleSet) -> StorageType {
    let model = model.to_lowercase();
    let generation = generation.unwrap_or("").to_lowercase();
    rules
        .storage_type_rules
        .iter()
        .find(|rule| {
            rule.tokens.iter().any(|t| {
                let t = t.to_lowercase();
                generation.contains(&t) || model.contains(&t)
            })
        })
        .map(|rule| rule.kind)
        .unwrap_or(StorageType::Other)
}

/// Parse a GB-equivalent capacity from free text.
///
/// `TB` values are multiplied by 1000. A `TB` token takes precedence
/// over a `GB` token anywhere in the text.
pub fn parse_capacity_gb(text: &str) -> Option<u64> {
    if let Some(tb) = TB_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return Some((tb * 1000.0).round() as u64);
    }
    GB_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|gb| gb.round() as u64)
}

/// Explicit capacity when present and positive, else parsed from the model.
pub fn resolve_capacity_gb(record: &HardwareRecord) -> Option<u64> {
    match record.capacity_gb {
        Some(v) if v.is_finite() && v > 0.0 => Some(v.round() as u64),
        _ => parse_capacity_gb(&record.model),
    }
}

/// Human-readable capacity label.
///
/// Values inside a marketing band display as that band's TB label;
/// other values of 1000 GB or more are divided by 1000 (one decimal when
/// fractional); smaller values display in GB. `None` or zero yields `""`.
pub fn format_capacity(capacity_gb: Option<u64>, rules: &RuleSet) -> String {
    let gb = match capacity_gb {
        Some(gb) if gb > 0 => gb,
        _ => return String::new(),
    };

    if let Some(band) = rules
        .capacity_bands
        .iter()
        .find(|b| gb >= b.min_gb && gb <= b.max_gb)
    {
        return format!("{}TB", band.label_tb);
    }

    if gb >= 1000 {
        let tb = gb as f64 / 1000.0;
        if tb.fract() == 0.0 {
            format!("{}TB", tb as u64)
        } else {
            format!("{:.1}TB", tb)
        }
    } else {
        format!("{}GB", gb)
    }
}

/// Trim and collapse internal whitespace.
pub fn normalize_model(model: &str) -> String {
    model.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Storage model text with capacity tokens removed, for display.
///
/// The underlying model is left untouched for identity and search.
pub fn display_model(record: &HardwareRecord) -> String {
    let model = record.model.trim();
    if record.category != Category::Storage {
        return model.to_string();
    }
    normalize_model(&CAPACITY_TOKEN_RE.replace_all(model, ""))
}

/// Short interface label for a storage record.
pub fn storage_type_label(record: &ClassifiedRecord) -> String {
    match record.storage_type {
        Some(StorageType::Nvme) => "NVMe".to_string(),
        Some(StorageType::Sata) => "SATA".to_string(),
        Some(StorageType::Hdd) => "HDD".to_string(),
        _ => record
            .record
            .generation
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or("Other")
            .to_string(),
    }
}

/// Annotate a record with its derived fields.
pub fn classify(record: &HardwareRecord, rules: &RuleSet) -> ClassifiedRecord {
    let is_storage = record.category == Category::Storage;
    ClassifiedRecord {
        record: record.clone(),
        inferred_brand: infer_brand(&record.model, rules),
        storage_type: is_storage
            .then(|| storage_type(&record.model, record.generation.as_deref(), rules)),
        capacity_gb_resolved: if is_storage {
            resolve_capacity_gb(record)
        } else {
            None
        },
    }
}

/// Classify every record, preserving order.
pub fn classify_all(records: &[HardwareRecord], rules: &RuleSet) -> Vec<ClassifiedRecord> {
    records.iter().map(|r| classify(r, rules)).collect()
}
