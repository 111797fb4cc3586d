//! Deterministic ordering of filtered records.
//!
//! [`rank`] sorts with [`compare`], a comparator that is a strict total
//! order: every key chain ends with the normalised model (case-insensitive,
//! then exact) and the category, so two records compare equal only when
//! they share the same identity.
//!
//! # Default ordering
//!
//! Records are grouped by category, then ordered by a per-category chain:
//!
//! | Category | Keys |
//! |----------|------|
//! | storage | interface (NVMe, SATA, HDD, other), capacity desc, brand, model |
//! | cpu | brand position, premium first, generation number desc, tier, model number desc, suffix, model |
//! | gpu | brand position, family, model number desc, suffix, year desc, generation, model |
//! | ram | brand position, year desc, generation, brand, model |
//!
//! Unresolvable keys take their lowest-priority value (`0`, `""` or the
//! table's `unranked` rank). Explicit [`SortKey`]s compare their single
//! field and then fall through to the model tie-break.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

use crate::classify::normalize_model;
use crate::models::{Category, ClassifiedRecord, SortKey, StorageType};
use crate::rules::RuleSet;

static MODEL_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3,5})([A-Za-z0-9]*)").expect("valid model number pattern"));
static GEN_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)\s*gen").expect("valid generation pattern")
});

/// First 3–5 digit number in the model (commas ignored), or 0.
pub fn model_number(model: &str) -> u64 {
    let model = model.replace(',', "");
    MODEL_NUMBER_RE
        .captures(&model)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Uppercased suffix tokens that follow the model number.
///
/// The alphanumeric run glued to the number comes first (`K` in
/// `14900K`, `X3D` in `7800X3D`), followed by the whitespace-separated
/// words after it (`TI`, `SUPER`, `XTX`). Models without a number have
/// no suffix.
pub fn suffix_tokens(model: &str) -> Vec<String> {
    let model = model.replace(',', "");
    let Some(caps) = MODEL_NUMBER_RE.captures(&model) else {
        return Vec::new();
    };
    let mut tokens = Vec::new();
    if let Some(attached) = caps.get(2).filter(|m| !m.as_str().is_empty()) {
        tokens.push(attached.as_str().to_uppercase());
    }
    if let Some(whole) = caps.get(0) {
        tokens.extend(
            model[whole.end()..]
                .split(|c: char| c.is_whitespace() || c == '-')
                .filter(|w| !w.is_empty())
                .map(str::to_uppercase),
        );
    }
    tokens
}

/// Generation number from text like `"14th Gen"`, or 0.
pub fn generation_number(generation: &str) -> u32 {
    GEN_NUMBER_RE
        .captures(generation)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Order records with [`compare`]. The sort is stable.
pub fn rank<'a>(
    mut records: Vec<&'a ClassifiedRecord>,
    sort: SortKey,
    rules: &RuleSet,
) -> Vec<&'a ClassifiedRecord> {
    records.sort_by(|a, b| compare(a, b, sort, rules));
    records
}

/// Total-order comparator used by [`rank`].
pub fn compare(a: &ClassifiedRecord, b: &ClassifiedRecord, sort: SortKey, rules: &RuleSet) -> Ordering {
    let primary = match sort {
        SortKey::Default => compare_default(a, b, rules),
        SortKey::ModelAsc => Ordering::Equal,
        SortKey::ModelDesc => compare_model(b, a),
        SortKey::BrandAsc => compare_text(a.effective_brand(), b.effective_brand()),
        SortKey::BrandDesc => compare_text(b.effective_brand(), a.effective_brand()),
        SortKey::YearAsc => year(a).cmp(&year(b)),
        SortKey::YearDesc => year(b).cmp(&year(a)),
        SortKey::VramAsc => vram(a).total_cmp(&vram(b)),
        SortKey::VramDesc => vram(b).total_cmp(&vram(a)),
        SortKey::CapacityAsc => capacity(a).cmp(&capacity(b)),
        SortKey::CapacityDesc => capacity(b).cmp(&capacity(a)),
    };
    primary
        .then_with(|| compare_model(a, b))
        .then_with(|| a.record.category.cmp(&b.record.category))
}

fn compare_default(a: &ClassifiedRecord, b: &ClassifiedRecord, rules: &RuleSet) -> Ordering {
    a.record
        .category
        .cmp(&b.record.category)
        .then_with(|| match a.record.category {
            Category::Storage => compare_storage(a, b),
            Category::Cpu => compare_cpu(a, b, rules),
            Category::Gpu => compare_gpu(a, b, rules),
            Category::Ram => compare_other(a, b, rules),
        })
}

fn compare_storage(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    let kind = |r: &ClassifiedRecord| r.storage_type.unwrap_or(StorageType::Other);
    kind(a)
        .cmp(&kind(b))
        .then_with(|| capacity(b).cmp(&capacity(a)))
        .then_with(|| compare_text(a.effective_brand(), b.effective_brand()))
        .then_with(|| compare_model(a, b))
}

fn compare_cpu(a: &ClassifiedRecord, b: &ClassifiedRecord, rules: &RuleSet) -> Ordering {
    let premium = |r: &ClassifiedRecord| rules.is_premium(&r.record.model, r.record.generation_str());
    let gen = |r: &ClassifiedRecord| generation_number(r.record.generation_str());
    let tier = |r: &ClassifiedRecord| rules.cpu_tiers.rank_substring(&r.record.model);
    let suffix = |r: &ClassifiedRecord| rules.cpu_suffixes.rank_tokens(&suffix_tokens(&r.record.model));

    brand_position(a, rules)
        .cmp(&brand_position(b, rules))
        .then_with(|| premium(b).cmp(&premium(a)))
        .then_with(|| gen(b).cmp(&gen(a)))
        .then_with(|| tier(a).cmp(&tier(b)))
        .then_with(|| model_number(&b.record.model).cmp(&model_number(&a.record.model)))
        .then_with(|| suffix(a).cmp(&suffix(b)))
        .then_with(|| compare_model(a, b))
}

fn compare_gpu(a: &ClassifiedRecord, b: &ClassifiedRecord, rules: &RuleSet) -> Ordering {
    let family = |r: &ClassifiedRecord| {
        let words: Vec<String> = r
            .record
            .model
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_uppercase)
            .collect();
        rules
            .family_table(r.effective_brand())
            .map(|t| t.rank_tokens(&words))
            .unwrap_or(u32::MAX)
    };
    let suffix = |r: &ClassifiedRecord| rules.gpu_suffixes.rank_tokens(&suffix_tokens(&r.record.model));

    brand_position(a, rules)
        .cmp(&brand_position(b, rules))
        .then_with(|| family(a).cmp(&family(b)))
        .then_with(|| model_number(&b.record.model).cmp(&model_number(&a.record.model)))
        .then_with(|| suffix(a).cmp(&suffix(b)))
        .then_with(|| year(b).cmp(&year(a)))
        .then_with(|| compare_text(a.record.generation_str(), b.record.generation_str()))
        .then_with(|| compare_model(a, b))
}

fn compare_other(a: &ClassifiedRecord, b: &ClassifiedRecord, rules: &RuleSet) -> Ordering {
    brand_position(a, rules)
        .cmp(&brand_position(b, rules))
        .then_with(|| year(b).cmp(&year(a)))
        .then_with(|| compare_text(a.record.generation_str(), b.record.generation_str()))
        .then_with(|| compare_text(a.effective_brand(), b.effective_brand()))
        .then_with(|| compare_model(a, b))
}

fn brand_position(r: &ClassifiedRecord, rules: &RuleSet) -> usize {
    rules.brand_position(r.effective_brand(), r.record.category)
}

fn year(r: &ClassifiedRecord) -> i32 {
    r.record.release_year.unwrap_or(0)
}

fn vram(r: &ClassifiedRecord) -> f64 {
    r.record.vram_gb.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn capacity(r: &ClassifiedRecord) -> u64 {
    r.capacity_gb_resolved.unwrap_or(0)
}

/// Case-insensitive comparison, falling back to exact comparison.
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_model(a: &ClassifiedRecord, b: &ClassifiedRecord) -> Ordering {
    compare_text(&normalize_model(&a.record.model), &normalize_model(&b.record.model))
}
