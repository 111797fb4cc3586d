//! Conjunctive record filtering.
//!
//! [`filter`] keeps the records that satisfy every predicate of a
//! [`FilterCriteria`], preserving input order. An absent predicate is a
//! no-op, so criteria with every field `None` return the input unchanged.
//!
//! | Predicate | Match |
//! |-----------|-------|
//! | category | exact |
//! | brand | composite key (brand + token) or substring of the effective brand |
//! | series | storage type key, series rule, or substring of model/generation |
//! | free text | substring of model, effective brand or generation |
//! | capacity bucket | resolved capacity inside the bucket's inclusive range |
//!
//! The capacity bucket only constrains storage records; other categories
//! pass it unchanged. All text comparisons are case-insensitive.

use crate::models::{CapacityBucket, Category, ClassifiedRecord, FilterCriteria, StorageType};
use crate::rules::RuleSet;

/// Return the records matching all predicates, in input order.
pub fn filter<'a>(
    records: &'a [ClassifiedRecord],
    criteria: &FilterCriteria,
    rules: &RuleSet,
) -> Vec<&'a ClassifiedRecord> {
    records
        .iter()
        .filter(|r| matches(r, criteria, rules))
        .collect()
}

/// True when `record` satisfies every predicate of `criteria`.
pub fn matches(record: &ClassifiedRecord, criteria: &FilterCriteria, rules: &RuleSet) -> bool {
    if let Some(category) = criteria.category {
        if record.record.category != category {
            return false;
        }
    }
    if let Some(brand) = criteria.brand.as_deref() {
        if !matches_brand(record, brand, rules) {
            return false;
        }
    }
    if let Some(series) = criteria.series.as_deref() {
        if !matches_series(record, series, rules) {
            return false;
        }
    }
    if let Some(text) = criteria.free_text.as_deref() {
        if !matches_free_text(record, text) {
            return false;
        }
    }
    if let Some(bucket) = criteria.capacity_bucket {
        if !matches_capacity(record, bucket) {
            return false;
        }
    }
    true
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_brand(record: &ClassifiedRecord, brand: &str, rules: &RuleSet) -> bool {
    let effective = record.effective_brand();
    if effective.is_empty() {
        return false;
    }

    if let Some(composite) = rules.composite_brand(brand) {
        let canonical = rules.canonical_brand(effective);
        if !canonical.eq_ignore_ascii_case(&composite.brand) {
            return false;
        }
        let generation = record.record.generation_str();
        return composite
            .tokens
            .iter()
            .any(|t| contains_ci(generation, t) || contains_ci(&record.record.model, t));
    }

    contains_ci(effective, brand)
}

fn matches_series(record: &ClassifiedRecord, series: &str, rules: &RuleSet) -> bool {
    let model = record.record.model.to_lowercase();
    let generation = record.record.generation_str().to_lowercase();
    let sf = series.trim().to_lowercase();

    if record.record.category == Category::Storage {
        if let Some(kind) = StorageType::parse(&sf) {
            return record.storage_type.unwrap_or(StorageType::Other) == kind;
        }
        return generation.contains(&sf) || model.contains(&sf);
    }

    if let Some(rule) = rules.series_rule(&sf) {
        let applies = match rule.brand.as_deref() {
            Some(brand) => rules
                .canonical_brand(record.effective_brand())
                .eq_ignore_ascii_case(brand),
            None => true,
        };
        if applies {
            let has = |t: &String| {
                let t = t.to_lowercase();
                generation.contains(&t) || model.contains(&t)
            };
            let included = rule.include.is_empty() || rule.include.iter().any(has);
            return included && !rule.exclude.iter().any(has);
        }
    }

    generation.contains(&sf) || model.contains(&sf)
}

fn matches_free_text(record: &ClassifiedRecord, text: &str) -> bool {
    contains_ci(&record.record.model, text)
        || contains_ci(record.effective_brand(), text)
        || contains_ci(record.record.generation_str(), text)
}

fn matches_capacity(record: &ClassifiedRecord, bucket: CapacityBucket) -> bool {
    if record.record.category != Category::Storage {
        return true;
    }
    match record.capacity_gb_resolved {
        Some(gb) if gb > 0 => bucket.contains(gb),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::classify::classify_all;
    use crate::models::HardwareRecord;
    use crate::strategy;

    fn catalog() -> Vec<ClassifiedRecord> {
        let rules = RuleSet::default();
        classify_all(
            &[
                HardwareRecord::new(Category::Cpu, "Core i9-14900K", "Intel")
                    .with_generation("14th Gen"),
                HardwareRecord::new(Category::Cpu, "Core Ultra 9 285K", "Intel")
                    .with_generation("Core Ultra 200S"),
                HardwareRecord::new(Category::Cpu, "Ryzen 7 7800X3D", "AMD"),
                HardwareRecord::new(Category::Gpu, "GeForce RTX 4090", "NVIDIA"),
                HardwareRecord::new(Category::Gpu, "GeForce GTX 1660 Super", "NVIDIA"),
                HardwareRecord::new(Category::Gpu, "Radeon RX 7900 XTX", ""),
                HardwareRecord::new(Category::Storage, "Samsung 990 PRO 2TB", "Samsung")
                    .with_generation("NVMe Gen4"),
                HardwareRecord::new(Category::Storage, "Crucial MX500 500GB SATA SSD", "Crucial"),
                HardwareRecord::new(Category::Storage, "Seagate Barracuda", "Seagate")
                    .with_generation("HDD"),
            ],
            &rules,
        )
    }

    fn models(out: &[&ClassifiedRecord]) -> Vec<String> {
        out.iter().map(|r| r.record.model.clone()).collect()
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let records = catalog();
        let out = filter(&records, &FilterCriteria::default(), &RuleSet::default());
        assert_eq!(out.len(), records.len());
        for (a, b) in out.iter().zip(records.iter()) {
            assert_eq!(a.record.model, b.record.model);
        }
    }

    #[test]
    fn test_category_and_brand_combine() {
        let records = catalog();
        let rules = RuleSet::default();
        let criteria = FilterCriteria {
            category: Some(Category::Gpu),
            brand: Some("amd".into()),
            ..Default::default()
        };
        // Empty explicit brand falls back to the inferred one.
        assert_eq!(models(&filter(&records, &criteria, &rules)), vec!["Radeon RX 7900 XTX"]);
    }

    #[test]
    fn test_composite_brand_requires_token() {
        let records = catalog();
        let rules = RuleSet::default();
        let criteria = FilterCriteria {
            brand: Some("intel-ultra".into()),
            ..Default::default()
        };
        assert_eq!(models(&filter(&records, &criteria, &rules)), vec!["Core Ultra 9 285K"]);
    }

    #[test]
    fn test_series_core_excludes_ultra() {
        let records = catalog();
        let rules = RuleSet::default();
        let criteria = FilterCriteria {
            category: Some(Category::Cpu),
            series: Some("core".into()),
            ..Default::default()
        };
        assert_eq!(models(&filter(&records, &criteria, &rules)), vec!["Core i9-14900K"]);

        let criteria = FilterCriteria {
            series: Some("ultra".into()),
            ..criteria
        };
        assert_eq!(models(&filter(&records, &criteria, &rules)), vec!["Core Ultra 9 285K"]);
    }

    #[test]
    fn test_series_rtx_and_storage_type() {
        let records = catalog();
        let rules = RuleSet::default();
        let rtx = FilterCriteria {
            series: Some("RTX".into()),
            ..Default::default()
        };
        assert_eq!(models(&filter(&records, &rtx, &rules)), vec!["GeForce RTX 4090"]);

        let sata = FilterCriteria {
            category: Some(Category::Storage),
            series: Some("sata".into()),
            ..Default::default()
        };
        assert_eq!(
            models(&filter(&records, &sata, &rules)),
            vec!["Crucial MX500 500GB SATA SSD"]
        );
    }

    #[test]
    fn test_free_text_matches_any_field() {
        let records = catalog();
        let rules = RuleSet::default();
        let by_gen = FilterCriteria {
            free_text: Some("14th".into()),
            ..Default::default()
        };
        assert_eq!(models(&filter(&records, &by_gen, &rules)), vec!["Core i9-14900K"]);

        let by_brand = FilterCriteria {
            free_text: Some("seagate".into()),
            ..Default::default()
        };
        assert_eq!(models(&filter(&records, &by_brand, &rules)), vec!["Seagate Barracuda"]);
    }

    #[test]
    fn test_capacity_bucket_excludes_unresolved() {
        let records = catalog();
        let rules = RuleSet::default();
        let small = FilterCriteria {
            category: Some(Category::Storage),
            capacity_bucket: Some(CapacityBucket::UpTo512),
            ..Default::default()
        };
        assert_eq!(
            models(&filter(&records, &small, &rules)),
            vec!["Crucial MX500 500GB SATA SSD"]
        );

        let mid = FilterCriteria {
            capacity_bucket: Some(CapacityBucket::UpTo2048),
            ..small
        };
        assert_eq!(models(&filter(&records, &mid, &rules)), vec!["Samsung 990 PRO 2TB"]);
    }

    #[test]
    fn test_capacity_bucket_ignores_other_categories() {
        let records = catalog();
        let rules = RuleSet::default();
        let criteria = FilterCriteria {
            capacity_bucket: Some(CapacityBucket::UpTo2048),
            ..Default::default()
        };
        let out = filter(&records, &criteria, &rules);
        assert_eq!(out.len(), 7);
        assert!(out.iter().any(|r| r.record.category == Category::Gpu));
        assert!(!models(&out).contains(&"Seagate Barracuda".to_string()));
        assert!(!models(&out).contains(&"Crucial MX500 500GB SATA SSD".to_string()));

        let gpus = FilterCriteria {
            category: Some(Category::Gpu),
            ..criteria
        };
        assert_eq!(filter(&records, &gpus, &rules).len(), 3);
    }

    #[test]
    fn test_unknown_series_value_is_substring() {
        let records = catalog();
        let rules = RuleSet::default();
        let criteria = FilterCriteria {
            series: Some("x3d".into()),
            ..Default::default()
        };
        assert_eq!(models(&filter(&records, &criteria, &rules)), vec!["Ryzen 7 7800X3D"]);
    }

    proptest! {
        #[test]
        fn test_default_criteria_keep_every_record(input in strategy::records(32)) {
            let rules = RuleSet::default();
            let records = classify_all(&input, &rules);
            let out = filter(&records, &FilterCriteria::default(), &rules);
            prop_assert_eq!(out.len(), records.len());
            for (a, b) in out.iter().zip(records.iter()) {
                prop_assert!(std::ptr::eq(*a, b));
            }
        }

        #[test]
        fn test_filter_output_is_ordered_subsequence(
            input in strategy::records(32),
            category in prop::option::of(strategy::category()),
            brand in prop::option::of(prop::sample::select(vec!["intel", "amd", "nvidia", "intel-ultra", "samsung"])),
            bucket in prop::option::of(prop::sample::select(vec![
                CapacityBucket::UpTo512,
                CapacityBucket::UpTo1024,
                CapacityBucket::UpTo2048,
            ])),
        ) {
            let rules = RuleSet::default();
            let records = classify_all(&input, &rules);
            let criteria = FilterCriteria {
                category,
                brand: brand.map(str::to_string),
                capacity_bucket: bucket,
                ..Default::default()
            };
            let out = filter(&records, &criteria, &rules);
            let mut rest = records.iter();
            for kept in &out {
                prop_assert!(matches(kept, &criteria, &rules));
                prop_assert!(rest.any(|r| std::ptr::eq(r, *kept)));
            }
        }
    }
}
