//! `proptest` generators for catalog records.

use proptest::prelude::*;

use crate::models::{Category, HardwareRecord, SortKey};

const PREFIXES: &[&str] = &[
    "",
    "Core i7-",
    "Core i5-",
    "Core Ultra 9",
    "Ryzen 9",
    "Ryzen 5",
    "Pentium Gold",
    "GeForce RTX",
    "GeForce GTX",
    "Radeon RX",
    "Arc B",
    "Samsung 990 PRO",
    "WD Black SN",
    "Barracuda",
    "Vengeance",
    "Mystery",
];

const SUFFIXES: &[&str] = &[
    "", "K", "KF", "KS", "X", "X3D", "F", " Ti", " Super", " XTX", " XT", " 2TB", " 500GB", " SATA SSD",
    " NVMe", " 32GB",
];

const BRANDS: &[&str] = &["", "Intel", "AMD", "NVIDIA", "Samsung", "western digital", "Corsair", "Zotac"];

const GENERATIONS: &[&str] = &["14th Gen", "Core Ultra 200S", "NVMe Gen4", "HDD", "DDR5", "Zen 4"];

pub fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

/// Model text built from real product-name fragments, with an optional
/// model number and occasional doubled whitespace.
pub fn model() -> impl Strategy<Value = String> {
    (
        prop::sample::select(PREFIXES),
        prop::option::of(0u32..20_000),
        prop::sample::select(SUFFIXES),
        any::<bool>(),
    )
        .prop_map(|(prefix, number, suffix, doubled)| {
            let sep = if doubled { "  " } else { " " };
            let number = number.map(|n| n.to_string()).unwrap_or_default();
            format!("{}{}{}{}", prefix, sep, number, suffix).trim().to_string()
        })
        .prop_filter("model must not be blank", |m| !m.is_empty())
}

pub fn record() -> impl Strategy<Value = HardwareRecord> {
    (
        category(),
        model(),
        prop::sample::select(BRANDS),
        prop::option::of(prop::sample::select(GENERATIONS)),
        prop::option::of(2010i32..2026),
        prop::option::of(prop::sample::select(vec![0.0, 256.0, 500.0, 1024.0, 2000.0, 4000.0, 20_000.0])),
        prop::option::of(prop::sample::select(vec![4.0, 8.0, 12.0, 16.0, 24.0])),
    )
        .prop_map(|(category, model, brand, generation, year, capacity, vram)| {
            let mut record = HardwareRecord::new(category, model, brand);
            record.generation = generation.map(str::to_string);
            record.release_year = year;
            record.capacity_gb = capacity;
            record.vram_gb = vram;
            record
        })
}

pub fn records(max: usize) -> impl Strategy<Value = Vec<HardwareRecord>> {
    prop::collection::vec(record(), 0..max)
}

pub fn sort_key() -> impl Strategy<Value = SortKey> {
    prop::sample::select(vec![
        SortKey::Default,
        SortKey::ModelAsc,
        SortKey::ModelDesc,
        SortKey::BrandAsc,
        SortKey::BrandDesc,
        SortKey::YearDesc,
        SortKey::YearAsc,
        SortKey::VramDesc,
        SortKey::VramAsc,
        SortKey::CapacityDesc,
        SortKey::CapacityAsc,
    ])
}
