//! The user's chosen hardware items.
//!
//! A [`SelectionSet`] is an ordered sequence keyed by `(category, model)`,
//! with runs of whitespace in the model collapsed.
//! Items are only changed through [`toggle`](SelectionSet::toggle),
//! [`remove`](SelectionSet::remove),
//! [`set_sub_attribute`](SelectionSet::set_sub_attribute) and
//! [`add_custom`](SelectionSet::add_custom); no operation can introduce
//! a duplicate identity. A removed item that is added again goes to the
//! end of the sequence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{infer_brand, normalize_model, parse_capacity_gb, UNKNOWN_BRAND};
use crate::models::{Category, HardwareRecord};
use crate::rules::RuleSet;

/// A selected record plus its chosen sub-attribute (VRAM size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedItem {
    #[serde(flatten)]
    pub record: HardwareRecord,
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_vram_gb: Option<f64>,
}

impl SelectedItem {
    /// Wrap a record, defaulting the sub-attribute to the first offered
    /// option, else the record's single value.
    pub fn new(record: HardwareRecord) -> Self {
        let selected_vram_gb = record
            .vram_options
            .as_ref()
            .and_then(|opts| opts.first().copied())
            .or(record.vram_gb);
        Self {
            record,
            selected: true,
            selected_vram_gb,
        }
    }
}

/// Outcome of [`SelectionSet::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("model name is required")]
    EmptyModel,
    #[error("{category} '{model}' is already selected")]
    Duplicate { category: Category, model: String },
}

/// A hand-typed entry for hardware missing from the catalog.
#[derive(Debug, Clone, Default)]
pub struct CustomEntry {
    pub model: String,
    pub brand: Option<String>,
    pub generation: Option<String>,
    pub release_year: Option<i32>,
    pub vram_gb: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionSet {
    items: Vec<SelectedItem>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the item with the same identity, or append it.
    pub fn toggle(&mut self, record: &HardwareRecord) -> Toggle {
        match self.position(record.category, &record.model) {
            Some(idx) => {
                self.items.remove(idx);
                Toggle::Removed
            }
            None => {
                self.items.push(SelectedItem::new(record.clone()));
                Toggle::Added
            }
        }
    }

    /// Remove the item at `index`. Out-of-range indices are ignored.
    pub fn remove(&mut self, index: usize) -> Option<SelectedItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Replace the sub-attribute of the item at `index` only.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn set_sub_attribute(&mut self, index: usize, value: Option<f64>) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.selected_vram_gb = value;
                true
            }
            None => false,
        }
    }

    /// Append a hand-typed record.
    ///
    /// The brand is the given one, else inferred from the model, else
    /// `"Unknown"`. Storage capacity is taken from the model text.
    pub fn add_custom(
        &mut self,
        category: Category,
        entry: CustomEntry,
        rules: &RuleSet,
    ) -> Result<&SelectedItem, SelectionError> {
        let model = normalize_model(&entry.model);
        if model.is_empty() {
            return Err(SelectionError::EmptyModel);
        }
        if self.position(category, &model).is_some() {
            return Err(SelectionError::Duplicate { category, model });
        }

        let brand = entry
            .brand
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| {
                let inferred = infer_brand(&model, rules);
                if inferred.is_empty() {
                    UNKNOWN_BRAND.to_string()
                } else {
                    inferred
                }
            });

        let mut record = HardwareRecord::new(category, model, brand);
        record.generation = entry
            .generation
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        record.release_year = entry.release_year;
        if category == Category::Gpu {
            record.vram_gb = entry.vram_gb.filter(|v| *v > 0.0);
        }
        if category == Category::Storage {
            record.capacity_gb = parse_capacity_gb(&record.model).map(|gb| gb as f64);
        }

        self.items.push(SelectedItem::new(record));
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn contains(&self, category: Category, model: &str) -> bool {
        self.position(category, model).is_some()
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedItem> {
        self.items.iter()
    }

    /// Selected items of one category, in selection order.
    pub fn of_category(&self, category: Category) -> impl Iterator<Item = &SelectedItem> {
        self.items.iter().filter(move |i| i.record.category == category)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Identity match on category and whitespace-normalized model.
    fn position(&self, category: Category, model: &str) -> Option<usize> {
        let model = normalize_model(model);
        self.items
            .iter()
            .position(|i| i.record.category == category && normalize_model(&i.record.model) == model)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::HashSet;

    use super::*;

    fn gpu(model: &str) -> HardwareRecord {
        HardwareRecord::new(Category::Gpu, model, "NVIDIA")
    }

    fn models(set: &SelectionSet) -> Vec<&str> {
        set.iter().map(|i| i.record.model.as_str()).collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        assert_eq!(set.toggle(&gpu("RTX 4090")), Toggle::Added);
        assert!(set.items()[0].selected);
        assert_eq!(set.toggle(&gpu("RTX 4090")), Toggle::Removed);
        assert!(set.is_empty());
    }

    #[test]
    fn test_readd_moves_to_end() {
        let mut set = SelectionSet::new();
        set.toggle(&gpu("RTX 4090"));
        set.toggle(&gpu("RTX 4080"));
        set.toggle(&HardwareRecord::new(Category::Cpu, "Ryzen 7 7800X3D", "AMD"));
        set.toggle(&gpu("RTX 4090"));
        set.toggle(&gpu("RTX 4090"));
        assert_eq!(models(&set), vec!["RTX 4080", "Ryzen 7 7800X3D", "RTX 4090"]);
    }

    #[test]
    fn test_same_model_different_category_is_distinct() {
        let mut set = SelectionSet::new();
        set.toggle(&gpu("Arc A770"));
        set.toggle(&HardwareRecord::new(Category::Cpu, "Arc A770", "Intel"));
        assert_eq!(set.len(), 2);
        assert!(set.contains(Category::Cpu, "Arc A770"));
    }

    #[test]
    fn test_toggle_identity_ignores_whitespace_runs() {
        let mut set = SelectionSet::new();
        set.toggle(&gpu("RTX  4090"));
        assert!(set.contains(Category::Gpu, "RTX 4090"));
        assert_eq!(set.toggle(&gpu(" RTX 4090")), Toggle::Removed);
        assert!(set.is_empty());
    }

    #[test]
    fn test_add_custom_rejects_unnormalized_duplicate() {
        let rules = RuleSet::default();
        let mut set = SelectionSet::new();
        set.toggle(&HardwareRecord::new(Category::Cpu, "Ryzen 5  5600", "AMD"));

        let err = set
            .add_custom(
                Category::Cpu,
                CustomEntry {
                    model: "Ryzen 5 5600".into(),
                    ..Default::default()
                },
                &rules,
            )
            .unwrap_err();
        assert!(matches!(err, SelectionError::Duplicate { .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_default_sub_attribute() {
        let mut set = SelectionSet::new();
        set.toggle(&gpu("RTX 4060 Ti").with_vram_options(vec![8.0, 16.0]).with_vram_gb(16.0));
        set.toggle(&gpu("RTX 4090").with_vram_gb(24.0));
        set.toggle(&gpu("Mystery"));
        let vram: Vec<_> = set.iter().map(|i| i.selected_vram_gb).collect();
        assert_eq!(vram, vec![Some(8.0), Some(24.0), None]);
    }

    #[test]
    fn test_set_sub_attribute_touches_only_target() {
        let mut set = SelectionSet::new();
        set.toggle(&gpu("RTX 4060 Ti").with_vram_options(vec![8.0, 16.0]));
        set.toggle(&gpu("RTX 4090").with_vram_gb(24.0));
        let before = set.items()[1].clone();

        assert!(set.set_sub_attribute(0, Some(16.0)));
        assert_eq!(set.items()[0].selected_vram_gb, Some(16.0));
        assert_eq!(set.items()[1], before);
        assert_eq!(models(&set), vec!["RTX 4060 Ti", "RTX 4090"]);
        assert!(!set.set_sub_attribute(5, Some(8.0)));
    }

    #[test]
    fn test_remove_by_index() {
        let mut set = SelectionSet::new();
        set.toggle(&gpu("A"));
        set.toggle(&gpu("B"));
        assert_eq!(set.remove(0).map(|i| i.record.model), Some("A".to_string()));
        assert!(set.remove(3).is_none());
        assert_eq!(models(&set), vec!["B"]);
    }

    #[test]
    fn test_add_custom() {
        let rules = RuleSet::default();
        let mut set = SelectionSet::new();

        let item = set
            .add_custom(
                Category::Storage,
                CustomEntry {
                    model: "  WD Black  SN850X 2TB ".into(),
                    ..Default::default()
                },
                &rules,
            )
            .unwrap();
        assert_eq!(item.record.model, "WD Black SN850X 2TB");
        assert_eq!(item.record.brand, "Western Digital");
        assert_eq!(item.record.capacity_gb, Some(2000.0));

        let item = set
            .add_custom(
                Category::Gpu,
                CustomEntry {
                    model: "Prototype X".into(),
                    vram_gb: Some(12.0),
                    ..Default::default()
                },
                &rules,
            )
            .unwrap();
        assert_eq!(item.record.brand, "Unknown");
        assert_eq!(item.selected_vram_gb, Some(12.0));

        let err = set
            .add_custom(
                Category::Gpu,
                CustomEntry {
                    model: "Prototype X".into(),
                    ..Default::default()
                },
                &rules,
            )
            .unwrap_err();
        assert!(matches!(err, SelectionError::Duplicate { .. }));

        let err = set
            .add_custom(Category::Cpu, CustomEntry::default(), &rules)
            .unwrap_err();
        assert_eq!(err, SelectionError::EmptyModel);
        assert_eq!(set.len(), 2);
    }

    fn pool() -> Vec<HardwareRecord> {
        vec![
            gpu("RTX 4090"),
            gpu("RTX  4090"),
            gpu("RTX 4080"),
            gpu("Arc A770"),
            HardwareRecord::new(Category::Cpu, "Arc A770", "Intel"),
            HardwareRecord::new(Category::Cpu, "Ryzen 7 7800X3D", ""),
            HardwareRecord::new(Category::Storage, "990 PRO 2TB", "Samsung"),
            HardwareRecord::new(Category::Ram, "Vengeance 32GB", "Corsair"),
        ]
    }

    #[derive(Debug, Clone)]
    enum Op {
        Toggle(usize),
        Remove(usize),
        Custom(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0..8usize).prop_map(Op::Toggle),
            1 => (0..10usize).prop_map(Op::Remove),
            1 => (0..8usize).prop_map(Op::Custom),
        ]
    }

    proptest! {
        #[test]
        fn test_operation_sequences_never_duplicate(ops in prop::collection::vec(op(), 0..200)) {
            let rules = RuleSet::default();
            let pool = pool();
            let mut set = SelectionSet::new();
            for op in ops {
                match op {
                    Op::Toggle(i) => {
                        set.toggle(&pool[i]);
                    }
                    Op::Remove(i) => {
                        set.remove(i);
                    }
                    Op::Custom(i) => {
                        let entry = CustomEntry {
                            model: pool[i].model.clone(),
                            ..Default::default()
                        };
                        let _ = set.add_custom(pool[i].category, entry, &rules);
                    }
                }
                let ids: HashSet<_> = set
                    .iter()
                    .map(|i| (i.record.category, normalize_model(&i.record.model)))
                    .collect();
                prop_assert_eq!(ids.len(), set.len());
            }
        }

        #[test]
        fn test_double_toggle_restores_membership(ops in prop::collection::vec(0..8usize, 0..50), last in 0..8usize) {
            let pool = pool();
            let mut set = SelectionSet::new();
            for i in ops {
                set.toggle(&pool[i]);
            }
            let before = set.contains(pool[last].category, &pool[last].model);
            set.toggle(&pool[last]);
            set.toggle(&pool[last]);
            prop_assert_eq!(set.contains(pool[last].category, &pool[last].model), before);
        }
    }
}
