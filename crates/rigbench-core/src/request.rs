//! Search configuration and the benchmark service's request payload.
//!
//! A [`SearchConfiguration`] gathers everything the user picked: games,
//! resolution, the [`SelectionSet`], a [`MemoryDescriptor`] and an
//! optional coarse [`StorageProfile`]. [`validate`](SearchConfiguration::validate)
//! rejects configurations the service cannot analyse, and
//! [`to_payload`](SearchConfiguration::to_payload) produces the JSON body.
//!
//! # Memory presets
//!
//! | Type | CAS latency | Speed (MT/s) |
//! |------|-------------|--------------|
//! | DDR4 | 10–22 | 1600–4000 |
//! | DDR5 | 28–40 | 4800–8000 |
//! | LPDDR5 | 28–40 | 3200–6400 |
//!
//! Speeds move in steps of 100 MT/s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::Category;
use crate::selection::SelectionSet;

pub const SPEED_STEP_MT_S: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryKind {
    #[serde(rename = "DDR4")]
    Ddr4,
    #[serde(rename = "DDR5")]
    Ddr5,
    #[serde(rename = "LPDDR5")]
    Lpddr5,
}

/// Allowed latency and speed range for one memory type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryPreset {
    pub latency_cl: (u32, u32),
    pub speed_mt_s: (u32, u32),
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::Ddr4 => "DDR4",
            MemoryKind::Ddr5 => "DDR5",
            MemoryKind::Lpddr5 => "LPDDR5",
        }
    }

    pub fn preset(&self) -> MemoryPreset {
        match self {
            MemoryKind::Ddr4 => MemoryPreset {
                latency_cl: (10, 22),
                speed_mt_s: (1600, 4000),
            },
            MemoryKind::Ddr5 => MemoryPreset {
                latency_cl: (28, 40),
                speed_mt_s: (4800, 8000),
            },
            MemoryKind::Lpddr5 => MemoryPreset {
                latency_cl: (28, 40),
                speed_mt_s: (3200, 6400),
            },
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DDR4" => Ok(MemoryKind::Ddr4),
            "DDR5" => Ok(MemoryKind::Ddr5),
            "LPDDR5" => Ok(MemoryKind::Lpddr5),
            other => anyhow::bail!("Unknown memory type: '{}'. Expected DDR4, DDR5 or LPDDR5.", other),
        }
    }
}

impl MemoryPreset {
    pub fn latency_options(&self) -> impl Iterator<Item = u32> {
        self.latency_cl.0..=self.latency_cl.1
    }

    pub fn speed_options(&self) -> impl Iterator<Item = u32> {
        (self.speed_mt_s.0..=self.speed_mt_s.1).step_by(SPEED_STEP_MT_S as usize)
    }

    pub fn allows_latency(&self, cl: u32) -> bool {
        cl >= self.latency_cl.0 && cl <= self.latency_cl.1
    }

    pub fn allows_speed(&self, mt_s: u32) -> bool {
        mt_s >= self.speed_mt_s.0
            && mt_s <= self.speed_mt_s.1
            && (mt_s - self.speed_mt_s.0) % SPEED_STEP_MT_S == 0
    }
}

/// Memory subsystem: capacity, type, speed and latency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryDescriptor {
    pub capacity_gb: u32,
    pub kind: MemoryKind,
    pub speed_mt_s: u32,
    pub latency_cl: u32,
}

impl MemoryDescriptor {
    /// Descriptor at the type's first latency and speed.
    pub fn for_kind(kind: MemoryKind, capacity_gb: u32) -> Self {
        let preset = kind.preset();
        Self {
            capacity_gb,
            kind,
            speed_mt_s: preset.speed_mt_s.0,
            latency_cl: preset.latency_cl.0,
        }
    }

    /// Switch type, resetting latency and speed to the new type's first values.
    pub fn set_kind(&mut self, kind: MemoryKind) {
        *self = Self::for_kind(kind, self.capacity_gb);
    }

    /// Display name sent as the synthetic memory entry's model.
    pub fn model_label(&self) -> String {
        format!(
            "{} {}GB {}MHz CL{}",
            self.kind, self.capacity_gb, self.speed_mt_s, self.latency_cl
        )
    }
}

impl Default for MemoryDescriptor {
    fn default() -> Self {
        Self::for_kind(MemoryKind::Ddr5, 16)
    }
}

/// Coarse storage choice added to a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageProfile {
    NvmeGen3,
    NvmeGen4,
    NvmeGen5,
    Sata,
    Hdd,
}

impl StorageProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProfile::NvmeGen3 => "nvme-gen3",
            StorageProfile::NvmeGen4 => "nvme-gen4",
            StorageProfile::NvmeGen5 => "nvme-gen5",
            StorageProfile::Sata => "sata",
            StorageProfile::Hdd => "hdd",
        }
    }

    /// Label used as both model and storage type in the payload.
    pub fn label(&self) -> &'static str {
        match self {
            StorageProfile::NvmeGen3 => "NVMe GEN3",
            StorageProfile::NvmeGen4 => "NVMe GEN4",
            StorageProfile::NvmeGen5 => "NVMe GEN5",
            StorageProfile::Sata => "SATA",
            StorageProfile::Hdd => "HDD",
        }
    }
}

impl FromStr for StorageProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nvme-gen3" | "gen3" => Ok(StorageProfile::NvmeGen3),
            "nvme-gen4" | "gen4" | "nvme" => Ok(StorageProfile::NvmeGen4),
            "nvme-gen5" | "gen5" => Ok(StorageProfile::NvmeGen5),
            "sata" => Ok(StorageProfile::Sata),
            "hdd" => Ok(StorageProfile::Hdd),
            other => anyhow::bail!(
                "Unknown storage profile: '{}'. Expected nvme-gen3, nvme-gen4, nvme-gen5, sata or hdd.",
                other
            ),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("select at least one hardware item")]
    NoHardware,
    #[error("select at least one CPU; bottleneck analysis is unreliable without one")]
    NoCpu,
    #[error("CL{latency} is outside the {kind} range {min}-{max}")]
    LatencyOutOfRange {
        kind: MemoryKind,
        latency: u32,
        min: u32,
        max: u32,
    },
    #[error("{speed} MT/s is not a valid {kind} speed ({min}-{max}, step {step})")]
    SpeedOutOfRange {
        kind: MemoryKind,
        speed: u32,
        min: u32,
        max: u32,
        step: u32,
    },
}

/// Everything needed for one benchmark search.
#[derive(Debug, Clone, Default)]
pub struct SearchConfiguration {
    pub game: String,
    pub games: Vec<String>,
    pub resolution: String,
    pub settings: Option<String>,
    pub memory: MemoryDescriptor,
    pub storage_profile: Option<StorageProfile>,
    pub selections: SelectionSet,
}

impl SearchConfiguration {
    /// Check the configuration before submission.
    ///
    /// The synthetic memory entry alone does not count as hardware.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.selections.is_empty() && self.storage_profile.is_none() {
            return Err(ConfigurationError::NoHardware);
        }
        if self.selections.of_category(Category::Cpu).next().is_none() {
            return Err(ConfigurationError::NoCpu);
        }

        let preset = self.memory.kind.preset();
        if !preset.allows_latency(self.memory.latency_cl) {
            return Err(ConfigurationError::LatencyOutOfRange {
                kind: self.memory.kind,
                latency: self.memory.latency_cl,
                min: preset.latency_cl.0,
                max: preset.latency_cl.1,
            });
        }
        if !preset.allows_speed(self.memory.speed_mt_s) {
            return Err(ConfigurationError::SpeedOutOfRange {
                kind: self.memory.kind,
                speed: self.memory.speed_mt_s,
                min: preset.speed_mt_s.0,
                max: preset.speed_mt_s.1,
                step: SPEED_STEP_MT_S,
            });
        }
        Ok(())
    }

    /// Build the request body.
    ///
    /// Hardware entries are the selected GPUs, then CPUs, then the
    /// synthetic memory entry, then the storage profile and any selected
    /// storage records.
    pub fn to_payload(&self) -> SearchPayload {
        let mut hardware = Vec::with_capacity(self.selections.len() + 2);

        for category in [Category::Gpu, Category::Cpu] {
            for item in self.selections.of_category(category) {
                hardware.push(HardwareEntry {
                    category,
                    model: item.record.model.clone(),
                    selected_vram_gb: if category == Category::Gpu {
                        item.selected_vram_gb
                    } else {
                        None
                    },
                    ..HardwareEntry::bare(category, "")
                });
            }
        }

        hardware.push(HardwareEntry {
            ram_gb: Some(self.memory.capacity_gb),
            ram_type: Some(self.memory.kind),
            ram_speed_mhz: Some(self.memory.speed_mt_s),
            ram_latency_ns: Some(self.memory.latency_cl),
            ..HardwareEntry::bare(Category::Ram, self.memory.model_label())
        });

        if let Some(profile) = self.storage_profile {
            hardware.push(HardwareEntry {
                storage_type: Some(profile.label().to_string()),
                ..HardwareEntry::bare(Category::Storage, profile.label())
            });
        }
        for item in self.selections.of_category(Category::Storage) {
            hardware.push(HardwareEntry {
                storage_type: Some(
                    item.record
                        .generation
                        .clone()
                        .filter(|g| !g.trim().is_empty())
                        .unwrap_or_else(|| "SSD".to_string()),
                ),
                ..HardwareEntry::bare(Category::Storage, item.record.model.clone())
            });
        }

        SearchPayload {
            game: self.game.clone(),
            games: self.games.clone(),
            resolution: self.resolution.clone(),
            settings: self.settings.clone(),
            min_ram_gb: self.memory.capacity_gb,
            ram_type: self.memory.kind,
            ram_cl: self.memory.latency_cl,
            ram_freq_mt_s: self.memory.speed_mt_s,
            hardware,
        }
    }
}

/// JSON body of `POST /api/benchmarks/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPayload {
    pub game: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<String>,
    pub resolution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,
    pub min_ram_gb: u32,
    pub ram_type: MemoryKind,
    pub ram_cl: u32,
    pub ram_freq_mt_s: u32,
    pub hardware: Vec<HardwareEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareEntry {
    pub category: Category,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_vram_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_type: Option<MemoryKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_speed_mhz: Option<u32>,
    // The service names this field in ns but reads it as CAS latency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_latency_ns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
}

impl HardwareEntry {
    fn bare(category: Category, model: impl Into<String>) -> Self {
        Self {
            category,
            model: model.into(),
            selected_vram_gb: None,
            ram_gb: None,
            ram_type: None,
            ram_speed_mhz: None,
            ram_latency_ns: None,
            storage_type: None,
        }
    }
}
