//! # RigBench
//!
//! **Assemble a hardware configuration from a catalog and look up game
//! performance benchmarks for it.**
//!
//! This crate wires the pure pipeline in [`rigbench_core`] to the outside
//! world: the hardware directory service, the bundled catalog snapshot,
//! and the benchmark/bottleneck-analysis service.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────┐   ┌──────────────┐
//! │  Directory   │──▶│ classify ▶ filter ▶ rank │──▶│ SelectionSet │
//! │ HTTP / seed  │   │      (rigbench-core)     │   └──────┬───────┘
//! └──────────────┘   └──────────────────────────┘          │
//!                                                          ▼
//!                    ┌──────────────┐   ┌──────────────────────────┐
//!                    │  Benchmark   │◀──│ SearchController         │
//!                    │  service     │   │ (generation sequencing)  │
//!                    └──────────────┘   └──────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and validation |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`seed`] | Bundled catalog snapshot |
//! | [`catalog`] | Directory client, fallback refresh, `rig catalog` / `rig brands` |
//! | [`benchmark`] | Benchmark service client and error model |
//! | [`search`] | Search controller and `rig search` |
//!
//! ## Quick Start
//!
//! ```bash
//! rig catalog --category gpu --brand nvidia
//! rig brands --category storage --offline
//! rig search --game "Cyberpunk 2077" --resolution 1440p --cpu "Ryzen 7 7800X3D" --gpu "RTX 4070"
//! ```

pub mod benchmark;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod search;
pub mod seed;
