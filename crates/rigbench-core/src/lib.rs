//! # RigBench Core
//!
//! Pure catalog pipeline and request sequencing for RigBench: data
//! models, heuristic rule tables, classification, filtering, ranking,
//! selection, and the generation-tagged search sequencer.
//!
//! This crate contains no tokio, reqwest, or other runtime dependencies.
//! Everything is synchronous except the [`catalog::CatalogSource`] seam,
//! which the application crate implements over HTTP.
//!
//! ```text
//! records ─▶ classify ─▶ filter ─▶ rank ─▶ SelectionSet ─▶ SearchConfiguration ─▶ sequencer
//! ```

pub mod browse;
pub mod catalog;
pub mod classify;
pub mod filter;
pub mod models;
pub mod rank;
pub mod request;
pub mod rules;
pub mod selection;
pub mod sequencer;

#[cfg(test)]
mod strategy;
