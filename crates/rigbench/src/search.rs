//! Benchmark search: the submission controller and `rig search`.
//!
//! [`SearchController`] owns a [`RequestSequencer`] and the last applied
//! results. Each [`submit`](SearchController::submit) supersedes the
//! previous request; its response is applied only if no newer submission
//! has started in the meantime.
//!
//! # CLI
//!
//! ```bash
//! rig search --game "Cyberpunk 2077" --resolution 1440p \
//!     --cpu "Ryzen 7 7800X3D" --gpu "RTX 4070 Ti SUPER" --vram 16 \
//!     --ram-gb 32 --ram-type DDR5 --ram-cl 30 --ram-speed 6000 --storage nvme-gen4
//! ```

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rigbench_core::browse::BrowseState;
use rigbench_core::classify::normalize_model;
use rigbench_core::models::{BenchmarkResult, Category, HardwareRecord};
use rigbench_core::request::{ConfigurationError, MemoryDescriptor, MemoryKind, SearchConfiguration, StorageProfile};
use rigbench_core::selection::{CustomEntry, SelectionSet};
use rigbench_core::sequencer::{Completion, RequestSequencer, Settlement};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::benchmark::{BenchmarkService, HttpBenchmarkService, SearchCancel};
use crate::catalog::refresh_catalog;
use crate::config::Config;

#[derive(Default)]
struct ControllerState {
    sequencer: RequestSequencer<SearchCancel>,
    results: Vec<BenchmarkResult>,
    last_error: Option<String>,
}

/// Submits searches and keeps only the newest response.
pub struct SearchController<S> {
    service: Arc<S>,
    state: Mutex<ControllerState>,
}

impl<S: BenchmarkService> SearchController<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
            state: Mutex::new(ControllerState::default()),
        }
    }

    /// Validate, submit and settle one search.
    ///
    /// Returns `Discarded` when a newer submission started while this one
    /// was in flight; controller state is untouched in that case.
    pub async fn submit(
        &self,
        config: &SearchConfiguration,
    ) -> Result<Settlement<Vec<BenchmarkResult>>, ConfigurationError> {
        config.validate()?;
        let payload = config.to_payload();

        let envelope = {
            let mut state = self.state.lock();
            state.last_error = None;
            state.sequencer.begin(SearchCancel::new())
        };
        debug!(generation = envelope.generation, "search submitted");

        let completion = match self.service.search(&payload, envelope.cancel.token()).await {
            Ok(response) => Completion::Succeeded(response.results),
            Err(e) if e.is_cancellation() => Completion::Cancelled,
            Err(e) => Completion::Failed(e.to_string()),
        };

        let mut state = self.state.lock();
        let settlement = state.sequencer.settle(envelope.generation, completion);
        match &settlement {
            Settlement::Applied(results) => {
                info!(generation = envelope.generation, count = results.len(), "search results applied");
                state.results = results.clone();
            }
            Settlement::Failed(message) => {
                warn!(generation = envelope.generation, error = %message, "search failed");
                state.last_error = Some(message.clone());
            }
            Settlement::Cancelled => {
                debug!(generation = envelope.generation, "search cancelled");
            }
            Settlement::Discarded => {
                debug!(generation = envelope.generation, "stale search response discarded");
            }
        }
        Ok(settlement)
    }

    /// Cancel the active search, if any. Its response will be discarded.
    pub fn cancel(&self) {
        self.state.lock().sequencer.cancel_active();
    }

    pub fn results(&self) -> Vec<BenchmarkResult> {
        self.state.lock().results.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.lock().last_error.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.lock().sequencer.is_in_flight()
    }
}

/// Arguments of `rig search`.
#[derive(Debug, Clone, Default)]
pub struct SearchArgs {
    pub game: String,
    pub games: Vec<String>,
    pub resolution: String,
    pub settings: Option<String>,
    pub cpu: Vec<String>,
    pub gpu: Vec<String>,
    pub vram: Option<f64>,
    pub ram_gb: Option<u32>,
    pub ram_type: Option<String>,
    pub ram_cl: Option<u32>,
    pub ram_speed: Option<u32>,
    pub storage: Option<String>,
    pub offline: bool,
}

fn find_record<'a>(records: &'a [HardwareRecord], category: Category, model: &str) -> Option<&'a HardwareRecord> {
    let wanted = normalize_model(model).to_lowercase();
    records
        .iter()
        .filter(|r| r.category == category)
        .find(|r| normalize_model(&r.model).to_lowercase() == wanted)
}

/// Select `model`, from the catalog when present, else as a custom entry.
fn select_model(
    selections: &mut SelectionSet,
    records: &[HardwareRecord],
    category: Category,
    model: &str,
    config: &Config,
) -> Result<usize> {
    match find_record(records, category, model) {
        Some(record) if !selections.contains(category, &record.model) => {
            selections.toggle(record);
        }
        Some(record) => anyhow::bail!("{} '{}' is already selected", category, record.model),
        None => {
            debug!(%category, model, "model not in catalog, adding custom entry");
            let entry = CustomEntry {
                model: model.to_string(),
                ..Default::default()
            };
            selections.add_custom(category, entry, &config.rules)?;
        }
    }
    Ok(selections.len() - 1)
}

fn memory_descriptor(args: &SearchArgs) -> Result<MemoryDescriptor> {
    let kind = match args.ram_type.as_deref() {
        Some(t) => t.parse::<MemoryKind>()?,
        None => MemoryKind::Ddr5,
    };
    let mut memory = MemoryDescriptor::for_kind(kind, args.ram_gb.unwrap_or(16));
    if let Some(cl) = args.ram_cl {
        memory.latency_cl = cl;
    }
    if let Some(speed) = args.ram_speed {
        memory.speed_mt_s = speed;
    }
    Ok(memory)
}

/// Build a [`SearchConfiguration`] from CLI arguments and catalog records.
pub fn build_configuration(args: &SearchArgs, records: &[HardwareRecord], config: &Config) -> Result<SearchConfiguration> {
    let mut selections = SelectionSet::new();

    for model in &args.gpu {
        let index = select_model(&mut selections, records, Category::Gpu, model, config)?;
        if let Some(vram) = args.vram {
            selections.set_sub_attribute(index, Some(vram));
        }
    }
    for model in &args.cpu {
        select_model(&mut selections, records, Category::Cpu, model, config)?;
    }

    let storage_profile = args
        .storage
        .as_deref()
        .map(str::parse::<StorageProfile>)
        .transpose()?;

    Ok(SearchConfiguration {
        game: args.game.trim().to_string(),
        games: args.games.iter().map(|g| g.trim().to_string()).filter(|g| !g.is_empty()).collect(),
        resolution: args.resolution.trim().to_string(),
        settings: args.settings.clone().filter(|s| !s.trim().is_empty()),
        memory: memory_descriptor(args)?,
        storage_profile,
        selections,
    })
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_else(|| "-".to_string())
}

/// Human-readable block for one result.
pub fn format_result(result: &BenchmarkResult) -> String {
    let mut out = format!(
        "{} @ {} {}\n  GPU: {}  CPU: {}\n  avg {} fps, 1% low {}, 0.1% low {}  (confidence {:.0}%)",
        result.game,
        result.resolution,
        result.settings,
        result.gpu,
        result.cpu,
        fmt_opt(result.avg_fps),
        fmt_opt(result.p1_low),
        fmt_opt(result.p0_1_low),
        result.confidence_score * 100.0
    );
    if result.is_incomplete {
        out.push_str("\n  (incomplete data)");
    }
    if !result.source.is_empty() {
        out.push_str(&format!("\n  source: {}", result.source));
    }
    if let (Some(required), Some(enough)) = (result.vram_required_gb, result.vram_is_enough) {
        out.push_str(&format!(
            "\n  VRAM: needs {:.1}GB, selected {}, {}",
            required,
            result
                .vram_selected_gb
                .map(|v| format!("{:.0}GB", v))
                .unwrap_or_else(|| "-".to_string()),
            if enough { "enough" } else { "not enough" }
        ));
    }
    if let Some(analysis) = &result.bottleneck_analysis {
        out.push_str(&format!(
            "\n  bottleneck: {} ({:.0}%)",
            analysis.bottleneck_type,
            analysis.confidence * 100.0
        ));
        if !analysis.reasoning.is_empty() {
            out.push_str(&format!("\n    {}", analysis.reasoning));
        }
        for rec in &analysis.recommendations {
            out.push_str(&format!("\n    - {}", rec));
        }
    }
    out
}

pub async fn run_search(config: &Config, args: &SearchArgs) -> Result<()> {
    let mut state = BrowseState::default();
    let snapshot = refresh_catalog(config, &mut state, args.offline).await?;
    let configuration = build_configuration(args, &snapshot.records, config)?;

    let service = HttpBenchmarkService::new(&config.benchmark).context("Failed to build benchmark client")?;
    let controller = SearchController::new(service);

    let settlement = tokio::select! {
        settlement = controller.submit(&configuration) => settlement?,
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
            Settlement::Cancelled
        }
    };

    match settlement {
        Settlement::Applied(results) => {
            if results.is_empty() {
                println!("No benchmark results.");
            }
            for result in &results {
                println!("{}\n", format_result(result));
            }
            Ok(())
        }
        Settlement::Failed(message) => anyhow::bail!("{}", message),
        Settlement::Cancelled | Settlement::Discarded => {
            println!("Search cancelled.");
            Ok(())
        }
    }
}
