//! # RigBench CLI (`rig`)
//!
//! ## Usage
//!
//! ```bash
//! rig --config ./config/rig.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rig catalog` | Browse the hardware catalog with filters and sorting |
//! | `rig brands` | List brand filter options for a category |
//! | `rig search` | Look up benchmarks for a hardware configuration |
//!
//! When the config file does not exist, built-in defaults are used
//! (directory and benchmark service on `http://127.0.0.1:8000`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rigbench::catalog::{run_brands, run_catalog, CatalogArgs};
use rigbench::config::{load_config, Config};
use rigbench::logging;
use rigbench::search::{run_search, SearchArgs};

/// RigBench CLI: browse a hardware catalog and look up game benchmarks.
#[derive(Parser)]
#[command(
    name = "rig",
    about = "Browse a hardware catalog and look up game benchmarks for a configuration",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rig.toml`. Built-in defaults apply when the
    /// file does not exist.
    #[arg(long, global = true, default_value = "./config/rig.toml")]
    config: PathBuf,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog records after classification, filtering and ranking.
    Catalog {
        /// Category: cpu, gpu, storage, ram (default: all).
        #[arg(long)]
        category: Option<String>,

        /// Brand filter (substring, or a composite key like `intel-ultra`).
        #[arg(long)]
        brand: Option<String>,

        /// Series filter (e.g. `core`, `rtx`, `nvme`, or any model substring).
        #[arg(long)]
        series: Option<String>,

        /// Free-text search over model, brand and generation.
        #[arg(long)]
        search: Option<String>,

        /// Storage capacity bucket: 0-512, 513-1024, 1025-2048, 2049-4096, 4097+.
        #[arg(long)]
        capacity: Option<String>,

        /// Sort key, e.g. `default`, `model-asc`, `year-desc`, `vram-desc`.
        #[arg(long)]
        sort: Option<String>,

        /// Skip the directory service and use the bundled snapshot.
        #[arg(long)]
        offline: bool,
    },

    /// List brand filter options.
    Brands {
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        offline: bool,
    },

    /// Look up benchmarks for a hardware configuration.
    Search {
        /// Game title.
        #[arg(long)]
        game: String,

        /// Additional game titles.
        #[arg(long = "also-game")]
        games: Vec<String>,

        /// Resolution, e.g. 1080p, 1440p, 4K.
        #[arg(long)]
        resolution: String,

        /// Graphics preset, e.g. high, ultra.
        #[arg(long)]
        settings: Option<String>,

        /// CPU model (repeatable).
        #[arg(long, required = true)]
        cpu: Vec<String>,

        /// GPU model (repeatable).
        #[arg(long)]
        gpu: Vec<String>,

        /// VRAM size in GB for the selected GPUs.
        #[arg(long)]
        vram: Option<f64>,

        /// Memory capacity in GB.
        #[arg(long)]
        ram_gb: Option<u32>,

        /// Memory type: DDR4, DDR5, LPDDR5.
        #[arg(long)]
        ram_type: Option<String>,

        /// CAS latency.
        #[arg(long)]
        ram_cl: Option<u32>,

        /// Memory speed in MT/s.
        #[arg(long)]
        ram_speed: Option<u32>,

        /// Storage profile: nvme-gen3, nvme-gen4, nvme-gen5, sata, hdd.
        #[arg(long)]
        storage: Option<String>,

        /// Resolve models against the bundled snapshot only.
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cfg = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        tracing::debug!(path = %cli.config.display(), "config file not found, using defaults");
        Config::minimal()
    };

    match cli.command {
        Commands::Catalog {
            category,
            brand,
            series,
            search,
            capacity,
            sort,
            offline,
        } => {
            let args = CatalogArgs {
                category,
                brand,
                series,
                search,
                capacity,
                sort,
                offline,
            };
            run_catalog(&cfg, &args).await?;
        }
        Commands::Brands { category, offline } => {
            run_brands(&cfg, category, offline).await?;
        }
        Commands::Search {
            game,
            games,
            resolution,
            settings,
            cpu,
            gpu,
            vram,
            ram_gb,
            ram_type,
            ram_cl,
            ram_speed,
            storage,
            offline,
        } => {
            let args = SearchArgs {
                game,
                games,
                resolution,
                settings,
                cpu,
                gpu,
                vram,
                ram_gb,
                ram_type,
                ram_cl,
                ram_speed,
                storage,
                offline,
            };
            run_search(&cfg, &args).await?;
        }
    }

    Ok(())
}
