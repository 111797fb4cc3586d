//! Tracing subscriber setup for the `rig` binary.
//!
//! Logs go to stderr so command output on stdout stays pipeable.
//! `RUST_LOG` takes precedence; otherwise `--verbose` selects
//! `rigbench=debug` and the default is `rigbench=info`.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "warn,rigbench=info";
const VERBOSE_DIRECTIVE: &str = "warn,rigbench=debug";

fn build_env_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directive = if verbose {
        VERBOSE_DIRECTIVE
    } else {
        DEFAULT_DIRECTIVE
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Call once, before loading config.
pub fn init(verbose: bool) {
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(false)
        .without_time()
        .compact();

    // A second call (e.g. from tests) keeps the existing subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(verbose))
        .with(fmt_layer)
        .try_init();
}
