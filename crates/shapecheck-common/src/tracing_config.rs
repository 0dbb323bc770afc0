//! Tracing configuration for debugging compatibility and narrowing decisions.
//!
//! Supports three output formats controlled by `SHAPECHECK_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`, handy for
//!   following a `narrow` call through each registration it evaluates
//! - `json`: One JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! SHAPECHECK_LOG=trace SHAPECHECK_LOG_FORMAT=tree cargo test -p shapecheck-solver
//! SHAPECHECK_LOG="shapecheck_solver::narrowing=trace" my-host
//! ```
//!
//! The subscriber is only initialised when `SHAPECHECK_LOG` (or `RUST_LOG`)
//! is set, so embedding hosts pay nothing by default.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Parse from the `SHAPECHECK_LOG_FORMAT` environment variable.
    fn from_env() -> Self {
        Self::parse(&std::env::var("SHAPECHECK_LOG_FORMAT").unwrap_or_default())
    }
}

/// Logging settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TracingSettings {
    /// `SHAPECHECK_LOG` directives, preferred over `RUST_LOG`.
    own_directives: Option<String>,
    rust_log_set: bool,
    format: LogFormat,
}

impl TracingSettings {
    fn from_env() -> Self {
        TracingSettings {
            own_directives: std::env::var("SHAPECHECK_LOG").ok(),
            rust_log_set: std::env::var("RUST_LOG").is_ok(),
            format: LogFormat::from_env(),
        }
    }

    fn enabled(&self) -> bool {
        self.own_directives.is_some() || self.rust_log_set
    }

    fn filter(&self) -> EnvFilter {
        match &self.own_directives {
            Some(directives) => EnvFilter::builder().parse_lossy(directives),
            None => EnvFilter::from_default_env(),
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `SHAPECHECK_LOG` nor `RUST_LOG` is set. Output
/// goes to stderr. Calling this twice is harmless: the second registration
/// attempt is ignored.
pub fn init_tracing() {
    install(&TracingSettings::from_env());
}

/// Returns whether a subscriber was requested. A host that already installed
/// one keeps it (`try_init`).
fn install(settings: &TracingSettings) -> bool {
    if !settings.enabled() {
        return false;
    }

    let filter = settings.filter();
    let _ = match settings.format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true)
                .with_writer(std::io::stderr);

            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);

            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
    true
}
