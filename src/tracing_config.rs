//! Opt-in diagnostics for configuration sealing, map resolution and plan
//! compilation.
//!
//! Nothing is installed unless `TMAP_LOG` or `RUST_LOG` holds a filter
//! directive; `TMAP_LOG` wins when both are present. `TMAP_LOG_FORMAT`
//! picks the rendering: `text` lines (the default), an indented `tree`
//! of spans, or `json` records for machine consumption.
//!
//! ```bash
//! TMAP_LOG=tmap_core::sealer=debug TMAP_LOG_FORMAT=tree cargo test
//! TMAP_LOG=tmap::query_json=trace TMAP_LOG_FORMAT=json cargo test
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const FILTER_VAR: &str = "TMAP_LOG";
const FORMAT_VAR: &str = "TMAP_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Nested spans rendered by `tracing-tree`.
    Tree,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Unrecognised names render as text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// The filter directives in effect, if diagnostics were requested at all.
fn requested_filter() -> Option<EnvFilter> {
    match std::env::var(FILTER_VAR) {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() => {
            Some(EnvFilter::from_default_env())
        }
        Err(_) => None,
    }
}

/// Install a global subscriber writing to stderr.
///
/// A no-op without a filter variable. A subscriber installed earlier, for
/// instance by a test harness, is left in place.
pub fn init_tracing() {
    let Some(filter) = requested_filter() else {
        return;
    };
    let format = LogFormat::parse(&std::env::var(FORMAT_VAR).unwrap_or_default());
    let registry = Registry::default().with(filter);
    let installed = match format {
        LogFormat::Tree => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_writer(std::io::stderr)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_targets(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already set");
    }
}
