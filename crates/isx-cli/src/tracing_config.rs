//! Tracing configuration.
//!
//! Supports three output formats controlled by `ISX_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! ```bash
//! ISX_LOG=debug ISX_LOG_FORMAT=tree isx complete Program.cs --after "list."
//! ISX_LOG="isx_completion=trace" isx complete Program.cs --offset 120
//! ```
//!
//! The subscriber is only initialised when `ISX_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a `ISX_LOG_FORMAT` value; anything unknown is `Text`.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("ISX_LOG_FORMAT").unwrap_or_default())
    }
}

/// Lenient filter: invalid directives are ignored rather than rejected.
pub fn build_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder().parse_lossy(directives)
}

/// Initialise the global tracing subscriber when `ISX_LOG` is set.
///
/// All output goes to stderr so it never mixes with completion output.
pub fn init_tracing() {
    let Ok(directives) = std::env::var("ISX_LOG") else {
        return;
    };
    let filter = build_filter(&directives);

    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .init();
        }
    }
}
