//! Subscriber setup for the `pedidos-api` server.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local runs
    Pretty,
    /// One JSON object per event
    Json,
    Compact,
}

impl LogFormat {
    /// Unknown names fall back to `Pretty`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

fn filter(level: &str) -> EnvFilter {
    let base = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    ["hyper=warn", "reqwest=warn", "tower=warn", "h2=warn"]
        .into_iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(base, |filter, directive| filter.add_directive(directive))
}

/// Installs the global subscriber. `RUST_LOG` has already been folded into
/// `config.level` by the config loader.
pub fn init(config: &LoggingConfig) {
    let format = LogFormat::parse(&config.format);
    let registry = tracing_subscriber::registry().with(filter(&config.level));

    match format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty().with_target(true)).init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_current_span(true)).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }

    tracing::debug!(format = ?format, level = %config.level, "logging initialized");
}
